use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::warn;

use campus_db::models::TicketRow;
use campus_db::queries::TicketFilter;
use campus_notify::StatusChange;
use campus_types::api::{
    AssignDepartmentRequest, AssignSupportRequest, CommentResponse, CreateCommentRequest,
    CreateTicketRequest, SuggestRequest, TicketResponse, UpdateStatusRequest,
};
use campus_types::models::{Priority, Role, TicketStatus};

use crate::authz::{self, ADMIN_ONLY, DEPARTMENT_ROLES, SUPPORT_ROLES};
use crate::error::{ApiError, run_blocking};
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TicketListQuery {
    pub status_filter: Option<String>,
    pub department_filter: Option<String>,
    #[serde(default)]
    pub sort_by_priority: bool,
}

pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let description = req.description.trim().to_string();
    if description.is_empty() || description.chars().count() > 5000 {
        return Err(ApiError::Validation(
            "Açıklama 1 ile 5000 karakter arasında olmalıdır.".to_string(),
        ));
    }

    let title_given = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    if let Some(title) = &title_given {
        if title.chars().count() > 100 {
            return Err(ApiError::Validation(
                "Başlık en fazla 100 karakter olabilir.".to_string(),
            ));
        }
    }

    let db = state.clone();
    let departments = run_blocking(move || db.db.list_department_names()).await?;
    if departments.is_empty() {
        return Err(ApiError::BadRequest("Hiçbir departman bulunamadı.".to_string()));
    }

    let requested_department = req
        .department_name
        .as_ref()
        .filter(|name| departments.iter().any(|d| d == *name))
        .cloned();

    // Consult the advisor only for the fields the caller left open. It
    // never fails; worst case it answers with the deterministic rules.
    let needs_suggestion =
        title_given.is_none() || req.priority.is_none() || requested_department.is_none();
    let suggestion = if needs_suggestion {
        Some(
            state
                .advisor
                .suggest(title_given.as_deref(), &description, &departments)
                .await,
        )
    } else {
        None
    };

    let department_name = requested_department
        .or_else(|| {
            suggestion
                .as_ref()
                .and_then(|s| s.department_options.first().cloned())
        })
        .ok_or_else(|| ApiError::BadRequest("Hiçbir departman bulunamadı.".to_string()))?;

    let priority = req.priority.unwrap_or_else(|| {
        suggestion
            .as_ref()
            .and_then(|s| s.priority_options.first().copied())
            .unwrap_or(Priority::Low)
    });

    let title = title_given
        .or_else(|| suggestion.as_ref().and_then(|s| s.suggested_title.clone()))
        .unwrap_or_else(|| campus_advisor::fallback::truncate_chars(&description, 80));

    let db = state.clone();
    let creator_id = user.id;
    let ticket = run_blocking(move || {
        let department = db
            .db
            .get_department_by_name(&department_name)?
            .ok_or_else(|| anyhow::anyhow!("department '{}' vanished", department_name))?;
        let id = db.db.insert_ticket(
            &title,
            &description,
            priority.as_str(),
            creator_id,
            department.id,
        )?;
        db.db
            .get_ticket(id)?
            .ok_or_else(|| anyhow::anyhow!("ticket {} vanished after insert", id))
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ticket_response(ticket, Vec::new())),
    ))
}

/// Advisory preview for the creation form; pure pass-through to the
/// advisor, so it always answers.
pub async fn suggest(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Json(req): Json<SuggestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let description = req.description.trim().to_string();
    if description.is_empty() || description.chars().count() > 5000 {
        return Err(ApiError::Validation(
            "Açıklama 1 ile 5000 karakter arasında olmalıdır.".to_string(),
        ));
    }

    let db = state.clone();
    let departments = run_blocking(move || db.db.list_department_names()).await?;

    let suggestion = state
        .advisor
        .suggest(req.title.as_deref(), &description, &departments)
        .await;

    Ok(Json(suggestion))
}

/// Unscoped listing with optional filters, Admin/Department only.
pub async fn list_all(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TicketListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authz::authorize(user.role, DEPARTMENT_ROLES)?;

    let department_filter = query.department_filter.filter(|d| !d.is_empty());
    let department_id = match department_filter {
        Some(name) => {
            let db = state.clone();
            let department = run_blocking(move || db.db.get_department_by_name(&name))
                .await?
                .ok_or_else(|| ApiError::NotFound("Departman bulunamadi.".to_string()))?;
            Some(department.id)
        }
        None => None,
    };

    let filter = TicketFilter {
        department_id,
        status: query.status_filter.filter(|s| !s.is_empty()),
        sort_by_priority: query.sort_by_priority,
        ..Default::default()
    };
    list_filtered(&state, filter).await
}

pub async fn list_my(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = TicketFilter {
        created_by: Some(user.id),
        ..Default::default()
    };
    list_filtered(&state, filter).await
}

/// Department manager view: every ticket routed to the caller's
/// department. A manager without a department sees nothing.
pub async fn list_department(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TicketListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authz::authorize(user.role, DEPARTMENT_ROLES)?;

    let Some(department_id) = user.department_id else {
        return Ok(Json(Vec::<TicketResponse>::new()));
    };

    let filter = TicketFilter {
        department_id: Some(department_id),
        status: query.status_filter.filter(|s| !s.is_empty()),
        sort_by_priority: query.sort_by_priority,
        ..Default::default()
    };
    list_filtered(&state, filter).await
}

pub async fn list_support(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    authz::authorize(user.role, SUPPORT_ROLES)?;

    let filter = TicketFilter {
        assigned_support_id: Some(user.id),
        ..Default::default()
    };
    list_filtered(&state, filter).await
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let ticket = run_blocking(move || db.db.get_ticket(ticket_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket bulunamadi.".to_string()))?;

    let is_owner = ticket.created_by_user_id == user.id;
    if !is_owner {
        authz::authorize(user.role, SUPPORT_ROLES)?;
    }

    let db = state.clone();
    let comments = run_blocking(move || db.db.get_comments_for_tickets(&[ticket_id])).await?;
    let comments = comments.into_iter().map(comment_response).collect();

    Ok(Json(ticket_response(ticket, comments)))
}

/// Short triage summary for staff; advisor-backed with a truncation
/// fallback, so it always answers.
pub async fn summarize_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authz::authorize(user.role, SUPPORT_ROLES)?;

    let db = state.clone();
    let ticket = run_blocking(move || db.db.get_ticket(ticket_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket bulunamadi.".to_string()))?;

    let summary = state
        .advisor
        .summarize(&ticket.title, &ticket.description)
        .await;

    Ok(Json(serde_json::json!({ "summary": summary })))
}

/// Reply draft for support staff; template fallback when no advisory
/// backend is configured.
pub async fn draft_reply(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    authz::authorize(user.role, SUPPORT_ROLES)?;

    let db = state.clone();
    let ticket = run_blocking(move || db.db.get_ticket(ticket_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket bulunamadi.".to_string()))?;

    let draft = state
        .advisor
        .draft_response(&ticket.title, &ticket.description)
        .await;

    Ok(Json(serde_json::json!({ "draft": draft })))
}

pub async fn assign_support(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<i64>,
    Json(req): Json<AssignSupportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authz::authorize(user.role, DEPARTMENT_ROLES)?;

    let db = state.clone();
    let support_email = req.support_email.trim().to_lowercase();
    let result = run_blocking(move || {
        let ticket = db.db.get_ticket(ticket_id)?;
        let support_user = db.db.get_user_by_email(&support_email)?;
        let assignable = support_user
            .filter(|u| u.role == Role::Support.as_str());

        match (ticket, assignable) {
            (Some(_), Some(support)) => {
                db.db.assign_support(ticket_id, support.id)?;
                Ok(Some(support.email))
            }
            _ => Ok(None),
        }
    })
    .await?;

    let email = result.ok_or_else(|| {
        ApiError::NotFound("Ticket veya Destek Personeli bulunamadi.".to_string())
    })?;

    Ok(Json(serde_json::json!({
        "message": format!("Ticket {} basariyla {} kullanicisina atandi.", ticket_id, email)
    })))
}

pub async fn assign_department(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<i64>,
    Json(req): Json<AssignDepartmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authz::authorize(user.role, ADMIN_ONLY)?;

    let db = state.clone();
    let department_name = req.department_name.clone();
    let outcome = run_blocking(move || {
        if db.db.get_ticket(ticket_id)?.is_none() {
            return Ok(AssignOutcome::TicketMissing);
        }
        let Some(department) = db.db.get_department_by_name(&department_name)? else {
            return Ok(AssignOutcome::DepartmentMissing);
        };
        db.db.assign_department(ticket_id, department.id)?;
        Ok(AssignOutcome::Done)
    })
    .await?;

    match outcome {
        AssignOutcome::TicketMissing => {
            Err(ApiError::NotFound("Ticket bulunamadi.".to_string()))
        }
        AssignOutcome::DepartmentMissing => {
            Err(ApiError::NotFound("Departman bulunamadi.".to_string()))
        }
        AssignOutcome::Done => Ok(Json(serde_json::json!({
            "message": format!(
                "Ticket {} basariyla {} departmanına atandi.",
                ticket_id, req.department_name
            )
        }))),
    }
}

enum AssignOutcome {
    Done,
    TicketMissing,
    DepartmentMissing,
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authz::authorize(user.role, SUPPORT_ROLES)?;

    let new_status: TicketStatus = req
        .new_status
        .parse()
        .map_err(|_| ApiError::BadRequest("Gecersiz durum.".to_string()))?;

    let db = state.clone();
    let updated = run_blocking(move || {
        let Some(ticket) = db.db.get_ticket(ticket_id)? else {
            return Ok(None);
        };
        db.db.update_ticket_status(ticket_id, new_status.as_str())?;
        let recipient = db
            .db
            .get_user_by_id(ticket.created_by_user_id)?
            .map(|creator| creator.email);
        Ok(Some((ticket, recipient)))
    })
    .await?;

    let Some((ticket, recipient)) = updated else {
        return Err(ApiError::NotFound("Ticket bulunamadi.".to_string()));
    };

    // Fire-and-forget: a dead SMTP server or webhook must never fail the
    // status update.
    state.notifier.notify(StatusChange {
        ticket_id,
        old_status: parse_status(&ticket.status, ticket.id),
        new_status,
        title: ticket.title,
        description: ticket.description,
        resolver: Some(user.email),
        recipient,
    });

    Ok(Json(serde_json::json!({
        "message": format!(
            "Ticket {} durumu '{}' olarak guncellendi.",
            ticket_id,
            new_status.as_str()
        )
    })))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<i64>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = req.content.trim().to_string();
    if content.is_empty() || content.chars().count() > 1000 {
        return Err(ApiError::Validation(
            "Yorum 1 ile 1000 karakter arasında olmalıdır.".to_string(),
        ));
    }

    let db = state.clone();
    let ticket = run_blocking(move || db.db.get_ticket(ticket_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket bulunamadi.".to_string()))?;

    let is_owner = ticket.created_by_user_id == user.id;
    let is_staff = SUPPORT_ROLES.contains(&user.role);
    if !is_owner && !is_staff {
        return Err(ApiError::Forbidden(
            "Bu ticket'a yorum yapma yetkiniz yok.".to_string(),
        ));
    }

    let db = state.clone();
    let author_id = user.id;
    let comment_id =
        run_blocking(move || db.db.insert_comment(ticket_id, author_id, &content)).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Yorum basariyla eklendi.",
            "comment_id": comment_id
        })),
    ))
}

// -- Helpers --

/// Run a listing and hydrate each ticket with its comments in one
/// batched query.
async fn list_filtered(
    state: &AppState,
    filter: TicketFilter,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let db = state.clone();
    let (rows, comment_rows) = run_blocking(move || {
        let rows = db.db.list_tickets(&filter)?;
        let ids: Vec<i64> = rows.iter().map(|t| t.id).collect();
        let comment_rows = db.db.get_comments_for_tickets(&ids)?;
        Ok((rows, comment_rows))
    })
    .await?;

    let mut comment_map: HashMap<i64, Vec<CommentResponse>> = HashMap::new();
    for row in comment_rows {
        comment_map
            .entry(row.ticket_id)
            .or_default()
            .push(comment_response(row));
    }

    let tickets = rows
        .into_iter()
        .map(|row| {
            let comments = comment_map.remove(&row.id).unwrap_or_default();
            ticket_response(row, comments)
        })
        .collect();

    Ok(Json(tickets))
}

fn ticket_response(row: TicketRow, comments: Vec<CommentResponse>) -> TicketResponse {
    TicketResponse {
        id: row.id,
        title: row.title,
        description: row.description,
        status: parse_status(&row.status, row.id),
        priority: row.priority.parse().unwrap_or_else(|_| {
            warn!("Corrupt priority '{}' on ticket {}", row.priority, row.id);
            Priority::Low
        }),
        department: row.department,
        created_by_user_id: row.created_by_user_id,
        assigned_support_id: row.assigned_support_id,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
        comments,
    }
}

fn comment_response(row: campus_db::models::CommentRow) -> CommentResponse {
    CommentResponse {
        id: row.id,
        user_id: row.user_id,
        content: row.content,
        created_at: parse_timestamp(&row.created_at),
    }
}

fn parse_status(raw: &str, ticket_id: i64) -> TicketStatus {
    raw.parse().unwrap_or_else(|_| {
        warn!("Corrupt status '{}' on ticket {}", raw, ticket_id);
        TicketStatus::Open
    })
}

fn parse_timestamp(raw: &str) -> chrono::DateTime<chrono::Utc> {
    raw.parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without a
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|naive| naive.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            chrono::DateTime::default()
        })
}
