use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::auth;
use crate::middleware::require_auth;
use crate::state::AppState;
use crate::tickets;

/// Full API surface. Register and login are public; everything else sits
/// behind the bearer-token middleware.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api", get(api_root))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/me/password", put(auth::change_password))
        .route(
            "/api/v1/auth/users/{user_id}/password",
            put(auth::reset_password),
        )
        .route(
            "/api/v1/tickets",
            post(tickets::create_ticket).get(tickets::list_all),
        )
        .route("/api/v1/tickets/suggest", post(tickets::suggest))
        .route("/api/v1/tickets/my", get(tickets::list_my))
        .route("/api/v1/tickets/department", get(tickets::list_department))
        .route("/api/v1/tickets/support", get(tickets::list_support))
        .route("/api/v1/tickets/{ticket_id}", get(tickets::get_ticket))
        .route(
            "/api/v1/tickets/{ticket_id}/summary",
            get(tickets::summarize_ticket),
        )
        .route(
            "/api/v1/tickets/{ticket_id}/draft-response",
            get(tickets::draft_reply),
        )
        .route(
            "/api/v1/tickets/{ticket_id}/assign",
            put(tickets::assign_support),
        )
        .route(
            "/api/v1/tickets/{ticket_id}/assign-department",
            put(tickets::assign_department),
        )
        .route(
            "/api/v1/tickets/{ticket_id}/status",
            put(tickets::update_status),
        )
        .route(
            "/api/v1/tickets/{ticket_id}/comment",
            post(tickets::add_comment),
        )
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public).merge(protected)
}

async fn api_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "CampuSupport Backend calisiyor!" }))
}
