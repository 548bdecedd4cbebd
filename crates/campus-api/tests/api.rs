//! End-to-end handler tests against the assembled router, with an
//! in-memory store, a disabled notifier and (unless a test says
//! otherwise) the advisor running on its deterministic fallback.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use campus_advisor::{Advisor, AdvisorConfig};
use campus_api::router::router;
use campus_api::state::{AppState, AppStateInner, AuthConfig};
use campus_db::Database;
use campus_notify::dispatcher::Notifier;
use campus_types::models::Role;

struct TestApp {
    app: Router,
    state: AppState,
}

fn test_app() -> TestApp {
    test_app_with_advisor(Advisor::disabled())
}

fn test_app_with_advisor(advisor: Advisor) -> TestApp {
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        auth: AuthConfig::default(),
        advisor,
        notifier: Notifier::disabled(),
    });
    TestApp {
        app: router(state.clone()),
        state,
    }
}

impl TestApp {
    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    async fn register(&self, email: &str, password: &str, role: &str) -> serde_json::Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                    "role_name": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({ "username": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn signup(&self, email: &str, role: &str) -> String {
        self.register(email, "secret1", role).await;
        self.login(email, "secret1").await
    }

    async fn create_ticket(&self, token: &str, body: serde_json::Value) -> serde_json::Value {
        let (status, body) = self
            .request("POST", "/api/v1/tickets", Some(token), Some(body))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body
    }

    /// Direct store tweak for fixtures the API does not expose, like
    /// attaching a manager to a department.
    fn set_department(&self, email: &str, department: &str) {
        self.state
            .db
            .with_conn_mut(|conn| {
                conn.execute(
                    "UPDATE users SET department_id =
                         (SELECT id FROM departments WHERE name = ?1)
                     WHERE email = ?2",
                    (department, email),
                )?;
                Ok(())
            })
            .unwrap();
    }
}

// -- Auth --

#[tokio::test]
async fn register_login_and_whoami() {
    let t = test_app();
    let user = t.register("a@x.com", "secret1", "student").await;
    assert_eq!(user["email"], "a@x.com");
    assert_eq!(user["role"], "student");

    let token = t.login("a@x.com", "secret1").await;
    let (status, me) = t.request("GET", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@x.com");
    assert_eq!(me["role"], "student");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let t = test_app();
    t.register("a@x.com", "secret1", "student").await;
    let (status, _) = t
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(serde_json::json!({
                "email": "a@x.com",
                "password": "secret2",
                "role_name": "student",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_role_and_short_password_are_rejected() {
    let t = test_app();
    let (status, _) = t
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(serde_json::json!({
                "email": "a@x.com",
                "password": "secret1",
                "role_name": "superuser",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .request(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(serde_json::json!({
                "email": "b@x.com",
                "password": "short",
                "role_name": "student",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let t = test_app();
    t.register("a@x.com", "secret1", "student").await;

    let (status, _) = t
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({ "username": "a@x.com", "password": "secret2" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_and_expired_tokens_are_unauthenticated() {
    let t = test_app();
    t.register("a@x.com", "secret1", "student").await;

    let (status, _) = t.request("GET", "/api/v1/tickets/my", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired =
        campus_api::auth::create_token("a@x.com", Role::Student, "dev-secret-change-me", -5)
            .unwrap();
    let (status, _) = t
        .request("GET", "/api/v1/tickets/my", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_resets_another_users_password() {
    let t = test_app();
    let admin = t.signup("root@x.com", "admin").await;
    let user = t.register("a@x.com", "secret1", "student").await;
    let user_id = user["id"].as_i64().unwrap();

    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/auth/users/{}/password", user_id),
            Some(&admin),
            Some(serde_json::json!({ "new_password": "changed1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works, the new one does.
    let (status, _) = t
        .request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(serde_json::json!({ "username": "a@x.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    t.login("a@x.com", "changed1").await;

    // Non-admins are turned away.
    let student = t.login("a@x.com", "changed1").await;
    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/auth/users/{}/password", user_id),
            Some(&student),
            Some(serde_json::json!({ "new_password": "changed2" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_changes_own_password_with_current_one() {
    let t = test_app();
    let token = t.signup("a@x.com", "student").await;

    let (status, _) = t
        .request(
            "PUT",
            "/api/v1/auth/me/password",
            Some(&token),
            Some(serde_json::json!({
                "current_password": "wrong",
                "new_password": "changed1",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = t
        .request(
            "PUT",
            "/api/v1/auth/me/password",
            Some(&token),
            Some(serde_json::json!({
                "current_password": "secret1",
                "new_password": "changed1",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    t.login("a@x.com", "changed1").await;
}

// -- Ticket creation --

#[tokio::test]
async fn ticket_without_title_backfills_from_description() {
    let t = test_app();
    let token = t.signup("a@x.com", "student").await;

    let ticket = t
        .create_ticket(
            &token,
            serde_json::json!({
                "description": "no title",
                "department_name": "Bilgi Islem",
            }),
        )
        .await;

    assert_eq!(ticket["status"], "Open");
    assert_eq!(ticket["priority"], "Low");
    assert_eq!(ticket["department"], "Bilgi Islem");
    assert_eq!(ticket["title"], "no title");
    assert_eq!(ticket["comments"], serde_json::json!([]));
}

#[tokio::test]
async fn advisor_priority_is_used_when_the_caller_leaves_it_open() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "High"}}]
            })
            .to_string(),
        )
        .expect_at_least(1)
        .create_async()
        .await;

    let t = test_app_with_advisor(Advisor::new(AdvisorConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.url(),
        model: "gpt-3.5-turbo".to_string(),
        timeout: Duration::from_secs(2),
    }));
    let token = t.signup("a@x.com", "student").await;

    let ticket = t
        .create_ticket(
            &token,
            serde_json::json!({
                "description": "no title",
                "department_name": "Bilgi Islem",
            }),
        )
        .await;

    assert_eq!(ticket["status"], "Open");
    assert_eq!(ticket["priority"], "High");
    assert_eq!(ticket["department"], "Bilgi Islem");
}

#[tokio::test]
async fn advisor_outage_never_fails_creation() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .expect_at_least(1)
        .create_async()
        .await;

    let t = test_app_with_advisor(Advisor::new(AdvisorConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.url(),
        model: "gpt-3.5-turbo".to_string(),
        timeout: Duration::from_secs(2),
    }));
    let token = t.signup("a@x.com", "student").await;

    let ticket = t
        .create_ticket(&token, serde_json::json!({ "description": "no title" }))
        .await;

    assert_eq!(ticket["status"], "Open");
    assert_eq!(ticket["priority"], "Low");
    assert_eq!(ticket["department"], "Bilgi Islem");
}

#[tokio::test]
async fn unknown_requested_department_falls_back_to_the_first() {
    let t = test_app();
    let token = t.signup("a@x.com", "student").await;

    let ticket = t
        .create_ticket(
            &token,
            serde_json::json!({
                "title": "Kayıt sorunu",
                "description": "ders kaydı yapamıyorum",
                "department_name": "Rektörlük",
            }),
        )
        .await;
    assert_eq!(ticket["department"], "Bilgi Islem");
}

#[tokio::test]
async fn empty_description_is_invalid() {
    let t = test_app();
    let token = t.signup("a@x.com", "student").await;

    let (status, _) = t
        .request(
            "POST",
            "/api/v1/tickets",
            Some(&token),
            Some(serde_json::json!({ "description": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn suggest_endpoint_answers_on_fallback() {
    let t = test_app();
    let token = t.signup("a@x.com", "student").await;

    let (status, body) = t
        .request(
            "POST",
            "/api/v1/tickets/suggest",
            Some(&token),
            Some(serde_json::json!({ "description": "internet sürekli kopuyor" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["priority_options"][0], "Medium");
    assert_eq!(body["department_options"][0], "Bilgi Islem");
    assert_eq!(body["suggested_title"], "internet sürekli kopuyor");
}

#[tokio::test]
async fn summary_and_draft_are_staff_only_and_always_answer() {
    let t = test_app();
    let student = t.signup("a@x.com", "student").await;
    let support = t.signup("s@x.com", "support").await;

    let ticket = t
        .create_ticket(
            &student,
            serde_json::json!({
                "title": "VPN",
                "description": "kampüs dışından bağlanamıyorum",
            }),
        )
        .await;
    let id = ticket["id"].as_i64().unwrap();

    let (status, body) = t
        .request(
            "GET",
            &format!("/api/v1/tickets/{}/summary", id),
            Some(&support),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["summary"].as_str().unwrap().is_empty());

    let (status, body) = t
        .request(
            "GET",
            &format!("/api/v1/tickets/{}/draft-response", id),
            Some(&support),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["draft"].as_str().unwrap().contains("VPN"));

    let (status, _) = t
        .request(
            "GET",
            &format!("/api/v1/tickets/{}/summary", id),
            Some(&student),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// -- Listing and scoping --

#[tokio::test]
async fn student_sees_only_own_tickets_and_no_scoped_views() {
    let t = test_app();
    let a = t.signup("a@x.com", "student").await;
    let b = t.signup("b@x.com", "student").await;

    t.create_ticket(&a, serde_json::json!({ "description": "mine" }))
        .await;
    t.create_ticket(&b, serde_json::json!({ "description": "theirs" }))
        .await;

    let (status, mine) = t.request("GET", "/api/v1/tickets/my", Some(&a), None).await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["description"], "mine");

    for uri in [
        "/api/v1/tickets/department",
        "/api/v1/tickets",
        "/api/v1/tickets/support",
    ] {
        let (status, _) = t.request("GET", uri, Some(&a), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} should be gated", uri);
    }
}

#[tokio::test]
async fn department_view_is_scoped_to_the_managers_department() {
    let t = test_app();
    let student = t.signup("a@x.com", "student").await;
    let manager = t.signup("mgr@x.com", "department").await;
    t.set_department("mgr@x.com", "Yapi Isleri");

    t.create_ticket(
        &student,
        serde_json::json!({ "description": "kapı kilidi bozuk", "department_name": "Yapi Isleri" }),
    )
    .await;
    t.create_ticket(
        &student,
        serde_json::json!({ "description": "vpn sorunu", "department_name": "Bilgi Islem" }),
    )
    .await;

    let (status, body) = t
        .request("GET", "/api/v1/tickets/department", Some(&manager), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let tickets = body.as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["department"], "Yapi Isleri");
}

#[tokio::test]
async fn priority_sort_is_high_medium_low_and_stable() {
    let t = test_app();
    let admin = t.signup("root@x.com", "admin").await;

    let low = t
        .create_ticket(&admin, serde_json::json!({ "description": "d", "priority": "Low" }))
        .await;
    let high_a = t
        .create_ticket(&admin, serde_json::json!({ "description": "d", "priority": "High" }))
        .await;
    let medium = t
        .create_ticket(&admin, serde_json::json!({ "description": "d", "priority": "Medium" }))
        .await;
    let high_b = t
        .create_ticket(&admin, serde_json::json!({ "description": "d", "priority": "High" }))
        .await;

    let (status, body) = t
        .request(
            "GET",
            "/api/v1/tickets?sort_by_priority=true",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|ticket| ticket["id"].as_i64().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            high_a["id"].as_i64().unwrap(),
            high_b["id"].as_i64().unwrap(),
            medium["id"].as_i64().unwrap(),
            low["id"].as_i64().unwrap(),
        ]
    );
}

#[tokio::test]
async fn unscoped_listing_filters_by_status_and_department() {
    let t = test_app();
    let admin = t.signup("root@x.com", "admin").await;
    let support = t.signup("s@x.com", "support").await;

    let kept = t
        .create_ticket(
            &admin,
            serde_json::json!({ "description": "d", "department_name": "Yapi Isleri" }),
        )
        .await;
    let other = t
        .create_ticket(
            &admin,
            serde_json::json!({ "description": "d", "department_name": "Yapi Isleri" }),
        )
        .await;
    t.create_ticket(
        &admin,
        serde_json::json!({ "description": "d", "department_name": "Bilgi Islem" }),
    )
    .await;

    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/status", other["id"]),
            Some(&support),
            Some(serde_json::json!({ "new_status": "Closed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t
        .request(
            "GET",
            "/api/v1/tickets?department_filter=Yapi%20Isleri&status_filter=Open",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let tickets = body.as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["id"], kept["id"]);

    let (status, _) = t
        .request(
            "GET",
            "/api/v1/tickets?department_filter=Rekt%C3%B6rl%C3%BCk",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Assignment and status --

#[tokio::test]
async fn assigning_support_forces_in_progress_from_any_status() {
    let t = test_app();
    let student = t.signup("a@x.com", "student").await;
    let manager = t.signup("mgr@x.com", "department").await;
    let support = t.signup("s@x.com", "support").await;

    let ticket = t
        .create_ticket(&student, serde_json::json!({ "description": "d" }))
        .await;
    let id = ticket["id"].as_i64().unwrap();

    // Resolve first, then assign — assignment must still force In Progress.
    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/status", id),
            Some(&support),
            Some(serde_json::json!({ "new_status": "Resolved" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/assign", id),
            Some(&manager),
            Some(serde_json::json!({ "support_email": "s@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = t
        .request(
            "GET",
            &format!("/api/v1/tickets/{}", id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(fetched["status"], "In Progress");
    assert!(fetched["assigned_support_id"].as_i64().is_some());

    // The support view now contains it.
    let (_, assigned) = t
        .request("GET", "/api/v1/tickets/support", Some(&support), None)
        .await;
    assert_eq!(assigned.as_array().unwrap().len(), 1);

    // Students cannot assign.
    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/assign", id),
            Some(&student),
            Some(serde_json::json!({ "support_email": "s@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only users whose role is literally support are assignable.
    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/assign", id),
            Some(&manager),
            Some(serde_json::json!({ "support_email": "a@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reassigning_a_department_reopens_the_ticket() {
    let t = test_app();
    let admin = t.signup("root@x.com", "admin").await;
    let support = t.signup("s@x.com", "support").await;

    let ticket = t
        .create_ticket(&admin, serde_json::json!({ "description": "d" }))
        .await;
    let id = ticket["id"].as_i64().unwrap();

    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/status", id),
            Some(&support),
            Some(serde_json::json!({ "new_status": "Closed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/assign-department", id),
            Some(&admin),
            Some(serde_json::json!({ "department_name": "Ogrenci Isleri" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = t
        .request("GET", &format!("/api/v1/tickets/{}", id), Some(&admin), None)
        .await;
    assert_eq!(fetched["status"], "Open");
    assert_eq!(fetched["department"], "Ogrenci Isleri");

    // Department re-routing is admin-only.
    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/assign-department", id),
            Some(&support),
            Some(serde_json::json!({ "department_name": "Bilgi Islem" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn status_updates_validate_and_report_missing_tickets() {
    let t = test_app();
    let support = t.signup("s@x.com", "support").await;
    let ticket = t
        .create_ticket(&support, serde_json::json!({ "description": "d" }))
        .await;
    let id = ticket["id"].as_i64().unwrap();

    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/status", id),
            Some(&support),
            Some(serde_json::json!({ "new_status": "Reopened" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t
        .request(
            "PUT",
            "/api/v1/tickets/9999/status",
            Some(&support),
            Some(serde_json::json!({ "new_status": "Closed" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A valid transition succeeds even with no notification channel
    // configured.
    let (status, _) = t
        .request(
            "PUT",
            &format!("/api/v1/tickets/{}/status", id),
            Some(&support),
            Some(serde_json::json!({ "new_status": "Resolved" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

// -- Comments --

#[tokio::test]
async fn comments_are_gated_and_append_only_in_order() {
    let t = test_app();
    let owner = t.signup("a@x.com", "student").await;
    let other = t.signup("b@x.com", "student").await;
    let support = t.signup("s@x.com", "support").await;

    let ticket = t
        .create_ticket(&owner, serde_json::json!({ "description": "d" }))
        .await;
    let id = ticket["id"].as_i64().unwrap();
    let uri = format!("/api/v1/tickets/{}/comment", id);

    let (status, _) = t
        .request(
            "POST",
            &uri,
            Some(&owner),
            Some(serde_json::json!({ "content": "ilk yorum" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = t
        .request(
            "POST",
            &uri,
            Some(&support),
            Some(serde_json::json!({ "content": "inceliyoruz" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // An unrelated student may neither comment nor read.
    let (status, _) = t
        .request(
            "POST",
            &uri,
            Some(&other),
            Some(serde_json::json!({ "content": "ben de" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = t
        .request("GET", &format!("/api/v1/tickets/{}", id), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, fetched) = t
        .request("GET", &format!("/api/v1/tickets/{}", id), Some(&owner), None)
        .await;
    let comments = fetched["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "ilk yorum");
    assert_eq!(comments[1]["content"], "inceliyoruz");

    let (status, _) = t
        .request(
            "POST",
            &uri,
            Some(&owner),
            Some(serde_json::json!({ "content": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
