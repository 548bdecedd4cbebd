use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Priority, Role, TicketStatus};

// -- JWT Claims --

/// JWT claims shared between campus-api (token issue in the auth handlers)
/// and its middleware (verification). Canonical definition lives here in
/// campus-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email address.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

fn default_role_name() -> String {
    "student".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default = "default_role_name")]
    pub role_name: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
}

/// The `username` field carries the email address, kept for wire
/// compatibility with the original login form.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

// -- Tickets --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: String,
    pub department_name: Option<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub department: String,
    pub created_by_user_id: i64,
    pub assigned_support_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignSupportRequest {
    pub support_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignDepartmentRequest {
    pub department_name: String,
}

/// Status arrives as a plain string and is validated against the fixed set
/// in the handler, so an unknown value maps to the 400 taxonomy rather than
/// a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub new_status: String,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// -- Suggestions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestRequest {
    pub title: Option<String>,
    pub description: String,
}

/// Best-effort advisor output. Option lists are ordered best-guess first
/// and are always non-empty when the server has at least one department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggested_title: Option<String>,
    pub department_options: Vec<String>,
    pub priority_options: Vec<Priority>,
    pub explanation: String,
}
