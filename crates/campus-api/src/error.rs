use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Request error taxonomy. The `detail` strings are user-facing and
/// localized; tests assert on status codes, not message text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, invalid or expired credentials. Always 401 with a
    /// `WWW-Authenticate: Bearer` challenge.
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid identity, insufficient role.
    #[error("{0}")]
    Forbidden(String),

    /// Malformed input against field constraints.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate email at registration.
    #[error("{0}")]
    Conflict(String),

    /// Semantically invalid request (unknown role, invalid status, ...).
    #[error("{0}")]
    BadRequest(String),

    /// Anything unexpected. Detail is logged, the body stays generic.
    #[error("Sunucu hatası.")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated("Kimlik doğrulama başarısız.".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!("internal error: {:#}", e);
        }

        let status = self.status();
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        let mut response = (status, body).into_response();

        if matches!(self, ApiError::Unauthenticated(_)) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Run blocking store work off the async runtime, folding both the join
/// error and the query error into the taxonomy.
pub async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
        .map_err(ApiError::from)
}
