use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use campus_types::api::Claims;
use campus_types::models::Role;

use crate::error::{ApiError, run_blocking};
use crate::state::AppState;

/// Authenticated caller, resolved from the token subject against the user
/// store and attached to the request as an extension.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i64>,
    pub department: Option<String>,
}

/// Extract and validate the bearer token, then load the subject. Fails
/// closed: any decode error, unknown subject, or corrupt role yields the
/// uniform unauthenticated outcome.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(ApiError::unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(ApiError::unauthenticated)?;

    let claims = verify_token(token, &state.auth.jwt_secret)?;

    let db = state.clone();
    let email = claims.sub.clone();
    let user = run_blocking(move || db.db.get_user_by_email(&email))
        .await?
        .ok_or_else(ApiError::unauthenticated)?;

    let role: Role = user
        .role
        .parse()
        .map_err(|_| ApiError::unauthenticated())?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        role,
        department_id: user.department_id,
        department: user.department,
    });

    Ok(next.run(req).await)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::unauthenticated())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_token;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_verifies_with_the_same_secret() {
        let token = create_token("a@x.com", Role::Student, SECRET, 30).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.role, Role::Student);
    }

    #[test]
    fn wrong_secret_fails_closed() {
        let token = create_token("a@x.com", Role::Admin, SECRET, 30).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_fails_closed() {
        let token = create_token("a@x.com", Role::Student, SECRET, -5).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn garbage_fails_closed() {
        assert!(verify_token("not-a-token", SECRET).is_err());
        assert!(verify_token("", SECRET).is_err());
    }
}
