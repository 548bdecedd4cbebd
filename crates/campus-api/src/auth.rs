use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use jsonwebtoken::{EncodingKey, Header, encode};

use campus_types::api::{
    ChangePasswordRequest, Claims, LoginRequest, RegisterRequest, ResetPasswordRequest,
    TokenResponse, UserResponse,
};
use campus_types::models::Role;

use crate::authz::{self, ADMIN_ONLY};
use crate::error::{ApiError, run_blocking};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Hash-input cap inherited from the original credential store: bytes past
/// the 72nd are ignored at hash and verify time.
const MAX_PASSWORD_BYTES: usize = 72;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    if !is_plausible_email(&email) {
        return Err(ApiError::Validation("Geçersiz e-posta adresi.".to_string()));
    }

    let password_len = req.password.chars().count();
    if !(6..=15).contains(&password_len) {
        return Err(ApiError::Validation(
            "Şifre 6 ile 15 karakter arasında olmalıdır.".to_string(),
        ));
    }

    let role: Role = req
        .role_name
        .parse()
        .map_err(|_| ApiError::BadRequest("Geçersiz kullanıcı rolü.".to_string()))?;

    let password_hash = hash_password(&req.password)?;

    let db = state.clone();
    let stored_email = email.clone();
    let user = run_blocking(move || {
        if db.db.get_user_by_email(&stored_email)?.is_some() {
            return Ok(None);
        }
        let role_id = db
            .db
            .get_role_id(role.as_str())?
            .ok_or_else(|| anyhow::anyhow!("role '{}' not seeded", role))?;
        let id = db.db.create_user(&stored_email, &password_hash, role_id, None)?;
        Ok(Some(id))
    })
    .await?
    .ok_or_else(|| ApiError::Conflict("E-posta zaten kayıtlı.".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user,
            email,
            role,
            department: None,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let rejected = || {
        ApiError::Unauthenticated("Hatalı kullanıcı adı veya şifre.".to_string())
    };

    let db = state.clone();
    let email = req.username.trim().to_lowercase();
    let user = run_blocking(move || db.db.get_user_by_email(&email))
        .await?
        .ok_or_else(rejected)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(rejected());
    }

    let role: Role = user.role.parse().map_err(|_| rejected())?;
    let token = create_token(
        &user.email,
        role,
        &state.auth.jwt_secret,
        state.auth.token_ttl_minutes,
    )?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

pub async fn me(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(UserResponse {
        id: user.id,
        email: user.email,
        role: user.role,
        department: user.department,
    })
}

/// Self-service password change; requires the current password.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_new_password(&req.new_password)?;

    let db = state.clone();
    let user_id = user.id;
    let stored = run_blocking(move || db.db.get_user_by_id(user_id))
        .await?
        .ok_or_else(ApiError::unauthenticated)?;

    if !verify_password(&req.current_password, &stored.password_hash) {
        return Err(ApiError::Forbidden("Mevcut şifre hatalı.".to_string()));
    }

    let new_hash = hash_password(&req.new_password)?;
    let db = state.clone();
    run_blocking(move || db.db.update_user_password(user_id, &new_hash)).await?;

    Ok(Json(serde_json::json!({ "message": "Şifre güncellendi." })))
}

/// Admin reset of another user's password.
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authz::authorize(user.role, ADMIN_ONLY)?;
    validate_new_password(&req.new_password)?;

    let new_hash = hash_password(&req.new_password)?;
    let db = state.clone();
    let changed = run_blocking(move || db.db.update_user_password(user_id, &new_hash)).await?;
    if !changed {
        return Err(ApiError::NotFound("Kullanıcı bulunamadı.".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Şifre sıfırlandı." })))
}

pub fn create_token(
    email: &str,
    role: Role,
    secret: &str,
    ttl_minutes: i64,
) -> Result<String, ApiError> {
    let claims = Claims {
        sub: email.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::minutes(ttl_minutes)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("token encoding failed: {}", e)))
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(cap_password(password), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(cap_password(password), &parsed)
        .is_ok()
}

fn cap_password(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

fn validate_new_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    if !(6..=128).contains(&len) {
        return Err(ApiError::Validation(
            "Şifre 6 ile 128 karakter arasında olmalıdır.".to_string(),
        ));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
