use campus_types::models::Role;

use crate::error::ApiError;

/// Role sets, narrowest to widest. Any-authenticated-user endpoints skip
/// the gate entirely; authentication already happened in the middleware.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const DEPARTMENT_ROLES: &[Role] = &[Role::Department, Role::Admin];
pub const SUPPORT_ROLES: &[Role] = &[Role::Support, Role::Department, Role::Admin];

/// Pure membership test, evaluated only after token verification.
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Bu işleme yetkiniz yok.".to_string()))
    }
}
