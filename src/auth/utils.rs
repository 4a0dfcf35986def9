use crate::{
    auth::Identity,
    errors::{AppError, AppResult},
};

pub fn require_admin(identity: &Identity) -> AppResult<()> {
    if !identity.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can perform this action".to_string(),
        ));
    }
    Ok(())
}

/// Strict ownership: admins do not bypass this check.
pub fn require_owner(identity: &Identity, resource_owner: i64) -> AppResult<()> {
    if identity.user_id != resource_owner {
        return Err(AppError::Forbidden(
            "You do not have permission to access this attempt".to_string(),
        ));
    }
    Ok(())
}

pub fn require_owner_or_admin(identity: &Identity, resource_owner: i64) -> AppResult<()> {
    if !identity.is_admin() && identity.user_id != resource_owner {
        return Err(AppError::Forbidden(
            "You can only access your own resources".to_string(),
        ));
    }
    Ok(())
}
