use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    models::UserRole,
};

/// Why a mutation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No resolved identity on the request.
    Unauthenticated,
    /// The actor neither owns the resource nor holds the ADMIN role.
    NotOwner,
    /// The operation requires the ADMIN role.
    NotAdmin,
}

/// Access
///
/// Outcome of an authorization check. Pure data; no side effects happen while
/// computing it, so callers can evaluate it before touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied(DenyReason),
}

impl Access {
    pub fn is_allowed(self) -> bool {
        matches!(self, Access::Allowed)
    }

    /// Converts a denial into the matching `AppError` (401 or 403).
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Access::Allowed => Ok(()),
            Access::Denied(DenyReason::Unauthenticated) => Err(AppError::Unauthorized),
            Access::Denied(DenyReason::NotOwner) => Err(AppError::Forbidden(
                "only the owner or an administrator may modify this resource".to_string(),
            )),
            Access::Denied(DenyReason::NotAdmin) => Err(AppError::Forbidden(
                "administrator role required".to_string(),
            )),
        }
    }
}

/// authorize
///
/// Owner-or-admin check for mutations on a post or comment. A missing actor is
/// denied before the role is looked at.
pub fn authorize(actor: Option<&AuthUser>, owner_id: Uuid) -> Access {
    let Some(actor) = actor else {
        return Access::Denied(DenyReason::Unauthenticated);
    };
    if actor.role == UserRole::Admin || actor.id == owner_id {
        Access::Allowed
    } else {
        Access::Denied(DenyReason::NotOwner)
    }
}

/// require_admin
///
/// Gate for admin-only operations (moderation, stats, user management).
pub fn require_admin(actor: Option<&AuthUser>) -> Access {
    match actor {
        None => Access::Denied(DenyReason::Unauthenticated),
        Some(a) if a.role == UserRole::Admin => Access::Allowed,
        Some(_) => Access::Denied(DenyReason::NotAdmin),
    }
}

/// Returns the actor or `Unauthorized` when the request carries no identity.
pub fn require_identity(actor: Option<&AuthUser>) -> AppResult<&AuthUser> {
    actor.ok_or(AppError::Unauthorized)
}
