use uuid::Uuid;

use crate::{
    auth::AuthUser,
    config::AdminSeed,
    error::{AppError, AppResult},
    guard::{require_admin, require_identity},
    identity::{IdentityProviderState, SignUp},
    models::{
        NewUser, RegisterUserRequest, UpdateProfileRequest, UpdateUserRequest, User, UserRole,
    },
    repository::RepositoryState,
};

/// UserService
///
/// Registration (mirrored from the identity provider), self-service profile
/// edits, and admin account management.
#[derive(Clone)]
pub struct UserService {
    repo: RepositoryState,
    identity: IdentityProviderState,
}

impl UserService {
    pub fn new(repo: RepositoryState, identity: IdentityProviderState) -> Self {
        Self { repo, identity }
    }

    /// register_user
    ///
    /// Signs the account up upstream, then creates the local profile with the
    /// provider's id. Self-registered accounts are always `USER`.
    pub async fn register_user(&self, req: RegisterUserRequest) -> AppResult<User> {
        self.create_account(
            SignUp {
                name: req.name,
                email: req.email,
                password: req.password,
            },
            UserRole::User,
            req.phone,
        )
        .await
    }

    async fn create_account(
        &self,
        sign_up: SignUp,
        role: UserRole,
        phone: Option<String>,
    ) -> AppResult<User> {
        let email = sign_up.email.trim().to_string();
        if sign_up.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        if !email.contains('@') {
            return Err(AppError::Validation("email is invalid".to_string()));
        }
        if sign_up.password.len() < 8 {
            return Err(AppError::Validation(
                "password must be at least 8 characters".to_string(),
            ));
        }
        if self.repo.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("user already exists".to_string()));
        }

        let id = self
            .identity
            .sign_up(&SignUp {
                email: email.clone(),
                ..sign_up.clone()
            })
            .await?;
        let user = self
            .repo
            .create_user(NewUser {
                id,
                name: sign_up.name.trim().to_string(),
                email,
                role,
                phone,
            })
            .await
            .inspect_err(|err| {
                // The upstream account exists but has no local profile.
                tracing::error!(user_id = %id, error = %err, "orphaned identity provider account");
            })?;
        tracing::info!(user_id = %user.id, role = ?user.role, "account created");
        Ok(user)
    }

    pub async fn get_me(&self, actor: Option<&AuthUser>) -> AppResult<User> {
        let actor = require_identity(actor)?;
        self.repo
            .get_user(actor.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", actor.id)))
    }

    /// update_me
    ///
    /// Name and phone only; role and status are admin-managed.
    pub async fn update_me(
        &self,
        actor: Option<&AuthUser>,
        req: UpdateProfileRequest,
    ) -> AppResult<User> {
        let actor = require_identity(actor)?;
        if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        self.repo
            .update_profile(actor.id, req)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", actor.id)))
    }

    pub async fn list_users(&self, actor: Option<&AuthUser>) -> AppResult<Vec<User>> {
        require_admin(actor).into_result()?;
        self.repo.list_users().await
    }

    /// update_user
    ///
    /// Admin-only role/status change. An admin cannot demote or deactivate
    /// their own account.
    pub async fn update_user(
        &self,
        actor: Option<&AuthUser>,
        id: Uuid,
        req: UpdateUserRequest,
    ) -> AppResult<User> {
        require_admin(actor).into_result()?;
        if actor.is_some_and(|a| a.id == id) && (req.role.is_some() || req.status.is_some()) {
            return Err(AppError::Validation(
                "administrators cannot change their own role or status".to_string(),
            ));
        }
        let user = self
            .repo
            .update_user(id, req)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
        tracing::info!(user_id = %id, role = ?user.role, status = ?user.status, "account updated by admin");
        Ok(user)
    }

    /// seed_admin
    ///
    /// Bootstraps the administrator account. An existing account with the same
    /// email is a conflict; nothing is created upstream in that case.
    pub async fn seed_admin(&self, seed: &AdminSeed) -> AppResult<User> {
        self.create_account(
            SignUp {
                name: seed.name.clone(),
                email: seed.email.clone(),
                password: seed.password.clone(),
            },
            UserRole::Admin,
            None,
        )
        .await
    }
}
