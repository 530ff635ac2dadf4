use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// SignUp
///
/// The account the identity provider is asked to create. The provider owns
/// credentials and sends the verification email; we only keep the profile.
#[derive(Debug, Clone, Serialize)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// IdentityProvider
///
/// Contract with the external authentication service. Swappable between the
/// HTTP client in production and `MockIdentityProvider` in tests.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates the account upstream and returns the id the provider assigned.
    /// That id becomes the local profile id and the JWT subject, so the
    /// provider must issue UUID user ids.
    async fn sign_up(&self, request: &SignUp) -> AppResult<Uuid>;
}

/// IdentityProviderState
///
/// The concrete type used to share the identity provider across the application state.
pub type IdentityProviderState = Arc<dyn IdentityProvider>;

#[derive(Deserialize)]
struct SignUpResponse {
    user: ProviderUser,
}

#[derive(Deserialize)]
struct ProviderUser {
    id: String,
}

/// HttpIdentityProvider
///
/// Calls `POST {auth_url}/sign-up/email` on the identity provider.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    auth_url: String,
    api_key: String,
}

impl HttpIdentityProvider {
    pub fn new(auth_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_up(&self, request: &SignUp) -> AppResult<Uuid> {
        let response = self
            .client
            .post(format!("{}/sign-up/email", self.auth_url))
            .header("apikey", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            // Duplicate email, weak password... The body is provider-internal.
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "identity provider rejected sign-up");
            return Err(AppError::Validation(
                "sign-up rejected by identity provider".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "identity provider returned {status}"
            )));
        }

        let body = response.json::<SignUpResponse>().await?;
        Uuid::parse_str(&body.user.id).map_err(|_| {
            AppError::Upstream(format!(
                "identity provider issued non-UUID user id {:?}",
                body.user.id
            ))
        })
    }
}

/// MockIdentityProvider
///
/// In-process provider for tests: assigns random ids and remembers which
/// emails signed up.
#[derive(Default)]
pub struct MockIdentityProvider {
    /// When true, every sign-up fails with an upstream error.
    pub should_fail: bool,
    signed_up: Mutex<Vec<String>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn signed_up_emails(&self) -> Vec<String> {
        self.signed_up
            .lock()
            .map(|emails| emails.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(&self, request: &SignUp) -> AppResult<Uuid> {
        if self.should_fail {
            return Err(AppError::Upstream(
                "mock identity provider: simulated failure".to_string(),
            ));
        }
        if let Ok(mut emails) = self.signed_up.lock() {
            emails.push(request.email.clone());
        }
        Ok(Uuid::new_v4())
    }
}
