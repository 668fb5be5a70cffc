use std::env;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use storage::Bundle;

use crate::error::IdentityError;

/// Snapshot of the authenticated visitor, as reported by the identity
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Plan attribute from identity metadata (e.g. "free", "premium").
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub subscription_active: bool,
}

impl User {
    /// Whether identity metadata marks this user as paying.
    #[must_use]
    pub fn has_paid_plan(&self) -> bool {
        self.subscription_active || matches!(self.plan.as_deref(), Some("premium" | "pro"))
    }
}

/// What caused a progress push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    AnswerRecorded,
    TierChanged,
    SignIn,
}

impl SyncTrigger {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnswerRecorded => "answer-recorded",
            Self::TierChanged => "tier-changed",
            Self::SignIn => "sign-in",
        }
    }
}

/// The external identity/sync collaborator.
///
/// All calls are best-effort from the engine's point of view: background
/// push/pull failures are swallowed by the sync bridge, and only the
/// sign-in-link dispatch the visitor directly triggered surfaces an error.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// The cached auth snapshot, if any. Synchronous by design so tier
    /// resolution never blocks on the network.
    fn current_user(&self) -> Option<User>;

    /// Refresh the cached auth snapshot from the server.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` when the refresh request fails.
    async fn refresh_current_user(&self) -> Result<(), IdentityError>;

    /// Dispatch a passwordless sign-in link to `email`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` when the service rejects the address or the
    /// request fails.
    async fn send_sign_in_link(&self, email: &str, redirect_to: &str) -> Result<(), IdentityError>;

    /// Push a full progress snapshot to the server.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` when the request fails or is not
    /// acknowledged.
    async fn sync_to_server(
        &self,
        trigger: SyncTrigger,
        snapshot: &Bundle,
    ) -> Result<(), IdentityError>;

    /// Pull the server-held progress snapshot, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` when the request fails.
    async fn sync_from_server(&self) -> Result<Option<Bundle>, IdentityError>;
}

#[derive(Clone, Debug)]
pub struct HttpIdentityConfig {
    pub base_url: String,
    pub api_key: String,
    /// Per-request timeout; expired requests count as ordinary failures.
    pub timeout: Duration,
}

impl HttpIdentityConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("PRACTICE_SYNC_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("PRACTICE_SYNC_BASE_URL")
            .unwrap_or_else(|_| "https://sync.example.com/v1".into());
        Some(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(10),
        })
    }
}

/// HTTP implementation of the identity/sync collaborator.
#[derive(Clone)]
pub struct HttpIdentityGateway {
    client: Client,
    config: Option<HttpIdentityConfig>,
    cached_user: Arc<Mutex<Option<User>>>,
}

impl HttpIdentityGateway {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(HttpIdentityConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<HttpIdentityConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
            cached_user: Arc::new(Mutex::new(None)),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&HttpIdentityConfig, IdentityError> {
        self.config.as_ref().ok_or(IdentityError::Disabled)
    }

    fn endpoint(config: &HttpIdentityConfig, path: &str) -> String {
        format!("{}/{path}", config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl IdentityGateway for HttpIdentityGateway {
    fn current_user(&self) -> Option<User> {
        self.cached_user.lock().ok().and_then(|guard| guard.clone())
    }

    async fn refresh_current_user(&self) -> Result<(), IdentityError> {
        let config = self.config()?;
        let response = self
            .client
            .get(Self::endpoint(config, "me"))
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::HttpStatus(response.status()));
        }

        let body: CurrentUserResponse = response.json().await?;
        if let Ok(mut guard) = self.cached_user.lock() {
            *guard = body.user;
        }
        Ok(())
    }

    async fn send_sign_in_link(&self, email: &str, redirect_to: &str) -> Result<(), IdentityError> {
        let config = self.config()?;
        let payload = SignInLinkRequest { email, redirect_to };
        let response = self
            .client
            .post(Self::endpoint(config, "auth/link"))
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::HttpStatus(response.status()));
        }

        let body: AckResponse = response.json().await?;
        if !body.accepted() {
            return Err(IdentityError::Rejected(
                body.error.unwrap_or_else(|| "sign-in link not accepted".into()),
            ));
        }
        Ok(())
    }

    async fn sync_to_server(
        &self,
        trigger: SyncTrigger,
        snapshot: &Bundle,
    ) -> Result<(), IdentityError> {
        let config = self.config()?;
        let payload = PushRequest {
            trigger: trigger.as_str(),
            snapshot,
        };
        let response = self
            .client
            .post(Self::endpoint(config, "progress"))
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::HttpStatus(response.status()));
        }

        let body: AckResponse = response.json().await?;
        if !body.accepted() {
            return Err(IdentityError::Rejected(
                body.error.unwrap_or_else(|| "push not acknowledged".into()),
            ));
        }
        Ok(())
    }

    async fn sync_from_server(&self) -> Result<Option<Bundle>, IdentityError> {
        let config = self.config()?;
        let response = self
            .client
            .get(Self::endpoint(config, "progress"))
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(IdentityError::HttpStatus(response.status()));
        }

        let body: PullResponse = response.json().await?;
        Ok(body.snapshot)
    }
}

#[derive(Debug, Serialize)]
struct SignInLinkRequest<'a> {
    email: &'a str,
    redirect_to: &'a str,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    trigger: &'static str,
    snapshot: &'a Bundle,
}

/// The service answers with either `ok` or `success` depending on endpoint
/// generation; either being true counts as acknowledged.
#[derive(Debug, Deserialize)]
struct AckResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl AckResponse {
    fn accepted(&self) -> bool {
        self.ok || self.success
    }
}

#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    snapshot: Option<Bundle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_metadata_marks_paid_users() {
        let user = User {
            id: "u1".into(),
            email: None,
            plan: Some("premium".into()),
            subscription_active: false,
        };
        assert!(user.has_paid_plan());

        let user = User {
            id: "u2".into(),
            email: None,
            plan: Some("free".into()),
            subscription_active: false,
        };
        assert!(!user.has_paid_plan());
    }

    #[test]
    fn unconfigured_gateway_is_disabled() {
        let gateway = HttpIdentityGateway::new(None);
        assert!(!gateway.enabled());
        assert_eq!(gateway.current_user(), None);
    }

    #[test]
    fn ack_accepts_either_flag() {
        let ok: AckResponse = serde_json::from_str("{\"ok\":true}").unwrap();
        assert!(ok.accepted());
        let success: AckResponse = serde_json::from_str("{\"success\":true}").unwrap();
        assert!(success.accepted());
        let neither: AckResponse = serde_json::from_str("{}").unwrap();
        assert!(!neither.accepted());
    }
}
