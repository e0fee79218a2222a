//! Sign-in against the hosted backend and the "identity changed" signal.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::AuthError;
use crate::http_client::{self, HttpClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Identity),
    /// Account created; the backend wants the email confirmed before issuing a session.
    ConfirmationRequired,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    fn current_identity(&self) -> Option<Identity>;
    /// Receives a new value whenever someone signs in or out.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<UserResponse>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// `Ok(None)` when the response is well formed but carries no session.
fn parse_session(body: &str) -> Result<Option<Identity>, AuthError> {
    let resp: SessionResponse =
        serde_json::from_str(body).map_err(|e| AuthError::BadResponse(e.to_string()))?;
    let Some(access_token) = resp.access_token else {
        return Ok(None);
    };
    let user = resp
        .user
        .ok_or_else(|| AuthError::BadResponse("session without user".into()))?;
    Ok(Some(Identity {
        user_id: user.id,
        email: user.email,
        access_token,
        refresh_token: resp.refresh_token,
    }))
}

pub struct HttpAuthProvider {
    http: HttpClient,
    state: watch::Sender<Option<Identity>>,
}

impl HttpAuthProvider {
    pub fn new(http: HttpClient) -> Self {
        Self::with_identity(http, None)
    }

    /// Resume a session stored from an earlier sign-in.
    pub fn with_identity(http: HttpClient, identity: Option<Identity>) -> Self {
        let (state, _) = watch::channel(identity);
        Self { http, state }
    }

    async fn post_credentials(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, AuthError> {
        let resp = self
            .http
            .request(reqwest::Method::POST, self.http.endpoint(path), None)
            .json(&Credentials { email, password })
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = http_client::failure(resp).await;
            return Err(AuthError::Remote { status, message });
        }
        let body = resp.text().await?;
        parse_session(&body)
    }

    fn publish(&self, identity: Option<Identity>) {
        let changed = *self.state.borrow() != identity;
        if changed {
            tracing::info!(
                user = identity.as_ref().map(|i| i.user_id.as_str()).unwrap_or("-"),
                "identity changed"
            );
            self.state.send_replace(identity);
        }
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        match self.post_credentials("/v1/auth/signup", email, password).await? {
            Some(identity) => {
                self.publish(Some(identity.clone()));
                Ok(SignUpOutcome::SignedIn(identity))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self
            .post_credentials("/v1/auth/token", email, password)
            .await?
            .ok_or_else(|| AuthError::BadResponse("sign-in returned no session".into()))?;
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(identity) = self.current_identity() else {
            return Err(AuthError::NotSignedIn);
        };
        let resp = self
            .http
            .request(
                reqwest::Method::POST,
                self.http.endpoint("/v1/auth/logout"),
                Some(&identity.access_token),
            )
            .send()
            .await;
        // The local session ends even when the backend cannot be reached.
        self.publish(None);
        let resp = resp?;
        if !resp.status().is_success() {
            let (status, message) = http_client::failure(resp).await;
            tracing::warn!(status, %message, "backend rejected sign-out");
        }
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}
