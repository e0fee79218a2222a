//! Thin request builder shared by every call to the hosted backend.

use base64::prelude::*;
use rand::RngCore;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message", alias = "error_description")]
    error: String,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request with bearer auth. Mutating methods also carry a fresh idempotency key.
    pub fn request(
        &self,
        method: reqwest::Method,
        url: String,
        bearer_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method.clone(), url);

        if is_mutating(&method) {
            builder = builder.header("idempotency-key", idempotency_key());
        }

        if let Some(token) = bearer_token {
            builder = builder.bearer_auth(token);
        }

        builder
    }
}

fn is_mutating(method: &reqwest::Method) -> bool {
    matches!(
        method,
        &reqwest::Method::POST
            | &reqwest::Method::PUT
            | &reqwest::Method::PATCH
            | &reqwest::Method::DELETE
    )
}

pub fn idempotency_key() -> String {
    let mut bytes = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Status code and human-readable message of a failed response.
///
/// Prefers the `error` field of a JSON body, then the raw body, then the
/// canonical reason phrase.
pub async fn failure(resp: reqwest::Response) -> (u16, String) {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    (status.as_u16(), failure_message(status, &body))
}

pub(crate) fn failure_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
