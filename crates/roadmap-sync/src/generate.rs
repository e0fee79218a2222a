use roadmap_core::generation::{validate_response, GenerationRequest};
use roadmap_core::Snapshot;

use crate::error::GenerationError;
use crate::http_client::{self, HttpClient};

/// Client for the hosted roadmap generator.
pub struct GenerationClient {
    http: HttpClient,
    url: String,
}

impl GenerationClient {
    pub fn new(http: HttpClient, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Ask for a roadmap describing `description`. The response is validated
    /// in full before anything is returned.
    pub async fn generate(
        &self,
        description: &str,
        bearer_token: Option<&str>,
    ) -> Result<Snapshot, GenerationError> {
        let token = bearer_token.ok_or(GenerationError::Unauthenticated)?;
        tracing::info!(chars = description.len(), "requesting roadmap generation");

        let resp = self
            .http
            .request(reqwest::Method::POST, self.url.clone(), Some(token))
            .json(&GenerationRequest {
                project_description: description.to_string(),
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let (status, message) = http_client::failure(resp).await;
            return Err(GenerationError::Remote { status, message });
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GenerationError::IncompleteData(e.to_string()))?;
        let snapshot =
            validate_response(body).map_err(|e| GenerationError::IncompleteData(e.to_string()))?;
        tracing::debug!(
            name = %snapshot.roadmap_name,
            milestones = snapshot.milestones.len(),
            "generation response accepted"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GenerationClient {
        let http = HttpClient::new(&server.uri());
        let url = http.endpoint("/v1/generate");
        GenerationClient::new(http, url)
    }

    #[tokio::test]
    async fn posts_description_and_returns_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({"projectDescription": "a garden shed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "roadmapName": "Shed",
                "milestones": [{"title": "Foundation", "items": [{"text": "Pour slab", "status": "Not Started"}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let snap = client(&server).generate("a garden shed", Some("tok")).await.unwrap();
        assert_eq!(snap.roadmap_name, "Shed");
        assert_eq!(snap.milestones[0].items[0].text, "Pour slab");
    }

    #[tokio::test]
    async fn error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "Rate limit reached"})))
            .mount(&server)
            .await;

        match client(&server).generate("x", Some("tok")).await {
            Err(GenerationError::Remote { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_shape_is_incomplete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"roadmapName": 3, "milestones": []})))
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server).generate("x", Some("tok")).await,
            Err(GenerationError::IncompleteData(_))
        ));
    }

    #[tokio::test]
    async fn requires_a_token() {
        let server = MockServer::start().await;
        assert!(matches!(
            client(&server).generate("x", None).await,
            Err(GenerationError::Unauthenticated)
        ));
    }
}
