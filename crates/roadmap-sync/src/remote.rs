//! Multi-document storage on the hosted backend, one row per roadmap and owner.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use roadmap_core::snapshot::MilestoneSnapshot;
use roadmap_core::{LoadOutcome, Snapshot};

use crate::auth::Identity;
use crate::error::GatewayError;
use crate::gateway::{DocumentId, DocumentSummary, PersistenceGateway, SaveMode, SaveReceipt};
use crate::http_client::{self, HttpClient};

const ROADMAPS_PATH: &str = "/v1/roadmaps";

/// Which stored row the next save updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentBinding {
    /// Next save inserts a new row.
    Unbound,
    Bound(DocumentId),
    /// A write succeeded but its id never came back. The next save looks the
    /// row up by title before deciding between update and insert.
    Unresolved { title: String },
}

#[derive(Debug)]
struct RemoteState {
    binding: DocumentBinding,
    /// Identity the binding belongs to. A different identity starts unbound.
    owner: Option<String>,
    purpose: String,
}

#[derive(Debug, Serialize)]
struct RowWrite<'a> {
    owner_identity: &'a str,
    title: &'a str,
    purpose: &'a str,
    roadmap_data: &'a [MilestoneSnapshot],
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Row {
    title: String,
    #[serde(default)]
    roadmap_data: Value,
}

#[derive(Debug, Deserialize)]
struct SummaryRow {
    id: Value,
    title: String,
    created_at: DateTime<Utc>,
}

pub struct RemoteGateway {
    http: HttpClient,
    identity: watch::Receiver<Option<Identity>>,
    state: Mutex<RemoteState>,
}

impl RemoteGateway {
    pub fn new(http: HttpClient, identity: watch::Receiver<Option<Identity>>) -> Self {
        Self {
            http,
            identity,
            state: Mutex::new(RemoteState {
                binding: DocumentBinding::Unbound,
                owner: None,
                purpose: String::new(),
            }),
        }
    }

    /// Continue with a binding remembered from an earlier run. `owner` is the
    /// identity it was made under; another identity starts unbound.
    pub fn resume(
        http: HttpClient,
        identity: watch::Receiver<Option<Identity>>,
        binding: DocumentBinding,
        owner: Option<String>,
    ) -> Self {
        let gateway = Self::new(http, identity);
        {
            let mut state = gateway.lock();
            state.binding = binding;
            state.owner = owner;
        }
        gateway
    }

    pub fn binding(&self) -> DocumentBinding {
        self.lock().binding.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn require_identity(&self) -> Result<Identity, GatewayError> {
        let identity = self
            .identity
            .borrow()
            .clone()
            .ok_or(GatewayError::Unauthenticated)?;
        let mut state = self.lock();
        if state.owner.as_deref() != Some(identity.user_id.as_str()) {
            if state.owner.is_some() {
                tracing::debug!("identity changed, dropping document binding");
            }
            state.owner = Some(identity.user_id.clone());
            state.binding = DocumentBinding::Unbound;
        }
        Ok(identity)
    }

    fn set_binding(&self, binding: DocumentBinding) {
        self.lock().binding = binding;
    }

    fn row_url(&self, id: &DocumentId, owner: &str) -> String {
        format!(
            "{}/{}?owner_identity={}",
            self.http.endpoint(ROADMAPS_PATH),
            urlencoding::encode(id.as_str()),
            urlencoding::encode(owner)
        )
    }

    async fn fetch_summaries(
        &self,
        identity: &Identity,
    ) -> Result<Vec<DocumentSummary>, GatewayError> {
        let url = format!(
            "{}?owner_identity={}&select=id,title,created_at&order=created_at.desc",
            self.http.endpoint(ROADMAPS_PATH),
            urlencoding::encode(&identity.user_id)
        );
        let resp = self
            .http
            .request(reqwest::Method::GET, url, Some(&identity.access_token))
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = http_client::failure(resp).await;
            return Err(GatewayError::Remote { status, message });
        }
        let rows: Vec<SummaryRow> = resp.json().await?;
        let mut summaries: Vec<DocumentSummary> = rows
            .into_iter()
            .filter_map(|row| {
                Some(DocumentSummary {
                    id: id_from_value(&row.id)?,
                    title: row.title,
                    created_at: row.created_at,
                })
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    /// Turn an `Unresolved` binding into `Bound` or `Unbound`.
    async fn resolve(&self, identity: &Identity, title: &str) -> Result<DocumentBinding, GatewayError> {
        let summaries = self.fetch_summaries(identity).await?;
        let binding = match summaries.into_iter().find(|s| s.title == title) {
            Some(found) => {
                tracing::info!(id = %found.id, "re-bound to previously written roadmap");
                DocumentBinding::Bound(found.id)
            }
            None => DocumentBinding::Unbound,
        };
        self.set_binding(binding.clone());
        Ok(binding)
    }

    async fn insert(
        &self,
        identity: &Identity,
        body: &RowWrite<'_>,
    ) -> Result<Option<DocumentId>, GatewayError> {
        let resp = self
            .http
            .request(
                reqwest::Method::POST,
                self.http.endpoint(ROADMAPS_PATH),
                Some(&identity.access_token),
            )
            .header("prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = http_client::failure(resp).await;
            return Err(GatewayError::Remote { status, message });
        }
        let text = resp.text().await.unwrap_or_default();
        Ok(inserted_id(&text))
    }

    async fn update(
        &self,
        identity: &Identity,
        id: &DocumentId,
        body: &RowWrite<'_>,
    ) -> Result<(), GatewayError> {
        let resp = self
            .http
            .request(
                reqwest::Method::PATCH,
                self.row_url(id, &identity.user_id),
                Some(&identity.access_token),
            )
            .json(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, message) = http_client::failure(resp).await;
            return Err(GatewayError::Remote { status, message });
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for RemoteGateway {
    async fn save(&self, snapshot: &Snapshot, mode: SaveMode) -> Result<SaveReceipt, GatewayError> {
        let identity = self.require_identity()?;
        let (mut binding, purpose) = {
            let state = self.lock();
            (state.binding.clone(), state.purpose.clone())
        };
        if let DocumentBinding::Unresolved { title } = &binding {
            binding = self.resolve(&identity, title).await?;
        }

        let body = RowWrite {
            owner_identity: &identity.user_id,
            title: &snapshot.roadmap_name,
            purpose: &purpose,
            roadmap_data: &snapshot.milestones,
            updated_at: Utc::now(),
        };

        let id = match binding {
            DocumentBinding::Bound(id) => {
                self.update(&identity, &id, &body).await?;
                Some(id)
            }
            _ => {
                let id = self.insert(&identity, &body).await?;
                match &id {
                    Some(id) => self.set_binding(DocumentBinding::Bound(id.clone())),
                    None => {
                        tracing::warn!("roadmap written but its id was not returned");
                        self.set_binding(DocumentBinding::Unresolved {
                            title: snapshot.roadmap_name.clone(),
                        });
                    }
                }
                id
            }
        };

        tracing::info!(
            %mode,
            id = id.as_ref().map(|i| i.as_str()).unwrap_or("?"),
            "saved roadmap to remote store"
        );
        Ok(SaveReceipt { id, mode })
    }

    async fn load(&self, id: Option<&DocumentId>) -> Result<LoadOutcome, GatewayError> {
        let identity = self.require_identity()?;
        let target = match id {
            Some(id) => id.clone(),
            None => match self.binding() {
                DocumentBinding::Bound(id) => id,
                _ => return Ok(LoadOutcome::NotFound),
            },
        };

        let resp = self
            .http
            .request(
                reqwest::Method::GET,
                self.row_url(&target, &identity.user_id),
                Some(&identity.access_token),
            )
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(LoadOutcome::NotFound);
        }
        if !resp.status().is_success() {
            let (status, message) = http_client::failure(resp).await;
            return Err(GatewayError::Remote { status, message });
        }
        let text = resp.text().await?;
        let outcome = match parse_row(&text) {
            Some(row) => row_outcome(row),
            None => LoadOutcome::Corrupt("unreadable roadmap row".into()),
        };
        if matches!(outcome, LoadOutcome::Loaded(_)) {
            self.set_binding(DocumentBinding::Bound(target));
        }
        Ok(outcome)
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, GatewayError> {
        let identity = self.require_identity()?;
        self.fetch_summaries(&identity).await
    }

    fn detach(&self) {
        self.set_binding(DocumentBinding::Unbound);
    }

    fn set_purpose(&self, purpose: &str) {
        self.lock().purpose = purpose.to_string();
    }
}

fn id_from_value(value: &Value) -> Option<DocumentId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(DocumentId::new(s.clone())),
        Value::Number(n) => Some(DocumentId::new(n.to_string())),
        _ => None,
    }
}

/// Id of an inserted row, from either a single object or a one-element array.
fn inserted_id(body: &str) -> Option<DocumentId> {
    let value: Value = serde_json::from_str(body).ok()?;
    let row = match &value {
        Value::Array(rows) => rows.first()?,
        other => other,
    };
    id_from_value(row.get("id")?)
}

fn parse_row(body: &str) -> Option<Row> {
    let value: Value = serde_json::from_str(body).ok()?;
    let value = match value {
        Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
        Value::Array(_) => return None,
        other => other,
    };
    serde_json::from_value(value).ok()
}

/// The row stores the title and the milestones array separately.
fn row_outcome(row: Row) -> LoadOutcome {
    let value = match row.roadmap_data {
        Value::Array(milestones) => serde_json::json!({
            "roadmapName": row.title,
            "milestones": milestones,
        }),
        Value::Object(mut object) => {
            object
                .entry("roadmapName")
                .or_insert(Value::String(row.title));
            Value::Object(object)
        }
        Value::Null => serde_json::json!({ "roadmapName": row.title }),
        _ => return LoadOutcome::Corrupt("roadmap data is not a list of milestones".into()),
    };
    LoadOutcome::from_value(value)
}
