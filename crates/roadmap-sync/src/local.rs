use async_trait::async_trait;

use roadmap_core::{LoadOutcome, Snapshot};
use roadmap_store::SlotStore;

use crate::error::GatewayError;
use crate::gateway::{DocumentId, DocumentSummary, PersistenceGateway, SaveMode, SaveReceipt};

/// Single-slot storage on the local filesystem. There is one document, so
/// there is nothing to list and no identifier to bind.
pub struct LocalGateway {
    store: SlotStore,
}

impl LocalGateway {
    pub fn new(store: SlotStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SlotStore {
        &self.store
    }
}

#[async_trait]
impl PersistenceGateway for LocalGateway {
    async fn save(&self, snapshot: &Snapshot, mode: SaveMode) -> Result<SaveReceipt, GatewayError> {
        self.store.save_document(snapshot)?;
        tracing::info!(%mode, name = %snapshot.roadmap_name, "saved to local slot");
        Ok(SaveReceipt { id: None, mode })
    }

    async fn load(&self, id: Option<&DocumentId>) -> Result<LoadOutcome, GatewayError> {
        if id.is_some() {
            return Err(GatewayError::Unsupported("loading by id"));
        }
        Ok(self.store.load_document()?)
    }

    async fn list(&self) -> Result<Vec<DocumentSummary>, GatewayError> {
        Err(GatewayError::Unsupported("listing roadmaps"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> (tempfile::TempDir, LocalGateway) {
        let tmp = tempfile::tempdir().unwrap();
        let store = SlotStore::init(tmp.path()).unwrap();
        (tmp, LocalGateway::new(store))
    }

    #[tokio::test]
    async fn save_then_load() {
        let (_tmp, gw) = gateway();
        assert_eq!(gw.load(None).await.unwrap(), LoadOutcome::NotFound);

        let snap = Snapshot::empty("Local");
        let receipt = gw.save(&snap, SaveMode::Auto).await.unwrap();
        assert_eq!(receipt.id, None);
        assert_eq!(gw.load(None).await.unwrap(), LoadOutcome::Loaded(snap));
    }

    #[tokio::test]
    async fn listing_is_unsupported() {
        let (_tmp, gw) = gateway();
        assert!(matches!(gw.list().await, Err(GatewayError::Unsupported(_))));
        let id = DocumentId::new("x");
        assert!(matches!(gw.load(Some(&id)).await, Err(GatewayError::Unsupported(_))));
    }
}
