// taskboard-service/src/state.rs
use crate::config::AppConfig;
use crate::utils::blob_storage::BlobStorage;
use crate::utils::document_store::DocumentStore;

// Shared handles given to every route through `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub blobs: BlobStorage,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> std::io::Result<Self> {
        let store = DocumentStore::open(&config.storage_dir)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        let blobs = BlobStorage::new(&config.storage_dir, &config.public_base_url)?;

        Ok(Self {
            store,
            blobs,
            config,
        })
    }
}
