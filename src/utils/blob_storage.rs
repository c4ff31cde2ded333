// taskboard-service/src/utils/blob_storage.rs
use crate::models::ServiceError;
use log::{debug, error, info, warn};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const BLOBS_DIR: &str = "blobs";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// A stored blob as served back to clients
#[derive(Debug, Clone)]
pub struct Blob {
    pub content: Vec<u8>,
    pub content_type: String,
    pub etag: String,
}

// Binary object store on the local filesystem.
// Uploads go through one-time slots handed out by `generate_upload_url`.
#[derive(Clone)]
pub struct BlobStorage {
    root: PathBuf,
    public_base_url: String,
    upload_slots: Arc<Mutex<HashSet<String>>>,
}

impl BlobStorage {
    pub fn new(storage_dir: &Path, public_base_url: &str) -> std::io::Result<Self> {
        let root = storage_dir.join(BLOBS_DIR);
        if !root.exists() {
            info!("Creating blobs directory");
            fs::create_dir_all(&root)?;
        }

        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            upload_slots: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    // Register a one-time upload target
    pub fn generate_upload_url(&self) -> Result<String, ServiceError> {
        let slot_id = Uuid::new_v4().to_string();
        self.slots()?.insert(slot_id.clone());

        debug!("Issued upload slot {}", slot_id);
        Ok(format!("{}/upload/{}", self.public_base_url, slot_id))
    }

    // Store content for an upload slot and consume it. Returns the new storage id.
    pub fn store_upload(
        &self,
        slot_id: &str,
        content: &[u8],
        content_type: Option<&str>,
    ) -> Result<String, ServiceError> {
        if !self.slots()?.remove(slot_id) {
            warn!("Upload to unknown or used slot: {}", slot_id);
            return Err(ServiceError::NotFound);
        }

        let storage_id = Uuid::new_v4().to_string();
        let blob_path = self.blob_path(&storage_id);

        fs::write(&blob_path, content).map_err(|e| {
            error!("Failed to write blob: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);
        fs::write(self.meta_path(&storage_id), content_type).map_err(|e| {
            error!("Failed to write blob metadata: {:?}", e);
            ServiceError::InternalServerError
        })?;

        info!("✅ Stored blob {} ({} bytes)", storage_id, content.len());
        Ok(storage_id)
    }

    // Retrieval URL for a stored blob, if it exists
    pub fn get_url(&self, storage_id: &str) -> Option<String> {
        if !is_storage_id(storage_id) || !self.blob_path(storage_id).exists() {
            return None;
        }
        Some(format!("{}/blobs/{}", self.public_base_url, storage_id))
    }

    pub fn read(&self, storage_id: &str) -> Result<Blob, ServiceError> {
        if !is_storage_id(storage_id) {
            return Err(ServiceError::NotFound);
        }

        let blob_path = self.blob_path(storage_id);
        if !blob_path.exists() {
            return Err(ServiceError::NotFound);
        }

        let content = fs::read(&blob_path).map_err(|e| {
            error!("Failed to read blob: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let content_type = fs::read_to_string(self.meta_path(storage_id))
            .unwrap_or_else(|_| DEFAULT_CONTENT_TYPE.to_string());

        Ok(Blob {
            etag: content_hash(&content),
            content,
            content_type,
        })
    }

    // Deleting a blob that does not exist is not an error
    pub fn delete(&self, storage_id: &str) -> Result<(), ServiceError> {
        if !is_storage_id(storage_id) {
            warn!("Ignoring delete of malformed storage id: {}", storage_id);
            return Ok(());
        }

        for path in [self.blob_path(storage_id), self.meta_path(storage_id)] {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    error!("Failed to delete blob file {}: {:?}", path.display(), e);
                    ServiceError::InternalServerError
                })?;
            }
        }

        debug!("Deleted blob {}", storage_id);
        Ok(())
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashSet<String>>, ServiceError> {
        self.upload_slots.lock().map_err(|e| {
            error!("Upload slot lock error: {:?}", e);
            ServiceError::InternalServerError
        })
    }

    fn blob_path(&self, storage_id: &str) -> PathBuf {
        self.root.join(storage_id)
    }

    fn meta_path(&self, storage_id: &str) -> PathBuf {
        self.root.join(format!("{}.meta", storage_id))
    }
}

// Storage ids are UUIDs; anything else never touches the filesystem
fn is_storage_id(storage_id: &str) -> bool {
    Uuid::parse_str(storage_id).is_ok()
}

// Hex SHA-256 of the content, used as the ETag
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
