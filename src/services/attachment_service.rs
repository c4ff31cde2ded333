// taskboard-service/src/services/attachment_service.rs
use crate::config::AttachmentPolicy;
use crate::models::{Attachment, AttachmentView, Identity, SaveFileRequest, ServiceError};
use crate::services::authorization::can_mutate_task;
use crate::utils::blob_storage::BlobStorage;
use crate::utils::document_store::{Collections, DocumentStore};
use chrono::{DateTime, Utc};
use log::{error, info};
use uuid::Uuid;

pub fn request_upload_slot(blobs: &BlobStorage, identity: &Identity) -> Result<String, ServiceError> {
    identity.require_user()?;
    blobs.generate_upload_url()
}

// With `AuthenticatedOnly`, any signed-in user may attach to any existing task.
pub fn attach_file(
    store: &DocumentStore,
    identity: &Identity,
    task_id: &str,
    request: SaveFileRequest,
    policy: AttachmentPolicy,
    now: DateTime<Utc>,
) -> Result<Attachment, ServiceError> {
    let user_id = identity.require_user()?;

    if request.storage_id.trim().is_empty() {
        return Err(ServiceError::BadRequest("storageId must not be empty".to_string()));
    }

    store.transaction(|db| {
        if db.get_task(task_id).is_none() {
            return Err(ServiceError::NotFound);
        }
        check_policy(db, identity, task_id, policy)?;

        let attachment = Attachment {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.to_string(),
            storage_id: request.storage_id,
            name: request.file_name,
            mime_type: request.mime_type,
            created_at: now,
        };

        db.insert_file(attachment.clone());
        info!("📎 File {} attached to task: {} by user: {}", attachment.id, task_id, user_id);
        Ok(attachment)
    })
}

pub fn list_attachments(
    store: &DocumentStore,
    blobs: &BlobStorage,
    identity: &Identity,
    task_id: &str,
) -> Result<Vec<AttachmentView>, ServiceError> {
    if identity.user_id().is_none() {
        return Ok(Vec::new());
    }

    let attachments: Vec<Attachment> =
        store.read(|db| db.files_by_task(task_id).cloned().collect())?;

    Ok(attachments
        .into_iter()
        .map(|attachment| AttachmentView {
            url: blobs.get_url(&attachment.storage_id),
            attachment,
        })
        .collect())
}

// Removes the blob, then the record
pub fn delete_attachment(
    store: &DocumentStore,
    blobs: &BlobStorage,
    identity: &Identity,
    file_id: &str,
    policy: AttachmentPolicy,
) -> Result<(), ServiceError> {
    let user_id = identity.require_user()?;

    let attachment = store.read(|db| -> Result<Attachment, ServiceError> {
        let attachment = db.get_file(file_id).ok_or(ServiceError::NotFound)?;
        check_policy(db, identity, &attachment.task_id, policy)?;
        Ok(attachment.clone())
    })??;

    blobs.delete(&attachment.storage_id)?;

    store.transaction(|db| {
        db.delete_file(file_id);
        Ok(())
    })?;

    info!("🗑️ File {} deleted by user: {}", file_id, user_id);
    Ok(())
}

fn check_policy(
    db: &Collections,
    identity: &Identity,
    task_id: &str,
    policy: AttachmentPolicy,
) -> Result<(), ServiceError> {
    match policy {
        AttachmentPolicy::AuthenticatedOnly => Ok(()),
        AttachmentPolicy::TaskMutators => match db.get_task(task_id) {
            // Attachments of a deleted task are orphans anyone may clean up
            None => Ok(()),
            Some(task) if can_mutate_task(identity, task, db) => Ok(()),
            Some(_) => {
                error!("❌ {:?} may not change files of task: {}", identity, task_id);
                Err(ServiceError::Unauthorized)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateTaskRequest, Priority, Task};
    use crate::services::task_service;
    use std::path::PathBuf;

    struct Fixture {
        dir: PathBuf,
        store: DocumentStore,
        blobs: BlobStorage,
        task: Task,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn fixture() -> Fixture {
        let dir = std::env::temp_dir().join(format!("taskboard-files-{}", Uuid::new_v4()));
        let blobs = BlobStorage::new(&dir, "http://localhost").unwrap();
        let store = DocumentStore::in_memory();
        let task = task_service::create_task(
            &store,
            &Identity::user("alice"),
            CreateTaskRequest {
                title: "Taxes".to_string(),
                description: None,
                due_date: None,
                priority: Priority::High,
                category: "home".to_string(),
                team_id: None,
                color: None,
                tagged_users: None,
            },
            Utc::now(),
        )
        .unwrap();

        Fixture {
            dir,
            store,
            blobs,
            task,
        }
    }

    fn upload(f: &Fixture, identity: &Identity) -> String {
        let url = request_upload_slot(&f.blobs, identity).unwrap();
        let slot = url.rsplit('/').next().unwrap();
        f.blobs.store_upload(slot, b"%PDF", Some("application/pdf")).unwrap()
    }

    fn save_request(storage_id: String) -> SaveFileRequest {
        SaveFileRequest {
            storage_id,
            file_name: "return.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
        }
    }

    #[test]
    fn test_attach_and_list() {
        let f = fixture();
        let alice = Identity::user("alice");
        let storage_id = upload(&f, &alice);

        let attachment = attach_file(
            &f.store,
            &alice,
            &f.task.id,
            save_request(storage_id.clone()),
            AttachmentPolicy::AuthenticatedOnly,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(attachment.mime_type, "application/pdf");

        let listed = list_attachments(&f.store, &f.blobs, &alice, &f.task.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(
            listed[0].url,
            Some(format!("http://localhost/blobs/{}", storage_id))
        );

        assert!(list_attachments(&f.store, &f.blobs, &Identity::Anonymous, &f.task.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_upload_requires_authentication() {
        let f = fixture();
        assert_eq!(
            request_upload_slot(&f.blobs, &Identity::Anonymous),
            Err(ServiceError::Unauthenticated)
        );
    }

    #[test]
    fn test_default_policy_allows_any_user() {
        let f = fixture();
        let mallory = Identity::user("mallory");
        let storage_id = upload(&f, &mallory);

        let attachment = attach_file(
            &f.store,
            &mallory,
            &f.task.id,
            save_request(storage_id.clone()),
            AttachmentPolicy::AuthenticatedOnly,
            Utc::now(),
        )
        .unwrap();

        delete_attachment(
            &f.store,
            &f.blobs,
            &mallory,
            &attachment.id,
            AttachmentPolicy::AuthenticatedOnly,
        )
        .unwrap();
        assert_eq!(f.blobs.get_url(&storage_id), None);
        assert_eq!(f.store.read(|db| db.files.len()).unwrap(), 0);
    }

    #[test]
    fn test_strict_policy_requires_task_rights() {
        let f = fixture();
        let alice = Identity::user("alice");
        let mallory = Identity::user("mallory");
        let storage_id = upload(&f, &mallory);

        assert_eq!(
            attach_file(
                &f.store,
                &mallory,
                &f.task.id,
                save_request(storage_id.clone()),
                AttachmentPolicy::TaskMutators,
                Utc::now(),
            ),
            Err(ServiceError::Unauthorized)
        );

        let attachment = attach_file(
            &f.store,
            &alice,
            &f.task.id,
            save_request(storage_id.clone()),
            AttachmentPolicy::TaskMutators,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            delete_attachment(&f.store, &f.blobs, &mallory, &attachment.id, AttachmentPolicy::TaskMutators),
            Err(ServiceError::Unauthorized)
        );
        assert!(f.blobs.get_url(&storage_id).is_some());
    }

    #[test]
    fn test_missing_targets() {
        let f = fixture();
        let alice = Identity::user("alice");

        assert_eq!(
            attach_file(
                &f.store,
                &alice,
                "no-such-task",
                save_request(Uuid::new_v4().to_string()),
                AttachmentPolicy::AuthenticatedOnly,
                Utc::now(),
            ),
            Err(ServiceError::NotFound)
        );
        assert_eq!(
            delete_attachment(&f.store, &f.blobs, &alice, "no-such-file", AttachmentPolicy::AuthenticatedOnly),
            Err(ServiceError::NotFound)
        );
    }
}
