// taskboard-service/src/services/task_service.rs
use crate::models::{
    CreateTaskRequest, Identity, ServiceError, SortBy, Task, TaskFilter, TaskScope,
    UpdateTaskRequest,
};
use crate::services::authorization::{
    can_complete_task, can_delete_task, can_mutate_task, can_read_task_list,
};
use crate::utils::blob_storage::BlobStorage;
use crate::utils::document_store::{Collections, DocumentStore, TaskIndex};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

// List tasks visible under `scope`, filtered and sorted.
// Anonymous callers get an empty list; a team scope the caller is not in is an error.
pub fn list_tasks(
    store: &DocumentStore,
    identity: &Identity,
    scope: &TaskScope,
    filter: &TaskFilter,
) -> Result<Vec<Task>, ServiceError> {
    let Some(user_id) = identity.user_id() else {
        return Ok(Vec::new());
    };

    store.read(|db| query_tasks(db, identity, user_id, scope, filter))?
}

fn query_tasks(
    db: &Collections,
    identity: &Identity,
    user_id: &str,
    scope: &TaskScope,
    filter: &TaskFilter,
) -> Result<Vec<Task>, ServiceError> {
    if !can_read_task_list(identity, scope, db) {
        error!("❌ User: {} is not a member of {:?}", user_id, scope);
        return Err(ServiceError::Unauthorized);
    }

    let index = match scope {
        TaskScope::Personal => TaskIndex::ByUser(user_id),
        TaskScope::Team(team_id) => TaskIndex::ByTeam(team_id),
    };

    let candidates = match filter.search_text() {
        Some(text) => db.search_tasks(text, index),
        None => db.tasks_by_index(index),
    };

    let mut tasks: Vec<Task> = candidates
        .into_iter()
        .filter(|task| filter.accepts(task))
        .cloned()
        .collect();

    sort_tasks(&mut tasks, filter.sort_by);
    Ok(tasks)
}

// All sorts are stable, so equal keys keep retrieval order.
pub fn sort_tasks(tasks: &mut [Task], sort_by: SortBy) {
    match sort_by {
        // Tasks without a due date go last
        SortBy::DueDate => tasks.sort_by_key(|t| (t.due_date.is_none(), t.due_date)),
        SortBy::Priority => tasks.sort_by_key(|t| Reverse(t.priority.rank())),
        SortBy::Created => tasks.sort_by_key(|t| Reverse(t.created_at)),
    }
}

// Distinct categories of the visible tasks, ascending.
// Anonymous callers get an empty list; non-members of a team scope get `Unauthorized`.
pub fn list_categories(
    store: &DocumentStore,
    identity: &Identity,
    scope: &TaskScope,
) -> Result<Vec<String>, ServiceError> {
    let Some(user_id) = identity.user_id() else {
        return Ok(Vec::new());
    };

    store.read(|db| -> Result<Vec<String>, ServiceError> {
        let tasks = query_tasks(db, identity, user_id, scope, &TaskFilter::default())?;
        let categories: BTreeSet<String> = tasks.into_iter().map(|t| t.category).collect();
        Ok(categories.into_iter().collect())
    })?
}

pub fn create_task(
    store: &DocumentStore,
    identity: &Identity,
    request: CreateTaskRequest,
    now: DateTime<Utc>,
) -> Result<Task, ServiceError> {
    let user_id = identity.require_user()?;

    if request.title.trim().is_empty() {
        return Err(ServiceError::BadRequest("Task title must not be empty".to_string()));
    }

    let scope = TaskScope::from_team_id(request.team_id);

    store.transaction(|db| {
        if let TaskScope::Team(team_id) = &scope {
            if !db.is_member(team_id, user_id) {
                error!("❌ User: {} cannot create tasks in team: {}", user_id, team_id);
                return Err(ServiceError::Unauthorized);
            }
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            description: request.description,
            due_date: request.due_date,
            priority: request.priority,
            category: request.category,
            completed: false,
            user_id: user_id.to_string(),
            scope,
            color: request.color,
            tagged_users: dedup_users(request.tagged_users.unwrap_or_default()),
            created_at: now,
        };

        db.insert_task(task.clone());
        info!("✅ Task created: {} by user: {}", task.id, user_id);
        Ok(task)
    })
}

pub fn update_task(
    store: &DocumentStore,
    identity: &Identity,
    task_id: &str,
    patch: UpdateTaskRequest,
) -> Result<Task, ServiceError> {
    let user_id = identity.require_user()?;

    if patch.title.as_deref().map_or(false, |t| t.trim().is_empty()) {
        return Err(ServiceError::BadRequest("Task title must not be empty".to_string()));
    }

    store.transaction(|db| {
        let task = db.get_task(task_id).ok_or(ServiceError::NotFound)?;
        if !can_mutate_task(identity, task, &*db) {
            error!("❌ User: {} cannot modify task: {}", user_id, task_id);
            return Err(ServiceError::Unauthorized);
        }

        let task = db.get_task_mut(task_id).ok_or(ServiceError::NotFound)?;
        apply_patch(task, patch);

        info!("✅ Task updated: {} by user: {}", task_id, user_id);
        Ok(task.clone())
    })
}

fn apply_patch(task: &mut Task, patch: UpdateTaskRequest) {
    if let Some(title) = patch.title {
        task.title = title;
    }
    if let Some(description) = patch.description {
        task.description = Some(description);
    }
    if let Some(due_date) = patch.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(category) = patch.category {
        task.category = category;
    }
    if let Some(color) = patch.color {
        task.color = Some(color);
    }
    if let Some(tagged_users) = patch.tagged_users {
        task.tagged_users = dedup_users(tagged_users);
    }
}

// Deletes the task and every attachment referencing it. Blobs are removed first
// (best effort); the attachment records and the task record then go in one
// transaction, attachments before the task.
pub fn delete_task(
    store: &DocumentStore,
    blobs: &BlobStorage,
    identity: &Identity,
    task_id: &str,
) -> Result<(), ServiceError> {
    let user_id = identity.require_user()?;

    let storage_ids = store.read(|db| -> Result<Vec<String>, ServiceError> {
        let task = db.get_task(task_id).ok_or(ServiceError::NotFound)?;
        if !can_delete_task(identity, task, db) {
            error!("❌ User: {} cannot delete task: {}", user_id, task_id);
            return Err(ServiceError::Unauthorized);
        }
        Ok(db
            .files_by_task(task_id)
            .map(|f| f.storage_id.clone())
            .collect())
    })??;

    for storage_id in &storage_ids {
        delete_blob_best_effort(blobs, storage_id);
    }

    let removed = store.transaction(|db| {
        let task = db.get_task(task_id).ok_or(ServiceError::NotFound)?;
        if !can_delete_task(identity, task, &*db) {
            return Err(ServiceError::Unauthorized);
        }

        let file_ids: Vec<String> = db.files_by_task(task_id).map(|f| f.id.clone()).collect();
        let removed: Vec<_> = file_ids
            .iter()
            .filter_map(|file_id| db.delete_file(file_id))
            .collect();

        db.delete_task(task_id);
        Ok(removed)
    })?;

    // Attachments added while the blobs above were being removed
    let already_deleted: HashSet<&String> = storage_ids.iter().collect();
    for file in removed.iter().filter(|f| !already_deleted.contains(&f.storage_id)) {
        delete_blob_best_effort(blobs, &file.storage_id);
    }

    info!(
        "🗑️ Task deleted: {} with {} attachment(s) by user: {}",
        task_id,
        removed.len(),
        user_id
    );
    Ok(())
}

fn delete_blob_best_effort(blobs: &BlobStorage, storage_id: &str) {
    if let Err(e) = blobs.delete(storage_id) {
        warn!("Failed to delete blob {} during cascade: {}", storage_id, e);
    }
}

pub fn toggle_task_complete(
    store: &DocumentStore,
    identity: &Identity,
    task_id: &str,
) -> Result<Task, ServiceError> {
    let user_id = identity.require_user()?;

    store.transaction(|db| {
        let task = db.get_task_mut(task_id).ok_or(ServiceError::NotFound)?;
        if !can_complete_task(identity, task) {
            error!("❌ User: {} cannot complete task: {}", user_id, task_id);
            return Err(ServiceError::Unauthorized);
        }

        task.completed = !task.completed;
        debug!("Task {} completed={}", task_id, task.completed);
        Ok(task.clone())
    })
}

fn dedup_users(users: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    users
        .into_iter()
        .filter(|user| seen.insert(user.clone()))
        .collect()
}
