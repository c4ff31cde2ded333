// taskboard-service/src/utils/document_store.rs
use crate::models::{Attachment, Invitation, ServiceError, Task, Team, TeamMembership, UserProfile};
use lazy_static::lazy_static;
use log::{debug, error, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

const SNAPSHOT_FILE: &str = "db.json";

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();
}

// Equality index used to pick the base set of tasks
#[derive(Debug, Clone, Copy)]
pub enum TaskIndex<'a> {
    ByUser(&'a str),
    ByTeam(&'a str),
}

impl TaskIndex<'_> {
    fn matches(&self, task: &Task) -> bool {
        match self {
            TaskIndex::ByUser(user_id) => task.user_id == *user_id,
            TaskIndex::ByTeam(team_id) => task.team_id() == Some(*team_id),
        }
    }
}

// All named collections. Vectors keep insertion order, which is also creation order.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Collections {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub team_members: Vec<TeamMembership>,
    #[serde(default)]
    pub invitations: Vec<Invitation>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub files: Vec<Attachment>,
}

impl Collections {
    // users

    pub fn get_user(&self, user_id: &str) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.id == user_id)
    }

    pub fn upsert_user(&mut self, profile: UserProfile) {
        match self.users.iter_mut().find(|u| u.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.users.push(profile),
        }
    }

    // teams

    pub fn get_team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn insert_team(&mut self, team: Team) {
        self.teams.push(team);
    }

    // team_members

    // by_team_and_user
    pub fn membership(&self, team_id: &str, user_id: &str) -> Option<&TeamMembership> {
        self.team_members
            .iter()
            .find(|m| m.team_id == team_id && m.user_id == user_id)
    }

    pub fn is_member(&self, team_id: &str, user_id: &str) -> bool {
        self.membership(team_id, user_id).is_some()
    }

    // by_team
    pub fn members_of_team<'a>(&'a self, team_id: &'a str) -> impl Iterator<Item = &'a TeamMembership> {
        self.team_members.iter().filter(move |m| m.team_id == team_id)
    }

    // by_user
    pub fn memberships_of_user<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a TeamMembership> {
        self.team_members.iter().filter(move |m| m.user_id == user_id)
    }

    pub fn insert_membership(&mut self, membership: TeamMembership) {
        self.team_members.push(membership);
    }

    // invitations

    // by_token
    pub fn invitation_by_token(&self, token: &str) -> Option<&Invitation> {
        self.invitations.iter().find(|i| i.token == token)
    }

    pub fn insert_invitation(&mut self, invitation: Invitation) {
        self.invitations.push(invitation);
    }

    // tasks

    pub fn get_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn get_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn tasks_by_index(&self, index: TaskIndex<'_>) -> Vec<&Task> {
        self.tasks.iter().filter(|t| index.matches(t)).collect()
    }

    // Full-text search over titles, filtered by the index and ordered by relevance.
    pub fn search_tasks(&self, text: &str, index: TaskIndex<'_>) -> Vec<&Task> {
        let terms = search_terms(text);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(usize, &Task)> = self
            .tasks
            .iter()
            .filter(|t| index.matches(t))
            .map(|t| (title_relevance(&terms, &t.title), t))
            .filter(|(score, _)| *score > 0)
            .collect();

        hits.sort_by(|a, b| b.0.cmp(&a.0));
        hits.into_iter().map(|(_, t)| t).collect()
    }

    pub fn insert_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn delete_task(&mut self, task_id: &str) -> Option<Task> {
        let position = self.tasks.iter().position(|t| t.id == task_id)?;
        Some(self.tasks.remove(position))
    }

    // files

    pub fn get_file(&self, file_id: &str) -> Option<&Attachment> {
        self.files.iter().find(|f| f.id == file_id)
    }

    // by_task
    pub fn files_by_task<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a Attachment> {
        self.files.iter().filter(move |f| f.task_id == task_id)
    }

    pub fn insert_file(&mut self, file: Attachment) {
        self.files.push(file);
    }

    pub fn delete_file(&mut self, file_id: &str) -> Option<Attachment> {
        let position = self.files.iter().position(|f| f.id == file_id)?;
        Some(self.files.remove(position))
    }
}

// Lowercased word terms of a search string
pub fn search_terms(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

// Number of query terms found in the title. The last term may match as a prefix
// so results update while the user is still typing.
fn title_relevance(terms: &[String], title: &str) -> usize {
    let words = search_terms(title);
    let last = terms.len() - 1;

    terms
        .iter()
        .enumerate()
        .filter(|(i, term)| {
            words.iter().any(|word| {
                word == *term || (*i == last && word.starts_with(term.as_str()))
            })
        })
        .count()
}

// Shared document store. Readers share the lock; each transaction runs against a
// working copy that replaces the live collections only when it succeeds.
#[derive(Clone)]
pub struct DocumentStore {
    collections: Arc<RwLock<Collections>>,
    snapshot_path: Option<PathBuf>,
}

impl DocumentStore {
    pub fn in_memory() -> Self {
        Self {
            collections: Arc::new(RwLock::new(Collections::default())),
            snapshot_path: None,
        }
    }

    // Open a store persisted under `storage_dir`, loading the last snapshot if any
    pub fn open(storage_dir: &Path) -> Result<Self, ServiceError> {
        fs::create_dir_all(storage_dir).map_err(|e| {
            error!("Failed to create storage directory: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let snapshot_path = storage_dir.join(SNAPSHOT_FILE);
        let collections = if snapshot_path.exists() {
            let content = fs::read_to_string(&snapshot_path).map_err(|e| {
                error!("Failed to read store snapshot: {:?}", e);
                ServiceError::InternalServerError
            })?;
            serde_json::from_str(&content).map_err(|e| {
                error!("Failed to parse store snapshot: {:?}", e);
                ServiceError::InternalServerError
            })?
        } else {
            Collections::default()
        };

        info!(
            "Opened document store at {} ({} tasks, {} teams)",
            snapshot_path.display(),
            collections.tasks.len(),
            collections.teams.len()
        );

        Ok(Self {
            collections: Arc::new(RwLock::new(collections)),
            snapshot_path: Some(snapshot_path),
        })
    }

    pub fn read<T>(&self, f: impl FnOnce(&Collections) -> T) -> Result<T, ServiceError> {
        let collections = self.collections.read().map_err(|e| {
            error!("Store lock error: {:?}", e);
            ServiceError::InternalServerError
        })?;
        Ok(f(&collections))
    }

    // Runs `f` atomically; on error nothing it did is visible.
    // Each call copies every collection and rewrites the whole snapshot under the
    // write lock, so cost grows with store size. Callers skip no-op writes.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut collections = self.collections.write().map_err(|e| {
            error!("Store lock error: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let mut working = collections.clone();
        let result = f(&mut working)?;

        if let Some(path) = &self.snapshot_path {
            write_snapshot(path, &working)?;
        }

        *collections = working;
        Ok(result)
    }
}

fn write_snapshot(path: &Path, collections: &Collections) -> Result<(), ServiceError> {
    let json = serde_json::to_string_pretty(collections).map_err(|e| {
        error!("Failed to serialize store snapshot: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)
        .and_then(|_| fs::rename(&tmp_path, path))
        .map_err(|e| {
            error!("Failed to write store snapshot: {:?}", e);
            ServiceError::InternalServerError
        })?;

    debug!("Saved store snapshot to {}", path.display());
    Ok(())
}
