// taskboard-service/src/models/task.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    // high(3) > medium(2) > low(1)
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

// Visibility boundary of a task or a task listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "teamId", rename_all = "lowercase")]
pub enum TaskScope {
    Personal,
    Team(String),
}

impl TaskScope {
    pub fn from_team_id(team_id: Option<String>) -> Self {
        match team_id {
            Some(id) if !id.trim().is_empty() => TaskScope::Team(id),
            _ => TaskScope::Personal,
        }
    }

    pub fn team_id(&self) -> Option<&str> {
        match self {
            TaskScope::Personal => None,
            TaskScope::Team(id) => Some(id),
        }
    }
}

impl Default for TaskScope {
    fn default() -> Self {
        TaskScope::Personal
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<i64>, // epoch millis
    pub priority: Priority,
    pub category: String,
    pub completed: bool,
    pub user_id: String, // creator
    pub scope: TaskScope,
    pub color: Option<String>, // UI hint for team tasks
    #[serde(default)]
    pub tagged_users: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn team_id(&self) -> Option<&str> {
        self.scope.team_id()
    }

    pub fn is_tagged(&self, user_id: &str) -> bool {
        self.tagged_users.iter().any(|tagged| tagged == user_id)
    }
}

// Request to create a task
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub priority: Priority,
    pub category: String,
    pub team_id: Option<String>,
    pub color: Option<String>,
    pub tagged_users: Option<Vec<String>>,
}

// Partial update; only supplied fields change. Completion goes through the toggle endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub tagged_users: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Pending,
    Completed,
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::All
    }
}

impl StatusFilter {
    pub fn accepts(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    DueDate,
    Priority,
    Created,
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Created
    }
}

impl SortBy {
    // Unknown or missing keys fall back to creation order
    pub fn from_key(key: Option<&str>) -> Self {
        match key {
            Some("dueDate") => SortBy::DueDate,
            Some("priority") => SortBy::Priority,
            _ => SortBy::Created,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub sort_by: SortBy,
    pub search: Option<String>,
}

impl TaskFilter {
    // Search text with blank input treated as absent
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn accepts(&self, task: &Task) -> bool {
        self.status.accepts(task)
            && self.category.as_ref().map_or(true, |c| &task.category == c)
            && self.priority.map_or(true, |p| task.priority == p)
    }
}

// Query string of `GET /tasks`
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub team_id: Option<String>,
    pub filter: Option<StatusFilter>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub sort_by: Option<String>,
    pub search: Option<String>,
}

impl TaskListQuery {
    pub fn into_parts(self) -> (TaskScope, TaskFilter) {
        let filter = TaskFilter {
            status: self.filter.unwrap_or_default(),
            category: self.category.filter(|c| !c.is_empty()),
            priority: self.priority,
            sort_by: SortBy::from_key(self.sort_by.as_deref()),
            search: self.search,
        };
        (TaskScope::from_team_id(self.team_id), filter)
    }
}

// Query string of `GET /tasks/categories`
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    pub team_id: Option<String>,
}

impl ScopeQuery {
    pub fn into_scope(self) -> TaskScope {
        TaskScope::from_team_id(self.team_id)
    }
}
