// taskboard-service/src/models/team.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

// Unique per (team_id, user_id)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembership {
    pub id: String,
    pub team_id: String,
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
}

// A team as seen by one of its members
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    #[serde(flatten)]
    pub team: Team,
    pub is_owner: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TeamData {
    pub name: String,
}
