// taskboard-service/src/models/invitations.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const INVITE_TOKEN_LENGTH: usize = 12;

// Invitations expire after 7 days (604,800,000 ms)
pub const INVITE_TTL_MILLIS: i64 = 604_800_000;

// No 0/O or 1/I lookalikes; 32 symbols so each takes exactly 5 random bits
const TOKEN_ALPHABET: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

// Team invitation model. Redeemable any number of times until it expires.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub team_id: String,
    pub token: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JoinTeamRequest {
    pub invite_token: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InviteTokenResponse {
    pub token: String,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JoinTeamResponse {
    pub team_id: String,
}

impl Invitation {
    // Create a new invitation issued at `now`
    pub fn new(team_id: String, created_by: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            team_id,
            token: generate_invite_token(),
            created_by,
            created_at: now,
            expires_at: Some(now + Duration::milliseconds(INVITE_TTL_MILLIS)),
        }
    }

    // Invitations without an expiry never expire
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires_at| expires_at < now)
    }
}

// Random bytes come from two v4 UUIDs. Bytes 6 and 8 carry the version and
// variant bits, so only the other positions are used.
pub fn generate_invite_token() -> String {
    let mut random = Vec::with_capacity(28);
    for uuid in [Uuid::new_v4(), Uuid::new_v4()] {
        random.extend(
            uuid.as_bytes()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != 6 && *i != 8)
                .map(|(_, b)| *b),
        );
    }

    random
        .iter()
        .take(INVITE_TOKEN_LENGTH)
        .map(|b| TOKEN_ALPHABET[(*b & 0x1f) as usize] as char)
        .collect()
}
