// taskboard-service/src/services/team_service.rs
use crate::models::{Identity, Invitation, ServiceError, Team, TeamMembership, TeamSummary, UserProfile};
use crate::utils::document_store::DocumentStore;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use uuid::Uuid;

// Create a team with the caller as owner and first member, in one transaction
pub fn create_team(
    store: &DocumentStore,
    identity: &Identity,
    name: &str,
    now: DateTime<Utc>,
) -> Result<Team, ServiceError> {
    let user_id = identity.require_user()?;

    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::BadRequest("Team name must not be empty".to_string()));
    }

    store.transaction(|db| {
        let team = Team {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            owner_id: user_id.to_string(),
            created_at: now,
        };

        db.insert_team(team.clone());
        db.insert_membership(TeamMembership {
            id: Uuid::new_v4().to_string(),
            team_id: team.id.clone(),
            user_id: user_id.to_string(),
            joined_at: now,
        });

        info!("✅ Team created: {} owned by: {}", team.id, user_id);
        Ok(team)
    })
}

// Teams the caller belongs to, each flagged with whether the caller owns it
pub fn list_my_teams(store: &DocumentStore, identity: &Identity) -> Result<Vec<TeamSummary>, ServiceError> {
    let Some(user_id) = identity.user_id() else {
        return Ok(Vec::new());
    };

    store.read(|db| {
        db.memberships_of_user(user_id)
            .filter_map(|membership| match db.get_team(&membership.team_id) {
                Some(team) => Some(team),
                None => {
                    warn!("Skipping membership of missing team: {}", membership.team_id);
                    None
                }
            })
            .map(|team| TeamSummary {
                is_owner: team.owner_id == user_id,
                team: team.clone(),
            })
            .collect()
    })
}

// Issue a new invite token. Only the team owner may do this; earlier tokens stay valid.
pub fn generate_invite_token(
    store: &DocumentStore,
    identity: &Identity,
    team_id: &str,
    now: DateTime<Utc>,
) -> Result<Invitation, ServiceError> {
    let user_id = identity.require_user()?;

    store.transaction(|db| {
        let team = db.get_team(team_id).ok_or(ServiceError::NotFound)?;
        if team.owner_id != user_id {
            error!("❌ Only the owner can invite to team: {} (caller: {})", team_id, user_id);
            return Err(ServiceError::Unauthorized);
        }

        let mut invitation = Invitation::new(team_id.to_string(), user_id.to_string(), now);
        while db.invitation_by_token(&invitation.token).is_some() {
            invitation = Invitation::new(team_id.to_string(), user_id.to_string(), now);
        }

        db.insert_invitation(invitation.clone());
        info!("📧 Invite token issued for team: {}", team_id);
        Ok(invitation)
    })
}

// Redeem an invite token. The invitation is left in place for other users.
pub fn join_team(
    store: &DocumentStore,
    identity: &Identity,
    token: &str,
    now: DateTime<Utc>,
) -> Result<String, ServiceError> {
    let user_id = identity.require_user()?;

    store.transaction(|db| {
        let invitation = db
            .invitation_by_token(token.trim())
            .ok_or(ServiceError::InvalidToken)?;

        if invitation.is_expired(now) {
            warn!("Expired invite token used for team: {}", invitation.team_id);
            return Err(ServiceError::TokenExpired);
        }

        let team_id = invitation.team_id.clone();
        if db.is_member(&team_id, user_id) {
            return Err(ServiceError::AlreadyMember);
        }

        db.insert_membership(TeamMembership {
            id: Uuid::new_v4().to_string(),
            team_id: team_id.clone(),
            user_id: user_id.to_string(),
            joined_at: now,
        });

        info!("✅ User: {} joined team: {}", user_id, team_id);
        Ok(team_id)
    })
}

// Public profiles of every member. The caller must already be a member.
pub fn list_members(
    store: &DocumentStore,
    identity: &Identity,
    team_id: &str,
) -> Result<Vec<UserProfile>, ServiceError> {
    let Some(user_id) = identity.user_id() else {
        return Ok(Vec::new());
    };

    store.read(|db| -> Result<Vec<UserProfile>, ServiceError> {
        if !db.is_member(team_id, user_id) {
            error!("❌ User: {} is not a member of team: {}", user_id, team_id);
            return Err(ServiceError::Unauthorized);
        }

        Ok(db
            .members_of_team(team_id)
            .map(|m| {
                db.get_user(&m.user_id).cloned().unwrap_or_else(|| UserProfile {
                    id: m.user_id.clone(),
                    name: None,
                    email: None,
                })
            })
            .collect())
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn setup() -> (DocumentStore, Identity, Team) {
        let store = DocumentStore::in_memory();
        let owner = Identity::user("owner");
        let team = create_team(&store, &owner, "Platform", Utc::now()).unwrap();
        (store, owner, team)
    }

    fn membership_count(store: &DocumentStore, team_id: &str, user_id: &str) -> usize {
        store
            .read(|db| {
                db.members_of_team(team_id)
                    .filter(|m| m.user_id == user_id)
                    .count()
            })
            .unwrap()
    }

    #[test]
    fn test_owner_is_auto_joined() {
        let (store, owner, team) = setup();

        let teams = list_my_teams(&store, &owner).unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team.id, team.id);
        assert!(teams[0].is_owner);
        assert_eq!(membership_count(&store, &team.id, "owner"), 1);
    }

    #[test]
    fn test_blank_team_name_is_rejected() {
        let store = DocumentStore::in_memory();
        let result = create_team(&store, &Identity::user("owner"), "   ", Utc::now());
        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
        assert_eq!(store.read(|db| db.teams.len()).unwrap(), 0);
        assert_eq!(store.read(|db| db.team_members.len()).unwrap(), 0);
    }

    #[test]
    fn test_only_owner_issues_tokens() {
        let (store, owner, team) = setup();
        let member = Identity::user("member");
        let invitation = generate_invite_token(&store, &owner, &team.id, Utc::now()).unwrap();
        join_team(&store, &member, &invitation.token, Utc::now()).unwrap();

        assert_eq!(
            generate_invite_token(&store, &member, &team.id, Utc::now()),
            Err(ServiceError::Unauthorized)
        );
        assert_eq!(
            generate_invite_token(&store, &owner, "missing", Utc::now()),
            Err(ServiceError::NotFound)
        );
        assert_eq!(
            generate_invite_token(&store, &Identity::Anonymous, &team.id, Utc::now()),
            Err(ServiceError::Unauthenticated)
        );
    }

    #[test]
    fn test_multiple_live_tokens() {
        let (store, owner, team) = setup();
        let first = generate_invite_token(&store, &owner, &team.id, Utc::now()).unwrap();
        let second = generate_invite_token(&store, &owner, &team.id, Utc::now()).unwrap();
        assert_ne!(first.token, second.token);

        join_team(&store, &Identity::user("a"), &first.token, Utc::now()).unwrap();
        join_team(&store, &Identity::user("b"), &second.token, Utc::now()).unwrap();
    }

    #[test]
    fn test_token_is_reusable_until_expiry() {
        let (store, owner, team) = setup();
        let issued = Utc::now();
        let invitation = generate_invite_token(&store, &owner, &team.id, issued).unwrap();

        for user in ["a", "b", "c"] {
            let joined = join_team(&store, &Identity::user(user), &invitation.token, issued).unwrap();
            assert_eq!(joined, team.id);
        }

        let late = issued + Duration::days(8);
        assert_eq!(
            join_team(&store, &Identity::user("d"), &invitation.token, late),
            Err(ServiceError::TokenExpired)
        );
        assert_eq!(membership_count(&store, &team.id, "d"), 0);
    }

    #[test]
    fn test_join_failures() {
        let (store, owner, team) = setup();
        let invitation = generate_invite_token(&store, &owner, &team.id, Utc::now()).unwrap();

        assert_eq!(
            join_team(&store, &Identity::user("x"), "NOSUCHTOKEN1", Utc::now()),
            Err(ServiceError::InvalidToken)
        );

        let member = Identity::user("member");
        join_team(&store, &member, &invitation.token, Utc::now()).unwrap();
        assert_eq!(
            join_team(&store, &member, &invitation.token, Utc::now()),
            Err(ServiceError::AlreadyMember)
        );
        assert_eq!(membership_count(&store, &team.id, "member"), 1);

        assert_eq!(
            join_team(&store, &owner, &invitation.token, Utc::now()),
            Err(ServiceError::AlreadyMember)
        );
    }

    #[test]
    fn test_list_members() {
        let (store, owner, team) = setup();
        store
            .transaction(|db| {
                db.upsert_user(UserProfile {
                    id: "owner".to_string(),
                    name: Some("Olga".to_string()),
                    email: Some("olga@example.com".to_string()),
                });
                Ok(())
            })
            .unwrap();

        let invitation = generate_invite_token(&store, &owner, &team.id, Utc::now()).unwrap();
        join_team(&store, &Identity::user("member"), &invitation.token, Utc::now()).unwrap();

        let members = list_members(&store, &owner, &team.id).unwrap();
        let ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["owner", "member"]);
        assert_eq!(members[0].name.as_deref(), Some("Olga"));

        assert_eq!(
            list_members(&store, &Identity::user("outsider"), &team.id),
            Err(ServiceError::Unauthorized)
        );
        assert!(list_members(&store, &Identity::Anonymous, &team.id).unwrap().is_empty());

        let teams = list_my_teams(&store, &Identity::user("member")).unwrap();
        assert_eq!(teams.len(), 1);
        assert!(!teams[0].is_owner);
    }
}
