// taskboard-service/src/services/authorization.rs
//! Authorization predicates over tasks and task listings.
//!
//! Everything here is side-effect free. Team membership is answered by a
//! [`MembershipLookup`], normally the document store's collections.

use crate::models::{Identity, Task, TaskScope};
use crate::utils::document_store::Collections;

pub trait MembershipLookup {
    fn is_member(&self, team_id: &str, user_id: &str) -> bool;
}

impl MembershipLookup for Collections {
    fn is_member(&self, team_id: &str, user_id: &str) -> bool {
        Collections::is_member(self, team_id, user_id)
    }
}

/// Personal scope is always readable by its owner; team scope needs membership.
/// Anonymous callers may read nothing.
pub fn can_read_task_list(
    identity: &Identity,
    scope: &TaskScope,
    members: &impl MembershipLookup,
) -> bool {
    let Some(user_id) = identity.user_id() else {
        return false;
    };

    match scope {
        TaskScope::Personal => true,
        TaskScope::Team(team_id) => members.is_member(team_id, user_id),
    }
}

/// Personal tasks: creator only. Team tasks: any member of the team.
pub fn can_mutate_task(identity: &Identity, task: &Task, members: &impl MembershipLookup) -> bool {
    let Some(user_id) = identity.user_id() else {
        return false;
    };

    match &task.scope {
        TaskScope::Personal => task.user_id == user_id,
        TaskScope::Team(team_id) => members.is_member(team_id, user_id),
    }
}

/// Narrower than [`can_mutate_task`] for team tasks: membership alone is not
/// enough, the caller must be the creator or a tagged user.
pub fn can_complete_task(identity: &Identity, task: &Task) -> bool {
    let Some(user_id) = identity.user_id() else {
        return false;
    };

    match &task.scope {
        TaskScope::Personal => task.user_id == user_id,
        TaskScope::Team(_) => task.user_id == user_id || task.is_tagged(user_id),
    }
}

pub fn can_delete_task(identity: &Identity, task: &Task, members: &impl MembershipLookup) -> bool {
    can_mutate_task(identity, task, members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::Utc;
    use std::collections::HashSet;

    struct Members(HashSet<(String, String)>);

    impl Members {
        fn of(team_id: &str, users: &[&str]) -> Self {
            Members(
                users
                    .iter()
                    .map(|u| (team_id.to_string(), u.to_string()))
                    .collect(),
            )
        }
    }

    impl MembershipLookup for Members {
        fn is_member(&self, team_id: &str, user_id: &str) -> bool {
            self.0.contains(&(team_id.to_string(), user_id.to_string()))
        }
    }

    fn task(user_id: &str, scope: TaskScope, tagged: &[&str]) -> Task {
        Task {
            id: "task".to_string(),
            title: "Ship release".to_string(),
            description: None,
            due_date: None,
            priority: Priority::High,
            category: "eng".to_string(),
            completed: false,
            user_id: user_id.to_string(),
            scope,
            color: None,
            tagged_users: tagged.iter().map(|u| u.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_personal_task_is_creator_only() {
        let members = Members::of("team", &["alice", "bob"]);
        let personal = task("alice", TaskScope::Personal, &[]);

        let alice = Identity::user("alice");
        assert!(can_mutate_task(&alice, &personal, &members));
        assert!(can_complete_task(&alice, &personal));
        assert!(can_delete_task(&alice, &personal, &members));

        for other in ["bob", "carol"] {
            let other = Identity::user(other);
            assert!(!can_mutate_task(&other, &personal, &members));
            assert!(!can_complete_task(&other, &personal));
        }
    }

    #[test]
    fn test_personal_task_ignores_tags() {
        let members = Members::of("team", &[]);
        let personal = task("alice", TaskScope::Personal, &["bob"]);
        assert!(!can_complete_task(&Identity::user("bob"), &personal));
        assert!(!can_mutate_task(&Identity::user("bob"), &personal, &members));
    }

    #[test]
    fn test_team_task_rights() {
        let members = Members::of("team", &["owner", "member", "tagged"]);
        let shared = task("owner", TaskScope::Team("team".to_string()), &["tagged"]);

        for user in ["owner", "member", "tagged"] {
            assert!(can_mutate_task(&Identity::user(user), &shared, &members));
        }

        assert!(can_complete_task(&Identity::user("owner"), &shared));
        assert!(can_complete_task(&Identity::user("tagged"), &shared));
        assert!(!can_complete_task(&Identity::user("member"), &shared));

        let outsider = Identity::user("outsider");
        assert!(!can_mutate_task(&outsider, &shared, &members));
        assert!(!can_delete_task(&outsider, &shared, &members));
    }

    #[test]
    fn test_anonymous_is_denied_everywhere() {
        let members = Members::of("team", &["alice"]);
        let personal = task("alice", TaskScope::Personal, &[]);

        assert!(!can_read_task_list(&Identity::Anonymous, &TaskScope::Personal, &members));
        assert!(!can_mutate_task(&Identity::Anonymous, &personal, &members));
        assert!(!can_complete_task(&Identity::Anonymous, &personal));
    }

    #[test]
    fn test_team_listing_requires_membership() {
        let members = Members::of("team", &["alice"]);
        let scope = TaskScope::Team("team".to_string());

        assert!(can_read_task_list(&Identity::user("alice"), &scope, &members));
        assert!(!can_read_task_list(&Identity::user("bob"), &scope, &members));
        assert!(can_read_task_list(&Identity::user("bob"), &TaskScope::Personal, &members));
    }
}
