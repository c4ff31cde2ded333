// taskboard-service/src/services/user_service.rs
use crate::models::{Claims, PublicUser, ServiceError, UserProfile};
use crate::utils::document_store::DocumentStore;
use log::debug;

// Keep the stored profile in line with the latest claims; no write when unchanged
pub fn record_profile(store: &DocumentStore, claims: &Claims) -> Result<(), ServiceError> {
    let profile = UserProfile {
        id: claims.sub.clone(),
        name: claims.name.clone(),
        email: claims.email.clone(),
    };

    let unchanged = store.read(|db| db.get_user(&profile.id) == Some(&profile))?;
    if unchanged {
        return Ok(());
    }

    debug!("Recording profile for user: {}", profile.id);
    store.transaction(|db| {
        db.upsert_user(profile);
        Ok(())
    })
}

// Unknown ids yield an empty profile rather than an error
pub fn get_user(store: &DocumentStore, user_id: &str) -> Result<PublicUser, ServiceError> {
    store.read(|db| match db.get_user(user_id) {
        Some(user) => PublicUser {
            name: user.name.clone(),
            email: user.email.clone(),
        },
        None => PublicUser {
            name: None,
            email: None,
        },
    })
}

// Profiles for the given ids, in request order, skipping unknown ids
pub fn get_users(store: &DocumentStore, user_ids: &[String]) -> Result<Vec<UserProfile>, ServiceError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    store.read(|db| {
        user_ids
            .iter()
            .filter_map(|id| db.get_user(id).cloned())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, name: Option<&str>) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: Some(format!("{}@example.com", sub)),
            name: name.map(str::to_string),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_profiles_follow_claims() {
        let store = DocumentStore::in_memory();
        record_profile(&store, &claims("ana", None)).unwrap();
        record_profile(&store, &claims("ana", Some("Ana"))).unwrap();

        let user = get_user(&store, "ana").unwrap();
        assert_eq!(user.name.as_deref(), Some("Ana"));
        assert_eq!(user.email.as_deref(), Some("ana@example.com"));
        assert_eq!(store.read(|db| db.users.len()).unwrap(), 1);
    }

    #[test]
    fn test_lookup_skips_unknown_ids() {
        let store = DocumentStore::in_memory();
        record_profile(&store, &claims("ana", None)).unwrap();
        record_profile(&store, &claims("ben", None)).unwrap();

        let ids = vec!["ben".to_string(), "ghost".to_string(), "ana".to_string()];
        let users: Vec<String> = get_users(&store, &ids)
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(users, vec!["ben", "ana"]);

        assert!(get_users(&store, &[]).unwrap().is_empty());
        assert_eq!(get_user(&store, "ghost").unwrap().name, None);
    }

    #[test]
    fn test_unchanged_profile_skips_snapshot_write() {
        let dir = std::env::temp_dir().join(format!("taskboard-users-{}", uuid::Uuid::new_v4()));
        let store = DocumentStore::open(&dir).unwrap();
        let snapshot = dir.join("db.json");

        record_profile(&store, &claims("ana", Some("Ana"))).unwrap();
        assert!(snapshot.exists());

        std::fs::remove_file(&snapshot).unwrap();
        record_profile(&store, &claims("ana", Some("Ana"))).unwrap();
        assert!(!snapshot.exists());

        record_profile(&store, &claims("ana", Some("Ana B."))).unwrap();
        assert!(snapshot.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
