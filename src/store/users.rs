//! Player record storage
//!
//! Accounts with their role and skill level. The roster join and the
//! account endpoints read from here.

use crate::error::{BookingError, Result};
use crate::types::{Role, SkillLevel, User, UserId};
use crate::utils::current_timestamp;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use tracing::debug;

/// Account fields with the password already hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub skill_level: SkillLevel,
}

/// Storage interface for user accounts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRecordStore: Send + Sync {
    /// Insert a new account; username and email must be unused
    async fn create_user(&self, record: UserRecord) -> Result<User>;

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>>;

    /// Fetch several accounts at once; unknown ids are absent from the map
    async fn get_users(&self, user_ids: &[UserId]) -> Result<HashMap<UserId, User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// All accounts ordered by id
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Replace every field of an existing account
    async fn update_user(&self, user_id: UserId, record: UserRecord) -> Result<User>;

    /// Remove an account, returning whether it existed
    async fn delete_user(&self, user_id: UserId) -> Result<bool>;

    async fn user_count(&self) -> Result<usize>;
}

#[derive(Debug, Default)]
struct UserTable {
    next_id: UserId,
    users: BTreeMap<UserId, User>,
}

impl UserTable {
    fn check_unique(&self, record: &UserRecord, except: Option<UserId>) -> Result<()> {
        for user in self.users.values() {
            if Some(user.id) == except {
                continue;
            }
            if user.username == record.username {
                return Err(BookingError::UsernameTaken {
                    username: record.username.clone(),
                }
                .into());
            }
            if user.email.eq_ignore_ascii_case(&record.email) {
                return Err(BookingError::EmailTaken {
                    email: record.email.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// In-memory player record store
#[derive(Debug, Default)]
pub struct InMemoryPlayerRecordStore {
    table: RwLock<UserTable>,
}

impl InMemoryPlayerRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRecordStore for InMemoryPlayerRecordStore {
    async fn create_user(&self, record: UserRecord) -> Result<User> {
        let mut table = self
            .table
            .write()
            .map_err(|_| BookingError::lock_poisoned("users write"))?;

        table.check_unique(&record, None)?;

        table.next_id += 1;
        let user = User {
            id: table.next_id,
            username: record.username,
            email: record.email,
            role: record.role,
            skill_level: record.skill_level,
            password_hash: record.password_hash,
            created_at: current_timestamp(),
        };
        table.users.insert(user.id, user.clone());

        debug!("Stored user {} ({}) as {}", user.id, user.username, user.role);
        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("users read"))?;

        Ok(table.users.get(&user_id).cloned())
    }

    async fn get_users(&self, user_ids: &[UserId]) -> Result<HashMap<UserId, User>> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("users read"))?;

        Ok(user_ids
            .iter()
            .filter_map(|id| table.users.get(id).map(|user| (*id, user.clone())))
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("users read"))?;

        Ok(table
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("users read"))?;

        Ok(table
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("users read"))?;

        Ok(table.users.values().cloned().collect())
    }

    async fn update_user(&self, user_id: UserId, record: UserRecord) -> Result<User> {
        let mut table = self
            .table
            .write()
            .map_err(|_| BookingError::lock_poisoned("users write"))?;

        if !table.users.contains_key(&user_id) {
            return Err(BookingError::UserNotFound { user_id }.into());
        }
        table.check_unique(&record, Some(user_id))?;

        let user = table
            .users
            .get_mut(&user_id)
            .ok_or(BookingError::UserNotFound { user_id })?;
        user.username = record.username;
        user.email = record.email;
        user.password_hash = record.password_hash;
        user.role = record.role;
        user.skill_level = record.skill_level;

        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<bool> {
        let mut table = self
            .table
            .write()
            .map_err(|_| BookingError::lock_poisoned("users write"))?;

        Ok(table.users.remove(&user_id).is_some())
    }

    async fn user_count(&self) -> Result<usize> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("users read"))?;

        Ok(table.users.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, skill_level: SkillLevel) -> UserRecord {
        UserRecord {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "hash".to_string(),
            role: Role::Player,
            skill_level,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let store = InMemoryPlayerRecordStore::new();

        let john = store.create_user(record("john_doe", 3)).await.unwrap();
        let jane = store.create_user(record("jane", 7)).await.unwrap();
        assert_eq!(john.id, 1);
        assert_eq!(jane.id, 2);

        assert_eq!(store.get_user(2).await.unwrap().unwrap().skill_level, 7);
        assert!(store.get_user(9).await.unwrap().is_none());
        assert_eq!(
            store
                .find_by_email("JOHN_DOE@example.com")
                .await
                .unwrap()
                .map(|u| u.id),
            Some(1)
        );
        assert_eq!(
            store.find_by_username("jane").await.unwrap().map(|u| u.id),
            Some(2)
        );

        let found = store.get_users(&[2, 1, 42]).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(store.user_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_uniqueness() {
        let store = InMemoryPlayerRecordStore::new();
        store.create_user(record("john_doe", 3)).await.unwrap();

        let err = store.create_user(record("john_doe", 4)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BookingError>(),
            Some(BookingError::UsernameTaken { .. })
        ));

        let mut other = record("johnny", 4);
        other.email = "john_doe@example.com".to_string();
        let err = store.create_user(other).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BookingError>(),
            Some(BookingError::EmailTaken { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryPlayerRecordStore::new();
        let user = store.create_user(record("john_doe", 3)).await.unwrap();
        store.create_user(record("jane", 5)).await.unwrap();

        let mut changed = record("john_doe", 9);
        changed.role = Role::Admin;
        let updated = store.update_user(user.id, changed).await.unwrap();
        assert_eq!(updated.skill_level, 9);
        assert!(updated.is_admin());

        // Taking another account's username is rejected
        assert!(store.update_user(user.id, record("jane", 1)).await.is_err());
        assert!(store.update_user(77, record("ghost", 1)).await.is_err());

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(!store.delete_user(user.id).await.unwrap());
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }
}
