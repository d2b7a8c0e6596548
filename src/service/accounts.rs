//! Account management and login

use crate::auth::{Claims, PasswordHasher, TokenIssuer};
use crate::config::BootstrapAdmin;
use crate::error::{BookingError, Result};
use crate::store::{BookingLedger, PlayerRecordStore, UserRecord};
use crate::types::{NewUser, Role, User, UserId};
use crate::utils::normalize_email;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Service for signup, login and admin account management
#[derive(Clone)]
pub struct AccountService {
    records: Arc<dyn PlayerRecordStore>,
    ledger: Arc<dyn BookingLedger>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenIssuer>,
}

impl AccountService {
    pub fn new(
        records: Arc<dyn PlayerRecordStore>,
        ledger: Arc<dyn BookingLedger>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            records,
            ledger,
            hasher,
            tokens,
        }
    }

    /// Public registration; the account is always a player
    pub async fn signup(&self, new_user: NewUser) -> Result<User> {
        let record = self
            .to_record(NewUser {
                role: Role::Player,
                ..new_user
            })
            .await?;
        let user = self.records.create_user(record).await?;
        info!("New player signed up: {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Verify credentials and issue an access token
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User)> {
        let user = self
            .records
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(BookingError::InvalidCredentials)?;
        if !self.verify_password(password, &user.password_hash).await? {
            return Err(BookingError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(&user)?;
        debug!("Issued access token for user {}", user.id);
        Ok((token, user))
    }

    /// Verify a bearer token
    pub fn authenticate(&self, token: &str) -> Result<Claims> {
        self.tokens.verify(token)
    }

    /// Admin account creation with an explicit role
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let record = self.to_record(new_user).await?;
        let user = self.records.create_user(record).await?;
        info!("Created {} account {} ({})", user.role, user.username, user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<User> {
        self.records
            .get_user(user_id)
            .await?
            .ok_or_else(|| BookingError::UserNotFound { user_id }.into())
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.records.list_users().await
    }

    /// Replace every field of an account, including its password
    pub async fn update_user(&self, user_id: UserId, new_user: NewUser) -> Result<User> {
        let record = self.to_record(new_user).await?;
        let user = self.records.update_user(user_id, record).await?;
        info!("Updated account {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Remove an account together with its bookings
    pub async fn delete_user(&self, user_id: UserId) -> Result<()> {
        if !self.records.delete_user(user_id).await? {
            return Err(BookingError::UserNotFound { user_id }.into());
        }
        let removed = self.ledger.remove_user_bookings(user_id).await?;
        info!(
            "Deleted account {} and {} of its bookings",
            user_id, removed
        );
        Ok(())
    }

    /// Create the configured admin account unless its email is already registered
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> Result<User> {
        if let Some(existing) = self
            .records
            .find_by_email(&normalize_email(&admin.email))
            .await?
        {
            if !existing.is_admin() {
                warn!(
                    "Bootstrap admin email {} belongs to a non-admin account",
                    admin.email
                );
            }
            return Ok(existing);
        }

        let user = self
            .create_user(NewUser {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password: admin.password.clone(),
                role: Role::Admin,
                skill_level: 0,
            })
            .await?;
        info!("Bootstrap admin account created: {}", user.username);
        Ok(user)
    }

    async fn to_record(&self, new_user: NewUser) -> Result<UserRecord> {
        let username = new_user.username.trim().to_string();
        let email = normalize_email(&new_user.email);

        if username.is_empty() {
            return Err(invalid("username is required"));
        }
        if !email.contains('@') {
            return Err(invalid("a valid email is required"));
        }
        if new_user.password.is_empty() {
            return Err(invalid("password is required"));
        }

        Ok(UserRecord {
            username,
            email,
            password_hash: self.hash_password(new_user.password).await?,
            role: new_user.role,
            skill_level: new_user.skill_level,
        })
    }

    /// bcrypt is CPU-bound; it runs on the blocking pool
    async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(join_failed)?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let (password, hash) = (password.to_string(), hash.to_string());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(join_failed)
    }
}

fn join_failed(err: tokio::task::JoinError) -> anyhow::Error {
    BookingError::Internal {
        message: format!("Password task failed: {}", err),
    }
    .into()
}

fn invalid(reason: &str) -> anyhow::Error {
    BookingError::InvalidRequest {
        reason: reason.to_string(),
    }
    .into()
}
