//! Main application configuration
//!
//! This module defines the configuration structures for the booking service,
//! including environment variable loading, TOML file loading and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub auth: AuthSettings,
    pub booking: BookingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Address the HTTP server binds to
    pub host: String,
    /// Port for the HTTP API, health and metrics endpoints
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Account and token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC secret used to sign access tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub token_ttl_seconds: u64,
    /// bcrypt work factor for stored passwords
    pub password_hash_cost: u32,
    /// Admin account created at start-up when absent
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials for the start-up admin account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Booking behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    /// Status recorded when a booking request names none
    pub default_booking_status: String,
    /// Restrict the public match listing to matches dated today or later
    pub upcoming_only: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "soccer-booking".to_string(),
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            http_port: 3000,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me".to_string(),
            token_ttl_seconds: 3600, // 1 hour
            password_hash_cost: 10,
            bootstrap_admin: None,
        }
    }
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            default_booking_status: crate::types::DEFAULT_BOOKING_STATUS.to_string(),
            upcoming_only: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HOST") {
            self.service.host = host;
        }
        if let Ok(port) = env::var("PORT").or_else(|_| env::var("HTTP_PORT")) {
            self.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Auth settings
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(ttl) = env::var("TOKEN_TTL_SECONDS") {
            self.auth.token_ttl_seconds = ttl
                .parse()
                .map_err(|_| anyhow!("Invalid TOKEN_TTL_SECONDS value: {}", ttl))?;
        }
        if let Ok(cost) = env::var("PASSWORD_HASH_COST") {
            self.auth.password_hash_cost = cost
                .parse()
                .map_err(|_| anyhow!("Invalid PASSWORD_HASH_COST value: {}", cost))?;
        }
        if let (Ok(username), Ok(email), Ok(password)) = (
            env::var("ADMIN_USERNAME"),
            env::var("ADMIN_EMAIL"),
            env::var("ADMIN_PASSWORD"),
        ) {
            self.auth.bootstrap_admin = Some(BootstrapAdmin {
                username,
                email,
                password,
            });
        }

        // Booking settings
        if let Ok(status) = env::var("DEFAULT_BOOKING_STATUS") {
            self.booking.default_booking_status = status;
        }
        if let Ok(upcoming_only) = env::var("UPCOMING_ONLY") {
            self.booking.upcoming_only = upcoming_only
                .parse()
                .map_err(|_| anyhow!("Invalid UPCOMING_ONLY value: {}", upcoming_only))?;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get access token lifetime as Duration
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.token_ttl_seconds)
    }

    /// Socket address string for the HTTP server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.host, self.service.http_port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate server settings
    if config.service.host.is_empty() {
        return Err(anyhow!("Host cannot be empty"));
    }
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    // Validate auth settings
    if config.auth.jwt_secret.is_empty() {
        return Err(anyhow!("JWT secret cannot be empty"));
    }
    if config.auth.token_ttl_seconds == 0 {
        return Err(anyhow!("Token TTL must be greater than 0"));
    }
    if !(4..=31).contains(&config.auth.password_hash_cost) {
        return Err(anyhow!(
            "Password hash cost must be between 4 and 31, got {}",
            config.auth.password_hash_cost
        ));
    }
    if let Some(admin) = &config.auth.bootstrap_admin {
        if admin.username.is_empty() || admin.email.is_empty() || admin.password.is_empty() {
            return Err(anyhow!(
                "Bootstrap admin requires username, email and password"
            ));
        }
    }

    // Validate booking settings
    if config.booking.default_booking_status.is_empty() {
        return Err(anyhow!("Default booking status cannot be empty"));
    }

    Ok(())
}
