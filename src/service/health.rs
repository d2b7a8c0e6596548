//! Health checks and service statistics
//!
//! This module provides health check functionality for the booking service,
//! including readiness and liveness checks.

use crate::service::app::AppState;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::error;

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value (0=unhealthy, 1=degraded, 2=healthy)
    pub fn as_gauge(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 0,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    pub stats: Option<ServiceStats>,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    pub name: String,
    pub status: HealthStatus,
    /// Error message if the component is not healthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Store counts for health reporting and metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub users: usize,
    pub matches: usize,
    pub bookings: usize,
    /// Matches holding a full roster
    pub full_matches: usize,
    pub uptime_seconds: u64,
}

impl ServiceStats {
    /// Gather counts from every store
    pub async fn collect(app_state: &AppState) -> Result<Self> {
        let users = app_state.records().user_count().await?;
        let matches = app_state.matches().match_count().await?;

        let ledger = app_state.ledger();
        let bookings = ledger.all_bookings().await?;
        let mut per_match: HashMap<_, usize> = HashMap::new();
        for booking in &bookings {
            *per_match.entry(booking.match_id).or_default() += 1;
        }
        let full_matches = per_match
            .values()
            .filter(|&&count| count >= ledger.capacity())
            .count();

        Ok(Self {
            users,
            matches,
            bookings: bookings.len(),
            full_matches,
            uptime_seconds: app_state.uptime().as_secs(),
        })
    }
}

impl HealthCheck {
    /// Perform a full health check of the service
    pub async fn check(app_state: Arc<AppState>) -> Result<Self> {
        let mut checks = Vec::new();

        checks.push(Self::check_service_running(&app_state).await);
        checks.push(
            Self::check_component("player_records", app_state.records().user_count()).await,
        );
        checks.push(Self::check_component("match_store", app_state.matches().match_count()).await);
        checks.push(Self::check_component("booking_ledger", app_state.ledger().all_bookings()).await);

        let status = Self::overall_status(&checks);
        let stats = app_state.stats().await.ok();

        let metrics = app_state.metrics();
        metrics.update_health_status(status.as_gauge());
        for check in &checks {
            metrics.update_component_health(&check.name, check.status == HealthStatus::Healthy);
        }

        Ok(HealthCheck {
            status,
            service: app_state.config().service.name.clone(),
            version: crate::VERSION.to_string(),
            timestamp: crate::utils::current_timestamp(),
            checks,
            stats,
        })
    }

    /// Simple liveness check - just verify service is running
    pub async fn liveness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if app_state.is_running().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy)
        }
    }

    /// Readiness check - verify service can handle requests
    pub async fn readiness_check(app_state: Arc<AppState>) -> Result<HealthStatus> {
        if !app_state.is_running().await {
            return Ok(HealthStatus::Unhealthy);
        }

        let ledger = Self::check_component("booking_ledger", app_state.ledger().all_bookings()).await;
        Ok(ledger.status)
    }

    /// Worst status among the checks
    fn overall_status(checks: &[ComponentCheck]) -> HealthStatus {
        if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }

    async fn check_service_running(app_state: &AppState) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = if app_state.is_running().await {
            (HealthStatus::Healthy, None)
        } else {
            (
                HealthStatus::Unhealthy,
                Some("Service is not running".to_string()),
            )
        };

        ComponentCheck {
            name: "service_running".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Run a store check; a failing store makes the service unhealthy
    async fn check_component<T>(
        name: &str,
        check: impl Future<Output = Result<T>>,
    ) -> ComponentCheck {
        let start = std::time::Instant::now();

        let (status, message) = match check.await {
            Ok(_) => (HealthStatus::Healthy, None),
            Err(e) => {
                error!("{} health check failed: {}", name, e);
                (HealthStatus::Unhealthy, Some(e.to_string()))
            }
        };

        ComponentCheck {
            name: name.to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize health check: {}", e))
    }
}
