//! Main application state and service coordination
//!
//! This module contains the AppState that wires stores, services and metrics
//! together and owns the background maintenance tasks.

use crate::auth::{BcryptPasswordHasher, TokenIssuer};
use crate::config::AppConfig;
use crate::metrics::MetricsCollector;
use crate::service::accounts::AccountService;
use crate::service::booking::BookingService;
use crate::service::health::ServiceStats;
use crate::service::query::MatchQueryService;
use crate::service::schedule::ScheduleService;
use crate::store::{
    BookingLedger, InMemoryBookingLedger, InMemoryMatchStore, InMemoryPlayerRecordStore,
    MatchStore, PlayerRecordStore,
};
use crate::teams::GreedyTeamBalancer;
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Interval between metrics refreshes from store statistics
const STATS_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Storage collaborators
    records: Arc<dyn PlayerRecordStore>,
    matches: Arc<dyn MatchStore>,
    ledger: Arc<dyn BookingLedger>,

    /// Domain services
    accounts: AccountService,
    bookings: BookingService,
    schedule: ScheduleService,
    queries: MatchQueryService,

    /// Metrics collector shared with the services
    metrics: Arc<MetricsCollector>,

    /// Background task handles
    background_tasks: Mutex<Vec<JoinHandle<()>>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,

    started_at: Instant,
}

impl AppState {
    /// Initialize the application with in-memory stores
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        let records: Arc<dyn PlayerRecordStore> = Arc::new(InMemoryPlayerRecordStore::new());
        let matches: Arc<dyn MatchStore> = Arc::new(InMemoryMatchStore::new());
        let ledger: Arc<dyn BookingLedger> =
            Arc::new(InMemoryBookingLedger::new(records.clone(), matches.clone()));

        Self::with_stores(config, records, matches, ledger).await
    }

    /// Initialize the application around the given stores
    pub async fn with_stores(
        config: AppConfig,
        records: Arc<dyn PlayerRecordStore>,
        matches: Arc<dyn MatchStore>,
        ledger: Arc<dyn BookingLedger>,
    ) -> Result<Self, ServiceError> {
        info!("Initializing soccer booking service");
        info!(
            "Configuration: service={}, address={}, match capacity={}",
            config.service.name,
            config.bind_address(),
            ledger.capacity()
        );

        crate::config::validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let tokens = Arc::new(TokenIssuer::new(&config.auth.jwt_secret, config.token_ttl()));
        let hasher = Arc::new(BcryptPasswordHasher::new(config.auth.password_hash_cost));

        let accounts = AccountService::new(records.clone(), ledger.clone(), hasher, tokens);
        let bookings =
            BookingService::new(ledger.clone(), config.booking.default_booking_status.clone())
                .with_metrics(metrics.clone());
        let schedule = ScheduleService::new(matches.clone(), ledger.clone());
        let queries = MatchQueryService::new(
            ledger.clone(),
            records.clone(),
            matches.clone(),
            Arc::new(GreedyTeamBalancer::new()),
        )
        .with_metrics(metrics.clone());

        if let Some(admin) = &config.auth.bootstrap_admin {
            accounts
                .ensure_admin(admin)
                .await
                .map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create bootstrap admin: {}", e),
                })?;
        }

        Ok(Self {
            config,
            records,
            matches,
            ledger,
            accounts,
            bookings,
            schedule,
            queries,
            metrics,
            background_tasks: Mutex::new(Vec::new()),
            is_running: Arc::new(RwLock::new(false)),
            started_at: Instant::now(),
        })
    }

    /// Mark the service running and start background tasks
    pub async fn start(self: &Arc<Self>) -> Result<(), ServiceError> {
        info!("Starting soccer booking service");

        *self.is_running.write().await = true;
        self.start_background_tasks().await;

        info!("✅ Soccer booking service started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of soccer booking service");

        *self.is_running.write().await = false;
        self.stop_background_tasks().await;

        let final_stats = self
            .stats()
            .await
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to get final stats: {}", e),
            })?;

        info!("Final service statistics: {:?}", final_stats);
        info!("✅ Soccer booking service shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn records(&self) -> Arc<dyn PlayerRecordStore> {
        self.records.clone()
    }

    pub fn matches(&self) -> Arc<dyn MatchStore> {
        self.matches.clone()
    }

    pub fn ledger(&self) -> Arc<dyn BookingLedger> {
        self.ledger.clone()
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn bookings(&self) -> &BookingService {
        &self.bookings
    }

    pub fn schedule(&self) -> &ScheduleService {
        &self.schedule
    }

    pub fn queries(&self) -> &MatchQueryService {
        &self.queries
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Seconds since the state was created
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Snapshot of store counts
    pub async fn stats(&self) -> Result<ServiceStats> {
        ServiceStats::collect(self).await
    }

    /// Start background maintenance tasks
    async fn start_background_tasks(self: &Arc<Self>) {
        info!(
            "Starting metrics update task ({}s interval)...",
            STATS_REFRESH_INTERVAL.as_secs()
        );

        let metrics_task = {
            let state = Arc::clone(self);

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(STATS_REFRESH_INTERVAL);
                info!("Metrics update task started");

                while state.is_running().await {
                    interval.tick().await;

                    match state.stats().await {
                        Ok(stats) => {
                            debug!(
                                "Updating metrics - users: {}, matches: {}, bookings: {}, full: {}",
                                stats.users, stats.matches, stats.bookings, stats.full_matches
                            );
                            state.metrics.update_from_stats(&stats);
                            state.metrics.update_health_status(2);
                            state.metrics.update_component_health("stores", true);
                        }
                        Err(e) => {
                            warn!("Failed to gather stats for metrics update: {}", e);
                            state.metrics.update_health_status(1);
                            state.metrics.update_component_health("stores", false);
                        }
                    }
                }

                info!("Metrics update task stopped");
            })
        };

        self.background_tasks.lock().await.push(metrics_task);
        info!("Background maintenance tasks started successfully");
    }

    /// Stop all background tasks
    async fn stop_background_tasks(&self) {
        let mut tasks = self.background_tasks.lock().await;
        let task_count = tasks.len();
        if task_count == 0 {
            info!("No background tasks to stop");
            return;
        }

        info!("Stopping {} background tasks...", task_count);
        for (i, task) in tasks.drain(..).enumerate() {
            debug!("Aborting background task {}/{}", i + 1, task_count);
            task.abort();
        }

        info!("✅ All {} background tasks stopped", task_count);
    }
}
