//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the booking service: booking
//! traffic, team balancing and service health.

use crate::error::BookingError;
use crate::service::health::ServiceStats;
use crate::types::SkillSum;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the booking service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Booking ledger traffic
    booking_metrics: BookingMetrics,

    /// Team balancing metrics
    balancing_metrics: BalancingMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,

    /// Registered accounts
    pub users_total: IntGauge,

    /// Scheduled matches
    pub matches_total: IntGauge,
}

/// Booking-related metrics
#[derive(Clone)]
pub struct BookingMetrics {
    /// Bookings accepted by the ledger
    pub bookings_created_total: IntCounter,

    /// Bookings refused, by reason
    pub bookings_rejected_total: IntCounterVec,

    /// Players who withdrew from a match
    pub withdrawals_total: IntCounter,

    /// Bookings currently held
    pub active_bookings: IntGauge,

    /// Matches at capacity
    pub full_matches: IntGauge,
}

/// Team balancing metrics
#[derive(Clone)]
pub struct BalancingMetrics {
    /// Balancing requests by outcome
    pub balance_requests_total: IntCounterVec,

    /// Time spent assembling and balancing a roster
    pub balance_duration: Histogram,

    /// Difference between strongest and weakest team skill sums
    pub team_skill_spread: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let booking_metrics = BookingMetrics::new(&registry)?;
        let balancing_metrics = BalancingMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            booking_metrics,
            balancing_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn booking(&self) -> &BookingMetrics {
        &self.booking_metrics
    }

    pub fn balancing(&self) -> &BalancingMetrics {
        &self.balancing_metrics
    }

    /// Update gauges from a service stats snapshot
    pub fn update_from_stats(&self, stats: &ServiceStats) {
        self.service_metrics
            .uptime_seconds
            .set(stats.uptime_seconds as i64);
        self.service_metrics.users_total.set(stats.users as i64);
        self.service_metrics.matches_total.set(stats.matches as i64);
        self.booking_metrics
            .active_bookings
            .set(stats.bookings as i64);
        self.booking_metrics
            .full_matches
            .set(stats.full_matches as i64);
    }

    pub fn record_booking_created(&self) {
        self.booking_metrics.bookings_created_total.inc();
    }

    /// Record a refused booking, labelled by the ledger's reason
    pub fn record_booking_rejected(&self, error: &anyhow::Error) {
        let reason = match error.downcast_ref::<BookingError>() {
            Some(BookingError::DuplicateBooking { .. }) => "duplicate",
            Some(BookingError::CapacityExceeded { .. }) => "capacity",
            Some(BookingError::MatchNotFound { .. }) => "unknown_match",
            Some(BookingError::UserNotFound { .. }) => "unknown_user",
            _ => "error",
        };

        self.booking_metrics
            .bookings_rejected_total
            .with_label_values(&[reason])
            .inc();
    }

    pub fn record_withdrawal(&self) {
        self.booking_metrics.withdrawals_total.inc();
    }

    /// Record a balancing request; `spread` is present only on success
    pub fn record_balance(&self, spread: Option<SkillSum>, duration: Duration) {
        let outcome = if spread.is_some() {
            "balanced"
        } else {
            "rejected"
        };

        self.balancing_metrics
            .balance_requests_total
            .with_label_values(&[outcome])
            .inc();
        self.balancing_metrics
            .balance_duration
            .observe(duration.as_secs_f64());

        if let Some(spread) = spread {
            self.balancing_metrics
                .team_skill_spread
                .observe(spread as f64);
        }
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("soccer_booking_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "soccer_booking_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("soccer_booking_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        let users_total = IntGauge::new("soccer_booking_users", "Registered accounts")?;
        registry.register(Box::new(users_total.clone()))?;

        let matches_total = IntGauge::new("soccer_booking_matches", "Scheduled matches")?;
        registry.register(Box::new(matches_total.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            component_health,
            users_total,
            matches_total,
        })
    }
}

impl BookingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let bookings_created_total = IntCounter::new(
            "soccer_booking_bookings_created_total",
            "Total bookings accepted",
        )?;
        registry.register(Box::new(bookings_created_total.clone()))?;

        let bookings_rejected_total = IntCounterVec::new(
            Opts::new(
                "soccer_booking_bookings_rejected_total",
                "Total bookings refused",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(bookings_rejected_total.clone()))?;

        let withdrawals_total = IntCounter::new(
            "soccer_booking_withdrawals_total",
            "Total players withdrawn from matches",
        )?;
        registry.register(Box::new(withdrawals_total.clone()))?;

        let active_bookings =
            IntGauge::new("soccer_booking_active_bookings", "Bookings currently held")?;
        registry.register(Box::new(active_bookings.clone()))?;

        let full_matches = IntGauge::new("soccer_booking_full_matches", "Matches at capacity")?;
        registry.register(Box::new(full_matches.clone()))?;

        Ok(Self {
            bookings_created_total,
            bookings_rejected_total,
            withdrawals_total,
            active_bookings,
            full_matches,
        })
    }
}

impl BalancingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let balance_requests_total = IntCounterVec::new(
            Opts::new(
                "soccer_booking_balance_requests_total",
                "Team balancing requests",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(balance_requests_total.clone()))?;

        let balance_duration = Histogram::with_opts(
            HistogramOpts::new(
                "soccer_booking_balance_duration_seconds",
                "Roster assembly and balancing time",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        )?;
        registry.register(Box::new(balance_duration.clone()))?;

        let team_skill_spread = Histogram::with_opts(
            HistogramOpts::new(
                "soccer_booking_team_skill_spread",
                "Skill sum difference between strongest and weakest team",
            )
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0]),
        )?;
        registry.register(Box::new(team_skill_spread.clone()))?;

        Ok(Self {
            balance_requests_total,
            balance_duration,
            team_skill_spread,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        let _service = collector.service();
        let _booking = collector.booking();
        let _balancing = collector.balancing();
        assert!(!collector.registry().gather().is_empty());
    }

    #[test]
    fn test_booking_rejection_reasons() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_booking_created();
        collector.record_booking_rejected(
            &BookingError::CapacityExceeded {
                match_id: 1,
                capacity: 18,
            }
            .into(),
        );
        collector.record_booking_rejected(&anyhow::anyhow!("disk on fire"));

        let rejected = &collector.booking().bookings_rejected_total;
        assert_eq!(rejected.with_label_values(&["capacity"]).get(), 1);
        assert_eq!(rejected.with_label_values(&["error"]).get(), 1);
        assert_eq!(collector.booking().bookings_created_total.get(), 1);
    }

    #[test]
    fn test_balance_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_balance(Some(1), Duration::from_micros(40));
        collector.record_balance(None, Duration::from_micros(5));

        let requests = &collector.balancing().balance_requests_total;
        assert_eq!(requests.with_label_values(&["balanced"]).get(), 1);
        assert_eq!(requests.with_label_values(&["rejected"]).get(), 1);
        assert_eq!(collector.balancing().team_skill_spread.get_sample_count(), 1);
    }

    #[test]
    fn test_health_status_updates() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.update_health_status(2);
        collector.update_component_health("booking_ledger", true);
        collector.update_component_health("player_records", false);
        assert_eq!(collector.service().health_status.get(), 2);
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed() >= Duration::from_millis(10));
        assert!(timer.stop() >= Duration::from_millis(10));
    }
}
