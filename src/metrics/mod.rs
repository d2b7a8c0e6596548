//! Metrics and monitoring for the booking service
//!
//! This module provides Prometheus metrics collection and the health and
//! metrics HTTP endpoints.

pub mod collector;
pub mod health;

pub use collector::{BalancingMetrics, BookingMetrics, MetricsCollector, MetricsTimer, ServiceMetrics};
