//! Service layer for the booking platform
//!
//! This module contains the application state, the domain services built on
//! the stores, and health reporting.

pub mod accounts;
pub mod app;
pub mod booking;
pub mod health;
pub mod query;
pub mod schedule;

pub use accounts::AccountService;
pub use app::{AppState, ServiceError};
pub use booking::BookingService;
pub use health::{HealthCheck, HealthStatus, ServiceStats};
pub use query::MatchQueryService;
pub use schedule::ScheduleService;
