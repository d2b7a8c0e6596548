//! HTTP surface of the booking service
//!
//! Every route shares the application state. Monitoring endpoints from
//! [`crate::metrics::health`] are mounted on the same router.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;

pub use error::{ApiError, ApiResult};
pub use extract::{AdminUser, ApiJson, AuthUser};
pub use router::create_router;
