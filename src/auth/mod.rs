//! Authentication primitives
//!
//! Password hashing for stored accounts and signed access tokens for API
//! callers.

pub mod password;
pub mod token;

pub use password::{BcryptPasswordHasher, PasswordHasher};
pub use token::{Claims, TokenIssuer};
