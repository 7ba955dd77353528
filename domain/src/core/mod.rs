//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`record::LogRecord`]: the immutable input item under evaluation

pub mod error;
pub mod record;
