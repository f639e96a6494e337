//! # Portal Core
//!
//! The domain layer of the news portal.
//! Entities, ports and the business rules (rating, filtering, form validation,
//! subscription notification, censoring) with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
