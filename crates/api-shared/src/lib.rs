//! # API Shared
//!
//! Shared utilities and definitions for MedRef APIs.
//!
//! Contains:
//! - Wire types exchanged over HTTP (`wire` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` on the server side and `medref-client` on the client side, so both ends
//! agree on the JSON shapes.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
