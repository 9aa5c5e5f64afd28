//! # API Shared
//!
//! Shared utilities and wire types for the CHORDS HTTP surface.
//!
//! Contains:
//! - `HealthService` and its response type
//! - Bearer-token checking used by the REST service
//! - Request and error bodies shared by server and client

pub mod auth;
pub mod health;
pub mod wire;

pub use auth::{bearer_token, validate_api_key, ApiKeyError};
pub use health::{HealthRes, HealthService};
pub use wire::{AckRes, EmergencyCodeReq, ErrorRes, SearchParams};
