//! # CHORDS API client
//!
//! JSON-over-HTTP access to the CHORDS API:
//! - [`ApiClient`]: `get`/`post`/`put`/`delete` against a base URL with an optional bearer token
//! - [`HttpBackend`]: the doctor workflow's backend seam implemented on top of the client

pub mod backend;
pub mod client;
pub mod error;

pub use backend::HttpBackend;
pub use client::ApiClient;
pub use error::ApiError;
