//! HTTP client collaborator for the Retrograde load generator
//!
//! This crate provides the [`HttpClient`] seam used by virtual users, a
//! reqwest-backed implementation that keeps one cookie jar per user, and an
//! in-memory mock client for tests.

pub mod client;
pub mod config;
pub mod errors;
pub mod mock;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpClient, ReqwestClient};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use mock::{MockClient, MockResponse};
pub use types::{HttpMethod, HttpRequest, HttpResponse};
