//! Image upload service
//!
//! Thin HTTP glue over the `image_store` crate: routing, bearer-token
//! identity resolution, environment configuration and the error envelope.

/// Identity extraction
pub mod middleware;

/// Handler modules
pub mod routes;

/// Server assembly and startup
pub mod server;

/// Application state
pub mod state;

/// Environment configuration and error handling
pub mod types;
