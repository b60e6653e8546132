#![deny(missing_docs)]

//! Core library for the student records REST API.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Request-boundary error translation.
pub mod error;
/// Structured logging and tracing setup.
pub mod logging;
/// Document store seam and its MongoDB and in-memory backends.
pub mod store;
/// Student record types and payload validation.
pub mod students;
