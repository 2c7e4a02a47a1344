//! classmark-store — Storage backends.
//!
//! The HTTP client for the record server, an in-memory store for tests
//! and offline work, the local device snapshot, and configuration
//! loading.

pub mod config;
pub mod device;
pub mod http;
pub mod memory;
