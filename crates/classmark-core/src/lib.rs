//! classmark-core — Core data model, session state machine, and grading.
//!
//! This crate defines the fundamental types, the test session lifecycle,
//! and the scoring logic that the entire classmark system builds on.

pub mod error;
pub mod model;
pub mod parser;
pub mod results;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod traits;
