//! classmark-session — Session delivery.
//!
//! Wraps the core state machine with everything a live attempt needs:
//! a clock, the submission pipeline that publishes results with retry,
//! an async driver that runs the countdown alongside student input, and
//! scripted answer files for unattended runs.

pub mod clock;
pub mod driver;
pub mod proctor;
pub mod script;
