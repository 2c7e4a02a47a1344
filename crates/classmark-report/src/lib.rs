//! classmark-report — CSV and HTML exports of published results.
//!
//! Both exporters work off a slice of [`ResultRecord`]s fetched from a
//! record store (or loaded from a saved JSON file) and produce
//! self-contained output files.
//!
//! [`ResultRecord`]: classmark_core::results::ResultRecord

pub mod csv;
pub mod html;
