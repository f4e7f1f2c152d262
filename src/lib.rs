//! Library database initializer.
//!
//! Drops and recreates the `books`, `members` and `loans` collections with
//! their indexes, inserts a small sample catalogue and reports what landed.

pub mod fixtures;
pub mod modules;
pub mod report;
pub mod setup;
pub mod utils;

pub use report::VerificationReport;
