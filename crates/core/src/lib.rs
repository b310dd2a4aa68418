//! Pure domain logic for the Civica report-and-petition platform.
//!
//! No I/O lives here: status enums and their transition rules, goal and
//! deadline validation, signature-progress math, upload constraints, and the
//! shared error taxonomy consumed by the db and api crates.

pub mod error;
pub mod petition;
pub mod report;
pub mod roles;
pub mod types;
pub mod upload;
