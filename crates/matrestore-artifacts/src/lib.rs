//! Per-run audit trail for restores: a JSON manifest and a markdown worklog.

pub mod manifest;
pub mod store;

pub use manifest::*;
pub use store::*;
