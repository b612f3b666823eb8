//! Shared runtime helpers for the lunch tracker services: logging setup and
//! environment/directory checks used by both binaries.

pub mod env;
pub mod utils;
