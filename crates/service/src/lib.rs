//! Store layer providing the durable collections behind the HTTP API.
//! - Two CSV-backed tables (vendors, meals) with full read-modify-rewrite
//!   semantics and a per-collection lock around each mutation.
//! - Normalization rules live here: lenient parsing on read, strict
//!   validation before any write.
//! - Rating rules differ between the two services and are injected as a
//!   [`policy::RatePolicy`].

pub mod errors;
pub mod images;
pub mod meals;
pub mod policy;
pub mod runtime;
pub mod storage;
pub mod vendors;
