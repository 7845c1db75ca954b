//! hs-core: stable foundation for hydrostat.
//!
//! Contains:
//! - numeric (Real + tolerances + rounding/clipping helpers)
//! - ids (external model identifiers vs. result-store positions)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HsError, HsResult};
pub use ids::*;
pub use numeric::*;
