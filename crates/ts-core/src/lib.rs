//! threadspire/crates/ts-core/src/lib.rs
//!
//! The central domain model and interface definitions for ThreadSpire.

pub mod error;
pub mod models;
pub mod query;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use query::*;
pub use traits::*;
