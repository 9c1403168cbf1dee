//! Prelude module for subscription_term crate.
//!
//! Re-exports the derive macros used across the crate from derive_more.

pub use derive_more::Display;
