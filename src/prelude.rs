//! Derive macros shared by the crate's small enums.

pub use derive_more::Display;
