//! Shared plumbing for nincore.
//!
//! This crate holds the error type, file system helpers and the
//! serialization backends that the mapping exporters build on.

pub mod error;
pub mod io;
pub mod serialization;

pub use error::{CommonError, ErrorContext, Result};
pub use serialization::DEFAULT_JSON_INDENT;
