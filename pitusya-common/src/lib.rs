//! Pitusya Compiler - Common Types and Utilities
//!
//! This crate contains shared identifiers, error definitions, and diagnostic
//! reporting used by the code generator and the driver.

pub mod error;
pub mod types;

pub use error::{CompilerError, Diagnostic, ErrorReporter, Severity};
pub use types::*;
