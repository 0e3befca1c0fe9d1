//! Lowering primitives
//!
//! The operations the code generator drives, implemented on [`Session`]:
//! - `function` - function builder (begin, parameters, end, verify)
//! - `slots` - stack slots backing mutable variables
//! - `expr` - arithmetic, comparisons and calls
//! - `toplevel` - wrapper functions for top-level expressions
//!
//! [`Session`]: crate::Session

mod expr;
mod function;
mod slots;
mod toplevel;

pub use function::ENTRY_BLOCK;
