//! Intermediate Representation for Pitusya
//!
//! An LLVM-flavoured, typed, straight-line IR. Functions take and return
//! `double`; mutable variables live in stack slots until `mem2reg`
//! promotes them.
//!
//! ## Architecture
//!
//! - `types` - Type system (IrType)
//! - `values` - Value representations
//! - `ops` - Arithmetic operators and comparison predicates
//! - `instructions` - IR instructions
//! - `blocks` - Basic block management
//! - `function` - Function definitions and construction state
//! - `module` - The compilation unit
//! - `builder` - Insertion cursor used to append instructions

pub use self::types::IrType;
pub use self::values::Value;
pub use self::ops::{CmpPredicate, FloatBinaryOp};
pub use self::instructions::Instruction;
pub use self::blocks::BasicBlock;
pub use self::function::{Function, FunctionState};
pub use self::module::{Module, DEFAULT_MODULE_NAME};
pub use self::builder::{InsertPoint, IrBuilder};

mod types;
mod values;
mod ops;
mod instructions;
mod blocks;
mod function;
mod module;
mod builder;

#[cfg(test)]
mod tests;
