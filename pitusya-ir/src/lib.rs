//! Pitusya Compiler - Code Generation Backend
//!
//! This crate lowers an already parsed Pitusya AST into a typed,
//! LLVM-flavoured IR and finalizes it:
//! - IR: types, values, instructions, functions, module and builder
//! - Session: owns the module, the builder and the handle arenas
//! - Lowering: slots, function builder, expressions, top-level wrappers
//! - Verifier and the finalization pass pipeline
//! - Evaluator: runs verified functions with the runtime library
//! - Code generator: drives a session from AST items

pub mod ast;
pub mod codegen;
pub mod eval;
pub mod handle;
pub mod ir;
pub mod passes;
pub mod session;
pub mod target;
pub mod verify;

mod lower;

#[cfg(test)]
mod tests;

pub use ast::{BinaryOp, Expr, FunctionDef, Item, Program, Prototype, Stmt};
pub use codegen::{CodeGenerator, Generated, MAIN_FUNCTION};
pub use eval::{Evaluator, RUNTIME_LIBRARY};
pub use handle::{FunctionId, SessionId, SlotId, ValueId};
pub use ir::{CmpPredicate, FloatBinaryOp, FunctionState, IrType, Module, Value};
pub use passes::{Pass, PassPipeline, STANDARD_PIPELINE};
pub use session::{Session, SessionOptions, TOP_LEVEL_STEM};
pub use target::{OptLevel, TargetMachine};

pub use lower::ENTRY_BLOCK;
