//! IR Instructions
//!
//! Defines all instruction types available in the IR.

use pitusya_common::TempId;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{CmpPredicate, FloatBinaryOp, IrType, Value};

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Allocate a stack slot: result = alloca type
    Alloca {
        result: TempId,
        alloc_type: IrType,
        /// Source-level variable name, kept for printing
        name: String,
    },

    /// Load from a slot: result = load ptr
    Load {
        result: TempId,
        ptr: Value,
        result_type: IrType,
    },

    /// Store to a slot: store value, ptr
    Store {
        value: Value,
        ptr: Value,
    },

    /// Floating point arithmetic: result = op lhs, rhs
    Binary {
        result: TempId,
        op: FloatBinaryOp,
        lhs: Value,
        rhs: Value,
    },

    /// Ordered floating point comparison: result = fcmp pred lhs, rhs
    FCmp {
        result: TempId,
        predicate: CmpPredicate,
        lhs: Value,
        rhs: Value,
    },

    /// Unsigned integer to floating point: result = uitofp i1 value to double
    UIToFP {
        result: TempId,
        value: Value,
    },

    /// Function call: result = call func(args...)
    Call {
        result: TempId,
        function: Value,
        args: Vec<Value>,
    },

    /// Return: ret value
    Return(Value),
}

impl Instruction {
    /// The temporary defined by this instruction, if any
    pub fn result(&self) -> Option<TempId> {
        match self {
            Instruction::Alloca { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::Binary { result, .. }
            | Instruction::FCmp { result, .. }
            | Instruction::UIToFP { result, .. }
            | Instruction::Call { result, .. } => Some(*result),
            Instruction::Store { .. } | Instruction::Return(_) => None,
        }
    }

    /// Type of the defined temporary
    pub fn result_type(&self) -> Option<IrType> {
        match self {
            Instruction::Alloca { alloc_type, .. } => Some(IrType::Ptr(Box::new(alloc_type.clone()))),
            Instruction::Load { result_type, .. } => Some(result_type.clone()),
            Instruction::Binary { .. } | Instruction::UIToFP { .. } | Instruction::Call { .. } => {
                Some(IrType::Double)
            }
            Instruction::FCmp { .. } => Some(IrType::I1),
            Instruction::Store { .. } | Instruction::Return(_) => None,
        }
    }

    /// All operands read by this instruction
    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Alloca { .. } => Vec::new(),
            Instruction::Load { ptr, .. } => vec![ptr],
            Instruction::Store { value, ptr } => vec![value, ptr],
            Instruction::Binary { lhs, rhs, .. } | Instruction::FCmp { lhs, rhs, .. } => vec![lhs, rhs],
            Instruction::UIToFP { value, .. } => vec![value],
            Instruction::Call { function, args, .. } => {
                let mut ops = vec![function];
                ops.extend(args.iter());
                ops
            }
            Instruction::Return(value) => vec![value],
        }
    }

    pub fn operands_mut(&mut self) -> Vec<&mut Value> {
        match self {
            Instruction::Alloca { .. } => Vec::new(),
            Instruction::Load { ptr, .. } => vec![ptr],
            Instruction::Store { value, ptr } => vec![value, ptr],
            Instruction::Binary { lhs, rhs, .. } | Instruction::FCmp { lhs, rhs, .. } => vec![lhs, rhs],
            Instruction::UIToFP { value, .. } => vec![value],
            Instruction::Call { function, args, .. } => {
                let mut ops = vec![function];
                ops.extend(args.iter_mut());
                ops
            }
            Instruction::Return(value) => vec![value],
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Return(_))
    }

    /// Instructions that can be removed when their result is unused
    pub fn is_pure(&self) -> bool {
        matches!(
            self,
            Instruction::Alloca { .. }
                | Instruction::Load { .. }
                | Instruction::Binary { .. }
                | Instruction::FCmp { .. }
                | Instruction::UIToFP { .. }
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Alloca { result, alloc_type, name } => {
                write!(f, "%{result} = alloca {alloc_type} ; {name}")
            }
            Instruction::Load { result, ptr, result_type } => {
                write!(f, "%{result} = load {result_type}, {result_type}* {ptr}")
            }
            Instruction::Store { value, ptr } => {
                write!(f, "store double {value}, double* {ptr}")
            }
            Instruction::Binary { result, op, lhs, rhs } => {
                write!(f, "%{result} = {op} double {lhs}, {rhs}")
            }
            Instruction::FCmp { result, predicate, lhs, rhs } => {
                write!(f, "%{result} = fcmp {predicate} double {lhs}, {rhs}")
            }
            Instruction::UIToFP { result, value } => {
                write!(f, "%{result} = uitofp i1 {value} to double")
            }
            Instruction::Call { result, function, args } => {
                write!(f, "%{result} = call double {function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "double {arg}")?;
                }
                write!(f, ")")
            }
            Instruction::Return(value) => write!(f, "ret double {value}"),
        }
    }
}
