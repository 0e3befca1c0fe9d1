//! IR Operations
//!
//! Floating point arithmetic operators and ordered comparison predicates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary floating point operations in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl FloatBinaryOp {
    /// Evaluate the operation with IEEE-754 double semantics
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            FloatBinaryOp::Add => lhs + rhs,
            FloatBinaryOp::Sub => lhs - rhs,
            FloatBinaryOp::Mul => lhs * rhs,
            FloatBinaryOp::Div => lhs / rhs,
        }
    }

    pub fn is_commutative(self) -> bool {
        matches!(self, FloatBinaryOp::Add | FloatBinaryOp::Mul)
    }
}

impl fmt::Display for FloatBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            FloatBinaryOp::Add => "fadd",
            FloatBinaryOp::Sub => "fsub",
            FloatBinaryOp::Mul => "fmul",
            FloatBinaryOp::Div => "fdiv",
        };
        write!(f, "{op_str}")
    }
}

/// Ordered floating point comparison predicates (return i1)
///
/// Every predicate is false when either operand is NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpPredicate {
    Oeq,
    One,
    Olt,
    Ole,
    Ogt,
    Oge,
}

impl CmpPredicate {
    pub fn evaluate(self, lhs: f64, rhs: f64) -> bool {
        if lhs.is_nan() || rhs.is_nan() {
            return false;
        }
        match self {
            CmpPredicate::Oeq => lhs == rhs,
            CmpPredicate::One => lhs != rhs,
            CmpPredicate::Olt => lhs < rhs,
            CmpPredicate::Ole => lhs <= rhs,
            CmpPredicate::Ogt => lhs > rhs,
            CmpPredicate::Oge => lhs >= rhs,
        }
    }
}

impl fmt::Display for CmpPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            CmpPredicate::Oeq => "oeq",
            CmpPredicate::One => "one",
            CmpPredicate::Olt => "olt",
            CmpPredicate::Ole => "ole",
            CmpPredicate::Ogt => "ogt",
            CmpPredicate::Oge => "oge",
        };
        write!(f, "{op_str}")
    }
}
