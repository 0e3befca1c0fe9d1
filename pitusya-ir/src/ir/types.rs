//! IR Type System
//!
//! The language has a single numeric type (`double`). The remaining types
//! exist for comparison results, stack slots and string constants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// IR Type system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrType {
    /// 64-bit IEEE float, the only numeric type
    Double,

    /// Comparison result
    I1,

    /// Byte, element type of string constants
    I8,

    /// Pointer to a stack slot
    Ptr(Box<IrType>),

    /// Array type [size x element_type]
    Array { size: u64, element_type: Box<IrType> },
}

impl IrType {
    /// Byte array holding a string constant of `len` bytes
    pub fn byte_array(len: usize) -> Self {
        IrType::Array {
            size: len as u64,
            element_type: Box::new(IrType::I8),
        }
    }

    pub fn is_double(&self) -> bool {
        matches!(self, IrType::Double)
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Double => write!(f, "double"),
            IrType::I1 => write!(f, "i1"),
            IrType::I8 => write!(f, "i8"),
            IrType::Ptr(target) => write!(f, "{target}*"),
            IrType::Array { size, element_type } => write!(f, "[{size} x {element_type}]"),
        }
    }
}
