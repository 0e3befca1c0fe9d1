//! IR Value Representations
//!
//! Defines values that can be used as operands in IR instructions,
//! including temporaries, constants and function references.

use pitusya_common::TempId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// IR Value - represents operands in IR instructions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Temporary (parameter or instruction result)
    Temp(TempId),

    /// Constant double
    ConstFloat(f64),

    /// Constant comparison result
    ConstBool(bool),

    /// Constant byte string, no terminator implied
    ConstString(Vec<u8>),

    /// Function reference
    Function(String),

    /// Undefined value (read of a slot before any store)
    Undef,
}

impl Value {
    pub fn as_temp(&self) -> Option<TempId> {
        match self {
            Value::Temp(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::ConstFloat(n) => Some(*n),
            _ => None,
        }
    }
}

/// Structural identity: float constants compare by bit pattern, so `0.0`
/// and `-0.0` are different values and `NaN` equals itself.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Temp(a), Value::Temp(b)) => a == b,
            (Value::ConstFloat(a), Value::ConstFloat(b)) => a.to_bits() == b.to_bits(),
            (Value::ConstBool(a), Value::ConstBool(b)) => a == b,
            (Value::ConstString(a), Value::ConstString(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Undef, Value::Undef) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Temp(id) => write!(f, "%{id}"),
            Value::ConstFloat(val) => write!(f, "{val:?}"),
            Value::ConstBool(val) => write!(f, "{val}"),
            Value::ConstString(bytes) => {
                write!(f, "c\"")?;
                for &byte in bytes {
                    if (byte.is_ascii_graphic() && byte != b'"' && byte != b'\\') || byte == b' ' {
                        write!(f, "{}", byte as char)?;
                    } else {
                        write!(f, "\\{byte:02X}")?;
                    }
                }
                write!(f, "\"")
            }
            Value::Function(name) => write!(f, "@{name}"),
            Value::Undef => write!(f, "undef"),
        }
    }
}
