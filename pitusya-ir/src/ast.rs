//! AST consumed by the code generator
//!
//! The parser lives outside this crate; programs arrive as these types,
//! typically deserialized from JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{CmpPredicate, FloatBinaryOp};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add, Sub, Mul, Div,

    // Comparison
    Equal, NotEqual, Less, LessEqual, Greater, GreaterEqual,
}

/// What a binary operator lowers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpLowering {
    Arithmetic(FloatBinaryOp),
    Comparison(CmpPredicate),
}

impl BinaryOp {
    pub fn lowering(self) -> OpLowering {
        match self {
            BinaryOp::Add => OpLowering::Arithmetic(FloatBinaryOp::Add),
            BinaryOp::Sub => OpLowering::Arithmetic(FloatBinaryOp::Sub),
            BinaryOp::Mul => OpLowering::Arithmetic(FloatBinaryOp::Mul),
            BinaryOp::Div => OpLowering::Arithmetic(FloatBinaryOp::Div),
            BinaryOp::Equal => OpLowering::Comparison(CmpPredicate::Oeq),
            BinaryOp::NotEqual => OpLowering::Comparison(CmpPredicate::One),
            BinaryOp::Less => OpLowering::Comparison(CmpPredicate::Olt),
            BinaryOp::LessEqual => OpLowering::Comparison(CmpPredicate::Ole),
            BinaryOp::Greater => OpLowering::Comparison(CmpPredicate::Ogt),
            BinaryOp::GreaterEqual => OpLowering::Comparison(CmpPredicate::Oge),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        };
        write!(f, "{op_str}")
    }
}

/// AST Expression nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Numeric literal
    Number(f64),

    /// String literal
    Str(String),

    /// Variable or parameter reference
    Variable(String),

    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Function call
    Call { callee: String, args: Vec<Expr> },
}

/// Statements of a function body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `let name = value;`
    Let { name: String, value: Expr },

    /// `name = value;`
    Assign { name: String, value: Expr },

    /// Expression evaluated for its side effects
    Expr(Expr),

    /// `ret value;`
    Return(Expr),
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub proto: Prototype,
    pub body: Vec<Stmt>,
}

/// A top-level item, handed to the code generator one at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Function(FunctionDef),
    Extern(Prototype),
    /// Expression evaluated immediately, REPL style
    Expr(Expr),
}

/// A whole program
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Item>,
}

impl Program {
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Expr {
    pub fn number(n: f64) -> Self {
        Expr::Number(n)
    }

    pub fn var(name: &str) -> Self {
        Expr::Variable(name.to_string())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(callee: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: callee.to_string(),
            args,
        }
    }
}

impl Prototype {
    pub fn new(name: &str, params: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_program_from_json() {
        let source = r#"{
            "items": [
                {"Extern": {"name": "print", "params": ["n"]}},
                {"Function": {
                    "proto": {"name": "main", "params": []},
                    "body": [
                        {"Let": {"name": "x", "value": {"Number": 2.0}}},
                        {"Return": {"Call": {"callee": "print", "args": [{"Variable": "x"}]}}}
                    ]
                }},
                {"Expr": {"Binary": {"op": "Less", "left": {"Number": 1.0}, "right": {"Number": 2.0}}}}
            ]
        }"#;

        let program = Program::from_json(source).unwrap();
        assert_eq!(program.items.len(), 3);
        assert_eq!(program.items[0], Item::Extern(Prototype::new("print", &["n"])));
        assert_eq!(
            program.items[2],
            Item::Expr(Expr::binary(BinaryOp::Less, Expr::number(1.0), Expr::number(2.0)))
        );

        let again = Program::from_json(&program.to_json().unwrap()).unwrap();
        assert_eq!(again, program);
    }

    #[test]
    fn test_operator_lowering() {
        assert_eq!(BinaryOp::Div.lowering(), OpLowering::Arithmetic(FloatBinaryOp::Div));
        assert_eq!(BinaryOp::NotEqual.lowering(), OpLowering::Comparison(CmpPredicate::One));
        assert_eq!(BinaryOp::GreaterEqual.to_string(), ">=");
    }
}
