//! Instruction combining
//!
//! Local rewrites that keep results bit-identical:
//! `fsub x, C` becomes `fadd x, -C`, and division by a power of two whose
//! reciprocal is a normal double becomes a multiplication.

use crate::ir::{FloatBinaryOp, Function, Instruction, Value};

const MANTISSA_MASK: u64 = (1 << 52) - 1;

/// `1 / c` when it is exact
fn exact_reciprocal(c: f64) -> Option<f64> {
    if !c.is_normal() || c.to_bits() & MANTISSA_MASK != 0 {
        return None;
    }
    let reciprocal = 1.0 / c;
    reciprocal.is_normal().then_some(reciprocal)
}

pub fn run(function: &mut Function) -> bool {
    let mut changed = false;
    for block in &mut function.blocks {
        for instr in &mut block.instructions {
            let Instruction::Binary { op, rhs, .. } = instr else {
                continue;
            };
            let Some(c) = rhs.as_float() else {
                continue;
            };
            match *op {
                FloatBinaryOp::Sub if !c.is_nan() => {
                    *op = FloatBinaryOp::Add;
                    *rhs = Value::ConstFloat(-c);
                    changed = true;
                }
                FloatBinaryOp::Div => {
                    if let Some(reciprocal) = exact_reciprocal(c) {
                        *op = FloatBinaryOp::Mul;
                        *rhs = Value::ConstFloat(reciprocal);
                        changed = true;
                    }
                }
                _ => {}
            }
        }
    }
    changed
}
