//! Instruction simplification
//!
//! Folds instructions whose operands are all constants and removes the
//! identities that hold for every IEEE double, signed zeros and NaN
//! included: `x + -0.0`, `x - 0.0`, `x * 1.0` and `x / 1.0`.

use crate::ir::{FloatBinaryOp, Function, Instruction, Value};
use super::Substitutions;

fn is_bits(value: &Value, n: f64) -> bool {
    value.as_float().is_some_and(|v| v.to_bits() == n.to_bits())
}

fn simplify(instr: &Instruction) -> Option<Value> {
    match instr {
        Instruction::Binary { op, lhs, rhs, .. } => {
            if let (Some(a), Some(b)) = (lhs.as_float(), rhs.as_float()) {
                return Some(Value::ConstFloat(op.apply(a, b)));
            }
            match op {
                FloatBinaryOp::Add if is_bits(rhs, -0.0) => Some(lhs.clone()),
                FloatBinaryOp::Add if is_bits(lhs, -0.0) => Some(rhs.clone()),
                FloatBinaryOp::Sub if is_bits(rhs, 0.0) => Some(lhs.clone()),
                FloatBinaryOp::Mul if is_bits(rhs, 1.0) => Some(lhs.clone()),
                FloatBinaryOp::Mul if is_bits(lhs, 1.0) => Some(rhs.clone()),
                FloatBinaryOp::Div if is_bits(rhs, 1.0) => Some(lhs.clone()),
                _ => None,
            }
        }
        Instruction::FCmp { predicate, lhs, rhs, .. } => match (lhs.as_float(), rhs.as_float()) {
            (Some(a), Some(b)) => Some(Value::ConstBool(predicate.evaluate(a, b))),
            _ => None,
        },
        Instruction::UIToFP { value: Value::ConstBool(b), .. } => {
            Some(Value::ConstFloat(if *b { 1.0 } else { 0.0 }))
        }
        _ => None,
    }
}

pub fn run(function: &mut Function) -> bool {
    let mut subst = Substitutions::default();
    let mut changed = false;

    for block in &mut function.blocks {
        let mut kept = Vec::with_capacity(block.instructions.len());
        for mut instr in block.instructions.drain(..) {
            subst.apply(&mut instr);
            if let (Some(result), Some(value)) = (instr.result(), simplify(&instr)) {
                subst.insert(result, value);
                changed = true;
                continue;
            }
            kept.push(instr);
        }
        block.instructions = kept;
    }

    subst.apply_to(function);
    changed
}
