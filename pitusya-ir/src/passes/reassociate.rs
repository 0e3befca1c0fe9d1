//! Canonical operand order for commutative operations: constants go on the
//! right, temps are ordered by number.

use crate::ir::{Function, Instruction, Value};

fn rank(value: &Value) -> (u8, u32) {
    match value {
        Value::Temp(id) => (0, *id),
        Value::Undef => (1, 0),
        _ => (2, 0),
    }
}

pub fn run(function: &mut Function) -> bool {
    let mut changed = false;
    for block in &mut function.blocks {
        for instr in &mut block.instructions {
            if let Instruction::Binary { op, lhs, rhs, .. } = instr {
                if op.is_commutative() && rank(lhs) > rank(rhs) {
                    std::mem::swap(lhs, rhs);
                    changed = true;
                }
            }
        }
    }
    changed
}
