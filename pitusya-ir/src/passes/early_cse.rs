//! Early common subexpression elimination
//!
//! Within a block, a pure instruction identical to an earlier one is
//! replaced by the earlier result, and a load from a slot whose contents
//! are already known (from a store or an earlier load) is replaced by that
//! value.

use pitusya_common::TempId;
use std::collections::HashMap;
use crate::ir::{Function, Instruction, Value};
use super::{expression_key, Substitutions};

pub fn run(function: &mut Function) -> bool {
    let mut subst = Substitutions::default();
    let mut changed = false;

    for block in &mut function.blocks {
        let mut expressions: Vec<(Instruction, TempId)> = Vec::new();
        let mut known: HashMap<TempId, Value> = HashMap::new();
        let mut kept = Vec::with_capacity(block.instructions.len());

        for mut instr in block.instructions.drain(..) {
            subst.apply(&mut instr);
            match &instr {
                Instruction::Store { value, ptr: Value::Temp(p) } => {
                    known.insert(*p, value.clone());
                }
                Instruction::Load { result, ptr: Value::Temp(p), .. } => {
                    if let Some(value) = known.get(p) {
                        subst.insert(*result, value.clone());
                        changed = true;
                        continue;
                    }
                    known.insert(*p, Value::Temp(*result));
                }
                _ => {
                    if let (Some(key), Some(result)) = (expression_key(&instr), instr.result()) {
                        if let Some((_, earlier)) = expressions.iter().find(|(k, _)| *k == key) {
                            subst.insert(result, Value::Temp(*earlier));
                            changed = true;
                            continue;
                        }
                        expressions.push((key, result));
                    }
                }
            }
            kept.push(instr);
        }
        block.instructions = kept;
    }

    subst.apply_to(function);
    changed
}
