//! Promote slots to values
//!
//! A slot whose address is only ever used by loads and stores is removed:
//! every load is replaced by the value most recently stored, or `undef`
//! when nothing was stored yet.

use pitusya_common::TempId;
use std::collections::{HashMap, HashSet};
use crate::ir::{Function, Instruction, Value};
use super::Substitutions;

fn promotable_slots(function: &Function) -> HashSet<TempId> {
    let mut slots: HashSet<TempId> = function
        .blocks
        .iter()
        .flat_map(|b| b.instructions.iter())
        .filter_map(|instr| match instr {
            Instruction::Alloca { result, .. } => Some(*result),
            _ => None,
        })
        .collect();

    // An address used anywhere but as the pointer of a load or store escapes
    for instr in function.blocks.iter().flat_map(|b| b.instructions.iter()) {
        let escaping: Vec<&Value> = match instr {
            Instruction::Load { .. } => Vec::new(),
            Instruction::Store { value, .. } => vec![value],
            other => other.operands(),
        };
        for value in escaping {
            if let Some(t) = value.as_temp() {
                slots.remove(&t);
            }
        }
    }
    slots
}

pub fn run(function: &mut Function) -> bool {
    let slots = promotable_slots(function);
    if slots.is_empty() {
        return false;
    }

    let mut subst = Substitutions::default();
    let mut current: HashMap<TempId, Value> = HashMap::new();

    for block in &mut function.blocks {
        let mut kept = Vec::with_capacity(block.instructions.len());
        for mut instr in block.instructions.drain(..) {
            subst.apply(&mut instr);
            match &instr {
                Instruction::Alloca { result, .. } if slots.contains(result) => continue,
                Instruction::Store { value, ptr: Value::Temp(p) } if slots.contains(p) => {
                    current.insert(*p, value.clone());
                    continue;
                }
                Instruction::Load { result, ptr: Value::Temp(p), .. } if slots.contains(p) => {
                    let value = current.get(p).cloned().unwrap_or(Value::Undef);
                    subst.insert(*result, value);
                    continue;
                }
                _ => {}
            }
            kept.push(instr);
        }
        block.instructions = kept;
    }

    subst.apply_to(function);
    true
}
