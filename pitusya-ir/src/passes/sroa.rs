//! Drop slots that are never loaded, along with every store into them

use pitusya_common::TempId;
use std::collections::HashSet;
use crate::ir::{Function, Instruction, Value};

pub fn run(function: &mut Function) -> bool {
    let mut loaded: HashSet<TempId> = HashSet::new();
    let mut slots: Vec<TempId> = Vec::new();
    for instr in function.blocks.iter().flat_map(|b| b.instructions.iter()) {
        match instr {
            Instruction::Alloca { result, .. } => slots.push(*result),
            Instruction::Load { ptr: Value::Temp(p), .. } => {
                loaded.insert(*p);
            }
            _ => {}
        }
    }

    let dead: HashSet<TempId> = slots.into_iter().filter(|s| !loaded.contains(s)).collect();
    if dead.is_empty() {
        return false;
    }

    for block in &mut function.blocks {
        block.instructions.retain(|instr| match instr {
            Instruction::Alloca { result, .. } => !dead.contains(result),
            Instruction::Store { ptr: Value::Temp(p), .. } => !dead.contains(p),
            _ => true,
        });
    }
    true
}
