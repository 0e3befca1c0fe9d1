//! Dead code elimination
//!
//! Removes pure instructions whose result nobody reads, repeating until
//! nothing changes. Calls stay: the callee may have side effects.

use pitusya_common::TempId;
use std::collections::HashSet;
use crate::ir::Function;

fn used_temps(function: &Function) -> HashSet<TempId> {
    function
        .blocks
        .iter()
        .flat_map(|b| b.instructions.iter())
        .flat_map(|instr| instr.operands())
        .filter_map(|value| value.as_temp())
        .collect()
}

pub fn run(function: &mut Function) -> bool {
    let mut changed = false;
    loop {
        let used = used_temps(function);
        let mut removed = false;
        for block in &mut function.blocks {
            let before = block.instructions.len();
            block.instructions.retain(|instr| {
                !(instr.is_pure() && instr.result().is_some_and(|r| !used.contains(&r)))
            });
            removed |= block.instructions.len() != before;
        }
        if !removed {
            return changed;
        }
        changed = true;
    }
}
