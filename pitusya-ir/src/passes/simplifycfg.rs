//! Control flow cleanup
//!
//! The IR has no branches, so only the entry block is reachable. Anything
//! after a block's first terminator is dead, and so is every block after
//! the entry.

use crate::ir::Function;

pub fn run(function: &mut Function) -> bool {
    let mut changed = false;

    for block in &mut function.blocks {
        if let Some(end) = block.instructions.iter().position(|i| i.is_terminator()) {
            if end + 1 < block.instructions.len() {
                block.instructions.truncate(end + 1);
                changed = true;
            }
        }
    }

    if function.blocks.len() > 1 {
        function.blocks.truncate(1);
        changed = true;
    }
    changed
}
