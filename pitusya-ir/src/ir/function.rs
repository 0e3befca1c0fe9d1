//! Function Definitions
//!
//! Defines IR functions with their parameters, blocks, and construction state.

use pitusya_common::{LabelId, TempId};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{BasicBlock, IrType};

/// Construction state of a function body.
///
/// Transitions only move forward: `Declared -> Building -> Terminated ->
/// Verified`. A function abandoned after a lowering error is kept only so
/// that outstanding handles stay valid; it is never printed or finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunctionState {
    Declared,
    Building,
    Terminated,
    Verified,
    Abandoned,
}

impl fmt::Display for FunctionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FunctionState::Declared => "declared",
            FunctionState::Building => "building",
            FunctionState::Terminated => "terminated",
            FunctionState::Verified => "verified",
            FunctionState::Abandoned => "abandoned",
        };
        write!(f, "{name}")
    }
}

/// Function in IR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub return_type: IrType,
    /// Parameters occupy temps `0..arity` in declaration order
    pub parameters: Vec<(TempId, String)>,
    pub blocks: Vec<BasicBlock>,
    pub is_external: bool,
    pub state: FunctionState,
}

impl Function {
    pub fn new(name: String, param_names: &[String]) -> Self {
        Self {
            name,
            return_type: IrType::Double,
            parameters: param_names
                .iter()
                .enumerate()
                .map(|(i, n)| (i as TempId, n.clone()))
                .collect(),
            blocks: Vec::new(),
            is_external: false,
            state: FunctionState::Declared,
        }
    }

    /// Declaration of a host function with no body
    pub fn external(name: String, arity: usize) -> Self {
        let params: Vec<String> = (0..arity).map(|i| format!("arg{i}")).collect();
        let mut function = Self::new(name, &params);
        function.is_external = true;
        function
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|(_, n)| n == name)
    }

    pub fn is_live(&self) -> bool {
        self.state != FunctionState::Abandoned
    }

    pub fn add_block(&mut self, block: BasicBlock) {
        self.blocks.push(block);
    }

    pub fn get_block(&self, id: LabelId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn get_block_mut(&mut self, id: LabelId) -> Option<&mut BasicBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    /// Number of instructions across all blocks
    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instructions.len()).sum()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_external {
            write!(f, "declare {} @{}(", self.return_type, self.name)?;
            for i in 0..self.arity() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "double")?;
            }
            return writeln!(f, ")");
        }

        write!(f, "define {} @{}(", self.return_type, self.name)?;
        for (i, (id, _)) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "double %{id}")?;
        }
        write!(f, ") {{")?;
        if !self.parameters.is_empty() {
            let names: Vec<&str> = self.parameters.iter().map(|(_, n)| n.as_str()).collect();
            write!(f, " ; {}", names.join(", "))?;
        }
        writeln!(f)?;
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        writeln!(f, "}}")
    }
}
