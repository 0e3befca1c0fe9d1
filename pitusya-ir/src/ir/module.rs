//! Module
//!
//! Defines the top-level compilation unit. A session owns exactly one.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::Function;

/// Default name of the module a session creates
pub const DEFAULT_MODULE_NAME: &str = "pitusya module";

/// IR Module - represents a complete compilation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub target_triple: Option<String>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: String) -> Self {
        Self {
            name,
            target_triple: None,
            functions: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: Function) -> usize {
        self.functions.push(function);
        self.functions.len() - 1
    }

    /// Look up a live (not abandoned) function by name
    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.is_live() && f.name == name)
    }

    pub fn function_index(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.is_live() && f.name == name)
    }

    /// Live functions in definition order
    pub fn live_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| f.is_live())
    }

    /// Drop abandoned functions for good
    pub fn remove_abandoned(&mut self) -> usize {
        let before = self.functions.len();
        self.functions.retain(Function::is_live);
        before - self.functions.len()
    }

    pub fn instruction_count(&self) -> usize {
        self.live_functions().map(Function::instruction_count).sum()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        if let Some(triple) = &self.target_triple {
            writeln!(f, "target triple = \"{triple}\"")?;
        }
        for function in self.live_functions() {
            writeln!(f)?;
            write!(f, "{function}")?;
        }
        Ok(())
    }
}
