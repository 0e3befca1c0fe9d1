//! Top-level expression wrapper
//!
//! A top-level expression is hosted by a fresh zero-argument function so it
//! can be verified and evaluated like any other. Wrapper names come from
//! the reserved `__anon_expr` family and never repeat within a session.

use log::debug;
use pitusya_common::CompilerError;
use crate::handle::{FunctionId, ValueId};
use crate::session::Session;

impl Session {
    /// Wrap an already computed value: create the wrapper, return the
    /// value from it and verify it.
    pub fn wrap_top_level(&mut self, result: ValueId) -> Result<FunctionId, CompilerError> {
        self.ensure_usable()?;
        if let Some(owner) = self.resolve_value(result)?.function {
            return Err(CompilerError::construction_error(
                self.function_name_at(owner),
                format!("{result} is local to another function and cannot be wrapped"),
            ));
        }

        let wrapper = self.begin_top_level()?;
        self.finish_top_level(wrapper, result)?;
        Ok(wrapper)
    }

    /// Create a wrapper and move the cursor into it, so the expression can
    /// be lowered inside
    pub fn begin_top_level(&mut self) -> Result<FunctionId, CompilerError> {
        self.ensure_usable()?;
        let name = self.wrapper_names.next_name();
        debug!("Wrapping top-level expression in {name}");
        self.begin_function_unchecked(name, &[])
    }

    /// Return `result` from the wrapper and verify it
    pub fn finish_top_level(&mut self, wrapper: FunctionId, result: ValueId) -> Result<(), CompilerError> {
        self.end_function(wrapper, result)?;
        self.verify_function(wrapper)
    }

    /// Whether `function` hosts a top-level expression
    pub fn is_top_level(&self, function: FunctionId) -> Result<bool, CompilerError> {
        let name = self.function_name(function)?;
        Ok(self.wrapper_names.is_reserved(name))
    }
}
