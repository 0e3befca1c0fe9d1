//! Function builder
//!
//! Functions move through `Declared -> Building -> Terminated -> Verified`
//! and are never reopened.

use log::{debug, info};
use pitusya_common::CompilerError;
use crate::handle::{FunctionId, ValueId};
use crate::ir::{Function, FunctionState, IrType, Value};
use crate::session::{FunctionEntry, Session};
use crate::verify;

/// Label of the single block every function body starts with
pub const ENTRY_BLOCK: &str = "entry";

impl Session {
    /// Register a function, append its entry block and move the cursor there
    pub fn begin_function(&mut self, name: &str, param_names: &[&str]) -> Result<FunctionId, CompilerError> {
        self.ensure_usable()?;
        if self.wrapper_names.is_reserved(name) {
            return Err(CompilerError::construction_error(
                name,
                format!("Function name {name} is reserved for top-level expressions"),
            ));
        }
        self.begin_function_unchecked(name.to_string(), param_names)
    }

    pub(crate) fn begin_function_unchecked(&mut self, name: String, param_names: &[&str]) -> Result<FunctionId, CompilerError> {
        self.check_new_function_name(&name)?;
        for (i, param) in param_names.iter().enumerate() {
            if param_names[..i].contains(param) {
                return Err(CompilerError::construction_error(
                    name,
                    format!("Duplicate parameter {param}"),
                ));
            }
        }

        let params: Vec<String> = param_names.iter().map(|p| p.to_string()).collect();
        let mut function = Function::new(name.clone(), &params);
        function.state = FunctionState::Building;
        let index = self.module.add_function(function);

        let entry = self.builder.append_block(&mut self.module, index, ENTRY_BLOCK)?;
        self.builder.position_at_end(&self.module, index, entry)?;

        let param_ids = (0..params.len())
            .map(|i| self.intern(Value::Temp(i as u32), IrType::Double, Some(index)))
            .collect();
        debug!("Begin function {name}({})", params.join(", "));
        Ok(self.register_function(index, param_ids))
    }

    /// Declare a body-less function provided by the host
    pub fn declare_function(&mut self, name: &str, arity: usize) -> Result<FunctionId, CompilerError> {
        self.ensure_usable()?;
        if self.wrapper_names.is_reserved(name) {
            return Err(CompilerError::construction_error(
                name,
                format!("Function name {name} is reserved for top-level expressions"),
            ));
        }
        self.check_new_function_name(name)?;

        let index = self.module.add_function(Function::external(name.to_string(), arity));
        debug!("Declared external function {name} with {arity} parameter(s)");
        Ok(self.register_function(index, Vec::new()))
    }

    /// Parameter `index` of `function`
    pub fn param(&self, function: FunctionId, index: usize) -> Result<ValueId, CompilerError> {
        let entry = self.resolve_function(function)?;
        entry.params.get(index).copied().ok_or_else(|| {
            let name = self.function_name_at(entry.index);
            CompilerError::construction_error(
                name.clone(),
                format!("Function {name} has {} parameter(s), no parameter {index}", entry.params.len()),
            )
        })
    }

    /// Parameter of `function` with the given source name
    pub fn param_by_name(&self, function: FunctionId, name: &str) -> Result<ValueId, CompilerError> {
        let entry = self.resolve_function(function)?;
        let ir_function = &self.module.functions[entry.index];
        match ir_function.param_index(name) {
            Some(i) if !ir_function.is_external => self.param(function, i),
            _ => Err(CompilerError::construction_error(
                ir_function.name.clone(),
                format!("Function {} has no parameter {name}", ir_function.name),
            )),
        }
    }

    /// Emit `ret value`, the last instruction of the body
    pub fn end_function(&mut self, function: FunctionId, value: ValueId) -> Result<(), CompilerError> {
        self.ensure_usable()?;
        let index = self.resolve_function(function)?.index;
        let building = self.building_function();
        if building.as_ref().ok() != Some(&index) {
            let name = self.function_name_at(index);
            let state = self.module.functions[index].state;
            return Err(CompilerError::construction_error(
                name.clone(),
                format!("Cannot end function {name}: it is {state} or not under the cursor"),
            ));
        }

        let value = self.double_operand(value, index)?;
        self.builder.build_return(&mut self.module, value)?;
        self.module.functions[index].state = FunctionState::Terminated;
        debug!("End function {}", self.function_name_at(index));
        Ok(())
    }

    /// Check the function's structure and types. A failure is fatal: the
    /// session is poisoned and refuses every later mutation.
    pub fn verify_function(&mut self, function: FunctionId) -> Result<(), CompilerError> {
        self.ensure_usable()?;
        let index = self.resolve_function(function)?.index;
        let ir_function = &self.module.functions[index];
        match ir_function.state {
            FunctionState::Verified => return Ok(()),
            FunctionState::Abandoned => {
                return Err(CompilerError::construction_error(
                    ir_function.name.clone(),
                    format!("Function {} was abandoned", ir_function.name),
                ))
            }
            _ => {}
        }

        if let Err(err) = verify::verify_function(&self.module, ir_function) {
            let name = ir_function.name.clone();
            self.poison(&name);
            return Err(err);
        }

        let ir_function = &mut self.module.functions[index];
        if !ir_function.is_external {
            ir_function.state = FunctionState::Verified;
        }
        info!("Verified function {}", ir_function.name);
        Ok(())
    }

    /// Discard a half-built function after a lowering error so that the
    /// module stays well formed. Verified functions cannot be abandoned.
    pub fn abandon_function(&mut self, function: FunctionId) -> Result<(), CompilerError> {
        self.ensure_usable()?;
        let index = self.resolve_function(function)?.index;
        let ir_function = &mut self.module.functions[index];
        if ir_function.state == FunctionState::Verified {
            return Err(CompilerError::construction_error(
                ir_function.name.clone(),
                format!("Cannot abandon verified function {}", ir_function.name),
            ));
        }

        ir_function.state = FunctionState::Abandoned;
        ir_function.blocks.clear();
        debug!("Abandoned function {}", ir_function.name);
        if self.builder.current_function() == Some(index) {
            self.builder.clear_insertion_point();
        }
        Ok(())
    }

    /// Number of parameters `function` takes
    pub fn count_params(&self, function: FunctionId) -> Result<usize, CompilerError> {
        let index = self.resolve_function(function)?.index;
        Ok(self.module.functions[index].arity())
    }

    /// Live function with the given name
    pub fn function_by_name(&self, name: &str) -> Option<FunctionId> {
        let index = self.module.function_index(name)?;
        self.functions
            .iter()
            .position(|entry| entry.index == index)
            .map(|i| FunctionId::new(self.id, i))
    }

    pub fn function_name(&self, function: FunctionId) -> Result<&str, CompilerError> {
        let index = self.resolve_function(function)?.index;
        Ok(self.module.functions[index].name.as_str())
    }

    pub fn function_state(&self, function: FunctionId) -> Result<FunctionState, CompilerError> {
        let index = self.resolve_function(function)?.index;
        Ok(self.module.functions[index].state)
    }

    /// Reference to `function` usable as a call target
    pub(crate) fn callee(&self, function: FunctionId) -> Result<(Value, usize, String), CompilerError> {
        let index = self.resolve_function(function)?.index;
        let ir_function = &self.module.functions[index];
        if !ir_function.is_live() {
            return Err(CompilerError::construction_error(
                ir_function.name.clone(),
                format!("Function {} was abandoned", ir_function.name),
            ));
        }
        Ok((
            Value::Function(ir_function.name.clone()),
            ir_function.arity(),
            ir_function.name.clone(),
        ))
    }

    fn check_new_function_name(&self, name: &str) -> Result<(), CompilerError> {
        if name.is_empty() {
            return Err(CompilerError::construction_error(name, "Function name is empty"));
        }
        if self.module.get_function(name).is_some() {
            return Err(CompilerError::construction_error(
                name,
                format!("Function {name} already exists!"),
            ));
        }
        Ok(())
    }

    fn register_function(&mut self, index: usize, params: Vec<ValueId>) -> FunctionId {
        self.functions.push(FunctionEntry { index, params });
        FunctionId::new(self.id, self.functions.len() - 1)
    }
}
