//! IR Builder
//!
//! An insertion cursor over a [`Module`]. The builder does not own the
//! function it appends to; every `build_*` call takes the module it
//! writes into and appends at the end of the current block.

use log::trace;
use pitusya_common::{CompilerError, LabelId, TempGenerator, TempId};
use crate::ir::{
    BasicBlock, CmpPredicate, FloatBinaryOp, Function, Instruction, IrType, Module, Value,
};

/// Where the next instruction will be appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertPoint {
    pub function: usize,
    pub block: LabelId,
}

/// Builder for constructing IR
#[derive(Debug, Default)]
pub struct IrBuilder {
    insert_point: Option<InsertPoint>,
    temps: TempGenerator,
    next_label_id: LabelId,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_temp(&mut self) -> TempId {
        self.temps.new_temp()
    }

    pub fn new_label(&mut self) -> LabelId {
        let label = self.next_label_id;
        self.next_label_id += 1;
        label
    }

    /// Index of the function the cursor is in
    pub fn current_function(&self) -> Option<usize> {
        self.insert_point.map(|ip| ip.function)
    }

    /// Append a named block to a function and return its label
    pub fn append_block(&mut self, module: &mut Module, function: usize, name: &str) -> Result<LabelId, CompilerError> {
        let label = self.new_label();
        let target = module.functions.get_mut(function).ok_or_else(|| CompilerError::InternalError {
            message: format!("No function at index {function}"),
        })?;
        target.add_block(BasicBlock::new(label, name));
        Ok(label)
    }

    /// Move the cursor to the end of `block`. Temp numbering restarts after
    /// the function's parameters, like every fresh function body.
    pub fn position_at_end(&mut self, module: &Module, function: usize, block: LabelId) -> Result<(), CompilerError> {
        let target = module.functions.get(function).ok_or_else(|| CompilerError::InternalError {
            message: format!("No function at index {function}"),
        })?;
        if target.get_block(block).is_none() {
            return Err(CompilerError::InternalError {
                message: format!("Function {} has no block {block}", target.name),
            });
        }
        self.temps = TempGenerator::starting_at(target.arity() as TempId);
        self.insert_point = Some(InsertPoint { function, block });
        trace!("Builder positioned at end of block {block} in {}", target.name);
        Ok(())
    }

    pub fn clear_insertion_point(&mut self) {
        self.insert_point = None;
    }

    pub fn build_alloca(&mut self, module: &mut Module, alloc_type: IrType, name: &str) -> Result<Value, CompilerError> {
        let result = self.new_temp();
        let instr = Instruction::Alloca { result, alloc_type, name: name.to_string() };

        self.add_instruction(module, instr)?;
        Ok(Value::Temp(result))
    }

    pub fn build_load(&mut self, module: &mut Module, ptr: Value, result_type: IrType) -> Result<Value, CompilerError> {
        let result = self.new_temp();
        let instr = Instruction::Load { result, ptr, result_type };

        self.add_instruction(module, instr)?;
        Ok(Value::Temp(result))
    }

    pub fn build_store(&mut self, module: &mut Module, value: Value, ptr: Value) -> Result<(), CompilerError> {
        let instr = Instruction::Store { value, ptr };
        self.add_instruction(module, instr)
    }

    pub fn build_binary(&mut self, module: &mut Module, op: FloatBinaryOp, lhs: Value, rhs: Value) -> Result<Value, CompilerError> {
        let result = self.new_temp();
        let instr = Instruction::Binary { result, op, lhs, rhs };

        self.add_instruction(module, instr)?;
        Ok(Value::Temp(result))
    }

    pub fn build_fcmp(&mut self, module: &mut Module, predicate: CmpPredicate, lhs: Value, rhs: Value) -> Result<Value, CompilerError> {
        let result = self.new_temp();
        let instr = Instruction::FCmp { result, predicate, lhs, rhs };

        self.add_instruction(module, instr)?;
        Ok(Value::Temp(result))
    }

    pub fn build_uitofp(&mut self, module: &mut Module, value: Value) -> Result<Value, CompilerError> {
        let result = self.new_temp();
        let instr = Instruction::UIToFP { result, value };

        self.add_instruction(module, instr)?;
        Ok(Value::Temp(result))
    }

    pub fn build_call(&mut self, module: &mut Module, function: Value, args: Vec<Value>) -> Result<Value, CompilerError> {
        let result = self.new_temp();
        let instr = Instruction::Call { result, function, args };

        self.add_instruction(module, instr)?;
        Ok(Value::Temp(result))
    }

    pub fn build_return(&mut self, module: &mut Module, value: Value) -> Result<(), CompilerError> {
        let instr = Instruction::Return(value);
        self.add_instruction(module, instr)
    }

    /// The function under the cursor
    pub fn function<'m>(&self, module: &'m Module) -> Option<&'m Function> {
        self.insert_point.and_then(|ip| module.functions.get(ip.function))
    }

    fn add_instruction(&mut self, module: &mut Module, instr: Instruction) -> Result<(), CompilerError> {
        let ip = self.insert_point.ok_or_else(|| CompilerError::InternalError {
            message: "No insertion point".to_string(),
        })?;
        let function = module.functions.get_mut(ip.function).ok_or_else(|| CompilerError::InternalError {
            message: "Current function not found".to_string(),
        })?;
        let name = function.name.clone();
        let block = function.get_block_mut(ip.block).ok_or_else(|| CompilerError::InternalError {
            message: format!("Current block not found in {name}"),
        })?;
        if block.has_terminator() {
            return Err(CompilerError::construction_error(
                name,
                format!("Cannot append `{instr}` after the block terminator"),
            ));
        }
        trace!("{name}: {instr}");
        block.add_instruction(instr);
        Ok(())
    }
}
