//! IR verifier
//!
//! Structural and type checks over functions and modules: every block ends
//! in exactly one terminator, temps are defined once before they are used,
//! operands have the types their instruction expects and calls match the
//! callee's signature.

use pitusya_common::{CompilerError, TempId};
use std::collections::{HashMap, HashSet};
use crate::ir::{Function, Instruction, IrType, Module, Value};

/// Verify every live function of the module
pub fn verify_module(module: &Module) -> Result<(), CompilerError> {
    let mut seen = HashSet::new();
    for function in module.live_functions() {
        if !seen.insert(function.name.as_str()) {
            return Err(CompilerError::verification_error(
                function.name.clone(),
                "function is defined more than once",
            ));
        }
        verify_function(module, function)?;
    }
    Ok(())
}

/// Verify a single function in the context of its module
pub fn verify_function(module: &Module, function: &Function) -> Result<(), CompilerError> {
    FunctionVerifier::new(module, function).run()
}

struct FunctionVerifier<'a> {
    module: &'a Module,
    function: &'a Function,
    types: HashMap<TempId, IrType>,
}

impl<'a> FunctionVerifier<'a> {
    fn new(module: &'a Module, function: &'a Function) -> Self {
        Self {
            module,
            function,
            types: HashMap::new(),
        }
    }

    fn fail(&self, message: impl Into<String>) -> CompilerError {
        CompilerError::verification_error(self.function.name.clone(), message)
    }

    fn run(mut self) -> Result<(), CompilerError> {
        if !self.function.return_type.is_double() {
            return Err(self.fail(format!("return type must be double, found {}", self.function.return_type)));
        }

        if self.function.is_external {
            if !self.function.blocks.is_empty() {
                return Err(self.fail("external declaration has a body"));
            }
            return Ok(());
        }

        if self.function.blocks.is_empty() {
            return Err(self.fail("function has no entry block"));
        }

        for (i, (id, _)) in self.function.parameters.iter().enumerate() {
            if *id != i as TempId {
                return Err(self.fail(format!("parameter {i} is numbered %{id}")));
            }
            self.types.insert(*id, IrType::Double);
        }

        for block in &self.function.blocks {
            let Some(last) = block.instructions.last() else {
                return Err(self.fail(format!("block '{}' is empty", block.name)));
            };
            if !last.is_terminator() {
                return Err(self.fail(format!("block '{}' does not end with a terminator", block.name)));
            }

            for (position, instr) in block.instructions.iter().enumerate() {
                if instr.is_terminator() && position + 1 != block.instructions.len() {
                    return Err(self.fail(format!(
                        "terminator `{instr}` in the middle of block '{}'",
                        block.name
                    )));
                }
                self.check_instruction(instr)?;
                if let (Some(result), Some(ty)) = (instr.result(), instr.result_type()) {
                    if self.types.insert(result, ty).is_some() {
                        return Err(self.fail(format!("%{result} is defined more than once")));
                    }
                }
            }
        }

        Ok(())
    }

    fn type_of(&self, value: &Value) -> Result<Option<IrType>, CompilerError> {
        Ok(match value {
            Value::Temp(id) => Some(
                self.types
                    .get(id)
                    .cloned()
                    .ok_or_else(|| self.fail(format!("%{id} is used before it is defined")))?,
            ),
            Value::ConstFloat(_) => Some(IrType::Double),
            Value::ConstBool(_) => Some(IrType::I1),
            Value::ConstString(bytes) => Some(IrType::byte_array(bytes.len())),
            Value::Function(_) => None,
            // undef takes whatever type its use requires
            Value::Undef => None,
        })
    }

    fn expect(&self, value: &Value, expected: &IrType, instr: &Instruction) -> Result<(), CompilerError> {
        if let Value::Function(name) = value {
            return Err(self.fail(format!("function @{name} used as a value in `{instr}`")));
        }
        match self.type_of(value)? {
            Some(ty) if &ty != expected => Err(self.fail(format!(
                "operand {value} of `{instr}` has type {ty}, expected {expected}"
            ))),
            _ => Ok(()),
        }
    }

    fn check_instruction(&self, instr: &Instruction) -> Result<(), CompilerError> {
        let double = IrType::Double;
        let slot = IrType::Ptr(Box::new(IrType::Double));

        match instr {
            Instruction::Alloca { alloc_type, .. } => {
                if alloc_type != &double {
                    return Err(self.fail(format!("slots must hold double, found {alloc_type}")));
                }
            }
            Instruction::Load { ptr, result_type, .. } => {
                if result_type != &double {
                    return Err(self.fail(format!("`{instr}` must load a double")));
                }
                self.expect(ptr, &slot, instr)?;
            }
            Instruction::Store { value, ptr } => {
                self.expect(value, &double, instr)?;
                self.expect(ptr, &slot, instr)?;
            }
            Instruction::Binary { lhs, rhs, .. } | Instruction::FCmp { lhs, rhs, .. } => {
                self.expect(lhs, &double, instr)?;
                self.expect(rhs, &double, instr)?;
            }
            Instruction::UIToFP { value, .. } => {
                self.expect(value, &IrType::I1, instr)?;
            }
            Instruction::Call { function, args, .. } => {
                let Value::Function(name) = function else {
                    return Err(self.fail(format!("`{instr}` does not call a function")));
                };
                let callee = self
                    .module
                    .get_function(name)
                    .ok_or_else(|| self.fail(format!("call to undeclared function @{name}")))?;
                if callee.arity() != args.len() {
                    return Err(self.fail(format!(
                        "call to @{name} passes {} argument(s), expected {}",
                        args.len(),
                        callee.arity()
                    )));
                }
                for arg in args {
                    self.expect(arg, &double, instr)?;
                }
            }
            Instruction::Return(value) => {
                self.expect(value, &self.function.return_type, instr)?;
            }
        }
        Ok(())
    }
}
