//! Evaluator
//!
//! Executes verified functions of a module directly, standing in for the
//! native JIT. External declarations resolve to the runtime library
//! (`print`, `putchar`, `max`, `min`).

use log::trace;
use pitusya_common::{CompilerError, TempId};
use std::collections::HashMap;
use std::io::{self, Write};
use crate::ir::{Function, FunctionState, Instruction, Module, Value};

/// Host functions every program may declare, with their arity
pub const RUNTIME_LIBRARY: &[(&str, usize)] = &[("print", 1), ("putchar", 1), ("max", 2), ("min", 2)];

/// Nested calls allowed before evaluation is aborted
pub const MAX_CALL_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
enum RuntimeValue {
    Float(f64),
    Bool(bool),
    Slot(usize),
}

/// Interpreter over a finished or in-progress module
pub struct Evaluator<'m, W: Write> {
    module: &'m Module,
    output: W,
    depth: usize,
}

impl<'m> Evaluator<'m, io::Stdout> {
    /// Evaluator whose runtime library writes to stdout
    pub fn new(module: &'m Module) -> Self {
        Self::with_output(module, io::stdout())
    }
}

impl<'m, W: Write> Evaluator<'m, W> {
    pub fn with_output(module: &'m Module, output: W) -> Self {
        Self { module, output, depth: 0 }
    }

    /// Give back the output sink
    pub fn into_output(self) -> W {
        self.output
    }

    /// Call a function of the module by name
    pub fn call(&mut self, name: &str, args: &[f64]) -> Result<f64, CompilerError> {
        let module = self.module;
        let function = module
            .get_function(name)
            .ok_or_else(|| CompilerError::execution_error(name, format!("No function {name}")))?;
        if function.arity() != args.len() {
            return Err(CompilerError::execution_error(
                name,
                format!("Expected {} argument(s), but got {}", function.arity(), args.len()),
            ));
        }

        if function.is_external {
            return self.call_host(name, args);
        }
        if function.state != FunctionState::Verified {
            return Err(CompilerError::execution_error(
                name,
                format!("Function {name} is {} and cannot run before verification", function.state),
            ));
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(CompilerError::execution_error(
                name,
                format!("Call depth exceeded {MAX_CALL_DEPTH}"),
            ));
        }

        self.depth += 1;
        let result = self.execute(function, args);
        self.depth -= 1;
        result
    }

    fn execute(&mut self, function: &'m Function, args: &[f64]) -> Result<f64, CompilerError> {
        let name = function.name.as_str();
        let fail = |message: String| CompilerError::execution_error(name, message);

        let mut temps: HashMap<TempId, RuntimeValue> = function
            .parameters
            .iter()
            .zip(args)
            .map(|((id, _), arg)| (*id, RuntimeValue::Float(*arg)))
            .collect();
        let mut slots: Vec<Option<f64>> = Vec::new();

        let entry = function
            .entry_block()
            .ok_or_else(|| fail("function has no body".to_string()))?;

        for instr in &entry.instructions {
            trace!("{name}: {instr}");
            match instr {
                Instruction::Alloca { result, .. } => {
                    slots.push(None);
                    temps.insert(*result, RuntimeValue::Slot(slots.len() - 1));
                }
                Instruction::Load { result, ptr, .. } => {
                    let slot = slot_of(&temps, ptr).map_err(fail)?;
                    let value = slots[slot].ok_or_else(|| fail(format!("load from {ptr} before any store")))?;
                    temps.insert(*result, RuntimeValue::Float(value));
                }
                Instruction::Store { value, ptr } => {
                    let slot = slot_of(&temps, ptr).map_err(fail)?;
                    slots[slot] = Some(float_of(&temps, value).map_err(fail)?);
                }
                Instruction::Binary { result, op, lhs, rhs } => {
                    let lhs = float_of(&temps, lhs).map_err(fail)?;
                    let rhs = float_of(&temps, rhs).map_err(fail)?;
                    temps.insert(*result, RuntimeValue::Float(op.apply(lhs, rhs)));
                }
                Instruction::FCmp { result, predicate, lhs, rhs } => {
                    let lhs = float_of(&temps, lhs).map_err(fail)?;
                    let rhs = float_of(&temps, rhs).map_err(fail)?;
                    temps.insert(*result, RuntimeValue::Bool(predicate.evaluate(lhs, rhs)));
                }
                Instruction::UIToFP { result, value } => {
                    let flag = bool_of(&temps, value).map_err(fail)?;
                    temps.insert(*result, RuntimeValue::Float(if flag { 1.0 } else { 0.0 }));
                }
                Instruction::Call { result, function: callee, args } => {
                    let Value::Function(callee) = callee else {
                        return Err(fail(format!("cannot call {callee}")));
                    };
                    let args = args
                        .iter()
                        .map(|arg| float_of(&temps, arg))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(fail)?;
                    let value = self.call(callee, &args)?;
                    temps.insert(*result, RuntimeValue::Float(value));
                }
                Instruction::Return(value) => {
                    return float_of(&temps, value).map_err(fail);
                }
            }
        }

        Err(fail("entry block ended without a return".to_string()))
    }

    fn call_host(&mut self, name: &str, args: &[f64]) -> Result<f64, CompilerError> {
        match (name, args) {
            ("print", [n]) => {
                writeln!(self.output, "{n:.2}")?;
                Ok(*n)
            }
            ("putchar", [c]) => {
                write!(self.output, "{}", *c as u8 as char)?;
                Ok(*c)
            }
            ("max", [a, b]) => Ok(a.max(*b)),
            ("min", [a, b]) => Ok(a.min(*b)),
            _ => Err(CompilerError::execution_error(
                name,
                format!("No host function {name} taking {} argument(s)", args.len()),
            )),
        }
    }
}

fn lookup(temps: &HashMap<TempId, RuntimeValue>, value: &Value) -> Result<RuntimeValue, String> {
    match value {
        Value::Temp(id) => temps.get(id).copied().ok_or_else(|| format!("%{id} has no value")),
        Value::ConstFloat(n) => Ok(RuntimeValue::Float(*n)),
        Value::ConstBool(b) => Ok(RuntimeValue::Bool(*b)),
        other => Err(format!("{other} cannot be evaluated")),
    }
}

fn float_of(temps: &HashMap<TempId, RuntimeValue>, value: &Value) -> Result<f64, String> {
    match lookup(temps, value)? {
        RuntimeValue::Float(n) => Ok(n),
        other => Err(format!("{value} is {other:?}, expected a double")),
    }
}

fn bool_of(temps: &HashMap<TempId, RuntimeValue>, value: &Value) -> Result<bool, String> {
    match lookup(temps, value)? {
        RuntimeValue::Bool(b) => Ok(b),
        other => Err(format!("{value} is {other:?}, expected an i1")),
    }
}

fn slot_of(temps: &HashMap<TempId, RuntimeValue>, value: &Value) -> Result<usize, String> {
    match lookup(temps, value)? {
        RuntimeValue::Slot(slot) => Ok(slot),
        other => Err(format!("{value} is {other:?}, expected a slot")),
    }
}
