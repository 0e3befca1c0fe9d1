//! AST-driven code generation
//!
//! Lowers one [`Item`] at a time into the session's module. A construction
//! error aborts only the item being lowered: its half-built function is
//! abandoned and the generator keeps accepting items. A verification error
//! poisons the session for good.

use log::{debug, warn};
use pitusya_common::CompilerError;
use std::collections::HashMap;
use std::io::Write;
use crate::ast::{Expr, FunctionDef, Item, OpLowering, Program, Prototype, Stmt};
use crate::eval::{Evaluator, RUNTIME_LIBRARY};
use crate::handle::{FunctionId, SlotId, ValueId};
use crate::ir::Module;
use crate::session::Session;

/// Name of the entry point `run` mode executes
pub const MAIN_FUNCTION: &str = "main";

/// What lowering an item produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generated {
    Function(FunctionId),
    Extern(FunctionId),
    /// Wrapper hosting a top-level expression, ready to evaluate
    TopLevel(FunctionId),
}

#[derive(Debug, Clone, Copy)]
enum Binding {
    /// Parameters are immutable
    Param(ValueId),
    Slot(SlotId),
}

/// Names visible inside the function being lowered
#[derive(Debug, Default)]
struct Scope {
    bindings: HashMap<String, Binding>,
}

/// Drives a [`Session`] from AST items
#[derive(Debug)]
pub struct CodeGenerator {
    session: Session,
}

impl CodeGenerator {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn module(&self) -> &Module {
        self.session.module()
    }

    pub fn has_main(&self) -> bool {
        self.session.function_by_name(MAIN_FUNCTION).is_some()
    }

    /// Declare every runtime library function not declared yet
    pub fn declare_runtime_library(&mut self) -> Result<(), CompilerError> {
        for (name, arity) in RUNTIME_LIBRARY {
            if self.session.function_by_name(name).is_none() {
                self.session.declare_function(name, *arity)?;
            }
        }
        Ok(())
    }

    /// Lower every item, stopping at the first error
    pub fn generate_program(&mut self, program: &Program) -> Result<Vec<Generated>, CompilerError> {
        program.items.iter().map(|item| self.generate_item(item)).collect()
    }

    pub fn generate_item(&mut self, item: &Item) -> Result<Generated, CompilerError> {
        match item {
            Item::Function(def) => self.generate_function(def).map(Generated::Function),
            Item::Extern(proto) => self.generate_extern(proto).map(Generated::Extern),
            Item::Expr(expr) => self.generate_top_level(expr).map(Generated::TopLevel),
        }
    }

    /// Evaluate a verified top-level wrapper
    pub fn evaluate<W: Write>(&self, wrapper: FunctionId, output: W) -> Result<f64, CompilerError> {
        let name = self.session.function_name(wrapper)?;
        Evaluator::with_output(self.session.module(), output).call(name, &[])
    }

    /// Finalize the module
    pub fn finish(self) -> Result<Module, CompilerError> {
        self.session.close()
    }

    fn generate_extern(&mut self, proto: &Prototype) -> Result<FunctionId, CompilerError> {
        self.session.declare_function(&proto.name, proto.params.len())
    }

    fn generate_function(&mut self, def: &FunctionDef) -> Result<FunctionId, CompilerError> {
        let name = def.proto.name.as_str();
        check_single_return(name, &def.body)?;

        let params: Vec<&str> = def.proto.params.iter().map(String::as_str).collect();
        let function = self.session.begin_function(name, &params)?;
        debug!("Generating function {name}");

        let result = self.generate_body(function, &def.body);
        self.settle(function, result)?;
        Ok(function)
    }

    fn generate_body(&mut self, function: FunctionId, body: &[Stmt]) -> Result<(), CompilerError> {
        let mut scope = Scope::default();
        for (i, param) in self.param_names(function)?.into_iter().enumerate() {
            let value = self.session.param(function, i)?;
            scope.bindings.insert(param, Binding::Param(value));
        }

        for stmt in body {
            match stmt {
                Stmt::Let { name, value } => {
                    let value = self.generate_expr(&scope, value)?;
                    let slot = self.session.declare_variable(value, name)?;
                    scope.bindings.insert(name.clone(), Binding::Slot(slot));
                }
                Stmt::Assign { name, value } => match scope.bindings.get(name).copied() {
                    Some(Binding::Slot(slot)) => {
                        let value = self.generate_expr(&scope, value)?;
                        self.session.assign(slot, value)?;
                    }
                    Some(Binding::Param(_)) => {
                        return Err(self.error(format!("Cannot assign to const variable {name}")));
                    }
                    None => return Err(self.error(format!("No variable {name}. Consider creating it"))),
                },
                Stmt::Expr(expr) => {
                    self.generate_expr(&scope, expr)?;
                }
                Stmt::Return(expr) => {
                    let value = self.generate_expr(&scope, expr)?;
                    self.session.end_function(function, value)?;
                }
            }
        }

        self.session.verify_function(function)
    }

    fn generate_top_level(&mut self, expr: &Expr) -> Result<FunctionId, CompilerError> {
        let wrapper = self.session.begin_top_level()?;
        let result = self
            .generate_expr(&Scope::default(), expr)
            .and_then(|value| self.session.finish_top_level(wrapper, value));
        self.settle(wrapper, result)?;
        Ok(wrapper)
    }

    fn generate_expr(&mut self, scope: &Scope, expr: &Expr) -> Result<ValueId, CompilerError> {
        match expr {
            Expr::Number(n) => Ok(self.session.make_float_constant(*n)),
            Expr::Str(s) => Ok(self.session.make_string_constant(s.as_bytes())),
            Expr::Variable(name) => match scope.bindings.get(name) {
                Some(Binding::Param(value)) => Ok(*value),
                Some(Binding::Slot(slot)) => self.session.read(*slot, name),
                None => Err(self.error(format!("No variable {name}. Consider creating it"))),
            },
            Expr::Binary { op, left, right } => {
                let lhs = self.generate_expr(scope, left)?;
                let rhs = self.generate_expr(scope, right)?;
                match op.lowering() {
                    OpLowering::Arithmetic(op) => self.session.build_binary(op, lhs, rhs),
                    OpLowering::Comparison(predicate) => {
                        let flag = self.session.build_compare(predicate, lhs, rhs)?;
                        self.session.build_bool_to_float(flag)
                    }
                }
            }
            Expr::Call { callee, args } => {
                let function = self
                    .session
                    .function_by_name(callee)
                    .ok_or_else(|| self.error(format!("No function {callee}. Define it before calling")))?;
                let arity = self.session.count_params(function)?;
                if arity != args.len() {
                    return Err(self.error(format!(
                        "Incorrect number of arguments passed to {callee}. Expected {arity}, but got {}",
                        args.len()
                    )));
                }

                let args = args
                    .iter()
                    .map(|arg| self.generate_expr(scope, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.session.build_call(function, &args)
            }
        }
    }

    /// Abandon `function` when lowering it failed, unless the session is
    /// already poisoned
    fn settle(&mut self, function: FunctionId, result: Result<(), CompilerError>) -> Result<(), CompilerError> {
        let Err(err) = result else {
            return Ok(());
        };
        if !self.session.is_poisoned() {
            if let Err(abandon_err) = self.session.abandon_function(function) {
                warn!("Could not abandon function after error: {abandon_err}");
            }
        }
        Err(err)
    }

    fn param_names(&self, function: FunctionId) -> Result<Vec<String>, CompilerError> {
        let name = self.session.function_name(function)?;
        let ir_function = self
            .session
            .module()
            .get_function(name)
            .ok_or_else(|| CompilerError::InternalError {
                message: format!("Function {name} is missing from the module"),
            })?;
        Ok(ir_function.parameters.iter().map(|(_, n)| n.clone()).collect())
    }

    /// Construction error attributed to the function under the cursor
    fn error(&self, message: String) -> CompilerError {
        let function = self
            .session
            .builder
            .function(self.session.module())
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "<none>".to_string());
        CompilerError::construction_error(function, message)
    }
}

/// A function body returns exactly once, as its last statement
fn check_single_return(name: &str, body: &[Stmt]) -> Result<(), CompilerError> {
    let returns = body.iter().filter(|s| matches!(s, Stmt::Return(_))).count();
    if returns != 1 {
        return Err(CompilerError::construction_error(
            name,
            format!("function {name} returns multiple values or returns nothing"),
        ));
    }
    if !matches!(body.last(), Some(Stmt::Return(_))) {
        return Err(CompilerError::construction_error(
            name,
            format!("unreachable code in function {name}"),
        ));
    }
    Ok(())
}
