//! Expression lowering primitives
//!
//! Each operation appends exactly one instruction at the cursor and never
//! moves it. Invalid requests are rejected before anything is appended.

use pitusya_common::CompilerError;
use crate::handle::{FunctionId, ValueId};
use crate::ir::{CmpPredicate, FloatBinaryOp, IrType};
use crate::session::Session;

impl Session {
    /// `fadd`, `fsub`, `fmul` or `fdiv` of two doubles
    pub fn build_binary(&mut self, op: FloatBinaryOp, lhs: ValueId, rhs: ValueId) -> Result<ValueId, CompilerError> {
        self.ensure_usable()?;
        let function = self.building_function()?;
        let lhs = self.double_operand(lhs, function)?;
        let rhs = self.double_operand(rhs, function)?;

        let result = self.builder.build_binary(&mut self.module, op, lhs, rhs)?;
        Ok(self.intern(result, IrType::Double, Some(function)))
    }

    /// Ordered comparison of two doubles, producing an `i1`
    pub fn build_compare(&mut self, predicate: CmpPredicate, lhs: ValueId, rhs: ValueId) -> Result<ValueId, CompilerError> {
        self.ensure_usable()?;
        let function = self.building_function()?;
        let lhs = self.double_operand(lhs, function)?;
        let rhs = self.double_operand(rhs, function)?;

        let result = self.builder.build_fcmp(&mut self.module, predicate, lhs, rhs)?;
        Ok(self.intern(result, IrType::I1, Some(function)))
    }

    /// Widen an `i1` to `1.0` or `0.0`
    pub fn build_bool_to_float(&mut self, value: ValueId) -> Result<ValueId, CompilerError> {
        self.ensure_usable()?;
        let function = self.building_function()?;
        let (operand, ty) = self.operand(value, function)?;
        if ty != IrType::I1 {
            return Err(CompilerError::construction_error(
                self.function_name_at(function),
                format!("Expected an i1 operand, but {value} is {ty}"),
            ));
        }

        let result = self.builder.build_uitofp(&mut self.module, operand)?;
        Ok(self.intern(result, IrType::Double, Some(function)))
    }

    /// Call `callee` with `args`. The argument count must match the
    /// callee's arity exactly.
    pub fn build_call(&mut self, callee: FunctionId, args: &[ValueId]) -> Result<ValueId, CompilerError> {
        self.ensure_usable()?;
        let function = self.building_function()?;
        let (target, arity, name) = self.callee(callee)?;
        if arity != args.len() {
            return Err(CompilerError::construction_error(
                self.function_name_at(function),
                format!(
                    "Incorrect number of arguments passed to {name}. Expected {arity}, but got {}",
                    args.len()
                ),
            ));
        }

        let args = args
            .iter()
            .map(|arg| self.double_operand(*arg, function))
            .collect::<Result<Vec<_>, _>>()?;
        let result = self.builder.build_call(&mut self.module, target, args)?;
        Ok(self.intern(result, IrType::Double, Some(function)))
    }
}
