//! Variable slot manager
//!
//! Mutable variables are lowered to an `alloca double` plus loads and
//! stores. `mem2reg` turns them back into plain values at finalization.

use log::debug;
use pitusya_common::CompilerError;
use crate::handle::{SlotId, ValueId};
use crate::ir::{IrType, Value};
use crate::session::{Session, SlotEntry};

impl Session {
    /// Allocate a slot in the current function and store `initial` into it
    pub fn declare_variable(&mut self, initial: ValueId, name: &str) -> Result<SlotId, CompilerError> {
        self.ensure_usable()?;
        let function = self.building_function()?;
        let value = self.double_operand(initial, function)?;

        let ptr = self.builder.build_alloca(&mut self.module, IrType::Double, name)?;
        self.builder.build_store(&mut self.module, value, ptr.clone())?;
        debug!("Declared variable {name} at {ptr} in {}", self.function_name_at(function));

        self.slots.push(SlotEntry {
            ptr,
            function,
            name: name.to_string(),
        });
        Ok(SlotId::new(self.id, self.slots.len() - 1))
    }

    /// Store `value` into an existing slot
    pub fn assign(&mut self, slot: SlotId, value: ValueId) -> Result<(), CompilerError> {
        self.ensure_usable()?;
        let function = self.building_function()?;
        let ptr = self.slot_pointer(slot, function)?;
        let value = self.double_operand(value, function)?;

        self.builder.build_store(&mut self.module, value, ptr)
    }

    /// Load the current contents of a slot as a fresh value
    pub fn read(&mut self, slot: SlotId, name: &str) -> Result<ValueId, CompilerError> {
        self.ensure_usable()?;
        let function = self.building_function()?;
        let ptr = self.slot_pointer(slot, function)?;

        let loaded = self.builder.build_load(&mut self.module, ptr, IrType::Double)?;
        log::trace!("Read of {name} loads {loaded}");
        Ok(self.intern(loaded, IrType::Double, Some(function)))
    }

    /// Name the slot was declared with
    pub fn slot_name(&self, slot: SlotId) -> Result<&str, CompilerError> {
        Ok(self.resolve_slot(slot)?.name.as_str())
    }

    fn slot_pointer(&self, slot: SlotId, function: usize) -> Result<Value, CompilerError> {
        let entry = self.resolve_slot(slot)?;
        if entry.function != function {
            return Err(CompilerError::construction_error(
                self.function_name_at(function),
                format!(
                    "Variable {} belongs to function {}",
                    entry.name,
                    self.function_name_at(entry.function)
                ),
            ));
        }
        Ok(entry.ptr.clone())
    }
}
