//! Compilation session
//!
//! A [`Session`] owns everything one compilation needs: the target
//! descriptor, the module, the insertion cursor and the arenas behind the
//! handles it gives out. Every lowering operation takes `&mut Session`, so
//! there is exactly one writer at a time.

use log::{debug, info};
use pitusya_common::{CompilerError, SymbolNameGenerator};
use crate::handle::{FunctionId, SessionId, SlotId, ValueId};
use crate::ir::{FunctionState, IrBuilder, IrType, Module, Value, DEFAULT_MODULE_NAME};
use crate::passes::PassPipeline;
use crate::target::{OptLevel, TargetMachine};

/// Name stem of the wrapper functions hosting top-level expressions
pub const TOP_LEVEL_STEM: &str = "__anon_expr";

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub module_name: String,
    /// Re-verify every function after each finalization pass
    pub verify_each: bool,
    /// Run the optimization passes at close; verification always runs
    pub optimize: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            verify_each: true,
            optimize: true,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ValueEntry {
    pub value: Value,
    pub ty: IrType,
    /// Function the value is local to; `None` for constants
    pub function: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct SlotEntry {
    pub ptr: Value,
    pub function: usize,
    pub name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct FunctionEntry {
    /// Index into `Module::functions`
    pub index: usize,
    pub params: Vec<ValueId>,
}

/// A single code generation session
#[derive(Debug)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) options: SessionOptions,
    pub(crate) target: TargetMachine,
    pub(crate) module: Module,
    pub(crate) builder: IrBuilder,
    pub(crate) values: Vec<ValueEntry>,
    pub(crate) slots: Vec<SlotEntry>,
    pub(crate) functions: Vec<FunctionEntry>,
    pub(crate) wrapper_names: SymbolNameGenerator,
    poisoned: Option<String>,
}

impl Session {
    /// Discover the native target, then create the module and the builder
    pub fn new(options: SessionOptions) -> Result<Self, CompilerError> {
        let target = TargetMachine::native()?;
        Ok(Self::with_target(options, target))
    }

    /// Start a session for an already discovered target. With optimization
    /// off the target drops to [`OptLevel::None`].
    pub fn with_target(options: SessionOptions, mut target: TargetMachine) -> Self {
        if !options.optimize {
            target.opt_level = OptLevel::None;
        }
        let id = SessionId::fresh();
        let mut module = Module::new(options.module_name.clone());
        module.target_triple = Some(target.triple.clone());
        let builder = IrBuilder::new();
        info!("Started {id} for '{}' targeting {target}", module.name);

        Self {
            id,
            options,
            target,
            module,
            builder,
            values: Vec::new(),
            slots: Vec::new(),
            functions: Vec::new(),
            wrapper_names: SymbolNameGenerator::new(TOP_LEVEL_STEM),
            poisoned: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn target(&self) -> &TargetMachine {
        &self.target
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Finalize the module and hand it to the caller.
    ///
    /// Abandoned functions are dropped, then the finalization pipeline
    /// runs (or, with optimization off, a single verification). All
    /// handles of this session become stale.
    pub fn close(mut self) -> Result<Module, CompilerError> {
        self.ensure_usable()?;

        let dropped = self.module.remove_abandoned();
        if dropped > 0 {
            debug!("Dropped {dropped} abandoned function(s) before finalization");
        }

        let pipeline = match self.target.opt_level {
            OptLevel::Aggressive => PassPipeline::standard(),
            OptLevel::None => PassPipeline::empty(),
        };
        let pipeline = pipeline.with_verify_each(self.options.verify_each);

        pipeline.run(&mut self.module, &self.target)?;
        for function in self.module.functions.iter_mut().filter(|f| !f.is_external) {
            function.state = FunctionState::Verified;
        }
        info!(
            "Closed {} with {} function(s), {} instruction(s)",
            self.id,
            self.module.live_functions().count(),
            self.module.instruction_count()
        );
        Ok(self.module)
    }

    /// Create a `double` constant
    pub fn make_float_constant(&mut self, n: f64) -> ValueId {
        self.intern(Value::ConstFloat(n), IrType::Double, None)
    }

    /// Create a byte string constant of type `[N x i8]`. No terminator is
    /// appended and embedded zero bytes are kept.
    pub fn make_string_constant(&mut self, bytes: &[u8]) -> ValueId {
        self.intern(
            Value::ConstString(bytes.to_vec()),
            IrType::byte_array(bytes.len()),
            None,
        )
    }

    pub fn value_type(&self, id: ValueId) -> Result<IrType, CompilerError> {
        Ok(self.resolve_value(id)?.ty.clone())
    }

    /// The IR operand behind a handle
    pub fn value(&self, id: ValueId) -> Result<&Value, CompilerError> {
        Ok(&self.resolve_value(id)?.value)
    }

    /// Read back a `double` constant, `None` for any other value
    pub fn constant_value(&self, id: ValueId) -> Result<Option<f64>, CompilerError> {
        Ok(self.resolve_value(id)?.value.as_float())
    }

    pub(crate) fn intern(&mut self, value: Value, ty: IrType, function: Option<usize>) -> ValueId {
        self.values.push(ValueEntry { value, ty, function });
        ValueId::new(self.id, self.values.len() - 1)
    }

    pub(crate) fn resolve_value(&self, id: ValueId) -> Result<&ValueEntry, CompilerError> {
        let index = id.index_in(self.id)?;
        self.values
            .get(index)
            .ok_or_else(|| CompilerError::stale_handle(format!("{id} is not a value of {}", self.id)))
    }

    pub(crate) fn resolve_slot(&self, id: SlotId) -> Result<&SlotEntry, CompilerError> {
        let index = id.index_in(self.id)?;
        self.slots
            .get(index)
            .ok_or_else(|| CompilerError::stale_handle(format!("{id} is not a slot of {}", self.id)))
    }

    pub(crate) fn resolve_function(&self, id: FunctionId) -> Result<&FunctionEntry, CompilerError> {
        let index = id.index_in(self.id)?;
        self.functions
            .get(index)
            .ok_or_else(|| CompilerError::stale_handle(format!("{id} is not a function of {}", self.id)))
    }

    pub(crate) fn function_name_at(&self, index: usize) -> String {
        self.module
            .functions
            .get(index)
            .map(|f| f.name.clone())
            .unwrap_or_default()
    }

    /// Function under the cursor, which must still accept instructions
    pub(crate) fn building_function(&self) -> Result<usize, CompilerError> {
        let index = self
            .builder
            .current_function()
            .ok_or_else(|| CompilerError::construction_error("<none>", "No function is being built"))?;
        let function = &self.module.functions[index];
        match function.state {
            FunctionState::Building => Ok(index),
            state => Err(CompilerError::construction_error(
                function.name.clone(),
                format!("Function {} is {state} and cannot take more instructions", function.name),
            )),
        }
    }

    /// Resolve an operand for use inside function `function`
    pub(crate) fn operand(&self, id: ValueId, function: usize) -> Result<(Value, IrType), CompilerError> {
        let entry = self.resolve_value(id)?;
        match entry.function {
            Some(owner) if owner != function => Err(CompilerError::construction_error(
                self.function_name_at(function),
                format!("{id} belongs to function {}", self.function_name_at(owner)),
            )),
            _ => Ok((entry.value.clone(), entry.ty.clone())),
        }
    }

    /// Resolve an operand that must be a `double`
    pub(crate) fn double_operand(&self, id: ValueId, function: usize) -> Result<Value, CompilerError> {
        let (value, ty) = self.operand(id, function)?;
        if !ty.is_double() {
            return Err(CompilerError::construction_error(
                self.function_name_at(function),
                format!("Expected a double operand, but {id} is {ty}"),
            ));
        }
        Ok(value)
    }

    pub(crate) fn ensure_usable(&self) -> Result<(), CompilerError> {
        match &self.poisoned {
            Some(function) => Err(CompilerError::SessionPoisoned { function: function.clone() }),
            None => Ok(()),
        }
    }

    pub(crate) fn poison(&mut self, function: &str) {
        log::error!("Verification of {function} failed; {} is poisoned", self.id);
        self.poisoned = Some(function.to_string());
        self.builder.clear_insertion_point();
    }
}
