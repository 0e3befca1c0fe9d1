//! Finalization pipeline
//!
//! The pipeline is plain data: an ordered list of [`Pass`] values that can
//! be parsed from the usual comma-separated pass string. Each pass works on
//! one function at a time and reports whether it changed anything.

use log::{debug, info};
use pitusya_common::{CompilerError, TempId};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use crate::ir::{Function, Instruction, Module, Value};
use crate::target::TargetMachine;
use crate::verify;

mod dce;
mod early_cse;
mod instcombine;
mod instsimplify;
mod mem2reg;
mod reassociate;
mod simplifycfg;
mod sroa;

#[cfg(test)]
mod tests;

/// The pass string the standard pipeline is built from
pub const STANDARD_PIPELINE: &str =
    "sroa,early-cse,simplifycfg,reassociate,mem2reg,instsimplify,instcombine,dce";

/// A single function transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Drop slots that are never read
    Sroa,
    /// Reuse identical pure computations and forward stored values to loads
    EarlyCse,
    /// Remove instructions after a terminator and unreachable blocks
    SimplifyCfg,
    /// Put operands of commutative operations in canonical order
    Reassociate,
    /// Promote slots to plain values
    Mem2Reg,
    /// Fold constants and exact identities
    InstSimplify,
    /// Rewrite instructions into cheaper equivalents
    InstCombine,
    /// Delete pure instructions whose result is unused
    Dce,
}

impl Pass {
    pub const ALL: [Pass; 8] = [
        Pass::Sroa,
        Pass::EarlyCse,
        Pass::SimplifyCfg,
        Pass::Reassociate,
        Pass::Mem2Reg,
        Pass::InstSimplify,
        Pass::InstCombine,
        Pass::Dce,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pass::Sroa => "sroa",
            Pass::EarlyCse => "early-cse",
            Pass::SimplifyCfg => "simplifycfg",
            Pass::Reassociate => "reassociate",
            Pass::Mem2Reg => "mem2reg",
            Pass::InstSimplify => "instsimplify",
            Pass::InstCombine => "instcombine",
            Pass::Dce => "dce",
        }
    }

    /// Run on one function; returns whether the function changed
    pub fn run_on_function(self, function: &mut Function) -> bool {
        if function.is_external {
            return false;
        }
        match self {
            Pass::Sroa => sroa::run(function),
            Pass::EarlyCse => early_cse::run(function),
            Pass::SimplifyCfg => simplifycfg::run(function),
            Pass::Reassociate => reassociate::run(function),
            Pass::Mem2Reg => mem2reg::run(function),
            Pass::InstSimplify => instsimplify::run(function),
            Pass::InstCombine => instcombine::run(function),
            Pass::Dce => dce::run(function),
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Pass {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pass::ALL
            .into_iter()
            .find(|pass| pass.name() == s)
            .ok_or_else(|| CompilerError::ToolchainError {
                message: format!("Unknown pass '{s}'"),
            })
    }
}

/// Ordered pass list plus the verify-each switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassPipeline {
    passes: Vec<Pass>,
    verify_each: bool,
}

impl PassPipeline {
    /// The fixed finalization sequence
    pub fn standard() -> Self {
        Self {
            passes: Pass::ALL.to_vec(),
            verify_each: true,
        }
    }

    /// No optimization, the module is only verified
    pub fn empty() -> Self {
        Self {
            passes: Vec::new(),
            verify_each: true,
        }
    }

    /// Parse a comma-separated pass string such as [`STANDARD_PIPELINE`]
    pub fn parse(description: &str) -> Result<Self, CompilerError> {
        let passes = description
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| name.parse::<Pass>())
            .collect::<Result<Vec<Pass>, _>>()?;
        Ok(Self {
            passes,
            verify_each: true,
        })
    }

    pub fn with_verify_each(mut self, verify_each: bool) -> Self {
        self.verify_each = verify_each;
        self
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn verify_each(&self) -> bool {
        self.verify_each
    }

    /// Run every pass over every function of a verified module.
    ///
    /// The module is verified before the first pass and after the last
    /// one; with `verify_each` also after every pass, and a failure names
    /// the pass that broke it.
    pub fn run(&self, module: &mut Module, target: &TargetMachine) -> Result<(), CompilerError> {
        info!(
            "Running {} pass(es) on '{}' for {target}",
            self.passes.len(),
            module.name
        );
        verify::verify_module(module)?;

        for pass in &self.passes {
            let before = module.instruction_count();
            let mut changed = 0;
            for function in module.functions.iter_mut().filter(|f| f.is_live()) {
                if pass.run_on_function(function) {
                    changed += 1;
                }
            }
            debug!(
                "{pass}: changed {changed} function(s), {before} -> {} instruction(s)",
                module.instruction_count()
            );

            if self.verify_each {
                verify::verify_module(module).map_err(|err| after_pass(*pass, err))?;
            }
        }

        if !self.verify_each {
            verify::verify_module(module)?;
        }
        Ok(())
    }
}

impl fmt::Display for PassPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.passes.iter().map(|p| p.name()).collect();
        write!(f, "{}", names.join(","))
    }
}

fn after_pass(pass: Pass, err: CompilerError) -> CompilerError {
    match err {
        CompilerError::VerificationError { function, message } => CompilerError::VerificationError {
            function,
            message: format!("after pass {pass}: {message}"),
        },
        other => other,
    }
}

/// Pending replacements of temps by other values
#[derive(Debug, Default)]
pub(crate) struct Substitutions {
    map: HashMap<TempId, Value>,
}

impl Substitutions {
    pub fn insert(&mut self, temp: TempId, value: Value) {
        self.map.insert(temp, value);
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Rewrite the operands of `instr`
    pub fn apply(&self, instr: &mut Instruction) {
        for operand in instr.operands_mut() {
            if let Some(replacement) = operand.as_temp().and_then(|t| self.map.get(&t)) {
                *operand = replacement.clone();
            }
        }
    }

    /// Rewrite every instruction of `function`
    pub fn apply_to(&self, function: &mut Function) {
        if self.is_empty() {
            return;
        }
        for block in &mut function.blocks {
            for instr in &mut block.instructions {
                self.apply(instr);
            }
        }
    }
}

/// Same instruction with its result renumbered to `0`, used as a value key
pub(crate) fn expression_key(instr: &Instruction) -> Option<Instruction> {
    let mut key = instr.clone();
    match &mut key {
        Instruction::Binary { result, .. }
        | Instruction::FCmp { result, .. }
        | Instruction::UIToFP { result, .. } => *result = 0,
        _ => return None,
    }
    Some(key)
}
