//! Target descriptor
//!
//! Stands in for the host toolchain's target machine. It is discovered once,
//! before a session starts, and handed to the finalization pipeline.

use pitusya_common::CompilerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Code generation optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptLevel {
    /// Verification only
    None,
    /// The full finalization pipeline
    Aggressive,
}

/// Description of the machine generated code is meant for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMachine {
    pub triple: String,
    pub arch: String,
    pub os: String,
    pub opt_level: OptLevel,
}

impl TargetMachine {
    /// Describe the machine this process runs on
    pub fn native() -> Result<Self, CompilerError> {
        let arch = std::env::consts::ARCH;
        let os = std::env::consts::OS;
        let env = if os == "linux" { "-gnu" } else { "" };
        Self::from_triple(&format!("{arch}-unknown-{os}{env}"))
    }

    /// Parse an `arch-vendor-os[-env]` triple
    pub fn from_triple(triple: &str) -> Result<Self, CompilerError> {
        let parts: Vec<&str> = triple.split('-').collect();
        if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(CompilerError::ToolchainError {
                message: format!("Invalid target triple '{triple}'"),
            });
        }

        Ok(Self {
            triple: triple.to_string(),
            arch: parts[0].to_string(),
            os: parts[2].to_string(),
            opt_level: OptLevel::Aggressive,
        })
    }
}

impl fmt::Display for TargetMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.triple, self.opt_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_target() {
        let target = TargetMachine::native().unwrap();
        assert_eq!(target.arch, std::env::consts::ARCH);
        assert_eq!(target.opt_level, OptLevel::Aggressive);
    }

    #[test]
    fn test_from_triple() {
        let target = TargetMachine::from_triple("aarch64-apple-darwin").unwrap();
        assert_eq!(target.arch, "aarch64");
        assert_eq!(target.os, "darwin");

        assert!(matches!(
            TargetMachine::from_triple("x86_64"),
            Err(CompilerError::ToolchainError { .. })
        ));
        assert!(TargetMachine::from_triple("x86_64--linux").is_err());
    }
}
