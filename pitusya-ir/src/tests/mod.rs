//! Scenario tests for the code generation backend
//!
//! These drive the public API the way the driver does: build a session,
//! lower items, close it and run the result.

mod codegen_tests;

use crate::session::{Session, SessionOptions};
use crate::target::TargetMachine;

pub(crate) const TEST_TRIPLE: &str = "x86_64-unknown-linux-gnu";

pub(crate) fn test_session() -> Session {
    test_session_with(SessionOptions::default())
}

pub(crate) fn test_session_with(options: SessionOptions) -> Session {
    let target = TargetMachine::from_triple(TEST_TRIPLE).unwrap();
    Session::with_target(options, target)
}
