//! Unit tests for the finalization passes

use super::*;
use crate::ir::{BasicBlock, CmpPredicate, FloatBinaryOp, IrType};
use pretty_assertions::assert_eq;

fn function(params: &[&str], instructions: Vec<Instruction>) -> Function {
    let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    let mut function = Function::new("f".to_string(), &params);
    let mut block = BasicBlock::new(0, "entry");
    for instr in instructions {
        block.add_instruction(instr);
    }
    function.add_block(block);
    function
}

fn body(function: &Function) -> Vec<String> {
    function.blocks[0]
        .instructions
        .iter()
        .map(|i| i.to_string())
        .collect()
}

fn alloca(result: u32) -> Instruction {
    Instruction::Alloca {
        result,
        alloc_type: IrType::Double,
        name: "v".to_string(),
    }
}

fn load(result: u32, slot: u32) -> Instruction {
    Instruction::Load {
        result,
        ptr: Value::Temp(slot),
        result_type: IrType::Double,
    }
}

fn store(value: Value, slot: u32) -> Instruction {
    Instruction::Store {
        value,
        ptr: Value::Temp(slot),
    }
}

fn binary(result: u32, op: FloatBinaryOp, lhs: Value, rhs: Value) -> Instruction {
    Instruction::Binary { result, op, lhs, rhs }
}

#[test]
fn test_pipeline_string() {
    let parsed = PassPipeline::parse(STANDARD_PIPELINE).unwrap();
    assert_eq!(parsed, PassPipeline::standard());
    assert_eq!(parsed.to_string(), STANDARD_PIPELINE);
    assert_eq!(parsed.passes().len(), 8);
    assert!(parsed.verify_each());
}

#[test]
fn test_unknown_pass() {
    let err = PassPipeline::parse("sroa,gvn").unwrap_err();
    assert_eq!(err.to_string(), "Toolchain error: Unknown pass 'gvn'");
}

#[test]
fn test_sroa_drops_write_only_slot() {
    let mut f = function(
        &["x"],
        vec![
            alloca(1),
            store(Value::Temp(0), 1),
            store(Value::ConstFloat(2.0), 1),
            Instruction::Return(Value::Temp(0)),
        ],
    );
    assert!(Pass::Sroa.run_on_function(&mut f));
    assert_eq!(body(&f), vec!["ret double %0"]);
    assert!(!Pass::Sroa.run_on_function(&mut f));
}

#[test]
fn test_early_cse() {
    let mut f = function(
        &["x"],
        vec![
            binary(1, FloatBinaryOp::Mul, Value::Temp(0), Value::Temp(0)),
            binary(2, FloatBinaryOp::Mul, Value::Temp(0), Value::Temp(0)),
            binary(3, FloatBinaryOp::Add, Value::Temp(1), Value::Temp(2)),
            Instruction::Return(Value::Temp(3)),
        ],
    );
    assert!(Pass::EarlyCse.run_on_function(&mut f));
    assert_eq!(
        body(&f),
        vec![
            "%1 = fmul double %0, %0",
            "%3 = fadd double %1, %1",
            "ret double %3",
        ]
    );
}

#[test]
fn test_early_cse_forwards_stores() {
    let mut f = function(
        &["x"],
        vec![
            alloca(1),
            store(Value::Temp(0), 1),
            load(2, 1),
            store(Value::ConstFloat(5.0), 1),
            load(3, 1),
            binary(4, FloatBinaryOp::Add, Value::Temp(2), Value::Temp(3)),
            Instruction::Return(Value::Temp(4)),
        ],
    );
    assert!(Pass::EarlyCse.run_on_function(&mut f));
    assert_eq!(
        body(&f),
        vec![
            "%1 = alloca double ; v",
            "store double %0, double* %1",
            "store double 5.0, double* %1",
            "%4 = fadd double %0, 5.0",
            "ret double %4",
        ]
    );
}

#[test]
fn test_early_cse_keeps_different_zeros_apart() {
    let mut f = function(
        &["x"],
        vec![
            binary(1, FloatBinaryOp::Add, Value::Temp(0), Value::ConstFloat(0.0)),
            binary(2, FloatBinaryOp::Add, Value::Temp(0), Value::ConstFloat(-0.0)),
            binary(3, FloatBinaryOp::Mul, Value::Temp(1), Value::Temp(2)),
            Instruction::Return(Value::Temp(3)),
        ],
    );
    assert!(!Pass::EarlyCse.run_on_function(&mut f));
}

#[test]
fn test_simplifycfg() {
    let mut f = function(&[], vec![Instruction::Return(Value::ConstFloat(1.0))]);
    f.blocks[0].instructions.push(Instruction::Return(Value::ConstFloat(2.0)));
    let mut dead = BasicBlock::new(1, "dead");
    dead.add_instruction(Instruction::Return(Value::ConstFloat(3.0)));
    f.add_block(dead);

    assert!(Pass::SimplifyCfg.run_on_function(&mut f));
    assert_eq!(f.blocks.len(), 1);
    assert_eq!(body(&f), vec!["ret double 1.0"]);
    assert!(!Pass::SimplifyCfg.run_on_function(&mut f));
}

#[test]
fn test_reassociate() {
    let mut f = function(
        &["x", "y"],
        vec![
            binary(2, FloatBinaryOp::Add, Value::ConstFloat(1.0), Value::Temp(0)),
            binary(3, FloatBinaryOp::Mul, Value::Temp(1), Value::Temp(2)),
            binary(4, FloatBinaryOp::Sub, Value::ConstFloat(1.0), Value::Temp(3)),
            Instruction::Return(Value::Temp(4)),
        ],
    );
    assert!(Pass::Reassociate.run_on_function(&mut f));
    assert_eq!(
        body(&f),
        vec![
            "%2 = fadd double %0, 1.0",
            "%3 = fmul double %1, %2",
            "%4 = fsub double 1.0, %3",
            "ret double %4",
        ]
    );
}

#[test]
fn test_mem2reg() {
    let mut f = function(
        &["x"],
        vec![
            alloca(1),
            store(Value::Temp(0), 1),
            load(2, 1),
            binary(3, FloatBinaryOp::Add, Value::Temp(2), Value::ConstFloat(1.0)),
            store(Value::Temp(3), 1),
            load(4, 1),
            Instruction::Return(Value::Temp(4)),
        ],
    );
    assert!(Pass::Mem2Reg.run_on_function(&mut f));
    assert_eq!(
        body(&f),
        vec!["%3 = fadd double %0, 1.0", "ret double %3"]
    );
}

#[test]
fn test_mem2reg_load_before_store_is_undef() {
    let mut f = function(&[], vec![alloca(0), load(1, 0), Instruction::Return(Value::Temp(1))]);
    assert!(Pass::Mem2Reg.run_on_function(&mut f));
    assert_eq!(body(&f), vec!["ret double undef"]);
}

#[test]
fn test_instsimplify_folds_constants() {
    let mut f = function(
        &[],
        vec![
            binary(0, FloatBinaryOp::Div, Value::ConstFloat(1.0), Value::ConstFloat(4.0)),
            Instruction::FCmp {
                result: 1,
                predicate: CmpPredicate::Olt,
                lhs: Value::Temp(0),
                rhs: Value::ConstFloat(1.0),
            },
            Instruction::UIToFP {
                result: 2,
                value: Value::Temp(1),
            },
            binary(3, FloatBinaryOp::Add, Value::Temp(0), Value::Temp(2)),
            Instruction::Return(Value::Temp(3)),
        ],
    );
    assert!(Pass::InstSimplify.run_on_function(&mut f));
    assert_eq!(body(&f), vec!["ret double 1.25"]);
}

#[test]
fn test_instsimplify_identities() {
    let mut f = function(
        &["x"],
        vec![
            binary(1, FloatBinaryOp::Mul, Value::Temp(0), Value::ConstFloat(1.0)),
            binary(2, FloatBinaryOp::Sub, Value::Temp(1), Value::ConstFloat(0.0)),
            binary(3, FloatBinaryOp::Add, Value::Temp(2), Value::ConstFloat(0.0)),
            Instruction::Return(Value::Temp(3)),
        ],
    );
    assert!(Pass::InstSimplify.run_on_function(&mut f));
    // x + 0.0 is not x when x is -0.0
    assert_eq!(body(&f), vec!["%3 = fadd double %0, 0.0", "ret double %3"]);
}

#[test]
fn test_instcombine() {
    let mut f = function(
        &["x"],
        vec![
            binary(1, FloatBinaryOp::Sub, Value::Temp(0), Value::ConstFloat(3.0)),
            binary(2, FloatBinaryOp::Div, Value::Temp(1), Value::ConstFloat(8.0)),
            binary(3, FloatBinaryOp::Div, Value::Temp(2), Value::ConstFloat(3.0)),
            Instruction::Return(Value::Temp(3)),
        ],
    );
    assert!(Pass::InstCombine.run_on_function(&mut f));
    assert_eq!(
        body(&f),
        vec![
            "%1 = fadd double %0, -3.0",
            "%2 = fmul double %1, 0.125",
            "%3 = fdiv double %2, 3.0",
            "ret double %3",
        ]
    );
}

#[test]
fn test_dce_keeps_calls() {
    let mut f = function(
        &["x"],
        vec![
            binary(1, FloatBinaryOp::Mul, Value::Temp(0), Value::Temp(0)),
            binary(2, FloatBinaryOp::Add, Value::Temp(1), Value::Temp(1)),
            Instruction::Call {
                result: 3,
                function: Value::Function("print".to_string()),
                args: vec![Value::Temp(0)],
            },
            Instruction::Return(Value::Temp(0)),
        ],
    );
    assert!(Pass::Dce.run_on_function(&mut f));
    assert_eq!(body(&f), vec!["%3 = call double @print(double %0)", "ret double %0"]);
}

#[test]
fn test_standard_pipeline_promotes_slots() {
    let mut module = Module::new("test".to_string());
    module.add_function(function(
        &["x"],
        vec![
            alloca(1),
            store(Value::Temp(0), 1),
            load(2, 1),
            binary(3, FloatBinaryOp::Mul, Value::Temp(2), Value::ConstFloat(2.0)),
            store(Value::Temp(3), 1),
            load(4, 1),
            Instruction::Return(Value::Temp(4)),
        ],
    ));

    let target = TargetMachine::from_triple("x86_64-unknown-linux-gnu").unwrap();
    PassPipeline::standard().run(&mut module, &target).unwrap();

    let f = module.get_function("f").unwrap();
    assert_eq!(body(f), vec!["%3 = fmul double %0, 2.0", "ret double %3"]);
}

#[test]
fn test_pipeline_rejects_invalid_module() {
    let mut module = Module::new("test".to_string());
    module.add_function(function(&[], vec![binary(0, FloatBinaryOp::Add, Value::ConstFloat(1.0), Value::ConstFloat(1.0))]));

    let target = TargetMachine::from_triple("x86_64-unknown-linux-gnu").unwrap();
    let err = PassPipeline::standard().run(&mut module, &target).unwrap_err();
    assert!(matches!(err, CompilerError::VerificationError { .. }));
}

#[test]
fn test_failure_names_the_pass() {
    let err = after_pass(Pass::Mem2Reg, CompilerError::verification_error("f", "%3 is used before it is defined"));
    assert_eq!(
        err.to_string(),
        "Verification failed for f: after pass mem2reg: %3 is used before it is defined"
    );
}
