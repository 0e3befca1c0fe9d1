//! Unit tests for the IR module

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_ir_values() {
    let temp = Value::Temp(5);
    let constant = Value::ConstFloat(42.0);
    let function = Value::Function("main".to_string());

    assert_eq!(format!("{}", temp), "%5");
    assert_eq!(format!("{}", constant), "42.0");
    assert_eq!(format!("{}", function), "@main");
    assert_eq!(format!("{}", Value::ConstString(b"hi\0\n".to_vec())), "c\"hi\\00\\0A\"");
}

#[test]
fn test_float_identity_is_bitwise() {
    assert_ne!(Value::ConstFloat(0.0), Value::ConstFloat(-0.0));
    assert_eq!(Value::ConstFloat(f64::NAN), Value::ConstFloat(f64::NAN));
    assert_eq!(Value::ConstFloat(1.5), Value::ConstFloat(1.5));
}

#[test]
fn test_types() {
    assert_eq!(IrType::Double.to_string(), "double");
    assert_eq!(IrType::byte_array(5).to_string(), "[5 x i8]");
    assert_eq!(IrType::Ptr(Box::new(IrType::Double)).to_string(), "double*");
}

#[test]
fn test_ops() {
    assert_eq!(FloatBinaryOp::Div.apply(1.0, 4.0), 0.25);
    assert_eq!(FloatBinaryOp::Sub.to_string(), "fsub");
    assert!(FloatBinaryOp::Mul.is_commutative());
    assert!(!FloatBinaryOp::Div.is_commutative());

    assert!(CmpPredicate::Ole.evaluate(2.0, 2.0));
    assert!(!CmpPredicate::One.evaluate(f64::NAN, 1.0));
    assert!(!CmpPredicate::Oeq.evaluate(f64::NAN, f64::NAN));
}

#[test]
fn test_basic_block() {
    let mut block = BasicBlock::new(0, "entry");
    assert!(block.is_empty());
    assert!(!block.has_terminator());

    block.add_instruction(Instruction::Binary {
        result: 1,
        op: FloatBinaryOp::Add,
        lhs: Value::Temp(0),
        rhs: Value::ConstFloat(1.0),
    });
    assert!(!block.is_empty());
    assert!(!block.has_terminator());

    block.add_instruction(Instruction::Return(Value::Temp(1)));
    assert!(block.has_terminator());
}

#[test]
fn test_function() {
    let function = Function::new("test".to_string(), &["x".to_string(), "y".to_string()]);

    assert_eq!(function.arity(), 2);
    assert_eq!(function.return_type, IrType::Double);
    assert_eq!(function.param_index("y"), Some(1));
    assert_eq!(function.param_index("z"), None);
    assert_eq!(function.state, FunctionState::Declared);
}

#[test]
fn test_ir_builder() {
    let mut module = Module::new("test".to_string());
    let mut builder = IrBuilder::new();

    let index = module.add_function(Function::new("add".to_string(), &["a".to_string(), "b".to_string()]));
    let entry = builder.append_block(&mut module, index, "entry").unwrap();
    builder.position_at_end(&module, index, entry).unwrap();

    let result = builder
        .build_binary(&mut module, FloatBinaryOp::Add, Value::Temp(0), Value::Temp(1))
        .unwrap();
    assert_eq!(result, Value::Temp(2));

    builder.build_return(&mut module, result).unwrap();
    assert!(module.get_function("add").unwrap().blocks[0].has_terminator());

    let err = builder
        .build_binary(&mut module, FloatBinaryOp::Mul, Value::Temp(0), Value::Temp(1))
        .unwrap_err();
    assert!(matches!(err, pitusya_common::CompilerError::ConstructionError { .. }));

    let function = module.get_function("add").unwrap();
    assert_eq!(function.blocks.len(), 1);
    assert_eq!(function.instruction_count(), 2);
}

#[test]
fn test_function_display() {
    let mut module = Module::new("pitusya module".to_string());
    let mut builder = IrBuilder::new();

    module.add_function(Function::external("print".to_string(), 1));
    let index = module.add_function(Function::new("half".to_string(), &["x".to_string()]));
    let entry = builder.append_block(&mut module, index, "entry").unwrap();
    builder.position_at_end(&module, index, entry).unwrap();
    let half = builder
        .build_binary(&mut module, FloatBinaryOp::Div, Value::Temp(0), Value::ConstFloat(2.0))
        .unwrap();
    builder.build_return(&mut module, half).unwrap();

    let expected = "\
; ModuleID = 'pitusya module'

declare double @print(double)

define double @half(double %0) { ; x
entry:
  %1 = fdiv double %0, 2.0
  ret double %1
}
";
    assert_eq!(module.to_string(), expected);
}

#[test]
fn test_module() {
    let mut module = Module::new("test".to_string());

    module.add_function(Function::new("main".to_string(), &[]));
    let mut dead = Function::new("dead".to_string(), &[]);
    dead.state = FunctionState::Abandoned;
    module.add_function(dead);

    assert_eq!(module.functions.len(), 2);
    assert!(module.get_function("main").is_some());
    assert!(module.get_function("dead").is_none());
    assert_eq!(module.remove_abandoned(), 1);
    assert_eq!(module.functions.len(), 1);
}
