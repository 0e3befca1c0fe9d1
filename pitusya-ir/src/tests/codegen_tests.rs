//! Code generator tests: AST items in, module and diagnostics out

use super::test_session;
use crate::ast::{BinaryOp, Expr, FunctionDef, Item, Program, Prototype, Stmt};
use crate::codegen::{CodeGenerator, Generated};
use pitusya_common::CompilerError;
use pretty_assertions::assert_eq;

fn function(name: &str, params: &[&str], body: Vec<Stmt>) -> Item {
    Item::Function(FunctionDef {
        proto: Prototype::new(name, params),
        body,
    })
}

fn let_(name: &str, value: Expr) -> Stmt {
    Stmt::Let {
        name: name.to_string(),
        value,
    }
}

fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        name: name.to_string(),
        value,
    }
}

fn generator() -> CodeGenerator {
    CodeGenerator::new(test_session())
}

fn message(err: CompilerError) -> String {
    match err {
        CompilerError::ConstructionError { message, .. } => message,
        other => panic!("expected a construction error, got {other:?}"),
    }
}

#[test]
fn test_generate_program() {
    let mut gen = generator();
    let program = Program {
        items: vec![
            Item::Extern(Prototype::new("print", &["n"])),
            function(
                "double",
                &["x"],
                vec![Stmt::Return(Expr::binary(BinaryOp::Mul, Expr::var("x"), Expr::number(2.0)))],
            ),
            Item::Expr(Expr::call("double", vec![Expr::number(21.0)])),
        ],
    };

    let generated = gen.generate_program(&program).unwrap();
    assert_eq!(generated.len(), 3);
    assert!(matches!(generated[0], Generated::Extern(_)));
    assert!(matches!(generated[1], Generated::Function(_)));
    let Generated::TopLevel(wrapper) = generated[2] else {
        panic!("expected a top-level wrapper");
    };

    assert_eq!(gen.session().function_name(wrapper).unwrap(), "__anon_expr");
    assert_eq!(gen.evaluate(wrapper, Vec::new()).unwrap(), 42.0);
}

#[test]
fn test_unknown_variable() {
    let mut gen = generator();
    let err = gen
        .generate_item(&function("f", &[], vec![Stmt::Return(Expr::var("y"))]))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Construction error in f: No variable y. Consider creating it"
    );
}

#[test]
fn test_assign_to_undeclared_variable() {
    let mut gen = generator();
    let body = vec![assign("y", Expr::number(1.0)), Stmt::Return(Expr::number(0.0))];
    let err = gen.generate_item(&function("f", &[], body)).unwrap_err();
    assert_eq!(message(err), "No variable y. Consider creating it");
}

#[test]
fn test_parameters_are_const() {
    let mut gen = generator();
    let body = vec![assign("x", Expr::number(1.0)), Stmt::Return(Expr::var("x"))];
    let err = gen.generate_item(&function("f", &["x"], body)).unwrap_err();
    assert_eq!(message(err), "Cannot assign to const variable x");
}

#[test]
fn test_unknown_function() {
    let mut gen = generator();
    let err = gen
        .generate_item(&Item::Expr(Expr::call("g", vec![])))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Construction error in __anon_expr: No function g. Define it before calling"
    );
}

#[test]
fn test_wrong_argument_count() {
    let mut gen = generator();
    gen.declare_runtime_library().unwrap();

    let err = gen
        .generate_item(&Item::Expr(Expr::call("max", vec![Expr::number(1.0)])))
        .unwrap_err();
    assert_eq!(
        message(err),
        "Incorrect number of arguments passed to max. Expected 2, but got 1"
    );
}

#[test]
fn test_duplicate_function() {
    let mut gen = generator();
    let item = function("f", &[], vec![Stmt::Return(Expr::number(1.0))]);
    gen.generate_item(&item).unwrap();

    let err = gen.generate_item(&item).unwrap_err();
    assert_eq!(message(err), "Function f already exists!");
}

#[test]
fn test_return_rules() {
    let mut gen = generator();

    let none = function("f", &[], vec![Stmt::Expr(Expr::number(1.0))]);
    assert_eq!(
        message(gen.generate_item(&none).unwrap_err()),
        "function f returns multiple values or returns nothing"
    );

    let twice = function(
        "f",
        &[],
        vec![Stmt::Return(Expr::number(1.0)), Stmt::Return(Expr::number(2.0))],
    );
    assert_eq!(
        message(gen.generate_item(&twice).unwrap_err()),
        "function f returns multiple values or returns nothing"
    );

    let trailing = function(
        "f",
        &[],
        vec![Stmt::Return(Expr::number(1.0)), Stmt::Expr(Expr::number(2.0))],
    );
    assert_eq!(
        message(gen.generate_item(&trailing).unwrap_err()),
        "unreachable code in function f"
    );
}

#[test]
fn test_string_where_number_expected() {
    let mut gen = generator();
    let item = Item::Expr(Expr::binary(
        BinaryOp::Add,
        Expr::Str("hi".to_string()),
        Expr::number(1.0),
    ));
    assert!(matches!(
        gen.generate_item(&item),
        Err(CompilerError::ConstructionError { .. })
    ));
}

#[test]
fn test_recovers_after_construction_error() {
    let mut gen = generator();
    let broken = function("f", &["x"], vec![Stmt::Return(Expr::var("y"))]);
    assert!(gen.generate_item(&broken).is_err());
    assert!(!gen.session().is_poisoned());
    assert!(gen.module().get_function("f").is_none());

    let fixed = function("f", &["x"], vec![Stmt::Return(Expr::var("x"))]);
    gen.generate_item(&fixed).unwrap();

    assert!(gen.generate_item(&Item::Expr(Expr::var("nope"))).is_err());
    let Generated::TopLevel(wrapper) = gen
        .generate_item(&Item::Expr(Expr::call("f", vec![Expr::number(5.0)])))
        .unwrap()
    else {
        panic!("expected a top-level wrapper");
    };
    // wrapper names are never reused, even after a failure
    assert_eq!(gen.session().function_name(wrapper).unwrap(), "__anon_expr.1");
    assert_eq!(gen.evaluate(wrapper, Vec::new()).unwrap(), 5.0);

    let module = gen.finish().unwrap();
    let names: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["f", "__anon_expr.1"]);
}

#[test]
fn test_variables_shadow_and_update() {
    let mut gen = generator();
    let body = vec![
        let_("acc", Expr::var("x")),
        assign("acc", Expr::binary(BinaryOp::Add, Expr::var("acc"), Expr::number(1.0))),
        assign("acc", Expr::binary(BinaryOp::Mul, Expr::var("acc"), Expr::var("acc"))),
        Stmt::Return(Expr::var("acc")),
    ];
    gen.generate_item(&function("f", &["x"], body)).unwrap();

    let Generated::TopLevel(wrapper) = gen
        .generate_item(&Item::Expr(Expr::call("f", vec![Expr::number(2.0)])))
        .unwrap()
    else {
        panic!("expected a top-level wrapper");
    };
    assert_eq!(gen.evaluate(wrapper, Vec::new()).unwrap(), 9.0);
}

#[test]
fn test_runtime_library_declared_once() {
    let mut gen = generator();
    gen.generate_item(&Item::Extern(Prototype::new("print", &["n"])))
        .unwrap();
    gen.declare_runtime_library().unwrap();
    gen.declare_runtime_library().unwrap();

    let externs = gen.module().functions.iter().filter(|f| f.is_external).count();
    assert_eq!(externs, 4);
    assert!(!gen.has_main());
}
