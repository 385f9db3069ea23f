use std::rc::Rc;

use crate::{
    errors::errors::{Error, ErrorImpl},
    interpreter::{
        frame::Frame,
        interpreter::{eval_expr, Interpreter, Scope},
        lower::lower,
        value::{Value, ValueKind},
    },
    parse_program,
    parser::lookups::create_operator_table,
    Position,
};

use super::type_checker::{fix_main_signature, unify, Type, TypeChecker};

fn top_frame(source: &str) -> Scope {
    let ast = parse_program(source, &create_operator_table()).unwrap();
    let program = lower(ast).unwrap();
    let mut out: Vec<u8> = vec![];
    let frame: Scope = Frame::root();
    let mut interpreter = Interpreter::new(&mut out);
    eval_expr(&mut interpreter, &program, &frame).unwrap();
    frame
}

fn infer(source: &str, name: &str) -> Result<Type, Error> {
    let frame = top_frame(source);
    let mut checker = TypeChecker::from_frame(&frame);
    let Some(Value::Func(function)) = frame.get(name) else {
        panic!("{} is not a function", name);
    };
    let root = Rc::clone(&checker.root);
    checker.infer_function(&function, &root)
}

#[test]
fn test_unify() {
    let position = Position::new(1, 1);

    assert_eq!(unify(ValueKind::Int, ValueKind::Int, position).unwrap(), ValueKind::Int);
    assert_eq!(unify(ValueKind::Any, ValueKind::Str, position).unwrap(), ValueKind::Str);
    assert_eq!(unify(ValueKind::Bool, ValueKind::Any, position).unwrap(), ValueKind::Bool);

    let err = unify(ValueKind::Int, ValueKind::Str, position).unwrap_err();
    assert_eq!(
        err.get_impl(),
        &ErrorImpl::TypeMatchError {
            expected: String::from("Int"),
            received: String::from("Str")
        }
    );
}

#[test]
fn test_function_signature() {
    let ty = infer("f = a, b -> a + b", "f").unwrap();
    assert_eq!(ty, Type::function(vec![ValueKind::Any, ValueKind::Any], ValueKind::Any));

    let ty = infer("f = a -> a < 1", "f").unwrap();
    assert_eq!(ty.ret, ValueKind::Bool);
    assert_eq!(ty.to_string(), "(Any) -> Bool");
}

#[test]
fn test_signature_is_cached_on_the_function() {
    let frame = top_frame("f = -> \"text\"");
    let Some(Value::Func(function)) = frame.get("f") else {
        panic!("f is not a function");
    };
    assert!(function.ty.borrow().is_none());

    let mut checker = TypeChecker::from_frame(&frame);
    let root = Rc::clone(&checker.root);
    checker.infer_function(&function, &root).unwrap();

    assert_eq!(
        *function.ty.borrow(),
        Some(Type::function(vec![], ValueKind::Str))
    );
}

#[test]
fn test_operand_mismatch() {
    let err = infer("f = -> 1 == \"a\"", "f").unwrap_err();

    assert_eq!(
        err.get_impl(),
        &ErrorImpl::TypeMatchError {
            expected: String::from("Int"),
            received: String::from("Str")
        }
    );
}

#[test]
fn test_branch_mismatch() {
    let err = infer("f = -> 1 if 1 < 2 else \"a\"", "f").unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::BranchTypeMismatch { .. }));
}

#[test]
fn test_condition_must_be_boolean() {
    let err = infer("f = -> 1 if 3 else 2", "f").unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::NonBooleanCondition { .. }));
}

#[test]
fn test_assert_requires_boolean() {
    let err = infer("f = -> assert 1", "f").unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::TypeMatchError { .. }));
}

#[test]
fn test_calls_use_the_callee_return() {
    let source = "double = x -> x * 2\nf = -> double 2";
    let ty = infer(source, "f").unwrap();

    assert_eq!(ty.ret, ValueKind::Int);

    let source = "id = x -> x\nf = -> id 2";
    assert_eq!(infer(source, "f").unwrap().ret, ValueKind::Any);

    let source = "name = -> \"n\"\nf = -> name!";
    assert_eq!(infer(source, "f").unwrap().ret, ValueKind::Str);
}

#[test]
fn test_recursion_terminates() {
    let source = "count = n -> (0 if n < 1 else count n - 1)";
    let ty = infer(source, "count").unwrap();

    assert_eq!(ty.args, Some(vec![ValueKind::Any]));
}

#[test]
fn test_arrays_and_regex_are_unchecked() {
    let ty = infer("f = -> [1, \"a\"][0]", "f").unwrap();
    assert_eq!(ty.ret, ValueKind::Any);

    let ty = infer("f = -> /a/ =~ \"a\"", "f").unwrap();
    assert_eq!(ty.ret, ValueKind::Any);
}

#[test]
fn test_calling_an_integer() {
    let err = infer("x = 1\nf = -> x!", "f").unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::NotCallable { .. }));
}

#[test]
fn test_main_returning_string_is_fixed() {
    let frame = top_frame("main = -> \"done\"");
    fix_main_signature(&frame, &[String::from("prog")]).unwrap();

    let Some(Value::Func(main)) = frame.get("main") else {
        panic!("main is not a function");
    };
    assert_eq!(main.ty.borrow().as_ref().map(|t| t.ret), Some(ValueKind::Int));
    assert!(main.body.to_string().ends_with("Int(0))"));
}

#[test]
fn test_main_returning_int_is_kept() {
    let frame = top_frame("main = -> argc");
    let Some(Value::Func(before)) = frame.get("main") else {
        panic!("main is not a function");
    };

    fix_main_signature(&frame, &[]).unwrap();

    let Some(Value::Func(after)) = frame.get("main") else {
        panic!("main is not a function");
    };
    assert!(Rc::ptr_eq(&before, &after));
}
