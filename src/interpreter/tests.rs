use std::rc::Rc;

use crate::{
    errors::errors::{Error, ErrorImpl},
    parse_program,
    parser::lookups::create_operator_table,
    Position,
};

use super::{
    frame::Frame,
    interpreter::{eval_expr, interpolate, Interpreter, Scope},
    lower::{lower, ExprKind},
    value::Value,
};

/// Evaluates `source` as top-level code and returns the root frame and output.
fn eval(source: &str) -> Result<(Scope, String), Error> {
    let ast = parse_program(source, &create_operator_table())?;
    let program = lower(ast)?;
    let mut out: Vec<u8> = vec![];
    let frame: Scope = Frame::root();
    {
        let mut interpreter = Interpreter::new(&mut out);
        eval_expr(&mut interpreter, &program, &frame)?;
    }
    Ok((frame, String::from_utf8(out).unwrap()))
}

fn value_of(source: &str, name: &str) -> Value {
    let (frame, _) = eval(source).unwrap();
    frame.get(name).unwrap()
}

#[test]
fn test_frame_chain_lookup() {
    let root: Rc<Frame<i64>> = Frame::root();
    root.bind("a", 1);
    let child = Frame::child(&root);
    child.bind("b", 2);

    assert_eq!(child.get("a"), Some(1));
    assert_eq!(child.get("b"), Some(2));
    assert_eq!(root.get("b"), None);
    assert_eq!(child.depth(), 1);
    assert!(Rc::ptr_eq(child.parent().unwrap(), &root));
    assert!(child.contains_local("b"));
    assert!(!child.contains_local("a"));
}

#[test]
fn test_frame_shadowing_and_keys() {
    let root: Rc<Frame<i64>> = Frame::root();
    root.bind("a", 1);
    let child = Frame::child(&root);
    child.bind("a", 10);
    child.update(vec![(String::from("c"), 3)]);

    assert_eq!(child.get("a"), Some(10));
    assert_eq!(root.get("a"), Some(1));
    assert_eq!(child.keys(), vec!["a", "c", "a"]);

    child.bind("a", 11);
    assert_eq!(child.keys(), vec!["a", "c", "a"]);
    assert_eq!(child.bindings(), vec![(String::from("a"), 11), (String::from("c"), 3)]);
}

#[test]
fn test_frame_missing_variable() {
    let root: Rc<Frame<i64>> = Frame::root();
    let err = root.lookup("foo", Position::new(2, 3)).unwrap_err();

    assert_eq!(
        err.get_impl(),
        &ErrorImpl::VariableNotDeclared {
            variable: String::from("foo")
        }
    );
    assert_eq!(err.get_position(), &Position::new(2, 3));
}

#[test]
fn test_arithmetic_precedence() {
    assert!(matches!(value_of("x = 1 + 2 * 3", "x"), Value::Int(7)));
    assert!(matches!(value_of("x = 2 ^ 3 ^ 2", "x"), Value::Int(512)));
    assert!(matches!(value_of("x = - 2 + 5", "x"), Value::Int(3)));
}

#[test]
fn test_integer_overflow() {
    let err = eval("x = 2 ^ 70").unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::IntegerOverflow { .. }));
}

#[test]
fn test_mixed_kinds_are_rejected() {
    let err = eval("x = 1 == \"a\"").unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::UnsupportedOperation { .. }));
}

#[test]
fn test_string_add_is_unsupported() {
    let err = eval("x = \"a\" + \"b\"").unwrap_err();

    assert_eq!(
        err.get_impl(),
        &ErrorImpl::UnsupportedOperation {
            operation: String::from("Add"),
            operand: String::from("Str")
        }
    );
}

#[test]
fn test_print_renders_values() {
    let (_, out) = eval("p 1\np 1 < 2\np [1, 2]\np \"a\\tb\"\np x -> x").unwrap();

    assert_eq!(out, "1\nTrue\n[1, 2]\na\tb\n<function/1>\n");
}

#[test]
fn test_interpolation() {
    let (_, out) = eval("name = \"world\"\np \"hello {name}\"").unwrap();

    assert_eq!(out, "hello world\n");
}

#[test]
fn test_interpolation_of_unknown_name() {
    let frame: Scope = Frame::root();
    let err = interpolate("{missing}", &frame, Position::new(1, 1)).unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::VariableNotDeclared { .. }));
}

#[test]
fn test_call_binds_parameters_in_child_frame() {
    let source = "add = a, b -> a + b\nx = add 1, 2";
    let (frame, _) = eval(source).unwrap();

    assert!(matches!(frame.get("x"), Some(Value::Int(3))));
    assert!(frame.get("a").is_none());
}

#[test]
fn test_wrong_number_of_arguments() {
    let err = eval("f = x -> x\ny = f @ (1, 2)").unwrap_err();

    assert_eq!(
        err.get_impl(),
        &ErrorImpl::UnexpectedArguments {
            expected: 1,
            received: 2
        }
    );
}

#[test]
fn test_zero_argument_call() {
    let (_, out) = eval("greet = -> p \"hi\"\ngreet!").unwrap();

    assert_eq!(out, "hi\n");
}

#[test]
fn test_calling_a_number() {
    let err = eval("x = 1\ny = x!").unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::NotCallable { .. }));
}

#[test]
fn test_dynamic_scope() {
    let source = "\
f = -> x + 1
x = 1
g = ->
  x = 10
  f!
h = ->
  x = 20
  f!
a = f!
b = g!
c = h!";
    let (frame, _) = eval(source).unwrap();

    assert!(matches!(frame.get("a"), Some(Value::Int(2))));
    assert!(matches!(frame.get("b"), Some(Value::Int(11))));
    assert!(matches!(frame.get("c"), Some(Value::Int(21))));
    assert!(matches!(frame.get("x"), Some(Value::Int(1))));
}

#[test]
fn test_ternary_and_match() {
    let source = "x = 1 if 2 > 1 else 2\ny = match\n  x == 2 => \"two\"\n  _ => \"other\"";
    let (frame, _) = eval(source).unwrap();

    assert!(matches!(frame.get("x"), Some(Value::Int(1))));
    assert!(matches!(frame.get("y"), Some(Value::Str(s)) if s == "other"));
}

#[test]
fn test_match_without_fallback() {
    let err = eval("y = match\n  1 == 2 => 1").unwrap_err();

    assert_eq!(err.get_impl(), &ErrorImpl::NoMatchingArm);
}

#[test]
fn test_non_boolean_condition() {
    let err = eval("x = 1 if 2 else 3").unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::NonBooleanCondition { .. }));
}

#[test]
fn test_regex_match_binds_named_groups() {
    let source = "m = \"key=value\" =~ /(?P<k>\\w+)=(?P<v>\\w+)/";
    let (frame, _) = eval(source).unwrap();

    assert!(matches!(frame.get("m"), Some(Value::Str(s)) if s == "key=value"));
    assert!(matches!(frame.get("k"), Some(Value::Str(s)) if s == "key"));
    assert!(matches!(frame.get("v"), Some(Value::Str(s)) if s == "value"));
}

#[test]
fn test_regex_match_is_anchored() {
    assert!(matches!(value_of("m = /b/ =~ \"abc\"", "m"), Value::Bool(false)));
    assert!(matches!(value_of("m = /x*/ =~ \"abc\"", "m"), Value::Bool(true)));
}

#[test]
fn test_subscript() {
    let source = "a = [10, 20, 30]\nx = a[1]\ny = a[- 1]";
    let (frame, _) = eval(source).unwrap();

    assert!(matches!(frame.get("x"), Some(Value::Int(20))));
    assert!(matches!(frame.get("y"), Some(Value::Int(30))));

    assert!(matches!(value_of("a = [10, 20]\nx = a[\"1\"]", "x"), Value::Int(20)));

    let err = eval("a = [1]\nx = a[3]").unwrap_err();
    assert_eq!(err.get_impl(), &ErrorImpl::IndexOutOfRange { index: 3, length: 1 });
}

#[test]
fn test_compose() {
    let source = "inc = x -> x + 1\na = inc . 1\nb = inc $ 2";
    let (frame, _) = eval(source).unwrap();

    assert!(matches!(frame.get("a"), Some(Value::Int(2))));
    assert!(matches!(frame.get("b"), Some(Value::Int(3))));
}

#[test]
fn test_assert() {
    assert!(eval("assert 1 == 1").is_ok());

    let err = eval("assert 1 == 2").unwrap_err();
    assert!(matches!(err.get_impl(), ErrorImpl::AssertionFailed { .. }));
}

#[test]
fn test_return_is_reported() {
    let err = eval("f = -> return\nf!").unwrap_err();

    assert_eq!(err.get_impl(), &ErrorImpl::UnhandledReturn);
}

#[test]
fn test_shell_command_output() {
    let (frame, _) = eval("out = `echo hello`").unwrap();

    assert!(matches!(frame.get("out"), Some(Value::Str(s)) if s == "hello\n"));
}

#[test]
fn test_failed_shell_command() {
    let err = eval("out = `false`").unwrap_err();
    assert_eq!(
        err.get_impl(),
        &ErrorImpl::ShellCommandFailed {
            command: String::from("false"),
            reason: String::from("exited with exit status: 1")
        }
    );

    let err = eval("out = `echo 'open`").unwrap_err();
    assert_eq!(
        err.get_impl(),
        &ErrorImpl::ShellCommandFailed {
            command: String::from("echo 'open"),
            reason: String::from("unbalanced quotes")
        }
    );
}

#[test]
fn test_shell_command_quoting() {
    let (frame, _) = eval("out = `echo 'a  b' \"c\\\"d\"`").unwrap();

    assert!(matches!(frame.get("out"), Some(Value::Str(s)) if s == "a  b c\"d\n"));
}

#[test]
fn test_lowering_rejects_misplaced_nodes() {
    let table = create_operator_table();

    let err = lower(parse_program("x = 1, 2", &table).unwrap()).unwrap_err();
    assert_eq!(err.get_impl(), &ErrorImpl::CommaOutsideList);

    let err = lower(parse_program("x = _ => 1", &table).unwrap()).unwrap_err();
    assert_eq!(err.get_impl(), &ErrorImpl::MisplacedArm);

    let err = lower(parse_program("1 = 2", &table).unwrap()).unwrap_err();
    assert!(matches!(err.get_impl(), ErrorImpl::InvalidAssignmentTarget { .. }));

    let err = lower(parse_program("r = /(/", &table).unwrap()).unwrap_err();
    assert!(matches!(err.get_impl(), ErrorImpl::InvalidRegex { .. }));
}

#[test]
fn test_lowering_resolves_call_arguments() {
    let table = create_operator_table();
    let program = lower(parse_program("f @ (1, 2)", &table).unwrap()).unwrap();

    let ExprKind::Block(exprs) = &program.kind else {
        panic!("expected a block, got {}", program);
    };
    let ExprKind::Call { args, .. } = &exprs[0].kind else {
        panic!("expected a call, got {}", exprs[0]);
    };
    assert_eq!(args.len(), 2);
}
