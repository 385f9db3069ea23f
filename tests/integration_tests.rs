//! End-to-end tests running whole programs through `dent::run`.

use dent::{
    display_error,
    errors::errors::{Error, ErrorImpl},
    run, Options,
};

fn run_with(source: &str, options: &Options) -> (Result<i32, Error>, String) {
    let mut out: Vec<u8> = vec![];
    let result = run(source, options, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn run_program(source: &str) -> (i32, String) {
    let (result, out) = run_with(source, &Options::default());
    (result.unwrap(), out)
}

fn checked() -> Options {
    Options {
        check_types: true,
        args: vec![String::from("prog.dent")],
    }
}

#[test]
fn test_main_exit_code() {
    let (code, out) = run_program("main = ->\n  3");

    assert_eq!(code, 3);
    assert_eq!(out, "");
}

#[test]
fn test_program_without_main() {
    let (code, out) = run_program("p \"top level\"");

    assert_eq!(code, 0);
    assert_eq!(out, "top level\n");
}

#[test]
fn test_non_integer_main_exits_zero() {
    let source = "main = ->\n  p \"hi\"";

    let (code, out) = run_program(source);
    assert_eq!(code, 0);
    assert_eq!(out, "hi\n");

    let (result, out) = run_with(source, &checked());
    assert_eq!(result.unwrap(), 0);
    assert_eq!(out, "hi\n");
}

#[test]
fn test_precedence() {
    let source = "main = ->\n  p 1 + 2 * 3\n  p 2 ^ 3 ^ 2\n  p 10 - 4 - 3\n  0";
    let (_, out) = run_program(source);

    assert_eq!(out, "7\n512\n3\n");
}

#[test]
fn test_arguments() {
    let source = "main = ->\n  p argv[1]\n  argc";
    let options = Options {
        check_types: false,
        args: vec![
            String::from("prog.dent"),
            String::from("first"),
            String::from("second"),
        ],
    };
    let (result, out) = run_with(source, &options);

    assert_eq!(result.unwrap(), 3);
    assert_eq!(out, "first\n");
}

#[test]
fn test_assignment_binds_in_innermost_frame() {
    let source = "\
x = 1
f = ->
  x = 2
  p x
main = ->
  f!
  p x
  0";
    let (_, out) = run_program(source);

    assert_eq!(out, "2\n1\n");
}

#[test]
fn test_callee_sees_caller_bindings() {
    let source = "\
show = -> p \"value is {v}\"
main = ->
  v = 7
  show!
  0";
    let (_, out) = run_program(source);

    assert_eq!(out, "value is 7\n");
}

#[test]
fn test_functions_and_implicit_calls() {
    let source = "\
inc = x -> x + 1
double = x -> x * 2
main = ->
  p double inc 3
  p inc . (double 5)
  add = a, b -> a + b
  p add 2, 3
  0";
    let (_, out) = run_program(source);

    assert_eq!(out, "8\n11\n5\n");
}

#[test]
fn test_match_with_regex() {
    let source = "\
classify = s ->
  match
    s =~ /\\d+/ => \"number\"
    _ => \"word\"
main = ->
  p classify @ \"42\"
  p classify @ \"abc\"
  0";
    let (_, out) = run_program(source);

    assert_eq!(out, "number\nword\n");
}

#[test]
fn test_regex_captures_become_variables() {
    let source = "\
main = ->
  line = \"name=dent\"
  line =~ /(?P<key>\\w+)=(?P<value>\\w+)/
  p \"{key} is {value}\"
  0";
    let (_, out) = run_program(source);

    assert_eq!(out, "name is dent\n");
}

#[test]
fn test_arrays() {
    let source = "\
main = ->
  xs = [1, 2, 3]
  p xs
  p xs[0] + xs[- 1]
  0";
    let (_, out) = run_program(source);

    assert_eq!(out, "[1, 2, 3]\n4\n");
}

#[test]
fn test_ternary() {
    let source = "\
sign = n -> (\"neg\" if n < 0 else \"pos\")
main = ->
  p sign 5
  p sign (- 5)
  0";
    let (_, out) = run_program(source);

    assert_eq!(out, "pos\nneg\n");
}

#[test]
fn test_mismatched_operands_at_runtime() {
    let source = "main = ->\n  x = 1 == \"a\"\n  0";
    let (result, _) = run_with(source, &Options::default());

    let err = result.unwrap_err();
    assert!(matches!(err.get_impl(), ErrorImpl::UnsupportedOperation { .. }));
}

#[test]
fn test_mismatched_operands_with_type_check() {
    let source = "main = ->\n  p \"never printed\"\n  x = 1 == \"a\"\n  0";
    let (result, out) = run_with(source, &checked());

    let err = result.unwrap_err();
    assert_eq!(
        err.get_impl(),
        &ErrorImpl::TypeMatchError {
            expected: String::from("Int"),
            received: String::from("Str")
        }
    );
    assert_eq!(out, "");
}

#[test]
fn test_assertion_failure() {
    let (result, _) = run_with("main = ->\n  assert 1 > 2\n  0", &Options::default());

    assert!(matches!(
        result.unwrap_err().get_impl(),
        ErrorImpl::AssertionFailed { .. }
    ));
}

#[test]
fn test_shell_command() {
    let (_, out) = run_program("main = ->\n  p `echo from shell`\n  0");

    assert_eq!(out, "from shell\n\n");
}

#[test]
fn test_syntax_error_report() {
    let source = "main = ->\n  p (1 + 2\n  0";
    let (result, _) = run_with(source, &Options::default());
    let err = result.unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::MissingClosingSymbol { .. }));
    let report = display_error(&err, source, "prog.dent");
    assert!(report.starts_with("Error: MissingClosingSymbol"));
    assert!(report.contains("-> prog.dent:2:"));
}

#[test]
fn test_runtime_error_report() {
    let source = "main = ->\n  p y\n  0";
    let (result, _) = run_with(source, &Options::default());
    let err = result.unwrap_err();

    let report = display_error(&err, source, "prog.dent");
    assert_eq!(
        report,
        "Error: VariableNotDeclared (Variable `y` not declared)\n\
         -> prog.dent:2:5\n  |\n2 | p y\n  | --^\n"
    );
}

#[test]
fn test_exit_code_out_of_range() {
    let (result, _) = run_with("main = ->\n  2 ^ 40", &Options::default());

    assert!(matches!(
        result.unwrap_err().get_impl(),
        ErrorImpl::IntegerOverflow { operation } if operation == "exit code 1099511627776"
    ));
}
