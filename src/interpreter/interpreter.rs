use std::{io::Write, process::Command, rc::Rc};

use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use crate::{
    ast::ast::Node,
    errors::errors::{Error, ErrorImpl},
    type_checker::type_checker::fix_main_signature,
    Position,
};

use super::{
    frame::Frame,
    lower::{lower, BinaryOp, Expr, ExprKind},
    value::{Function, Value},
};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-zA-Z\.]+)\}").unwrap();
}

pub type Scope = Rc<Frame<Value>>;

/// Evaluation state shared by every node: where `p` writes to.
pub struct Interpreter<'o> {
    out: &'o mut dyn Write,
}

impl<'o> Interpreter<'o> {
    pub fn new(out: &'o mut dyn Write) -> Self {
        Interpreter { out }
    }

    fn print(&mut self, value: &Value, position: Position) -> Result<(), Error> {
        writeln!(self.out, "{}", value).map_err(|err| {
            Error::new(
                ErrorImpl::Io {
                    message: err.to_string(),
                },
                position,
            )
        })
    }
}

fn unsupported(operation: &str, operand: &Value, position: Position) -> Error {
    Error::new(
        ErrorImpl::UnsupportedOperation {
            operation: operation.to_string(),
            operand: operand.kind().to_string(),
        },
        position,
    )
}

fn overflow(op: BinaryOp, position: Position) -> Error {
    Error::new(
        ErrorImpl::IntegerOverflow {
            operation: op.to_string(),
        },
        position,
    )
}

/// Substitutes `{name}` placeholders and the `\n`, `\t` escapes.
pub fn interpolate(text: &str, frame: &Scope, position: Position) -> Result<String, Error> {
    let mut result = text.to_string();
    for captures in PLACEHOLDER.captures_iter(text) {
        let Some(name) = captures.get(1) else {
            continue;
        };
        let value = frame.lookup(name.as_str(), position)?;
        result = result.replace(&format!("{{{}}}", name.as_str()), &value.to_string());
    }
    Ok(result.replace("\\n", "\n").replace("\\t", "\t"))
}

fn run_shell(command: &str, position: Position) -> Result<Value, Error> {
    let failed = |reason: String| {
        Error::new(
            ErrorImpl::ShellCommandFailed {
                command: command.to_string(),
                reason,
            },
            position,
        )
    };

    let words = shlex::split(command).ok_or_else(|| failed(String::from("unbalanced quotes")))?;
    let Some((program, args)) = words.split_first() else {
        return Err(failed(String::from("empty command")));
    };

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|err| failed(err.to_string()))?;

    if !output.status.success() {
        return Err(failed(format!("exited with {}", output.status)));
    }
    Ok(Value::Str(String::from_utf8_lossy(&output.stdout).into_owned()))
}

/// Truthiness of a condition. Strings count as true so regex matches can
/// be used directly as conditions.
fn is_true(value: &Value, position: Position) -> Result<bool, Error> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Str(_) => Ok(true),
        other => Err(Error::new(
            ErrorImpl::NonBooleanCondition {
                found: other.kind().to_string(),
            },
            position,
        )),
    }
}

fn subscript(left: Value, right: Value, position: Position) -> Result<Value, Error> {
    let Value::Array(values) = &left else {
        return Err(unsupported("Subscript", &left, position));
    };
    let index = match &right {
        Value::Int(index) => *index,
        Value::Str(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| unsupported("Subscript", &right, position))?,
        other => return Err(unsupported("Subscript", other, position)),
    };

    let length = values.len();
    let resolved = if index < 0 {
        i64::try_from(length).ok().and_then(|l| usize::try_from(l + index).ok())
    } else {
        usize::try_from(index).ok()
    };

    resolved
        .and_then(|i| values.get(i).cloned())
        .ok_or_else(|| Error::new(ErrorImpl::IndexOutOfRange { index, length }, position))
}

fn regex_match(left: Value, right: Value, frame: &Scope, position: Position) -> Result<Value, Error> {
    let (regex, text) = match (left, right) {
        (Value::Regex(regex), Value::Str(text)) | (Value::Str(text), Value::Regex(regex)) => {
            (regex, text)
        }
        (left, _) => return Err(unsupported("RegMatch", &left, position)),
    };

    let Some(captures) = regex.captures(&text) else {
        return Ok(Value::Bool(false));
    };
    let Some(whole) = captures.get(0).filter(|m| m.start() == 0) else {
        return Ok(Value::Bool(false));
    };

    let named = regex
        .capture_names()
        .flatten()
        .filter_map(|name| {
            captures
                .name(name)
                .map(|m| (name.to_string(), Value::Str(m.as_str().to_string())))
        })
        .collect::<Vec<(String, Value)>>();
    frame.update(named);

    if whole.as_str().is_empty() {
        Ok(Value::Bool(true))
    } else {
        Ok(Value::Str(whole.as_str().to_string()))
    }
}

pub fn eval_binary(
    op: BinaryOp,
    left: Value,
    right: Value,
    frame: &Scope,
    position: Position,
) -> Result<Value, Error> {
    match op {
        BinaryOp::Subscript => return subscript(left, right, position),
        BinaryOp::RegMatch => return regex_match(left, right, frame, position),
        _ => {}
    }

    if left.kind() != right.kind() {
        return Err(Error::new(
            ErrorImpl::UnsupportedOperation {
                operation: op.to_string(),
                operand: format!("{} and {}", left.kind(), right.kind()),
            },
            position,
        ));
    }

    let value = match (op, &left, &right) {
        (BinaryOp::Add, Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_add(*b).ok_or_else(|| overflow(op, position))?)
        }
        (BinaryOp::Sub, Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_sub(*b).ok_or_else(|| overflow(op, position))?)
        }
        (BinaryOp::Mul, Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_mul(*b).ok_or_else(|| overflow(op, position))?)
        }
        (BinaryOp::Pow, Value::Int(a), Value::Int(b)) => {
            let exponent = u32::try_from(*b).map_err(|_| overflow(op, position))?;
            Value::Int(a.checked_pow(exponent).ok_or_else(|| overflow(op, position))?)
        }
        (BinaryOp::Less, Value::Int(a), Value::Int(b)) => Value::Bool(a < b),
        (BinaryOp::More, Value::Int(a), Value::Int(b)) => Value::Bool(a > b),
        (BinaryOp::Eq, _, _) => match left.equals(&right) {
            Some(equal) => Value::Bool(equal),
            None => return Err(unsupported(&op.to_string(), &left, position)),
        },
        _ => return Err(unsupported(&op.to_string(), &left, position)),
    };
    Ok(value)
}

/// Calls `func` in `frame`, which must be a fresh child of the caller's frame.
pub fn call_function(
    interpreter: &mut Interpreter,
    func: Value,
    args: Vec<Value>,
    frame: &Scope,
    position: Position,
) -> Result<Value, Error> {
    let Value::Func(function) = func else {
        return Err(Error::new(
            ErrorImpl::NotCallable {
                value: func.to_string(),
            },
            position,
        ));
    };

    match &function.params {
        Some(params) if params.len() == args.len() => {
            frame.update(params.iter().cloned().zip(args));
        }
        None if args.is_empty() => {}
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedArguments {
                    expected: function.arity(),
                    received: args.len(),
                },
                position,
            ))
        }
    }

    debug!(
        target: "interpreter.call",
        "calling <function/{}> at depth {}",
        function.arity(),
        frame.depth()
    );
    eval_expr(interpreter, &function.body, frame)
}

pub fn eval_expr(interpreter: &mut Interpreter, expr: &Expr, frame: &Scope) -> Result<Value, Error> {
    let position = expr.position;
    match &expr.kind {
        ExprKind::Int(value) => Ok(Value::Int(*value)),
        ExprKind::Str(text) => Ok(Value::Str(interpolate(text, frame, position)?)),
        ExprKind::ShellCmd(command) => run_shell(&interpolate(command, frame, position)?, position),
        ExprKind::Regex(regex) => Ok(Value::Regex(regex.clone())),
        ExprKind::Var(name) => frame.lookup(name, position),
        ExprKind::AlwaysTrue => Ok(Value::Bool(true)),
        ExprKind::Return => Err(Error::new(ErrorImpl::UnhandledReturn, position)),
        ExprKind::Block(exprs) => {
            let mut result = Value::array(vec![]);
            for expr in exprs {
                result = eval_expr(interpreter, expr, frame)?;
            }
            Ok(result)
        }
        ExprKind::Array(exprs) => {
            let values = exprs
                .iter()
                .map(|expr| eval_expr(interpreter, expr, frame))
                .collect::<Result<Vec<Value>, Error>>()?;
            Ok(Value::array(values))
        }
        ExprKind::Print(arg) => {
            let value = eval_expr(interpreter, arg, frame)?;
            interpreter.print(&value, position)?;
            Ok(value)
        }
        ExprKind::Assert(arg) => {
            let value = eval_expr(interpreter, arg, frame)?;
            if !is_true(&value, position)? {
                return Err(Error::new(
                    ErrorImpl::AssertionFailed {
                        expression: arg.to_string(),
                    },
                    position,
                ));
            }
            Ok(value)
        }
        ExprKind::Minus(arg) => match eval_expr(interpreter, arg, frame)? {
            Value::Int(value) => value.checked_neg().map(Value::Int).ok_or_else(|| {
                Error::new(
                    ErrorImpl::IntegerOverflow {
                        operation: String::from("Minus"),
                    },
                    position,
                )
            }),
            other => Err(unsupported("Minus", &other, position)),
        },
        ExprKind::Plus(arg) => match eval_expr(interpreter, arg, frame)? {
            Value::Int(value) => Ok(Value::Int(value)),
            other => Err(unsupported("Plus", &other, position)),
        },
        ExprKind::Match(arms) => {
            // first arm whose condition holds wins
            for arm in arms {
                let condition = eval_expr(interpreter, &arm.iff, frame)?;
                if is_true(&condition, arm.iff.position)? {
                    return eval_expr(interpreter, &arm.then, frame);
                }
            }
            Err(Error::new(ErrorImpl::NoMatchingArm, position))
        }
        ExprKind::Func(function) => Ok(Value::Func(Rc::clone(function))),
        ExprKind::Call { func, args } => {
            let func = eval_expr(interpreter, func, frame)?;
            let args = args
                .iter()
                .map(|arg| eval_expr(interpreter, arg, frame))
                .collect::<Result<Vec<Value>, Error>>()?;
            // dynamic scope: the callee frame hangs off the caller's frame
            let callee = Frame::child(frame);
            call_function(interpreter, func, args, &callee, position)
        }
        ExprKind::Call0(func) => {
            let func = eval_expr(interpreter, func, frame)?;
            let callee = Frame::child(frame);
            call_function(interpreter, func, vec![], &callee, position)
        }
        ExprKind::Compose {
            left,
            right,
            right_to_left,
        } => {
            let (func, arg) = if *right_to_left {
                let arg = eval_expr(interpreter, right, frame)?;
                (eval_expr(interpreter, left, frame)?, arg)
            } else {
                let func = eval_expr(interpreter, left, frame)?;
                (func, eval_expr(interpreter, right, frame)?)
            };
            let callee = Frame::child(frame);
            call_function(interpreter, func, vec![arg], &callee, position)
        }
        ExprKind::Assign { name, value } => {
            let value = eval_expr(interpreter, value, frame)?;
            frame.bind(name, value.clone());
            Ok(value)
        }
        ExprKind::Binary { op, left, right } => {
            let left = eval_expr(interpreter, left, frame)?;
            let right = eval_expr(interpreter, right, frame)?;
            eval_binary(*op, left, right, frame, position)
        }
        ExprKind::IfElse {
            iff,
            then,
            otherwise,
        } => {
            let condition = eval_expr(interpreter, iff, frame)?;
            if is_true(&condition, iff.position)? {
                eval_expr(interpreter, then, frame)
            } else {
                eval_expr(interpreter, otherwise, frame)
            }
        }
    }
}

fn main_arguments(frame: &Scope, args: &[String]) {
    let argc = i64::try_from(args.len()).unwrap_or(i64::MAX);
    frame.bind("argc", Value::Int(argc));
    frame.bind(
        "argv",
        Value::array(args.iter().cloned().map(Value::Str).collect()),
    );
}

/// Evaluates a whole program and returns its exit status.
///
/// Top-level expressions run first, in the root frame. If they bound `main`,
/// it then runs in a child frame that also holds `argc` and `argv`.
pub fn run(ast: Node, args: &[String], check_types: bool, out: &mut dyn Write) -> Result<i32, Error> {
    let program = lower(ast)?;
    debug!(target: "interpreter.final_ast", "the final AST is:\n{}", program);

    let mut interpreter = Interpreter::new(out);
    let frame: Scope = Frame::root();
    eval_expr(&mut interpreter, &program, &frame)?;
    debug!(target: "interpreter.topframe", "the top frame is\n{}", frame);

    if !frame.contains_local("main") {
        info!(target: "interpreter", "no main function defined, exiting");
        return Ok(0);
    }

    if check_types {
        fix_main_signature(&frame, args)?;
    }

    let main_frame = Frame::child(&frame);
    main_arguments(&main_frame, args);

    let position = program.position;
    let main = main_frame.lookup("main", position)?;
    let Value::Func(main) = main else {
        return Err(Error::new(
            ErrorImpl::NotCallable {
                value: main.to_string(),
            },
            position,
        ));
    };

    let result = run_main(&mut interpreter, &main, &main_frame)?;
    match result {
        // Exit statuses outside i32 cannot be handed to the process.
        Value::Int(code) => i32::try_from(code).map_err(|_| {
            Error::new(
                ErrorImpl::IntegerOverflow {
                    operation: format!("exit code {}", code),
                },
                position,
            )
        }),
        _ => Ok(0),
    }
}

fn run_main(interpreter: &mut Interpreter, main: &Rc<Function>, frame: &Scope) -> Result<Value, Error> {
    debug!(target: "interpreter.call", "running main at depth {}", frame.depth());
    eval_expr(interpreter, &main.body, frame)
}
