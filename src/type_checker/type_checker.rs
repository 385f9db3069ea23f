use std::{cell::RefCell, fmt::Display, rc::Rc};

use log::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    interpreter::{
        frame::Frame,
        lower::{BinaryOp, Expr, ExprKind},
        value::{Function, Value, ValueKind},
    },
    Position,
};

/// Inferred signature of an expression.
///
/// `args` is `Some` for function values and holds one tag per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub args: Option<Vec<ValueKind>>,
    pub ret: ValueKind,
}

impl Type {
    pub fn value(ret: ValueKind) -> Self {
        Type { args: None, ret }
    }

    pub fn function(args: Vec<ValueKind>, ret: ValueKind) -> Self {
        Type {
            args: Some(args),
            ret,
        }
    }

    /// Whether the return tag is known and not an integer.
    pub fn returns_non_int(&self) -> bool {
        !matches!(self.ret, ValueKind::Int | ValueKind::Any)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.args {
            Some(args) => {
                let args = args.iter().map(|a| a.to_string()).collect::<Vec<String>>();
                write!(f, "({}) -> {}", args.join(", "), self.ret)
            }
            None => write!(f, "{}", self.ret),
        }
    }
}

/// What the inference environment knows about a name.
///
/// Functions bound at the top level start out `Pending` and are inferred on
/// first use, so definition order does not matter.
#[derive(Debug, Clone)]
pub enum Slot {
    Known(Type),
    Pending(Rc<Function>),
}

pub type Env = Rc<Frame<Slot>>;

/// Fails unless both tags agree; `Any` agrees with everything.
pub fn unify(expected: ValueKind, received: ValueKind, position: Position) -> Result<ValueKind, Error> {
    match (expected, received) {
        (ValueKind::Any, other) | (other, ValueKind::Any) => Ok(other),
        (a, b) if a == b => Ok(a),
        (a, b) => Err(Error::new(
            ErrorImpl::TypeMatchError {
                expected: a.to_string(),
                received: b.to_string(),
            },
            position,
        )),
    }
}

fn condition(ty: &Type, position: Position) -> Result<(), Error> {
    match ty.ret {
        ValueKind::Bool | ValueKind::Any => Ok(()),
        other => Err(Error::new(
            ErrorImpl::NonBooleanCondition {
                found: other.to_string(),
            },
            position,
        )),
    }
}

fn branches(then: ValueKind, otherwise: ValueKind, position: Position) -> Result<ValueKind, Error> {
    unify(then, otherwise, position).map_err(|_| {
        Error::new(
            ErrorImpl::BranchTypeMismatch {
                then: then.to_string(),
                otherwise: otherwise.to_string(),
            },
            position,
        )
    })
}

pub struct TypeChecker {
    pub root: Env,
}

impl TypeChecker {
    /// Seeds the environment from the evaluated top-level frame.
    pub fn from_frame(frame: &Frame<Value>) -> Self {
        let root = Frame::root();
        for (name, value) in frame.bindings() {
            let slot = match value {
                Value::Func(function) => Slot::Pending(function),
                other => Slot::Known(Type::value(other.kind())),
            };
            root.bind(&name, slot);
        }
        TypeChecker { root }
    }

    fn lookup(&mut self, name: &str, env: &Env, position: Position) -> Result<Type, Error> {
        match env.lookup(name, position)? {
            Slot::Known(ty) => Ok(ty),
            Slot::Pending(function) => self.infer_function(&function, env),
        }
    }

    /// Infers a function's signature once and caches it on the function.
    ///
    /// Parameters are unconstrained. While the body is being inferred the
    /// cache holds a provisional all-`Any` signature so recursion terminates.
    pub fn infer_function(&mut self, function: &Rc<Function>, env: &Env) -> Result<Type, Error> {
        let cached = function.ty.borrow().clone();
        if let Some(ty) = cached {
            return Ok(ty);
        }

        let args = vec![ValueKind::Any; function.arity()];
        // Provisional signature so a recursive call resolves to Any instead of looping.
        *function.ty.borrow_mut() = Some(Type::function(args.clone(), ValueKind::Any));

        let scope = Frame::child(env);
        for param in function.params.iter().flatten() {
            scope.bind(param, Slot::Known(Type::value(ValueKind::Any)));
        }
        let body = self.infer_expr(&function.body, &scope)?;

        let ty = Type::function(args, body.ret);
        *function.ty.borrow_mut() = Some(ty.clone());
        Ok(ty)
    }

    fn infer_call(&mut self, func: &Expr, argc: usize, env: &Env) -> Result<Type, Error> {
        let callee = self.infer_expr(func, env)?;
        match callee.args {
            Some(params) if params.len() == argc => Ok(Type::value(callee.ret)),
            Some(params) => Err(Error::new(
                ErrorImpl::UnexpectedArguments {
                    expected: params.len(),
                    received: argc,
                },
                func.position,
            )),
            None if callee.ret == ValueKind::Any => Ok(Type::value(ValueKind::Any)),
            None => Err(Error::new(
                ErrorImpl::NotCallable {
                    value: callee.to_string(),
                },
                func.position,
            )),
        }
    }

    pub fn infer_expr(&mut self, expr: &Expr, env: &Env) -> Result<Type, Error> {
        let position = expr.position;
        let ty = match &expr.kind {
            ExprKind::Int(_) => Type::value(ValueKind::Int),
            ExprKind::Str(_) | ExprKind::ShellCmd(_) => Type::value(ValueKind::Str),
            ExprKind::Regex(_) => Type::value(ValueKind::Regex),
            ExprKind::AlwaysTrue => Type::value(ValueKind::Bool),
            ExprKind::Return => Type::value(ValueKind::Any),
            ExprKind::Var(name) => self.lookup(name, env, position)?,
            ExprKind::Block(exprs) => {
                let mut ty = Type::value(ValueKind::Array);
                for expr in exprs {
                    ty = self.infer_expr(expr, env)?;
                }
                ty
            }
            // element types are not tracked
            ExprKind::Array(_) => Type::value(ValueKind::Array),
            ExprKind::Print(arg) => self.infer_expr(arg, env)?,
            ExprKind::Assert(arg) => {
                let ty = self.infer_expr(arg, env)?;
                unify(ValueKind::Bool, ty.ret, arg.position)?;
                ty
            }
            ExprKind::Minus(arg) | ExprKind::Plus(arg) => {
                let ty = self.infer_expr(arg, env)?;
                Type::value(unify(ValueKind::Int, ty.ret, arg.position)?)
            }
            ExprKind::Match(arms) => {
                let mut ret = ValueKind::Any;
                for arm in arms {
                    let iff = self.infer_expr(&arm.iff, env)?;
                    condition(&iff, arm.iff.position)?;
                    let then = self.infer_expr(&arm.then, env)?;
                    ret = branches(ret, then.ret, arm.then.position)?;
                }
                Type::value(ret)
            }
            ExprKind::Func(function) => self.infer_function(function, env)?,
            ExprKind::Call { func, args } => {
                for arg in args {
                    self.infer_expr(arg, env)?;
                }
                self.infer_call(func, args.len(), env)?
            }
            ExprKind::Call0(func) => self.infer_call(func, 0, env)?,
            ExprKind::Compose { left, right, .. } => {
                self.infer_expr(left, env)?;
                self.infer_expr(right, env)?;
                Type::value(ValueKind::Any)
            }
            ExprKind::Assign { name, value } => {
                let ty = self.infer_expr(value, env)?;
                env.bind(name, Slot::Known(ty.clone()));
                ty
            }
            ExprKind::Binary { op, left, right } => {
                let l = self.infer_expr(left, env)?;
                let r = self.infer_expr(right, env)?;
                match op {
                    BinaryOp::RegMatch | BinaryOp::Subscript => Type::value(ValueKind::Any),
                    _ => {
                        let kind = unify(l.ret, r.ret, position)?;
                        if op.is_comparison() {
                            Type::value(ValueKind::Bool)
                        } else {
                            Type::value(kind)
                        }
                    }
                }
            }
            ExprKind::IfElse {
                iff,
                then,
                otherwise,
            } => {
                let cond = self.infer_expr(iff, env)?;
                condition(&cond, iff.position)?;
                let then = self.infer_expr(then, env)?;
                let otherwise = self.infer_expr(otherwise, env)?;
                Type::value(branches(then.ret, otherwise.ret, position)?)
            }
        };
        Ok(ty)
    }
}

/// Makes `main` return an integer when inference says it returns something else.
///
/// A replacement function with a literal `0` appended to its body is bound
/// as `main` in `frame`. A `main` whose return cannot be pinned down is left
/// alone.
pub fn fix_main_signature(frame: &Rc<Frame<Value>>, args: &[String]) -> Result<(), Error> {
    let position = Position::null();
    let Value::Func(main) = frame.lookup("main", position)? else {
        return Err(Error::new(
            ErrorImpl::NotCallable {
                value: String::from("main"),
            },
            position,
        ));
    };

    let mut checker = TypeChecker::from_frame(frame);
    let scope = Frame::child(&checker.root);
    scope.bind("argc", Slot::Known(Type::value(ValueKind::Int)));
    scope.bind("argv", Slot::Known(Type::value(ValueKind::Array)));
    debug!(target: "type_checker", "checking main with {} arguments", args.len());

    let ty = checker.infer_function(&main, &scope)?;
    debug!(target: "type_checker", "main : {}", ty);
    if !ty.returns_non_int() {
        return Ok(());
    }

    let zero = Expr::new(ExprKind::Int(0), main.body.position);
    let body = match &main.body.kind {
        ExprKind::Block(exprs) => {
            let mut exprs = exprs.clone();
            exprs.push(zero);
            Expr::new(ExprKind::Block(exprs), main.body.position)
        }
        _ => Expr::new(ExprKind::Block(vec![main.body.clone(), zero]), main.body.position),
    };

    debug!(target: "type_checker", "main returns {}, appending 0", ty.ret);
    let fixed = Function {
        params: main.params.clone(),
        body,
        ty: RefCell::new(Some(Type {
            args: ty.args,
            ret: ValueKind::Int,
        })),
    };
    frame.bind("main", Value::Func(Rc::new(fixed)));
    Ok(())
}
