use std::{cell::RefCell, fmt::Display, rc::Rc};

use regex::Regex;

use crate::type_checker::type_checker::Type;

use super::lower::Expr;

/// Runtime kind tags, shared with type inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Str,
    Bool,
    Regex,
    Array,
    Func,
    /// Produced by inference only, for anything it cannot pin down.
    Any,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A function value: its parameter names and body, nothing else.
///
/// Functions do not capture their defining scope; the body runs in a child
/// of whatever frame the call happens in. `params` is `None` for the
/// zero-argument form `-> body`.
#[derive(Debug)]
pub struct Function {
    pub params: Option<Vec<String>>,
    pub body: Expr,
    /// Inferred signature, filled in on first inference.
    pub ty: RefCell<Option<Type>>,
}

impl Function {
    pub fn new(params: Option<Vec<String>>, body: Expr) -> Self {
        Function {
            params,
            body,
            ty: RefCell::new(None),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.as_ref().map(Vec::len).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    Regex(Regex),
    Array(Rc<Vec<Value>>),
    Func(Rc<Function>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Str(_) => ValueKind::Str,
            Value::Bool(_) => ValueKind::Bool,
            Value::Regex(_) => ValueKind::Regex,
            Value::Array(_) => ValueKind::Array,
            Value::Func(_) => ValueKind::Func,
        }
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(Rc::new(values))
    }

    /// Equality for the kinds that support `==`, `None` for the rest.
    pub fn equals(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a == b),
            (Value::Str(a), Value::Str(b)) => Some(a == b),
            (Value::Bool(a), Value::Bool(b)) => Some(a == b),
            (Value::Regex(a), Value::Regex(b)) => Some(a.as_str() == b.as_str()),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "{}", value),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Regex(regex) => write!(f, "/{}/", regex.as_str()),
            Value::Array(values) => {
                let values = values
                    .iter()
                    .map(|value| value.to_string())
                    .collect::<Vec<String>>();
                write!(f, "[{}]", values.join(", "))
            }
            Value::Func(function) => write!(f, "<function/{}>", function.arity()),
        }
    }
}
