//! Lowering of the rewritten parse tree into the evaluable tree.
//!
//! Parse nodes only describe shape. Lowering checks that every node appears
//! where it can be evaluated, parses integer literals, compiles regexes and
//! resolves argument lists, so the evaluator never looks at raw syntax.

use std::{fmt::Display, rc::Rc};

use log::trace;
use regex::Regex;

use crate::{
    ast::ast::{LeafKind, Node, NodeKind},
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::value::Function;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Pow,
    Eq,
    Less,
    More,
    RegMatch,
    Subscript,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl BinaryOp {
    fn from_kind(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Add => Some(BinaryOp::Add),
            NodeKind::Sub => Some(BinaryOp::Sub),
            NodeKind::Mul => Some(BinaryOp::Mul),
            NodeKind::Pow => Some(BinaryOp::Pow),
            NodeKind::Eq => Some(BinaryOp::Eq),
            NodeKind::Less => Some(BinaryOp::Less),
            NodeKind::More => Some(BinaryOp::More),
            NodeKind::RegMatch => Some(BinaryOp::RegMatch),
            NodeKind::Subscript => Some(BinaryOp::Subscript),
            _ => None,
        }
    }

    /// Operators whose result is always a boolean.
    pub fn is_comparison(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Less | BinaryOp::More)
    }
}

#[derive(Debug, Clone)]
pub struct Arm {
    pub iff: Expr,
    pub then: Expr,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i64),
    Str(String),
    ShellCmd(String),
    Regex(Regex),
    Var(String),
    AlwaysTrue,
    Return,
    Block(Vec<Expr>),
    Array(Vec<Expr>),
    Print(Box<Expr>),
    Assert(Box<Expr>),
    Minus(Box<Expr>),
    Plus(Box<Expr>),
    Match(Vec<Arm>),
    Func(Rc<Function>),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Call0(Box<Expr>),
    /// `f . x` evaluates `x` first, `f $ x` evaluates `f` first.
    Compose {
        left: Box<Expr>,
        right: Box<Expr>,
        right_to_left: bool,
    },
    Assign {
        name: String,
        value: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    IfElse {
        iff: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub position: Position,
}

impl Expr {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Expr { kind, position }
    }
}

fn join(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(|expr| expr.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Int(value) => write!(f, "Int({})", value),
            ExprKind::Str(value) => write!(f, "Str({:?})", value),
            ExprKind::ShellCmd(value) => write!(f, "ShellCmd({:?})", value),
            ExprKind::Regex(regex) => write!(f, "RegEx(/{}/)", regex.as_str()),
            ExprKind::Var(name) => write!(f, "Var({})", name),
            ExprKind::AlwaysTrue => write!(f, "AlwaysTrue"),
            ExprKind::Return => write!(f, "Return"),
            ExprKind::Block(exprs) => write!(f, "Block({})", join(exprs)),
            ExprKind::Array(exprs) => write!(f, "Array({})", join(exprs)),
            ExprKind::Print(arg) => write!(f, "Print({})", arg),
            ExprKind::Assert(arg) => write!(f, "Assert({})", arg),
            ExprKind::Minus(arg) => write!(f, "Minus({})", arg),
            ExprKind::Plus(arg) => write!(f, "Plus({})", arg),
            ExprKind::Match(arms) => {
                let arms = arms
                    .iter()
                    .map(|arm| format!("{} => {}", arm.iff, arm.then))
                    .collect::<Vec<String>>();
                write!(f, "Match({})", arms.join(", "))
            }
            ExprKind::Func(function) => match &function.params {
                Some(params) => write!(f, "Func([{}], {})", params.join(", "), function.body),
                None => write!(f, "Func0({})", function.body),
            },
            ExprKind::Call { func, args } => write!(f, "Call({}, [{}])", func, join(args)),
            ExprKind::Call0(func) => write!(f, "Call0({})", func),
            ExprKind::Compose {
                left,
                right,
                right_to_left,
            } => {
                let name = if *right_to_left { "ComposeR" } else { "ComposeL" };
                write!(f, "{}({}, {})", name, left, right)
            }
            ExprKind::Assign { name, value } => write!(f, "Assign({}, {})", name, value),
            ExprKind::Binary { op, left, right } => write!(f, "{}({}, {})", op, left, right),
            ExprKind::IfElse {
                iff,
                then,
                otherwise,
            } => write!(f, "IfElse({}, {}, {})", iff, then, otherwise),
        }
    }
}

fn unexpected(node: &Node) -> Error {
    Error::new(
        ErrorImpl::UnexpectedNode {
            node: node.to_string(),
        },
        node.get_position(),
    )
}

fn lower_leaf(kind: LeafKind, value: String, position: Position) -> Result<Expr, Error> {
    let kind = match kind {
        LeafKind::Int => match value.parse::<i64>() {
            Ok(number) => ExprKind::Int(number),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: value },
                    position,
                ))
            }
        },
        LeafKind::Str => ExprKind::Str(value),
        LeafKind::ShellCmd => ExprKind::ShellCmd(value),
        LeafKind::RegEx => match Regex::new(&value) {
            Ok(regex) => ExprKind::Regex(regex),
            Err(err) => {
                return Err(Error::new(
                    ErrorImpl::InvalidRegex {
                        pattern: value,
                        reason: err.to_string(),
                    },
                    position,
                ))
            }
        },
        LeafKind::Id => ExprKind::Var(value),
        LeafKind::AlwaysTrue => ExprKind::AlwaysTrue,
        LeafKind::Return => ExprKind::Return,
    };
    Ok(Expr::new(kind, position))
}

fn lower_boxed(node: Node) -> Result<Box<Expr>, Error> {
    Ok(Box::new(lower(node)?))
}

/// Elements of a list-like node: the children of a comma list, or the node itself.
fn list_elements(node: Node) -> Result<Vec<Expr>, Error> {
    if node.is_kind(NodeKind::Comma) {
        node.into_children().into_iter().map(lower).collect()
    } else {
        Ok(vec![lower(node)?])
    }
}

/// Argument list of `f @ args`.
fn call_arguments(args: Node) -> Result<Vec<Expr>, Error> {
    let is_group = args.is_kind(NodeKind::Brackets)
        || (args.is_kind(NodeKind::Parens)
            && args.children().len() == 1
            && args.children()[0].is_kind(NodeKind::Comma));

    if is_group {
        let inner = args.into_children().remove(0);
        list_elements(inner)
    } else {
        Ok(vec![lower(args)?])
    }
}

fn lower_arm(node: Node) -> Result<Arm, Error> {
    if !node.is_kind(NodeKind::IfThen) {
        return Err(Error::new(ErrorImpl::MisplacedArm, node.get_position()));
    }
    let position = node.get_position();
    let (iff, then) = two(node.into_children(), position)?;
    Ok(Arm {
        iff: lower(iff)?,
        then: lower(then)?,
    })
}

fn lower_params(params: Node) -> Result<Vec<String>, Error> {
    let position = params.get_position();
    if !params.is_kind(NodeKind::Params) {
        return Err(Error::new(
            ErrorImpl::MalformedParameters {
                found: params.to_string(),
            },
            position,
        ));
    }

    params
        .into_children()
        .into_iter()
        .map(|param| match param {
            Node::Leaf {
                kind: LeafKind::Id,
                value,
                ..
            } => Ok(value),
            other => Err(Error::new(
                ErrorImpl::MalformedParameters {
                    found: other.to_string(),
                },
                other.get_position(),
            )),
        })
        .collect()
}

fn two(children: Vec<Node>, position: Position) -> Result<(Node, Node), Error> {
    let mut children = children.into_iter();
    match (children.next(), children.next()) {
        (Some(left), Some(right)) => Ok((left, right)),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedNode {
                node: String::from("incomplete binary node"),
            },
            position,
        )),
    }
}

fn one(children: Vec<Node>, position: Position) -> Result<Node, Error> {
    children.into_iter().next().ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedNode {
                node: String::from("empty unary node"),
            },
            position,
        )
    })
}

/// Lowers a rewritten parse tree into an evaluable tree.
pub fn lower(node: Node) -> Result<Expr, Error> {
    trace!(target: "interpreter.replace", "replacing {}", node);

    let (kind, children, position) = match node {
        Node::Leaf {
            kind,
            value,
            position,
        } => return lower_leaf(kind, value, position),
        Node::Symbol { .. } => return Err(unexpected(&node)),
        Node::Composite {
            kind,
            children,
            position,
        } => (kind, children, position),
    };

    let kind = match kind {
        NodeKind::Block => ExprKind::Block(
            children
                .into_iter()
                .map(lower)
                .collect::<Result<Vec<Expr>, Error>>()?,
        ),
        NodeKind::Parens => return lower(one(children, position)?),
        NodeKind::Brackets => ExprKind::Array(list_elements(one(children, position)?)?),
        NodeKind::Comma => return Err(Error::new(ErrorImpl::CommaOutsideList, position)),
        NodeKind::IfThen => return Err(Error::new(ErrorImpl::MisplacedArm, position)),
        NodeKind::Expr | NodeKind::Params => {
            return Err(Error::new(
                ErrorImpl::UnexpectedNode {
                    node: kind.to_string(),
                },
                position,
            ))
        }
        NodeKind::Print => ExprKind::Print(lower_boxed(one(children, position)?)?),
        NodeKind::Assert => ExprKind::Assert(lower_boxed(one(children, position)?)?),
        NodeKind::Minus => ExprKind::Minus(lower_boxed(one(children, position)?)?),
        NodeKind::Plus => ExprKind::Plus(lower_boxed(one(children, position)?)?),
        NodeKind::Call0 => ExprKind::Call0(lower_boxed(one(children, position)?)?),
        NodeKind::Match => {
            let arms = one(children, position)?;
            let arms = if arms.is_kind(NodeKind::Block) {
                arms.into_children()
            } else {
                vec![arms]
            };
            ExprKind::Match(
                arms.into_iter()
                    .map(lower_arm)
                    .collect::<Result<Vec<Arm>, Error>>()?,
            )
        }
        NodeKind::Lambda0 => {
            let body = lower(one(children, position)?)?;
            ExprKind::Func(Rc::new(Function::new(None, body)))
        }
        NodeKind::Lambda => {
            let (params, body) = two(children, position)?;
            let params = lower_params(params)?;
            let body = lower(body)?;
            ExprKind::Func(Rc::new(Function::new(Some(params), body)))
        }
        NodeKind::Call => {
            let (func, args) = two(children, position)?;
            ExprKind::Call {
                func: lower_boxed(func)?,
                args: call_arguments(args)?,
            }
        }
        NodeKind::ComposeR | NodeKind::ComposeL => {
            let (left, right) = two(children, position)?;
            ExprKind::Compose {
                left: lower_boxed(left)?,
                right: lower_boxed(right)?,
                right_to_left: kind == NodeKind::ComposeR,
            }
        }
        NodeKind::Assign => {
            let (target, value) = two(children, position)?;
            let name = match target {
                Node::Leaf {
                    kind: LeafKind::Id,
                    value,
                    ..
                } => value,
                other => {
                    return Err(Error::new(
                        ErrorImpl::InvalidAssignmentTarget {
                            found: other.to_string(),
                        },
                        other.get_position(),
                    ))
                }
            };
            ExprKind::Assign {
                name,
                value: lower_boxed(value)?,
            }
        }
        NodeKind::IfElse => {
            let mut children = children.into_iter();
            match (children.next(), children.next(), children.next()) {
                (Some(iff), Some(then), Some(otherwise)) => ExprKind::IfElse {
                    iff: lower_boxed(iff)?,
                    then: lower_boxed(then)?,
                    otherwise: lower_boxed(otherwise)?,
                },
                _ => {
                    return Err(Error::new(
                        ErrorImpl::UnexpectedNode {
                            node: kind.to_string(),
                        },
                        position,
                    ))
                }
            }
        }
        NodeKind::Add
        | NodeKind::Sub
        | NodeKind::Mul
        | NodeKind::Pow
        | NodeKind::Eq
        | NodeKind::Less
        | NodeKind::More
        | NodeKind::RegMatch
        | NodeKind::Subscript => {
            let (left, right) = two(children, position)?;
            let op = BinaryOp::from_kind(kind).ok_or_else(|| {
                Error::new(
                    ErrorImpl::UnexpectedNode {
                        node: kind.to_string(),
                    },
                    position,
                )
            })?;
            ExprKind::Binary {
                op,
                left: lower_boxed(left)?,
                right: lower_boxed(right)?,
            }
        }
    };

    Ok(Expr::new(kind, position))
}
