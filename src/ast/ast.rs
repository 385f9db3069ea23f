use std::fmt::{Debug, Display};

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position,
};

/// Leaf Kinds
///
/// Nodes that hold a single scalar value and no children.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum LeafKind {
    Int,
    Str,
    ShellCmd,
    RegEx,
    Id,
    /// `_`, the always-true fallback condition.
    AlwaysTrue,
    /// `return`, a reserved keyword.
    Return,
}

/// Composite Kinds
///
/// Nodes that own an ordered list of children. Fielded kinds have a fixed
/// arity and expose their children by name; the rest are plain sequences.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum NodeKind {
    // sequences
    Block,
    Expr,
    Parens,
    Comma,
    Params,

    // unary
    Print,
    Assert,
    Minus,
    Plus,
    Match,
    Lambda0,
    Call0,
    Brackets,

    // binary
    ComposeR,
    ComposeL,
    Lambda,
    IfThen,
    Assign,
    Call,
    Eq,
    RegMatch,
    Less,
    More,
    Add,
    Sub,
    Mul,
    Pow,
    Subscript,

    // ternary
    IfElse,
}

const UNARY_FIELDS: &[&str] = &["arg"];
const BINARY_FIELDS: &[&str] = &["left", "right"];
const BODY_FIELDS: &[&str] = &["body"];
const LAMBDA_FIELDS: &[&str] = &["args", "body"];
const IF_THEN_FIELDS: &[&str] = &["iff", "then"];
const IF_ELSE_FIELDS: &[&str] = &["iff", "then", "otherwise"];

impl NodeKind {
    /// Field names by offset, `None` for plain sequences.
    pub fn fields(&self) -> Option<&'static [&'static str]> {
        match self {
            NodeKind::Block
            | NodeKind::Expr
            | NodeKind::Parens
            | NodeKind::Comma
            | NodeKind::Params => None,
            NodeKind::Lambda0 => Some(BODY_FIELDS),
            NodeKind::Print
            | NodeKind::Assert
            | NodeKind::Minus
            | NodeKind::Plus
            | NodeKind::Match
            | NodeKind::Call0
            | NodeKind::Brackets => Some(UNARY_FIELDS),
            NodeKind::Lambda => Some(LAMBDA_FIELDS),
            NodeKind::IfThen => Some(IF_THEN_FIELDS),
            NodeKind::IfElse => Some(IF_ELSE_FIELDS),
            NodeKind::ComposeR
            | NodeKind::ComposeL
            | NodeKind::Assign
            | NodeKind::Call
            | NodeKind::Eq
            | NodeKind::RegMatch
            | NodeKind::Less
            | NodeKind::More
            | NodeKind::Add
            | NodeKind::Sub
            | NodeKind::Mul
            | NodeKind::Pow
            | NodeKind::Subscript => Some(BINARY_FIELDS),
        }
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields()?.iter().position(|field| *field == name)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Parse tree node.
#[derive(Clone, PartialEq)]
pub enum Node {
    Leaf {
        kind: LeafKind,
        value: String,
        position: Position,
    },
    /// An operator spelling that precedence resolution has not consumed yet.
    Symbol { spelling: String, position: Position },
    Composite {
        kind: NodeKind,
        children: Vec<Node>,
        position: Position,
    },
}

impl Node {
    pub fn leaf(kind: LeafKind, value: impl Into<String>, position: Position) -> Self {
        Node::Leaf {
            kind,
            value: value.into(),
            position,
        }
    }

    pub fn symbol(spelling: impl Into<String>, position: Position) -> Self {
        Node::Symbol {
            spelling: spelling.into(),
            position,
        }
    }

    /// Builds a composite node; fielded kinds must get exactly one child per field.
    pub fn composite(kind: NodeKind, children: Vec<Node>, position: Position) -> Result<Self, Error> {
        if let Some(fields) = kind.fields() {
            if fields.len() != children.len() {
                return Err(Error::new(
                    ErrorImpl::FieldCountMismatch {
                        node: kind.to_string(),
                        expected: fields.len(),
                        received: children.len(),
                    },
                    position,
                ));
            }
        }
        Ok(Node::Composite {
            kind,
            children,
            position,
        })
    }

    /// Converts a content token. Dent markers and comments have no node form.
    pub fn from_token(token: Token) -> Option<Self> {
        let position = token.span.start;
        let kind = match token.kind {
            TokenKind::Identifier => LeafKind::Id,
            TokenKind::Integer => LeafKind::Int,
            TokenKind::String => LeafKind::Str,
            TokenKind::ShellCommand => LeafKind::ShellCmd,
            TokenKind::Regex => LeafKind::RegEx,
            TokenKind::Symbol => return Some(Node::symbol(token.value, position)),
            TokenKind::Dent(_) | TokenKind::Comment => return None,
        };
        Some(Node::leaf(kind, token.value, position))
    }

    pub fn get_position(&self) -> Position {
        match self {
            Node::Leaf { position, .. }
            | Node::Symbol { position, .. }
            | Node::Composite { position, .. } => *position,
        }
    }

    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            Node::Composite { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_kind(&self, expected: NodeKind) -> bool {
        self.kind() == Some(expected)
    }

    pub fn is_leaf(&self, expected: LeafKind) -> bool {
        matches!(self, Node::Leaf { kind, .. } if *kind == expected)
    }

    pub fn is_symbol(&self, expected: &str) -> bool {
        matches!(self, Node::Symbol { spelling, .. } if spelling == expected)
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Composite { children, .. } => children,
            _ => &[],
        }
    }

    /// Named child access for fielded composites.
    pub fn field(&self, name: &str) -> Option<&Node> {
        let index = self.kind()?.field_index(name)?;
        self.children().get(index)
    }

    /// Consumes the node and returns its children, leaves yield nothing.
    pub fn into_children(self) -> Vec<Node> {
        match self {
            Node::Composite { children, .. } => children,
            _ => vec![],
        }
    }

    pub fn pretty_print(&self) -> String {
        let mut result = String::new();
        self.pretty_print_into(&mut result, 0);
        result
    }

    fn pretty_print_into(&self, result: &mut String, lvl: usize) {
        let prefix = " ".repeat(lvl);
        match self {
            Node::Composite { kind, children, .. } => {
                result.push_str(&format!("{}{}\n", prefix, kind));
                for child in children {
                    child.pretty_print_into(result, lvl + 1);
                }
            }
            other => result.push_str(&format!("{}{}\n", prefix, other)),
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Leaf { kind, value, .. } => write!(f, "{:?}({})", kind, value),
            Node::Symbol { spelling, .. } => write!(f, "Sym('{}')", spelling),
            Node::Composite { kind, children, .. } => {
                let args = match kind.fields() {
                    Some(fields) => fields
                        .iter()
                        .zip(children)
                        .map(|(name, child)| format!("{}={}", name, child))
                        .collect::<Vec<String>>(),
                    None => children.iter().map(|child| child.to_string()).collect(),
                };
                write!(f, "{}({})", kind, args.join(", "))
            }
        }
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
