use std::fmt::Display;

use crate::Span;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    /// Indentation marker carrying the number of leading whitespace characters.
    Dent(usize),
    Identifier,
    Integer,
    String,
    ShellCommand,
    Regex,
    Comment,
    /// A registered operator spelling, looked up in the operator table.
    Symbol,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Dent(depth) => write!(f, "DENT:{}", depth),
            _ => write!(f, "{:?}", self),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Dent(_) => write!(f, "{}", self.kind),
            _ => write!(f, "{}({:?})", self.kind, self.value),
        }
    }
}

impl Token {
    /// The indentation depth if this is a dent marker.
    pub fn depth(&self) -> Option<usize> {
        match self.kind {
            TokenKind::Dent(depth) => Some(depth),
            _ => None,
        }
    }

    pub fn is_symbol(&self, spelling: &str) -> bool {
        self.kind == TokenKind::Symbol && self.value == spelling
    }
}
