//! Parser state for precedence resolution of a single flat expression.
//!
//! The block builder hands over each line as a flat sequence of leaves,
//! nested blocks and unresolved [`Node::Symbol`]s. The parser walks that
//! sequence with the operator table and folds it into one tree.

use log::trace;

use crate::{
    ast::ast::Node,
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    expr::parse_expr,
    lookups::{BindingPower, OperatorTable, END_BINDING_POWER},
};

pub struct Parser<'t> {
    nodes: Vec<Node>,
    pos: usize,
    table: &'t OperatorTable,
    /// Position of the last consumed node, used for end-of-input errors.
    last_position: Position,
}

impl<'t> Parser<'t> {
    pub fn new(nodes: Vec<Node>, table: &'t OperatorTable) -> Self {
        let last_position = nodes
            .first()
            .map(Node::get_position)
            .unwrap_or_else(Position::null);
        Parser {
            nodes,
            pos: 0,
            table,
            last_position,
        }
    }

    pub fn get_table(&self) -> &'t OperatorTable {
        self.table
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.nodes.get(self.pos)
    }

    /// Consumes the current node, failing with `UnexpectedEnd` past the last one.
    pub fn advance(&mut self) -> Result<Node, Error> {
        let Some(node) = self.nodes.get_mut(self.pos) else {
            return Err(Error::new(ErrorImpl::UnexpectedEnd, self.last_position));
        };
        // leave a cheap placeholder behind, nodes are never revisited
        let node = std::mem::replace(node, Node::symbol("", Position::null()));
        self.pos += 1;
        self.last_position = node.get_position();
        Ok(node)
    }

    /// Consumes the closing symbol `spelling` or reports what was found instead.
    pub fn expect(&mut self, spelling: &str) -> Result<Node, Error> {
        let (found, position) = match self.current_node() {
            Some(node) if node.is_symbol(spelling) => return self.advance(),
            Some(node) => (node.to_string(), node.get_position()),
            None => (String::from("end of expression"), self.last_position),
        };
        Err(Error::new(
            ErrorImpl::MissingClosingSymbol {
                expected: spelling.to_string(),
                found,
            },
            position,
        ))
    }

    /// Left binding power of the upcoming node. Only symbols can continue an
    /// expression, anything else stops the led loop.
    pub fn peek_lbp(&self) -> BindingPower {
        match self.current_node() {
            Some(Node::Symbol { spelling, .. }) => self.table.lbp(spelling),
            _ => END_BINDING_POWER,
        }
    }
}

/// Resolves a flat node sequence into a single tree.
pub fn parse(nodes: Vec<Node>, table: &OperatorTable) -> Result<Node, Error> {
    if table.is_empty() {
        return Err(Error::new(ErrorImpl::EmptyOperatorTable, Position::null()));
    }

    let mut parser = Parser::new(nodes, table);
    let tree = parse_expr(&mut parser, END_BINDING_POWER)?;

    if let Some(leftover) = parser.current_node() {
        return Err(Error::new(
            ErrorImpl::LeftoverTokens {
                token: leftover.to_string(),
            },
            leftover.get_position(),
        ));
    }

    trace!(target: "parser", "resolved {}", tree);
    Ok(tree)
}
