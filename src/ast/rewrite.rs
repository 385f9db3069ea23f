//! Tree transformations applied between block building and evaluation.
//!
//! Every pass is a plain function from node to node. [`rewrite`] applies a
//! pass to the whole tree bottom-up, so a pass always sees children that
//! were already transformed.

use log::debug;

use crate::{
    errors::errors::{Error, ErrorImpl},
    parser::{
        lookups::{OperatorTable, APPLY, OPEN_PAREN},
        parser::parse,
    },
};

use super::ast::{LeafKind, Node, NodeKind};

/// Applies `pass` to every node of `tree`, children first.
pub fn rewrite<F>(tree: Node, pass: &F) -> Result<Node, Error>
where
    F: Fn(Node) -> Result<Node, Error>,
{
    let tree = match tree {
        Node::Composite {
            kind,
            children,
            position,
        } => {
            let children = children
                .into_iter()
                .map(|child| rewrite(child, pass))
                .collect::<Result<Vec<Node>, Error>>()?;
            Node::Composite {
                kind,
                children,
                position,
            }
        }
        other => other,
    };
    pass(tree)
}

/// Inserts an explicit `@` between an identifier and a directly following
/// integer, identifier or opening parenthesis, so `f g 1` reads `f @ g @ 1`.
pub fn implicit_calls(expr: Node) -> Result<Node, Error> {
    if !expr.is_kind(NodeKind::Expr) || expr.children().len() < 2 {
        return Ok(expr);
    }

    let position = expr.get_position();
    let mut result: Vec<Node> = vec![];
    for next in expr.into_children() {
        let applies = matches!(result.last(), Some(prev) if prev.is_leaf(LeafKind::Id))
            && (next.is_leaf(LeafKind::Int)
                || next.is_leaf(LeafKind::Id)
                || next.is_symbol(OPEN_PAREN));
        if applies {
            result.push(Node::symbol(APPLY, next.get_position()));
        }
        result.push(next);
    }

    Node::composite(NodeKind::Expr, result, position)
}

/// Resolves operator precedence inside every flat expression.
pub fn precedence(node: Node, table: &OperatorTable) -> Result<Node, Error> {
    if !node.is_kind(NodeKind::Expr) {
        return Ok(node);
    }
    parse(node.into_children(), table)
}

/// Normalizes lambda parameters to a `Params` list of identifiers.
pub fn func_args(func: Node) -> Result<Node, Error> {
    if !func.is_kind(NodeKind::Lambda) {
        return Ok(func);
    }

    let position = func.get_position();
    let mut children = func.into_children().into_iter();
    let (Some(args), Some(body)) = (children.next(), children.next()) else {
        return Err(Error::new(
            ErrorImpl::FieldCountMismatch {
                node: NodeKind::Lambda.to_string(),
                expected: 2,
                received: 0,
            },
            position,
        ));
    };

    let params = params_of(args)?;
    Node::composite(NodeKind::Lambda, vec![params, body], position)
}

fn params_of(args: Node) -> Result<Node, Error> {
    let position = args.get_position();

    // `(a, b) -> ...` and `(a) -> ...`
    let args = if args.is_kind(NodeKind::Parens) && args.children().len() == 1 {
        args.into_children().remove(0)
    } else {
        args
    };

    let names = if args.is_kind(NodeKind::Params) {
        return Ok(args);
    } else if args.is_leaf(LeafKind::Id) {
        vec![args]
    } else if args.is_kind(NodeKind::Comma)
        && args.children().iter().all(|a| a.is_leaf(LeafKind::Id))
    {
        args.into_children()
    } else {
        return Err(Error::new(
            ErrorImpl::MalformedParameters {
                found: args.to_string(),
            },
            position,
        ));
    };

    Node::composite(NodeKind::Params, names, position)
}

/// Wraps a comma list passed to `@` so the call sees an argument list.
pub fn call_args(call: Node) -> Result<Node, Error> {
    if !call.is_kind(NodeKind::Call)
        || !call
            .field("right")
            .map(|right| right.is_kind(NodeKind::Comma))
            .unwrap_or(false)
    {
        return Ok(call);
    }

    let position = call.get_position();
    let mut children = call.into_children();
    let right = children.remove(1);
    let left = children.remove(0);
    let args_position = right.get_position();
    let args = Node::composite(NodeKind::Brackets, vec![right], args_position)?;
    Node::composite(NodeKind::Call, vec![left, args], position)
}

/// Runs every pass in order over the block tree.
pub fn rewrite_pipeline(tree: Node, table: &OperatorTable) -> Result<Node, Error> {
    debug!(target: "ast.rewrite", "applying func_args");
    let tree = rewrite(tree, &func_args)?;
    debug!(target: "ast.rewrite", "applying implicit_calls");
    let tree = rewrite(tree, &implicit_calls)?;
    debug!(target: "ast.rewrite", "applying precedence");
    let tree = rewrite(tree, &|node| precedence(node, table))?;
    // again, for the lambdas precedence has just built
    debug!(target: "ast.rewrite", "applying func_args");
    let tree = rewrite(tree, &func_args)?;
    debug!(target: "ast.rewrite", "applying call_args");
    rewrite(tree, &call_args)
}
