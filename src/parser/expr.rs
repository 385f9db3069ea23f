use crate::{
    ast::ast::{Node, NodeKind},
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    lookups::{BindingPower, Led, Nud},
    parser::Parser,
};

pub fn parse_expr(parser: &mut Parser, rbp: BindingPower) -> Result<Node, Error> {
    // First parse NUD
    let token = parser.advance()?;
    let mut left = parse_nud(parser, token)?;

    // While the upcoming symbol binds tighter than rbp, keep extending lhs
    while parser.peek_lbp() > rbp {
        let token = parser.advance()?;
        left = parse_led(parser, token, left)?;
    }

    Ok(left)
}

fn parse_nud(parser: &mut Parser, token: Node) -> Result<Node, Error> {
    let (spelling, position) = match token {
        Node::Symbol { spelling, position } => (spelling, position),
        // leaves and already built subtrees stand for themselves
        other => return Ok(other),
    };

    let nud = parser.get_table().get(&spelling).and_then(|operator| operator.nud);
    match nud {
        Some(Nud::Prefix { kind, rbp }) => {
            let arg = parse_expr(parser, rbp)?;
            Node::composite(kind, vec![arg], position)
        }
        Some(Nud::Brackets { kind, close }) => parse_brackets(parser, kind, close, position),
        Some(Nud::Nullary(kind)) => Ok(Node::leaf(kind, spelling, position)),
        None => Err(Error::new(
            ErrorImpl::UnexpectedSymbol {
                symbol: spelling,
            },
            position,
        )),
    }
}

fn parse_brackets(
    parser: &mut Parser,
    kind: NodeKind,
    close: &str,
    position: Position,
) -> Result<Node, Error> {
    let inner = parse_expr(parser, 0)?;
    parser.expect(close)?;
    Node::composite(kind, vec![inner], position)
}

fn parse_led(parser: &mut Parser, token: Node, left: Node) -> Result<Node, Error> {
    let (spelling, position) = match token {
        Node::Symbol { spelling, position } => (spelling, position),
        other => {
            return Err(Error::new(
                ErrorImpl::UnexpectedNode {
                    node: other.to_string(),
                },
                other.get_position(),
            ))
        }
    };

    let led = parser.get_table().get(&spelling).and_then(|operator| operator.led);
    let Some(led) = led else {
        return Err(Error::new(
            ErrorImpl::UnexpectedSymbol {
                symbol: spelling,
            },
            position,
        ));
    };

    match led {
        Led::Infix { kind, bp } => {
            let right = parse_expr(parser, bp)?;
            Node::composite(kind, vec![left, right], position)
        }
        Led::InfixRight { kind, bp } => {
            let right = parse_expr(parser, bp - 1)?;
            Node::composite(kind, vec![left, right], position)
        }
        Led::Postfix { kind } => Node::composite(kind, vec![left], position),
        Led::List { kind, bp } => {
            let right = parse_expr(parser, bp)?;
            // `a, b, c` is one List of three, not List(List(a, b), c)
            let mut children = if left.is_kind(kind) {
                left.into_children()
            } else {
                vec![left]
            };
            children.push(right);
            Node::composite(kind, children, position)
        }
        Led::Subscript { kind, close } => {
            let index = parse_expr(parser, 0)?;
            parser.expect(close)?;
            Node::composite(kind, vec![left, index], position)
        }
        Led::IfElse { kind, separator } => {
            let iff = parse_expr(parser, 0)?;
            parser.expect(separator)?;
            let otherwise = parse_expr(parser, 0)?;
            Node::composite(kind, vec![iff, left, otherwise], position)
        }
    }
}
