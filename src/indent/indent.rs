use log::{debug, trace};

use crate::{
    ast::ast::{Node, NodeKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    parser::lookups::{ARM_ARROW, LAMBDA_ARROW},
    Position,
};

fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

/// Opens a block right after `->` and `=>` when the following line is
/// indented deeper than the arrow's own line.
pub fn implicit_dents(tokens: Vec<Token>) -> Vec<Token> {
    let mut result = Vec::with_capacity(tokens.len());
    let mut current = 0;

    for (i, token) in tokens.iter().enumerate() {
        result.push(token.clone());

        if let Some(depth) = token.depth() {
            current = depth;
        } else if token.is_symbol(LAMBDA_ARROW) || token.is_symbol(ARM_ARROW) {
            let next_dent = tokens[i + 1..].iter().find(|t| t.depth().is_some());
            if let Some(next_dent) = next_dent {
                let depth = next_dent.depth().unwrap_or(0);
                if depth > current {
                    let mut dent = next_dent.clone();
                    dent.span = token.span;
                    result.push(dent);
                    current = depth;
                }
            }
        }
    }

    result
}

/// Collapses runs of dent markers, keeping the last one of each run.
pub fn merge_dents(tokens: Vec<Token>) -> Vec<Token> {
    let mut result: Vec<Token> = Vec::with_capacity(tokens.len());

    for token in tokens {
        let previous_is_dent = result.last().map(|t| t.depth().is_some()).unwrap_or(false);
        if previous_is_dent && token.depth().is_some() {
            result.pop();
        }
        result.push(token);
    }

    result
}

/// Accumulates the expressions of one block.
struct BlockBuilder {
    exprs: Vec<Vec<Node>>,
}

impl BlockBuilder {
    fn new() -> Self {
        BlockBuilder { exprs: vec![vec![]] }
    }

    fn current(&mut self) -> &mut Vec<Node> {
        if self.exprs.is_empty() {
            self.exprs.push(vec![]);
        }
        let last = self.exprs.len() - 1;
        &mut self.exprs[last]
    }

    fn current_is_empty(&self) -> bool {
        self.exprs.last().map(|e| e.is_empty()).unwrap_or(true)
    }

    fn new_expr(&mut self) {
        self.exprs.push(vec![]);
    }

    /// Wraps every non-empty expression and the block itself.
    fn finish(self) -> Result<Node, Error> {
        let mut children = vec![];
        for expr in self.exprs.into_iter().filter(|e| !e.is_empty()) {
            let position = expr[0].get_position();
            children.push(Node::composite(NodeKind::Expr, expr, position)?);
        }
        let position = children
            .first()
            .map(Node::get_position)
            .unwrap_or_else(Position::null);
        Node::composite(NodeKind::Block, children, position)
    }
}

/// Builds one block at indentation `lvl`.
///
/// Returns the block and the depth that ended it, `None` once the input is
/// exhausted.
fn blocks<I>(tokens: &mut I, lvl: usize) -> Result<(Node, Option<usize>), Error>
where
    I: Iterator<Item = Token>,
{
    let mut builder = BlockBuilder::new();
    let prefix = format!("{}{}", lvl, " ".repeat(lvl.saturating_sub(1)));

    while let Some(token) = tokens.next() {
        trace!(target: "indent", "{} considering {}", prefix, token);

        let Some(depth) = token.depth() else {
            if let Some(node) = Node::from_token(token) {
                builder.current().push(node);
            }
            continue;
        };

        if depth == lvl {
            if !builder.current_is_empty() {
                trace!(target: "indent", "{} got newline, starting new expr", prefix);
                builder.new_expr();
            }
        } else if depth > lvl {
            trace!(target: "indent", "{} >>> calling nested block", prefix);
            let (nested, ended_at) = blocks(tokens, depth)?;
            trace!(target: "indent", "{} <<< got {} ending at {:?}", prefix, nested, ended_at);
            builder.current().push(nested);

            // The nested block stops at the first shallower dent, which may
            // also close this block or land between two open levels.
            match ended_at {
                None => break,
                Some(d) if d == lvl => builder.new_expr(),
                Some(d) if d < lvl => return Ok((builder.finish()?, Some(d))),
                Some(d) => {
                    return Err(Error::new(
                        ErrorImpl::InconsistentDedent { depth: d },
                        token.span.start,
                    ))
                }
            }
        } else {
            trace!(target: "indent", "{} <== {} < {}: time to return", prefix, depth, lvl);
            return Ok((builder.finish()?, Some(depth)));
        }
    }

    Ok((builder.finish()?, None))
}

/// Turns the flat token stream into nested `Block[Expr[...]]` nodes.
///
/// Comments are discarded here; every other token becomes a leaf or an
/// unresolved symbol inside the expression for its line.
pub fn build_blocks(tokens: Vec<Token>) -> Result<Node, Error> {
    let tokens = tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .collect::<Vec<Token>>();

    let tokens = implicit_dents(tokens);
    debug!(target: "indent.imp_dents", "after adding implicit dents:\n{}", render(&tokens));

    let tokens = merge_dents(tokens);
    debug!(target: "indent.merge_dents", "merging dents:\n{}", render(&tokens));

    let mut iter = tokens.into_iter();
    let (tree, _) = blocks(&mut iter, 0)?;
    debug!(target: "indent.blocks", "after block parser:\n{}", tree);
    Ok(tree)
}
