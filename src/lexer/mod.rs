//! Line-oriented tokenizer.
//!
//! Every non-blank line starts with a dent marker carrying its indentation,
//! followed by the literals, operator spellings and identifiers on it.
//! Operator spellings come from the operator table, so the lexer and the
//! parser always agree on what a symbol is.

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
