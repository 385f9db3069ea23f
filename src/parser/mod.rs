//! Precedence resolution for flat expressions.
//!
//! This module turns the flat node sequences produced by the block builder
//! into operator trees. It uses a Pratt parser driven by an explicit
//! [`lookups::OperatorTable`]:
//!
//! - NUD (null denotation) entries say how a symbol starts an expression
//! - LED (left denotation) entries say how a symbol extends one
//! - binding powers decide which operator claims an operand
//!
//! The same table also feeds the lexer, so every registered spelling is
//! tokenized as a symbol.

pub mod expr;
pub mod lookups;
pub mod parser;
