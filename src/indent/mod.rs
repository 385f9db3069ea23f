//! Indentation-driven block structure.
//!
//! The lexer emits one dent marker per line. This module adds the implicit
//! dents after arrows, merges consecutive markers and folds the stream into
//! nested `Block[Expr[...]]` nodes for the rewrite pipeline.

pub mod indent;
