//! Tree-walking evaluation.
//!
//! - lower: turns the rewritten parse tree into evaluable expressions
//! - frame: the scope chain shared with type inference
//! - value: runtime values and function objects
//! - interpreter: the evaluator and the program entry point

pub mod frame;
pub mod interpreter;
pub mod lower;
pub mod value;

#[cfg(test)]
mod tests;
