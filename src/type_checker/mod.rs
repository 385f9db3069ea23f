//! Best-effort type inference.
//!
//! Inference runs over the lowered tree before `main` is called. It works
//! on kind tags only:
//!
//! - operands of arithmetic and comparison operators must share a tag
//! - conditions must be boolean and both branches must agree
//! - functions get one unconstrained tag per parameter and their body's tag
//!
//! Arrays, subscripts, regex matches and composition are not checked. The
//! one visible effect besides errors is that a `main` returning a non-integer
//! is rewritten to return `0`.

pub mod type_checker;

#[cfg(test)]
mod tests;
