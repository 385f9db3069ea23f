//! Error types and error handling for the interpreter.
//!
//! This module defines the error types used throughout the pipeline.
//! It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for every phase, from lexing to evaluation
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions

pub mod errors;
