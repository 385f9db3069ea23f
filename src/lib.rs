#![allow(clippy::module_inception)]

use std::{fmt::Display, io::Write};

use log::debug;

use crate::{
    ast::{ast::Node, rewrite::rewrite_pipeline},
    errors::errors::{Error, ErrorTip},
    indent::indent::build_blocks,
    lexer::lexer::tokenize,
    parser::lookups::{create_operator_table, OperatorTable},
};

pub mod ast;
pub mod errors;
pub mod indent;
pub mod interpreter;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A 1-based line/column location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    pub fn null() -> Self {
        Position { line: 0, column: 0 }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Settings the caller chooses for one run of a program.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Run type inference before evaluating `main`.
    pub check_types: bool,
    /// Bound as `argv` (and its length as `argc`) when `main` runs.
    pub args: Vec<String>,
}

/// Tokenizes, structures and rewrites `source` into the final parse tree.
pub fn parse_program(source: &str, table: &OperatorTable) -> Result<Node, Error> {
    let tokens = tokenize(source, table)?;
    let blocks = build_blocks(tokens)?;
    let ast = rewrite_pipeline(blocks, table)?;
    debug!(target: "ast", "after rewrites:\n{}", ast.pretty_print());
    Ok(ast)
}

/// Runs a whole program and returns its exit status.
///
/// Anything `p` prints goes to `out`.
pub fn run(source: &str, options: &Options, out: &mut dyn Write) -> Result<i32, Error> {
    let table = create_operator_table();
    let ast = parse_program(source, &table)?;
    interpreter::interpreter::run(ast, &options.args, options.check_types, out)
}

/// Returns the 1-based line `line` of `source`, or an empty string.
pub fn get_line(source: &str, line: usize) -> &str {
    if line == 0 {
        return "";
    }
    source.lines().nth(line - 1).unwrap_or("")
}

pub fn display_error(error: &Error, source: &str, file: &str) -> String {
    /*
        Error: name (tip)
        -> final.dent:2:5
          |
        2 | p ?
          | --^
    */

    let position = error.get_position();
    let line_text = get_line(source, position.line);

    let line_str = position.line.to_string();
    let padding = line_str.len() + 2;

    let mut report = String::new();
    if let ErrorTip::None = error.get_tip() {
        report.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        report.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    report.push_str(&format!("-> {}:{}\n", file, position));
    report.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    report.push_str(&format!("{} | {}\n", line_str, line_text_removed.trim_end()));

    let arrows = position
        .column
        .saturating_sub(removed_whitespace)
        .max(1);

    report.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    report
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| c.is_whitespace()).count();
    (string.chars().skip(start).collect(), start)
}
