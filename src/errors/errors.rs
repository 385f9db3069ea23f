use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedInput { .. } => "UnrecognisedInput",
            ErrorImpl::UnsupportedFloat { .. } => "UnsupportedFloat",
            ErrorImpl::EmptyOperatorTable => "EmptyOperatorTable",
            ErrorImpl::UnexpectedSymbol { .. } => "UnexpectedSymbol",
            ErrorImpl::UnexpectedEnd => "UnexpectedEnd",
            ErrorImpl::MissingClosingSymbol { .. } => "MissingClosingSymbol",
            ErrorImpl::LeftoverTokens { .. } => "LeftoverTokens",
            ErrorImpl::InconsistentDedent { .. } => "InconsistentDedent",
            ErrorImpl::FieldCountMismatch { .. } => "FieldCountMismatch",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnexpectedNode { .. } => "UnexpectedNode",
            ErrorImpl::MalformedParameters { .. } => "MalformedParameters",
            ErrorImpl::InvalidAssignmentTarget { .. } => "InvalidAssignmentTarget",
            ErrorImpl::MisplacedArm => "MisplacedArm",
            ErrorImpl::CommaOutsideList => "CommaOutsideList",
            ErrorImpl::InvalidRegex { .. } => "InvalidRegex",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::NonBooleanCondition { .. } => "NonBooleanCondition",
            ErrorImpl::BranchTypeMismatch { .. } => "BranchTypeMismatch",
            ErrorImpl::UnsupportedOperation { .. } => "UnsupportedOperation",
            ErrorImpl::IntegerOverflow { .. } => "IntegerOverflow",
            ErrorImpl::IndexOutOfRange { .. } => "IndexOutOfRange",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::AssertionFailed { .. } => "AssertionFailed",
            ErrorImpl::NoMatchingArm => "NoMatchingArm",
            ErrorImpl::UnhandledReturn => "UnhandledReturn",
            ErrorImpl::ShellCommandFailed { .. } => "ShellCommandFailed",
            ErrorImpl::Io { .. } => "Io",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedInput { .. } => ErrorTip::None,
            ErrorImpl::UnsupportedFloat { literal } => ErrorTip::Suggestion(format!(
                "Float literal `{}` is not supported, only integers are",
                literal
            )),
            ErrorImpl::EmptyOperatorTable => ErrorTip::Suggestion(String::from(
                "Register at least one operator before parsing",
            )),
            ErrorImpl::UnexpectedSymbol { symbol } => ErrorTip::Suggestion(format!(
                "`{}` cannot start an expression",
                symbol
            )),
            ErrorImpl::UnexpectedEnd => ErrorTip::Suggestion(String::from(
                "Expression ended while an operand was still expected",
            )),
            ErrorImpl::MissingClosingSymbol { expected, found } => ErrorTip::Suggestion(format!(
                "Expected `{}`, found `{}`",
                expected, found
            )),
            ErrorImpl::LeftoverTokens { token } => ErrorTip::Suggestion(format!(
                "Not all tokens were parsed, stopped at `{}`: either there is a grammar error or a problem with operators",
                token
            )),
            ErrorImpl::InconsistentDedent { depth } => ErrorTip::Suggestion(format!(
                "Indentation of {} does not match any enclosing block",
                depth
            )),
            ErrorImpl::FieldCountMismatch { node, expected, received } => {
                ErrorTip::Suggestion(format!(
                    "`{}` takes {} children, received {}",
                    node, expected, received
                ))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnexpectedNode { node } => {
                ErrorTip::Suggestion(format!("`{}` cannot be evaluated here", node))
            }
            ErrorImpl::MalformedParameters { .. } => ErrorTip::Suggestion(String::from(
                "Parameters must be a single name or a comma-separated group of names",
            )),
            ErrorImpl::InvalidAssignmentTarget { found } => {
                ErrorTip::Suggestion(format!("Can only assign to a name, found `{}`", found))
            }
            ErrorImpl::MisplacedArm => ErrorTip::Suggestion(String::from(
                "`cond => value` arms are only allowed directly inside `match`",
            )),
            ErrorImpl::CommaOutsideList => ErrorTip::Suggestion(String::from(
                "Comma lists are only allowed in call arguments, parameters and arrays",
            )),
            ErrorImpl::InvalidRegex { pattern, .. } => {
                ErrorTip::Suggestion(format!("Check the regex `/{}/`", pattern))
            }
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Left and right operands should have the same type, got `{}` and `{}`",
                expected, received
            )),
            ErrorImpl::NonBooleanCondition { found } => {
                ErrorTip::Suggestion(format!("Expected a boolean, found `{}`", found))
            }
            ErrorImpl::BranchTypeMismatch { then, otherwise } => ErrorTip::Suggestion(format!(
                "Both branches should have the same type, got `{}` and `{}`",
                then, otherwise
            )),
            ErrorImpl::UnsupportedOperation { operation, operand } => {
                ErrorTip::Suggestion(format!("`{}` does not support {}", operand, operation))
            }
            ErrorImpl::IntegerOverflow { operation } => {
                ErrorTip::Suggestion(format!("{} overflowed", operation))
            }
            ErrorImpl::IndexOutOfRange { index, length } => ErrorTip::Suggestion(format!(
                "Index {} is out of range for an array of length {}",
                index, length
            )),
            ErrorImpl::NotCallable { value } => {
                ErrorTip::Suggestion(format!("`{}` is not a function", value))
            }
            ErrorImpl::UnexpectedArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::AssertionFailed { .. } => ErrorTip::None,
            ErrorImpl::NoMatchingArm => ErrorTip::Suggestion(String::from(
                "Add a final `_ => value` arm",
            )),
            ErrorImpl::UnhandledReturn => ErrorTip::Suggestion(String::from(
                "`return` is reserved and not supported yet",
            )),
            ErrorImpl::ShellCommandFailed { command, .. } => {
                ErrorTip::Suggestion(format!("Command `{}` failed", command))
            }
            ErrorImpl::Io { .. } => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.internal_error, self.position)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // lexical
    #[error("cannot parse line: {line:?}")]
    UnrecognisedInput { line: String },
    #[error("unsupported float literal: {literal:?}")]
    UnsupportedFloat { literal: String },

    // structural
    #[error("no operators registered")]
    EmptyOperatorTable,
    #[error("unexpected symbol: {symbol:?}")]
    UnexpectedSymbol { symbol: String },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected {expected:?}, found {found:?}")]
    MissingClosingSymbol { expected: String, found: String },
    #[error("not all tokens were parsed: {token:?}")]
    LeftoverTokens { token: String },
    #[error("inconsistent dedent to depth {depth}")]
    InconsistentDedent { depth: usize },
    #[error("{node} expects {expected} children, received {received}")]
    FieldCountMismatch {
        node: String,
        expected: usize,
        received: usize,
    },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unexpected node {node}")]
    UnexpectedNode { node: String },

    // desugaring
    #[error("malformed parameters: {found}")]
    MalformedParameters { found: String },
    #[error("invalid assignment target: {found}")]
    InvalidAssignmentTarget { found: String },
    #[error("conditional arm outside of match")]
    MisplacedArm,
    #[error("comma list outside of a call or array")]
    CommaOutsideList,
    #[error("invalid regex {pattern:?}: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    // scope
    #[error("unknown variable {variable:?}")]
    VariableNotDeclared { variable: String },

    // types
    #[error("types do not match: {expected} and {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("condition is not a boolean: {found}")]
    NonBooleanCondition { found: String },
    #[error("branch types do not match: {then} and {otherwise}")]
    BranchTypeMismatch { then: String, otherwise: String },

    // runtime
    #[error("{operand} does not support {operation} operation")]
    UnsupportedOperation { operation: String, operand: String },
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: String },
    #[error("index {index} out of range for length {length}")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("{value} is not callable")]
    NotCallable { value: String },
    #[error("unexpected arguments: expected {expected:?}, received {received:?}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("assertion failed on {expression}")]
    AssertionFailed { expression: String },
    #[error("no match arm applies")]
    NoMatchingArm,
    #[error("return is not supported")]
    UnhandledReturn,
    #[error("shell command {command:?} failed: {reason}")]
    ShellCommandFailed { command: String, reason: String },
    #[error("i/o error: {message}")]
    Io { message: String },
}
