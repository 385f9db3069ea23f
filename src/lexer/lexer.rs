use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    parser::lookups::OperatorTable,
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind};

pub type RegexHandler = fn(&mut Lexer, &str) -> Result<(), Error>;

/// A whitespace-skipping matcher. Group 1 of `regex` is the token text.
#[derive(Clone)]
pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

impl RegexPattern {
    fn new(pattern: &str, handler: RegexHandler) -> Self {
        RegexPattern {
            regex: Regex::new(&format!(r"^\s*({})", pattern)).unwrap(),
            handler,
        }
    }
}

lazy_static! {
    // first match wins, so order matters
    static ref LITERAL_PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern::new(r"#.*", MK_DEFAULT_HANDLER!(TokenKind::Comment)),
        RegexPattern::new(r"/\*.*?\*/", MK_DEFAULT_HANDLER!(TokenKind::Comment)),
        RegexPattern::new(r"//.*", MK_DEFAULT_HANDLER!(TokenKind::Comment)),
        RegexPattern::new(r"\d+\.\d*", float_handler),
        RegexPattern::new(r"\d+", MK_DEFAULT_HANDLER!(TokenKind::Integer)),
        RegexPattern::new(r#""(?:[^"\\]|\\.)*""#, string_handler),
        RegexPattern::new(r"`[^`]*`", shell_command_handler),
        RegexPattern::new(r"/(?:[^/\\]|\\.)*/", regex_handler),
    ];
    static ref IDENTIFIER_PATTERN: RegexPattern =
        RegexPattern::new(r"[A-Za-z_][a-zA-Z0-9_]*", MK_DEFAULT_HANDLER!(TokenKind::Identifier));
}

/// Tokenizer state for a single source line.
pub struct Lexer {
    tokens: Vec<Token>,
    line_number: usize,
    pos: usize,
}

impl Lexer {
    pub fn new(line_number: usize) -> Lexer {
        Lexer {
            tokens: vec![],
            line_number,
            pos: 0,
        }
    }

    /// Pushes a token starting at the current position and spanning `len` bytes.
    pub fn push(&mut self, kind: TokenKind, value: String, len: usize) {
        let span = Span {
            start: self.get_position(),
            end: Position::new(self.line_number, self.pos + len + 1),
        };
        self.tokens.push(MK_TOKEN!(kind, value, span));
    }

    pub fn get_position(&self) -> Position {
        Position::new(self.line_number, self.pos + 1)
    }
}

/// Strips the one-byte delimiters of a quoted literal.
fn unquote(text: &str) -> String {
    String::from(&text[1..text.len() - 1])
}

fn float_handler(lexer: &mut Lexer, text: &str) -> Result<(), Error> {
    Err(Error::new(
        ErrorImpl::UnsupportedFloat {
            literal: text.to_string(),
        },
        lexer.get_position(),
    ))
}

fn string_handler(lexer: &mut Lexer, text: &str) -> Result<(), Error> {
    lexer.push(TokenKind::String, unquote(text), text.len());
    Ok(())
}

fn shell_command_handler(lexer: &mut Lexer, text: &str) -> Result<(), Error> {
    lexer.push(TokenKind::ShellCommand, unquote(text), text.len());
    Ok(())
}

fn regex_handler(lexer: &mut Lexer, text: &str) -> Result<(), Error> {
    lexer.push(TokenKind::Regex, unquote(text), text.len());
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, text: &str) -> Result<(), Error> {
    lexer.push(TokenKind::Symbol, text.to_string(), text.len());
    Ok(())
}

/// Builds the alternation over every registered spelling, longest first.
///
/// Spellings ending in a word character must end on a word boundary so
/// that `if` does not split `iffy`.
pub fn operator_pattern(table: &OperatorTable) -> Result<RegexPattern, Error> {
    let alternatives = table
        .spellings_longest_first()
        .iter()
        .map(|spelling| {
            let escaped = regex::escape(spelling);
            match spelling.chars().last() {
                Some(c) if c.is_alphanumeric() || c == '_' => format!(r"{}\b", escaped),
                _ => escaped,
            }
        })
        .collect::<Vec<String>>()
        .join("|");

    if alternatives.is_empty() {
        return Err(Error::new(ErrorImpl::EmptyOperatorTable, Position::null()));
    }

    let regex = Regex::new(&format!(r"^\s*({})", alternatives)).map_err(|err| {
        Error::new(
            ErrorImpl::InvalidRegex {
                pattern: alternatives.clone(),
                reason: err.to_string(),
            },
            Position::null(),
        )
    })?;

    Ok(RegexPattern {
        regex,
        handler: symbol_handler,
    })
}

/// Counts leading whitespace characters.
pub fn get_indent(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn tokenize_line(
    line: &str,
    line_number: usize,
    operators: &RegexPattern,
) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(line_number);
    let start = lex.get_position();
    lex.tokens
        .push(MK_TOKEN!(TokenKind::Dent(get_indent(line)), Span { start, end: start }));

    let patterns = LITERAL_PATTERNS
        .iter()
        .chain(std::iter::once(operators))
        .chain(std::iter::once(&*IDENTIFIER_PATTERN));

    let mut offset = 0;
    while !line[offset..].trim().is_empty() {
        let remainder = &line[offset..];
        let mut matched = false;

        for pattern in patterns.clone() {
            if let Some(captures) = pattern.regex.captures(remainder) {
                let (Some(whole), Some(text)) = (captures.get(0), captures.get(1)) else {
                    continue;
                };
                lex.pos = offset + text.start();
                (pattern.handler)(&mut lex, text.as_str())?;
                offset += whole.end();
                matched = true;
                break;
            }
        }

        if !matched {
            lex.pos = offset + get_indent(remainder);
            return Err(Error::new(
                ErrorImpl::UnrecognisedInput {
                    line: line.to_string(),
                },
                lex.get_position(),
            ));
        }
    }

    Ok(lex.tokens)
}

/// Splits `source` into dent markers and tokens, line by line.
///
/// Blank lines produce nothing, not even a dent marker.
pub fn tokenize(source: &str, table: &OperatorTable) -> Result<Vec<Token>, Error> {
    let operators = operator_pattern(table)?;
    let mut tokens = vec![];

    for (index, line) in source.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        tokens.extend(tokenize_line(line, index + 1, &operators)?);
    }

    debug!(
        target: "tokenizer",
        "after tokenizer:\n{}",
        tokens.iter().map(|t| t.to_string()).collect::<Vec<String>>().join(" ")
    );
    Ok(tokens)
}
