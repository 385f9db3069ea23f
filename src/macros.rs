//! Token construction shorthands used by the lexer.

/// Builds a [`Token`](crate::lexer::tokens::Token) from its kind, text and span.
///
/// The two-argument form builds a dent marker, which carries no text.
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Integer, "42".to_string(), span);
/// let dent = MK_TOKEN!(TokenKind::Dent(4), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
    ($kind:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: String::new(),
            span: $span,
        }
    };
}

/// A lexer handler that pushes the matched text unchanged as a `$kind` token.
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr) => {
        |lexer: &mut Lexer, text: &str| -> Result<(), Error> {
            lexer.push($kind, String::from(text), text.len());
            Ok(())
        }
    };
}
