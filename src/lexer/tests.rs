use crate::{
    errors::errors::ErrorImpl,
    parser::lookups::{create_operator_table, OperatorTable},
    Position,
};

use super::{
    lexer::{get_indent, operator_pattern, tokenize},
    tokens::{Token, TokenKind},
};

fn lex(source: &str) -> Vec<Token> {
    tokenize(source, &create_operator_table()).unwrap()
}

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn test_tokenize_assignment() {
    let tokens = lex("x = 1");

    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Dent(0),
            TokenKind::Identifier,
            TokenKind::Symbol,
            TokenKind::Integer
        ]
    );
    assert_eq!(tokens[1].value, "x");
    assert_eq!(tokens[2].value, "=");
    assert_eq!(tokens[3].value, "1");
}

#[test]
fn test_tokenize_literals() {
    let tokens = lex(r#"a = "hi there" `ls -l` /a+b/"#);

    assert_eq!(tokens[3].kind, TokenKind::String);
    assert_eq!(tokens[3].value, "hi there");
    assert_eq!(tokens[4].kind, TokenKind::ShellCommand);
    assert_eq!(tokens[4].value, "ls -l");
    assert_eq!(tokens[5].kind, TokenKind::Regex);
    assert_eq!(tokens[5].value, "a+b");
}

#[test]
fn test_string_with_escaped_quote() {
    let tokens = lex(r#"p "say \"hi\"""#);

    assert_eq!(tokens[2].kind, TokenKind::String);
    assert_eq!(tokens[2].value, r#"say \"hi\""#);
}

#[test]
fn test_dents_track_indentation() {
    let tokens = lex("f ->\n    x\n  y");
    let depths = tokens.iter().filter_map(|t| t.depth()).collect::<Vec<usize>>();

    assert_eq!(depths, vec![0, 4, 2]);
}

#[test]
fn test_blank_lines_are_skipped() {
    let tokens = lex("a\n\n   \nb");

    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[3].value, "b");
    assert_eq!(tokens[3].span.start, Position::new(4, 1));
}

#[test]
fn test_token_spans() {
    let tokens = lex("  ab == 12");

    assert_eq!(tokens[1].span.start, Position::new(1, 3));
    assert_eq!(tokens[1].span.end, Position::new(1, 5));
    assert_eq!(tokens[2].value, "==");
    assert_eq!(tokens[2].span.start, Position::new(1, 6));
    assert_eq!(tokens[3].span.start, Position::new(1, 9));
}

#[test]
fn test_word_operators_need_a_boundary() {
    let tokens = lex("iffy = matches");

    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].value, "iffy");
    assert_eq!(tokens[3].kind, TokenKind::Identifier);
    assert_eq!(tokens[3].value, "matches");

    let tokens = lex("x = 1 if y else 2");
    assert!(tokens[4].is_symbol("if"));
    assert!(tokens[6].is_symbol("else"));
}

#[test]
fn test_spellings_with_spaces() {
    let tokens = lex("p f . g");

    assert!(tokens[1].is_symbol("p "));
    assert!(tokens[3].is_symbol(" . "));

    let tokens = lex("print");
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn test_comments() {
    let tokens = lex("x # trailing\n// whole line\ny /* inline */ z");

    let comments = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Comment)
        .count();
    assert_eq!(comments, 3);
    assert_eq!(tokens.last().map(|t| t.value.as_str()), Some("z"));
}

#[test]
fn test_float_is_rejected() {
    let err = tokenize("x = 1.5", &create_operator_table()).unwrap_err();

    assert_eq!(
        err.get_impl(),
        &ErrorImpl::UnsupportedFloat {
            literal: String::from("1.5")
        }
    );
    assert_eq!(err.get_position(), &Position::new(1, 5));
}

#[test]
fn test_unrecognised_input_column() {
    let err = tokenize("x = ?", &create_operator_table()).unwrap_err();

    assert!(matches!(err.get_impl(), ErrorImpl::UnrecognisedInput { .. }));
    assert_eq!(err.get_position(), &Position::new(1, 5));
}

#[test]
fn test_empty_table_has_no_operators() {
    let err = operator_pattern(&OperatorTable::new()).err().unwrap();

    assert_eq!(err.get_impl(), &ErrorImpl::EmptyOperatorTable);
}

#[test]
fn test_token_display() {
    let tokens = lex("x");

    assert_eq!(tokens[0].to_string(), "DENT:0");
    assert_eq!(tokens[1].to_string(), "Identifier(\"x\")");
}

#[test]
fn test_get_indent() {
    assert_eq!(get_indent("    x"), 4);
    assert_eq!(get_indent("\tx"), 1);
    assert_eq!(get_indent("x"), 0);
}
