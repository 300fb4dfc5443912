//! Recursive-descent parser building [`Value`] trees from tokens.
//!
//! ```text
//! expr := INTEGER | SYMBOL | "(" expr* ")" | "'" expr
//! ```
//!
//! `'x` is read as `(quote x)`. There is no dotted-pair input syntax, so every
//! list produced here is proper. Exactly one expression is read; tokens after
//! it are left to the caller.

use nom::{
    IResult, Parser,
    character::complete::{char, digit1},
    combinator::{all_consuming, opt, recognize},
    sequence::pair,
};

use crate::ast::{NumberType, Value};
use crate::lexer::{Lexer, TokenKind};
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind};

/// Parse the first complete expression of `input`. Trailing text is ignored.
pub fn parse(input: &str) -> Result<Value, Error> {
    parse_prefix(input).map(|(value, _)| value)
}

/// Parse the first complete expression of `input` and return it together
/// with the unconsumed remainder of the input.
pub fn parse_prefix(input: &str) -> Result<(Value, &str), Error> {
    let mut lexer = Lexer::new(input);
    let value = parse_expr(&mut lexer)?;
    Ok((value, lexer.rest()))
}

/// Consume exactly one expression's worth of tokens.
pub fn parse_expr(lexer: &mut Lexer<'_>) -> Result<Value, Error> {
    parse_expr_with_depth(lexer, 0)
}

/// Parse list elements up to and including the closing `)`.
/// The opening `(` must already be consumed.
pub fn parse_list(lexer: &mut Lexer<'_>) -> Result<Value, Error> {
    parse_list_with_depth(lexer, 1)
}

fn parse_expr_with_depth(lexer: &mut Lexer<'_>, depth: usize) -> Result<Value, Error> {
    if depth >= MAX_PARSE_DEPTH {
        return Err(ParseError::with_context(
            ParseErrorKind::TooDeeplyNested,
            format!("Expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
            lexer.input(),
            lexer.offset(),
        )
        .into());
    }

    let Some(token) = lexer.next_token() else {
        return Err(ParseError::with_context(
            ParseErrorKind::Incomplete,
            "Unexpected end of input",
            lexer.input(),
            lexer.offset(),
        )
        .into());
    };

    match token.kind {
        TokenKind::LParen => parse_list_with_depth(lexer, depth + 1),
        TokenKind::RParen => Err(ParseError::with_context_and_found(
            ParseErrorKind::InvalidSyntax,
            "Unexpected ')'",
            lexer.input(),
            token.offset,
            Some(token.text().to_owned()),
        )
        .into()),
        TokenKind::Quote => {
            let quoted = parse_expr_with_depth(lexer, depth + 1)?;
            Ok(Value::quoted(quoted))
        }
        TokenKind::Atom(text) => parse_atom(text, lexer.input(), token.offset),
    }
}

fn parse_list_with_depth(lexer: &mut Lexer<'_>, depth: usize) -> Result<Value, Error> {
    let mut elements = Vec::new();

    loop {
        match lexer.peek_token() {
            None => {
                return Err(ParseError::with_context(
                    ParseErrorKind::Incomplete,
                    "Expected ')'",
                    lexer.input(),
                    lexer.offset(),
                )
                .into());
            }
            Some(token) if token.kind == TokenKind::RParen => {
                lexer.next_token();
                return Ok(Value::list(elements));
            }
            Some(_) => elements.push(parse_expr_with_depth(lexer, depth)?),
        }
    }
}

/// True when the whole atom is an optional `-` followed by decimal digits.
fn is_integer_literal(text: &str) -> bool {
    let result: IResult<&str, &str> =
        all_consuming(recognize(pair(opt(char('-')), digit1))).parse(text);
    result.is_ok()
}

/// Classify an atom as an integer or a symbol.
fn parse_atom(text: &str, input: &str, offset: usize) -> Result<Value, Error> {
    if !is_integer_literal(text) {
        return Ok(Value::symbol(text));
    }

    text.parse::<NumberType>().map(Value::Integer).map_err(|_| {
        ParseError::with_context_and_found(
            ParseErrorKind::ImplementationLimit,
            format!("Integer literal out of range: {text}"),
            input,
            offset,
            Some(text.to_owned()),
        )
        .into()
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{sym, val};

    /// Test result variants for parsing tests
    #[derive(Debug)]
    enum ParseTestResult {
        Success(Value),                   // Parsing should succeed with this value
        Failure(ParseErrorKind, &'static str), // Parsing should fail with this kind and message
    }
    use ParseTestResult::*;

    fn success<T: Into<Value>>(value: T) -> ParseTestResult {
        Success(value.into())
    }

    fn quoted<T: Into<Value>>(value: T) -> Value {
        val([sym("quote"), value.into()])
    }

    fn run_parse_tests(test_cases: Vec<(&str, ParseTestResult)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("Parse test #{} '{input}'", i + 1);
            match (parse(input), expected) {
                (Ok(actual), Success(expected_val)) => {
                    assert_eq!(actual, *expected_val, "{test_id}: value mismatch");
                }
                (Err(Error::ParseError(err)), Failure(kind, message)) => {
                    assert_eq!(err.kind, *kind, "{test_id}: kind mismatch");
                    assert_eq!(err.message, *message, "{test_id}: message mismatch");
                }
                (Ok(actual), Failure(..)) => panic!("{test_id}: expected error, got {actual:?}"),
                (Err(err), _) => panic!("{test_id}: unexpected error {err:?}"),
            }
        }
    }

    #[test]
    #[expect(clippy::too_many_lines)] // Comprehensive test coverage is intentionally thorough
    fn test_parser_comprehensive() {
        use ParseErrorKind::*;

        let test_cases = vec![
            // ===== INTEGERS =====
            ("42", success(42)),
            ("-5", success(-5)),
            ("0", success(0)),
            ("-0", success(0)),
            ("007", success(7)),
            ("9223372036854775807", success(i64::MAX)),
            ("-9223372036854775808", success(i64::MIN)),
            (
                "9223372036854775808",
                Failure(
                    ImplementationLimit,
                    "Integer literal out of range: 9223372036854775808",
                ),
            ),
            // ===== SYMBOLS =====
            ("foo", success(sym("foo"))),
            ("+", success(sym("+"))),
            ("-", success(sym("-"))),
            ("quote", success(sym("quote"))),
            // Not an integer unless the whole atom is digits
            ("12abc", success(sym("12abc"))),
            ("-x", success(sym("-x"))),
            ("+5", success(sym("+5"))),
            ("--5", success(sym("--5"))),
            ("3.14", success(sym("3.14"))),
            ("#t", success(sym("#t"))),
            // ===== LISTS =====
            ("()", success(Value::Nil)),
            ("(   )", success(Value::Nil)),
            ("(a)", success([sym("a")])),
            ("(a b c)", success([sym("a"), sym("b"), sym("c")])),
            ("(+ 3 1)", success([sym("+"), val(3), val(1)])),
            ("( a  b\tc )", success([sym("a"), sym("b"), sym("c")])),
            ("((1 2) (3))", success([val([1, 2]), val([3])])),
            ("(((x)))", success([val([val([sym("x")])])])),
            ("(a ())", success([sym("a"), Value::Nil])),
            // ===== QUOTE SHORTHAND =====
            ("'x", success(quoted(sym("x")))),
            ("'(a b c)", success(quoted([sym("a"), sym("b"), sym("c")]))),
            ("'()", success(quoted(Value::Nil))),
            ("''x", success(quoted(quoted(sym("x"))))),
            ("(quote x)", success(quoted(sym("x")))),
            ("(a 'b)", success([sym("a"), quoted(sym("b"))])),
            ("' x", success(quoted(sym("x")))),
            // ===== TRAILING INPUT IS IGNORED =====
            ("1 2", success(1)),
            ("(+ 1 2) (+ 3 4)", success([sym("+"), val(1), val(2)])),
            ("a)", success(sym("a"))),
            ("'x y", success(quoted(sym("x")))),
            // ===== ERRORS =====
            (")", Failure(InvalidSyntax, "Unexpected ')'")),
            ("  ) (a)", Failure(InvalidSyntax, "Unexpected ')'")),
            ("(a b", Failure(Incomplete, "Expected ')'")),
            ("(", Failure(Incomplete, "Expected ')'")),
            ("((1 2)", Failure(Incomplete, "Expected ')'")),
            ("(+ 1 (- 2", Failure(Incomplete, "Expected ')'")),
            ("", Failure(Incomplete, "Unexpected end of input")),
            ("   ", Failure(Incomplete, "Unexpected end of input")),
            ("'", Failure(Incomplete, "Unexpected end of input")),
            (
                "(1 99999999999999999999)",
                Failure(
                    ImplementationLimit,
                    "Integer literal out of range: 99999999999999999999",
                ),
            ),
        ];

        run_parse_tests(test_cases);
    }

    #[test]
    fn test_quote_shorthand_matches_longhand() {
        let inputs = ["x", "42", "(a b c)", "()", "(+ 1 (* 2 3))", "'y"];
        for input in inputs {
            let short = parse(&format!("'{input}")).unwrap();
            let long = parse(&format!("(quote {input})")).unwrap();
            assert_eq!(short, long, "'{input} vs (quote {input})");
        }
    }

    #[test]
    fn test_parse_prefix_returns_remainder() {
        let (value, rest) = parse_prefix("(a b) c d").unwrap();
        assert_eq!(value, val([sym("a"), sym("b")]));
        assert_eq!(rest, " c d");

        let (value, rest) = parse_prefix("42").unwrap();
        assert_eq!(value, val(42));
        assert_eq!(rest, "");
    }

    #[test]
    fn test_parse_list_after_open_paren() {
        let mut lexer = Lexer::new("(1 2) tail");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LParen);
        assert_eq!(parse_list(&mut lexer).unwrap(), val([1, 2]));
        assert_eq!(parse_expr(&mut lexer).unwrap(), sym("tail"));
    }

    #[test]
    fn test_error_context() {
        let err = parse("(a b").unwrap_err();
        let parse_err = err.as_parse_error().unwrap();
        assert_eq!(parse_err.context.as_deref(), Some("(a b"));

        // A surplus ')' after a complete expression is trailing input
        let value = parse("(a))").unwrap();
        assert_eq!(value, val([sym("a")]));

        let err = parse(")").unwrap_err();
        assert_eq!(err.as_parse_error().unwrap().found.as_deref(), Some(")"));
    }

    #[test]
    fn test_parser_depth_limits() {
        let parens_under_limit = format!(
            "{}x{}",
            "(".repeat(MAX_PARSE_DEPTH - 1),
            ")".repeat(MAX_PARSE_DEPTH - 1)
        );
        let quotes_under_limit = format!("{}x", "'".repeat(MAX_PARSE_DEPTH - 1));
        let parens_at_limit = format!(
            "{}x{}",
            "(".repeat(MAX_PARSE_DEPTH),
            ")".repeat(MAX_PARSE_DEPTH)
        );
        let quotes_at_limit = format!("{}x", "'".repeat(MAX_PARSE_DEPTH));

        assert!(parse(&parens_under_limit).is_ok());
        assert!(parse(&quotes_under_limit).is_ok());

        for input in [parens_at_limit, quotes_at_limit] {
            let err = parse(&input).unwrap_err();
            assert_eq!(
                err.as_parse_error().unwrap().kind,
                ParseErrorKind::TooDeeplyNested
            );
        }
    }
}
