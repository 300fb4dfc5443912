//! minilisp - a minimal s-expression interpreter
//!
//! This crate reads one textual s-expression at a time, parses it into a tree of
//! cons cells and evaluates it against a fixed set of integer primitives and the
//! `quote` special form.
//!
//! ```text
//! (+ 3 1)        => 4
//! (- 5 2 1)      => 2
//! '(a b c)       => (a b c)
//! (quote (+ 1 2)) => (+ 1 2)
//! ```
//!
//! ## Pipeline
//!
//! raw text -> [`lexer`] (tokens) -> [`parser`] ([`ast::Value`] tree) ->
//! [`evaluator`] (using an [`environment::Environment`]) -> [`printer`] (text).
//!
//! The [`session`] module ties the stages together the way the `minilisp`
//! binary uses them: one expression per input line, `;` comment lines skipped,
//! one `=> <value>` output line per evaluated expression.
//!
//! ## Errors
//!
//! Every stage returns [`Error`] instead of terminating the process. Whether an
//! error ends the whole run or only the current line is decided by the caller
//! (see [`session::ErrorPolicy`]).
//!
//! ## Modules
//!
//! - `ast`: the four-variant value model
//! - `environment`: prepend-only name bindings
//! - `lexer`: splits a line into tokens
//! - `parser`: recursive-descent construction of values
//! - `builtinops`: registry of the primitive operators
//! - `evaluator`: tree-walking eval/apply
//! - `printer`: canonical textual rendering
//! - `session`: line-oriented driver

use std::fmt;

/// Maximum nesting depth accepted by the parser.
/// Deeper input is rejected instead of overflowing the host stack.
pub const MAX_PARSE_DEPTH: usize = 256;

/// Maximum recursion depth of the evaluator.
pub const MAX_EVAL_DEPTH: usize = 256;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// A token that cannot start an expression (a stray `)`)
    InvalidSyntax,
    /// Input ended before the expression was complete (empty input, unclosed parens)
    Incomplete,
    /// Expression nesting exceeded [`MAX_PARSE_DEPTH`]
    TooDeeplyNested,
    /// Implementation-imposed limit exceeded (integer literal out of range)
    ImplementationLimit,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    /// Create a ParseError with all fields
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        context: Option<String>,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context,
            found,
        }
    }

    /// Create a simple ParseError with a kind and message but no context
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None, None)
    }

    /// Create a ParseError with context extracted from input at a given byte offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
    ) -> Self {
        Self::with_context_and_found(kind, message, input, error_offset, None)
    }

    /// Create a ParseError with context and found token
    pub fn with_context_and_found(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
        found: Option<String>,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;
        const LEAD: usize = 20;

        // Offsets come from the lexer and are byte based; convert to chars
        let error_char = input
            .char_indices()
            .take_while(|(idx, _)| *idx < error_offset)
            .count();
        let context_start = error_char.saturating_sub(LEAD);
        let total_chars = input.chars().count();

        let context_str: String = input
            .chars()
            .skip(context_start)
            .take(MAX_CONTEXT)
            .collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_start + context_str.chars().count() < total_chars {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\r', "");

        Self::new(kind, message, Some(display_context), found)
    }
}

/// Error types for the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ParseError(ParseError),
    /// Symbol evaluated without a binding
    UnboundSymbol(String),
    /// Operator position holds a symbol that names no primitive
    UnknownOperator(String),
    /// Operator position holds something other than a symbol
    NonSymbolOperator,
    DivisionByZero,
    TypeError(String),
    ArityError {
        operator: String,
        expected: usize,
        got: usize,
    },
    EvalError(String),
}

impl Error {
    /// Create an ArityError for a named operator
    pub fn arity_error(operator: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::ArityError {
            operator: operator.into(),
            expected,
            got,
        }
    }

    /// The parse failure behind this error, if it is one
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::ParseError(e)
    }
}

impl fmt::Display for Error {
    /// The plain form is the one-line diagnostic printed by the `minilisp`
    /// binary. The alternate form (`{:#}`) adds parse context.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ParseError(e) => {
                write!(f, "{}", e.message)?;
                if f.alternate() {
                    if let Some(found) = &e.found {
                        write!(f, "\nFound: {found}")?;
                    }
                    if let Some(context) = &e.context {
                        write!(f, "\nContext: {context}")?;
                    }
                }
                Ok(())
            }
            Error::UnboundSymbol(name) => write!(f, "Unbound symbol '{name}'"),
            Error::UnknownOperator(name) => write!(f, "Unknown function '{name}'"),
            Error::NonSymbolOperator => write!(f, "Attempt to call a non-symbol"),
            Error::DivisionByZero => write!(f, "Division by zero"),
            Error::TypeError(msg) => write!(f, "Type error: {msg}"),
            Error::ArityError {
                operator,
                expected,
                got,
            } => write!(
                f,
                "ArityError: '{operator}' expected at least {expected} argument(s), got {got}"
            ),
            Error::EvalError(msg) => write!(f, "EvaluationError: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub mod ast;
pub mod builtinops;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod session;

pub use ast::Value;
pub use environment::Environment;
pub use evaluator::{create_global_env, eval};
pub use parser::parse;
pub use printer::print;
pub use session::{ErrorPolicy, RunOutcome, Session, SessionConfig};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_messages() {
        let cases = vec![
            (
                Error::ParseError(ParseError::from_message(
                    ParseErrorKind::InvalidSyntax,
                    "Unexpected ')'",
                )),
                "Unexpected ')'",
            ),
            (
                Error::ParseError(ParseError::from_message(
                    ParseErrorKind::Incomplete,
                    "Expected ')'",
                )),
                "Expected ')'",
            ),
            (Error::UnboundSymbol("x".into()), "Unbound symbol 'x'"),
            (Error::UnknownOperator("foo".into()), "Unknown function 'foo'"),
            (Error::NonSymbolOperator, "Attempt to call a non-symbol"),
            (Error::DivisionByZero, "Division by zero"),
        ];

        for (i, (error, expected)) in cases.iter().enumerate() {
            assert_eq!(format!("{error}"), *expected, "case #{}", i + 1);
        }
    }

    #[test]
    fn test_parse_error_context() {
        let input = "(a b";
        let error = ParseError::with_context(ParseErrorKind::Incomplete, "Expected ')'", input, 4);
        assert_eq!(error.context.as_deref(), Some("(a b"));

        let long = format!("{})", "x ".repeat(80));
        let error = ParseError::with_context_and_found(
            ParseErrorKind::InvalidSyntax,
            "Unexpected ')'",
            &long,
            160,
            Some(")".into()),
        );
        let context = error.context.clone().unwrap_or_default();
        assert!(context.starts_with("[...]"), "got {context}");
        assert!(context.ends_with(')'), "got {context}");

        let rendered = format!("{:#}", Error::ParseError(error));
        assert!(rendered.starts_with("Unexpected ')'\nFound: )\nContext: [...]"));
    }
}
