//! minischeme - a small evaluator for a subset of Scheme
//!
//! This crate reads one S-expression at a time, evaluates it against a scoped
//! environment, and returns either the resulting value or a structured error.
//!
//! ```scheme
//! (define (square x) (* x x))
//! (square 5)                     ; 25
//! (append '(1 2) '(3 4))         ; (1 2 3 4)
//! (append '(1 2) 3)              ; (1 2 . 3)
//! (cond (#f 1) (#t 2) (else 3))  ; 2
//! (assoc 'b '((a 1) (b 2)))      ; (b 2)
//! ```
//!
//! ## Evaluation model
//!
//! - Data and code share one representation: cons cells terminated by the
//!   empty list, plus booleans, integers and symbols.
//! - `#f` and `()` are both falsy in conditionals (`and`, `or`, `cond`, `if`).
//! - Builtins and special forms live in a single table and are bound in the
//!   global frame like any other value, so `quote`, `lambda` and `define` can
//!   be passed around, shadowed or rebound.
//! - Closures do not capture their defining environment: free variables are
//!   resolved against the caller's active frames at call time.
//! - There is no tail-call elimination. Unbounded recursion exhausts the
//!   native stack unless [`config::Config::max_eval_depth`] is set.
//!
//! ## Modules
//!
//! - `ast`: the value model, list utilities and the printer
//! - `evaluator`: the dispatcher, special forms and the environment stack
//! - `builtinops`: the builtin procedure table
//! - `scheme`: S-expression reader
//! - `config`: interpreter settings

use std::fmt;

/// Maximum parsing depth to prevent stack overflow in the reader
pub const MAX_PARSE_DEPTH: usize = 256;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Invalid or unexpected syntax (bad tokens, stray parentheses, misplaced dots)
    InvalidSyntax,
    /// Input ended before the expression was complete (unclosed parens, dangling quote)
    Incomplete,
    /// Expression nesting exceeded [`MAX_PARSE_DEPTH`]
    TooDeeplyNested,
    /// Extra input found after a complete, valid expression
    TrailingContent,
    /// Valid Scheme syntax that this implementation does not support (strings)
    Unsupported,
    /// Implementation-imposed limit exceeded (integer literal overflow)
    ImplementationLimit,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token or character encountered, if identifiable
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

    /// Create a ParseError with context and found token extracted from input at a given offset
    pub fn with_context_and_found(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
        found: Option<String>,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;

        let context_start = error_offset.saturating_sub(20);
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
        if context_start + context_str.chars().count() < input.chars().count() {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\r', "");

        Self::new(kind, message, Some(display_context), found)
    }

    /// True when more input could complete the expression
    pub fn is_incomplete(&self) -> bool {
        self.kind == ParseErrorKind::Incomplete
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(found) = &self.found {
            write!(f, "\nFound: {found}")?;
        }
        if let Some(context) = &self.context {
            write!(f, "\nContext: {context}")?;
        }
        Ok(())
    }
}

/// Error taxonomy, see [`Error::kind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Arity,
    Type,
    Reference,
    Syntax,
    Eval,
    Exit,
}

/// Error types for the interpreter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("ParseError: {0}")]
    ParseError(ParseError),
    /// Runtime failures outside the other categories: integer overflow,
    /// evaluation depth limit, environment misuse
    #[error("EvaluationError: {0}")]
    EvalError(String),
    /// An operand's variant does not satisfy an operation's precondition
    #[error("TypeError: {0}")]
    TypeError(String),
    /// A symbol has no binding reachable from the current environment
    #[error("ReferenceError: undefined symbol {0}")]
    ReferenceError(String),
    /// A special form's argument shape is structurally invalid
    #[error("SyntaxError: {0}")]
    SyntaxError(String),
    #[error("{}", describe_arity(.expected, .got, .expression))]
    ArityError {
        expected: usize,
        got: usize,
        expression: Option<String>,
    },
    /// Raised by the `exit` builtin; the shell terminates the process on it
    #[error("exit requested")]
    Exit,
}

fn describe_arity(expected: &usize, got: &usize, expression: &Option<String>) -> String {
    match expression {
        Some(expr) => {
            format!("ArityError: {expr}: expected {expected} arguments, got {got}")
        }
        None => format!("ArityError: function expected {expected} arguments but got {got}"),
    }
}

impl Error {
    /// Create an ArityError without expression context
    pub fn arity_error(expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: None,
        }
    }

    /// Create an ArityError with expression context
    pub fn arity_error_with_expr(expected: usize, got: usize, expression: String) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: Some(expression),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ParseError(_) => ErrorKind::Parse,
            Error::EvalError(_) => ErrorKind::Eval,
            Error::TypeError(_) => ErrorKind::Type,
            Error::ReferenceError(_) => ErrorKind::Reference,
            Error::SyntaxError(_) => ErrorKind::Syntax,
            Error::ArityError { .. } => ErrorKind::Arity,
            Error::Exit => ErrorKind::Exit,
        }
    }
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Error::ParseError(error)
    }
}

pub mod ast;
pub mod builtinops;
pub mod config;
pub mod evaluator;
pub mod scheme;

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_and_messages() {
        let cases = vec![
            (Error::arity_error(2, 1), ErrorKind::Arity, "expected 2 arguments but got 1"),
            (
                Error::arity_error_with_expr(1, 3, "square".into()),
                ErrorKind::Arity,
                "square: expected 1 arguments, got 3",
            ),
            (Error::TypeError("car".into()), ErrorKind::Type, "TypeError: car"),
            (Error::ReferenceError("x".into()), ErrorKind::Reference, "undefined symbol x"),
            (Error::SyntaxError("cond".into()), ErrorKind::Syntax, "SyntaxError: cond"),
            (Error::EvalError("overflow".into()), ErrorKind::Eval, "overflow"),
            (Error::Exit, ErrorKind::Exit, "exit"),
        ];

        for (error, kind, text) in cases {
            assert_eq!(error.kind(), kind, "kind of {error:?}");
            let message = error.to_string();
            assert!(message.contains(text), "'{message}' should contain '{text}'");
        }
    }

    #[test]
    fn test_parse_error_context() {
        let input = "(define (f x)\n  (+ x 1) ) )";
        let err = ParseError::with_context_and_found(
            ParseErrorKind::TrailingContent,
            "unexpected input",
            input,
            input.len() - 1,
            Some(")".into()),
        );
        let context = err.context.clone().unwrap();
        assert!(context.starts_with("[...]"));
        assert!(!context.contains('\n'));

        let message = Error::from(err).to_string();
        assert!(message.starts_with("ParseError: unexpected input"));
        assert!(message.contains("Found: )"));
    }
}
