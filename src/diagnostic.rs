use crate::source::Span;
use thiserror::Error;

/// Everything that can go wrong in the pipeline, from the lexer through the
/// evaluator. The `Display` text is the user-facing message; hosts match on
/// the variant when they need more than the text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnosticKind {
    #[error("Unterminated string literal")]
    UnterminatedString,
    #[error("Unexpected token: {found}")]
    UnexpectedToken { found: String },
    #[error("Expected {expected}, got {found}")]
    ExpectedToken { expected: String, found: String },
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("Cannot assign to immutable variable: {0}")]
    ImmutableAssignment(String),
    #[error("Cannot apply '{operator}' operator to {operand}")]
    InvalidUnaryOperand {
        operator: String,
        operand: &'static str,
    },
    #[error("Unsupported operation: {left} {operator} {right}")]
    UnsupportedOperation {
        left: &'static str,
        operator: String,
        right: &'static str,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error(
        "If condition must be a boolean value, got {found}. \
         Consider using comparison operators (==, !=, <, >) to build a boolean condition"
    )]
    NonBooleanCondition { found: &'static str },
    #[error(
        "Maximum call depth exceeded. \
         Consider reducing the nesting depth of your if expressions"
    )]
    CallDepthExceeded,
}

/// A failure at a known location in the source text. Raised by any stage and
/// propagated to the caller unhandled; there is no internal recovery.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span) -> Diagnostic {
        Diagnostic { kind, span }
    }
}
