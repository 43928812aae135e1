use crate::diagnostic::{Diagnostic, DiagnosticKind};
use ariadne::{Label, Report, ReportKind, Source};

impl Diagnostic {
    /// Renders the diagnostic as a labeled report against the source text it
    /// was raised from. The core never prints anything itself; this is for
    /// hosts like the REPL.
    pub fn pretty_print(&self, input: &str) {
        let hint = match &self.kind {
            DiagnosticKind::UnterminatedString => "this string is never closed",
            DiagnosticKind::UnexpectedToken { .. } | DiagnosticKind::ExpectedToken { .. } => {
                "parsing stopped at this token"
            }
            DiagnosticKind::UndefinedVariable(_) => "this name has not been declared with `let`",
            DiagnosticKind::ImmutableAssignment(_) => {
                "declare the binding with `let mut` to allow assignment"
            }
            DiagnosticKind::InvalidUnaryOperand { .. } => {
                "the operand has the wrong type for this operator"
            }
            DiagnosticKind::UnsupportedOperation { .. } => {
                "these operand types do not support this operator"
            }
            DiagnosticKind::DivisionByZero => "the divisor evaluates to zero",
            DiagnosticKind::NonBooleanCondition { .. } => {
                "this condition does not evaluate to a boolean"
            }
            DiagnosticKind::CallDepthExceeded => "this if expression is nested too deeply",
        };
        Report::build(ReportKind::Error, ("REPL", self.span.to_range()))
            .with_message(self.kind.to_string())
            .with_label(Label::new(("REPL", self.span.to_range())).with_message(hint))
            .finish()
            .print(("REPL", Source::from(input)))
            .unwrap();
    }
}
