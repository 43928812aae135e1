use crate::Span;
use crate::ast::{
    Block, ElseBranch, Expression, ExpressionKind, IfExpression, Program, Statement, StatementKind,
};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::environment::Environment;
use crate::lexer::{Token, TokenKind};
use crate::value::Value;

// Bounds recursion through nested if expressions. This protects the host
// call stack, so exceeding it is fatal rather than retryable.
const MAX_CALL_DEPTH: usize = 1000;

// Result type alias for convenience
pub type EvalResult = Result<Value, Diagnostic>;

/// Walks the AST directly, producing a `Value` or the first failure. Owns
/// the variable environment, so bindings persist across calls on the same
/// instance; independent instances share nothing.
#[derive(Debug, Default)]
pub struct Evaluator {
    environment: Environment,
    call_depth: usize,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::default()
    }

    /// The environment is read-only from the outside; only evaluation
    /// mutates it. Exposed for REPL identifier completion.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Folds a whole program into the value of its last statement; an empty
    /// program yields nil.
    pub fn evaluate(&mut self, program: &Program) -> EvalResult {
        let mut value = Value::Nil;
        for statement in &program.statements {
            value = self.evaluate_statement(statement)?;
        }
        Ok(value)
    }

    pub fn evaluate_statement(&mut self, statement: &Statement) -> EvalResult {
        match &statement.kind {
            StatementKind::Expression(expression) => self.evaluate_expression(expression),
            StatementKind::Let {
                mutable,
                name,
                value,
            } => {
                let value = self.evaluate_expression(value)?;
                self.environment
                    .define(name.text.clone(), value.clone(), *mutable);
                Ok(value)
            }
        }
    }

    pub fn evaluate_expression(&mut self, expression: &Expression) -> EvalResult {
        match &expression.kind {
            ExpressionKind::Assignment { name, value } => {
                self.evaluate_assignment(name, value, expression.span)
            }
            ExpressionKind::Parenthesized { expression } => self.evaluate_expression(expression),
            ExpressionKind::Unary { operator, right } => {
                self.evaluate_unary(operator, right, expression.span)
            }
            ExpressionKind::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right, expression.span),
            ExpressionKind::Identifier { name } => self.environment.get(&name.text, expression.span),
            ExpressionKind::If(if_expression) => self.evaluate_if(if_expression),
            ExpressionKind::NumberLiteral(value) => Ok(Value::Number(*value)),
            ExpressionKind::BooleanLiteral(value) => Ok(Value::Boolean(*value)),
            ExpressionKind::StringLiteral(value) => Ok(Value::String(value.clone())),
        }
    }

    fn evaluate_assignment(&mut self, name: &Token, value: &Expression, span: Span) -> EvalResult {
        let value = self.evaluate_expression(value)?;
        self.environment.assign(&name.text, value.clone(), span)?;
        Ok(value)
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expression, span: Span) -> EvalResult {
        let right = self.evaluate_expression(right)?;
        match (&operator.kind, right) {
            (TokenKind::Bang, Value::Boolean(value)) => Ok(Value::Boolean(!value)),
            (TokenKind::Minus, Value::Number(value)) => Ok(Value::Number(-value)),
            (_, value) => Err(Diagnostic::new(
                DiagnosticKind::InvalidUnaryOperand {
                    operator: operator.text.clone(),
                    operand: value.type_name(),
                },
                span,
            )),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expression,
        operator: &Token,
        right: &Expression,
        span: Span,
    ) -> EvalResult {
        // Left before right; the order is observable through assignment
        // side effects in the operands.
        let left = self.evaluate_expression(left)?;
        let right = self.evaluate_expression(right)?;

        match (&left, &right) {
            (Value::Number(l), Value::Number(r)) => numeric_operation(*l, *r, operator, span),
            (Value::Boolean(l), Value::Boolean(r)) => boolean_operation(*l, *r, operator, span),
            (Value::String(l), Value::String(r)) => string_operation(l, r, operator, span),
            _ => Err(unsupported_operation(&left, operator, &right, span)),
        }
    }

    fn evaluate_if(&mut self, expression: &IfExpression) -> EvalResult {
        self.call_depth += 1;
        if self.call_depth > MAX_CALL_DEPTH {
            self.call_depth -= 1;
            return Err(Diagnostic::new(
                DiagnosticKind::CallDepthExceeded,
                expression.span,
            ));
        }
        let result = self.evaluate_if_branches(expression);
        self.call_depth -= 1;
        result
    }

    fn evaluate_if_branches(&mut self, expression: &IfExpression) -> EvalResult {
        let condition = self.evaluate_expression(&expression.condition)?;
        let Value::Boolean(condition) = condition else {
            return Err(Diagnostic::new(
                DiagnosticKind::NonBooleanCondition {
                    found: condition.type_name(),
                },
                expression.span,
            ));
        };

        if condition {
            return self.evaluate_block(&expression.then_branch);
        }

        match expression.else_branch.as_deref() {
            Some(ElseBranch::If(nested)) => self.evaluate_if(nested),
            Some(ElseBranch::Block(block)) => self.evaluate_block(block),
            None => Ok(Value::Nil),
        }
    }

    fn evaluate_block(&mut self, block: &Block) -> EvalResult {
        let mut value = Value::Nil;
        for statement in &block.statements {
            value = self.evaluate_statement(statement)?;
        }
        Ok(value)
    }
}

// Operator applicability is keyed on the operand kind pairing, not the
// operator alone; each pairing has its own table below.

fn numeric_operation(left: f64, right: f64, operator: &Token, span: Span) -> EvalResult {
    match operator.kind {
        TokenKind::Plus => Ok(Value::Number(left + right)),
        TokenKind::Minus => Ok(Value::Number(left - right)),
        TokenKind::Star => Ok(Value::Number(left * right)),
        TokenKind::Slash => {
            if right == 0.0 {
                return Err(Diagnostic::new(DiagnosticKind::DivisionByZero, span));
            }
            Ok(Value::Number(left / right))
        }
        TokenKind::EqualsEquals => Ok(Value::Boolean(left == right)),
        TokenKind::BangEquals => Ok(Value::Boolean(left != right)),
        TokenKind::Less => Ok(Value::Boolean(left < right)),
        TokenKind::LessEquals => Ok(Value::Boolean(left <= right)),
        TokenKind::Greater => Ok(Value::Boolean(left > right)),
        TokenKind::GreaterEquals => Ok(Value::Boolean(left >= right)),
        _ => Err(Diagnostic::new(
            DiagnosticKind::UnsupportedOperation {
                left: "number",
                operator: operator.text.clone(),
                right: "number",
            },
            span,
        )),
    }
}

fn boolean_operation(left: bool, right: bool, operator: &Token, span: Span) -> EvalResult {
    match operator.kind {
        TokenKind::AmpAmp => Ok(Value::Boolean(left && right)),
        TokenKind::PipePipe => Ok(Value::Boolean(left || right)),
        TokenKind::EqualsEquals => Ok(Value::Boolean(left == right)),
        TokenKind::BangEquals => Ok(Value::Boolean(left != right)),
        _ => Err(Diagnostic::new(
            DiagnosticKind::UnsupportedOperation {
                left: "boolean",
                operator: operator.text.clone(),
                right: "boolean",
            },
            span,
        )),
    }
}

fn string_operation(left: &str, right: &str, operator: &Token, span: Span) -> EvalResult {
    match operator.kind {
        TokenKind::PlusPlus => Ok(Value::String(format!("{left}{right}"))),
        _ => Err(Diagnostic::new(
            DiagnosticKind::UnsupportedOperation {
                left: "string",
                operator: operator.text.clone(),
                right: "string",
            },
            span,
        )),
    }
}

fn unsupported_operation(left: &Value, operator: &Token, right: &Value, span: Span) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::UnsupportedOperation {
            left: left.type_name(),
            operator: operator.text.clone(),
            right: right.type_name(),
        },
        span,
    )
}
