use crate::Span;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::value::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
struct Binding {
    value: Value,
    mutable: bool,
}

/// The evaluator's single flat mapping from variable name to value and
/// mutability flag. There are no nested scopes: redeclaration overwrites in
/// place, and entries are never removed. Each `Evaluator` exclusively owns
/// one of these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    bindings: HashMap<String, Binding>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    /// Creates or overwrites a binding. This is the `let` path; shadowing a
    /// previous declaration is unconditionally allowed and replaces both the
    /// value and the mutability flag.
    pub fn define(&mut self, name: String, value: Value, mutable: bool) {
        self.bindings.insert(name, Binding { value, mutable });
    }

    /// Looks up a variable's value, cloning it out of the store.
    /// `lookup_span` is the location where the variable was referenced, used
    /// for error reporting.
    pub fn get(&self, name: &str, lookup_span: Span) -> Result<Value, Diagnostic> {
        match self.bindings.get(name) {
            Some(binding) => Ok(binding.value.clone()),
            None => Err(Diagnostic::new(
                DiagnosticKind::UndefinedVariable(name.to_string()),
                lookup_span,
            )),
        }
    }

    /// Updates an *existing* binding. Fails if the name was never declared
    /// or if the binding is immutable; the mutability flag is untouched on
    /// success. `assign_span` is the location of the assignment expression.
    pub fn assign(&mut self, name: &str, value: Value, assign_span: Span) -> Result<(), Diagnostic> {
        match self.bindings.get_mut(name) {
            Some(binding) if binding.mutable => {
                binding.value = value;
                Ok(())
            }
            Some(_) => Err(Diagnostic::new(
                DiagnosticKind::ImmutableAssignment(name.to_string()),
                assign_span,
            )),
            None => Err(Diagnostic::new(
                DiagnosticKind::UndefinedVariable(name.to_string()),
                assign_span,
            )),
        }
    }

    /// Gets the set of all bound identifiers, for REPL completion.
    pub fn identifiers(&self) -> HashSet<String> {
        self.bindings.keys().map(|name| name.to_string()).collect()
    }
}
