//! Function registry: name → implementation, evaluation mode, arity, docs.
//!
//! The parser consults the registry to reject unknown functions and bad
//! argument counts up front; the evaluator consults it again to dispatch.
//! A registry is filled before it is shared and never mutated afterwards, so
//! lookups from many evaluation threads need no locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use super::ast::Expression;
use super::builtins;
use super::eval::{EvalResult, Evaluator};

/// A built-in that receives its arguments already evaluated.
pub type EagerFn = fn(&mut Evaluator<'_>, &[String]) -> EvalResult;

/// A built-in that receives raw argument expressions and evaluates them itself.
pub type LazyFn = fn(&mut Evaluator<'_>, &[Expression]) -> EvalResult;

#[derive(Clone, Copy)]
pub enum Implementation {
    Eager(EagerFn),
    Lazy(LazyFn),
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Eager(_) => f.write_str("Eager(..)"),
            Implementation::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Allowed argument count: `min..=max`, or `min..` when `max` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Arity { min: n, max: Some(n) }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Arity { min, max: Some(max) }
    }

    pub const fn at_least(min: usize) -> Self {
        Arity { min, max: None }
    }

    pub const fn any() -> Self {
        Arity::at_least(0)
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {max}"),
            Some(max) => write!(f, "between {} and {max}", self.min),
            None => write!(f, "at least {}", self.min),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    name: String,
    implementation: Implementation,
    arity: Arity,
    doc: &'static str,
}

impl FunctionDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn implementation(&self) -> Implementation {
        self.implementation
    }

    /// `true` when arguments are evaluated before the call.
    pub fn eval_args(&self) -> bool {
        matches!(self.implementation, Implementation::Eager(_))
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Markdown documentation; the first line is the call signature.
    pub fn doc(&self) -> &'static str {
        self.doc
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDescriptor>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the full built-in library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// The process-wide built-in registry, built on first use.
    pub fn global() -> &'static FunctionRegistry {
        static GLOBAL: OnceLock<FunctionRegistry> = OnceLock::new();
        GLOBAL.get_or_init(FunctionRegistry::with_builtins)
    }

    /// Add (or replace) a function.
    pub fn register(
        &mut self,
        name: &str,
        implementation: Implementation,
        arity: Arity,
        doc: &'static str,
    ) {
        self.functions.insert(
            name.to_owned(),
            FunctionDescriptor {
                name: name.to_owned(),
                implementation,
                arity,
                doc,
            },
        );
    }

    pub fn eager(&mut self, name: &str, function: EagerFn, arity: Arity, doc: &'static str) {
        self.register(name, Implementation::Eager(function), arity, doc);
    }

    pub fn lazy(&mut self, name: &str, function: LazyFn, arity: Arity, doc: &'static str) {
        self.register(name, Implementation::Lazy(function), arity, doc);
    }

    pub fn lookup(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// All descriptors sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDescriptor> {
        let mut all: Vec<_> = self.functions.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all.into_iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
