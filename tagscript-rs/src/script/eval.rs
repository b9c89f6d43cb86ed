//! Tree-walking evaluator.
//!
//! An [`Evaluator`] borrows the function registry, the tag context being
//! rewritten and (optionally) the file the script runs for.  It walks an
//! [`Expression`] left to right; built-ins see the evaluator and use it to read
//! and write tags or to evaluate their own lazy arguments.

use tracing::trace;

use super::ast::{Evaluable, Expression, FunctionCall};
use super::error::{Position, RuntimeError};
use super::registry::{FunctionRegistry, Implementation};
use crate::file::FileContext;
use crate::tags::{normalize_tagname, TagContext};

pub type EvalResult = Result<String, RuntimeError>;

/// Iteration cap for `$foreach`, `$while` and `$map`.  Loops stop silently.
pub const MAX_LOOP_ITERATIONS: usize = 1000;

#[derive(Debug, Clone)]
struct Frame {
    function: String,
    position: Position,
}

pub struct Evaluator<'a> {
    registry: &'a FunctionRegistry,
    tags: &'a mut TagContext,
    file: Option<&'a dyn FileContext>,
    /// Built-ins currently executing, innermost last.
    frames: Vec<Frame>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        registry: &'a FunctionRegistry,
        tags: &'a mut TagContext,
        file: Option<&'a dyn FileContext>,
    ) -> Self {
        Evaluator {
            registry,
            tags,
            file,
            frames: Vec::new(),
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        self.registry
    }

    pub fn tags(&self) -> &TagContext {
        self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagContext {
        self.tags
    }

    pub fn file(&self) -> Option<&dyn FileContext> {
        self.file
    }

    /// Evaluate any tree node.
    pub fn eval<E: Evaluable + ?Sized>(&mut self, node: &E) -> EvalResult {
        node.eval(self)
    }

    /// Evaluate an optional argument; a missing one is `""`.
    pub fn eval_opt(&mut self, expr: Option<&Expression>) -> EvalResult {
        match expr {
            Some(expr) => expr.eval(self),
            None => Ok(String::new()),
        }
    }

    /// Value of `%name%`: the tag's values joined, or `""` when unset.
    pub fn variable(&self, name: &str) -> String {
        self.tags.get_or_empty(&normalize_tagname(name))
    }

    /// Set a tag from script; an empty value unsets it.
    pub fn set_tag(&mut self, name: &str, value: String) {
        if value.is_empty() {
            self.unset_tag(name);
        } else {
            self.tags.set_single(&normalize_tagname(name), value);
        }
    }

    /// Remove a tag.  `ns:*` removes every tag in namespace `ns`.
    pub fn unset_tag(&mut self, name: &str) {
        let name = normalize_tagname(name);
        match name.strip_suffix('*').filter(|ns| ns.ends_with(':')) {
            Some(namespace) => {
                let doomed: Vec<String> = self
                    .tags
                    .keys()
                    .filter(|key| key.starts_with(namespace))
                    .map(str::to_owned)
                    .collect();
                for key in &doomed {
                    self.tags.unset(key);
                }
            }
            None => {
                self.tags.unset(&name);
            }
        }
    }

    /// Dispatch a function call.
    pub fn call(&mut self, call: &FunctionCall) -> EvalResult {
        let registry = self.registry;
        let descriptor = registry
            .lookup(call.name())
            .ok_or_else(|| RuntimeError::UnknownFunction {
                name: call.name().to_owned(),
                position: call.position(),
            })?;
        let arity = descriptor.arity();
        if !arity.accepts(call.args().len()) {
            return Err(RuntimeError::ArityMismatch {
                name: call.name().to_owned(),
                expected: arity,
                actual: call.args().len(),
                position: call.position(),
            });
        }

        trace!(function = call.name(), args = call.args().len(), "call");
        match descriptor.implementation() {
            Implementation::Eager(function) => {
                let mut args = Vec::with_capacity(call.args().len());
                for arg in call.args() {
                    args.push(arg.eval(self)?);
                }
                self.enter(call);
                let result = function(self, &args);
                self.frames.pop();
                result
            }
            Implementation::Lazy(function) => {
                self.enter(call);
                let result = function(self, call.args());
                self.frames.pop();
                result
            }
        }
    }

    fn enter(&mut self, call: &FunctionCall) {
        self.frames.push(Frame {
            function: call.name().to_owned(),
            position: call.position(),
        });
    }

    /// Name and position of the innermost executing built-in.
    pub fn current_function(&self) -> Option<(&str, Position)> {
        self.frames
            .last()
            .map(|frame| (frame.function.as_str(), frame.position))
    }

    /// An `UnsupportedFormat` error attributed to the current call.
    pub fn unsupported_format(&self) -> RuntimeError {
        let (function, position) = self.current_function().unwrap_or(("", Position::START));
        RuntimeError::UnsupportedFormat {
            function: function.to_owned(),
            position,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
