//! Script syntax tree.
//!
//! A script parses into an [`Expression`]: a flat sequence of literal text,
//! variable references and function calls whose results are concatenated.
//! Function arguments are themselves expressions, kept unevaluated so that
//! lazy built-ins (`$if`, `$while`, …) control when they run.

use super::error::Position;
use super::eval::{EvalResult, Evaluator};

/// Anything the evaluator can reduce to a string.
pub trait Evaluable {
    fn eval(&self, ev: &mut Evaluator<'_>) -> EvalResult;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text with escapes already resolved.
    Literal(String),
    /// `%name%`, stored in the user-facing spelling.
    Variable(String),
    /// `$name(args…)`
    Call(FunctionCall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    name: String,
    args: Vec<Expression>,
    position: Position,
}

impl FunctionCall {
    pub(crate) fn new(name: String, args: Vec<Expression>, position: Position) -> Self {
        FunctionCall { name, args, position }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    /// Position of the `$` that starts the call.
    pub fn position(&self) -> Position {
        self.position
    }
}

/// An ordered run of nodes; evaluates to their concatenation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expression {
    nodes: Vec<Node>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The variable name if this expression is exactly one `%name%`.
    pub fn single_variable(&self) -> Option<&str> {
        match self.nodes.as_slice() {
            [Node::Variable(name)] => Some(name),
            _ => None,
        }
    }
}

impl From<Vec<Node>> for Expression {
    fn from(nodes: Vec<Node>) -> Self {
        Expression { nodes }
    }
}

impl Evaluable for Node {
    fn eval(&self, ev: &mut Evaluator<'_>) -> EvalResult {
        match self {
            Node::Literal(text) => Ok(text.clone()),
            Node::Variable(name) => Ok(ev.variable(name)),
            Node::Call(call) => call.eval(ev),
        }
    }
}

impl Evaluable for FunctionCall {
    fn eval(&self, ev: &mut Evaluator<'_>) -> EvalResult {
        ev.call(self)
    }
}

impl Evaluable for Expression {
    fn eval(&self, ev: &mut Evaluator<'_>) -> EvalResult {
        let mut out = String::new();
        for node in &self.nodes {
            out.push_str(&node.eval(ev)?);
        }
        Ok(out)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_variable_detection() {
        let e = Expression::from(vec![Node::Variable("artist".into())]);
        assert_eq!(e.single_variable(), Some("artist"));

        let e = Expression::from(vec![
            Node::Variable("artist".into()),
            Node::Literal(" ".into()),
        ]);
        assert_eq!(e.single_variable(), None);
        assert_eq!(Expression::new().single_variable(), None);
    }

    #[test]
    fn empty_expression() {
        assert!(Expression::new().is_empty());
        assert!(!Expression::from(vec![Node::Literal("x".into())]).is_empty());
    }
}
