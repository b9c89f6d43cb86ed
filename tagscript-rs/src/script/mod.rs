//! The tagger scripting language.
//!
//! A script is text with two kinds of substitution:
//!
//! - `%name%` expands to the value of a tag (`""` when unset);
//! - `$name(arg,...)` calls a function from the [`FunctionRegistry`].
//!
//! `\` escapes any of `$ % ( ) , \` and introduces `\n`, `\t` and `\uXXXX`.
//!
//! Source is [parsed](parser::parse) into an [`Expression`] tree once, then
//! evaluated by an [`Evaluator`] against a [`TagContext`](crate::tags::TagContext).
//! [`ScriptEngine`] bundles a registry with a parse cache and is what hosts
//! normally use.
//!
//! # Quick start
//!
//! ```rust
//! use tagscript::script::ScriptEngine;
//! use tagscript::tags::TagContext;
//!
//! let engine = ScriptEngine::new();
//! let mut tags = TagContext::from_pairs([("totaldiscs", "2"), ("discnumber", "1"), ("album", "X")]);
//! let out = engine
//!     .run("$if($gt(%totaldiscs%,1),%album% (Disc %discnumber%),%album%)", &mut tags, None)
//!     .unwrap();
//! assert_eq!(out, "X (Disc 1)");
//! ```

pub mod ast;
mod builtins;
pub mod cache;
pub mod engine;
pub mod error;
pub mod eval;
pub mod multi;
pub mod parser;
mod reader;
pub mod registry;

pub use ast::{Evaluable, Expression, FunctionCall, Node};
pub use cache::ScriptCache;
pub use engine::{evaluate, ScriptEngine};
pub use error::{ParseError, Position, RuntimeError, ScriptError};
pub use eval::{EvalResult, Evaluator, MAX_LOOP_ITERATIONS};
pub use parser::{parse, MAX_NESTING_DEPTH};
pub use registry::{Arity, FunctionDescriptor, FunctionRegistry, Implementation};
