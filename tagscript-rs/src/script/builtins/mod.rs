//! Built-in function library.
//!
//! Each submodule registers one family of functions.  Eager functions get
//! their arguments as evaluated strings; lazy ones get the raw expressions and
//! decide what to evaluate (control flow, list functions that read a tag's
//! stored values directly).
//!
//! Conventions shared by the whole library:
//!
//! - "true" is any non-empty string; predicates return `"1"` or `""`.
//! - Integer arguments are trimmed and parsed as `i64`; a malformed number or
//!   an overflow makes the function return `""` rather than fail.

mod access;
mod context;
mod control;
mod date;
mod math;
mod multi;
mod text;

use super::registry::FunctionRegistry;

pub(crate) fn register_all(registry: &mut FunctionRegistry) {
    control::register(registry);
    access::register(registry);
    text::register(registry);
    math::register(registry);
    multi::register(registry);
    date::register(registry);
    context::register(registry);
}

fn truth(value: bool) -> String {
    if value {
        "1".to_owned()
    } else {
        String::new()
    }
}

/// Argument `index`, or `""` when the call supplied fewer.
fn arg(args: &[String], index: usize) -> &str {
    args.get(index).map_or("", String::as_str)
}

fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

#[cfg(test)]
fn run_with(
    src: &str,
    tags: &mut crate::tags::TagContext,
    file: Option<&dyn crate::file::FileContext>,
) -> super::eval::EvalResult {
    let registry = FunctionRegistry::global();
    let expr = super::parser::parse(src, registry).unwrap_or_else(|e| panic!("{src}: {e}"));
    super::eval::Evaluator::new(registry, tags, file).eval(&expr)
}

#[cfg(test)]
fn run(src: &str, tags: &mut crate::tags::TagContext) -> String {
    run_with(src, tags, None).unwrap_or_else(|e| panic!("{src}: {e}"))
}

/// Evaluate against an empty tag context.
#[cfg(test)]
fn eval(src: &str) -> String {
    run(src, &mut crate::tags::TagContext::new())
}
