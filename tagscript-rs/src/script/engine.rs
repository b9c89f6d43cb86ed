//! Script engine: a function registry plus a parse cache.
//!
//! [`ScriptEngine::run`] is the single entry point hosts use: parse (or fetch
//! the cached tree), then evaluate against a tag context.  The engine is
//! `Send + Sync`; share one across threads and give each evaluation its own
//! tag context.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use super::ast::Expression;
use super::cache::ScriptCache;
use super::error::{ParseError, ScriptError};
use super::eval::Evaluator;
use super::registry::FunctionRegistry;
use crate::file::FileContext;
use crate::tags::TagContext;

pub struct ScriptEngine {
    registry: Cow<'static, FunctionRegistry>,
    cache: ScriptCache,
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine {
    /// An engine over the built-in function library.
    pub fn new() -> Self {
        ScriptEngine {
            registry: Cow::Borrowed(FunctionRegistry::global()),
            cache: ScriptCache::new(),
        }
    }

    /// An engine over a custom registry.
    pub fn with_registry(registry: FunctionRegistry) -> Self {
        ScriptEngine {
            registry: Cow::Owned(registry),
            cache: ScriptCache::new(),
        }
    }

    /// The process-wide engine used by [`evaluate`].
    pub fn global() -> &'static ScriptEngine {
        static GLOBAL: OnceLock<ScriptEngine> = OnceLock::new();
        GLOBAL.get_or_init(ScriptEngine::new)
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ScriptCache {
        &self.cache
    }

    /// Parse `source`, reusing a cached tree when there is one.
    pub fn parse(&self, source: &str) -> Result<Arc<Expression>, ParseError> {
        self.cache.get_or_parse(source, &self.registry)
    }

    /// Run `source` against `tags`.
    ///
    /// On a parse error `tags` is left untouched.  Runtime errors abort the
    /// script; tag changes made before the error are kept.
    pub fn run(
        &self,
        source: &str,
        tags: &mut TagContext,
        file: Option<&dyn FileContext>,
    ) -> Result<String, ScriptError> {
        let expr = self.parse(source)?;
        let mut evaluator = Evaluator::new(&self.registry, tags, file);
        Ok(evaluator.eval(&*expr)?)
    }
}

/// Run `source` on the global engine.
pub fn evaluate(
    source: &str,
    tags: &mut TagContext,
    file: Option<&dyn FileContext>,
) -> Result<String, ScriptError> {
    ScriptEngine::global().run(source, tags, file)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::error::RuntimeError;
    use crate::script::eval::EvalResult;
    use crate::script::registry::Arity;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_shareable() {
        assert_send_sync::<ScriptEngine>();
        assert_send_sync::<Expression>();
    }

    #[test]
    fn run_uses_cache() {
        let engine = ScriptEngine::new();
        let mut tags = TagContext::from_pairs([("title", "song")]);
        assert_eq!(engine.run("$upper(%title%)", &mut tags, None).unwrap(), "SONG");
        assert_eq!(engine.run("$upper(%title%)", &mut tags, None).unwrap(), "SONG");
        assert_eq!(engine.cache().len(), 1);
    }

    #[test]
    fn parse_error_leaves_tags_alone() {
        let mut tags = TagContext::from_pairs([("title", "x")]);
        let before = tags.clone();
        let err = evaluate("$set(title,y)$bogus()", &mut tags, None).unwrap_err();
        assert!(matches!(err, ScriptError::Parse(ParseError::UnknownFunction { .. })));
        assert_eq!(tags, before);
    }

    fn shout(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
        Ok(format!("{}!", args[0]))
    }

    #[test]
    fn custom_registry() {
        let mut registry = FunctionRegistry::new();
        registry.eager("shout", shout, Arity::exactly(1), "`$shout(text)`");
        let engine = ScriptEngine::with_registry(registry);
        let mut tags = TagContext::new();
        assert_eq!(engine.run("$shout(hi)", &mut tags, None).unwrap(), "hi!");
        assert!(engine.run("$upper(hi)", &mut tags, None).is_err());
    }

    #[test]
    fn runtime_error_surfaces() {
        let mut tags = TagContext::new();
        let err = evaluate(r"$datetime(\%Q)", &mut tags, None).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Runtime(RuntimeError::UnsupportedFormat { .. })
        ));
    }
}
