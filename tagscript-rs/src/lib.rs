//! tagscript: the tagger scripting language.
//!
//! Scripts mix literal text, `%tag%` variables and `$function(args)` calls and
//! rewrite a file's tags:
//!
//! ```rust
//! use tagscript::script::evaluate;
//! use tagscript::tags::TagContext;
//!
//! let mut tags = TagContext::from_pairs([("artist", "queen")]);
//! let out = evaluate("$set(artist,$title(%artist%))%artist%", &mut tags, None).unwrap();
//! assert_eq!(out, "Queen");
//! assert_eq!(tags.get("artist").as_deref(), Some("Queen"));
//! ```

pub mod cli;
pub mod config;
pub mod file;
pub mod pattern;
pub mod script;
pub mod tags;
