//! `.tagscriptrc` configuration file parser.
//!
//! One directive per line:
//!
//! | Directive | Action |
//! |-----------|--------|
//! | `/set <tag>=<value>` or `/set <tag> <value>` | seed a tag with one value |
//! | `/add <tag>=<value>` or `/add <tag> <value>` | append a value to a tag |
//! | `/script <name>=<source>` | define a named script preset |
//! | Lines starting with `;` | comment, ignored |
//! | Any other `/command` | silently skipped |
//!
//! Script sources are taken verbatim after the first `=`, so they may contain
//! spaces, commas and further `=` signs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

use crate::tags::{normalize_tagname, TagContext};

/// File name searched for in the home and current directories.
pub const RC_FILE_NAME: &str = ".tagscriptrc";

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

/// Seed tags and named script presets.
#[derive(Debug, Default)]
pub struct Config {
    pub tags: TagContext,
    pub scripts: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config string.
    ///
    /// Returns the config and a list of any errors on recognised lines; a bad
    /// line is skipped and the rest still load.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let Some(rest) = line.strip_prefix('/') else { continue };

            let (cmd, args) = rest
                .split_once(|c: char| c.is_ascii_whitespace())
                .unwrap_or((rest, ""));
            let args = args.trim();

            let result = match cmd {
                "set" => split_assignment(cmd, args).map(|(name, value)| {
                    config.tags.set_single(&normalize_tagname(name), value);
                }),
                "add" => split_assignment(cmd, args).map(|(name, value)| {
                    config.tags.add(&normalize_tagname(name), value);
                }),
                "script" => parse_script(args).map(|(name, source)| {
                    config.scripts.insert(name.to_owned(), source.to_owned());
                }),
                _ => Ok(()),
            };
            if let Err(message) = result {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        (config, errors)
    }

    /// Read and parse a config file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    /// Source of the preset called `name`.
    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }
}

// ── Directives ────────────────────────────────────────────────────────────────

/// Split `<name>=<value>` or `<name> <value>`.
fn split_assignment<'a>(cmd: &str, args: &'a str) -> Result<(&'a str, &'a str), String> {
    if args.is_empty() {
        return Err(format!("/{cmd}: requires an argument"));
    }
    let (name, value) = match args.split_once('=') {
        Some((name, value)) if !name.contains(char::is_whitespace) => (name, value),
        _ => match args.split_once(char::is_whitespace) {
            Some((name, value)) => (name, value.trim_start()),
            None => return Err(format!("/{cmd}: missing value for '{args}'")),
        },
    };
    if name.is_empty() {
        return Err(format!("/{cmd}: tag name cannot be empty"));
    }
    Ok((name, value))
}

/// Parse `/script <name>=<source>`.
fn parse_script(args: &str) -> Result<(&str, &str), String> {
    let Some((name, source)) = args.split_once('=') else {
        return Err("/script: expected <name>=<source>".into());
    };
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(format!("/script: invalid preset name '{name}'"));
    }
    Ok((name, source))
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the user config file: `~/.tagscriptrc`, then `./.tagscriptrc`.
/// Returns the first path that exists, or `None`.
pub fn find_user_config() -> Option<PathBuf> {
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().join(RC_FILE_NAME));
    home.into_iter()
        .chain(std::iter::once(PathBuf::from(".").join(RC_FILE_NAME)))
        .find(|p| p.is_file())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // -- /set and /add --------------------------------------------------------

    #[test]
    fn set_equals_syntax() {
        let (cfg, errs) = Config::load_str("/set artist=Queen");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.tags.get("artist").as_deref(), Some("Queen"));
    }

    #[test]
    fn set_space_syntax() {
        let (cfg, errs) = Config::load_str("/set title Bohemian Rhapsody");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.tags.get("title").as_deref(), Some("Bohemian Rhapsody"));
    }

    #[test]
    fn set_replaces_add_appends() {
        let (cfg, errs) = Config::load_str(
            "/set genre=Rock\n\
             /add genre=Pop\n\
             /set album=A\n\
             /set album=B",
        );
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.tags.get_all("genre"), ["Rock", "Pop"]);
        assert_eq!(cfg.tags.get_all("album"), ["B"]);
    }

    #[test]
    fn hidden_tags_use_underscore() {
        let (cfg, _) = Config::load_str("/set _video=1");
        assert!(cfg.tags.contains("~video"));
    }

    #[test]
    fn set_without_value_is_error() {
        let (_, errs) = Config::load_str("\n/set lonely");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].line, 2);
        assert_eq!(errs[0].to_string(), "line 2: /set: missing value for 'lonely'");
    }

    // -- /script --------------------------------------------------------------

    #[test]
    fn script_keeps_source_verbatim() {
        let (cfg, errs) =
            Config::load_str("/script disc=$if($gt(%totaldiscs%,1),%album% (Disc %discnumber%))");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(
            cfg.script("disc"),
            Some("$if($gt(%totaldiscs%,1),%album% (Disc %discnumber%))")
        );
    }

    #[test]
    fn script_needs_name() {
        let (_, errs) = Config::load_str("/script =$noop()\n/script no equals");
        assert_eq!(errs.len(), 2);
    }

    // -- Comments & skipping --------------------------------------------------

    #[test]
    fn comments_and_unknown_directives_skipped() {
        let (cfg, errs) = Config::load_str(
            ";; presets\n\
             ; another\n\
             /bind ^X = nothing\n\
             plain text\n\
             /set loaded=yes",
        );
        assert!(errs.is_empty(), "{errs:?}");
        assert!(cfg.tags.contains("loaded"));
        assert_eq!(cfg.tags.len(), 1);
    }

    #[test]
    fn load_file_reads_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "/set artist=Queen\n/script up=$upper(%artist%)").unwrap();
        let (cfg, errs) = Config::load_file(f.path()).unwrap();
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.script("up"), Some("$upper(%artist%)"));
    }

    #[test]
    fn load_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_file(&dir.path().join("absent")).is_err());
    }
}
