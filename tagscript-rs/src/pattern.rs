//! Pattern matching for name filters: regex, glob and substring modes.
//!
//! Used by `$performer()` to select `performer:<role>` tags by role.
//!
//! ## Match modes
//!
//! | Mode | Written as | Description |
//! |------|------------|-------------|
//! | [`MatchMode::Regexp`] | `/re/` | [`regex`] crate search, case-sensitive |
//! | [`MatchMode::Glob`]   | contains `*`, `?` or `[` | whole-text glob, case-insensitive |
//! | [`MatchMode::Substr`] | anything else | case-sensitive substring search |

use regex::Regex;
use thiserror::Error;

// ── Public types ─────────────────────────────────────────────────────────────

/// Which matching algorithm a [`Pattern`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Regexp,
    Glob,
    Substr,
}

/// Error returned when a pattern cannot be compiled.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("regex error: {0}")]
    InvalidRegex(#[from] regex::Error),
    #[error("glob error: {0}")]
    InvalidGlob(String),
}

#[derive(Debug, Clone)]
enum Compiled {
    Regex(Regex),
    Glob(Regex),
    Substr,
}

/// A compiled pattern ready for matching.
#[derive(Debug, Clone)]
pub struct Pattern {
    src: String,
    mode: MatchMode,
    compiled: Compiled,
}

impl Pattern {
    /// Compile `src` using `mode`.
    pub fn new(src: &str, mode: MatchMode) -> Result<Self, PatternError> {
        let compiled = match mode {
            MatchMode::Regexp => Compiled::Regex(Regex::new(src)?),
            MatchMode::Glob => {
                let translated = glob_to_regex(src).map_err(PatternError::InvalidGlob)?;
                Compiled::Glob(Regex::new(&translated)?)
            }
            MatchMode::Substr => Compiled::Substr,
        };
        Ok(Self {
            src: src.to_owned(),
            mode,
            compiled,
        })
    }

    /// Compile a filter as a script user writes it, picking the mode from its
    /// shape: `/re/` is a regex, wildcards make a glob, the rest is a substring.
    pub fn from_filter(filter: &str) -> Result<Self, PatternError> {
        if let Some(re) = filter
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
        {
            return Self::new(re, MatchMode::Regexp);
        }
        if filter.contains(|c: char| matches!(c, '*' | '?' | '[')) {
            return Self::new(filter, MatchMode::Glob);
        }
        Self::new(filter, MatchMode::Substr)
    }

    /// The pattern text (without `/` delimiters for a regex filter).
    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Returns `true` if this pattern matches `text`.
    ///
    /// An empty pattern always matches.
    pub fn matches(&self, text: &str) -> bool {
        if self.src.is_empty() {
            return true;
        }
        match &self.compiled {
            Compiled::Regex(re) | Compiled::Glob(re) => re.is_match(text),
            Compiled::Substr => text.contains(self.src.as_str()),
        }
    }
}

// ── Glob translation ──────────────────────────────────────────────────────────
//
// Glob syntax:
//   *        any sequence of characters
//   ?        any single character
//   [...]    character class; [^...] negated; a-z ranges
//   \x       literal x
//   All matching is case-insensitive and covers the whole text.
//
// A glob is rewritten into an anchored regex when the pattern is built, so
// matching runs in time linear in the text however many `*` it holds.

/// Glob-match `pat` against the whole of `text`.  An invalid glob matches nothing.
pub fn glob_match(pat: &str, text: &str) -> bool {
    glob_to_regex(pat)
        .and_then(|re| Regex::new(&re).map_err(|e| e.to_string()))
        .is_ok_and(|re| re.is_match(text))
}

fn push_literal(out: &mut String, ch: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
}

/// Rewrite glob syntax as an equivalent `regex` pattern.
///
/// Fails when a `[` has no closing `]`.
pub fn glob_to_regex(pat: &str) -> Result<String, String> {
    let mut out = String::with_capacity(pat.len() * 2 + 8);
    out.push_str(r"(?is)\A");
    let mut chars = pat.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => match chars.next() {
                Some(lit) => push_literal(&mut out, lit),
                None => push_literal(&mut out, '\\'),
            },
            '[' => translate_class(&mut chars, &mut out)?,
            _ => push_literal(&mut out, ch),
        }
    }
    out.push_str(r"\z");
    Ok(out)
}

/// Translate a character class; `chars` starts after the opening `[`.
fn translate_class(chars: &mut std::str::Chars<'_>, out: &mut String) -> Result<(), String> {
    let mut members: Vec<char> = Vec::new();
    let mut escaped: Vec<bool> = Vec::new();
    let mut negated = false;
    let mut first = true;
    loop {
        match chars.next() {
            None => return Err("unmatched '['".into()),
            Some('^') if first => negated = true,
            Some(']') => break,
            Some('\\') => {
                members.push(chars.next().ok_or("unmatched '['")?);
                escaped.push(true);
            }
            Some(c) => {
                members.push(c);
                escaped.push(false);
            }
        }
        first = false;
    }

    if members.is_empty() {
        // `[]` matches nothing and `[^]` any one character.
        out.push_str(if negated { r"[\s\S]" } else { r"[^\s\S]" });
        return Ok(());
    }
    out.push('[');
    if negated {
        out.push('^');
    }
    let mut i = 0;
    while i < members.len() {
        let is_range = !escaped[i]
            && members.get(i + 1) == Some(&'-')
            && !escaped[i + 1]
            && i + 2 < members.len();
        if is_range && members[i] <= members[i + 2] {
            push_literal(out, members[i]);
            out.push('-');
            push_literal(out, members[i + 2]);
            i += 3;
        } else if is_range {
            // A reversed range like `z-a` contains nothing.
            i += 3;
        } else {
            push_literal(out, members[i]);
            i += 1;
        }
    }
    out.push(']');
    Ok(())
}

/// Validate glob syntax: every `[` needs a closing `]`.
pub fn check_glob(pat: &str) -> Result<(), String> {
    glob_to_regex(pat).map(|_| ())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
