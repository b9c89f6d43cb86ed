//! Multi-value helper used by the list built-ins.
//!
//! A [`MultiValue`] is an ordered list of strings plus the separator it was
//! split with.  Built from a lone `%tag%` with the default separator it takes
//! the tag's stored values directly; otherwise the argument is evaluated and
//! split.  Indexing and slicing follow sequence conventions: negative indexes
//! count from the end and out-of-range bounds clamp.

use std::fmt;
use std::ops::Range;

use super::ast::Expression;
use super::error::RuntimeError;
use super::eval::Evaluator;
use crate::tags::{normalize_tagname, TagContext, MULTI_VALUED_JOINER};

/// Map a possibly negative index onto `0..len`.
pub(crate) fn resolve_index(len: usize, index: i64) -> Option<usize> {
    if index < 0 {
        let back = usize::try_from(index.unsigned_abs()).ok()?;
        len.checked_sub(back)
    } else {
        usize::try_from(index).ok().filter(|&i| i < len)
    }
}

fn clamp_bound(len: usize, bound: i64) -> usize {
    if bound < 0 {
        let back = usize::try_from(bound.unsigned_abs()).unwrap_or(usize::MAX);
        len.saturating_sub(back)
    } else {
        usize::try_from(bound).map_or(len, |b| b.min(len))
    }
}

/// The range `[start:end]` selects from a sequence of `len` items.
pub(crate) fn slice_range(len: usize, start: Option<i64>, end: Option<i64>) -> Range<usize> {
    let start = start.map_or(0, |s| clamp_bound(len, s));
    let end = end.map_or(len, |e| clamp_bound(len, e));
    if start >= end {
        start..start
    } else {
        start..end
    }
}

/// Character-wise `[start:end]` of `text`.
pub(crate) fn char_slice(text: &str, start: Option<i64>, end: Option<i64>) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars[slice_range(chars.len(), start, end)].iter().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValue {
    values: Vec<String>,
    separator: String,
}

impl MultiValue {
    /// The stored values of a tag, separated by the default joiner.
    pub fn from_tag(tags: &TagContext, name: &str) -> Self {
        MultiValue {
            values: tags.get_all(&normalize_tagname(name)).to_vec(),
            separator: MULTI_VALUED_JOINER.to_owned(),
        }
    }

    /// Split `text` on `separator`, dropping empty pieces.
    ///
    /// An empty separator yields the whole text as one value.
    pub fn from_text(text: &str, separator: &str) -> Self {
        let values = if text.is_empty() {
            Vec::new()
        } else if separator.is_empty() {
            vec![text.to_owned()]
        } else {
            text.split(separator)
                .filter(|piece| !piece.is_empty())
                .map(str::to_owned)
                .collect()
        };
        MultiValue {
            values,
            separator: separator.to_owned(),
        }
    }

    /// Build from unevaluated `multi` and optional `separator` arguments.
    pub fn from_args(
        ev: &mut Evaluator<'_>,
        multi: &Expression,
        separator: Option<&Expression>,
    ) -> Result<Self, RuntimeError> {
        let separator = match separator {
            Some(expr) => ev.eval(expr)?,
            None => MULTI_VALUED_JOINER.to_owned(),
        };
        if separator == MULTI_VALUED_JOINER {
            if let Some(name) = multi.single_variable() {
                return Ok(Self::from_tag(ev.tags(), name));
            }
        }
        let text = ev.eval(multi)?;
        Ok(Self::from_text(&text, &separator))
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.values.iter().map(String::as_str)
    }

    /// Element at `index`; negative counts from the end.
    pub fn get(&self, index: i64) -> Option<&str> {
        resolve_index(self.len(), index).map(|i| self.values[i].as_str())
    }

    /// Replace the element at `index`.  Returns `false` when out of range.
    pub fn set(&mut self, index: i64, value: String) -> bool {
        match resolve_index(self.len(), index) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn slice(&self, start: Option<i64>, end: Option<i64>) -> &[String] {
        &self.values[slice_range(self.len(), start, end)]
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn replace_values(&mut self, values: Vec<String>) {
        self.values = values;
    }

    /// Store the non-empty elements in tag `name`.  No elements unsets it.
    pub fn to_tag_value(&self, tags: &mut TagContext, name: &str) {
        let values: Vec<String> = self
            .values
            .iter()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect();
        tags.set(&normalize_tagname(name), values);
    }
}

/// Non-empty elements joined with the separator.
impl fmt::Display for MultiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in self.values.iter().filter(|v| !v.is_empty()) {
            if !first {
                f.write_str(&self.separator)?;
            }
            f.write_str(value)?;
            first = false;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
