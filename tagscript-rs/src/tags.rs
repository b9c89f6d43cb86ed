//! Multi-valued tag store.
//!
//! A [`TagContext`] is the record a script reads from and writes to: each tag
//! name maps to an ordered list of string values.  Names starting with `~` are
//! hidden (computed, never persisted).  Deleting a tag leaves a tombstone so the
//! save layer knows to strip it from the file.

use std::collections::{BTreeSet, HashMap};

/// Separator used when a multi-valued tag is read as a single string.
pub const MULTI_VALUED_JOINER: &str = "; ";

/// Prefix marking a hidden tag in its internal spelling.
pub const HIDDEN_PREFIX: char = '~';

/// Translate the user-facing spelling of a tag name into its internal form.
///
/// A leading `_` becomes `~`, so `%_length%` reads the hidden `~length` tag.
pub fn normalize_tagname(name: &str) -> String {
    match name.strip_prefix('_') {
        Some(rest) => format!("{HIDDEN_PREFIX}{rest}"),
        None => name.to_owned(),
    }
}

/// Returns `true` for hidden (`~`-prefixed) tag names.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_PREFIX)
}

// A trailing ':' names the same tag as the bare namespace (`comment:` == `comment`).
fn storage_key(name: &str) -> &str {
    name.trim_end_matches(':')
}

/// Ordered multi-valued tag map with deletion tombstones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagContext {
    values: HashMap<String, Vec<String>>,
    order: Vec<String>,
    deleted: BTreeSet<String>,
}

impl TagContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from `(name, value)` pairs; repeated names append.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut tags = Self::new();
        for (name, value) in pairs {
            tags.add(name.as_ref(), value);
        }
        tags
    }

    /// All values of `name` joined with [`MULTI_VALUED_JOINER`], or `None`
    /// when the tag is absent or has no values.
    pub fn get(&self, name: &str) -> Option<String> {
        let values = self.values.get(storage_key(name))?;
        if values.is_empty() {
            None
        } else {
            Some(values.join(MULTI_VALUED_JOINER))
        }
    }

    /// Like [`get`](Self::get) but returns `""` for a missing tag.
    pub fn get_or_empty(&self, name: &str) -> String {
        self.get(name).unwrap_or_default()
    }

    /// The ordered values of `name` (empty slice if absent).
    pub fn get_all(&self, name: &str) -> &[String] {
        self.values
            .get(storage_key(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replace the values of `name`.
    ///
    /// Values are stored as given.  An empty list removes the tag without
    /// leaving a tombstone; a non-empty list clears any tombstone.
    pub fn set(&mut self, name: &str, values: Vec<String>) {
        let key = storage_key(name);
        if values.is_empty() {
            self.unset(key);
            return;
        }
        self.deleted.remove(key);
        if !self.values.contains_key(key) {
            self.order.push(key.to_owned());
        }
        self.values.insert(key.to_owned(), values);
    }

    /// Set `name` to a single value.
    pub fn set_single(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, vec![value.into()]);
    }

    /// Append one value to `name`.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        let key = storage_key(name);
        self.deleted.remove(key);
        match self.values.get_mut(key) {
            Some(values) => values.push(value.into()),
            None => {
                self.order.push(key.to_owned());
                self.values.insert(key.to_owned(), vec![value.into()]);
            }
        }
    }

    /// Remove `name` without marking it deleted.  Returns `true` if it existed.
    pub fn unset(&mut self, name: &str) -> bool {
        let key = storage_key(name);
        let existed = self.values.remove(key).is_some();
        if existed {
            self.order.retain(|k| k != key);
        }
        existed
    }

    /// Remove `name` and record a tombstone for the save layer.
    pub fn delete(&mut self, name: &str) {
        let key = storage_key(name);
        self.unset(key);
        self.deleted.insert(key.to_owned());
    }

    /// Returns `true` if the tag is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(storage_key(name))
    }

    /// Tag names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Tag names that are written to storage (hidden tags excluded).
    pub fn persistent_keys(&self) -> impl Iterator<Item = &str> {
        self.keys().filter(|name| !is_hidden(name))
    }

    /// `(name, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.get_all(name)))
    }

    /// Tombstoned tag names, sorted.
    pub fn deleted_tags(&self) -> impl Iterator<Item = &str> {
        self.deleted.iter().map(String::as_str)
    }

    pub fn is_deleted(&self, name: &str) -> bool {
        self.deleted.contains(storage_key(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut tags = TagContext::new();
        tags.set_single("album", "Aerial");
        assert_eq!(tags.get("album").as_deref(), Some("Aerial"));
    }

    #[test]
    fn multi_values_join() {
        let mut tags = TagContext::new();
        tags.set("artist", vec!["A".into(), "B".into()]);
        assert_eq!(tags.get_or_empty("artist"), "A; B");
        assert_eq!(tags.get_all("artist"), ["A", "B"]);
    }

    #[test]
    fn missing_returns_none() {
        let tags = TagContext::new();
        assert_eq!(tags.get("nope"), None);
        assert_eq!(tags.get_or_empty("nope"), "");
        assert!(tags.get_all("nope").is_empty());
    }

    #[test]
    fn keys_keep_insertion_order() {
        let mut tags = TagContext::new();
        tags.set_single("b", "1");
        tags.set_single("a", "2");
        tags.set_single("b", "3");
        assert_eq!(tags.keys().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn unset_leaves_no_tombstone() {
        let mut tags = TagContext::new();
        tags.set_single("genre", "Rock");
        assert!(tags.unset("genre"));
        assert!(!tags.contains("genre"));
        assert!(!tags.is_deleted("genre"));
        assert!(!tags.unset("genre"));
    }

    #[test]
    fn delete_records_tombstone_until_set_again() {
        let mut tags = TagContext::new();
        tags.set_single("genre", "Rock");
        tags.delete("genre");
        assert!(!tags.contains("genre"));
        assert_eq!(tags.deleted_tags().collect::<Vec<_>>(), ["genre"]);
        tags.set_single("genre", "Pop");
        assert!(!tags.is_deleted("genre"));
    }

    #[test]
    fn empty_set_removes_tag() {
        let mut tags = TagContext::new();
        tags.set_single("x", "1");
        tags.set("x", Vec::new());
        assert!(tags.is_empty());
    }

    #[test]
    fn trailing_colon_is_ignored() {
        let mut tags = TagContext::new();
        tags.set_single("comment:", "hi");
        assert_eq!(tags.get("comment").as_deref(), Some("hi"));
    }

    #[test]
    fn hidden_names() {
        assert_eq!(normalize_tagname("_loop_count"), "~loop_count");
        assert_eq!(normalize_tagname("album"), "album");
        let tags = TagContext::from_pairs([("~length", "3:00"), ("title", "x")]);
        assert_eq!(tags.persistent_keys().collect::<Vec<_>>(), ["title"]);
        assert!(is_hidden("~length"));
    }

    #[test]
    fn from_pairs_appends_repeats() {
        let tags = TagContext::from_pairs([("artist", "A"), ("artist", "B")]);
        assert_eq!(tags.get_all("artist"), ["A", "B"]);
        assert_eq!(tags.len(), 1);
    }
}
