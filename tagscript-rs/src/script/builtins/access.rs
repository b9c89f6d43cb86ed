//! Tag access: `$get`, `$set`, `$unset`, `$delete`, `$copy`, `$copymerge`.

use crate::script::eval::{EvalResult, Evaluator};
use crate::script::registry::{Arity, FunctionRegistry};
use crate::tags::normalize_tagname;

use super::arg;

pub(super) fn register(r: &mut FunctionRegistry) {
    r.eager(
        "get",
        func_get,
        Arity::exactly(1),
        "`$get(name)`\n\nReturns the variable `name` (equivalent to `%name%`).",
    );
    r.eager(
        "set",
        func_set,
        Arity::exactly(2),
        "`$set(name,value)`\n\nSets the variable `name` to `value`. An empty value unsets it.",
    );
    r.eager(
        "unset",
        func_unset,
        Arity::exactly(1),
        "`$unset(name)`\n\n\
         Unsets the variable `name`. `name:*` unsets every tag in the namespace.",
    );
    r.eager(
        "delete",
        func_delete,
        Arity::exactly(1),
        "`$delete(name)`\n\n\
         Unsets the variable `name` and marks the tag for deletion from the file.",
    );
    r.eager(
        "copy",
        func_copy,
        Arity::exactly(2),
        "`$copy(new,old)`\n\nCopies all values of `old` into `new`, replacing them.",
    );
    r.eager(
        "copymerge",
        func_copymerge,
        Arity::between(2, 3),
        "`$copymerge(new,old,keep_duplicates=\"\")`\n\n\
         Appends the values of `old` to `new`. Duplicates are removed unless \
         `keep_duplicates` is set.",
    );
}

fn func_get(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(ev.variable(&args[0]))
}

fn func_set(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    ev.set_tag(&args[0], args[1].clone());
    Ok(String::new())
}

fn func_unset(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    ev.unset_tag(&args[0]);
    Ok(String::new())
}

fn func_delete(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    ev.tags_mut().delete(&normalize_tagname(&args[0]));
    Ok(String::new())
}

fn func_copy(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let values = ev.tags().get_all(&normalize_tagname(&args[1])).to_vec();
    ev.tags_mut().set(&normalize_tagname(&args[0]), values);
    Ok(String::new())
}

fn func_copymerge(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let new = normalize_tagname(&args[0]);
    let old = normalize_tagname(&args[1]);
    let keep_duplicates = !arg(args, 2).is_empty();

    let tags = ev.tags();
    let mut merged = tags.get_all(&new).to_vec();
    merged.extend_from_slice(tags.get_all(&old));
    if !keep_duplicates {
        let mut seen = std::collections::HashSet::new();
        merged.retain(|value| seen.insert(value.clone()));
    }
    ev.tags_mut().set(&new, merged);
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::super::run;
    use crate::tags::TagContext;

    #[test]
    fn get_and_set() {
        let mut tags = TagContext::new();
        assert_eq!(run("$set(album,X)$get(album)", &mut tags), "X");
        run("$set(_secret,1)", &mut tags);
        assert!(tags.contains("~secret"));
        run("$set(album,)", &mut tags);
        assert!(!tags.contains("album"));
    }

    #[test]
    fn set_replaces_multi_values() {
        let mut tags = TagContext::from_pairs([("artist", "A"), ("artist", "B")]);
        run("$set(artist,C)", &mut tags);
        assert_eq!(tags.get_all("artist"), ["C"]);
    }

    #[test]
    fn unset_single_and_namespace() {
        let mut tags = TagContext::from_pairs([
            ("performer:guitar", "A"),
            ("performer:drums", "B"),
            ("performer", "C"),
            ("title", "T"),
        ]);
        run("$unset(title)", &mut tags);
        assert!(!tags.contains("title"));
        assert!(!tags.is_deleted("title"));

        run("$unset(performer:*)", &mut tags);
        assert!(!tags.contains("performer:guitar"));
        assert!(!tags.contains("performer:drums"));
        assert!(tags.contains("performer"));
    }

    #[test]
    fn set_empty_clears_a_namespace() {
        let mut tags = TagContext::from_pairs([
            ("performer:guitar", "A"),
            ("performer:drums", "B"),
            ("title", "T"),
        ]);
        run("$set(performer:*,)", &mut tags);
        assert!(!tags.contains("performer:guitar"));
        assert!(!tags.contains("performer:drums"));
        assert!(!tags.contains("performer:*"));
        assert_eq!(tags.get_or_empty("title"), "T");
    }

    #[test]
    fn delete_leaves_tombstone() {
        let mut tags = TagContext::from_pairs([("comment", "x")]);
        run("$delete(comment)", &mut tags);
        assert!(!tags.contains("comment"));
        assert!(tags.is_deleted("comment"));
    }

    #[test]
    fn copy_all_values() {
        let mut tags = TagContext::from_pairs([("artist", "A"), ("artist", "B")]);
        run("$copy(albumartist,artist)", &mut tags);
        assert_eq!(tags.get_all("albumartist"), ["A", "B"]);

        run("$copy(albumartist,missing)", &mut tags);
        assert!(!tags.contains("albumartist"));
    }

    #[test]
    fn copymerge_dedupes_unless_asked() {
        let mut tags = TagContext::from_pairs([
            ("genre", "rock"),
            ("style", "pop"),
            ("style", "rock"),
        ]);
        run("$copymerge(genre,style)", &mut tags);
        assert_eq!(tags.get_all("genre"), ["rock", "pop"]);

        let mut tags = TagContext::from_pairs([("genre", "rock"), ("style", "rock")]);
        run("$copymerge(genre,style,1)", &mut tags);
        assert_eq!(tags.get_all("genre"), ["rock", "rock"]);
    }
}
