//! String functions.
//!
//! Lengths, positions and slices count Unicode code points.  Regex functions
//! use the `regex` crate syntax; a pattern that fails to compile degrades to
//! the documented fallback instead of aborting the script.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::script::eval::{EvalResult, Evaluator};
use crate::script::multi::{char_slice, resolve_index};
use crate::script::registry::{Arity, FunctionRegistry};

use super::{arg, parse_int, truth};

/// Largest padding `$pad` will build, in bytes.
const MAX_PAD_BYTES: usize = 64 * 1024;

pub(super) fn register(r: &mut FunctionRegistry) {
    // ── Slicing ──────────────────────────────────────────────────────────────
    r.eager(
        "left",
        func_left,
        Arity::exactly(2),
        "`$left(text,number)`\n\nReturns the first `number` characters from `text`.",
    );
    r.eager(
        "right",
        func_right,
        Arity::exactly(2),
        "`$right(text,number)`\n\nReturns the last `number` characters from `text`.",
    );
    r.eager(
        "substr",
        func_substr,
        Arity::exactly(3),
        "`$substr(text,start,end)`\n\n\
         Returns the characters from `start` up to (excluding) `end`. Negative \
         indexes count from the end; a blank index means the start or end of `text`.",
    );
    r.eager(
        "firstwords",
        func_firstwords,
        Arity::exactly(2),
        "`$firstwords(text,length)`\n\n\
         Like `$truncate()` but only returns whole words.",
    );
    r.eager(
        "truncate",
        func_truncate,
        Arity::exactly(2),
        "`$truncate(text,length)`\n\n\
         Truncates `text` to `length` characters and strips trailing whitespace.",
    );

    // ── Case and whitespace ──────────────────────────────────────────────────
    r.eager(
        "lower",
        func_lower,
        Arity::exactly(1),
        "`$lower(text)`\n\nReturns `text` in lower case.",
    );
    r.eager(
        "upper",
        func_upper,
        Arity::exactly(1),
        "`$upper(text)`\n\nReturns `text` in upper case.",
    );
    r.eager(
        "title",
        func_title,
        Arity::exactly(1),
        "`$title(text)`\n\nCapitalizes the first character of every word in `text`.",
    );
    r.eager(
        "strip",
        func_strip,
        Arity::exactly(1),
        "`$strip(text)`\n\n\
         Replaces all whitespace runs in `text` with a single space and removes \
         leading and trailing whitespace.",
    );
    r.eager(
        "trim",
        func_trim,
        Arity::between(1, 2),
        "`$trim(text,char)`\n\n\
         Trims leading and trailing whitespace from `text`. If `char` is given, \
         any of its characters are trimmed instead.",
    );
    r.eager(
        "pad",
        func_pad,
        Arity::exactly(3),
        "`$pad(text,length,char)`\n\n\
         Pads `text` on the left with `char` repeated up to `length` characters.\n\
         Returns an empty string if the padding would exceed 64 KiB.",
    );
    r.eager(
        "num",
        func_num,
        Arity::exactly(2),
        "`$num(number,length)`\n\n\
         Returns `number` zero-padded to `length` digits (at most 20).",
    );

    // ── Search and replace ───────────────────────────────────────────────────
    r.eager(
        "replace",
        func_replace,
        Arity::exactly(3),
        "`$replace(text,search,replace)`\n\nReplaces every `search` in `text` with `replace`.",
    );
    r.eager(
        "rreplace",
        func_rreplace,
        Arity::exactly(3),
        "`$rreplace(text,pattern,replace)`\n\n\
         Replaces every match of the regular expression `pattern` with `replace`. \
         `\\1` and `\\g<name>` refer to captured groups.",
    );
    r.eager(
        "rsearch",
        func_rsearch,
        Arity::exactly(2),
        "`$rsearch(text,pattern)`\n\n\
         Searches `text` for the regular expression `pattern`. Returns the first \
         captured group, or the whole match when the pattern has no groups.",
    );
    r.eager(
        "find",
        func_find,
        Arity::exactly(2),
        "`$find(haystack,needle)`\n\n\
         Returns the 0-based position of `needle` in `haystack`, or empty if absent.",
    );
    r.eager(
        "startswith",
        func_startswith,
        Arity::exactly(2),
        "`$startswith(text,prefix)`\n\nReturns true if `text` starts with `prefix`.",
    );
    r.eager(
        "endswith",
        func_endswith,
        Arity::exactly(2),
        "`$endswith(text,suffix)`\n\nReturns true if `text` ends with `suffix`.",
    );

    // ── Miscellaneous ────────────────────────────────────────────────────────
    r.eager(
        "len",
        func_len,
        Arity::between(0, 1),
        "`$len(text)`\n\nReturns the number of characters in `text`.",
    );
    r.eager(
        "reverse",
        func_reverse,
        Arity::exactly(1),
        "`$reverse(text)`\n\nReturns `text` in reverse order.",
    );
    r.eager(
        "swapprefix",
        func_swapprefix,
        Arity::at_least(1),
        "`$swapprefix(text,prefix1,prefix2,...)`\n\n\
         Moves a leading prefix to the end: `The Beatles` becomes `Beatles, The`. \
         Without prefixes `A` and `The` are used.",
    );
    r.eager(
        "delprefix",
        func_delprefix,
        Arity::at_least(1),
        "`$delprefix(text,prefix1,prefix2,...)`\n\n\
         Deletes a leading prefix from `text`. Without prefixes `A` and `The` are used.",
    );
    r.eager(
        "firstalphachar",
        func_firstalphachar,
        Arity::between(0, 2),
        "`$firstalphachar(text,nonalpha=\"#\")`\n\n\
         Returns the first character of `text` in upper case, or `nonalpha` if it \
         is not a letter.",
    );
    r.eager(
        "initials",
        func_initials,
        Arity::between(0, 1),
        "`$initials(text)`\n\nReturns the first letter of each word in `text`.",
    );
}

fn func_left(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(parse_int(&args[1]).map_or_else(String::new, |n| char_slice(&args[0], None, Some(n))))
}

fn func_right(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(parse_int(&args[1]).map_or_else(String::new, |n| {
        char_slice(&args[0], Some(n.saturating_neg()), None)
    }))
}

fn func_substr(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let bound = |s: &str| if s.is_empty() { None } else { parse_int(s) };
    Ok(char_slice(&args[0], bound(&args[1]), bound(&args[2])))
}

fn func_firstwords(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let text = &args[0];
    let length = parse_int(&args[1]).unwrap_or(0);
    let chars: Vec<char> = text.chars().collect();
    if i64::try_from(chars.len()).map_or(false, |len| len <= length) {
        return Ok(text.clone());
    }
    let Some(at) = resolve_index(chars.len(), length) else {
        return Ok(String::new());
    };
    let head = char_slice(text, None, Some(length));
    if chars[at] == ' ' {
        return Ok(head);
    }
    Ok(match head.rsplit_once(' ') {
        Some((words, _)) => words.to_owned(),
        None => head,
    })
}

fn func_truncate(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let end = parse_int(&args[1]);
    Ok(char_slice(&args[0], None, end).trim_end().to_owned())
}

fn func_lower(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(args[0].to_lowercase())
}

fn func_upper(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(args[0].to_uppercase())
}

// Space separators, modifier symbols and punctuation.
fn is_word_boundary(ch: char) -> bool {
    static BOUNDARY: OnceLock<Option<Regex>> = OnceLock::new();
    match BOUNDARY.get_or_init(|| Regex::new(r"^[\p{Zs}\p{Sk}\p{P}]$").ok()) {
        Some(re) => {
            let mut buf = [0u8; 4];
            re.is_match(ch.encode_utf8(&mut buf))
        }
        None => ch.is_whitespace() || ch.is_ascii_punctuation(),
    }
}

/// Upper-case the first letter after each space, punctuation or modifier
/// symbol.  An apostrophe directly after a letter does not start a word, so
/// `don't` stays intact.  Other letters are left as they are.
pub(crate) fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out: String = first.to_uppercase().collect();
    let mut prev = first;
    let mut capital = false;
    for ch in chars {
        if (ch == '\'' || ch == '\u{2019}') && prev.is_alphabetic() {
            capital = false;
            out.push(ch);
        } else if is_word_boundary(ch) {
            capital = true;
            out.push(ch);
        } else if capital && ch.is_alphabetic() {
            capital = false;
            out.extend(ch.to_uppercase());
        } else {
            capital = false;
            out.push(ch);
        }
        prev = ch;
    }
    out
}

fn func_title(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(title_case(&args[0]))
}

fn func_strip(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(args[0].split_whitespace().collect::<Vec<_>>().join(" "))
}

fn func_trim(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let chars = arg(args, 1);
    if chars.is_empty() {
        Ok(args[0].trim().to_owned())
    } else {
        Ok(args[0].trim_matches(|c: char| chars.contains(c)).to_owned())
    }
}

fn func_pad(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let Some(length) = parse_int(&args[1]) else {
        return Ok(String::new());
    };
    let text = &args[0];
    let current = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
    let missing = usize::try_from(length.saturating_sub(current)).unwrap_or(0);
    let fits = args[2]
        .len()
        .checked_mul(missing)
        .is_some_and(|bytes| bytes <= MAX_PAD_BYTES);
    if !fits {
        return Ok(String::new());
    }
    let mut out = args[2].repeat(missing);
    out.push_str(text);
    Ok(out)
}

fn func_num(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let Some(length) = parse_int(&args[1]) else {
        return Ok(String::new());
    };
    let width = length.clamp(0, 20) as usize;
    let value = parse_int(&args[0]).unwrap_or(0);
    Ok(format!("{value:0width$}"))
}

fn func_replace(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(args[0].replace(&args[1], &args[2]))
}

/// Rewrite a `\1` / `\g<name>` style replacement into `regex` syntax.
fn translate_replacement(repl: &str) -> String {
    let mut out = String::with_capacity(repl.len());
    let mut chars = repl.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    let mut group = String::new();
                    while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                        if group.len() == 2 {
                            break;
                        }
                        group.push(d);
                        chars.next();
                    }
                    out.push_str(&format!("${{{group}}}"));
                }
                Some('g') => {
                    chars.next();
                    if chars.peek() == Some(&'<') {
                        chars.next();
                        let name: String = chars.by_ref().take_while(|&c| c != '>').collect();
                        out.push_str(&format!("${{{name}}}"));
                    } else {
                        out.push_str("\\g");
                    }
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            _ => out.push(ch),
        }
    }
    out
}

fn func_rreplace(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let text = &args[0];
    match Regex::new(&args[1]) {
        Ok(re) => {
            let repl = translate_replacement(&args[2]);
            Ok(re.replace_all(text, repl.as_str()).into_owned())
        }
        Err(err) => {
            debug!(pattern = %args[1], %err, "$rreplace: invalid pattern");
            Ok(text.clone())
        }
    }
}

fn func_rsearch(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let re = match Regex::new(&args[1]) {
        Ok(re) => re,
        Err(err) => {
            debug!(pattern = %args[1], %err, "$rsearch: invalid pattern");
            return Ok(String::new());
        }
    };
    let Some(caps) = re.captures(&args[0]) else {
        return Ok(String::new());
    };
    let group = if caps.len() > 1 { caps.get(1) } else { caps.get(0) };
    Ok(group.map_or_else(String::new, |m| m.as_str().to_owned()))
}

fn func_find(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let (haystack, needle) = (&args[0], &args[1]);
    Ok(haystack
        .find(needle.as_str())
        .map_or_else(String::new, |byte| haystack[..byte].chars().count().to_string()))
}

fn func_startswith(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args[0].starts_with(args[1].as_str())))
}

fn func_endswith(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args[0].ends_with(args[1].as_str())))
}

fn func_len(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(arg(args, 0).chars().count().to_string())
}

fn func_reverse(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(args[0].chars().rev().collect())
}

/// Split a leading prefix off `text`.  Returns `(rest, prefix)`; the prefix is
/// empty when none matched.
fn delete_prefix<'t>(text: &'t str, prefixes: &[String]) -> (&'t str, &'t str) {
    let text = text.trim();
    let alternatives: Vec<String> = if prefixes.is_empty() {
        vec![r"A\s+".to_owned(), r"The\s+".to_owned()]
    } else {
        prefixes
            .iter()
            .map(|p| format!(r"{}\s+", regex::escape(p)))
            .collect()
    };
    let Ok(re) = Regex::new(&format!("^(?:{})", alternatives.join("|"))) else {
        return (text, "");
    };
    match re.find(text) {
        Some(m) => (&text[m.end()..], m.as_str().trim()),
        None => (text, ""),
    }
}

fn func_swapprefix(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let (rest, prefix) = delete_prefix(&args[0], &args[1..]);
    if prefix.is_empty() {
        Ok(rest.to_owned())
    } else {
        Ok(format!("{rest}, {prefix}"))
    }
}

fn func_delprefix(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(delete_prefix(&args[0], &args[1..]).0.to_owned())
}

fn func_firstalphachar(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let nonalpha = if args.len() > 1 { args[1].as_str() } else { "#" };
    match arg(args, 0).chars().next() {
        Some(first) if first.is_alphabetic() => Ok(first.to_uppercase().collect()),
        _ => Ok(nonalpha.to_owned()),
    }
}

fn func_initials(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(arg(args, 0)
        .split(' ')
        .filter_map(|word| word.chars().next())
        .filter(|c| c.is_alphabetic())
        .collect())
}
