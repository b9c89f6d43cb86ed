use proptest::prelude::*;
use tagscript::pattern::{MatchMode, Pattern};
use tagscript::script::{evaluate, parse, FunctionRegistry};
use tagscript::tags::TagContext;

/// Backslash-escape every character the parser treats specially.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '$' | '%' | '(' | ')' | ',' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn run(src: &str) -> String {
    evaluate(src, &mut TagContext::new(), None).unwrap_or_else(|e| panic!("{src:?}: {e}"))
}

proptest! {
    /// The parser returns Ok or Err on any input; it never panics.
    #[test]
    fn parser_does_not_panic(s in "\\PC*") {
        let _ = parse(&s, FunctionRegistry::global());
    }

    /// Same, for inputs dense in syntax characters.
    #[test]
    fn parser_survives_syntax_soup(s in "[$%(),\\\\a-z0-9:_ ]{0,40}") {
        let _ = parse(&s, FunctionRegistry::global());
    }
}

proptest! {
    /// Text free of `$`, `%`, `\` and `(` evaluates to itself.
    #[test]
    fn literal_round_trip(s in "[^$%\\\\(]*") {
        prop_assert_eq!(run(&s), s);
    }

    /// Escaping any text makes it evaluate back to the original.
    #[test]
    fn escaped_text_round_trips(s in "\\PC*") {
        prop_assert_eq!(run(&escape(&s)), s);
    }
}

proptest! {
    /// `$len` counts characters, not bytes.
    #[test]
    fn len_counts_chars(s in "\\PC*") {
        let out = run(&format!("$len({})", escape(&s)));
        prop_assert_eq!(out, s.chars().count().to_string());
    }

    /// `$substr` always returns a contiguous piece of its input.
    #[test]
    fn substr_is_a_substring(s in "\\PC{0,30}", start in -40i64..40, end in -40i64..40) {
        let out = run(&format!("$substr({},{start},{end})", escape(&s)));
        prop_assert!(s.contains(&out), "{:?} not in {:?}", out, s);
        prop_assert!(out.chars().count() <= s.chars().count());
    }

    /// Integer addition matches Rust's, within range.
    #[test]
    fn add_matches_native(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        prop_assert_eq!(run(&format!("$add({a},{b})")), (a + b).to_string());
    }
}

proptest! {
    /// Empty pattern should match any input for all modes.
    #[test]
    fn empty_pattern_matches_all(s in "\\PC*") {
        for &mode in &[MatchMode::Regexp, MatchMode::Glob, MatchMode::Substr] {
            let p = Pattern::new("", mode).unwrap();
            prop_assert!(p.matches(&s));
        }
    }

    /// A lone `*` glob matches anything.
    #[test]
    fn star_glob_matches_all(s in "\\PC*") {
        prop_assert!(Pattern::from_filter("*").unwrap().matches(&s));
    }
}
