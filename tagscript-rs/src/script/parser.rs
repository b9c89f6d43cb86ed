//! Recursive-descent script parser.
//!
//! Grammar:
//!
//! ```text
//! script     := expression(top)
//! expression := (variable | function | text)*
//! variable   := '%' identifier (':' identifier?)? '%'
//! function   := '$' identifier '(' (argument (',' argument)*)? ')'
//! argument   := expression(nested)
//! text       := run of characters up to '$' or '%' (and, when nested, ',' or ')')
//! ```
//!
//! Escapes in text: `\$ \% \( \) \, \\`, `\n`, `\t` and `\uXXXX`.
//!
//! An unescaped `(` is rejected at the top level.  Inside an argument it opens
//! a literal group: everything up to the matching `)` is kept as text (commas
//! included), so `$set(album,%album% (disc 1))` keeps its parentheses.
//!
//! Function names are resolved against the [`FunctionRegistry`] while parsing,
//! and argument counts are checked as each call is built.
//!
//! Calls may nest at most [`MAX_NESTING_DEPTH`] deep.  Both parsing and
//! evaluation recurse once per level, so the limit also bounds the stack the
//! evaluator needs.

use super::ast::{Expression, FunctionCall, Node};
use super::error::{ParseError, Position};
use super::reader::Reader;
use super::registry::FunctionRegistry;

/// Deepest allowed nesting of function calls.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parse `src` into an expression tree.
pub fn parse(src: &str, registry: &FunctionRegistry) -> Result<Expression, ParseError> {
    let mut parser = Parser {
        reader: Reader::new(src),
        registry,
        depth: 0,
    };
    let (expr, _) = parser.parse_expression(true)?;
    Ok(expr)
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

struct Parser<'r> {
    reader: Reader,
    registry: &'r FunctionRegistry,
    /// Calls currently open around the reader position.
    depth: usize,
}

impl Parser<'_> {
    /// Parse until end of input (`top`) or an argument terminator.
    ///
    /// Returns the expression and the terminator that ended it (`,` or `)`),
    /// or `None` at end of a top-level script.
    fn parse_expression(&mut self, top: bool) -> Result<(Expression, Option<char>), ParseError> {
        let mut expr = Expression::new();
        // Open literal '(' groups in this argument.
        let mut depth = 0usize;
        loop {
            let start = self.reader.position();
            match self.reader.advance() {
                None if top => return Ok((expr, None)),
                None => return Err(ParseError::UnexpectedEndOfInput { position: start }),
                Some(ch @ (',' | ')')) if !top && depth == 0 => return Ok((expr, Some(ch))),
                Some('$') => {
                    let call = self.parse_function(start)?;
                    expr.push(Node::Call(call));
                }
                Some('%') => {
                    let name = self.parse_variable()?;
                    expr.push(Node::Variable(name));
                }
                Some(_) => {
                    self.reader.pushback();
                    let text = self.parse_text(top, &mut depth)?;
                    expr.push(Node::Literal(text));
                }
            }
        }
    }

    fn parse_text(&mut self, top: bool, depth: &mut usize) -> Result<String, ParseError> {
        let mut text = String::new();
        loop {
            let at = self.reader.position();
            match self.reader.advance() {
                None => break,
                Some('\\') => text.push(self.parse_escape()?),
                Some('(') if top => {
                    return Err(ParseError::UnexpectedCharacter { ch: '(', position: at });
                }
                Some('(') => {
                    *depth += 1;
                    text.push('(');
                }
                Some(')') if !top && *depth > 0 => {
                    *depth -= 1;
                    text.push(')');
                }
                Some('$' | '%') => {
                    self.reader.pushback();
                    break;
                }
                Some(',' | ')') if !top && *depth == 0 => {
                    self.reader.pushback();
                    break;
                }
                Some(ch) => text.push(ch),
            }
        }
        Ok(text)
    }

    /// Parse the character(s) after a backslash.
    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let at = self.reader.position();
        match self.reader.advance() {
            None => Err(ParseError::UnexpectedEndOfInput { position: at }),
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('u') => self.parse_unicode_escape(),
            Some(ch @ ('$' | '%' | '(' | ')' | ',' | '\\')) => Ok(ch),
            Some(ch) => Err(ParseError::UnexpectedCharacter { ch, position: at }),
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let at = self.reader.position();
        let mut hex = String::with_capacity(4);
        for _ in 0..4 {
            let pos = self.reader.position();
            match self.reader.advance() {
                Some(ch) => hex.push(ch),
                None => return Err(ParseError::UnexpectedEndOfInput { position: pos }),
            }
        }
        let decoded = if hex.chars().all(|c| c.is_ascii_hexdigit()) {
            u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
        } else {
            None
        };
        decoded.ok_or(ParseError::InvalidUnicodeEscape { text: hex, position: at })
    }

    /// Parse `name(args…)` after the `$` found at `start`.
    fn parse_function(&mut self, start: Position) -> Result<FunctionCall, ParseError> {
        let mut name = String::new();
        loop {
            let at = self.reader.position();
            match self.reader.advance() {
                Some('(') => break,
                Some(ch) if is_identifier_char(ch) => name.push(ch),
                Some(ch) => return Err(ParseError::UnexpectedCharacter { ch, position: at }),
                None => return Err(ParseError::UnexpectedEndOfInput { position: at }),
            }
        }

        let arity = match self.registry.lookup(&name) {
            Some(descriptor) => descriptor.arity(),
            None => return Err(ParseError::UnknownFunction { name, position: start }),
        };

        if self.depth == MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                name,
                limit: MAX_NESTING_DEPTH,
                position: start,
            });
        }
        self.depth += 1;
        let args = self.parse_arguments();
        self.depth -= 1;
        let args = args?;
        if !arity.accepts(args.len()) {
            return Err(ParseError::ArityMismatch {
                name,
                expected: arity,
                actual: args.len(),
                position: start,
            });
        }
        Ok(FunctionCall::new(name, args, start))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut args = Vec::new();
        loop {
            let (arg, terminator) = self.parse_expression(false)?;
            args.push(arg);
            if terminator == Some(')') {
                break;
            }
        }
        // `$f()` is a call with no arguments, not one empty argument.
        if args.len() == 1 && args[0].is_empty() {
            args.clear();
        }
        Ok(args)
    }

    /// Parse a variable name up to the closing `%`.
    fn parse_variable(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        let mut namespaced = false;
        loop {
            let at = self.reader.position();
            match self.reader.advance() {
                Some('%') => return Ok(name),
                Some(':') if !namespaced => {
                    namespaced = true;
                    name.push(':');
                }
                Some(ch) if is_identifier_char(ch) => name.push(ch),
                Some(ch) => return Err(ParseError::UnexpectedCharacter { ch, position: at }),
                None => return Err(ParseError::UnexpectedEndOfInput { position: at }),
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::registry::Arity;

    fn parse_ok(src: &str) -> Expression {
        parse(src, FunctionRegistry::global()).unwrap_or_else(|e| panic!("{src}: {e}"))
    }

    fn parse_err(src: &str) -> ParseError {
        parse(src, FunctionRegistry::global()).expect_err(src)
    }

    fn pos(line: usize, column: usize, offset: usize) -> Position {
        Position { line, column, offset }
    }

    fn lit(s: &str) -> Node {
        Node::Literal(s.into())
    }

    #[test]
    fn plain_text() {
        assert_eq!(parse_ok("hello world").nodes(), [lit("hello world")]);
    }

    #[test]
    fn empty_script() {
        assert!(parse_ok("").is_empty());
    }

    #[test]
    fn variables_split_text() {
        let e = parse_ok("a%artist%b");
        assert_eq!(
            e.nodes(),
            [lit("a"), Node::Variable("artist".into()), lit("b")]
        );
    }

    #[test]
    fn namespaced_variable() {
        let e = parse_ok("%performer:guitar%");
        assert_eq!(e.single_variable(), Some("performer:guitar"));
    }

    #[test]
    fn second_colon_rejected() {
        assert_eq!(
            parse_err("%a:b:c%"),
            ParseError::UnexpectedCharacter { ch: ':', position: pos(1, 5, 4) }
        );
    }

    #[test]
    fn function_with_arguments() {
        let e = parse_ok("$if(%x%,yes,no)");
        let [Node::Call(call)] = e.nodes() else {
            panic!("expected single call: {e:?}");
        };
        assert_eq!(call.name(), "if");
        assert_eq!(call.args().len(), 3);
        assert_eq!(call.args()[1].nodes(), [lit("yes")]);
        assert_eq!(call.position(), Position::START);
    }

    #[test]
    fn empty_parens_mean_no_arguments() {
        let e = parse_ok("$noop()");
        let [Node::Call(call)] = e.nodes() else { panic!() };
        assert!(call.args().is_empty());

        let e = parse_ok("$noop(,)");
        let [Node::Call(call)] = e.nodes() else { panic!() };
        assert_eq!(call.args().len(), 2);
    }

    #[test]
    fn nested_calls() {
        let e = parse_ok("$upper($left(%title%,3))x");
        assert_eq!(e.nodes().len(), 2);
    }

    #[test]
    fn escapes() {
        assert_eq!(parse_ok(r"\$\%\(\)\,\\").nodes(), [lit("$%(),\\")]);
        assert_eq!(parse_ok(r"a\nb\tc").nodes(), [lit("a\nb\tc")]);
        assert_eq!(parse_ok(r"café").nodes(), [lit("café")]);
    }

    #[test]
    fn bad_escape() {
        assert_eq!(
            parse_err(r"ab\x"),
            ParseError::UnexpectedCharacter { ch: 'x', position: pos(1, 4, 3) }
        );
        assert!(matches!(parse_err("\\"), ParseError::UnexpectedEndOfInput { .. }));
        assert!(matches!(
            parse_err(r"\u12g4"),
            ParseError::InvalidUnicodeEscape { ref text, .. } if text == "12g4"
        ));
        assert!(matches!(parse_err(r"\u12"), ParseError::UnexpectedEndOfInput { .. }));
    }

    #[test]
    fn top_level_comma_and_close_are_text() {
        assert_eq!(parse_ok("a, b)").nodes(), [lit("a, b)")]);
    }

    #[test]
    fn top_level_open_paren_rejected() {
        assert_eq!(
            parse_err("abc(def"),
            ParseError::UnexpectedCharacter { ch: '(', position: pos(1, 4, 3) }
        );
    }

    #[test]
    fn parenthesised_group_inside_argument() {
        let e = parse_ok("$set(album,%album% (disc %discnumber%, side A))");
        let [Node::Call(call)] = e.nodes() else { panic!() };
        assert_eq!(call.args().len(), 2);
        assert_eq!(
            call.args()[1].nodes(),
            [
                Node::Variable("album".into()),
                lit(" (disc "),
                Node::Variable("discnumber".into()),
                lit(", side A)"),
            ]
        );
    }

    #[test]
    fn unknown_function() {
        assert_eq!(
            parse_err("x $bogus(1)"),
            ParseError::UnknownFunction { name: "bogus".into(), position: pos(1, 3, 2) }
        );
    }

    #[test]
    fn arity_mismatch() {
        assert_eq!(
            parse_err("$left(abc)"),
            ParseError::ArityMismatch {
                name: "left".into(),
                expected: Arity::exactly(2),
                actual: 1,
                position: Position::START,
            }
        );
        assert!(matches!(
            parse_err("$left(a,b,c)"),
            ParseError::ArityMismatch { actual: 3, .. }
        ));
    }

    #[test]
    fn unterminated_constructs() {
        assert_eq!(
            parse_err("%foo"),
            ParseError::UnexpectedEndOfInput { position: pos(1, 5, 4) }
        );
        assert_eq!(
            parse_err("$noop("),
            ParseError::UnexpectedEndOfInput { position: pos(1, 7, 6) }
        );
        assert!(matches!(parse_err("$noop"), ParseError::UnexpectedEndOfInput { .. }));
        assert!(matches!(parse_err("$set(a,(b)"), ParseError::UnexpectedEndOfInput { .. }));
    }

    #[test]
    fn bad_function_name_character() {
        assert_eq!(
            parse_err("$up-per(x)"),
            ParseError::UnexpectedCharacter { ch: '-', position: pos(1, 4, 3) }
        );
    }

    #[test]
    fn positions_span_lines() {
        assert_eq!(
            parse_err("line one\n  $nope()"),
            ParseError::UnknownFunction { name: "nope".into(), position: pos(2, 3, 11) }
        );
    }

    fn nested_upper(levels: usize) -> String {
        format!("{}x{}", "$upper(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        assert!(parse(&nested_upper(MAX_NESTING_DEPTH), FunctionRegistry::global()).is_ok());
    }

    #[test]
    fn nesting_past_the_limit_is_rejected() {
        let column = 7 * MAX_NESTING_DEPTH + 1;
        for levels in [MAX_NESTING_DEPTH + 1, 20_000] {
            assert_eq!(
                parse_err(&nested_upper(levels)),
                ParseError::NestingTooDeep {
                    name: "upper".into(),
                    limit: MAX_NESTING_DEPTH,
                    position: pos(1, column, column - 1),
                }
            );
        }
    }

    #[test]
    fn depth_is_per_branch() {
        // Siblings do not add up; only enclosing calls count.
        let wide = vec![nested_upper(MAX_NESTING_DEPTH); 4].join("");
        assert!(parse(&wide, FunctionRegistry::global()).is_ok());
    }
}
