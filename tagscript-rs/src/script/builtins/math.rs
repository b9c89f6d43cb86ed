//! Integer arithmetic, boolean logic and comparisons.

use crate::script::eval::{EvalResult, Evaluator};
use crate::script::registry::{Arity, FunctionRegistry};

use super::{parse_int, truth};

pub(super) fn register(r: &mut FunctionRegistry) {
    // ── Arithmetic ───────────────────────────────────────────────────────────
    r.eager(
        "add",
        func_add,
        Arity::at_least(2),
        "`$add(x,y,...)`\n\nAdds `y` to `x`. Further arguments are added in turn.",
    );
    r.eager(
        "sub",
        func_sub,
        Arity::at_least(2),
        "`$sub(x,y,...)`\n\nSubtracts `y` from `x`. Further arguments are subtracted in turn.",
    );
    r.eager(
        "mul",
        func_mul,
        Arity::at_least(2),
        "`$mul(x,y,...)`\n\nMultiplies `x` by `y`. Further arguments multiply in turn.",
    );
    r.eager(
        "div",
        func_div,
        Arity::at_least(2),
        "`$div(x,y,...)`\n\n\
         Divides `x` by `y`, rounding toward zero. Division by zero returns empty.",
    );
    r.eager(
        "mod",
        func_mod,
        Arity::at_least(2),
        "`$mod(x,y,...)`\n\n\
         Returns the remainder of `x` divided by `y`; the sign follows `x`.",
    );

    // ── Logic ────────────────────────────────────────────────────────────────
    r.eager(
        "and",
        func_and,
        Arity::at_least(2),
        "`$and(x,y,...)`\n\nReturns true if all arguments are not empty.",
    );
    r.eager(
        "or",
        func_or,
        Arity::at_least(2),
        "`$or(x,y,...)`\n\nReturns true if any argument is not empty.",
    );
    r.eager(
        "not",
        func_not,
        Arity::exactly(1),
        "`$not(x)`\n\nReturns true if `x` is empty.",
    );

    // ── Comparison ───────────────────────────────────────────────────────────
    r.eager(
        "eq",
        func_eq,
        Arity::exactly(2),
        "`$eq(x,y)`\n\nReturns true if `x` equals `y`.",
    );
    r.eager(
        "ne",
        func_ne,
        Arity::exactly(2),
        "`$ne(x,y)`\n\nReturns true if `x` does not equal `y`.",
    );
    r.eager(
        "lt",
        func_lt,
        Arity::exactly(2),
        "`$lt(x,y)`\n\nReturns true if the integer `x` is less than `y`.",
    );
    r.eager(
        "lte",
        func_lte,
        Arity::exactly(2),
        "`$lte(x,y)`\n\nReturns true if the integer `x` is less than or equal to `y`.",
    );
    r.eager(
        "gt",
        func_gt,
        Arity::exactly(2),
        "`$gt(x,y)`\n\nReturns true if the integer `x` is greater than `y`.",
    );
    r.eager(
        "gte",
        func_gte,
        Arity::exactly(2),
        "`$gte(x,y)`\n\nReturns true if the integer `x` is greater than or equal to `y`.",
    );
    r.eager(
        "eq_any",
        func_eq_any,
        Arity::at_least(1),
        "`$eq_any(x,a1,a2,...)`\n\nReturns true if `x` equals any of the other arguments.",
    );
    r.eager(
        "ne_all",
        func_ne_all,
        Arity::at_least(1),
        "`$ne_all(x,a1,a2,...)`\n\nReturns true if `x` equals none of the other arguments.",
    );
    r.eager(
        "eq_all",
        func_eq_all,
        Arity::at_least(1),
        "`$eq_all(x,a1,a2,...)`\n\nReturns true if `x` equals all of the other arguments.",
    );
    r.eager(
        "ne_any",
        func_ne_any,
        Arity::at_least(1),
        "`$ne_any(x,a1,a2,...)`\n\n\
         Returns true if `x` differs from at least one of the other arguments.",
    );
    r.eager(
        "in",
        func_in,
        Arity::exactly(2),
        "`$in(x,y)`\n\nReturns true if `x` contains `y`.",
    );
}

/// Left fold over integer operands; any bad operand or failed step is `""`.
fn fold(args: &[String], op: fn(i64, i64) -> Option<i64>) -> String {
    let mut operands = args.iter().map(|a| parse_int(a));
    let Some(Some(mut acc)) = operands.next() else {
        return String::new();
    };
    for operand in operands {
        match operand.and_then(|n| op(acc, n)) {
            Some(next) => acc = next,
            None => return String::new(),
        }
    }
    acc.to_string()
}

fn func_add(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(fold(args, i64::checked_add))
}

fn func_sub(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(fold(args, i64::checked_sub))
}

fn func_mul(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(fold(args, i64::checked_mul))
}

fn func_div(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(fold(args, i64::checked_div))
}

fn func_mod(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(fold(args, i64::checked_rem))
}

fn func_and(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args.iter().all(|a| !a.is_empty())))
}

fn func_or(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args.iter().any(|a| !a.is_empty())))
}

fn func_not(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args[0].is_empty()))
}

fn func_eq(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args[0] == args[1]))
}

fn func_ne(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args[0] != args[1]))
}

fn compare(args: &[String], test: fn(i64, i64) -> bool) -> String {
    match (parse_int(&args[0]), parse_int(&args[1])) {
        (Some(x), Some(y)) => truth(test(x, y)),
        _ => String::new(),
    }
}

fn func_lt(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(compare(args, |x, y| x < y))
}

fn func_lte(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(compare(args, |x, y| x <= y))
}

fn func_gt(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(compare(args, |x, y| x > y))
}

fn func_gte(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(compare(args, |x, y| x >= y))
}

fn func_eq_any(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args[1..].contains(&args[0])))
}

fn func_ne_all(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(!args[1..].contains(&args[0])))
}

fn func_eq_all(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args[1..].iter().all(|a| *a == args[0])))
}

fn func_ne_any(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(!args[1..].iter().all(|a| *a == args[0])))
}

fn func_in(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(truth(args[0].contains(args[1].as_str())))
}

#[cfg(test)]
mod tests {
    use super::super::eval;

    #[test]
    fn arithmetic_folds_left() {
        assert_eq!(eval("$add(2,3,5)"), "10");
        assert_eq!(eval("$sub(10,3,2)"), "5");
        assert_eq!(eval("$mul(2,3,4)"), "24");
        assert_eq!(eval("$div(100,10,3)"), "3");
        assert_eq!(eval("$mod(17,5)"), "2");
        assert_eq!(eval("$add( 2 , 3 )"), "5");
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(eval("$div(-7,2)"), "-3");
        assert_eq!(eval("$mod(-7,2)"), "-1");
    }

    #[test]
    fn bad_operands_yield_empty() {
        assert_eq!(eval("$add(2,x)"), "");
        assert_eq!(eval("$add(,1)"), "");
        assert_eq!(eval("$div(1,0)"), "");
        assert_eq!(eval("$mod(1,0)"), "");
        assert_eq!(eval("$mul(9223372036854775807,2)"), "");
        assert_eq!(eval("$div(-9223372036854775808,-1)"), "");
    }

    #[test]
    fn logic() {
        assert_eq!(eval("$and(a,b,c)"), "1");
        assert_eq!(eval("$and(a,)"), "");
        assert_eq!(eval("$or(,,x)"), "1");
        assert_eq!(eval("$or(,)"), "");
        assert_eq!(eval("$not(%missing%)"), "1");
        assert_eq!(eval("$not(x)"), "");
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("$eq(a,a)"), "1");
        assert_eq!(eval("$ne(a,a)"), "");
        assert_eq!(eval("$lt(2,10)"), "1");
        assert_eq!(eval("$lte(3,3)"), "1");
        assert_eq!(eval("$gt(2,10)"), "");
        assert_eq!(eval("$gte(10,2)"), "1");
        assert_eq!(eval("$lt(a,2)"), "");
    }

    #[test]
    fn set_comparisons() {
        assert_eq!(eval("$eq_any(b,a,b,c)"), "1");
        assert_eq!(eval("$eq_any(z,a,b)"), "");
        assert_eq!(eval("$ne_all(z,a,b)"), "1");
        assert_eq!(eval("$eq_all(a,a,a)"), "1");
        assert_eq!(eval("$eq_all(a,a,b)"), "");
        assert_eq!(eval("$ne_any(a,a,b)"), "1");
        assert_eq!(eval("$ne_any(a,a,a)"), "");
        assert_eq!(eval("$in(abcdef,cd)"), "1");
        assert_eq!(eval("$in(abc,x)"), "");
    }
}
