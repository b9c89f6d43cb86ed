//! Multi-value functions.
//!
//! Most of these are lazy so that a lone `%tag%` argument can be read as the
//! tag's stored value list instead of its joined string.

use std::collections::HashMap;

use crate::script::ast::Expression;
use crate::script::error::RuntimeError;
use crate::script::eval::{EvalResult, Evaluator};
use crate::script::multi::MultiValue;
use crate::script::registry::{Arity, FunctionRegistry};
use crate::tags::{normalize_tagname, MULTI_VALUED_JOINER};

use super::{parse_int, truth};

pub(super) fn register(r: &mut FunctionRegistry) {
    r.eager(
        "setmulti",
        func_setmulti,
        Arity::between(2, 3),
        "`$setmulti(name,value,separator=\"; \")`\n\n\
         Sets the variable `name` to `value`, split on `separator` into multiple \
         values. Empty elements are dropped.",
    );
    r.lazy(
        "getmulti",
        func_getmulti,
        Arity::between(2, 3),
        "`$getmulti(name,index,separator=\"; \")`\n\n\
         Returns the element at `index` (0-based, negative counts from the end) \
         of the multi-value `name`.",
    );
    r.lazy(
        "lenmulti",
        func_lenmulti,
        Arity::between(1, 2),
        "`$lenmulti(name,separator=\"; \")`\n\nReturns the number of elements in `name`.",
    );
    r.lazy(
        "inmulti",
        func_inmulti,
        Arity::between(2, 3),
        "`$inmulti(name,value,separator=\"; \")`\n\n\
         Returns true if the multi-value `name` contains exactly `value` as an element.",
    );
    r.lazy(
        "sortmulti",
        func_sortmulti,
        Arity::between(1, 2),
        "`$sortmulti(name,separator=\"; \")`\n\nReturns the elements of `name` in sorted order.",
    );
    r.lazy(
        "reversemulti",
        func_reversemulti,
        Arity::between(1, 2),
        "`$reversemulti(name,separator=\"; \")`\n\nReturns the elements of `name` in reverse order.",
    );
    r.lazy(
        "unique",
        func_unique,
        Arity::between(1, 3),
        "`$unique(name,case_sensitive=\"\",separator=\"; \")`\n\n\
         Returns the distinct elements of `name`, sorted. Comparison ignores case \
         unless `case_sensitive` is set.",
    );
    r.lazy(
        "slice",
        func_slice,
        Arity::between(3, 4),
        "`$slice(name,start,end,separator=\"; \")`\n\n\
         Returns the elements of `name` from `start` up to (excluding) `end`. A \
         blank index means the start or end of the list.",
    );
    r.lazy(
        "join",
        func_join,
        Arity::between(2, 3),
        "`$join(name,text,separator=\"; \")`\n\nJoins the elements of `name` with `text`.",
    );
    r.lazy(
        "is_multi",
        func_is_multi,
        Arity::exactly(1),
        "`$is_multi(name)`\n\nReturns true if `name` has more than one value.",
    );
    r.eager(
        "cleanmulti",
        func_cleanmulti,
        Arity::exactly(1),
        "`$cleanmulti(name)`\n\nRemoves all empty values from the multi-valued tag `name`.",
    );
    r.lazy(
        "replacemulti",
        func_replacemulti,
        Arity::between(3, 4),
        "`$replacemulti(name,search,replace,separator=\"; \")`\n\n\
         Replaces every element of `name` equal to `search` with `replace`. \
         Elements that become empty are dropped.",
    );
}

/// Evaluate an optional index argument; blank or non-numeric is `None`.
fn index_arg(ev: &mut Evaluator<'_>, expr: &Expression) -> Result<Option<i64>, RuntimeError> {
    if expr.is_empty() {
        return Ok(None);
    }
    Ok(parse_int(&ev.eval(expr)?))
}

fn func_setmulti(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let separator = if args.len() > 2 { args[2].as_str() } else { MULTI_VALUED_JOINER };
    MultiValue::from_text(&args[1], separator).to_tag_value(ev.tags_mut(), &args[0]);
    Ok(String::new())
}

fn func_getmulti(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let Some(index) = index_arg(ev, &args[1])? else {
        return Ok(String::new());
    };
    let values = MultiValue::from_args(ev, &args[0], args.get(2))?;
    Ok(values.get(index).unwrap_or_default().to_owned())
}

fn func_lenmulti(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    Ok(MultiValue::from_args(ev, &args[0], args.get(1))?.len().to_string())
}

fn func_inmulti(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let needle = ev.eval(&args[1])?;
    let values = MultiValue::from_args(ev, &args[0], args.get(2))?;
    Ok(truth(values.contains(&needle)))
}

fn func_sortmulti(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let values = MultiValue::from_args(ev, &args[0], args.get(1))?;
    let mut sorted = values.values().to_vec();
    sorted.sort();
    Ok(sorted.join(values.separator()))
}

fn func_reversemulti(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let values = MultiValue::from_args(ev, &args[0], args.get(1))?;
    let reversed: Vec<&str> = values.iter().rev().collect();
    Ok(reversed.join(values.separator()))
}

fn func_unique(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let case_sensitive = !ev.eval_opt(args.get(1))?.is_empty();
    let values = MultiValue::from_args(ev, &args[0], args.get(2))?;
    let mut distinct: Vec<String> = if case_sensitive {
        values.values().to_vec()
    } else {
        // One representative per case-folded key; the last spelling seen wins.
        let mut by_key: HashMap<String, &str> = HashMap::new();
        for value in values.iter() {
            by_key.insert(value.to_lowercase(), value);
        }
        by_key.into_values().map(str::to_owned).collect()
    };
    distinct.sort();
    distinct.dedup();
    Ok(distinct.join(values.separator()))
}

fn func_slice(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let start = index_arg(ev, &args[1])?;
    let end = index_arg(ev, &args[2])?;
    let values = MultiValue::from_args(ev, &args[0], args.get(3))?;
    Ok(values.slice(start, end).join(values.separator()))
}

fn func_join(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let phrase = ev.eval(&args[1])?;
    let values = MultiValue::from_args(ev, &args[0], args.get(2))?;
    Ok(values.values().join(&phrase))
}

fn func_is_multi(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let values = MultiValue::from_args(ev, &args[0], None)?;
    Ok(truth(values.len() > 1))
}

fn func_cleanmulti(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let name = normalize_tagname(&args[0]);
    let tags = ev.tags_mut();
    let cleaned: Vec<String> = tags
        .get_all(&name)
        .iter()
        .filter(|v| !v.is_empty())
        .cloned()
        .collect();
    if tags.contains(&name) {
        tags.set(&name, cleaned);
    }
    Ok(String::new())
}

fn func_replacemulti(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let separator_blank = args.get(3).map_or(false, Expression::is_empty);
    if args[1].is_empty() || separator_blank {
        return ev.eval(&args[0]);
    }
    let search = ev.eval(&args[1])?;
    let replace = ev.eval(&args[2])?;
    let mut values = MultiValue::from_args(ev, &args[0], args.get(3))?;
    let replaced = values
        .iter()
        .map(|v| if v == search { replace.clone() } else { v.to_owned() })
        .collect();
    values.replace_values(replaced);
    Ok(values.to_string())
}
