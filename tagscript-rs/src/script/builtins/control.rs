//! Control flow: `$if`, `$if2`, `$noop`, `$foreach`, `$while`, `$map`.

use tracing::debug;

use crate::script::ast::Expression;
use crate::script::eval::{EvalResult, Evaluator, MAX_LOOP_ITERATIONS};
use crate::script::multi::MultiValue;
use crate::script::registry::{Arity, FunctionRegistry};

const LOOP_COUNT: &str = "_loop_count";
const LOOP_VALUE: &str = "_loop_value";

pub(super) fn register(r: &mut FunctionRegistry) {
    r.lazy(
        "if",
        func_if,
        Arity::between(2, 3),
        "`$if(if,then,else)`\n\nIf `if` is not empty, returns `then`, otherwise returns `else`.",
    );
    r.lazy(
        "if2",
        func_if2,
        Arity::any(),
        "`$if2(a1,a2,a3,...)`\n\nReturns the first non-empty argument.",
    );
    r.lazy(
        "noop",
        func_noop,
        Arity::any(),
        "`$noop(...)`\n\nDoes nothing. Arguments are not evaluated, so it can \
         comment out a block of code.",
    );
    r.lazy(
        "foreach",
        func_foreach,
        Arity::between(2, 3),
        "`$foreach(name,code,separator=\"; \")`\n\n\
         Iterates over each element in the multi-value `name`, executing `code`. \
         `%_loop_count%` holds the 1-based iteration and `%_loop_value%` the element.",
    );
    r.lazy(
        "while",
        func_while,
        Arity::exactly(2),
        "`$while(condition,code)`\n\n\
         Executes `code` repeatedly while `condition` is not empty. \
         `%_loop_count%` holds the 1-based iteration.",
    );
    r.lazy(
        "map",
        func_map,
        Arity::between(2, 3),
        "`$map(name,code,separator=\"; \")`\n\n\
         Replaces each element of the multi-value `name` with the result of `code` \
         and returns the new list. Empty results are dropped.",
    );
}

fn func_if(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    if ev.eval(&args[0])?.is_empty() {
        ev.eval_opt(args.get(2))
    } else {
        ev.eval(&args[1])
    }
}

fn func_if2(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    for arg in args {
        let value = ev.eval(arg)?;
        if !value.is_empty() {
            return Ok(value);
        }
    }
    Ok(String::new())
}

fn func_noop(_: &mut Evaluator<'_>, _: &[Expression]) -> EvalResult {
    Ok(String::new())
}

fn end_loop(ev: &mut Evaluator<'_>) {
    ev.unset_tag(LOOP_COUNT);
    ev.unset_tag(LOOP_VALUE);
}

fn func_foreach(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let values = MultiValue::from_args(ev, &args[0], args.get(2))?;
    if values.len() > MAX_LOOP_ITERATIONS {
        debug!(len = values.len(), "$foreach truncated at iteration limit");
    }
    for (i, value) in values.iter().take(MAX_LOOP_ITERATIONS).enumerate() {
        ev.set_tag(LOOP_COUNT, (i + 1).to_string());
        ev.set_tag(LOOP_VALUE, value.to_owned());
        ev.eval(&args[1])?;
    }
    end_loop(ev);
    Ok(String::new())
}

fn func_while(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let (condition, code) = (&args[0], &args[1]);
    if condition.is_empty() || code.is_empty() {
        return Ok(String::new());
    }
    let mut count = 0;
    while !ev.eval(condition)?.is_empty() {
        if count == MAX_LOOP_ITERATIONS {
            debug!("$while stopped at iteration limit");
            break;
        }
        count += 1;
        ev.set_tag(LOOP_COUNT, count.to_string());
        ev.eval(code)?;
    }
    end_loop(ev);
    Ok(String::new())
}

fn func_map(ev: &mut Evaluator<'_>, args: &[Expression]) -> EvalResult {
    let mut values = MultiValue::from_args(ev, &args[0], args.get(2))?;
    let limit = values.len().min(MAX_LOOP_ITERATIONS);
    for i in 0..limit {
        let value = values.values()[i].clone();
        ev.set_tag(LOOP_COUNT, (i + 1).to_string());
        ev.set_tag(LOOP_VALUE, value);
        let mapped = ev.eval(&args[1])?;
        values.set(i as i64, mapped);
    }
    end_loop(ev);
    Ok(values.to_string())
}
