//! Date functions: `$datetime`, `$year`, `$month`, `$day`, `$dateformat`.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, NaiveDate};

use crate::script::eval::{EvalResult, Evaluator};
use crate::script::registry::{Arity, FunctionRegistry};

use super::arg;

const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

pub(super) fn register(r: &mut FunctionRegistry) {
    r.eager(
        "datetime",
        func_datetime,
        Arity::between(0, 1),
        "`$datetime(format=\"%Y-%m-%d %H:%M:%S\")`\n\n\
         Returns the current local date and time in `format` (strftime codes). \
         An unsupported format code is an error.",
    );
    r.eager(
        "year",
        func_year,
        Arity::between(1, 2),
        "`$year(date,date_order=\"ymd\")`\n\n\
         Returns the year part of `date`. `date_order` is one of `ymd`, `dmy`, `mdy`.",
    );
    r.eager(
        "month",
        func_month,
        Arity::between(1, 2),
        "`$month(date,date_order=\"ymd\")`\n\nReturns the month part of `date`.",
    );
    r.eager(
        "day",
        func_day,
        Arity::between(1, 2),
        "`$day(date,date_order=\"ymd\")`\n\nReturns the day part of `date`.",
    );
    r.eager(
        "dateformat",
        func_dateformat,
        Arity::between(1, 3),
        "`$dateformat(date,format=\"%Y-%m-%d\",date_order=\"ymd\")`\n\n\
         Reformats `date`. Returns empty if the date or the format is invalid.",
    );
}

/// Parse a strftime format, or `None` if it contains an unsupported code.
fn strftime_items(format: &str) -> Option<Vec<Item<'_>>> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        None
    } else {
        Some(items)
    }
}

fn func_datetime(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let format = match arg(args, 0) {
        "" => DEFAULT_DATETIME_FORMAT,
        format => format,
    };
    let Some(items) = strftime_items(format) else {
        return Err(ev.unsupported_format());
    };
    let mut out = String::new();
    write!(out, "{}", Local::now().format_with_items(items.iter()))
        .map_err(|_| ev.unsupported_format())?;
    Ok(out)
}

/// Split `date` into `(year, month, day)` on runs of non-digits.
/// Missing fields come back empty.
fn split_date<'d>(date: &'d str, order: &str) -> (&'d str, &'d str, &'d str) {
    let parts: Vec<&str> = date
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .collect();
    let part = |i: usize| parts.get(i).copied().unwrap_or("");
    match order.to_ascii_lowercase().as_str() {
        "dmy" => (part(2), part(1), part(0)),
        "mdy" => (part(2), part(0), part(1)),
        _ => (part(0), part(1), part(2)),
    }
}

fn func_year(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(split_date(&args[0], arg(args, 1)).0.to_owned())
}

fn func_month(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(split_date(&args[0], arg(args, 1)).1.to_owned())
}

fn func_day(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    Ok(split_date(&args[0], arg(args, 1)).2.to_owned())
}

fn format_date(date: &str, format: &str, order: &str) -> Option<String> {
    let (year, month, day) = split_date(date, order);
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    let items = strftime_items(format)?;
    let mut out = String::new();
    write!(out, "{}", date.format_with_items(items.iter())).ok()?;
    Some(out)
}

fn func_dateformat(_: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let format = match arg(args, 1) {
        "" => DEFAULT_DATE_FORMAT,
        format => format,
    };
    Ok(format_date(&args[0], format, arg(args, 2)).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::super::{eval, run_with};
    use super::*;
    use crate::script::error::RuntimeError;
    use crate::tags::TagContext;

    #[test]
    fn date_parts() {
        assert_eq!(eval("$year(2021-03-09)"), "2021");
        assert_eq!(eval("$month(2021-03-09)"), "03");
        assert_eq!(eval("$day(2021-03-09)"), "09");
        assert_eq!(eval("$year(09.03.2021,dmy)"), "2021");
        assert_eq!(eval("$day(03/09/2021,mdy)"), "09");
        assert_eq!(eval("$month(03/09/2021,MDY)"), "03");
        assert_eq!(eval("$day(2021)"), "");
        assert_eq!(eval("$year(%missing%)"), "");
    }

    #[test]
    fn split_skips_leading_separators() {
        assert_eq!(split_date("  2021 / 3 / 9", "ymd"), ("2021", "3", "9"));
    }

    #[test]
    fn dateformat_reformats() {
        assert_eq!(eval("$dateformat(2021-03-09)"), "2021-03-09");
        assert_eq!(eval(r"$dateformat(2021 3 9,\%d.\%m.\%Y)"), "09.03.2021");
        assert_eq!(eval(r"$dateformat(09.03.2021,\%Y\%m\%d,dmy)"), "20210309");
    }

    #[test]
    fn dateformat_degrades_to_empty() {
        assert_eq!(eval("$dateformat(2021-02-30)"), "");
        assert_eq!(eval("$dateformat(not a date)"), "");
        assert_eq!(eval(r"$dateformat(2021-03-09,\%Q)"), "");
    }

    #[test]
    fn datetime_default_shape() {
        let now = eval("$datetime()");
        assert_eq!(now.len(), "2021-03-09 12:00:00".len());
        assert_eq!(eval(r"$datetime(\%\%)"), "%");
    }

    #[test]
    fn datetime_rejects_unsupported_code() {
        let err = run_with(r"x$datetime(\%Q)", &mut TagContext::new(), None).unwrap_err();
        match err {
            RuntimeError::UnsupportedFormat { function, position } => {
                assert_eq!(function, "datetime");
                assert_eq!(position.column, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
