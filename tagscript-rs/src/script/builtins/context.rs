//! Functions that look past the plain tag values: performer roles, the
//! album the file belongs to, and the file's media kind.

use tracing::debug;

use crate::pattern::Pattern;
use crate::script::ast::Expression;
use crate::script::eval::{EvalResult, Evaluator};
use crate::script::registry::{Arity, FunctionRegistry};

use super::{arg, truth};

const PERFORMER_PREFIX: &str = "performer:";

pub(super) fn register(r: &mut FunctionRegistry) {
    r.eager(
        "performer",
        func_performer,
        Arity::between(0, 2),
        "`$performer(pattern=\"\",join=\", \")`\n\n\
         Returns the performers whose role matches `pattern`, joined with `join`. \
         `pattern` is a substring of the role, a glob such as `*guitar`, or a \
         regular expression written as `/re/`.",
    );
    r.lazy(
        "matchedtracks",
        func_matchedtracks,
        Arity::any(),
        "`$matchedtracks()`\n\n\
         Returns the number of matched tracks in the file's album, or `0` when \
         the file is not part of an album.",
    );
    r.eager(
        "is_complete",
        func_is_complete,
        Arity::exactly(0),
        "`$is_complete()`\n\n\
         Returns true if every track in the file's album is matched to a single file.",
    );
    r.eager(
        "is_audio",
        func_is_audio,
        Arity::exactly(0),
        "`$is_audio()`\n\nReturns true if the file being processed is an audio file.",
    );
    r.eager(
        "is_video",
        func_is_video,
        Arity::exactly(0),
        "`$is_video()`\n\nReturns true if the file being processed is a video file.",
    );
}

fn func_performer(ev: &mut Evaluator<'_>, args: &[String]) -> EvalResult {
    let filter = arg(args, 0);
    let join = if args.len() > 1 { args[1].as_str() } else { ", " };
    let pattern = match Pattern::from_filter(filter) {
        Ok(pattern) => pattern,
        Err(err) => {
            debug!(filter, %err, "$performer: invalid pattern");
            return Ok(String::new());
        }
    };
    let mut performers: Vec<&str> = Vec::new();
    for (name, values) in ev.tags().iter() {
        if let Some(role) = name.strip_prefix(PERFORMER_PREFIX) {
            if pattern.matches(role) {
                performers.extend(values.iter().map(String::as_str));
            }
        }
    }
    Ok(performers.join(join))
}

fn func_matchedtracks(ev: &mut Evaluator<'_>, _: &[Expression]) -> EvalResult {
    let count = ev
        .file()
        .and_then(|file| file.album())
        .map_or(0, |album| album.matched_tracks);
    Ok(count.to_string())
}

fn func_is_complete(ev: &mut Evaluator<'_>, _: &[String]) -> EvalResult {
    let complete = ev
        .file()
        .and_then(|file| file.album())
        .map_or(false, |album| album.complete);
    Ok(truth(complete))
}

fn is_video(ev: &Evaluator<'_>) -> bool {
    let video = ev.variable("_video");
    !video.is_empty() && video != "0"
}

fn func_is_video(ev: &mut Evaluator<'_>, _: &[String]) -> EvalResult {
    Ok(truth(is_video(ev)))
}

fn func_is_audio(ev: &mut Evaluator<'_>, _: &[String]) -> EvalResult {
    Ok(truth(!is_video(ev)))
}
