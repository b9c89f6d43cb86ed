use std::process::ExitCode;

use tracing::{debug, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use tagscript::cli::{self, ConfigFile, ScriptSource, USAGE};
use tagscript::config::{self, Config};
use tagscript::script::ScriptEngine;
use tagscript::tags::{normalize_tagname, TagContext};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TAGSCRIPT_LOG";

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("tagscript: {e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(args.debug);

    let engine = ScriptEngine::new();

    // ── Function listing ─────────────────────────────────────────────────────
    if args.list_functions {
        for function in engine.registry().iter() {
            println!("{}\n", function.doc());
        }
        return ExitCode::SUCCESS;
    }

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match args.config {
        ConfigFile::Skip => Config::new(),
        ConfigFile::Explicit(path) => match Config::load_file(&path) {
            Ok((config, errors)) => {
                report(&path.display().to_string(), &errors);
                config
            }
            Err(e) => {
                eprintln!("tagscript: {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        ConfigFile::Search => match config::find_user_config() {
            Some(path) => match Config::load_file(&path) {
                Ok((config, errors)) => {
                    report(&path.display().to_string(), &errors);
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), %e, "could not read config");
                    Config::new()
                }
            },
            None => Config::new(),
        },
    };

    // ── Seed tags: config first, then -t in order ───────────────────────────
    let mut tags: TagContext = config.tags.clone();
    let mut seeded_from_cli: Vec<String> = Vec::new();
    for (name, value) in &args.tags {
        let name = normalize_tagname(name);
        // The first -t for a name replaces any config value; later ones append.
        if !seeded_from_cli.contains(&name) {
            tags.unset(&name);
            seeded_from_cli.push(name.clone());
        }
        tags.add(&name, value.as_str());
    }

    let source = match &args.source {
        ScriptSource::Inline(text) => text.as_str(),
        ScriptSource::Preset(name) => match config.script(name) {
            Some(text) => text,
            None => {
                eprintln!("tagscript: unknown preset '{name}'");
                return ExitCode::FAILURE;
            }
        },
        ScriptSource::None => {
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };
    debug!(source, "running script");

    // ── Run ──────────────────────────────────────────────────────────────────
    match engine.run(source, &mut tags, None) {
        Ok(result) => {
            println!("{result}");
            print_tags(&tags);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("tagscript: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn report(path: &str, errors: &[config::ConfigError]) {
    for e in errors {
        eprintln!("tagscript: {path}: {e}");
    }
}

/// Print every tag as `name=value` (one line per value), then every deleted
/// tag as `-name`, each group sorted by name.
fn print_tags(tags: &TagContext) {
    let mut entries: Vec<(&str, &[String])> = tags.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (name, values) in entries {
        for value in values {
            println!("{name}={value}");
        }
    }
    for name in tags.deleted_tags() {
        println!("-{name}");
    }
}
