//! Command-line argument parsing.
//!
//! Usage:
//!   tagscript [-f[<file>]] [-t<tag>=<value>]... [-d] <script>
//!   tagscript [-f[<file>]] [-t<tag>=<value>]... [-d] -p<preset>
//!   tagscript -l

use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: tagscript [-f[<file>]] [-t<tag>=<value>]... [-d] <script>
       tagscript [-f[<file>]] [-t<tag>=<value>]... [-d] -p<preset>
       tagscript -l";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Config-file specification.
    pub config: ConfigFile,
    /// Tags seeded with `-t<tag>=<value>`, in command-line order.
    pub tags: Vec<(String, String)>,
    /// What to run.
    pub source: ScriptSource,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// List the function library and exit (`-l`).
    pub list_functions: bool,
}

/// How to choose the user config file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// Search `~/.tagscriptrc`, then `./.tagscriptrc` (default).
    #[default]
    Search,
    /// `-f` with no file argument: skip user config.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

/// Where the script to run comes from.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum ScriptSource {
    /// Nothing given; only valid together with `-l`.
    #[default]
    None,
    /// Positional script text.
    Inline(String),
    /// `-p<name>`: a `/script` preset from the config file.
    Preset(String),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut preset: Option<String> = None;
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            positional.extend(argv[i + 1..].iter().cloned());
            break;
        }

        // Non-flag argument: the script text.
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'l' => args.list_functions = true,

                // -f[<file>]; the file must be attached.
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                // -t<tag>=<value>
                't' => {
                    let assignment = option_value(&chars, &mut j, argv, &mut i, 't')?;
                    let (name, value) = assignment
                        .split_once('=')
                        .ok_or_else(|| format!("-t expects <tag>=<value>, got '{assignment}'"))?;
                    if name.is_empty() {
                        return Err("-t: tag name cannot be empty".to_owned());
                    }
                    args.tags.push((name.to_owned(), value.to_owned()));
                }

                // -p<preset>
                'p' => {
                    preset = Some(option_value(&chars, &mut j, argv, &mut i, 'p')?);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    args.source = match (positional.len(), preset) {
        (0, None) => ScriptSource::None,
        (0, Some(name)) => ScriptSource::Preset(name),
        (1, None) => ScriptSource::Inline(positional.remove(0)),
        (_, Some(_)) => return Err("-p cannot be combined with a script argument".to_owned()),
        (n, None) => return Err(format!("too many arguments ({n})")),
    };
    if args.source == ScriptSource::None && !args.list_functions {
        return Err("no script given".to_owned());
    }

    Ok(args)
}

/// Value of a flag that takes an argument, either attached (`-tx=1`) or as
/// the next word (`-t x=1`).  Advances the cursors past what it consumed.
fn option_value(
    chars: &[char],
    j: &mut usize,
    argv: &[String],
    i: &mut usize,
    flag: char,
) -> Result<String, String> {
    if *j + 1 < chars.len() {
        let value: String = chars[*j + 1..].iter().collect();
        *j = chars.len();
        Ok(value)
    } else if *i + 1 < argv.len() {
        *i += 1;
        Ok(argv[*i].clone())
    } else {
        Err(format!("-{flag} requires an argument"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
