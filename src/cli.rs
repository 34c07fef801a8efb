//! Command-line handling for the rz binary.

use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What this invocation of rz should do.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Invocation {
    Repl,
    Command(String),
    Script(PathBuf),
    Help,
    Version,
}

pub(crate) fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let mut iter = args.iter();
    match iter.next().map(String::as_str) {
        None => Ok(Invocation::Repl),
        Some("--help") | Some("-h") => Ok(Invocation::Help),
        Some("--version") | Some("-V") => Ok(Invocation::Version),
        Some("-c") => match iter.next() {
            Some(source) => Ok(Invocation::Command(source.clone())),
            None => Err("-c requires a command string".to_string()),
        },
        Some(flag) if flag.starts_with('-') => Err(format!("unknown option: {flag}")),
        Some(path) => Ok(Invocation::Script(PathBuf::from(path))),
    }
}

pub(crate) fn print_help() {
    println!(
        r#"rz-{} - an rc-flavored command shell

USAGE:
    rz                  Start an interactive shell
    rz -c <command>     Execute a single command line
    rz <script>         Execute a script file
    rz --help           Show this help message
    rz --version        Show version

SYNTAX:
    cmd a b c           Run a command
    a=b                 Assign; xs=(a b c) assigns a list
    $xs $#xs $"xs       List, count, space-joined string
    $xs(2)              1-based subscript
    a^b  foo$bar        Concatenation, explicit and free
    cmd < in > out      Redirections; >> appends, >[2=1] aliases
    a | b               Pipeline
    a && b  a || b      Run b on success / on failure
    {{ a; b }}            Group
    fn name {{ body }}    Define a function
    `{{cmds}}             Substitute command output
    'it''s'             Quoting; '' embeds a quote
    # comment           To end of line"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("rz-{VERSION}");
}
