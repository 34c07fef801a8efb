//! In-process commands
//!
//! Only three commands must run inside the shell: `cd` (the working
//! directory is per-process), `clear`, and `exit`. Everything else is a
//! function or an external spawn; the literal first word `builtin` forces
//! dispatch here, bypassing function lookup.

use super::{ExecError, Interpreter};
use std::io::{self, Write};

impl Interpreter<'_> {
    pub(crate) fn try_builtin(&mut self, argv: &[String]) -> Option<Result<u8, ExecError>> {
        match argv[0].as_str() {
            "cd" => Some(self.builtin_cd(&argv[1..])),
            "clear" => Some(builtin_clear()),
            "exit" => Some(builtin_exit(&argv[1..])),
            _ => None,
        }
    }

    /// `cd` with no argument goes home; an absolute path is taken as is; a
    /// relative path is rebuilt against `$PWD` component by component so
    /// `..` pops instead of accumulating.
    fn builtin_cd(&mut self, args: &[String]) -> Result<u8, ExecError> {
        let target = match args.first() {
            None => self.env.get("home").unwrap_or("/").to_string(),
            Some(path) if path.starts_with('/') => path.clone(),
            Some(path) => {
                let pwd = self.env.get("PWD").unwrap_or("/");
                join_relative(pwd, path)
            }
        };
        match std::env::set_current_dir(&target) {
            Ok(()) => {
                self.env.set_raw("PWD", target);
                Ok(0)
            }
            Err(error) => {
                eprintln!("rz: cd: {target}: {error}");
                Ok(1)
            }
        }
    }
}

/// Apply a relative path on top of an absolute one: `..` pops, `.` and
/// empty components vanish.
fn join_relative(pwd: &str, path: &str) -> String {
    let mut parts: Vec<&str> = pwd.split('/').filter(|p| !p.is_empty()).collect();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Terminal reset, cursor home, erase below.
fn builtin_clear() -> Result<u8, ExecError> {
    let mut stdout = io::stdout();
    stdout.write_all(b"\x1bc\x1b[H\x1b[J")?;
    stdout.flush()?;
    Ok(0)
}

/// Terminate the shell process. An unparseable or missing argument exits
/// zero; the interpreter loop never sees a return from here.
fn builtin_exit(args: &[String]) -> Result<u8, ExecError> {
    let code = args
        .first()
        .and_then(|arg| arg.parse::<u8>().ok())
        .unwrap_or(0);
    std::process::exit(i32::from(code))
}
