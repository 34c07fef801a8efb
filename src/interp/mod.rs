//! Tree-walking interpreter for rz
//!
//! The interpreter borrows the environment and walks a parsed command list.
//! Errors never escape `run`: each statement is evaluated independently,
//! reported on stderr, and folded into `$status` so that downstream
//! `&&`/`||` sentinels see it.
//!
//! Submodules split the work the same way the command tree does:
//! `resolve` turns arguments into word lists, `redirect` owns descriptor
//! plumbing, `pipeline` owns fork/pipe and command substitution, and
//! `builtins` holds the in-process commands.

mod builtins;
mod pipeline;
mod redirect;
mod resolve;

use crate::ast::{Command, Simple};
use crate::env::Env;
use crate::{parser, resolver};
use redirect::FdGuard;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{path}: {errno}")]
    Open { path: String, errno: nix::Error },
    #[error("{0}")]
    Sys(#[from] nix::Error),
}

/// Fd save/restore scope for a top-level interpreter entry. A failure to
/// save is reported but does not block execution.
pub(crate) fn redirect_guard() -> Option<impl Drop> {
    match FdGuard::save() {
        Ok(guard) => Some(guard),
        Err(error) => {
            eprintln!("rz: {error}");
            None
        }
    }
}

/// Executes command trees against a borrowed environment.
pub struct Interpreter<'e> {
    env: &'e mut Env,
    /// While true, `$status` updates are suppressed so that evaluating the
    /// user's `prompt` function does not clobber the visible exit code.
    prompt_mode: bool,
}

impl<'e> Interpreter<'e> {
    pub fn new(env: &'e mut Env) -> Self {
        Interpreter {
            env,
            prompt_mode: false,
        }
    }

    /// Run a command list, returning the final status. Sentinels emitted
    /// for `&&`/`||` gate the following command on the current `$status`.
    pub fn run(&mut self, commands: &[Command]) -> u8 {
        let mut last = 0u8;
        let mut skip_next = false;
        for command in commands {
            match command {
                Command::IfZero => {
                    skip_next = self.env.get("status") != Some("0");
                    continue;
                }
                Command::IfNonzero => {
                    skip_next = self.env.get("status") == Some("0");
                    continue;
                }
                _ => {}
            }
            if std::mem::take(&mut skip_next) {
                continue;
            }
            let was_prompt = self.prompt_mode;
            let status = match self.exec_command(command) {
                Ok(status) => status,
                Err(error) => {
                    eprintln!("rz: {error}");
                    1
                }
            };
            last = status;
            if !self.prompt_mode && !matches!(command, Command::Assignment(_)) {
                self.env.set_status(status);
            }
            // Prompt mode ends with the command that entered it, after the
            // suppressed status update above; later commands update
            // `$status` again.
            self.prompt_mode = was_prompt;
        }
        last
    }

    pub(crate) fn exec_command(&mut self, command: &Command) -> Result<u8, ExecError> {
        match command {
            Command::Assignment(assign) => {
                let values = self.resolve_arg(&assign.value)?;
                self.env.set_list(&assign.key, &values);
                Ok(0)
            }
            Command::Function { name, body } => {
                self.env.set_raw(format!("fn#{name}"), body.clone());
                Ok(0)
            }
            Command::Group(commands) => Ok(self.run(commands)),
            Command::Pipe { lhs, rhs } => self.run_pipeline(lhs, rhs),
            Command::Simple(simple) => self.run_simple(simple),
            Command::IfZero | Command::IfNonzero => Ok(0),
        }
    }

    /// A simple command. Local assignments are applied first and rolled
    /// back on every exit path, restoring the previous value or absence.
    fn run_simple(&mut self, simple: &Simple) -> Result<u8, ExecError> {
        let mut saved: Vec<(String, Option<String>)> = Vec::new();
        let mut prepared = Ok(());
        for assign in &simple.assignments {
            match self.resolve_arg(&assign.value) {
                Ok(values) => {
                    saved.push((assign.key.clone(), self.env.get(&assign.key).map(String::from)));
                    self.env.set_list(&assign.key, &values);
                }
                Err(error) => {
                    prepared = Err(error);
                    break;
                }
            }
        }
        let result = match prepared {
            Ok(()) => self.run_simple_scoped(simple),
            Err(error) => Err(error),
        };
        for (key, old) in saved.into_iter().rev() {
            match old {
                Some(value) => self.env.set_raw(key, value),
                None => self.env.remove(&key),
            }
        }
        result
    }

    fn run_simple_scoped(&mut self, simple: &Simple) -> Result<u8, ExecError> {
        let mut argv = Vec::new();
        for arg in &simple.arguments {
            argv.extend(self.resolve_arg(arg)?);
        }
        if argv.is_empty() {
            return Ok(0);
        }
        let _fds = if simple.redirections.is_empty() {
            None
        } else {
            Some(FdGuard::save()?)
        };
        for redirect in &simple.redirections {
            self.apply_redirection(redirect)?;
        }
        self.dispatch(&argv)
    }

    fn dispatch(&mut self, argv: &[String]) -> Result<u8, ExecError> {
        if argv[0] == "prompt" {
            // Suppresses `$status` updates while the prompt evaluates,
            // including the update for this command itself; `run` drops the
            // flag once this invocation is done.
            self.prompt_mode = true;
        }
        self.dispatch_inner(argv)
    }

    /// Function lookup, then builtins, then an external spawn. The literal
    /// first word `builtin` skips the function lookup.
    fn dispatch_inner(&mut self, argv: &[String]) -> Result<u8, ExecError> {
        if argv[0] == "builtin" {
            let rest = &argv[1..];
            if rest.is_empty() {
                return Ok(0);
            }
            return match self.try_builtin(rest) {
                Some(result) => result,
                None => {
                    eprintln!("rz: {}: no such builtin", rest[0]);
                    Ok(1)
                }
            };
        }
        if let Some(body) = self.env.get(&format!("fn#{}", argv[0])).map(String::from) {
            return self.call_function(&body, &argv[1..]);
        }
        if let Some(result) = self.try_builtin(argv) {
            return result;
        }
        self.spawn(argv)
    }

    /// Run a stored function body with `$*` rebound to the call arguments.
    /// The previous `$*` (or its absence) is restored on every exit path.
    fn call_function(&mut self, body: &str, args: &[String]) -> Result<u8, ExecError> {
        let saved = self.env.get("*").map(String::from);
        self.env.set_list("*", args);
        let status = match parser::parse(body) {
            Ok(commands) => self.run(&commands),
            Err(error) => {
                eprintln!("rz: {error}");
                255
            }
        };
        match saved {
            Some(value) => self.env.set_raw("*", value),
            None => self.env.remove("*"),
        }
        Ok(status)
    }

    /// Spawn an external command inheriting the current fd layout and the
    /// shell environment, and wait for it.
    fn spawn(&mut self, argv: &[String]) -> Result<u8, ExecError> {
        let name = &argv[0];
        let program = if name.contains('/') {
            std::path::PathBuf::from(name)
        } else {
            match resolver::find_in_path(name, &self.env.list("path")) {
                Some(path) => path,
                None => {
                    eprintln!("rz: {name}: command not found");
                    return Ok(127);
                }
            }
        };
        let result = std::process::Command::new(&program)
            .args(&argv[1..])
            .env_clear()
            .envs(self.env.iter())
            .status();
        match result {
            Ok(status) => match status.code() {
                Some(code) => Ok(code as u8),
                // Killed by a signal or otherwise not a normal exit.
                None => Ok(1),
            },
            Err(error) => match error.kind() {
                io::ErrorKind::NotFound => {
                    eprintln!("rz: {name}: command not found");
                    Ok(127)
                }
                io::ErrorKind::PermissionDenied => {
                    eprintln!("rz: {name}: permission denied");
                    Ok(1)
                }
                _ => {
                    eprintln!("rz: {name}: {error}");
                    Ok(1)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(env: &mut Env, source: &str) -> u8 {
        let commands = parse(source).unwrap();
        Interpreter::new(env).run(&commands)
    }

    #[test]
    fn assignment_stores_joined_list() {
        let mut env = Env::bare();
        run(&mut env, "xs=(a b c)");
        assert_eq!(env.get("xs"), Some("a\u{1}b\u{1}c"));
    }

    #[test]
    fn assignment_does_not_touch_status() {
        let mut env = Env::bare();
        env.set_status(7);
        run(&mut env, "x=1");
        assert_eq!(env.get("status"), Some("7"));
    }

    #[test]
    fn empty_assignment_removes_key() {
        let mut env = Env::bare();
        run(&mut env, "x=a");
        run(&mut env, "x=()");
        assert_eq!(env.get("x"), None);
    }

    #[test]
    fn function_definition_is_stored_raw() {
        let mut env = Env::bare();
        run(&mut env, "fn g { echo $* }");
        assert_eq!(env.get("fn#g"), Some(" echo $* "));
    }

    #[test]
    fn local_assignment_leaves_no_trace() {
        let mut env = Env::bare();
        // `k` unset before: stays unset after, even though the command
        // itself is empty-argv after resolution.
        run(&mut env, "k=v $nothing");
        assert_eq!(env.get("k"), None);
        // `k` set before: the old value comes back.
        run(&mut env, "k=old");
        run(&mut env, "k=new $nothing");
        assert_eq!(env.get("k"), Some("old"));
    }

    #[test]
    fn empty_resolution_is_status_zero() {
        let mut env = Env::bare();
        assert_eq!(run(&mut env, "$unset_variable"), 0);
    }

    #[test]
    fn if_zero_sentinel_reads_current_status() {
        let mut env = Env::bare();
        env.set_status(1);
        run(&mut env, "&& y=ran");
        assert_eq!(env.get("y"), None);
        env.set_status(0);
        run(&mut env, "&& y=ran");
        assert_eq!(env.get("y"), Some("ran"));
    }

    #[test]
    fn if_nonzero_sentinel_reads_current_status() {
        let mut env = Env::bare();
        env.set_status(0);
        run(&mut env, "|| y=ran");
        assert_eq!(env.get("y"), None);
        env.set_status(3);
        run(&mut env, "|| y=ran");
        assert_eq!(env.get("y"), Some("ran"));
    }

    #[test]
    fn group_runs_in_order() {
        let mut env = Env::bare();
        run(&mut env, "{ a=1; a=2 }");
        assert_eq!(env.get("a"), Some("2"));
    }

    #[test]
    fn missing_command_is_127() {
        let mut env = Env::bare();
        env.set_raw("path", "/nonexistent-dir-zz");
        assert_eq!(run(&mut env, "no-such-command"), 127);
        assert_eq!(env.get("status"), Some("127"));
    }

    #[test]
    fn builtin_escape_rejects_unknown() {
        let mut env = Env::bare();
        assert_eq!(run(&mut env, "builtin frobnicate"), 1);
    }

    #[test]
    fn prompt_mode_ends_with_the_prompt_invocation() {
        let mut env = Env::bare();
        run(&mut env, "fn prompt { p=ran }");
        env.set_status(9);
        // The prompt invocation runs but leaves `$status` alone.
        run(&mut env, "prompt");
        assert_eq!(env.get("p"), Some("ran"));
        assert_eq!(env.get("status"), Some("9"));
        // A later command in the same run updates `$status` again.
        run(&mut env, "prompt; $nothing");
        assert_eq!(env.get("status"), Some("0"));
    }
}
