//! Pipelines and command substitution
//!
//! The only place the shell forks. A pipe `A | B` forks one child per
//! side; each child rewires one end onto its standard descriptor, runs its
//! command through the same interpreter, and exits with that command's
//! status. Command substitution stays in-process: stdout is swapped for a
//! capture pipe while the substituted commands run inline.

use super::redirect::FdGuard;
use super::{ExecError, Interpreter};
use crate::ast::Command;
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{dup2, fork, pipe, read, ForkResult};
use std::io::{self, Write};
use std::os::fd::AsRawFd;

impl Interpreter<'_> {
    /// `lhs | rhs`. The parent reaps both children; the pipeline's status
    /// is the right-hand side's.
    pub(crate) fn run_pipeline(
        &mut self,
        lhs: &Command,
        rhs: &Command,
    ) -> Result<u8, ExecError> {
        io::stdout().flush().ok();
        let (reader, writer) = pipe()?;
        let left = match unsafe { fork() }? {
            ForkResult::Child => {
                drop(reader);
                if dup2(writer.as_raw_fd(), 1).is_err() {
                    std::process::exit(1);
                }
                drop(writer);
                let status = self.exec_in_child(lhs);
                std::process::exit(i32::from(status));
            }
            ForkResult::Parent { child } => child,
        };
        let right = match unsafe { fork() }? {
            ForkResult::Child => {
                drop(writer);
                if dup2(reader.as_raw_fd(), 0).is_err() {
                    std::process::exit(1);
                }
                drop(reader);
                let status = self.exec_in_child(rhs);
                std::process::exit(i32::from(status));
            }
            ForkResult::Parent { child } => child,
        };
        drop(reader);
        drop(writer);
        let _ = waitpid(left, None);
        let status = match waitpid(right, None) {
            Ok(WaitStatus::Exited(_, code)) => code as u8,
            _ => 1,
        };
        Ok(status)
    }

    /// One side of a pipe, running in the forked child.
    fn exec_in_child(&mut self, command: &Command) -> u8 {
        match self.exec_command(command) {
            Ok(status) => status,
            Err(error) => {
                eprintln!("rz: {error}");
                1
            }
        }
    }

    /// `` `{cmds} ``: capture stdout of the commands (run inline, not
    /// forked) and split it into words on the `$ifs` bytes.
    pub(crate) fn run_substitution(
        &mut self,
        commands: &[Command],
    ) -> Result<Vec<String>, ExecError> {
        let (reader, writer) = pipe()?;
        set_nonblocking(reader.as_raw_fd())?;
        io::stdout().flush().ok();
        let guard = FdGuard::save()?;
        dup2(writer.as_raw_fd(), 1)?;
        drop(writer);
        self.run(commands);
        // Restoring stdout closes the last write end, so the drain below
        // sees EOF instead of blocking.
        drop(guard);
        let mut bytes = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            match read(reader.as_raw_fd(), &mut chunk) {
                Ok(0) => break,
                Ok(n) => bytes.extend_from_slice(&chunk[..n]),
                Err(Errno::EAGAIN) => break,
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(errno.into()),
            }
        }
        Ok(split_fields(&bytes, &self.separators()))
    }

    /// The `$ifs` separator bytes. Each element must be a single byte;
    /// anything else is skipped with a report.
    fn separators(&self) -> Vec<u8> {
        let mut separators = Vec::new();
        for element in self.env.list("ifs") {
            match element.as_bytes() {
                [b] => separators.push(*b),
                _ => eprintln!("rz: ifs: skipping separator {element:?}"),
            }
        }
        separators
    }
}

fn set_nonblocking(fd: std::os::fd::RawFd) -> Result<(), ExecError> {
    let flags = fcntl(fd, FcntlArg::F_GETFL)?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(fd, FcntlArg::F_SETFL(flags))?;
    Ok(())
}

/// Split on any separator byte; empty fields are dropped.
fn split_fields(bytes: &[u8], separators: &[u8]) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = Vec::new();
    for &b in bytes {
        if separators.contains(&b) {
            if !current.is_empty() {
                words.push(String::from_utf8_lossy(&current).into_owned());
                current.clear();
            }
        } else {
            current.push(b);
        }
    }
    if !current.is_empty() {
        words.push(String::from_utf8_lossy(&current).into_owned());
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_drops_empty_fields() {
        let words = split_fields(b"a b\n\nc ", &[b' ', b'\n']);
        assert_eq!(words, vec!["a", "b", "c"]);
    }

    #[test]
    fn split_without_separators_is_one_word() {
        assert_eq!(split_fields(b"abc", &[]), vec!["abc"]);
        assert_eq!(split_fields(b"", &[b' ']), Vec::<String>::new());
    }
}
