//! File-descriptor plumbing
//!
//! The process fd table is shared with children, so anything that rewires
//! stdin/stdout/stderr must first save the triple and put it back
//! afterwards. `FdGuard` is that scope: acquiring dups the three standard
//! descriptors out of the way (at or above fd 10, close-on-exec so they
//! never leak into children), and dropping dup2s them back.

use super::{ExecError, Interpreter};
use crate::ast::{Direction, Redirect};
use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};
use std::io::{self, Write};
use std::os::fd::RawFd;
use std::path::Path;

/// Saved copies live at or above this descriptor so redirections to low
/// fds cannot clobber them.
const SAVED_FD_MIN: RawFd = 10;

pub(crate) struct FdGuard {
    saved: [RawFd; 3],
}

impl FdGuard {
    /// Save stdin/stdout/stderr. On failure whatever was saved so far is
    /// put back before the error propagates.
    pub(crate) fn save() -> Result<Self, ExecError> {
        let mut saved: [RawFd; 3] = [-1; 3];
        for fd in 0..3 {
            match fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(SAVED_FD_MIN)) {
                Ok(copy) => saved[fd as usize] = copy,
                Err(errno) => {
                    restore(&saved);
                    return Err(errno.into());
                }
            }
        }
        Ok(FdGuard { saved })
    }
}

impl Drop for FdGuard {
    fn drop(&mut self) {
        // Anything buffered for a redirected stdout must land there, not
        // on the restored descriptor.
        io::stdout().flush().ok();
        restore(&self.saved);
    }
}

fn restore(saved: &[RawFd; 3]) {
    for (target, &copy) in saved.iter().enumerate() {
        if copy >= 0 {
            let _ = dup2(copy, target as RawFd);
            let _ = close(copy);
        }
    }
}

impl Interpreter<'_> {
    /// Apply one redirection. The target must resolve to exactly one word;
    /// a `[n]`/`[n=m]` word aliases or closes descriptors instead of
    /// opening a file.
    pub(crate) fn apply_redirection(&mut self, redirect: &Redirect) -> Result<(), ExecError> {
        let resolved = self.resolve_arg(&redirect.file)?;
        let [target] = resolved.as_slice() else {
            return Err(ExecError::Syntax(
                "redirection needs exactly one target".to_string(),
            ));
        };
        if let Some(spec) = target
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
        {
            return apply_descriptor_alias(spec);
        }
        let flags = match (redirect.direction, redirect.append) {
            (Direction::In, _) => OFlag::O_RDONLY,
            (Direction::Out, false) => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            (Direction::Out, true) => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
        };
        io::stdout().flush().ok();
        let fd = open(Path::new(target), flags, Mode::from_bits_truncate(0o666)).map_err(
            |errno| ExecError::Open {
                path: target.clone(),
                errno,
            },
        )?;
        let result = dup2(fd, redirect.fd);
        let _ = close(fd);
        result?;
        Ok(())
    }
}

/// `[2=1]` duplicates fd 1 onto fd 2; `[2=]` and `[2]` close fd 2.
fn apply_descriptor_alias(spec: &str) -> Result<(), ExecError> {
    let (lhs, rhs) = match spec.split_once('=') {
        Some((lhs, rhs)) => (lhs, Some(rhs)),
        None => (spec, None),
    };
    let target: RawFd = lhs
        .parse()
        .map_err(|_| ExecError::Syntax(format!("bad redirection target: [{spec}]")))?;
    match rhs {
        None | Some("") => {
            io::stdout().flush().ok();
            let _ = close(target);
        }
        Some(source) => {
            let from: RawFd = source
                .parse()
                .map_err(|_| ExecError::Syntax(format!("bad redirection target: [{spec}]")))?;
            io::stdout().flush().ok();
            dup2(from, target)?;
        }
    }
    Ok(())
}
