//! Prompt handling for the interactive shell.
//!
//! `$prompt` holds up to four `0x01`-separated fields
//! (left/top-left/top-right/right); the plain editor here only renders the
//! left one. If the user defined a `prompt` function it runs before each
//! line, in prompt mode, so it can rewrite `$prompt` without clobbering
//! `$status`.

use rz::env::{Env, LIST_SEP};

/// Run the user's `prompt` function, if any.
pub(crate) fn refresh(env: &mut Env) {
    if env.get("fn#prompt").is_some() {
        rz::exec("prompt", env);
    }
}

/// The left prompt field.
pub(crate) fn left(env: &Env) -> String {
    env.get("prompt")
        .and_then(|prompt| prompt.split(LIST_SEP).next())
        .filter(|field| !field.is_empty())
        .unwrap_or("> ")
        .to_string()
}
