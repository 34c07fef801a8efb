//! rz - an rc-flavored command shell
//!
//! # Overview
//!
//! rz reads command lines, parses them into a command tree, expands
//! variables and substitutions, and executes the result as pipelines of
//! child processes, builtins, and user-defined functions. Variables hold
//! lists; the environment encodes them with a `0x01` separator so children
//! inherit everything, functions included.
//!
//! The core is three stages wired strictly forward: [`lexer`] turns bytes
//! into tagged byte ranges, [`parser`] turns tokens into [`ast`] command
//! trees, and [`interp`] walks a tree against an [`env::Env`]. The two
//! public contracts are [`parse`] and [`exec`]; the line editor, prompt
//! styling, and startup configuration live with the binary, not here.
//!
//! # Example
//!
//! ```
//! use rz::env::Env;
//!
//! let mut env = Env::bare();
//! rz::exec("greeting=(hello world)", &mut env);
//! assert_eq!(env.get("greeting"), Some("hello\u{1}world"));
//! ```

pub mod ast;
pub mod env;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod resolver;

// Re-export commonly used items
pub use ast::{Arg, Assign, Command, Direction, Redirect, Simple};
pub use env::Env;
pub use interp::{ExecError, Interpreter};
pub use lexer::{tokenize, Tag, Token};
pub use parser::{parse, ParseError};

use interp::redirect_guard;

/// Parse and execute `source` against `env`, returning the final status.
///
/// A syntax error at this outermost parse reports on stderr and returns
/// 255; runtime errors inside the script are reported per statement and
/// folded into `$status` without aborting the rest.
pub fn exec(source: &str, env: &mut Env) -> u8 {
    let commands = match parser::parse(source) {
        Ok(commands) => commands,
        Err(error) => {
            eprintln!("rz: {error}");
            env.set_status(255);
            return 255;
        }
    };
    let guard = redirect_guard();
    let status = Interpreter::new(env).run(&commands);
    drop(guard);
    status
}
