//! rz - an rc-flavored command shell
//!
//! Usage:
//!   rz              Start an interactive shell
//!   rz -c "cmd"     Execute a single command line
//!   rz script.rz    Execute a script file

mod cli;
mod prompt;
mod rcfile;
mod repl;

use cli::Invocation;
use rz::env::Env;
use std::fs;
use std::io::Read;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match cli::parse_args(&args) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("rz: {message}");
            return ExitCode::from(2);
        }
    };
    match invocation {
        Invocation::Help => {
            cli::print_help();
            ExitCode::SUCCESS
        }
        Invocation::Version => {
            cli::print_version();
            ExitCode::SUCCESS
        }
        Invocation::Command(source) => {
            let mut env = startup();
            ExitCode::from(rz::exec(&source, &mut env))
        }
        Invocation::Script(path) => {
            let source = match fs::read_to_string(&path) {
                Ok(source) => source,
                Err(error) => {
                    eprintln!("rz: {}: {error}", path.display());
                    return ExitCode::FAILURE;
                }
            };
            let mut env = startup();
            ExitCode::from(rz::exec(&source, &mut env))
        }
        Invocation::Repl => {
            let mut env = startup();
            if !nix::unistd::isatty(0).unwrap_or(false) {
                // Piped input: run it as a script.
                let mut source = String::new();
                if let Err(error) = std::io::stdin().read_to_string(&mut source) {
                    eprintln!("rz: {error}");
                    return ExitCode::FAILURE;
                }
                return ExitCode::from(rz::exec(&source, &mut env));
            }
            match repl::run(&mut env) {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    eprintln!("rz: {error}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn startup() -> Env {
    let mut env = Env::new();
    rcfile::load_config(&mut env);
    env
}
