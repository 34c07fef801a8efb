//! Interactive read loop.

use crate::prompt;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use rz::env::Env;

/// Read and execute lines until end of input. History is in-memory only.
pub(crate) fn run(env: &mut Env) -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;
    loop {
        prompt::refresh(env);
        match editor.readline(&prompt::left(env)) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                rz::exec(&line, env);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("rz: {error}");
                break;
            }
        }
    }
    Ok(())
}
