//! Process environment with rc-style list values.
//!
//! Every value is a single string; lists are encoded by joining elements
//! with byte `0x01`. The empty list is the absence of the key, so `set_list`
//! with no elements removes. Function bodies are ordinary entries under
//! `fn#<name>`, which is what lets children inherit definitions.

use std::collections::HashMap;

/// The list separator byte, as a char and as a str for joining/splitting.
pub const LIST_SEP: char = '\u{1}';
pub const LIST_SEP_STR: &str = "\u{1}";

/// The shell's variable store. One instance is threaded through the
/// interpreter; children receive it verbatim as their process environment.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// An environment seeded from the process environment plus the shell's
    /// convention keys.
    pub fn new() -> Self {
        let mut vars: HashMap<String, String> = std::env::vars().collect();
        let home = vars.get("HOME").cloned().unwrap_or_else(|| "/".to_string());
        let path = vars.get("PATH").cloned().unwrap_or_default();
        vars.insert("home".to_string(), home);
        vars.insert("path".to_string(), path.replace(':', LIST_SEP_STR));
        vars.insert("ifs".to_string(), " \u{1}\t\u{1}\n".to_string());
        vars.insert("nl".to_string(), "\n".to_string());
        vars.insert("tab".to_string(), "\t".to_string());
        vars.insert("prompt".to_string(), "> \u{1}\u{1}\u{1}".to_string());
        vars.insert("status".to_string(), "0".to_string());
        if let Ok(pwd) = std::env::current_dir() {
            vars.insert("PWD".to_string(), pwd.to_string_lossy().into_owned());
        }
        Env { vars }
    }

    /// An empty environment with none of the convention keys. Useful for
    /// embedding and for tests that need determinism.
    pub fn bare() -> Self {
        Env::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Store a value verbatim, list encoding and all.
    pub fn set_raw(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }

    /// Store a list; the empty list removes the key.
    pub fn set_list(&mut self, name: &str, values: &[String]) {
        if values.is_empty() {
            self.vars.remove(name);
        } else {
            self.vars.insert(name.to_string(), values.join(LIST_SEP_STR));
        }
    }

    /// The stored list, split on the separator. A missing key is the empty
    /// list; this never mutates the stored value.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.vars.get(name) {
            None => Vec::new(),
            Some(value) => value.split(LIST_SEP).map(String::from).collect(),
        }
    }

    /// Element count of the stored list; a missing key counts zero.
    pub fn count(&self, name: &str) -> usize {
        match self.vars.get(name) {
            None => 0,
            Some(value) => value.split(LIST_SEP).count(),
        }
    }

    pub fn set_status(&mut self, status: u8) {
        self.vars.insert("status".to_string(), status.to_string());
    }

    /// All entries, for handing to a spawned child.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_round_trip() {
        let mut env = Env::bare();
        env.set_list("xs", &["a".into(), "b".into(), "c".into()]);
        assert_eq!(env.get("xs"), Some("a\u{1}b\u{1}c"));
        assert_eq!(env.list("xs"), vec!["a", "b", "c"]);
        assert_eq!(env.count("xs"), 3);
    }

    #[test]
    fn empty_list_is_absence() {
        let mut env = Env::bare();
        env.set_list("xs", &["a".into()]);
        env.set_list("xs", &[]);
        assert_eq!(env.get("xs"), None);
        assert_eq!(env.list("xs"), Vec::<String>::new());
        assert_eq!(env.count("xs"), 0);
    }

    #[test]
    fn single_empty_element_is_not_absence() {
        let mut env = Env::bare();
        env.set_list("x", &["".into()]);
        assert_eq!(env.get("x"), Some(""));
        assert_eq!(env.count("x"), 1);
    }

    #[test]
    fn seeded_conventions() {
        let env = Env::new();
        assert_eq!(env.list("ifs"), vec![" ", "\t", "\n"]);
        assert_eq!(env.get("nl"), Some("\n"));
        assert_eq!(env.get("tab"), Some("\t"));
        assert_eq!(env.get("status"), Some("0"));
        assert_eq!(env.get("prompt"), Some("> \u{1}\u{1}\u{1}"));
        assert!(env.get("home").is_some());
    }

    #[test]
    fn path_mirror_splits_on_colon() {
        let env = Env::new();
        let path = std::env::var("PATH").unwrap_or_default();
        let expect: Vec<String> = path.split(':').map(String::from).collect();
        assert_eq!(env.list("path"), expect);
    }

    #[test]
    fn status_is_decimal() {
        let mut env = Env::bare();
        env.set_status(127);
        assert_eq!(env.get("status"), Some("127"));
    }
}
