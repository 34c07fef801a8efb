//! Argument resolution
//!
//! Maps each AST argument to an ordered list of words. Lists keep their
//! element order, concatenation is a broadcast join, and substitution runs
//! the embedded commands through the same interpreter.

use super::{ExecError, Interpreter};
use crate::ast::Arg;
use crate::env::LIST_SEP;

impl Interpreter<'_> {
    pub(crate) fn resolve_arg(&mut self, arg: &Arg) -> Result<Vec<String>, ExecError> {
        match arg {
            Arg::Word(word) => Ok(vec![word.clone()]),
            Arg::QuotedWord(quoted) => Ok(unquote(quoted)),
            Arg::Variable(name) => Ok(self.lookup(name)),
            Arg::VariableCount(name) => Ok(vec![self.env.count(name).to_string()]),
            Arg::VariableString(name) => Ok(match self.env.get(name) {
                None => Vec::new(),
                Some(value) => vec![value.replace(LIST_SEP, " ")],
            }),
            Arg::VariableSubscript { key, fields } => self.subscript(key, fields),
            Arg::Concatenate { lhs, rhs } => {
                let left = self.resolve_arg(lhs)?;
                let right = self.resolve_arg(rhs)?;
                concatenate(left, right)
            }
            Arg::List(items) => {
                let mut out = Vec::new();
                for item in items {
                    out.extend(self.resolve_arg(item)?);
                }
                Ok(out)
            }
            Arg::Substitution(commands) => self.run_substitution(commands),
        }
    }

    /// Plain variable lookup. All-digit names are positionals: `$1` is the
    /// first element of `$*`, out-of-range is empty.
    fn lookup(&self, name: &str) -> Vec<String> {
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            let star = self.env.list("*");
            let n: usize = name.parse().unwrap_or(0);
            if n >= 1 && n <= star.len() {
                return vec![star[n - 1].clone()];
            }
            return Vec::new();
        }
        self.env.list(name)
    }

    /// 1-based index selection. Index 0 and out-of-range indices select
    /// nothing; a non-numeric index is a syntax error.
    fn subscript(&mut self, key: &str, fields: &Arg) -> Result<Vec<String>, ExecError> {
        let list = self.lookup(key);
        let indices = self.resolve_arg(fields)?;
        let mut out = Vec::new();
        for index in &indices {
            let n: usize = index
                .parse()
                .map_err(|_| ExecError::Syntax(format!("bad subscript: {index}")))?;
            if n >= 1 && n <= list.len() {
                out.push(list[n - 1].clone());
            }
        }
        Ok(out)
    }
}

/// Strip one quote pair and collapse `''` to `'`. Anything shorter than a
/// quote pair resolves to nothing.
fn unquote(quoted: &str) -> Vec<String> {
    if quoted.len() < 2 {
        return Vec::new();
    }
    vec![quoted[1..quoted.len() - 1].replace("''", "'")]
}

/// Broadcast join: pairwise at equal length, one-to-many otherwise. An
/// empty side is a syntax error; multi-element lists of unequal length
/// produce nothing.
fn concatenate(left: Vec<String>, right: Vec<String>) -> Result<Vec<String>, ExecError> {
    if left.is_empty() || right.is_empty() {
        return Err(ExecError::Syntax(
            "cannot concatenate an empty list".to_string(),
        ));
    }
    if left.len() == right.len() {
        return Ok(left
            .into_iter()
            .zip(right)
            .map(|(l, r)| l + &r)
            .collect());
    }
    if right.len() == 1 {
        let suffix = &right[0];
        return Ok(left.into_iter().map(|l| l + suffix).collect());
    }
    if left.len() == 1 {
        let prefix = &left[0];
        return Ok(right.into_iter().map(|r| prefix.clone() + &r).collect());
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;

    fn resolve(env: &mut Env, arg: &Arg) -> Result<Vec<String>, ExecError> {
        Interpreter::new(env).resolve_arg(arg)
    }

    fn word(w: &str) -> Arg {
        Arg::Word(w.to_string())
    }

    #[test]
    fn word_is_one_element() {
        let mut env = Env::bare();
        assert_eq!(resolve(&mut env, &word("x")).unwrap(), vec!["x"]);
    }

    #[test]
    fn quoted_word_unquotes() {
        let mut env = Env::bare();
        let arg = Arg::QuotedWord("'X'".to_string());
        assert_eq!(resolve(&mut env, &arg).unwrap(), vec!["X"]);
    }

    #[test]
    fn four_quotes_is_one_quote() {
        let mut env = Env::bare();
        let arg = Arg::QuotedWord("''''".to_string());
        assert_eq!(resolve(&mut env, &arg).unwrap(), vec!["'"]);
    }

    #[test]
    fn degenerate_quoted_word_is_empty() {
        let mut env = Env::bare();
        let arg = Arg::QuotedWord("'".to_string());
        assert_eq!(resolve(&mut env, &arg).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn absent_variable_is_empty() {
        let mut env = Env::bare();
        let arg = Arg::Variable("nope".to_string());
        assert_eq!(resolve(&mut env, &arg).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn variable_splits_on_separator() {
        let mut env = Env::bare();
        env.set_list("xs", &["a".into(), "b".into(), "c".into()]);
        let arg = Arg::Variable("xs".to_string());
        assert_eq!(resolve(&mut env, &arg).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn count_of_absent_is_zero() {
        let mut env = Env::bare();
        let arg = Arg::VariableCount("nope".to_string());
        assert_eq!(resolve(&mut env, &arg).unwrap(), vec!["0"]);
    }

    #[test]
    fn count_and_string_forms() {
        let mut env = Env::bare();
        env.set_list("xs", &["a".into(), "b".into(), "c".into()]);
        let count = Arg::VariableCount("xs".to_string());
        assert_eq!(resolve(&mut env, &count).unwrap(), vec!["3"]);
        let string = Arg::VariableString("xs".to_string());
        assert_eq!(resolve(&mut env, &string).unwrap(), vec!["a b c"]);
        // The stored value is untouched.
        assert_eq!(env.get("xs"), Some("a\u{1}b\u{1}c"));
    }

    #[test]
    fn string_of_absent_is_empty() {
        let mut env = Env::bare();
        let arg = Arg::VariableString("nope".to_string());
        assert_eq!(resolve(&mut env, &arg).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn subscript_selects_one_based() {
        let mut env = Env::bare();
        env.set_list("xs", &["a".into(), "b".into(), "c".into()]);
        let arg = Arg::VariableSubscript {
            key: "xs".to_string(),
            fields: Box::new(Arg::List(vec![word("2"), word("2"), word("1")])),
        };
        assert_eq!(resolve(&mut env, &arg).unwrap(), vec!["b", "b", "a"]);
    }

    #[test]
    fn subscript_zero_and_out_of_range_select_nothing() {
        let mut env = Env::bare();
        env.set_list("xs", &["a".into(), "b".into()]);
        let arg = Arg::VariableSubscript {
            key: "xs".to_string(),
            fields: Box::new(Arg::List(vec![word("0"), word("5"), word("1")])),
        };
        assert_eq!(resolve(&mut env, &arg).unwrap(), vec!["a"]);
    }

    #[test]
    fn non_numeric_subscript_is_an_error() {
        let mut env = Env::bare();
        env.set_list("xs", &["a".into()]);
        let arg = Arg::VariableSubscript {
            key: "xs".to_string(),
            fields: Box::new(Arg::List(vec![word("first")])),
        };
        assert!(matches!(
            resolve(&mut env, &arg),
            Err(ExecError::Syntax(_))
        ));
    }

    #[test]
    fn positional_variables_read_star() {
        let mut env = Env::bare();
        env.set_list("*", &["hi".into(), "there".into()]);
        assert_eq!(
            resolve(&mut env, &Arg::Variable("1".to_string())).unwrap(),
            vec!["hi"]
        );
        assert_eq!(
            resolve(&mut env, &Arg::Variable("2".to_string())).unwrap(),
            vec!["there"]
        );
        assert_eq!(
            resolve(&mut env, &Arg::Variable("3".to_string())).unwrap(),
            Vec::<String>::new()
        );
    }

    #[test]
    fn concat_pairwise_and_broadcast() {
        assert_eq!(
            concatenate(vec!["a".into(), "b".into()], vec!["1".into(), "2".into()]).unwrap(),
            vec!["a1", "b2"]
        );
        assert_eq!(
            concatenate(vec!["a".into(), "b".into()], vec![".c".into()]).unwrap(),
            vec!["a.c", "b.c"]
        );
        assert_eq!(
            concatenate(vec!["p".into()], vec!["1".into(), "2".into()]).unwrap(),
            vec!["p1", "p2"]
        );
    }

    #[test]
    fn concat_empty_side_is_an_error() {
        assert!(concatenate(vec![], vec!["a".into()]).is_err());
        assert!(concatenate(vec!["a".into()], vec![]).is_err());
    }

    #[test]
    fn concat_unequal_multi_is_empty() {
        let out = concatenate(
            vec!["a".into(), "b".into()],
            vec!["1".into(), "2".into(), "3".into()],
        )
        .unwrap();
        assert_eq!(out, Vec::<String>::new());
    }

    #[test]
    fn list_concatenates_in_order() {
        let mut env = Env::bare();
        env.set_list("xs", &["b".into(), "c".into()]);
        let arg = Arg::List(vec![word("a"), Arg::Variable("xs".to_string()), word("d")]);
        assert_eq!(
            resolve(&mut env, &arg).unwrap(),
            vec!["a", "b", "c", "d"]
        );
    }
}
