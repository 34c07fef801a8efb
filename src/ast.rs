//! AST for rz
//!
//! The parser produces a list of commands; each command owns its argument
//! trees. Arguments stay unresolved until the interpreter walks them, so a
//! parsed tree can be executed (or re-executed) against any environment.

/// One argument position of a command, before resolution.
///
/// Resolution turns every variant into an ordered list of words; a single
/// argument may contribute zero, one, or many words to the final argv.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A bare word.
    Word(String),
    /// A single-quoted word, surrounding quotes included. The interpreter
    /// strips one quote pair and collapses `''` to `'`.
    QuotedWord(String),
    /// `$name` - expands to the stored list.
    Variable(String),
    /// `$#name` - expands to the element count as one decimal word.
    VariableCount(String),
    /// `$"name` - expands to the list joined by spaces as one word.
    VariableString(String),
    /// `$name(indices)` - selects 1-based elements of the stored list.
    VariableSubscript { key: String, fields: Box<Arg> },
    /// Two adjacent primaries joined by an explicit or free caret.
    Concatenate { lhs: Box<Arg>, rhs: Box<Arg> },
    /// `(a b c)` - a grouped sequence; nested lists are flattened at parse
    /// time.
    List(Vec<Arg>),
    /// `` `{cmds} `` - run the commands, split captured stdout by `$ifs`.
    Substitution(Vec<Command>),
}

/// `key=value`, either a standalone statement or the local prefix of a
/// simple command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    pub key: String,
    pub value: Arg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// A single redirection attached to a simple command.
///
/// `file` is an ordinary argument; when it resolves to a `[n]`/`[n=m]`
/// word the interpreter treats it as descriptor aliasing instead of a
/// filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub direction: Direction,
    pub append: bool,
    pub fd: i32,
    pub file: Arg,
}

/// A simple command: argv-producing arguments plus redirections and
/// command-local assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simple {
    pub arguments: Vec<Arg>,
    pub redirections: Vec<Redirect>,
    pub assignments: Vec<Assign>,
}

/// One node of the command tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Simple(Simple),
    /// `fn name { body }` - the body is kept as raw source and re-parsed
    /// when the function is called.
    Function { name: String, body: String },
    Assignment(Assign),
    /// `{ a; b }`
    Group(Vec<Command>),
    /// Sentinel emitted for `&&`: the next command runs only while
    /// `$status` is `0`.
    IfZero,
    /// Sentinel emitted for `||`: the next command runs only while
    /// `$status` is nonzero.
    IfNonzero,
    Pipe {
        lhs: Box<Command>,
        rhs: Box<Command>,
    },
}
