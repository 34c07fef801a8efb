//! Parser for rz
//!
//! Walks the flat token list with an integer cursor and builds the command
//! tree. The grammar's one unusual rule is the free caret: two adjacent
//! primaries with no intervening whitespace concatenate as though an
//! explicit `^` stood between them. Assignment prefixes are parsed
//! speculatively and the cursor rewinds on the first mismatch.

use crate::ast::{Arg, Assign, Command, Direction, Redirect, Simple};
use crate::lexer::{self, Tag, Token};
use thiserror::Error;

/// Any malformed construct reports the same error, carrying the byte
/// offset of the offending token.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error at byte {at}")]
    Syntax { at: usize },
}

/// Parse `source` into a command list. On error the partial list is
/// discarded.
pub fn parse(source: &str) -> Result<Vec<Command>, ParseError> {
    let tokens = lexer::tokenize(source);
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    parser.parse_commands(None)
}

/// Token kinds that can open a simple command.
fn starts_simple(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::Word
            | Tag::QuotedWord
            | Tag::Variable
            | Tag::VariableCount
            | Tag::VariableString
            | Tag::BacktickBrace
            | Tag::LeftParen
    )
}

/// Token kinds that can open an argument. `=` resolves to a literal `=`
/// word so that flags like `--opt=value` survive.
fn starts_argument(tag: Tag) -> bool {
    starts_simple(tag) || tag == Tag::Equal
}

/// Token kinds that can open the value of a `key=value` assignment.
fn starts_value(tag: Tag) -> bool {
    starts_simple(tag)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Token {
        self.tokens[self.pos]
    }

    fn tag(&self) -> Tag {
        self.current().tag
    }

    /// Advance the cursor; the trailing `Eof` token is never passed.
    fn bump(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn text(&self, token: Token) -> &'a str {
        token.text(self.source)
    }

    fn fail<T>(&self) -> Result<T, ParseError> {
        Err(ParseError::Syntax {
            at: self.current().start,
        })
    }

    /// Skip whitespace only. A comment swallowed its trailing newline in
    /// the lexer, so inside a statement it must terminate like a newline
    /// would, not be skipped over.
    fn skip_blank(&mut self) {
        while self.tag() == Tag::Whitespace {
            self.bump();
        }
    }

    /// The top-level loop, also used for `{ ... }` groups and `` `{ ... } ``
    /// substitution bodies (with `closer` set to the closing brace).
    fn parse_commands(&mut self, closer: Option<Tag>) -> Result<Vec<Command>, ParseError> {
        let mut commands = Vec::new();
        let mut pipe_lhs: Option<Command> = None;
        loop {
            let tag = self.tag();
            if Some(tag) == closer {
                self.bump();
                break;
            }
            match tag {
                Tag::Whitespace | Tag::Comment | Tag::Newline | Tag::Semicolon => self.bump(),
                Tag::Eof => {
                    if closer.is_some() {
                        return self.fail();
                    }
                    break;
                }
                Tag::AmpAmp => {
                    self.bump();
                    commands.push(Command::IfZero);
                }
                Tag::PipePipe => {
                    self.bump();
                    commands.push(Command::IfNonzero);
                }
                Tag::Pipe => {
                    // Pop the previous command; the next one becomes the
                    // right side of a pipe wrapping both.
                    if pipe_lhs.is_some() {
                        return self.fail();
                    }
                    let Some(lhs) = commands.pop() else {
                        return self.fail();
                    };
                    pipe_lhs = Some(lhs);
                    self.bump();
                }
                Tag::LeftBrace => {
                    self.bump();
                    let group = self.parse_commands(Some(Tag::RightBrace))?;
                    push(&mut commands, &mut pipe_lhs, Command::Group(group));
                }
                Tag::KeywordFn => {
                    let function = self.parse_function()?;
                    push(&mut commands, &mut pipe_lhs, function);
                }
                t if starts_simple(t) => {
                    for command in self.parse_simple()? {
                        push(&mut commands, &mut pipe_lhs, command);
                    }
                }
                _ => return self.fail(),
            }
        }
        if pipe_lhs.is_some() {
            // `a |` with no right side.
            return self.fail();
        }
        Ok(commands)
    }

    /// A simple command: optional assignment prefix, then arguments and
    /// redirections until a terminator. A prefix with no following command
    /// becomes standalone assignment statements.
    fn parse_simple(&mut self) -> Result<Vec<Command>, ParseError> {
        let assignments = self.parse_assignments()?;
        let mut arguments = Vec::new();
        let mut redirections = Vec::new();
        loop {
            self.skip_blank();
            match self.tag() {
                Tag::Less | Tag::Greater | Tag::GreaterGreater => {
                    redirections.push(self.parse_redirection()?);
                }
                t if starts_argument(t) => arguments.push(self.next_argument()?),
                _ => break,
            }
        }
        if arguments.is_empty() && redirections.is_empty() {
            if assignments.is_empty() {
                return self.fail();
            }
            return Ok(assignments.into_iter().map(Command::Assignment).collect());
        }
        Ok(vec![Command::Simple(Simple {
            arguments,
            redirections,
            assignments,
        })])
    }

    /// Consume `WORD '=' value` tuples; on any mismatch rewind to the start
    /// of the failed tuple and return what was collected.
    fn parse_assignments(&mut self) -> Result<Vec<Assign>, ParseError> {
        let mut assignments = Vec::new();
        loop {
            let save = self.pos;
            self.skip_blank();
            if self.tag() != Tag::Word || self.tokens[self.pos + 1].tag != Tag::Equal {
                self.pos = save;
                return Ok(assignments);
            }
            let key = self.text(self.current()).to_string();
            self.bump();
            self.bump();
            if !starts_value(self.tag()) {
                self.pos = save;
                return Ok(assignments);
            }
            let value = self.next_argument()?;
            assignments.push(Assign { key, value });
        }
    }

    /// One argument with caret folding. Explicit carets fold left; a free
    /// caret in front of a variable form recurses, which gives the
    /// right-leaning tree at variable boundaries (`foo$bar.c` parses as
    /// `foo ^ ($bar ^ .c)`).
    fn next_argument(&mut self) -> Result<Arg, ParseError> {
        let mut lhs = self.next_primary()?;
        loop {
            if self.tag() == Tag::Caret {
                self.bump();
                let rhs = self.next_primary()?;
                lhs = concat(lhs, rhs);
                continue;
            }
            if !self.continues(&lhs) {
                break;
            }
            if matches!(
                self.tag(),
                Tag::Variable | Tag::VariableCount | Tag::VariableString
            ) {
                let rhs = self.next_argument()?;
                return Ok(concat(lhs, rhs));
            }
            let rhs = self.next_primary()?;
            lhs = concat(lhs, rhs);
        }
        Ok(lhs)
    }

    /// The free-caret rule: does the current token continue `lhs`? Words
    /// may continue into a list; variables may not (a directly following
    /// `(` was already taken as a subscript).
    fn continues(&self, lhs: &Arg) -> bool {
        match self.tag() {
            Tag::Word
            | Tag::QuotedWord
            | Tag::Variable
            | Tag::VariableCount
            | Tag::VariableString
            | Tag::Equal => true,
            Tag::LeftParen => matches!(lhs, Arg::Word(_) | Arg::QuotedWord(_)),
            _ => false,
        }
    }

    fn next_primary(&mut self) -> Result<Arg, ParseError> {
        let token = self.current();
        match token.tag {
            Tag::Word => {
                self.bump();
                Ok(Arg::Word(self.text(token).to_string()))
            }
            Tag::QuotedWord => {
                self.bump();
                Ok(Arg::QuotedWord(self.text(token).to_string()))
            }
            Tag::Variable => {
                self.bump();
                let key = self.text(token)[1..].to_string();
                if self.tag() == Tag::LeftParen {
                    let fields = self.parse_list()?;
                    return Ok(Arg::VariableSubscript {
                        key,
                        fields: Box::new(Arg::List(fields)),
                    });
                }
                Ok(Arg::Variable(key))
            }
            Tag::VariableCount => {
                self.bump();
                Ok(Arg::VariableCount(self.text(token)[2..].to_string()))
            }
            Tag::VariableString => {
                self.bump();
                Ok(Arg::VariableString(self.text(token)[2..].to_string()))
            }
            Tag::LeftParen => Ok(Arg::List(self.parse_list()?)),
            Tag::BacktickBrace => {
                self.bump();
                let commands = self.parse_commands(Some(Tag::RightBrace))?;
                Ok(Arg::Substitution(commands))
            }
            Tag::Equal => {
                self.bump();
                Ok(Arg::Word("=".to_string()))
            }
            _ => self.fail(),
        }
    }

    /// `( ... )` with whitespace-separated elements; a nested list is
    /// flattened into the containing one.
    fn parse_list(&mut self) -> Result<Vec<Arg>, ParseError> {
        self.bump();
        let mut items = Vec::new();
        loop {
            match self.tag() {
                Tag::Whitespace | Tag::Comment | Tag::Newline => self.bump(),
                Tag::RightParen => {
                    self.bump();
                    return Ok(items);
                }
                t if starts_argument(t) => match self.next_argument()? {
                    Arg::List(inner) => items.extend(inner),
                    arg => items.push(arg),
                },
                _ => return self.fail(),
            }
        }
    }

    /// `<`, `>`, `>>`, with an optional immediately-following `[n]` word
    /// selecting the target descriptor. The aliasing form `>[n=m]` does not
    /// parse as a descriptor here; it reaches the interpreter as a
    /// concatenated argument.
    fn parse_redirection(&mut self) -> Result<Redirect, ParseError> {
        let (direction, append) = match self.tag() {
            Tag::Less => (Direction::In, false),
            Tag::Greater => (Direction::Out, false),
            _ => (Direction::Out, true),
        };
        self.bump();
        let mut fd = match direction {
            Direction::In => 0,
            Direction::Out => 1,
        };
        if self.tag() == Tag::Word {
            let token = self.current();
            let text = self.text(token);
            if let Some(rest) = text.strip_prefix('[') {
                if let Some((number, tail)) = rest.split_once(']') {
                    if let Ok(n) = number.parse::<i32>() {
                        self.bump();
                        fd = n;
                        let file = if tail.is_empty() {
                            self.skip_blank();
                            if !starts_argument(self.tag()) {
                                return self.fail();
                            }
                            self.next_argument()?
                        } else {
                            Arg::Word(tail.to_string())
                        };
                        return Ok(Redirect {
                            direction,
                            append,
                            fd,
                            file,
                        });
                    }
                }
            }
        }
        self.skip_blank();
        if !starts_argument(self.tag()) {
            return self.fail();
        }
        let file = self.next_argument()?;
        Ok(Redirect {
            direction,
            append,
            fd,
            file,
        })
    }

    /// `fn name { body }` - the body is the raw source between the braces,
    /// found by counting brace tokens. It is not parsed here.
    fn parse_function(&mut self) -> Result<Command, ParseError> {
        self.bump();
        self.skip_blank();
        if self.tag() != Tag::Word {
            return self.fail();
        }
        let name = self.text(self.current()).to_string();
        self.bump();
        self.skip_blank();
        if self.tag() != Tag::LeftBrace {
            return self.fail();
        }
        self.bump();
        let body_start = self.current().start;
        let mut depth = 1usize;
        loop {
            let token = self.current();
            match token.tag {
                Tag::LeftBrace
                | Tag::LessBrace
                | Tag::GreaterBrace
                | Tag::LessGreaterBrace
                | Tag::BacktickBrace => depth += 1,
                Tag::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return Ok(Command::Function {
                            name,
                            body: self.source[body_start..token.start].to_string(),
                        });
                    }
                }
                Tag::Eof => return self.fail(),
                _ => {}
            }
            self.bump();
        }
    }
}

fn concat(lhs: Arg, rhs: Arg) -> Arg {
    Arg::Concatenate {
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Append `command`, wrapping it as the right side of a pending pipe first.
fn push(commands: &mut Vec<Command>, pipe_lhs: &mut Option<Command>, command: Command) {
    match pipe_lhs.take() {
        Some(lhs) => commands.push(Command::Pipe {
            lhs: Box::new(lhs),
            rhs: Box::new(command),
        }),
        None => commands.push(command),
    }
}
