//! Tokenization for rz
//!
//! A deterministic byte scanner with one byte of lookahead (two for the
//! `<>{` operator). Tokens carry half-open byte ranges into the source
//! instead of owned text; the parser slices the source when it needs the
//! bytes. Every input tokenizes - there is no lexer error - and the stream
//! always ends with a single end-of-input token.

/// Token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Eof,
    Whitespace,
    Comment,
    Newline,
    Word,
    /// `'...'`, surrounding quotes included in the range.
    QuotedWord,
    /// `$name`
    Variable,
    /// `$#name`
    VariableCount,
    /// `$"name`
    VariableString,
    Caret,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Semicolon,
    Backtick,
    /// `` `{ ``
    BacktickBrace,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Less,
    LessLess,
    /// `<{`
    LessBrace,
    /// `<>{`
    LessGreaterBrace,
    Greater,
    GreaterGreater,
    /// `>{`
    GreaterBrace,
    Equal,
    Tilde,
    Bang,
    At,
    KeywordFn,
    KeywordIf,
    KeywordElse,
    KeywordFor,
    KeywordIn,
    KeywordWhile,
    KeywordSwitch,
    KeywordCase,
}

/// A tag plus the half-open byte range `[start, end)` it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub tag: Tag,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// The source bytes this token covers.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Bytes that terminate a bare word.
fn is_word_byte(b: u8) -> bool {
    !matches!(
        b,
        b' ' | b'\t'
            | b'\r'
            | b'\n'
            | b'#'
            | b';'
            | b'&'
            | b'|'
            | b'^'
            | b'$'
            | b'`'
            | b'\''
            | b'{'
            | b'}'
            | b'('
            | b')'
            | b'<'
            | b'>'
            | b'='
            | b'~'
            | b'!'
            | b'@'
    )
}

/// Variable names are `[A-Za-z0-9_*]+`.
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'*'
}

/// Reclassify a finished word; only exact matches are keywords.
fn keyword(word: &str) -> Option<Tag> {
    match word {
        "case" => Some(Tag::KeywordCase),
        "else" => Some(Tag::KeywordElse),
        "fn" => Some(Tag::KeywordFn),
        "for" => Some(Tag::KeywordFor),
        "if" => Some(Tag::KeywordIf),
        "in" => Some(Tag::KeywordIn),
        "switch" => Some(Tag::KeywordSwitch),
        "while" => Some(Tag::KeywordWhile),
        _ => None,
    }
}

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            src: source.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn token(&self, tag: Tag, start: usize) -> Token {
        Token {
            tag,
            start,
            end: self.pos,
        }
    }

    pub fn next_token(&mut self) -> Token {
        let start = self.pos;
        let Some(b) = self.peek() else {
            return self.token(Tag::Eof, start);
        };
        match b {
            b' ' | b'\t' => {
                while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
                    self.pos += 1;
                }
                self.token(Tag::Whitespace, start)
            }
            b'\n' | b'\r' => {
                self.pos += 1;
                if b == b'\r' && self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
                self.token(Tag::Newline, start)
            }
            b'#' => self.comment(start),
            b'\'' => self.quoted_word(start),
            b'$' => self.variable(start),
            b'^' => self.single(Tag::Caret, start),
            b';' => self.single(Tag::Semicolon, start),
            b'=' => self.single(Tag::Equal, start),
            b'~' => self.single(Tag::Tilde, start),
            b'!' => self.single(Tag::Bang, start),
            b'@' => self.single(Tag::At, start),
            b'{' => self.single(Tag::LeftBrace, start),
            b'}' => self.single(Tag::RightBrace, start),
            b'(' => self.single(Tag::LeftParen, start),
            b')' => self.single(Tag::RightParen, start),
            b'&' => self.one_or_two(Tag::Amp, b'&', Tag::AmpAmp, start),
            b'|' => self.one_or_two(Tag::Pipe, b'|', Tag::PipePipe, start),
            b'`' => self.one_or_two(Tag::Backtick, b'{', Tag::BacktickBrace, start),
            b'<' => self.angle_in(start),
            b'>' => self.angle_out(start),
            _ => self.word(start),
        }
    }

    fn single(&mut self, tag: Tag, start: usize) -> Token {
        self.pos += 1;
        self.token(tag, start)
    }

    /// Greedy two-byte operator, falling back to the one-byte form.
    fn one_or_two(&mut self, one: Tag, second: u8, two: Tag, start: usize) -> Token {
        self.pos += 1;
        if self.peek() == Some(second) {
            self.pos += 1;
            return self.token(two, start);
        }
        self.token(one, start)
    }

    fn angle_in(&mut self, start: usize) -> Token {
        self.pos += 1;
        match self.peek() {
            Some(b'<') => {
                self.pos += 1;
                self.token(Tag::LessLess, start)
            }
            Some(b'{') => {
                self.pos += 1;
                self.token(Tag::LessBrace, start)
            }
            Some(b'>') if self.peek_at(1) == Some(b'{') => {
                self.pos += 2;
                self.token(Tag::LessGreaterBrace, start)
            }
            _ => self.token(Tag::Less, start),
        }
    }

    fn angle_out(&mut self, start: usize) -> Token {
        self.pos += 1;
        match self.peek() {
            Some(b'>') => {
                self.pos += 1;
                self.token(Tag::GreaterGreater, start)
            }
            Some(b'{') => {
                self.pos += 1;
                self.token(Tag::GreaterBrace, start)
            }
            _ => self.token(Tag::Greater, start),
        }
    }

    /// `#` through the next newline, exclusive. The newline itself is
    /// consumed and not re-emitted.
    fn comment(&mut self, start: usize) -> Token {
        while !matches!(self.peek(), None | Some(b'\n')) {
            self.pos += 1;
        }
        let end = self.pos;
        if self.peek() == Some(b'\n') {
            self.pos += 1;
        }
        Token {
            tag: Tag::Comment,
            start,
            end,
        }
    }

    /// Single-quoted word; `''` inside is an embedded quote and does not
    /// terminate the token.
    fn quoted_word(&mut self, start: usize) -> Token {
        self.pos += 1;
        loop {
            match self.peek() {
                None => break,
                Some(b'\'') => {
                    self.pos += 1;
                    if self.peek() == Some(b'\'') {
                        self.pos += 1;
                        continue;
                    }
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.token(Tag::QuotedWord, start)
    }

    /// `$name`, `$#name`, `$"name`. The name may be empty; a lone `$` at
    /// the end of input yields a zero-length name.
    fn variable(&mut self, start: usize) -> Token {
        self.pos += 1;
        let tag = match self.peek() {
            Some(b'#') => {
                self.pos += 1;
                Tag::VariableCount
            }
            Some(b'"') => {
                self.pos += 1;
                Tag::VariableString
            }
            _ => Tag::Variable,
        };
        while self.peek().is_some_and(is_name_byte) {
            self.pos += 1;
        }
        self.token(tag, start)
    }

    fn word(&mut self, start: usize) -> Token {
        while self.peek().is_some_and(is_word_byte) {
            self.pos += 1;
        }
        let token = self.token(Tag::Word, start);
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        match keyword(text) {
            Some(tag) => Token { tag, ..token },
            None => token,
        }
    }
}

/// Tokenize the whole source, ending with a single `Eof` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.tag == Tag::Eof;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
