//! Tokenizer for Sass sources
//!
//! Produces a lazy, non-restartable stream of tokens carrying byte offsets
//! into the buffer being lexed. Only the structure the import resolver cares
//! about is recognised; everything else is split into identifiers and
//! single-character symbols.
//!
//! A lexical error is reported on the token itself (`TokenKind::Error`) and
//! ends the stream: every later call yields `Eof`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `@import`
    Import,
    /// `@include`
    Include,
    /// Any other `@name`
    AtKeyword,
    /// `/* ... */` or `// ...`
    Comment,
    /// `$name`
    Variable,
    Ident,
    /// Quoted string; the value excludes the quotes
    Str,
    /// Unquoted `url(...)`; the value is the text between the parentheses
    Url,
    Semicolon,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Comma,
    /// Any other single character
    Symbol,
    Eof,
    Error(String),
}

/// A lexed token.
///
/// `offset` is relative to the buffer the token was read from. After the
/// resolver splices a partial into its parent the offset is shifted by the
/// import site, so it stays meaningful in the parent's coordinate space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub offset: usize,
    /// Bytes spanned in the originating buffer (quotes included)
    pub len: usize,
    /// Marks the token for substitution by downstream consumers
    pub substitute: bool,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, offset: usize, len: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            offset,
            len,
            substitute: false,
        }
    }

    /// Offset just past the token in its originating buffer
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Structural markers kept as-is for downstream consumers
    pub fn is_passthrough(&self) -> bool {
        matches!(self.kind, TokenKind::Include | TokenKind::Comment)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            finished: false,
        }
    }

    /// Produce the next token. Returns `Eof` forever once the input (or an
    /// error) has been reached.
    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::new(TokenKind::Eof, "", self.src.len(), 0);
        }
        self.skip_whitespace();

        let start = self.pos;
        let Some(ch) = self.peek() else {
            self.finished = true;
            return Token::new(TokenKind::Eof, "", self.src.len(), 0);
        };

        match ch {
            '/' if self.byte_at(1) == Some(b'*') => self.block_comment(start),
            '/' if self.byte_at(1) == Some(b'/') => self.line_comment(start),
            '"' | '\'' => self.string(start, ch),
            '@' => self.at_keyword(start),
            '$' => self.variable(start),
            ';' => self.single(TokenKind::Semicolon),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            ':' => self.single(TokenKind::Colon),
            ',' => self.single(TokenKind::Comma),
            c if is_name_char(c) => {
                let end = self.scan_while(start, is_name_char);
                if self.src[start..end].eq_ignore_ascii_case("url")
                    && self.src.as_bytes().get(end) == Some(&b'(')
                {
                    if let Some(tok) = self.unquoted_url(start, end + 1) {
                        return tok;
                    }
                }
                self.pos = end;
                Token::new(TokenKind::Ident, &self.src[start..end], start, end - start)
            }
            _ => self.single(TokenKind::Symbol),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn byte_at(&self, ahead: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + ahead).copied()
    }

    fn skip_whitespace(&mut self) {
        self.pos = self.scan_while(self.pos, char::is_whitespace);
    }

    fn scan_while(&self, from: usize, pred: impl Fn(char) -> bool) -> usize {
        self.src[from..]
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(i, _)| from + i)
            .unwrap_or(self.src.len())
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        let ch_len = self.peek().map(char::len_utf8).unwrap_or(1);
        self.pos += ch_len;
        Token::new(kind, &self.src[start..self.pos], start, ch_len)
    }

    fn error(&mut self, at: usize, message: &str) -> Token {
        self.finished = true;
        Token::new(TokenKind::Error(message.to_string()), "", at, 0)
    }

    fn block_comment(&mut self, start: usize) -> Token {
        match self.src[start + 2..].find("*/") {
            Some(i) => {
                let end = start + 2 + i + 2;
                self.pos = end;
                Token::new(TokenKind::Comment, &self.src[start..end], start, end - start)
            }
            None => self.error(start, "unterminated comment"),
        }
    }

    fn line_comment(&mut self, start: usize) -> Token {
        let end = self.src[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(self.src.len());
        self.pos = end;
        Token::new(TokenKind::Comment, &self.src[start..end], start, end - start)
    }

    fn string(&mut self, start: usize, quote: char) -> Token {
        let body = start + 1;
        let mut escaped = false;
        for (i, c) in self.src[body..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '\n' => break,
                c if c == quote => {
                    let end = body + i + 1;
                    self.pos = end;
                    return Token::new(
                        TokenKind::Str,
                        &self.src[body..body + i],
                        start,
                        end - start,
                    );
                }
                _ => {}
            }
        }
        self.error(start, "unterminated string")
    }

    /// `url(` with an unquoted body runs to the closing `)` so that `//` in a
    /// scheme is not read as a comment. A quoted body lexes normally.
    fn unquoted_url(&mut self, start: usize, body: usize) -> Option<Token> {
        let first = self.scan_while(body, char::is_whitespace);
        if matches!(self.src.as_bytes().get(first), Some(b'"' | b'\'')) {
            return None;
        }
        let rest = &self.src[body..];
        match rest.find([')', '\n']) {
            Some(i) if rest.as_bytes()[i] == b')' => {
                let end = body + i + 1;
                self.pos = end;
                Some(Token::new(
                    TokenKind::Url,
                    self.src[body..body + i].trim(),
                    start,
                    end - start,
                ))
            }
            _ => Some(self.error(start, "unterminated url")),
        }
    }

    fn at_keyword(&mut self, start: usize) -> Token {
        let end = self.scan_while(start + 1, |c| c.is_alphanumeric() || c == '-' || c == '_');
        if end == start + 1 {
            return self.error(start, "expected name after '@'");
        }
        self.pos = end;
        let kind = match &self.src[start + 1..end] {
            "import" => TokenKind::Import,
            "include" => TokenKind::Include,
            _ => TokenKind::AtKeyword,
        };
        Token::new(kind, &self.src[start..end], start, end - start)
    }

    fn variable(&mut self, start: usize) -> Token {
        let end = self.scan_while(start + 1, is_name_char);
        if end == start + 1 {
            return self.single(TokenKind::Symbol);
        }
        self.pos = end;
        Token::new(TokenKind::Variable, &self.src[start..end], start, end - start)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '#' | '%' | '!')
}

/// 1-indexed line of a byte offset
pub fn line_of(src: &str, offset: usize) -> usize {
    let offset = offset.min(src.len());
    1 + src.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count()
}
