//! Compilation backend seam
//!
//! The stylesheet compiler proper lives outside this crate. It receives the
//! flattened buffer (preamble included) and reports failures as a 1-indexed
//! line in that buffer, which the orchestrator translates back to the
//! original `file:line`.

use thiserror::Error;

use crate::config::{BuildConfig, OutputStyle};
use crate::lexer::{Lexer, TokenKind};
use crate::resolver::PREAMBLE;

/// Options forwarded to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    pub style: OutputStyle,
    pub comments: bool,
}

impl From<&BuildConfig> for CompileOptions {
    fn from(config: &BuildConfig) -> Self {
        Self {
            style: config.style,
            comments: config.comments,
        }
    }
}

/// Failure reported by a backend, positioned in the flattened buffer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct BackendError {
    pub line: usize,
    pub message: String,
}

impl BackendError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

pub trait Backend: Send + Sync {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, BackendError>;
}

/// Structural check standing in for a real compiler: braces and parentheses
/// must balance. On success the flattened source (minus the preamble) is
/// returned unchanged, or with blank space squeezed out for `compressed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckBackend;

impl Backend for CheckBackend {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, BackendError> {
        check_balance(source)?;

        let body = source.strip_prefix(PREAMBLE).unwrap_or(source);
        Ok(match options.style {
            OutputStyle::Compressed => body
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(""),
            _ => body.to_string(),
        })
    }
}

fn check_balance(source: &str) -> Result<(), BackendError> {
    let mut lex = Lexer::new(source);
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    let mut seen = 0;

    loop {
        let tok = lex.next_token();
        line += source[seen..tok.offset].matches('\n').count();
        seen = tok.offset;

        let closing = match tok.kind {
            TokenKind::Eof => break,
            TokenKind::Error(message) => return Err(BackendError::new(line, message)),
            TokenKind::LBrace => {
                open.push(('{', line));
                continue;
            }
            TokenKind::LParen => {
                open.push(('(', line));
                continue;
            }
            TokenKind::RBrace => '{',
            TokenKind::RParen => '(',
            _ => continue,
        };

        match open.pop() {
            Some((opener, _)) if opener == closing => {}
            _ => {
                return Err(BackendError::new(
                    line,
                    format!("unmatched '{}'", tok.value),
                ))
            }
        }
    }

    match open.pop() {
        Some((opener, opened_at)) => Err(BackendError::new(
            opened_at,
            format!("unclosed '{opener}'"),
        )),
        None => Ok(()),
    }
}
