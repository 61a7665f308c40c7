//! Import resolution
//!
//! Flattens a tree of `@import`ed partials into one token list and one output
//! buffer, recording line provenance as it splices. The directive
//! `@import name;` in directory `D` resolves to `D/_name.scss`; there is no
//! search path fallback.
//!
//! ## Usage
//!
//! ```ignore
//! let resolved = Resolver::new(&main).with_graph(&graph).resolve(&src, dir)?;
//! backend.compile(&resolved.buffer(), &options)?;
//! ```

mod provenance;


use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{FuseError, FuseResult};
use crate::graph::PartialGraph;
use crate::lexer::{line_of, Lexer, Token, TokenKind};

pub use provenance::{
    preamble_lines, Boundary, LineIndex, Location, Origin, PREAMBLE, PREAMBLE_MARKER,
};

/// Result of flattening one top-level file
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Every token of the tree, in output order
    pub tokens: Vec<Token>,
    /// Flattened source, without the preamble
    pub output: String,
    pub index: LineIndex,
}

impl Resolved {
    /// Full buffer handed to the compiler
    pub fn buffer(&self) -> String {
        let mut buf = String::with_capacity(PREAMBLE.len() + self.output.len());
        buf.push_str(PREAMBLE);
        buf.push_str(&self.output);
        buf
    }

    /// Translate a 1-indexed line of [`Resolved::buffer`] to `file:line`
    pub fn lookup_file(&self, position: usize) -> String {
        self.index.lookup_file(position)
    }
}

/// State of one file being expanded
struct Frame {
    origin: Origin,
    file: PathBuf,
    dir: PathBuf,
    /// Newlines already emitted into the flattened output
    lines: usize,
}

/// Recursive `@import` resolver for one top-level file
pub struct Resolver<'g> {
    main_file: PathBuf,
    graph: Option<&'g PartialGraph>,
}

impl<'g> Resolver<'g> {
    pub fn new(main_file: impl Into<PathBuf>) -> Self {
        Self {
            main_file: main_file.into(),
            graph: None,
        }
    }

    /// Record every partial met during resolution as a dependency of the
    /// main file
    pub fn with_graph(mut self, graph: &'g PartialGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Flatten `input` (the main file's content) whose imports resolve
    /// relative to `dir`
    pub fn resolve(&self, input: &str, dir: &Path) -> FuseResult<Resolved> {
        let mut index = LineIndex::new(self.main_file.clone());
        index.record(0, Origin::Root, 1);

        let mut chain = vec![self.main_file.clone()];
        let frame = Frame {
            origin: Origin::Root,
            file: self.main_file.clone(),
            dir: dir.to_path_buf(),
            lines: 0,
        };
        let (tokens, output) = self.expand(input, frame, &mut chain, &mut index)?;

        Ok(Resolved {
            tokens,
            output,
            index,
        })
    }

    fn expand(
        &self,
        input: &str,
        frame: Frame,
        chain: &mut Vec<PathBuf>,
        index: &mut LineIndex,
    ) -> FuseResult<(Vec<Token>, String)> {
        let mut lex = Lexer::new(input);
        let mut tokens = Vec::new();
        let mut output = String::with_capacity(input.len());
        let mut cursor = 0;
        let mut lines = frame.lines;
        let mut pushed_back: Option<Token> = None;

        loop {
            let token = pushed_back.take().unwrap_or_else(|| lex.next_token());
            if let TokenKind::Error(message) = &token.kind {
                return Err(FuseError::Lexical {
                    file: frame.file.clone(),
                    offset: token.offset,
                    line: line_of(input, token.offset),
                    message: message.clone(),
                });
            }

            match token.kind {
                TokenKind::Eof => {
                    lines += flush(&mut output, &input[cursor..]);
                    index.record(lines, frame.origin.clone(), line_of(input, input.len()));
                    return Ok((tokens, output));
                }
                TokenKind::Import => {
                    lines += flush(&mut output, &input[cursor..token.offset]);
                    let marker = token.offset;

                    let name = lex.next_token();
                    let partial = self.open_import(&frame, input, &name, chain)?;
                    if let Some(graph) = self.graph {
                        graph.add_relation(&self.main_file, &partial.path);
                    }
                    debug!(
                        "{} imports {}",
                        frame.file.display(),
                        partial.path.display()
                    );

                    index.enter(lines, partial.path.clone());
                    chain.push(partial.path.clone());
                    let child = Frame {
                        origin: Origin::Partial(partial.path.clone()),
                        dir: parent_dir(&partial.path),
                        file: partial.path,
                        lines,
                    };
                    let (mut child_tokens, child_output) =
                        self.expand(&partial.contents, child, chain, index)?;
                    chain.pop();

                    let next = lex.next_token();
                    let resume = if next.kind == TokenKind::Semicolon {
                        next.end()
                    } else {
                        warn!(
                            "@import in {}:{} must be followed by ';'",
                            frame.file.display(),
                            line_of(input, name.offset)
                        );
                        pushed_back = Some(next);
                        name.end()
                    };

                    for t in &mut child_tokens {
                        t.offset += marker;
                    }
                    lines += flush(&mut output, &child_output);
                    tokens.append(&mut child_tokens);

                    // The rest of the import line shares the partial's last
                    // line unless the partial ended with a newline.
                    let parent_line = line_of(input, resume);
                    if child_output.is_empty() || child_output.ends_with('\n') {
                        index.record(lines, frame.origin.clone(), parent_line);
                    } else {
                        index.record(lines + 1, frame.origin.clone(), parent_line + 1);
                    }
                    cursor = resume;
                }
                _ if token.is_passthrough() => {
                    // Structural markers are committed along with their text
                    lines += flush(&mut output, &input[cursor..token.end()]);
                    cursor = token.end();
                    tokens.push(token);
                }
                _ => {
                    lines += flush(&mut output, &input[cursor..token.offset]);
                    cursor = token.offset;
                    tokens.push(token);
                }
            }
        }
    }

    fn open_import(
        &self,
        frame: &Frame,
        input: &str,
        name: &Token,
        chain: &[PathBuf],
    ) -> FuseResult<Partial> {
        match &name.kind {
            TokenKind::Ident | TokenKind::Str if !name.value.is_empty() => {}
            TokenKind::Error(message) => {
                return Err(FuseError::Lexical {
                    file: frame.file.clone(),
                    offset: name.offset,
                    line: line_of(input, name.offset),
                    message: message.clone(),
                });
            }
            _ => {
                return Err(FuseError::InvalidImport {
                    file: frame.file.clone(),
                    offset: name.offset,
                    line: line_of(input, name.offset),
                });
            }
        }

        let path = partial_path(&frame.dir, &name.value);
        let contents = fs::read_to_string(&path).map_err(|source| FuseError::ImportUnreadable {
            path: path.clone(),
            source,
        })?;
        let path = fs::canonicalize(&path).unwrap_or(path);

        if chain.contains(&path) {
            let mut cycle = chain.to_vec();
            cycle.push(path);
            return Err(FuseError::ImportCycle { chain: cycle });
        }

        Ok(Partial { path, contents })
    }
}

struct Partial {
    path: PathBuf,
    contents: String,
}

/// `D` + `a/b` -> `D/a/_b.scss`
pub fn partial_path(dir: &Path, name: &str) -> PathBuf {
    let logical = Path::new(name);
    match (logical.parent(), logical.file_name()) {
        (Some(parent), Some(file)) if !parent.as_os_str().is_empty() => dir
            .join(parent)
            .join(format!("_{}.scss", file.to_string_lossy())),
        _ => dir.join(format!("_{name}.scss")),
    }
}

/// Is this file a partial (only ever imported, never built directly)?
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Append `text`, returning the number of newlines it added
fn flush(output: &mut String, text: &str) -> usize {
    output.push_str(text);
    text.matches('\n').count()
}
