//! Line provenance for flattened buffers
//!
//! While the resolver splices partials into their parents it records
//! boundaries: "from flattened line `key` on, lines belong to `origin`,
//! starting at its line `first_line`". After resolution, a position reported
//! by the compiler in flattened coordinates is translated back to the
//! original `file:line`.

use std::fmt;
use std::path::{Path, PathBuf};

/// Library-support mixins prefixed to every buffer handed to the compiler.
pub const PREAMBLE: &str = "@mixin hidpi($ratio: 1.3) {
  @media (-webkit-min-device-pixel-ratio: $ratio), (min-resolution: 124.8dpi) {
    @content;
  }
}
@mixin clearfix {
  &::after {
    content: \"\";
    display: table;
    clear: both;
  }
}
@function strip-unit($value) {
  @return $value / ($value * 0 + 1);
}
";

/// Reported instead of a file name for positions inside [`PREAMBLE`]
pub const PREAMBLE_MARKER: &str = "preamble";

/// Number of lines the preamble shifts every flattened position by
pub fn preamble_lines() -> usize {
    PREAMBLE.matches('\n').count()
}

/// Owner of a region of the flattened buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The top-level file being built
    Root,
    /// An imported partial
    Partial(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// Newline count in the flattened output where the region starts
    pub key: usize,
    pub origin: Origin,
    /// 1-indexed line in `origin` of the region's first flattened line
    pub first_line: usize,
}

/// Translated position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Preamble,
    Source { file: PathBuf, line: usize },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Preamble => f.write_str(PREAMBLE_MARKER),
            Location::Source { file, line } => write!(f, "{}:{}", file.display(), line),
        }
    }
}

/// Ascending boundary table for one flattened buffer.
///
/// Keys are strictly increasing. A boundary recorded at the last key replaces
/// it (the earlier region was empty); one recorded below the last key is an
/// empty region and is dropped.
#[derive(Debug, Clone)]
pub struct LineIndex {
    main_file: PathBuf,
    boundaries: Vec<Boundary>,
}

impl LineIndex {
    pub fn new(main_file: impl Into<PathBuf>) -> Self {
        Self {
            main_file: main_file.into(),
            boundaries: Vec::new(),
        }
    }

    pub fn main_file(&self) -> &Path {
        &self.main_file
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub(crate) fn record(&mut self, key: usize, origin: Origin, first_line: usize) {
        let boundary = Boundary {
            key,
            origin,
            first_line,
        };
        match self.boundaries.last_mut() {
            Some(last) if key < last.key => {}
            Some(last) if key == last.key => *last = boundary,
            _ => self.boundaries.push(boundary),
        }
    }

    /// Record the start of an imported partial. A parent region deferred past
    /// the current line has not started yet and is discarded.
    pub(crate) fn enter(&mut self, key: usize, partial: PathBuf) {
        self.boundaries.retain(|b| b.key <= key);
        self.record(key, Origin::Partial(partial), 1);
    }

    /// Translate a 1-indexed line of the full compiler buffer (preamble
    /// included) to its original location.
    pub fn locate(&self, position: usize) -> Location {
        let Some(adjusted) = position
            .checked_sub(1)
            .and_then(|p| p.checked_sub(preamble_lines()))
        else {
            return Location::Preamble;
        };

        let hit = self.boundaries.iter().position(|b| b.key > adjusted);
        match hit {
            Some(0) => Location::Source {
                file: self.file_of(&self.boundaries[0].origin),
                line: adjusted + 1,
            },
            Some(i) => {
                let base = &self.boundaries[i - 1];
                Location::Source {
                    file: self.file_of(&base.origin),
                    line: base.first_line + adjusted - base.key,
                }
            }
            None => {
                let (key, first_line) = self
                    .boundaries
                    .last()
                    .map(|b| (b.key, b.first_line))
                    .unwrap_or((0, 1));
                Location::Source {
                    file: self.main_file.clone(),
                    line: first_line + adjusted - key,
                }
            }
        }
    }

    /// `file:line` for a compiler-reported position, or [`PREAMBLE_MARKER`]
    pub fn lookup_file(&self, position: usize) -> String {
        self.locate(position).to_string()
    }

    fn file_of(&self, origin: &Origin) -> PathBuf {
        match origin {
            Origin::Root => self.main_file.clone(),
            Origin::Partial(path) => path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(flattened_line: usize) -> usize {
        // 1-indexed position in the full buffer of a 0-indexed flattened line
        flattened_line + preamble_lines() + 1
    }

    #[test]
    fn preamble_positions_map_to_marker() {
        let index = LineIndex::new("main.scss");
        assert_eq!(index.lookup_file(1), PREAMBLE_MARKER);
        assert_eq!(index.lookup_file(preamble_lines()), PREAMBLE_MARKER);
        assert_eq!(index.lookup_file(0), PREAMBLE_MARKER);
    }

    #[test]
    fn preamble_ends_with_newline() {
        assert!(PREAMBLE.ends_with('\n'));
        assert_eq!(preamble_lines(), PREAMBLE.lines().count());
    }

    #[test]
    fn regions_resolve_to_owning_file() {
        let mut index = LineIndex::new("main.scss");
        index.record(0, Origin::Root, 1);
        index.enter(2, PathBuf::from("_b.scss"));
        index.record(5, Origin::Root, 4);
        index.record(7, Origin::Root, 6);

        assert_eq!(index.lookup_file(pos(0)), "main.scss:1");
        assert_eq!(index.lookup_file(pos(1)), "main.scss:2");
        assert_eq!(index.lookup_file(pos(2)), "_b.scss:1");
        assert_eq!(index.lookup_file(pos(4)), "_b.scss:3");
        assert_eq!(index.lookup_file(pos(5)), "main.scss:4");
        assert_eq!(index.lookup_file(pos(7)), "main.scss:6");
        assert_eq!(index.lookup_file(pos(9)), "main.scss:8");
    }

    #[test]
    fn equal_key_replaces_empty_region() {
        let mut index = LineIndex::new("main.scss");
        index.record(0, Origin::Root, 1);
        index.enter(0, PathBuf::from("_b.scss"));
        assert_eq!(index.boundaries().len(), 1);
        assert_eq!(
            index.boundaries()[0].origin,
            Origin::Partial(PathBuf::from("_b.scss"))
        );
    }

    #[test]
    fn lower_key_is_dropped_but_entry_truncates() {
        let mut index = LineIndex::new("main.scss");
        index.record(0, Origin::Root, 1);
        index.record(3, Origin::Root, 2);
        index.record(2, Origin::Root, 9);
        assert_eq!(index.boundaries().len(), 2);

        index.enter(2, PathBuf::from("_c.scss"));
        let keys: Vec<usize> = index.boundaries().iter().map(|b| b.key).collect();
        assert_eq!(keys, vec![0, 2]);
    }

    #[test]
    fn first_boundary_hit_uses_first_origin() {
        let mut index = LineIndex::new("main.scss");
        index.enter(3, PathBuf::from("_late.scss"));
        assert_eq!(index.lookup_file(pos(1)), "_late.scss:2");
    }

    #[test]
    fn empty_index_falls_back_to_main_file() {
        let index = LineIndex::new("main.scss");
        assert_eq!(index.lookup_file(pos(4)), "main.scss:5");
    }
}
