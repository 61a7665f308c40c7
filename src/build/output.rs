//! Output placement and scoped, atomic output files

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::BuildConfig;
use crate::error::FuseResult;

/// Where the CSS for `file` goes: `build_dir/<file relative to dir>.css`, or
/// `None` for stdout. Files outside `dir` keep only their file name.
pub fn output_path(file: &Path, config: &BuildConfig) -> Option<PathBuf> {
    let build_dir = config.build_dir.as_ref()?;
    let relative = config
        .dir
        .as_ref()
        .and_then(|dir| {
            let dir = fs::canonicalize(dir).unwrap_or_else(|_| dir.clone());
            file.strip_prefix(&dir).ok().map(Path::to_path_buf)
        })
        .or_else(|| file.file_name().map(PathBuf::from))?;
    Some(build_dir.join(relative).with_extension("css"))
}

/// Destination opened before a build starts. A file destination is a temp
/// file next to the target, only renamed into place by [`OutputSink::commit`];
/// dropping the sink on any other path removes it.
pub enum OutputSink {
    File { temp: NamedTempFile, dest: PathBuf },
    Stdout,
}

impl OutputSink {
    pub fn create(dest: Option<PathBuf>) -> FuseResult<Self> {
        let Some(dest) = dest else {
            return Ok(Self::Stdout);
        };
        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;
        let temp = NamedTempFile::new_in(parent)?;
        Ok(Self::File { temp, dest })
    }

    /// Write `css` and publish it. Returns the destination, if any.
    pub fn commit(self, css: &str) -> FuseResult<Option<PathBuf>> {
        match self {
            Self::File { mut temp, dest } => {
                temp.write_all(css.as_bytes())?;
                temp.flush()?;
                temp.persist(&dest).map_err(|e| e.error)?;
                Ok(Some(dest))
            }
            Self::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(css.as_bytes())?;
                out.flush()?;
                Ok(None)
            }
        }
    }
}
