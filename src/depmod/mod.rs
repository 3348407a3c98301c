//! Reader for the `modules.dep` dependency index
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::ModinfoError;

/// Longest module name the kernel accepts, terminator included.
pub const MODULE_NAME_LEN: usize = 64 - std::mem::size_of::<usize>();

/// One `path: deps...` line of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    /// Module file path as written in the index (usually relative to the release directory)
    pub path: String,
    /// Normalized module name derived from the path
    pub name: String,
}

impl DependencyRecord {
    /// Parse one index line. Comments, blank lines and lines without a
    /// `path:` head yield None.
    pub fn parse(line: &str) -> Option<Self> {
        let line = match line.find('#') {
            Some(hash) => &line[..hash],
            None => line,
        };
        let (path, _deps) = line.split_once(':')?;
        let path = path.trim();
        if path.is_empty() || path.contains(char::is_whitespace) {
            return None;
        }
        Some(DependencyRecord {
            path: path.to_string(),
            name: filename_to_modname(path),
        })
    }
}

/// Module name for a module file path: the basename up to its first `.`,
/// with `-` spelled `_`, capped at `MODULE_NAME_LEN - 1` bytes.
pub fn filename_to_modname(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    let name: Vec<u8> = base
        .bytes()
        .take_while(|&b| b != b'.')
        .take(MODULE_NAME_LEN - 1)
        .map(|b| if b == b'-' { b'_' } else { b })
        .collect();
    // The cap can split a multi-byte character; that tail becomes U+FFFD.
    String::from_utf8_lossy(&name).into_owned()
}

/// Open dependency index
pub struct DependencyIndex {
    reader: Box<dyn BufRead>,
}

impl DependencyIndex {
    pub fn open(path: &Path) -> Result<Self, ModinfoError> {
        let file = File::open(path).map_err(|source| ModinfoError::IndexUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("using dependency index {}", path.display());
        Ok(Self::from_reader(BufReader::new(file)))
    }

    pub fn from_reader<R: BufRead + 'static>(reader: R) -> Self {
        DependencyIndex {
            reader: Box::new(reader),
        }
    }

    /// Iterate the records of the index. Reading stops at the first I/O error.
    pub fn records(self) -> impl Iterator<Item = DependencyRecord> {
        self.reader
            .split(b'\n')
            .map_while(|line| match line {
                Ok(line) => Some(line),
                Err(e) => {
                    debug!("dependency index read failed: {}", e);
                    None
                }
            })
            .filter_map(|line| DependencyRecord::parse(&String::from_utf8_lossy(&line)))
    }
}
