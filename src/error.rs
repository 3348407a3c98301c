//! Error types for module lookup and tag extraction
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModinfoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No dependency index could be opened. Resolution continues with literal paths.
    #[error("dependency index unavailable: {}: {source}", path.display())]
    IndexUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every candidate path for a module failed. `path` is the last one tried.
    #[error("{}: {source}", path.display())]
    ModuleUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid module pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("cannot determine kernel release: {0}")]
    KernelRelease(#[source] std::io::Error),
}

impl ModinfoError {
    /// Errors that only affect one module or pattern; the run continues after reporting them.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ModinfoError::Io(_))
    }
}
