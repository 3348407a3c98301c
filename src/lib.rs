//! Library crate for modinfo: kernel module tag extraction and module lookup

pub mod depmod;
pub mod error;
pub mod image;
pub mod resolver;
pub mod tags;

// Core modules
pub mod core {
    pub mod glob;
    pub mod release;
}

// CLI modules
pub mod cli {
    pub mod args;
}

// Format modules
pub mod formats {
    pub mod text;
    pub mod traits;
}

pub use error::ModinfoError;
pub use resolver::{ModuleLayout, ModuleResolver, RunSummary};
pub use tags::{Shortcut, TagScanner, TagSelection};
