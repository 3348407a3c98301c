//! Module name resolution and the per-module scan cycle
//!
//! Specifiers are first matched as globs against the module names in the
//! dependency index. Whatever is left afterwards is taken as a literal file
//! path or bare module name and tried against the modules directory.
use log::{debug, warn};
use std::io;
use std::path::{Path, PathBuf};

use crate::core::glob::GlobPattern;
use crate::depmod::DependencyIndex;
use crate::error::ModinfoError;
use crate::formats::traits::TagSink;
use crate::image::ModuleImage;
use crate::tags::{Shortcut, TagScanner, TagSelection};

pub const DEFAULT_MODULES_DIR: &str = "/lib/modules";
pub const DEFAULT_DEPMOD_FILE: &str = "modules.dep";

/// Where modules and their index live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLayout {
    pub base_dir: PathBuf,
    pub index_name: String,
    /// Modules are kept under `<base_dir>/<release>/`. Android keeps them flat
    /// in `<base_dir>`.
    pub release_subdir: bool,
}

impl Default for ModuleLayout {
    fn default() -> Self {
        ModuleLayout {
            base_dir: PathBuf::from(DEFAULT_MODULES_DIR),
            index_name: DEFAULT_DEPMOD_FILE.to_string(),
            release_subdir: !cfg!(target_os = "android"),
        }
    }
}

impl ModuleLayout {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        ModuleLayout {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Index locations, most specific first
    pub fn index_candidates(&self, release: &str) -> Vec<PathBuf> {
        let mut candidates = vec![self.base_dir.join(release).join(&self.index_name)];
        if !self.release_subdir {
            push_unique(&mut candidates, self.base_dir.join(&self.index_name));
        }
        candidates
    }

    /// Paths to try for a module, in order. Absolute paths are only tried as given.
    pub fn module_candidates(&self, module: &str, release: &str) -> Vec<PathBuf> {
        let direct = PathBuf::from(module);
        if direct.is_absolute() {
            return vec![direct];
        }
        let mut candidates = vec![direct];
        push_unique(&mut candidates, self.base_dir.join(release).join(module));
        if !self.release_subdir {
            push_unique(&mut candidates, self.base_dir.join(module));
        }
        candidates
    }
}

fn push_unique(candidates: &mut Vec<PathBuf>, path: PathBuf) {
    if !candidates.contains(&path) {
        candidates.push(path);
    }
}

/// Outcome of one resolve-and-scan run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Modules whose image was read and scanned
    pub scanned: usize,
    /// Per-module failures, already reported on stderr
    pub failures: Vec<ModinfoError>,
}

pub struct ModuleResolver<'a> {
    layout: &'a ModuleLayout,
    selection: &'a TagSelection,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(layout: &'a ModuleLayout, selection: &'a TagSelection) -> Self {
        ModuleResolver { layout, selection }
    }

    /// Resolve every specifier and emit the selected tags of each module found.
    ///
    /// Unreadable modules and invalid patterns are reported and skipped; only
    /// sink failures abort the run.
    pub fn resolve_and_scan<S: TagSink + ?Sized>(
        &self,
        specifiers: &[String],
        release: &str,
        sink: &mut S,
    ) -> Result<RunSummary, ModinfoError> {
        let mut summary = RunSummary::default();
        let patterns: Vec<Option<GlobPattern>> = specifiers
            .iter()
            .map(|spec| match GlobPattern::new(spec) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("{}; resolving it as a path", e);
                    None
                }
            })
            .collect();
        let mut consumed = vec![false; specifiers.len()];

        let mut release = release;
        match self.open_index(release) {
            Some(index) => {
                for record in index.records() {
                    let mut matched = false;
                    for (i, pattern) in patterns.iter().enumerate() {
                        if pattern.as_ref().is_some_and(|p| p.matches(&record.name)) {
                            consumed[i] = true;
                            matched = true;
                        }
                    }
                    if matched {
                        debug!("{} matches {}", record.name, record.path);
                        self.scan_reported(&record.path, release, sink, &mut summary)?;
                    }
                }
            }
            None if !self.layout.release_subdir => release = "",
            None => {}
        }

        for (spec, consumed) in specifiers.iter().zip(consumed) {
            if !consumed && !spec.is_empty() {
                self.scan_reported(spec, release, sink, &mut summary)?;
            }
        }
        Ok(summary)
    }

    fn open_index(&self, release: &str) -> Option<DependencyIndex> {
        for path in self.layout.index_candidates(release) {
            match DependencyIndex::open(&path) {
                Ok(index) => return Some(index),
                Err(e) => debug!("{}", e),
            }
        }
        None
    }

    fn scan_reported<S: TagSink + ?Sized>(
        &self,
        module: &str,
        release: &str,
        sink: &mut S,
        summary: &mut RunSummary,
    ) -> Result<(), ModinfoError> {
        match self.scan_module(module, release, sink) {
            Ok(()) => summary.scanned += 1,
            Err(e) if e.is_recoverable() => {
                eprintln!("modinfo: {}", e);
                summary.failures.push(e);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Emit the selected tags of one module. `filename` is emitted before the
    /// image is read, so it appears even when reading fails.
    pub fn scan_module<S: TagSink + ?Sized>(
        &self,
        module: &str,
        release: &str,
        sink: &mut S,
    ) -> Result<(), ModinfoError> {
        let labelled = self.selection.is_labelled();
        if self.selection.contains(Shortcut::Filename) {
            sink.emit(Shortcut::Filename.name(), module.as_bytes(), labelled)?;
        }

        let image = self.acquire(module, release)?;
        let scanner = TagScanner::new(&image);
        for pattern in self.selection.patterns() {
            for value in scanner.values(pattern) {
                sink.emit(pattern, value, labelled)?;
            }
        }
        Ok(())
    }

    fn acquire(&self, module: &str, release: &str) -> Result<ModuleImage, ModinfoError> {
        let mut last_failure = None;
        for candidate in self.layout.module_candidates(module, release) {
            match ModuleImage::open(&candidate) {
                Ok(image) => {
                    debug!("read {} ({} bytes)", candidate.display(), image.len());
                    return Ok(image);
                }
                Err(e) => {
                    debug!("{}: {}", candidate.display(), e);
                    last_failure = Some((candidate, e));
                }
            }
        }

        let (path, source) = last_failure.unwrap_or_else(|| {
            (
                Path::new(module).to_path_buf(),
                io::Error::new(io::ErrorKind::NotFound, "no candidate path"),
            )
        });
        Err(ModinfoError::ModuleUnreadable { path, source })
    }
}
