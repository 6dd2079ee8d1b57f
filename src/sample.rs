//! Sample collection
//!
//! Reads the leading bytes of each candidate file. Files that cannot
//! contribute (missing, not regular, empty, unreadable) are skipped with a
//! warning instead of failing the run.

use crate::analyzer::DEFAULT_PROBE_LENGTH;
use crate::error::{Result, SignatureError};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Leading bytes of one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Where the bytes came from, if read from disk
    pub path: Option<PathBuf>,
    data: Vec<u8>,
}

impl Sample {
    pub fn new(path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: Some(path.into()),
            data: data.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Sample {
    fn from(data: Vec<u8>) -> Self {
        Self { path: None, data }
    }
}

/// Why a path did not produce a sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Path does not exist (or is a dangling link)
    Missing,
    /// Path resolves to something other than a regular file
    NotRegularFile,
    /// File has no bytes
    Empty,
    /// File passed its checks but could not be read
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Missing => write!(f, "Skipping non-existent file"),
            SkipReason::NotRegularFile => write!(f, "Not a regular file"),
            SkipReason::Empty => write!(f, "Skipping empty file"),
            SkipReason::Unreadable(msg) => write!(f, "Skipping unreadable file ({})", msg),
        }
    }
}

/// A path that was passed over during collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of a collection pass
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Samples in input order
    pub samples: Vec<Sample>,
    /// Paths that produced no sample
    pub skipped: Vec<Skipped>,
}

/// Options for sample collection
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Maximum number of leading bytes read per file
    pub probe_length: usize,
    /// Descend into directory arguments
    pub recursive: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            probe_length: DEFAULT_PROBE_LENGTH,
            recursive: false,
        }
    }
}

/// Gathers samples from paths on disk
pub struct SampleCollector {
    options: CollectOptions,
}

impl SampleCollector {
    /// Create a collector reading `probe_length` bytes per file
    pub fn new(probe_length: usize) -> Self {
        Self {
            options: CollectOptions {
                probe_length,
                ..Default::default()
            },
        }
    }

    pub fn with_options(options: CollectOptions) -> Self {
        Self { options }
    }

    /// Walk directory arguments instead of skipping them
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.options.recursive = recursive;
        self
    }

    /// Collect samples from every path, skipping (and warning about) any
    /// path that cannot contribute
    pub fn collect<P: AsRef<Path>>(&self, paths: &[P]) -> Collection {
        let mut collection = Collection::default();

        for path in paths {
            let path = path.as_ref();
            if self.options.recursive && path.is_dir() {
                self.collect_directory(path, &mut collection);
                continue;
            }
            self.collect_one(path, &mut collection);
        }

        log::info!(
            "collected {} samples, skipped {} paths",
            collection.samples.len(),
            collection.skipped.len()
        );

        collection
    }

    #[cfg(feature = "walkdir")]
    fn collect_directory(&self, dir: &Path, collection: &mut Collection) {
        // Links are not followed by the walk; collect_one gives them the
        // same single hop as a direct argument
        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {}
                Ok(entry) => self.collect_one(entry.path(), collection),
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    self.skip(&path, SkipReason::Unreadable(err.to_string()), collection);
                }
            }
        }
    }

    #[cfg(not(feature = "walkdir"))]
    fn collect_directory(&self, dir: &Path, collection: &mut Collection) {
        log::debug!("directory traversal requires the 'walkdir' feature");
        self.skip(dir, SkipReason::NotRegularFile, collection);
    }

    fn collect_one(&self, path: &Path, collection: &mut Collection) {
        let target = match Self::check_path(path) {
            Ok(target) => target,
            Err(reason) => {
                self.skip(path, reason, collection);
                return;
            }
        };

        match read_sample(&target, self.options.probe_length) {
            Ok(sample) => {
                log::debug!("{}: read {} bytes", path.display(), sample.len());
                collection.samples.push(sample);
            }
            Err(err) => self.skip(path, SkipReason::Unreadable(err.to_string()), collection),
        }
    }

    fn skip(&self, path: &Path, reason: SkipReason, collection: &mut Collection) {
        log::warn!("{}: {}", reason, path.display());
        collection.skipped.push(Skipped {
            path: path.to_path_buf(),
            reason,
        });
    }

    /// Follow at most one symbolic link and confirm the result is a
    /// non-empty regular file
    fn check_path(path: &Path) -> std::result::Result<PathBuf, SkipReason> {
        let mut target = path.to_path_buf();
        let mut meta = fs::symlink_metadata(&target).map_err(|_| SkipReason::Missing)?;

        if meta.file_type().is_symlink() {
            let link = fs::read_link(&target).map_err(|_| SkipReason::Missing)?;
            // Relative link targets are relative to the link's directory
            target = match path.parent() {
                Some(parent) if link.is_relative() => parent.join(link),
                _ => link,
            };
            meta = fs::symlink_metadata(&target).map_err(|_| SkipReason::Missing)?;
        }

        if !meta.file_type().is_file() {
            return Err(SkipReason::NotRegularFile);
        }
        if meta.len() == 0 {
            return Err(SkipReason::Empty);
        }

        Ok(target)
    }
}

impl Default for SampleCollector {
    fn default() -> Self {
        Self::with_options(CollectOptions::default())
    }
}

/// Read up to `probe_length` bytes from the start of `path`
pub fn read_sample(path: &Path, probe_length: usize) -> Result<Sample> {
    let io_err = |source: std::io::Error| SignatureError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::open(path).map_err(io_err)?;
    let mut data = Vec::with_capacity(probe_length.min(64 * 1024));
    file.take(probe_length as u64)
        .read_to_end(&mut data)
        .map_err(io_err)?;

    Ok(Sample::new(path, data))
}

/// Collect samples from `paths`, returning only the samples
pub fn collect_samples<P: AsRef<Path>>(paths: &[P], probe_length: usize) -> Vec<Sample> {
    SampleCollector::new(probe_length).collect(paths).samples
}
