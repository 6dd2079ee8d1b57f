//! # sigprobe
//!
//! Infer the magic-byte signature shared by a set of sample files.
//!
//! Given a handful of files of the same type, sigprobe reads the first K
//! bytes of each (512 by default), checks every offset for agreement, and
//! prints the result as a hex table, a JSON array, or a regex literal that
//! can be dropped straight into a file-type matcher.
//!
//! ## Pipeline
//!
//! ```text
//! paths --SampleCollector--> samples --ColumnAnalyzer--> resolved --render--> text
//! ```
//!
//! Each stage takes the previous stage's output by reference and holds no
//! state of its own between runs.
//!
//! ## Resolution Rules
//!
//! For every offset in `0..K`:
//! 1. All samples hold the same byte → that byte
//! 2. Two samples differ → wildcard
//! 3. Some sample is too short to reach the offset → wildcard
//!    (unless [`ShortSamplePolicy::PresentOnly`] is selected)
//!
//! ## Output Formats
//!
//! Two DOS executables differing in their third byte:
//!
//! ```text
//! hex     4D 5A __
//! json    [77,90,null]
//! regex   /^MZ./s
//! ```
//!
//! In regex output, runs of the same entry collapse to `{n}` quantifiers and
//! bytes outside printable ASCII are escaped. Without single-line mode the
//! wildcard becomes `(?:.|[^\0])` so it still matches newline bytes.
//!
//! ```
//! use sigprobe::{resolve_columns, render, OutputFormat, RenderOptions, Sample};
//!
//! let samples = vec![
//!     Sample::from(vec![0x4D, 0x5A, 0x00]),
//!     Sample::from(vec![0x4D, 0x5A, 0x01]),
//! ];
//! let resolved = resolve_columns(&samples, 3).unwrap();
//! let regex = render(&resolved, OutputFormat::Regex, &RenderOptions::default()).unwrap();
//! assert_eq!(regex, "/^MZ./s");
//! ```

pub mod analyzer;
pub mod error;
pub mod render;
pub mod sample;

pub use analyzer::{
    resolve_columns, ColumnAnalyzer, ResolvedByte, ResolvedSequence, ShortSamplePolicy,
    DEFAULT_PROBE_LENGTH,
};
pub use error::{Result, SignatureError};
pub use render::{
    pattern_runs, render, render_named, OutputFormat, PatternRun, RenderOptions, DEFAULT_COLUMNS,
};
pub use sample::{
    collect_samples, read_sample, CollectOptions, Collection, Sample, SampleCollector, SkipReason,
    Skipped,
};
