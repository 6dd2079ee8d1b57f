//! Signature rendering
//!
//! Turns a [`ResolvedSequence`](crate::analyzer::ResolvedSequence) into one of three text encodings:
//!
//! - **hex**: `4D 5A __`, wrapped every `columns` entries
//! - **json**: `[77,90,null]`
//! - **regex**: `/^MZ./s`, with runs of identical entries collapsed into
//!   `{n}` quantifiers

use crate::analyzer::ResolvedByte;
use crate::error::{Result, SignatureError};
use std::str::FromStr;

/// Default number of entries per hex line
pub const DEFAULT_COLUMNS: usize = 16;

/// Placeholder for a wildcard in hex output
pub const HEX_WILDCARD: &str = "__";

/// Wildcard fragment when `.` already matches newlines
const REGEX_ANY: &str = ".";
/// Wildcard fragment for engines where `.` skips newlines
const REGEX_ANY_WITH_NEWLINE: &str = "(?:.|[^\\0])";
/// Flag that makes `.` match newlines
const REGEX_DOTALL_FLAG: char = 's';

/// Supported output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Hex,
    Json,
    Regex,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Hex => "hex",
            OutputFormat::Json => "json",
            OutputFormat::Regex => "regex",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hex" => Ok(OutputFormat::Hex),
            "json" => Ok(OutputFormat::Json),
            "regex" => Ok(OutputFormat::Regex),
            other => Err(SignatureError::UnsupportedFormat {
                name: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rendering options
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Entries per hex line; 0 keeps everything on one line
    pub columns: usize,
    /// One-line hex with unpadded digits
    pub legacy_hex: bool,
    /// Emit the dot-matches-all flag instead of the wildcard alternation
    pub single_line: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            legacy_hex: false,
            single_line: true,
        }
    }
}

impl RenderOptions {
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_legacy_hex(mut self, legacy: bool) -> Self {
        self.legacy_hex = legacy;
        self
    }

    pub fn with_single_line(mut self, single_line: bool) -> Self {
        self.single_line = single_line;
        self
    }
}

/// A maximal stretch of identical entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRun {
    pub value: ResolvedByte,
    pub count: usize,
}

/// Collapse consecutive identical entries into runs
pub fn pattern_runs(sequence: &[ResolvedByte]) -> Vec<PatternRun> {
    let mut runs: Vec<PatternRun> = Vec::new();

    for &value in sequence {
        match runs.last_mut() {
            Some(run) if run.value == value => run.count += 1,
            _ => runs.push(PatternRun { value, count: 1 }),
        }
    }

    runs
}

/// Render `sequence` in the requested format
pub fn render(sequence: &[ResolvedByte], format: OutputFormat, options: &RenderOptions) -> Result<String> {
    let output = match format {
        OutputFormat::Hex if options.legacy_hex => render_legacy_hex(sequence),
        OutputFormat::Hex => render_hex(sequence, options.columns),
        OutputFormat::Json => render_json(sequence)?,
        OutputFormat::Regex => render_regex(sequence, options.single_line),
    };
    Ok(output)
}

/// Render by format name, failing on names outside hex/json/regex
pub fn render_named(sequence: &[ResolvedByte], format: &str, options: &RenderOptions) -> Result<String> {
    render(sequence, format.parse()?, options)
}

/// Space-separated uppercase hex, with a line break before every
/// `columns`-th entry
pub fn render_hex(sequence: &[ResolvedByte], columns: usize) -> String {
    let mut output = String::with_capacity(sequence.len() * 3);

    for (i, entry) in sequence.iter().enumerate() {
        if i > 0 {
            let wrap = columns > 0 && i % columns == 0;
            output.push(if wrap { '\n' } else { ' ' });
        }
        match entry {
            ResolvedByte::Byte(b) => output.push_str(&format!("{:02X}", b)),
            ResolvedByte::Wildcard => output.push_str(HEX_WILDCARD),
        }
    }

    output
}

/// Whole sequence on one line, digits unpadded
pub fn render_legacy_hex(sequence: &[ResolvedByte]) -> String {
    sequence
        .iter()
        .map(|entry| match entry {
            ResolvedByte::Byte(b) => format!("{:X}", b),
            ResolvedByte::Wildcard => HEX_WILDCARD.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// JSON array of byte values, `null` for wildcards
///
/// Serializer errors are passed through as [`SignatureError::Json`]; a
/// resolved sequence never produces one in practice.
pub fn render_json(sequence: &[ResolvedByte]) -> Result<String> {
    Ok(serde_json::to_string(sequence)?)
}

/// Anchored regex literal, `/^...$flags`
pub fn render_regex(sequence: &[ResolvedByte], single_line: bool) -> String {
    let mut output = String::from("/");
    output.push_str(&regex_body(sequence, single_line));
    output.push('/');
    if single_line {
        output.push(REGEX_DOTALL_FLAG);
    }
    output
}

/// The pattern between the slashes, starting with `^`
pub fn regex_body(sequence: &[ResolvedByte], single_line: bool) -> String {
    let mut body = String::from("^");

    for run in pattern_runs(sequence) {
        body.push_str(&regex_fragment(run.value, single_line));
        if run.count > 1 {
            body.push_str(&format!("{{{}}}", run.count));
        }
    }

    body
}

/// Regex source matching one entry
fn regex_fragment(value: ResolvedByte, single_line: bool) -> String {
    let byte = match value {
        ResolvedByte::Wildcard if single_line => return REGEX_ANY.to_string(),
        ResolvedByte::Wildcard => return REGEX_ANY_WITH_NEWLINE.to_string(),
        ResolvedByte::Byte(b) => b,
    };

    match byte {
        0x00 => "\\0".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        0x0B => "\\v".to_string(),
        0x0C => "\\f".to_string(),
        b'\r' => "\\r".to_string(),
        b'$' | b'(' | b')' | b'*' | b'+' | b'.' | b'?' | b'[' | b'\\' | b']' | b'^' | b'{' | b'|'
        | b'}' => format!("\\{}", byte as char),
        0x20..=0x7E => (byte as char).to_string(),
        _ => format!("\\x{:02X}", byte),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ResolvedByte::{Byte, Wildcard};
    use crate::analyzer::ResolvedSequence;

    fn bytes(data: &[u8]) -> ResolvedSequence {
        data.iter().copied().map(ResolvedByte::from).collect()
    }

    #[test]
    fn test_format_names() {
        assert_eq!("hex".parse::<OutputFormat>().unwrap(), OutputFormat::Hex);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("regex".parse::<OutputFormat>().unwrap(), OutputFormat::Regex);
        assert_eq!(OutputFormat::Regex.to_string(), "regex");
    }

    #[test]
    fn test_unsupported_format() {
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        match err {
            SignatureError::UnsupportedFormat { name } => assert_eq!(name, "yaml"),
            other => panic!("unexpected error: {:?}", other),
        }

        let seq = bytes(b"MZ");
        assert!(render_named(&seq, "HEX", &RenderOptions::default()).is_err());
    }

    #[test]
    fn test_pattern_runs() {
        let seq = vec![Byte(1), Byte(1), Wildcard, Wildcard, Wildcard, Byte(1)];
        assert_eq!(
            pattern_runs(&seq),
            vec![
                PatternRun { value: Byte(1), count: 2 },
                PatternRun { value: Wildcard, count: 3 },
                PatternRun { value: Byte(1), count: 1 },
            ]
        );
        assert!(pattern_runs(&[]).is_empty());
    }

    #[test]
    fn test_hex_scenario() {
        let seq = vec![Byte(0x4D), Byte(0x5A), Wildcard];
        assert_eq!(render_hex(&seq, 16), "4D 5A __");
    }

    #[test]
    fn test_hex_zero_padding() {
        assert_eq!(render_hex(&bytes(&[0x00, 0x0F, 0xFF]), 16), "00 0F FF");
    }

    #[test]
    fn test_hex_wraps_every_n_entries() {
        let seq = bytes(&[1, 2, 3, 4, 5]);
        assert_eq!(render_hex(&seq, 2), "01 02\n03 04\n05");
        assert_eq!(render_hex(&seq, 5), "01 02 03 04 05");
        assert_eq!(render_hex(&seq, 0), "01 02 03 04 05");
    }

    #[test]
    fn test_hex_default_width() {
        let seq = bytes(&[0xAA; 17]);
        let output = render(&seq, OutputFormat::Hex, &RenderOptions::default()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "AA");
    }

    #[test]
    fn test_legacy_hex() {
        let seq = vec![Byte(0x4D), Byte(0x05), Wildcard];
        let options = RenderOptions::default().with_legacy_hex(true).with_columns(1);
        assert_eq!(render(&seq, OutputFormat::Hex, &options).unwrap(), "4D 5 __");
    }

    #[test]
    fn test_hex_round_trip() {
        let original: Vec<u8> = (0..=255).collect();
        let output = render_hex(&bytes(&original), 16);
        let digits: String = output.split_whitespace().collect();
        assert_eq!(hex::decode(digits).unwrap(), original);
    }

    #[test]
    fn test_json_scenario() {
        let seq = vec![Byte(0x4D), Byte(0x5A), Wildcard];
        assert_eq!(render_json(&seq).unwrap(), "[77,90,null]");
    }

    #[test]
    fn test_json_round_trip() {
        let seq = vec![Byte(0), Wildcard, Byte(255)];
        let output = render(&seq, OutputFormat::Json, &RenderOptions::default()).unwrap();
        let parsed: Vec<Option<u8>> = serde_json::from_str(&output).unwrap();
        let expected: Vec<Option<u8>> = seq.iter().map(|r| r.value()).collect();
        assert_eq!(parsed, expected);
        assert_eq!(parsed, vec![Some(0), None, Some(255)]);
    }

    #[test]
    fn test_regex_scenario() {
        let seq = vec![Byte(0x4D), Byte(0x5A), Wildcard];
        assert_eq!(regex_body(&seq, true), "^MZ.");
        assert_eq!(render_regex(&seq, true), "/^MZ./s");
    }

    #[test]
    fn test_regex_run_collapsing() {
        assert_eq!(regex_body(&bytes(b"AAA"), true), "^A{3}");
        assert_eq!(regex_body(&bytes(b"A"), true), "^A");
        assert_eq!(regex_body(&bytes(b"AAB"), true), "^A{2}B");
    }

    #[test]
    fn test_regex_escapes() {
        assert_eq!(regex_body(&bytes(&[0x0A]), true), "^\\n");
        assert_eq!(regex_body(&bytes(&[0x2E]), true), "^\\.");
        assert_eq!(regex_body(&bytes(&[0x01]), true), "^\\x01");
        assert_eq!(
            regex_body(&bytes(&[0x00, 0x09, 0x0B, 0x0C, 0x0D]), true),
            "^\\0\\t\\v\\f\\r"
        );
        assert_eq!(regex_body(&bytes(b"$()*+?[\\]^{|}"), true), "^\\$\\(\\)\\*\\+\\?\\[\\\\\\]\\^\\{\\|\\}");
        assert_eq!(regex_body(&bytes(&[0x7F, 0x80, 0xFF]), true), "^\\x7F\\x80\\xFF");
        assert_eq!(regex_body(&bytes(b" ~/-"), true), "^ ~/-");
    }

    #[test]
    fn test_regex_escaped_run_gets_quantifier() {
        assert_eq!(regex_body(&bytes(&[0, 0, 0, 0]), true), "^\\0{4}");
        assert_eq!(regex_body(&bytes(b".."), true), "^\\.{2}");
    }

    #[test]
    fn test_regex_wildcards() {
        let seq = vec![Wildcard; 3];
        assert_eq!(render_regex(&seq, true), "/^.{3}/s");
        assert_eq!(render_regex(&seq, false), "/^(?:.|[^\\0]){3}/");
    }

    #[test]
    fn test_render_is_deterministic() {
        let seq = vec![Byte(0x89), Byte(b'P'), Byte(b'N'), Byte(b'G'), Wildcard, Wildcard];
        let options = RenderOptions::default().with_single_line(false);
        for format in [OutputFormat::Hex, OutputFormat::Json, OutputFormat::Regex] {
            let first = render(&seq, format, &options).unwrap();
            let second = render(&seq, format, &options).unwrap();
            assert_eq!(first, second);
        }
    }
}
