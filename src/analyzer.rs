//! Column analysis
//!
//! Reduces the bytes found at each offset across all samples to either the
//! single value every sample agrees on, or a wildcard.

use crate::error::{Result, SignatureError};
use crate::sample::Sample;
use serde::{Serialize, Serializer};

/// Default number of leading bytes inspected per file
pub const DEFAULT_PROBE_LENGTH: usize = 512;

/// Outcome of resolving one offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedByte {
    /// Every sample holds this value at the offset
    Byte(u8),
    /// Samples disagree, or some sample has no byte here
    Wildcard,
}

impl ResolvedByte {
    /// The agreed value, if any
    pub fn value(self) -> Option<u8> {
        match self {
            ResolvedByte::Byte(b) => Some(b),
            ResolvedByte::Wildcard => None,
        }
    }

    pub fn is_wildcard(self) -> bool {
        matches!(self, ResolvedByte::Wildcard)
    }
}

impl From<u8> for ResolvedByte {
    fn from(byte: u8) -> Self {
        ResolvedByte::Byte(byte)
    }
}

impl Serialize for ResolvedByte {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ResolvedByte::Byte(b) => serializer.serialize_u8(*b),
            ResolvedByte::Wildcard => serializer.serialize_none(),
        }
    }
}

/// Per-offset resolutions, in ascending offset order
pub type ResolvedSequence = Vec<ResolvedByte>;

/// How to treat offsets that some samples are too short to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortSamplePolicy {
    /// A missing byte counts as disagreement
    #[default]
    Strict,
    /// Resolve from the bytes that are present; an offset nobody reaches is
    /// still a wildcard
    PresentOnly,
}

/// Resolves sample columns into a [`ResolvedSequence`]
#[derive(Debug, Clone)]
pub struct ColumnAnalyzer {
    probe_length: usize,
    policy: ShortSamplePolicy,
}

impl ColumnAnalyzer {
    /// Create an analyzer covering `probe_length` leading bytes
    pub fn new(probe_length: usize) -> Self {
        Self {
            probe_length,
            policy: ShortSamplePolicy::default(),
        }
    }

    /// Select the short-sample policy
    pub fn with_policy(mut self, policy: ShortSamplePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn probe_length(&self) -> usize {
        self.probe_length
    }

    pub fn policy(&self) -> ShortSamplePolicy {
        self.policy
    }

    /// Resolve every offset in `0..probe_length`.
    ///
    /// The result always holds exactly `probe_length` entries, regardless of
    /// how long the individual samples are.
    pub fn resolve(&self, samples: &[Sample]) -> Result<ResolvedSequence> {
        if self.probe_length == 0 {
            return Err(SignatureError::InvalidProbeLength(self.probe_length));
        }
        if samples.is_empty() {
            return Err(SignatureError::EmptyInput);
        }

        let resolved: ResolvedSequence = (0..self.probe_length)
            .map(|offset| self.resolve_offset(samples, offset))
            .collect();

        log::debug!(
            "resolved {} offsets across {} samples ({} wildcards)",
            resolved.len(),
            samples.len(),
            resolved.iter().filter(|r| r.is_wildcard()).count()
        );

        Ok(resolved)
    }

    /// Single pass over the samples for one column
    fn resolve_offset(&self, samples: &[Sample], offset: usize) -> ResolvedByte {
        let mut agreed: Option<u8> = None;
        let mut present = 0usize;

        for byte in samples.iter().filter_map(|s| s.bytes().get(offset).copied()) {
            match agreed {
                Some(first) if first != byte => return ResolvedByte::Wildcard,
                Some(_) => {}
                None => agreed = Some(byte),
            }
            present += 1;
        }

        if self.policy == ShortSamplePolicy::Strict && present < samples.len() {
            return ResolvedByte::Wildcard;
        }

        agreed.map_or(ResolvedByte::Wildcard, ResolvedByte::Byte)
    }
}

impl Default for ColumnAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_LENGTH)
    }
}

/// Resolve `samples` over `probe_length` offsets with the strict policy
pub fn resolve_columns(samples: &[Sample], probe_length: usize) -> Result<ResolvedSequence> {
    ColumnAnalyzer::new(probe_length).resolve(samples)
}
