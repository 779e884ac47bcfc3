//! Shared vocabulary types.
//!
//! The enumerations and key types that flow between the CLI, the HTTP API,
//! the registry, and the patch operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Moderation lifecycle state of a single comment in the local mirror.
///
/// Validated at the CLI/HTTP boundary; the patch operation itself writes
/// whatever string it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
#[value(rename_all = "camelCase")]
pub enum ModerationStatus {
    Draft,
    Reject,
    HeldForReview,
    Dataset,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Draft => "draft",
            ModerationStatus::Reject => "reject",
            ModerationStatus::HeldForReview => "heldForReview",
            ModerationStatus::Dataset => "dataset",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline state of an analysis run as recorded in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum PipelineStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Queued => "queued",
            PipelineStatus::Processing => "processing",
            PipelineStatus::Completed => "completed",
            PipelineStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of an analysis run's JSON artifacts an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Chunked document of comments classified as gambling spam.
    Gambling,
    /// Chunked document of comments classified as clean.
    Nongambling,
    /// Flat keyword dictionary.
    Keywords,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Gambling => "gambling",
            ArtifactKind::Nongambling => "nongambling",
            ArtifactKind::Keywords => "keywords",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key for a keyword dictionary entry.
///
/// Callers may address an entry by its numeric `id` or by the keyword
/// itself. The two paths use typed comparisons against the respective
/// field; there is no cross-type coercion in the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordKey {
    ById(i64),
    ByKeyword(String),
}

impl KeywordKey {
    /// Interpret a caller-supplied textual key: an integer becomes an id
    /// lookup, anything else a keyword lookup.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(id) => KeywordKey::ById(id),
            Err(_) => KeywordKey::ByKeyword(raw.to_string()),
        }
    }
}

impl fmt::Display for KeywordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordKey::ById(id) => write!(f, "id {}", id),
            KeywordKey::ByKeyword(word) => write!(f, "keyword '{}'", word),
        }
    }
}
