//! Batch report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ErrorKind, Location, SchemaError};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Digest of one written artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDigest {
    /// File name relative to the output directory
    pub file: String,

    /// Lowercase hex SHA-256 of the file contents
    pub sha256: String,

    pub bytes: usize,
}

impl ArtifactDigest {
    pub fn of(file: impl Into<String>, contents: &str) -> Self {
        Self {
            file: file.into(),
            sha256: hex::encode(Sha256::digest(contents.as_bytes())),
            bytes: contents.len(),
        }
    }
}

/// What happened to one schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// Compiled and every artifact written
    Compiled { artifacts: Vec<ArtifactDigest> },

    /// Not a valid schema name; left untouched
    Skipped { reason: String },

    /// Compilation or writing failed; nothing written
    Failed {
        code: Option<ErrorKind>,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
}

impl Outcome {
    /// Failure from a schema error
    pub fn from_schema_error(error: &SchemaError) -> Self {
        Self::Failed {
            code: Some(error.kind),
            message: error.message.clone(),
            location: error.location.clone(),
        }
    }

    /// Failure unrelated to the schema itself, such as an IO error
    pub fn from_other_error(message: impl Into<String>) -> Self {
        Self::Failed {
            code: None,
            message: message.into(),
            location: None,
        }
    }
}

/// Result for one input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    /// Schema name (the file stem)
    pub schema: String,

    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub compiled: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Batch report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Which emitter ran (`sql` or `descriptor`)
    pub mode: String,

    pub summary: ReportSummary,

    pub files: Vec<FileReport>,
}

impl Report {
    /// Create a new empty report
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            mode: mode.into(),
            summary: ReportSummary::default(),
            files: Vec::new(),
        }
    }

    /// Record the outcome for one schema
    pub fn add(&mut self, schema: impl Into<String>, outcome: Outcome) {
        match outcome {
            Outcome::Compiled { .. } => self.summary.compiled += 1,
            Outcome::Skipped { .. } => self.summary.skipped += 1,
            Outcome::Failed { .. } => self.summary.failed += 1,
        }

        self.summary.total += 1;
        self.files.push(FileReport {
            schema: schema.into(),
            outcome,
        });
    }

    /// Check if any file failed
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
