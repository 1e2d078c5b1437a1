//! Domain entities: Girder records as the CLI sees them
//!
//! Records are deserialized leniently. Fields the CLI does not model are kept
//! in `extra` so `--json` output shows the full server record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::DomainError;

/// Fields not modeled explicitly.
pub type Extra = Map<String, Value>;

/// Placeholder for absent values in tables.
pub const NOT_AVAILABLE: &str = "N/A";

/// Girder collection (only `Submissions` is used).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One container stage of a submission run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Stage {
    /// `image:tag`, with `N/A` for missing parts.
    pub fn image(&self) -> String {
        format!(
            "{}:{}",
            self.image_name.as_deref().unwrap_or(NOT_AVAILABLE),
            self.image_tag.as_deref().unwrap_or(NOT_AVAILABLE)
        )
    }
}

/// Submission metadata stored on the Girder folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replpack_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tro_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsr_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig_file_id: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A submission: a folder under the `Submissions` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub meta: SubmissionMeta,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Submission {
    pub fn status(&self) -> &str {
        self.meta.status.as_deref().unwrap_or("unknown")
    }

    /// Status as a single glyph for tables.
    pub fn status_icon(&self) -> &'static str {
        match self.status().to_lowercase().as_str() {
            "submitted" => "⏳",
            "processing" => "🔄",
            "completed" => "✅",
            "failed" => "❌",
            _ => "❓",
        }
    }

    /// Comma-joined `image:tag` of every stage, `N/A` when there are none.
    pub fn image_tags(&self) -> String {
        if self.meta.stages.is_empty() {
            return NOT_AVAILABLE.to_string();
        }
        self.meta
            .stages
            .iter()
            .map(Stage::image)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.as_deref().and_then(parse_timestamp)
    }

    /// File id of an artifact, if the run produced it.
    pub fn artifact_id(&self, kind: SubmissionFile) -> Option<&str> {
        let id = match kind {
            SubmissionFile::ReplPack => &self.meta.replpack_file_id,
            SubmissionFile::Stdout => &self.meta.stdout_file_id,
            SubmissionFile::Stderr => &self.meta.stderr_file_id,
            SubmissionFile::Tro => &self.meta.tro_file_id,
            SubmissionFile::Tsr => &self.meta.tsr_file_id,
            SubmissionFile::Sig => &self.meta.sig_file_id,
        };
        id.as_deref().filter(|s| !s.is_empty())
    }

    /// Available artifacts in display order.
    pub fn artifacts(&self) -> Vec<(SubmissionFile, &str)> {
        SubmissionFile::ALL
            .iter()
            .filter_map(|kind| self.artifact_id(*kind).map(|id| (*kind, id)))
            .collect()
    }

    /// True if `reference` names this submission.
    pub fn matches(&self, reference: &SubmissionRef) -> bool {
        match reference {
            SubmissionRef::Name(name) => &self.name == name,
            SubmissionRef::JobId(id) => self.meta.job_id.as_deref() == Some(id.as_str()),
        }
    }
}

/// Downloadable artifacts of a submission run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionFile {
    ReplPack,
    Stdout,
    Stderr,
    Tro,
    Tsr,
    Sig,
}

impl SubmissionFile {
    pub const ALL: [SubmissionFile; 6] = [
        SubmissionFile::ReplPack,
        SubmissionFile::Stdout,
        SubmissionFile::Stderr,
        SubmissionFile::Tro,
        SubmissionFile::Tsr,
        SubmissionFile::Sig,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SubmissionFile::ReplPack => "Replicated Package",
            SubmissionFile::Stdout => "Run output log",
            SubmissionFile::Stderr => "Run error log",
            SubmissionFile::Tro => "TRO Declaration",
            SubmissionFile::Tsr => "Trusted Timestamp",
            SubmissionFile::Sig => "TRS Signature",
        }
    }
}

impl fmt::Display for SubmissionFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a submission is identified on the command line.
///
/// Submission names always contain a dash; job ids never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionRef {
    Name(String),
    JobId(String),
}

impl SubmissionRef {
    /// Query parameter used to look the submission up.
    pub fn query_param(&self) -> (&'static str, &str) {
        match self {
            SubmissionRef::Name(name) => ("name", name),
            SubmissionRef::JobId(id) => ("jobId", id),
        }
    }

    pub fn as_str(&self) -> &str {
        self.query_param().1
    }
}

impl FromStr for SubmissionRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::InvalidSubmissionRef(s.to_string()));
        }
        if s.contains('-') {
            Ok(SubmissionRef::Name(s.to_string()))
        } else {
            Ok(SubmissionRef::JobId(s.to_string()))
        }
    }
}

impl fmt::Display for SubmissionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Linked OAuth account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthIdentity {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// A Girder user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub login: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "lastJobId", default, skip_serializing_if = "Option::is_none")]
    pub last_job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oauth: Vec<OAuthIdentity>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl User {
    /// "First Last"; falls back to the login when both are empty.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.login.clone()
        } else {
            name.to_string()
        }
    }

    /// "First Last (login)"
    pub fn display_with_login(&self) -> String {
        format!("{} ({})", self.full_name(), self.login)
    }

    /// `"First Last" <email> (login)`
    pub fn contact_line(&self) -> String {
        format!(
            "\"{}\" <{}> ({})",
            self.full_name(),
            self.email.as_deref().unwrap_or(NOT_AVAILABLE),
            self.login
        )
    }

    /// Distinct OAuth providers in first-seen order.
    pub fn oauth_providers(&self) -> Vec<&str> {
        let mut providers: Vec<&str> = Vec::new();
        for identity in &self.oauth {
            if !providers.contains(&identity.provider.as_str()) {
                providers.push(&identity.provider);
            }
        }
        providers
    }
}

/// Girder job status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Inactive,
    Queued,
    Running,
    Completed,
    Failed,
    Canceled,
    Unknown,
}

impl JobStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => JobStatus::Inactive,
            1 => JobStatus::Queued,
            2 => JobStatus::Running,
            3 => JobStatus::Completed,
            4 => JobStatus::Failed,
            5 => JobStatus::Canceled,
            _ => JobStatus::Unknown,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Inactive => "Inactive",
            JobStatus::Queued => "Queued",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
            JobStatus::Canceled => "Canceled",
            JobStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// A Girder job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Job {
    pub fn status(&self) -> JobStatus {
        JobStatus::from_code(self.status)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.as_deref().and_then(parse_timestamp)
    }
}

/// File metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Parse a Girder timestamp.
///
/// Girder emits ISO-8601 with microseconds, usually with an offset. Naive
/// timestamps are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `2025-03-01T10:20:30.123+00:00` -> `2025-03-01 10:20:30`
pub fn display_timestamp(raw: &str) -> String {
    let head = raw.split('.').next().unwrap_or(raw).replace('T', " ");
    head.chars().take(19).collect()
}
