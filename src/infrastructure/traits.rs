//! I/O boundary traits for testability
//!
//! These traits abstract the Girder REST API and local file writes, allowing
//! services to be tested with in-memory implementations.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::domain::{Collection, FileInfo, Job, SortDirection, Submission, SubmissionRef, User};

/// Errors reported by a [`GirderApi`] implementation.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authentication rejected by {endpoint}: {message}")]
    Auth { endpoint: String, message: String },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },

    #[error("cannot reach {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {message}")]
    Http {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Girder REST operations the CLI relies on.
pub trait GirderApi: Send + Sync {
    /// Look up a collection by exact name.
    fn find_collection(&self, name: &str) -> ApiResult<Option<Collection>>;

    /// All folders below a collection, sorted server-side.
    fn list_folders(
        &self,
        collection_id: &str,
        sort: &str,
        sort_dir: SortDirection,
    ) -> ApiResult<Vec<Submission>>;

    /// Folders below a collection matching a submission name or job id.
    fn find_folders(
        &self,
        collection_id: &str,
        reference: &SubmissionRef,
    ) -> ApiResult<Vec<Submission>>;

    /// Every user.
    fn list_users(&self) -> ApiResult<Vec<User>>;

    /// Users matching a free-text search on login and name.
    fn search_users(&self, text: &str) -> ApiResult<Vec<User>>;

    fn get_user(&self, id: &str) -> ApiResult<User>;

    /// Jobs filtered by status codes and job types (empty = no filter).
    fn list_jobs(&self, statuses: &[i64], types: &[String]) -> ApiResult<Vec<Job>>;

    /// Full job record, untyped.
    fn get_job(&self, id: &str) -> ApiResult<serde_json::Value>;

    fn file_info(&self, id: &str) -> ApiResult<FileInfo>;

    /// Raw file contents.
    fn download_file(&self, id: &str) -> ApiResult<Vec<u8>>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Write bytes to file, replacing it.
    fn write_bytes(&self, path: &Path, content: &[u8]) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write_bytes(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        std::fs::write(path, content)
    }
}
