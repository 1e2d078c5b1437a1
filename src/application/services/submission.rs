//! Submission service
//!
//! Submissions are folders below the `Submissions` collection. Listing can be
//! narrowed to one creator and a creation date; single submissions are found
//! by name or job id and their artifacts can be downloaded.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::services::UserService;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Collection, Since, SortDirection, Submission, SubmissionFile, SubmissionRef, User};
use crate::infrastructure::traits::{ApiError, FileSystem, GirderApi};

/// Name of the collection holding submission folders.
pub const SUBMISSIONS_COLLECTION: &str = "Submissions";

/// Creator label when the creator is not a known user.
const UNKNOWN_CREATOR: &str = "Unknown";

/// Filters and ordering for `submission list`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionQuery {
    /// Login or name of the creator
    pub user: Option<String>,
    /// Server-side sort field
    pub sort: String,
    pub sort_dir: SortDirection,
    /// Client-side lower bound on creation time
    pub since: Option<Since>,
}

impl Default for SubmissionQuery {
    fn default() -> Self {
        Self {
            user: None,
            sort: "created".to_string(),
            sort_dir: SortDirection::Descending,
            since: None,
        }
    }
}

/// Result of a submission listing.
#[derive(Debug, Clone)]
pub struct SubmissionListing {
    /// Submissions passing all filters, in server order
    pub submissions: Vec<Submission>,
    /// User id -> "First Last (login)"
    pub creators: HashMap<String, String>,
    /// The user the listing was narrowed to
    pub filtered_by: Option<User>,
}

impl SubmissionListing {
    pub fn creator_of(&self, submission: &Submission) -> &str {
        submission
            .meta
            .creator_id
            .as_deref()
            .and_then(|id| self.creators.get(id))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CREATOR)
    }
}

/// A single submission with its creator resolved.
#[derive(Debug, Clone)]
pub struct SubmissionDetail {
    pub submission: Submission,
    pub creator: Option<User>,
}

/// What happened to one requested artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved {
        kind: SubmissionFile,
        path: PathBuf,
        bytes: usize,
    },
    Unavailable {
        kind: SubmissionFile,
    },
}

/// Service for submission lookups and artifact downloads.
pub struct SubmissionService {
    api: Arc<dyn GirderApi>,
    fs: Arc<dyn FileSystem>,
    users: UserService,
}

impl SubmissionService {
    /// Create a new submission service.
    pub fn new(api: Arc<dyn GirderApi>, fs: Arc<dyn FileSystem>) -> Self {
        let users = UserService::new(api.clone());
        Self { api, fs, users }
    }

    fn collection(&self) -> ApplicationResult<Collection> {
        self.api
            .find_collection(SUBMISSIONS_COLLECTION)?
            .ok_or_else(|| ApplicationError::NotFound {
                kind: "collection",
                id: SUBMISSIONS_COLLECTION.to_string(),
            })
    }

    /// List submissions, optionally narrowed to one creator and a start date.
    #[instrument(skip(self))]
    pub fn list_submissions(&self, query: &SubmissionQuery) -> ApplicationResult<SubmissionListing> {
        let filtered_by = match &query.user {
            Some(q) => Some(self.users.resolve(q)?),
            None => None,
        };
        if let Some(user) = &filtered_by {
            debug!("list_submissions: filtering by user id {}", user.id);
        }

        let creators = self.users.directory()?;
        let collection = self.collection()?;
        let folders = self
            .api
            .list_folders(&collection.id, &query.sort, query.sort_dir)?;
        let total = folders.len();

        let submissions: Vec<Submission> = folders
            .into_iter()
            .filter(|s| query.since.map_or(true, |since| since.admits(s.created_at())))
            .filter(|s| match &filtered_by {
                Some(user) => s.meta.creator_id.as_deref() == Some(user.id.as_str()),
                None => true,
            })
            .collect();
        debug!(
            "list_submissions: {} of {} submissions kept",
            submissions.len(),
            total
        );

        Ok(SubmissionListing {
            submissions,
            creators,
            filtered_by,
        })
    }

    /// Fetch one submission by name or job id.
    #[instrument(skip(self, reference), fields(reference = %reference))]
    pub fn get_submission(&self, reference: &SubmissionRef) -> ApplicationResult<SubmissionDetail> {
        let collection = self.collection()?;
        let mut folders = self.api.find_folders(&collection.id, reference)?;
        debug!("get_submission: {} candidate folders", folders.len());

        // the server may ignore an unknown filter and return every folder
        let Some(idx) = folders.iter().position(|s| s.matches(reference)) else {
            return Err(ApplicationError::NotFound {
                kind: "submission",
                id: reference.to_string(),
            });
        };
        let submission = folders.swap_remove(idx);

        let creator = match submission.meta.creator_id.as_deref() {
            Some(id) if !id.is_empty() => match self.api.get_user(id) {
                Ok(user) => Some(user),
                Err(ApiError::NotFound { .. }) => {
                    warn!("creator {} of {} no longer exists", id, submission.name);
                    None
                }
                Err(e) => return Err(e.into()),
            },
            _ => None,
        };

        Ok(SubmissionDetail {
            submission,
            creator,
        })
    }

    /// Download artifacts into `dest`, creating it if needed.
    ///
    /// Artifacts the run did not produce are reported as `Unavailable`.
    #[instrument(skip(self, submission), fields(submission = %submission.name))]
    pub fn download(
        &self,
        submission: &Submission,
        kinds: &[SubmissionFile],
        dest: &Path,
    ) -> ApplicationResult<Vec<DownloadOutcome>> {
        if !kinds.is_empty() {
            if !self.fs.exists(dest) {
                self.fs
                    .create_dir_all(dest)
                    .with_path_context("create output directory", dest)?;
            } else if !self.fs.is_dir(dest) {
                Err::<(), _>(io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"))
                    .with_path_context("use output directory", dest)?;
            }
        }

        let mut outcomes = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let Some(file_id) = submission.artifact_id(kind) else {
                debug!("download: {} not available", kind);
                outcomes.push(DownloadOutcome::Unavailable { kind });
                continue;
            };

            let info = self.api.file_info(file_id)?;
            let bytes = self.api.download_file(file_id)?;
            let path = dest.join(safe_file_name(&info.name, file_id));
            self.fs
                .write_bytes(&path, &bytes)
                .with_path_context("write artifact", &path)?;
            debug!("download: {} -> {} ({} bytes)", kind, path.display(), bytes.len());

            outcomes.push(DownloadOutcome::Saved {
                kind,
                path,
                bytes: bytes.len(),
            });
        }
        Ok(outcomes)
    }
}

/// Last path component of a server-provided name, falling back to the file id.
fn safe_file_name(name: &str, fallback: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "..")
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_plain_name_when_sanitizing_then_kept() {
        assert_eq!(safe_file_name("replpack.zip", "f1"), "replpack.zip");
    }

    #[test]
    fn given_path_like_name_when_sanitizing_then_takes_last_component() {
        assert_eq!(safe_file_name("../../etc/passwd", "f1"), "passwd");
        assert_eq!(safe_file_name("logs/stdout.txt", "f1"), "stdout.txt");
    }

    #[test]
    fn given_empty_or_parent_name_when_sanitizing_then_uses_fallback() {
        assert_eq!(safe_file_name("", "f1"), "f1");
        assert_eq!(safe_file_name("..", "f1"), "f1");
    }
}
