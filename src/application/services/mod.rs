//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (GirderApi, FileSystem)
//! but are themselves concrete structs, not traits.

mod job;
mod submission;
mod user;

pub use job::{JobQuery, JobService, DEFAULT_JOB_TYPE};
pub use submission::{
    DownloadOutcome, SubmissionDetail, SubmissionListing, SubmissionQuery, SubmissionService,
    SUBMISSIONS_COLLECTION,
};
pub use user::UserService;
