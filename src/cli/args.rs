//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::services::DEFAULT_JOB_TYPE;
use crate::domain::{Since, SortDirection, SubmissionFile, SubmissionRef};

/// SIVACOR command line interface: browse submissions, users and jobs on Girder
///
/// Authenticates with the API key in GIRDER_API_KEY.
#[derive(Parser, Debug)]
#[command(name = "sivacor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Increase log verbosity on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Settings file (default: $XDG_CONFIG_HOME/sivacor/sivacor.toml)
    #[arg(long, global = true, env = "SIVACOR_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect submissions
    Submission {
        #[command(subcommand)]
        command: SubmissionCommands,
    },

    /// Inspect users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Inspect submission jobs
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubmissionCommands {
    /// List all submissions
    List {
        /// Only print submissions created by this user (login or name)
        #[arg(long)]
        user: Option<String>,

        /// Field to sort submissions by, e.g. 'created' or 'name'
        #[arg(long, default_value = "created")]
        sort: String,

        /// Sort direction (1: ascending, -1: descending)
        #[arg(long, default_value = "-1", allow_negative_numbers = true)]
        sort_dir: SortDirection,

        /// Only submissions created since this local date/time
        #[arg(long)]
        since: Option<Since>,

        /// Output submission list in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Get details about a specific submission and/or download its files
    Get {
        /// The job id or name of the submission
        submission: SubmissionRef,

        /// Download a file produced by the submission (repeatable)
        #[arg(long, value_enum)]
        download: Vec<DownloadArg>,

        /// Directory for downloaded files (default: current directory)
        #[arg(long, value_hint = ValueHint::DirPath)]
        output_dir: Option<PathBuf>,

        /// Output submission details in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List all users in the SIVACOR system
    List {
        /// Output user list in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// List submission jobs
    List {
        /// Filter by status code (repeatable), e.g. 4 for 'failed'
        #[arg(long)]
        status: Vec<i64>,

        /// Filter by job type (repeatable)
        #[arg(long, default_value = DEFAULT_JOB_TYPE)]
        types: Vec<String>,

        /// Only jobs created since this local date/time
        #[arg(long)]
        since: Option<Since>,

        /// Output job list in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Get details of a specific job by id
    Get {
        /// Job id
        job_id: String,
    },
}

/// Submission artifacts selectable with `--download`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadArg {
    /// Replicated Package
    #[value(name = "ReplPack", alias = "replpack")]
    ReplPack,
    /// Run output log
    Stdout,
    /// Run error log
    Stderr,
    /// TRO Declaration
    Tro,
    /// Trusted Timestamp
    Tsr,
    /// TRS Signature
    Sig,
}

impl From<DownloadArg> for SubmissionFile {
    fn from(arg: DownloadArg) -> Self {
        match arg {
            DownloadArg::ReplPack => SubmissionFile::ReplPack,
            DownloadArg::Stdout => SubmissionFile::Stdout,
            DownloadArg::Stderr => SubmissionFile::Stderr,
            DownloadArg::Tro => SubmissionFile::Tro,
            DownloadArg::Tsr => SubmissionFile::Tsr,
            DownloadArg::Sig => SubmissionFile::Sig,
        }
    }
}
