use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::application::services::{DownloadOutcome, JobQuery, SubmissionQuery};
use crate::cli::args::{
    Cli, Commands, DownloadArg, JobCommands, SubmissionCommands, UserCommands,
};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::cli::render;
use crate::config::Settings;
use crate::domain::{Since, SortDirection, SubmissionFile, SubmissionRef};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::path::expand_path;

/// Load settings, wire services and run the selected command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings)?;
    debug!("using Girder at {}", container.settings.api_url);
    execute_with(&cli.command, &container)
}

/// Run a command against an existing container.
pub fn execute_with(command: &Commands, container: &ServiceContainer) -> CliResult<()> {
    match command {
        Commands::Submission { command } => match command {
            SubmissionCommands::List {
                user,
                sort,
                sort_dir,
                since,
                json,
            } => cmd_submission_list(container, user.as_deref(), sort, *sort_dir, *since, *json),
            SubmissionCommands::Get {
                submission,
                download,
                output_dir,
                json,
            } => cmd_submission_get(container, submission, download, output_dir.as_deref(), *json),
        },
        Commands::User { command } => match command {
            UserCommands::List { json } => cmd_user_list(container, *json),
        },
        Commands::Job { command } => match command {
            JobCommands::List {
                status,
                types,
                since,
                json,
            } => cmd_job_list(container, status, types, *since, *json),
            JobCommands::Get { job_id } => cmd_job_get(container, job_id),
        },
    }
}

#[instrument(skip(container))]
fn cmd_submission_list(
    container: &ServiceContainer,
    user: Option<&str>,
    sort: &str,
    sort_dir: SortDirection,
    since: Option<Since>,
    json: bool,
) -> CliResult<()> {
    let query = SubmissionQuery {
        user: user.map(str::to_string),
        sort: sort.to_string(),
        sort_dir,
        since,
    };
    let listing = container.submissions().list_submissions(&query)?;

    if json {
        output::info(&render::to_json(&listing.submissions)?);
        return Ok(());
    }

    if let Some(user) = &listing.filtered_by {
        output::note(&format!(
            "Filtering submissions for user: {}",
            user.display_with_login()
        ));
    }
    if listing.submissions.is_empty() {
        output::note("No submissions found");
        return Ok(());
    }
    output::info(&render::submissions_table(&listing));
    Ok(())
}

#[instrument(skip(container, submission), fields(submission = %submission))]
fn cmd_submission_get(
    container: &ServiceContainer,
    submission: &SubmissionRef,
    download: &[DownloadArg],
    output_dir: Option<&Path>,
    json: bool,
) -> CliResult<()> {
    let service = container.submissions();
    let detail = service.get_submission(submission)?;

    if json {
        output::info(&render::to_json(&detail.submission)?);
    } else {
        output::info(&render::submission_summary(&detail));
        let artifacts = render::artifact_list(&detail.submission);
        if !artifacts.is_empty() {
            output::header("Available files:");
            for line in artifacts {
                output::info(&format!("  {}", line));
            }
        }
    }

    if download.is_empty() {
        return Ok(());
    }

    let dest = resolve_output_dir(output_dir)?;
    let kinds: Vec<SubmissionFile> = download.iter().copied().map(SubmissionFile::from).collect();
    for outcome in service.download(&detail.submission, &kinds, &dest)? {
        match outcome {
            DownloadOutcome::Saved { kind, path, bytes } => output::success(&format!(
                "Downloaded {} to {} ({} bytes)",
                kind,
                path.display(),
                bytes
            )),
            DownloadOutcome::Unavailable { kind } => output::warning(&format!(
                "{} is not available for submission {}",
                kind, detail.submission.name
            )),
        }
    }
    Ok(())
}

fn resolve_output_dir(output_dir: Option<&Path>) -> CliResult<PathBuf> {
    match output_dir {
        Some(dir) => Ok(expand_path(dir)),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("resolve current directory", e).into()),
    }
}

#[instrument(skip(container))]
fn cmd_user_list(container: &ServiceContainer, json: bool) -> CliResult<()> {
    let users = container.users().list_users()?;
    if json {
        output::info(&render::to_json(&users)?);
        return Ok(());
    }
    if users.is_empty() {
        output::note("No users found");
        return Ok(());
    }
    output::info(&render::users_table(&users));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_job_list(
    container: &ServiceContainer,
    status: &[i64],
    types: &[String],
    since: Option<Since>,
    json: bool,
) -> CliResult<()> {
    let query = JobQuery {
        statuses: status.to_vec(),
        types: types.to_vec(),
        since,
    };
    let jobs = container.jobs().list_jobs(&query)?;
    if json {
        output::info(&render::to_json(&jobs)?);
        return Ok(());
    }
    if jobs.is_empty() {
        output::note("No jobs found");
        return Ok(());
    }
    output::info(&render::jobs_table(&jobs));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_job_get(container: &ServiceContainer, job_id: &str) -> CliResult<()> {
    let job = container.jobs().get_job(job_id)?;
    output::info(&render::to_json(&job)?);
    Ok(())
}
