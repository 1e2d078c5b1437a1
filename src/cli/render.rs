//! Human-readable and JSON renderings of command results

use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;

use crate::application::services::{SubmissionDetail, SubmissionListing};
use crate::cli::error::{CliError, CliResult};
use crate::cli::table::{Align, Table};
use crate::domain::{display_timestamp, Job, Submission, User, NOT_AVAILABLE};

pub fn submissions_table(listing: &SubmissionListing) -> String {
    let mut table = Table::new()
        .title("Submission Folders")
        .column("Submission Name", 20, Align::Left)
        .column("Job ID", 0, Align::Left)
        .column("Image Tag", 0, Align::Left)
        .column("Creator", 0, Align::Left)
        .column("Created Date", 19, Align::Right)
        .column("Status", 0, Align::Center);

    for submission in &listing.submissions {
        table.add_row(vec![
            submission.name.clone(),
            submission
                .meta
                .job_id
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            submission.image_tags(),
            listing.creator_of(submission).to_string(),
            created(submission.created.as_deref(), display_timestamp),
            submission.status_icon().to_string(),
        ]);
    }
    table.render()
}

/// Status, stage images, timestamps and creator of one submission.
pub fn submission_summary(detail: &SubmissionDetail) -> String {
    let submission = &detail.submission;
    let mut lines = vec![
        format!("{}", format!("Submission: {}", submission.name).bold()),
        field("Status", submission.status()),
    ];
    for (i, stage) in submission.meta.stages.iter().enumerate() {
        lines.push(field(&format!("Stage {} Image Tag", i + 1), &stage.image()));
    }
    lines.push(field(
        "Created",
        &created(submission.created.as_deref(), display_timestamp),
    ));
    lines.push(field(
        "Updated",
        &created(submission.updated.as_deref(), display_timestamp),
    ));
    // a creator id whose account is gone still gets a line
    if submission.meta.creator_id.is_some() {
        let creator = detail
            .creator
            .as_ref()
            .map(User::full_name)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        lines.push(field("Submitted by", &creator));
    }
    lines.join("\n")
}

/// `Label: file id` for each artifact the run produced.
pub fn artifact_list(submission: &Submission) -> Vec<String> {
    submission
        .artifacts()
        .into_iter()
        .map(|(kind, id)| field(kind.label(), id))
        .collect()
}

pub fn users_table(users: &[User]) -> String {
    let mut table = Table::new()
        .title("Users")
        .column("Name", 0, Align::Left)
        .column("Email", 0, Align::Left)
        .column("Last Job ID", 0, Align::Left)
        .column("OAuth IDs", 0, Align::Left);

    for user in users {
        table.add_row(vec![
            user.full_name(),
            user.email.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            user.last_job_id
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            user.oauth_providers().iter().join(", "),
        ]);
    }
    table.render()
}

pub fn jobs_table(jobs: &[Job]) -> String {
    let mut table = Table::new()
        .title("Jobs")
        .column("Job ID", 0, Align::Left)
        .column("Title", 0, Align::Left)
        .column("Status", 0, Align::Left)
        .column("Created", 16, Align::Left);

    for job in jobs {
        table.add_row(vec![
            job.id.clone(),
            job.title.clone(),
            job.status().to_string(),
            created(job.created.as_deref(), minutes),
        ]);
    }
    table.render()
}

/// Pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::Render(e.to_string()))
}

fn field(label: &str, value: &str) -> String {
    format!("{}: {}", label.bold(), value)
}

fn created(raw: Option<&str>, fmt: fn(&str) -> String) -> String {
    raw.map(fmt).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn minutes(raw: &str) -> String {
    raw.replace('T', " ").chars().take(16).collect()
}
