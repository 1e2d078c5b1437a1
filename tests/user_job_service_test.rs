//! Tests for UserService and JobService against an in-memory Girder

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::rstest;

use common::{job, user, FakeGirder};
use sivacor::application::services::{JobQuery, JobService, UserService, DEFAULT_JOB_TYPE};
use sivacor::application::ApplicationError;
use sivacor::domain::Since;
use sivacor::util::testing;

fn users() -> FakeGirder {
    testing::init_test_setup();
    FakeGirder::new().with_users(vec![
        user("u1", "alice", "Alice", "Liddell"),
        user("u2", "bob", "Bob", "Builder"),
    ])
}

fn jobs() -> FakeGirder {
    testing::init_test_setup();
    FakeGirder::new().with_jobs(vec![
        job("j1", 3, "2025-03-02T09:00:00.000000+00:00"),
        job("j2", 4, "2025-02-01T09:00:00.000000+00:00"),
        job("j3", 4, "2025-03-05T09:00:00.000000+00:00"),
    ])
}

// ============================================================
// UserService
// ============================================================

#[test]
fn given_users_when_listing_then_every_entry_has_login_and_name() {
    let service = UserService::new(Arc::new(users()));

    let listed = service.list_users().unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed
        .iter()
        .all(|u| !u.login.is_empty() && !u.full_name().is_empty()));
}

#[test]
fn given_users_when_building_directory_then_maps_id_to_display_name() {
    let service = UserService::new(Arc::new(users()));

    let directory = service.directory().unwrap();

    assert_eq!(directory.get("u1").map(String::as_str), Some("Alice Liddell (alice)"));
    assert_eq!(directory.get("u2").map(String::as_str), Some("Bob Builder (bob)"));
}

#[rstest]
#[case::single_hit("Liddell", "u1")]
#[case::exact_login_among_many("bob", "u2")]
fn given_query_when_resolving_then_picks_user(#[case] query: &str, #[case] expected: &str) {
    let girder = users()
        .with_search("Liddell", vec![user("u1", "alice", "Alice", "Liddell")])
        .with_search(
            "bob",
            vec![
                user("u9", "bobby", "Bobby", "Tables"),
                user("u2", "bob", "Bob", "Builder"),
            ],
        );
    let service = UserService::new(Arc::new(girder));

    let resolved = service.resolve(query).unwrap();

    assert_eq!(resolved.id, expected);
}

#[test]
fn given_no_hits_when_resolving_then_not_found() {
    let service = UserService::new(Arc::new(users()));

    let err = service.resolve("zed").unwrap_err();

    assert!(matches!(err, ApplicationError::NotFound { kind: "user", ref id } if id == "zed"));
}

// ============================================================
// JobService
// ============================================================

#[test]
fn given_default_query_when_listing_then_asks_for_submission_jobs() {
    let girder = Arc::new(jobs());
    let service = JobService::new(girder.clone());

    let listed = service.list_jobs(&JobQuery::default()).unwrap();

    assert_eq!(listed.len(), 3);
    assert_eq!(
        girder.calls(),
        vec![format!("list_jobs [] [\"{DEFAULT_JOB_TYPE}\"]")]
    );
}

#[test]
fn given_status_and_since_when_listing_then_filters_both() {
    // Arrange
    let service = JobService::new(Arc::new(jobs()));
    let query = JobQuery {
        statuses: vec![4],
        since: Some(Since::new(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())),
        ..Default::default()
    };

    // Act
    let listed = service.list_jobs(&query).unwrap();

    // Assert
    let ids: Vec<&str> = listed.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["j3"]);
}

#[test]
fn given_known_id_when_getting_job_then_returns_full_record() {
    let service = JobService::new(Arc::new(jobs()));

    let record = service.get_job("j2").unwrap();

    assert_eq!(record["_id"], "j2");
    assert_eq!(record["status"], 4);
    assert_eq!(record["type"], DEFAULT_JOB_TYPE);
}

#[test]
fn given_unknown_id_when_getting_job_then_not_found() {
    let service = JobService::new(Arc::new(jobs()));

    let err = service.get_job("nope").unwrap_err();

    assert!(matches!(err, ApplicationError::NotFound { kind: "job", .. }));
}
