//! In-memory Girder used by the service tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{json, Value};

use sivacor::domain::{Collection, FileInfo, Job, SortDirection, Submission, SubmissionRef, User};
use sivacor::infrastructure::traits::{ApiError, ApiResult, GirderApi};

pub const COLLECTION_ID: &str = "c0ffee";

/// Canned Girder state plus a log of calls made against it.
#[derive(Default)]
pub struct FakeGirder {
    pub collection: Option<Collection>,
    pub folders: Vec<Submission>,
    pub users: Vec<User>,
    /// Text search results keyed by query; unknown queries find nothing
    pub searches: HashMap<String, Vec<User>>,
    pub jobs: Vec<Job>,
    pub files: HashMap<String, (FileInfo, Vec<u8>)>,
    /// Return every folder from `find_folders`, like a server ignoring the filter
    pub ignore_folder_filter: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGirder {
    pub fn new() -> Self {
        Self {
            collection: Some(collection()),
            ..Default::default()
        }
    }

    pub fn with_folders(mut self, folders: Vec<Submission>) -> Self {
        self.folders = folders;
        self
    }

    pub fn ignoring_folder_filter(mut self) -> Self {
        self.ignore_folder_filter = true;
        self
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn with_search(mut self, query: &str, hits: Vec<User>) -> Self {
        self.searches.insert(query.to_string(), hits);
        self
    }

    pub fn with_jobs(mut self, jobs: Vec<Job>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_file(mut self, id: &str, name: &str, content: &[u8]) -> Self {
        let info: FileInfo =
            serde_json::from_value(json!({"_id": id, "name": name, "size": content.len()}))
                .unwrap();
        self.files.insert(id.to_string(), (info, content.to_vec()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl GirderApi for FakeGirder {
    fn find_collection(&self, name: &str) -> ApiResult<Option<Collection>> {
        self.record(format!("find_collection {name}"));
        Ok(self.collection.clone().filter(|c| c.name == name))
    }

    fn list_folders(
        &self,
        collection_id: &str,
        sort: &str,
        sort_dir: SortDirection,
    ) -> ApiResult<Vec<Submission>> {
        self.record(format!("list_folders {collection_id} {sort} {sort_dir}"));
        Ok(self.folders.clone())
    }

    fn find_folders(
        &self,
        collection_id: &str,
        reference: &SubmissionRef,
    ) -> ApiResult<Vec<Submission>> {
        self.record(format!("find_folders {collection_id} {reference}"));
        Ok(self
            .folders
            .iter()
            .filter(|s| self.ignore_folder_filter || s.matches(reference))
            .cloned()
            .collect())
    }

    fn list_users(&self) -> ApiResult<Vec<User>> {
        self.record("list_users".to_string());
        Ok(self.users.clone())
    }

    fn search_users(&self, text: &str) -> ApiResult<Vec<User>> {
        self.record(format!("search_users {text}"));
        Ok(self.searches.get(text).cloned().unwrap_or_default())
    }

    fn get_user(&self, id: &str) -> ApiResult<User> {
        self.record(format!("get_user {id}"));
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("user", id))
    }

    fn list_jobs(&self, statuses: &[i64], types: &[String]) -> ApiResult<Vec<Job>> {
        self.record(format!("list_jobs {statuses:?} {types:?}"));
        Ok(self
            .jobs
            .iter()
            .filter(|j| statuses.is_empty() || statuses.contains(&j.status))
            .filter(|j| {
                types.is_empty() || j.kind.as_ref().is_some_and(|k| types.contains(k))
            })
            .cloned()
            .collect())
    }

    fn get_job(&self, id: &str) -> ApiResult<Value> {
        self.record(format!("get_job {id}"));
        self.jobs
            .iter()
            .find(|j| j.id == id)
            .map(|j| serde_json::to_value(j).unwrap())
            .ok_or_else(|| ApiError::not_found("job", id))
    }

    fn file_info(&self, id: &str) -> ApiResult<FileInfo> {
        self.record(format!("file_info {id}"));
        self.files
            .get(id)
            .map(|(info, _)| info.clone())
            .ok_or_else(|| ApiError::not_found("file", id))
    }

    fn download_file(&self, id: &str) -> ApiResult<Vec<u8>> {
        self.record(format!("download_file {id}"));
        self.files
            .get(id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| ApiError::not_found("file", id))
    }
}

pub fn collection() -> Collection {
    serde_json::from_value(json!({"_id": COLLECTION_ID, "name": "Submissions"})).unwrap()
}

pub fn user(id: &str, login: &str, first: &str, last: &str) -> User {
    serde_json::from_value(json!({
        "_id": id,
        "login": login,
        "firstName": first,
        "lastName": last,
        "email": format!("{login}@example.org"),
    }))
    .unwrap()
}

pub fn submission(name: &str, job_id: &str, creator_id: &str, created: &str) -> Submission {
    serde_json::from_value(json!({
        "_id": format!("f-{name}"),
        "name": name,
        "created": created,
        "meta": {
            "status": "completed",
            "job_id": job_id,
            "creator_id": creator_id,
            "stages": [{"image_name": "python", "image_tag": "3.12"}],
        }
    }))
    .unwrap()
}

pub fn job(id: &str, status: i64, created: &str) -> Job {
    serde_json::from_value(json!({
        "_id": id,
        "title": format!("run {id}"),
        "type": "sivacor_submission",
        "status": status,
        "created": created,
    }))
    .unwrap()
}
