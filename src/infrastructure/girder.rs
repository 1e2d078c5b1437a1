//! Blocking HTTP client for the Girder REST API
//!
//! Authenticates by exchanging the API key for a session token on first use
//! (`POST api_key/token`), then sends the token in the `Girder-Token` header.
//! Collection endpoints are paged with `limit`/`offset` until a short page.

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use crate::config::Settings;
use crate::domain::{Collection, FileInfo, Job, SortDirection, Submission, SubmissionRef, User};
use crate::infrastructure::traits::{ApiError, ApiResult, GirderApi};

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "Girder-Token";

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 50;

type Params<'a> = Vec<(&'a str, String)>;

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(rename = "authToken")]
    auth_token: AuthToken,
}

#[derive(Deserialize)]
struct AuthToken {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Item addressed by a by-id request, used to report `NotFound`.
#[derive(Clone, Copy)]
struct Item<'a> {
    resource: &'a str,
    id: &'a str,
}

/// Girder REST client.
///
/// Custom `Debug` implementation redacts the API key and session token.
pub struct GirderClient {
    http: Client,
    base_url: Url,
    api_key: String,
    page_size: usize,
    token: Mutex<Option<String>>,
}

impl fmt::Debug for GirderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GirderClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl GirderClient {
    /// Validate credentials and build the client. No network I/O happens here.
    pub fn configure(base_url: &str, api_key: Option<&str>, timeout: Duration) -> ApiResult<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ApiError::Configuration(format!(
                    "{} environment variable is not set",
                    crate::config::API_KEY_VAR
                ))
            })?
            .to_string();
        let base_url = parse_base_url(base_url)?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sivacor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Configuration(format!("cannot build HTTP client: {e}")))?;

        debug!("configured Girder client for {}", base_url);
        Ok(Self {
            http,
            base_url,
            api_key,
            page_size: DEFAULT_PAGE_SIZE,
            token: Mutex::new(None),
        })
    }

    /// Build from loaded settings.
    pub fn from_settings(settings: &Settings) -> ApiResult<Self> {
        Ok(Self::configure(
            &settings.api_url,
            settings.api_key.as_deref(),
            Duration::from_secs(settings.timeout_secs),
        )?
        .with_page_size(settings.page_size))
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // base_url is checked to be a base in parse_base_url
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Session token, exchanged once per client.
    fn token(&self) -> ApiResult<String> {
        let mut cached = self
            .token
            .lock()
            .map_err(|_| ApiError::Configuration("token cache poisoned".into()))?;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = self.exchange_key()?;
        *cached = Some(token.clone());
        Ok(token)
    }

    fn exchange_key(&self) -> ApiResult<String> {
        let url = self.endpoint(&["api_key", "token"]);
        let endpoint = url.path().to_string();
        debug!("exchanging API key for session token at {}", endpoint);

        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .map_err(|source| ApiError::Network {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response);
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ApiError::Auth { endpoint, message }
                }
                _ => ApiError::Http {
                    endpoint,
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body: TokenResponse = response.json().map_err(|e| ApiError::Decode {
            endpoint,
            message: e.to_string(),
        })?;
        Ok(body.auth_token.token)
    }

    fn send(&self, request: RequestBuilder, endpoint: &str, item: Option<Item<'_>>) -> ApiResult<Response> {
        let token = self.token()?;
        let response = request
            .header(TOKEN_HEADER, token)
            .send()
            .map_err(|source| ApiError::Network {
                endpoint: endpoint.to_string(),
                source,
            })?;
        check_status(response, endpoint, item)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
        item: Option<Item<'_>>,
    ) -> ApiResult<T> {
        let url = self.endpoint(segments);
        let endpoint = url.path().to_string();
        trace!("GET {} {:?}", endpoint, params);

        let response = self.send(self.http.get(url).query(params), &endpoint, item)?;
        response.json().map_err(|e| ApiError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }

    /// Fetch every page of a collection endpoint.
    fn list_resource<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> ApiResult<Vec<T>> {
        let mut records = Vec::new();
        let mut offset = 0usize;
        loop {
            let mut page_params: Params<'_> = params.to_vec();
            page_params.push(("limit", self.page_size.to_string()));
            page_params.push(("offset", offset.to_string()));

            let page: Vec<T> = self.get_json(segments, &page_params, None)?;
            let fetched = page.len();
            records.extend(page);
            debug!(
                "{}: fetched {} records at offset {}",
                segments.join("/"),
                fetched,
                offset
            );
            if fetched < self.page_size {
                break;
            }
            offset += fetched;
        }
        Ok(records)
    }
}

impl GirderApi for GirderClient {
    fn find_collection(&self, name: &str) -> ApiResult<Option<Collection>> {
        let collections: Vec<Collection> =
            self.get_json(&["collection"], &[("name", name.to_string())], None)?;
        Ok(collections.into_iter().find(|c| c.name == name))
    }

    fn list_folders(
        &self,
        collection_id: &str,
        sort: &str,
        sort_dir: SortDirection,
    ) -> ApiResult<Vec<Submission>> {
        self.list_resource(
            &["folder"],
            &[
                ("parentType", "collection".to_string()),
                ("parentId", collection_id.to_string()),
                ("sort", sort.to_string()),
                ("sortdir", sort_dir.as_param().to_string()),
            ],
        )
    }

    fn find_folders(
        &self,
        collection_id: &str,
        reference: &SubmissionRef,
    ) -> ApiResult<Vec<Submission>> {
        let (key, value) = reference.query_param();
        self.get_json(
            &["folder"],
            &[
                ("parentType", "collection".to_string()),
                ("parentId", collection_id.to_string()),
                (key, value.to_string()),
            ],
            None,
        )
    }

    fn list_users(&self) -> ApiResult<Vec<User>> {
        self.list_resource(&["user"], &[])
    }

    fn search_users(&self, text: &str) -> ApiResult<Vec<User>> {
        self.get_json(&["user"], &[("text", text.to_string())], None)
    }

    fn get_user(&self, id: &str) -> ApiResult<User> {
        self.get_json(&["user", id], &[], Some(Item { resource: "user", id }))
    }

    fn list_jobs(&self, statuses: &[i64], types: &[String]) -> ApiResult<Vec<Job>> {
        let mut params: Params<'_> = Vec::new();
        if !statuses.is_empty() {
            params.push(("statuses", json_array(statuses)?));
        }
        if !types.is_empty() {
            params.push(("types", json_array(types)?));
        }
        self.list_resource(&["job", "all"], &params)
    }

    fn get_job(&self, id: &str) -> ApiResult<serde_json::Value> {
        self.get_json(&["job", id], &[], Some(Item { resource: "job", id }))
    }

    fn file_info(&self, id: &str) -> ApiResult<FileInfo> {
        self.get_json(&["file", id], &[], Some(Item { resource: "file", id }))
    }

    fn download_file(&self, id: &str) -> ApiResult<Vec<u8>> {
        let url = self.endpoint(&["file", id, "download"]);
        let endpoint = url.path().to_string();
        debug!("downloading {}", endpoint);

        let response = self.send(
            self.http.get(url),
            &endpoint,
            Some(Item { resource: "file", id }),
        )?;
        let bytes = response.bytes().map_err(|source| ApiError::Network {
            endpoint: endpoint.clone(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ApiError::Configuration(format!("invalid API URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::Configuration(format!(
            "invalid API URL '{raw}': expected an http(s) URL"
        )));
    }
    Ok(url)
}

fn json_array<T: serde::Serialize>(values: &[T]) -> ApiResult<String> {
    serde_json::to_string(values)
        .map_err(|e| ApiError::Configuration(format!("cannot encode filter: {e}")))
}

/// Map non-2xx responses to API errors.
///
/// By-id fetches report 400 and 404 as `NotFound`: Girder answers 400 for
/// malformed object ids. Elsewhere only 404 is `NotFound`.
fn check_status(response: Response, endpoint: &str, item: Option<Item<'_>>) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(response);
    debug!("{} failed with {}: {}", endpoint, status, message);

    Err(match (status, item) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => ApiError::Auth {
            endpoint: endpoint.to_string(),
            message,
        },
        (StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST, Some(item)) => {
            ApiError::not_found(item.resource, item.id)
        }
        (StatusCode::NOT_FOUND, None) => ApiError::not_found("endpoint", endpoint),
        _ => ApiError::Http {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        },
    })
}

/// Girder error bodies look like `{"message": "...", "type": "rest"}`.
fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .ok()
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(200).collect())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string())
}
