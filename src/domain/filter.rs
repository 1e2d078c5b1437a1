//! Listing filters and user selection

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::domain::{DomainError, User};

/// Accepted `--since` layouts, interpreted in the local timezone.
const SINCE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Lower bound on creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Since(DateTime<Utc>);

impl Since {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// Records without a parseable timestamp are kept.
    pub fn admits(&self, created: Option<DateTime<Utc>>) -> bool {
        created.map_or(true, |c| c >= self.0)
    }
}

impl FromStr for Since {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let naive = SINCE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(input, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(|| DomainError::InvalidSince {
                input: input.to_string(),
                message: "expected YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS]".into(),
            })?;

        let local = Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| DomainError::InvalidSince {
                input: input.to_string(),
                message: "time does not exist in the local timezone".into(),
            })?;
        Ok(Self(local.with_timezone(&Utc)))
    }
}

/// Server-side sort direction (`sortdir`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn as_param(self) -> &'static str {
        match self {
            SortDirection::Ascending => "1",
            SortDirection::Descending => "-1",
        }
    }
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "asc" => Ok(SortDirection::Ascending),
            "-1" | "desc" => Ok(SortDirection::Descending),
            other => Err(DomainError::InvalidSortDirection(other.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Outcome of matching a free-text query against user search results.
#[derive(Debug, Clone, PartialEq)]
pub enum UserMatch {
    Found(User),
    NoMatch,
    Ambiguous(Vec<User>),
}

/// Pick the user a `--user` query refers to.
///
/// A single hit wins outright. Among several hits only an exact login match
/// is accepted.
pub fn select_user(query: &str, mut candidates: Vec<User>) -> UserMatch {
    match candidates.len() {
        0 => UserMatch::NoMatch,
        1 => UserMatch::Found(candidates.remove(0)),
        _ => match candidates.iter().position(|u| u.login == query) {
            Some(idx) => UserMatch::Found(candidates.swap_remove(idx)),
            None => UserMatch::Ambiguous(candidates),
        },
    }
}
