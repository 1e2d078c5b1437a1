//! User service
//!
//! Lists users and resolves free-text `--user` queries to one account.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{select_user, User, UserMatch};
use crate::infrastructure::traits::GirderApi;

/// Service for user lookups.
pub struct UserService {
    api: Arc<dyn GirderApi>,
}

impl UserService {
    /// Create a new user service.
    pub fn new(api: Arc<dyn GirderApi>) -> Self {
        Self { api }
    }

    /// Every user known to the server.
    #[instrument(skip(self))]
    pub fn list_users(&self) -> ApplicationResult<Vec<User>> {
        let users = self.api.list_users()?;
        debug!("list_users: {} users", users.len());
        Ok(users)
    }

    /// Resolve a login or name to exactly one user.
    ///
    /// Uses the server's text search. When several users match, only an
    /// exact login match is accepted.
    #[instrument(skip(self))]
    pub fn resolve(&self, query: &str) -> ApplicationResult<User> {
        let candidates = self.api.search_users(query)?;
        debug!("resolve: {} candidates for '{}'", candidates.len(), query);

        match select_user(query, candidates) {
            UserMatch::Found(user) => Ok(user),
            UserMatch::NoMatch => Err(ApplicationError::NotFound {
                kind: "user",
                id: query.to_string(),
            }),
            UserMatch::Ambiguous(users) => Err(ApplicationError::AmbiguousUser {
                query: query.to_string(),
                candidates: users.iter().map(User::contact_line).collect(),
            }),
        }
    }

    /// Map of user id to "First Last (login)".
    pub fn directory(&self) -> ApplicationResult<HashMap<String, String>> {
        Ok(self
            .list_users()?
            .into_iter()
            .map(|u| {
                let display = u.display_with_login();
                (u.id, display)
            })
            .collect())
    }
}
