//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{JobService, SubmissionService, UserService};
use crate::config::Settings;
use crate::infrastructure::girder::GirderClient;
use crate::infrastructure::traits::{FileSystem, GirderApi, RealFileSystem};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Girder API abstraction
    pub api: Arc<dyn GirderApi>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    ///
    /// Fails before any network I/O when the API key is missing.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let client = GirderClient::from_settings(&settings)?;
        Ok(Self::with_deps(
            settings,
            Arc::new(client),
            Arc::new(RealFileSystem),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        api: Arc<dyn GirderApi>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self { settings, api, fs }
    }

    pub fn submissions(&self) -> SubmissionService {
        SubmissionService::new(self.api.clone(), self.fs.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.api.clone())
    }

    pub fn jobs(&self) -> JobService {
        JobService::new(self.api.clone())
    }
}
