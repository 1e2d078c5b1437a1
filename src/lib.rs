//! sivacor: command line client for the SIVACOR Girder service
//!
//! Layers, innermost first: `domain` (records and filters), `application`
//! (services over the `GirderApi` boundary), `infrastructure` (HTTP client,
//! filesystem, service container) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
