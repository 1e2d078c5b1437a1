//! Domain layer: entities and selection logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod filter;

pub use entities::*;
pub use error::DomainError;
pub use filter::{select_user, Since, SortDirection, UserMatch};
