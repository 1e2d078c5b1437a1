//! Path helpers for user-supplied locations

use std::path::{Path, PathBuf};

/// Expand `~` and `$VAR` in a user-supplied path.
///
/// Unknown variables leave the path unchanged.
pub fn expand_path(path: &Path) -> PathBuf {
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}
