//! Recursive file-name search over a directory subtree.
//!
//! Matching is a case-insensitive substring test on the entry's base name;
//! file contents are never read. Within each directory, matching files come
//! first (in listing order), followed by the results of each subdirectory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::adapter::{list_directory, DirEntry, FsResult};

/// Matches plus the directories that could not be read along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub matches: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Search the subtree rooted at `root` for files whose name contains `query`.
///
/// Fails only if `root` itself cannot be listed. Unreadable subdirectories are
/// skipped, logged, and reported in [`SearchOutcome::skipped`].
pub fn search(query: &str, root: &Path) -> FsResult<SearchOutcome> {
    let entries = list_directory(root)?;
    let needle = query.to_lowercase();
    let mut outcome = SearchOutcome::default();
    search_dir(root, entries, &needle, &mut outcome);
    Ok(outcome)
}

fn search_dir(dir: &Path, entries: Vec<DirEntry>, needle: &str, outcome: &mut SearchOutcome) {
    let mut subdirs = Vec::new();
    for entry in entries {
        let path = dir.join(&entry.name);
        if entry.is_directory {
            subdirs.push(path);
        } else if entry.name.to_lowercase().contains(needle) {
            outcome.matches.push(path);
        }
    }

    for sub in subdirs {
        match list_directory(&sub) {
            Ok(entries) => search_dir(&sub, entries, needle, outcome),
            Err(err) => {
                tracing::warn!(path = %sub.display(), error = %err, "search skipped directory");
                outcome.skipped.push(sub);
            }
        }
    }
}
