//! Discovery of the documents to process: a recursive scan of the source
//! tree with hidden/backup, exclusion, extension and change-suffix filters.

use std::path::Path;

use walkdir::{DirEntry, IntoIter, WalkDir};

/// Walk `root` recursively, pruning hidden/backup entries and excluded
/// files or directories (excluded directories are not descended into).
pub fn walk(root: &Path, exclude: &[String]) -> impl Iterator<Item = walkdir::Result<DirEntry>> {
    let exclude = exclude.to_vec();
    let walker: IntoIter = WalkDir::new(root).into_iter();
    walker.filter_entry(move |e| {
        // the root itself is always visited, whatever its name
        e.depth() == 0 || (!is_hidden(e) && !is_excluded(e, &exclude))
    })
}

/// Whether a directory entry is hidden or a backup, by naming convention.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(hidden_name)
}

/// Hidden/backup naming convention: a leading `.` or `~`.
pub fn hidden_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('~')
}

fn is_excluded(entry: &DirEntry, exclude: &[String]) -> bool {
    exclude.iter().any(|fragment| {
        entry.file_name().to_str() == Some(fragment.as_str())
            || entry.path().ends_with(fragment)
    })
}

/// Whether a file name selects for processing: one of the configured
/// extensions, and not an output of a previous run (change-suffix followed
/// by a dot).
pub fn selects(name: &str, extensions: &[String], change_suffix: Option<&str>) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
        && !change_suffix.is_some_and(|sfx| name.contains(&format!("{sfx}.")))
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
