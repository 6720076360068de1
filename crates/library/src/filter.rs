use std::collections::HashSet;
use std::path::Path;

use common::relpath_from;
use tracing::warn;
use walkdir::WalkDir;

use crate::LibraryError;

/// Extension allow-list. An empty list accepts every name.
#[derive(Clone, Debug, Default)]
pub struct FileFilter {
    extensions: HashSet<String>,
}

impl FileFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn accepts(&self, name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match Path::new(name).extension() {
            Some(ext) => self
                .extensions
                .contains(&ext.to_string_lossy().to_ascii_lowercase()),
            None => false,
        }
    }

    pub fn apply<I>(&self, listing: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        listing.into_iter().filter(|name| self.accepts(name)).collect()
    }
}

fn normalize_extension(value: &str) -> String {
    value.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Names of the regular files directly inside `dir`, symlinks followed.
pub fn list_directory(dir: &Path) -> Result<Vec<String>, LibraryError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                warn!("Skipping unreadable entry in {:?}: {}", dir, err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = relpath_from(dir, entry.path()) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::{list_directory, FileFilter};
    use std::fs;
    use tempfile::TempDir;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn extensions_match_case_insensitively() {
        let filter = FileFilter::new([".webm", "MP4"]);
        let kept = filter.apply(names(&["a.WEBM", "b.mp4", "c.Mp4", "d.mkv", "mp4", ".mp4"]));
        assert_eq!(kept, names(&["a.WEBM", "b.mp4", "c.Mp4"]));
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let filter = FileFilter::default();
        assert!(filter.accepts("readme"));
        assert!(filter.accepts("clip.mkv"));
    }

    #[test]
    fn listing_skips_directories_and_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.mp4"), b"x").unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("deep.mp4"), b"x").unwrap();
        assert_eq!(list_directory(dir.path()).unwrap(), names(&["a.mp4", "b.mp4"]));
    }

    #[test]
    fn listing_a_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        assert!(list_directory(&dir.path().join("gone")).is_err());
    }
}
