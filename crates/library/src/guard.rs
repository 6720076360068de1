use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::LibraryError;

/// Keeps client-supplied names inside one directory.
#[derive(Clone, Debug)]
pub struct PathGuard {
    root: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardedPath {
    /// Normalized name relative to the root, `/`-separated.
    pub relpath: String,
    pub absolute: PathBuf,
}

impl PathGuard {
    pub fn new(root: &Path) -> Result<Self, LibraryError> {
        Ok(Self {
            root: root.canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, requested: &str) -> Result<GuardedPath, LibraryError> {
        let result = self.resolve_inner(requested);
        if let Err(err) = &result {
            warn!("Rejected path {:?}: {}", requested, err);
        }
        result
    }

    fn resolve_inner(&self, requested: &str) -> Result<GuardedPath, LibraryError> {
        if requested.contains('\0') {
            return Err(LibraryError::Security("null byte".to_string()));
        }

        let mut parts: Vec<&str> = Vec::new();
        for component in Path::new(requested).components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(part) => parts.push(part),
                    None => return Err(LibraryError::Security("invalid name".to_string())),
                },
                Component::CurDir | Component::RootDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(LibraryError::Security(
                            "escapes data directory".to_string(),
                        ));
                    }
                }
                Component::Prefix(_) => {
                    return Err(LibraryError::Security("absolute path".to_string()));
                }
            }
        }

        let mut absolute = self.root.clone();
        absolute.extend(&parts);
        if absolute.symlink_metadata().is_ok() {
            absolute = absolute.canonicalize()?;
            if !absolute.starts_with(&self.root) {
                return Err(LibraryError::Security(
                    "link target outside data directory".to_string(),
                ));
            }
        }

        Ok(GuardedPath {
            relpath: parts.join("/"),
            absolute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PathGuard;
    use crate::LibraryError;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathGuard) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data").join("clip.mp4"), b"x").unwrap();
        fs::create_dir(dir.path().join("data-other")).unwrap();
        fs::write(dir.path().join("data-other").join("secret.mp4"), b"x").unwrap();
        let guard = PathGuard::new(&dir.path().join("data")).unwrap();
        (dir, guard)
    }

    #[test]
    fn resolves_names_inside_the_root() {
        let (_dir, guard) = setup();
        let path = guard.resolve("clip.mp4").unwrap();
        assert_eq!(path.relpath, "clip.mp4");
        assert_eq!(path.absolute, guard.root().join("clip.mp4"));

        let path = guard.resolve("sub/../clip.mp4").unwrap();
        assert_eq!(path.relpath, "clip.mp4");
        let path = guard.resolve("/clip.mp4").unwrap();
        assert_eq!(path.relpath, "clip.mp4");
    }

    #[test]
    fn missing_files_resolve_lexically() {
        let (_dir, guard) = setup();
        let path = guard.resolve("later/new.mp4").unwrap();
        assert_eq!(path.relpath, "later/new.mp4");
        assert!(path.absolute.starts_with(guard.root()));
    }

    #[test]
    fn rejects_parent_traversal() {
        let (_dir, guard) = setup();
        assert!(matches!(guard.resolve("../secret"), Err(LibraryError::Security(_))));
        assert!(guard.resolve("a/../../secret").is_err());
    }

    #[test]
    fn rejects_sibling_directory_with_shared_prefix() {
        let (_dir, guard) = setup();
        assert!(guard.resolve("../data-other/secret.mp4").is_err());
    }

    #[test]
    fn rejects_null_bytes() {
        let (_dir, guard) = setup();
        assert!(guard.resolve("clip.mp4\0.txt").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlinks_leaving_the_root() {
        let (dir, guard) = setup();
        std::os::unix::fs::symlink(
            dir.path().join("data-other").join("secret.mp4"),
            dir.path().join("data").join("link.mp4"),
        )
        .unwrap();
        assert!(guard.resolve("link.mp4").is_err());
    }
}
