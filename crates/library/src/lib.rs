pub mod filter;
pub mod guard;
pub mod rating;
pub mod store;
pub mod tags;

use std::path::{Path, PathBuf};

use common::{MediaIndex, MediaRecord};
use parking_lot::Mutex;
use tracing::{debug, info, info_span, Span};

pub use filter::{list_directory, FileFilter};
pub use guard::{GuardedPath, PathGuard};
pub use store::IndexStore;

pub const DEFAULT_INDEX_FILE: &str = ".index.json";

/// The metadata index of one data directory.
///
/// All mutations hold the index lock from lookup until the rewritten
/// document is on disk, so overlapping requests apply in some sequential
/// order. A failed write leaves the in-memory change in place.
pub struct MediaLibrary {
    root: PathBuf,
    store: IndexStore,
    filter: FileFilter,
    guard: PathGuard,
    index: Mutex<MediaIndex>,
    span: Span,
}

impl MediaLibrary {
    pub fn open(data_dir: &Path, filter: FileFilter, index_file: &str) -> Result<Self, LibraryError> {
        let guard = PathGuard::new(data_dir)?;
        let root = guard.root().to_path_buf();
        let span = info_span!("media_library", root = %root.display());
        let store = IndexStore::new(root.join(index_file));
        let index = span.in_scope(|| store.load());
        Ok(Self {
            root,
            store,
            filter,
            guard,
            index: Mutex::new(index),
            span,
        })
    }

    /// Canonical data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    pub fn list(&self) -> MediaIndex {
        self.index.lock().clone()
    }

    pub fn get(&self, filename: &str) -> MediaRecord {
        self.index.lock().get(filename).cloned().unwrap_or_default()
    }

    /// Looks up a record by a client-supplied name. Names that do not stay
    /// inside the data directory yield an empty record.
    pub fn info(&self, requested: &str) -> MediaRecord {
        let _enter = self.span.enter();
        match self.guard.resolve(requested) {
            Ok(path) => self.get(&path.relpath),
            Err(_) => MediaRecord::default(),
        }
    }

    /// Adds an empty record for every accepted name not yet indexed. The
    /// index file is only rewritten when something was added; keys are
    /// never removed.
    pub fn reconcile<I>(&self, listing: I) -> Result<MediaIndex, LibraryError>
    where
        I: IntoIterator<Item = String>,
    {
        let _enter = self.span.enter();
        let index_name = self.store.file_name();
        let mut index = self.index.lock();
        let mut added = 0usize;
        for name in self.filter.apply(listing) {
            if index_name.as_deref() == Some(name.as_str()) {
                continue;
            }
            if !index.contains_key(&name) {
                debug!("Indexing new file {}", name);
                index.insert(name, MediaRecord::default());
                added += 1;
            }
        }
        if added > 0 {
            info!("Added {} files to the index ({} total)", added, index.len());
            self.store.persist(&index)?;
        }
        Ok(index.clone())
    }

    /// Re-scans the data directory and reconciles against it.
    pub fn refresh(&self) -> Result<MediaIndex, LibraryError> {
        let listing = {
            let _enter = self.span.enter();
            list_directory(&self.root)?
        };
        self.reconcile(listing)
    }

    pub fn rate(&self, filename: &str, sample: Option<f64>) -> Result<MediaRecord, LibraryError> {
        let sample = sample.ok_or(LibraryError::Validation(rating::NO_RATING))?;
        self.mutate(filename, |filename, record| {
            rating::apply_rating(record, sample);
            debug!(
                "Rated {} with {}: mean {:?} over {}",
                filename, sample, record.rating, record.num_ratings
            );
        })
    }

    pub fn tag(&self, filename: &str, tags: Option<Vec<String>>) -> Result<MediaRecord, LibraryError> {
        let tags = tags.ok_or(LibraryError::Validation(tags::NO_TAGS))?;
        self.mutate(filename, |filename, record| {
            debug!("Tagging {} with {:?}", filename, tags);
            tags::replace_tags(record, tags);
        })
    }

    /// Applies `apply` to the record named by `requested`, after the name is
    /// normalized the same way `info` normalizes it, then persists the index.
    fn mutate<F>(&self, requested: &str, apply: F) -> Result<MediaRecord, LibraryError>
    where
        F: FnOnce(&str, &mut MediaRecord),
    {
        let _enter = self.span.enter();
        let filename = self.guard.resolve(requested)?.relpath;
        let mut index = self.index.lock();
        let record = index
            .get_mut(&filename)
            .ok_or_else(|| LibraryError::NotFound(filename.clone()))?;
        apply(&filename, &mut *record);
        let updated = record.clone();
        self.store.persist(&index)?;
        Ok(updated)
    }
}

#[derive(Debug)]
pub enum LibraryError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Walk(walkdir::Error),
    Validation(&'static str),
    NotFound(String),
    Security(String),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Io(err) => write!(f, "io error: {}", err),
            LibraryError::Json(err) => write!(f, "json error: {}", err),
            LibraryError::Walk(err) => write!(f, "directory scan error: {}", err),
            LibraryError::Validation(message) => write!(f, "{}", message),
            LibraryError::NotFound(_) => write!(f, "file not found"),
            LibraryError::Security(reason) => write!(f, "path rejected: {}", reason),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::Io(err)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::Json(err)
    }
}

impl From<walkdir::Error> for LibraryError {
    fn from(err: walkdir::Error) -> Self {
        LibraryError::Walk(err)
    }
}
