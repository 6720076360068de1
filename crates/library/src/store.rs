use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use common::MediaIndex;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;
use tracing::{error, info, warn};

use crate::LibraryError;

/// The JSON document backing a [`crate::MediaLibrary`].
///
/// Writes overwrite the file in place. A crash in the middle of a write can
/// leave a truncated document behind; the next load then starts from an
/// empty index.
#[derive(Clone, Debug)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    }

    /// Never fails: unreadable or corrupt documents yield an empty index.
    pub fn load(&self) -> MediaIndex {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                match fs::write(&self.path, "{}") {
                    Ok(()) => info!("Created empty index at {:?}", self.path),
                    Err(err) => warn!("Failed to create index {:?}: {}", self.path, err),
                }
                return MediaIndex::new();
            }
            Err(err) => {
                error!("Error reading index {:?}: {}", self.path, err);
                return MediaIndex::new();
            }
        };
        match serde_json::from_str::<MediaIndex>(&contents) {
            Ok(index) => {
                info!("Loaded index with {} files from {:?}", index.len(), self.path);
                index
            }
            Err(err) => {
                error!("Error parsing index {:?}: {}", self.path, err);
                MediaIndex::new()
            }
        }
    }

    pub fn persist(&self, index: &MediaIndex) -> Result<(), LibraryError> {
        let data = encode_index(index)?;
        fs::write(&self.path, data).map_err(|err| {
            error!("Failed to write index {:?}: {}", self.path, err);
            LibraryError::Io(err)
        })
    }
}

fn encode_index(index: &MediaIndex) -> Result<Vec<u8>, LibraryError> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    serde::Serialize::serialize(index, &mut serializer)?;
    Ok(out)
}
