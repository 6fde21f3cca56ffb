use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, error, warn};

use super::{Document, RecordStore};

/// Keeps the [`Document`] as pretty-printed JSON in a single file.
pub struct JsonFileStore {
    path: PathBuf,
    backup_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_path: backup_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<Document> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Writes to a sibling temp file then renames it over `path`, so readers see
/// either the old document or the new one.
fn write_document(path: &Path, body: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, body)?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> Document {
        match self.read() {
            Ok(doc) => {
                debug!(
                    path = %self.path.display(),
                    users = doc.users.len(),
                    records = doc.attendance.len(),
                    "Loaded data file"
                );
                doc
            }
            Err(e) => {
                error!(error = %e, path = %self.path.display(), "Failed to load data file, using empty document");
                Document::default()
            }
        }
    }

    fn save(&self, doc: &Document) {
        let body = match serde_json::to_string_pretty(doc) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to serialize document");
                return;
            }
        };

        let Err(e) = write_document(&self.path, &body) else {
            return;
        };
        error!(error = %e, path = %self.path.display(), "Failed to write data file");

        match write_document(&self.backup_path, &body) {
            Ok(()) => warn!(path = %self.backup_path.display(), "Document written to backup file"),
            Err(e) => {
                error!(error = %e, path = %self.backup_path.display(), "Failed to write backup file")
            }
        }
    }
}
