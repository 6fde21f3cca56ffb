use std::sync::Mutex;

use super::{Document, RecordStore};

/// Document held in memory, standing in for the file store in tests.
#[derive(Default)]
pub struct MemoryStore {
    doc: Mutex<Document>,
}

impl MemoryStore {
    pub fn new(doc: Document) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Document {
        self.doc
            .lock()
            .map(|doc| doc.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn save(&self, doc: &Document) {
        let mut guard = self.doc.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = doc.clone();
    }
}
