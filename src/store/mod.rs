//! Persistence for users and attendance records.
//!
//! The whole dataset is one [`Document`]. Callers load it, mutate it and hand
//! it back; a store never reports failures to them. A missing or unreadable
//! document loads as empty and a failed save is logged and dropped.

use serde::{Deserialize, Serialize};

use crate::model::{attendance::AttendanceRecord, user::User};

pub mod json_file;
#[cfg(test)]
pub mod memory;

pub use json_file::JsonFileStore;
#[cfg(test)]
pub use memory::MemoryStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

impl Document {
    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn next_user_id(&self) -> u64 {
        self.users.iter().map(|u| u.id).max().map_or(1, |id| id + 1)
    }
}

pub trait RecordStore: Send + Sync {
    fn load(&self) -> Document;

    fn save(&self, doc: &Document);
}
