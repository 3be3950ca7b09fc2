//! In-memory store of imported users.
//!
//! Lives for the lifetime of the process. Each upsert is visible as soon as
//! it is applied; there is no multi-record atomicity.

use dashmap::DashMap;
use import_core::UserRecord;
use tracing::info;

/// Concurrent id → [`UserRecord`] table.
#[derive(Debug, Default)]
pub struct RecordStore {
    users: DashMap<String, UserRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record with the same id.
    pub fn upsert(&self, user: UserRecord) {
        self.users.insert(user.id().to_string(), user);
    }

    /// Upserts every record in order, so a later duplicate id wins.
    ///
    /// Returns how many records were applied.
    pub fn upsert_all(&self, users: impl IntoIterator<Item = UserRecord>) -> usize {
        let mut applied = 0;
        for user in users {
            self.upsert(user);
            applied += 1;
        }
        applied
    }

    /// All records, ordered by id.
    pub fn find_all(&self) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.id().cmp(b.id()));
        users
    }

    pub fn find_by_id(&self, id: &str) -> Option<UserRecord> {
        self.users.get(id).map(|e| e.value().clone())
    }

    /// Number of distinct ids.
    pub fn count(&self) -> usize {
        self.users.len()
    }

    /// Administrative wipe. Returns the number of records removed.
    pub fn clear(&self) -> usize {
        let removed = self.users.len();
        self.users.clear();
        info!(removed = removed, "Record store cleared");
        removed
    }
}
