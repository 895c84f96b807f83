use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::{
    log_error, log_info, log_warn,
    models::{AnalysisRecord, AnalysisResult, Submission},
    store::PersistentStore,
};

const ENABLE_LOGS: bool = true;

/// Slot holding the JSON array of records, newest first.
pub const HISTORY_SLOT: &str = "exam_history";

/// 9999-12-31T23:59:59.999Z. Ids above this cannot be real millisecond
/// stamps and do not take part in id allocation.
const MAX_PLAUSIBLE_ID_MS: i64 = 253_402_300_799_999;

fn id_stamp(id: &str) -> Option<i64> {
    id.parse::<i64>()
        .ok()
        .filter(|ms| (0..=MAX_PLAUSIBLE_ID_MS).contains(ms))
}

struct HistoryData {
    records: Vec<AnalysisRecord>,
    /// Largest millisecond id issued or loaded so far.
    last_issued_ms: i64,
}

/// Ordered, write-through history of completed analyses.
///
/// Every mutation rewrites the whole slot before returning. A failed write is
/// logged and the in-memory change is kept, so the UI never disagrees with
/// what the user just did.
pub struct HistoryManager {
    store: Box<dyn PersistentStore>,
    slot: String,
    data: RwLock<HistoryData>,
}

impl HistoryManager {
    /// Reads the persisted slot once. Missing, unreadable or corrupt data
    /// yields an empty history; it never fails.
    pub fn load(store: Box<dyn PersistentStore>) -> Self {
        Self::load_slot(store, HISTORY_SLOT)
    }

    pub fn load_slot(store: Box<dyn PersistentStore>, slot: &str) -> Self {
        let records = match store.read(slot) {
            Ok(Some(contents)) => match serde_json::from_str::<Vec<AnalysisRecord>>(&contents) {
                Ok(records) => {
                    log_info!("Loaded {} history records from '{}'", records.len(), slot);
                    records
                }
                Err(err) => {
                    log_warn!("History in '{}' is corrupt, starting empty: {}", slot, err);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                log_error!("Failed to read history slot '{}', starting empty: {}", slot, err);
                Vec::new()
            }
        };

        let last_issued_ms = records
            .iter()
            .filter_map(|record| id_stamp(&record.id))
            .max()
            .unwrap_or(0);

        Self {
            store,
            slot: slot.to_string(),
            data: RwLock::new(HistoryData {
                records,
                last_issued_ms,
            }),
        }
    }

    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.read_guard().records.clone()
    }

    pub fn get(&self, id: &str) -> Option<AnalysisRecord> {
        self.read_guard()
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.read_guard().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().records.is_empty()
    }

    /// Inserts at the front. Duplicates are not filtered.
    pub fn append(&self, record: AnalysisRecord) {
        let mut guard = self.write_guard();
        if let Some(id_ms) = id_stamp(&record.id) {
            guard.last_issued_ms = guard.last_issued_ms.max(id_ms);
        }
        guard.records.insert(0, record);
        self.persist(&guard.records);
    }

    /// Removes the first record with `id`. Returns `false` (and writes
    /// nothing) when no record matches.
    pub fn remove(&self, id: &str) -> bool {
        let mut guard = self.write_guard();
        match guard.records.iter().position(|record| record.id == id) {
            Some(index) => {
                guard.records.remove(index);
                self.persist(&guard.records);
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let mut guard = self.write_guard();
        guard.records.clear();
        self.persist(&guard.records);
    }

    /// Allocates a millisecond-stamp id strictly greater than any issued or
    /// loaded before, so two records created in the same millisecond differ.
    pub fn next_record_id(&self) -> String {
        let mut guard = self.write_guard();
        let now_ms = Utc::now().timestamp_millis();
        let id_ms = now_ms.max(guard.last_issued_ms.saturating_add(1));
        guard.last_issued_ms = id_ms;
        id_ms.to_string()
    }

    /// Builds a record for a finished analysis and prepends it.
    pub fn record(&self, submission: Submission, result: AnalysisResult) -> AnalysisRecord {
        let record = AnalysisRecord::new(self.next_record_id(), Utc::now(), submission, result);
        self.append(record.clone());
        record
    }

    // Blocking write, made while the caller still holds the write lock.
    fn persist(&self, records: &[AnalysisRecord]) -> bool {
        let serialized = match serde_json::to_string(records) {
            Ok(serialized) => serialized,
            Err(err) => {
                log_error!("Failed to serialize history: {}", err);
                return false;
            }
        };

        match self.store.write(&self.slot, &serialized) {
            Ok(()) => true,
            Err(err) => {
                log_error!("Failed to persist history to '{}': {}", self.slot, err);
                false
            }
        }
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, HistoryData> {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, HistoryData> {
        self.data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
