//! Note collection persistence adapter.
//!
//! # Responsibility
//! - Read the note collection from one key of a `KeyValueStore`.
//! - Write the full collection back after every mutation.
//! - Repair records written by older or foreign builds on load.
//!
//! # Invariants
//! - `load` never fails: missing, malformed or non-array data yields an
//!   empty collection.
//! - Loaded ids are unique; blank or duplicate ids are replaced.
//! - `save` never fails: write errors are logged and handed to the
//!   optional save-error hook, in-memory state stays authoritative.

use crate::model::note::{Note, NoteId};
use crate::storage::kv::{KeyValueStore, KvError};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Callback invoked when a save could not be written.
pub type SaveErrorHook = Box<dyn FnMut(&KvError) + Send>;

/// Adapter binding the note collection to one storage key.
pub struct NotePersistence<S: KeyValueStore> {
    store: S,
    key: String,
    on_save_error: Option<SaveErrorHook>,
}

impl<S: KeyValueStore> NotePersistence<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            on_save_error: None,
        }
    }

    /// Registers a hook that observes write failures.
    pub fn set_save_error_hook(&mut self, hook: impl FnMut(&KvError) + Send + 'static) {
        self.on_save_error = Some(Box::new(hook));
    }

    pub fn clear_save_error_hook(&mut self) {
        self.on_save_error = None;
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads and back-fills the stored collection. `now_ms` stamps records
    /// whose `updatedAt` is unusable.
    pub fn load(&self, now_ms: i64) -> Vec<Note> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("event=notes_load module=persistence status=empty reason=missing");
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=notes_load module=persistence status=error reason=read_failed error={}",
                    err
                );
                return Vec::new();
            }
        };

        match decode_notes(&raw, now_ms) {
            Ok(notes) => {
                debug!(
                    "event=notes_load module=persistence status=ok count={}",
                    notes.len()
                );
                notes
            }
            Err(reason) => {
                warn!("event=notes_load module=persistence status=error reason={reason}");
                Vec::new()
            }
        }
    }

    /// Serializes and writes the full collection, best effort.
    pub fn save(&mut self, notes: &[Note]) {
        let payload = match serde_json::to_string(notes) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(
                    "event=notes_save module=persistence status=error reason=encode_failed error={}",
                    err
                );
                return;
            }
        };

        match self.store.set(&self.key, &payload) {
            Ok(()) => debug!(
                "event=notes_save module=persistence status=ok count={} bytes={}",
                notes.len(),
                payload.len()
            ),
            Err(err) => {
                warn!(
                    "event=notes_save module=persistence status=error reason=write_failed error={}",
                    err
                );
                if let Some(hook) = self.on_save_error.as_mut() {
                    hook(&err);
                }
            }
        }
    }
}

/// Decodes a stored payload into notes, repairing each record.
///
/// Returns the failure reason when the payload is not a JSON array.
pub fn decode_notes(raw: &str, now_ms: i64) -> Result<Vec<Note>, &'static str> {
    let value: Value = serde_json::from_str(raw).map_err(|_| "malformed_json")?;
    let Value::Array(records) = value else {
        return Err("not_an_array");
    };

    let mut seen = HashSet::with_capacity(records.len());
    let notes = records
        .iter()
        .filter_map(Value::as_object)
        .map(|record| backfill_record(record, now_ms, &mut seen))
        .collect();
    Ok(notes)
}

fn backfill_record(record: &Map<String, Value>, now_ms: i64, seen: &mut HashSet<NoteId>) -> Note {
    let stored_id = record
        .get("id")
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(NoteId::from)
        .filter(|id| !seen.contains(id));
    let id = stored_id.unwrap_or_else(|| fresh_id(seen));
    seen.insert(id.clone());

    Note {
        id,
        title: text_field(record, "title"),
        body: text_field(record, "body"),
        updated_at: record
            .get("updatedAt")
            .and_then(epoch_ms)
            .unwrap_or(now_ms),
        pinned: record
            .get("pinned")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn text_field(record: &Map<String, Value>, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn epoch_ms(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|ms| ms.trunc() as i64))
}

fn fresh_id(seen: &HashSet<NoteId>) -> NoteId {
    loop {
        let id = NoteId::generate();
        if !seen.contains(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::decode_notes;

    #[test]
    fn decode_rejects_non_array_payloads() {
        assert_eq!(decode_notes("not json", 0).unwrap_err(), "malformed_json");
        assert_eq!(decode_notes("{\"a\":1}", 0).unwrap_err(), "not_an_array");
        assert_eq!(decode_notes("null", 0).unwrap_err(), "not_an_array");
    }

    #[test]
    fn decode_backfills_missing_fields() {
        let notes = decode_notes(r#"[{"title": 7, "updatedAt": "yesterday"}]"#, 42).unwrap();
        assert_eq!(notes.len(), 1);
        let note = &notes[0];
        assert!(!note.id.as_str().is_empty());
        assert_eq!(note.title, "");
        assert_eq!(note.body, "");
        assert_eq!(note.updated_at, 42);
        assert!(!note.pinned);
    }

    #[test]
    fn decode_skips_non_object_records() {
        let notes = decode_notes(r#"[1, "x", null, {"id": "a"}]"#, 0).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id.as_str(), "a");
    }

    #[test]
    fn decode_replaces_duplicate_and_blank_ids() {
        let notes = decode_notes(
            r#"[{"id": "a", "title": "first"}, {"id": "a", "title": "second"}, {"id": "  "}]"#,
            0,
        )
        .unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].id.as_str(), "a");
        assert_ne!(notes[1].id.as_str(), "a");
        assert_eq!(notes[1].title, "second");
        assert_ne!(notes[2].id.as_str().trim(), "");
        assert_ne!(notes[1].id, notes[2].id);
    }

    #[test]
    fn decode_truncates_fractional_timestamps() {
        let notes = decode_notes(r#"[{"id": "a", "updatedAt": 1700000000123.9}]"#, 0).unwrap();
        assert_eq!(notes[0].updated_at, 1_700_000_000_123);
    }
}
