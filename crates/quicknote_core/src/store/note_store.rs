//! Authoritative in-memory note collection.
//!
//! # Responsibility
//! - Own the note collection and every mutation of it.
//! - Persist the full collection after each effective mutation.
//!
//! # Invariants
//! - Note ids are unique across the collection.
//! - Operations on unknown ids are silent no-ops.
//! - Collection order carries no meaning; see `query::view`.

use crate::model::note::{Note, NoteId, NotePatch};
use crate::storage::kv::KeyValueStore;
use crate::storage::persistence::NotePersistence;
use log::debug;

/// In-memory note collection backed by a persistence adapter.
pub struct NoteStore<S: KeyValueStore> {
    notes: Vec<Note>,
    persistence: NotePersistence<S>,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Builds the store from whatever the adapter can load.
    pub fn load(persistence: NotePersistence<S>, now_ms: i64) -> Self {
        let notes = persistence.load(now_ms);
        debug!(
            "event=store_load module=store status=ok count={}",
            notes.len()
        );
        Self { notes, persistence }
    }

    /// Creates an empty note at the front of the collection.
    pub fn create(&mut self, now_ms: i64) -> Note {
        let mut id = NoteId::generate();
        while self.contains(&id) {
            id = NoteId::generate();
        }

        let note = Note::with_id(id, now_ms);
        self.notes.insert(0, note.clone());
        debug!(
            "event=note_create module=store status=ok note_id={} count={}",
            note.id,
            self.notes.len()
        );
        self.persist();
        note
    }

    /// Removes a note. Returns whether anything was removed.
    pub fn delete(&mut self, id: &NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| &note.id != id);
        if self.notes.len() == before {
            debug!("event=note_delete module=store status=skipped reason=not_found");
            return false;
        }

        debug!(
            "event=note_delete module=store status=ok note_id={} count={}",
            id,
            self.notes.len()
        );
        self.persist();
        true
    }

    /// Merges `patch` into the matching note and bumps its timestamp.
    pub fn update(&mut self, id: &NoteId, patch: &NotePatch, now_ms: i64) -> Option<Note> {
        let Some(note) = self.find_mut(id) else {
            debug!("event=note_update module=store status=skipped reason=not_found");
            return None;
        };
        note.apply_patch(patch, now_ms);
        let updated = note.clone();

        debug!(
            "event=note_update module=store status=ok note_id={} title_changed={} body_changed={}",
            id,
            patch.title.is_some(),
            patch.body.is_some()
        );
        self.persist();
        Some(updated)
    }

    /// Flips the pin flag of the matching note and bumps its timestamp.
    pub fn toggle_pin(&mut self, id: &NoteId, now_ms: i64) -> Option<Note> {
        let Some(note) = self.find_mut(id) else {
            debug!("event=note_pin module=store status=skipped reason=not_found");
            return None;
        };
        note.toggle_pin(now_ms);
        let updated = note.clone();

        debug!(
            "event=note_pin module=store status=ok note_id={} pinned={}",
            id, updated.pinned
        );
        self.persist();
        Some(updated)
    }

    /// Full collection in storage order.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn persistence(&self) -> &NotePersistence<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut NotePersistence<S> {
        &mut self.persistence
    }

    fn find_mut(&mut self, id: &NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| &note.id == id)
    }

    fn persist(&mut self) {
        self.persistence.save(&self.notes);
    }
}

#[cfg(test)]
mod tests {
    use super::NoteStore;
    use crate::model::note::{NoteId, NotePatch};
    use crate::storage::kv::MemoryKvStore;
    use crate::storage::persistence::NotePersistence;

    fn empty_store() -> (NoteStore<MemoryKvStore>, MemoryKvStore) {
        let kv = MemoryKvStore::new();
        let persistence = NotePersistence::new(kv.clone(), "notes");
        (NoteStore::load(persistence, 0), kv)
    }

    #[test]
    fn create_inserts_at_front_and_persists() {
        let (mut store, kv) = empty_store();
        let first = store.create(10);
        let second = store.create(20);

        assert_eq!(store.list()[0].id, second.id);
        assert_eq!(store.list()[1].id, first.id);
        let raw = kv.raw("notes").expect("collection should be persisted");
        assert!(raw.contains(first.id.as_str()));
        assert!(raw.contains(second.id.as_str()));
    }

    #[test]
    fn unknown_ids_are_noops() {
        let (mut store, kv) = empty_store();
        let missing = NoteId::new("missing");

        assert!(!store.delete(&missing));
        assert!(store.update(&missing, &NotePatch::title("x"), 5).is_none());
        assert!(store.toggle_pin(&missing, 5).is_none());
        assert!(store.is_empty());
        assert_eq!(kv.raw("notes"), None);
    }

    #[test]
    fn update_merges_patch_and_bumps_timestamp() {
        let (mut store, _) = empty_store();
        let note = store.create(10);
        let updated = store
            .update(&note.id, &NotePatch::body("hello"), 50)
            .expect("note exists");

        assert_eq!(updated.body, "hello");
        assert_eq!(updated.title, "");
        assert_eq!(updated.updated_at, 50);
        assert_eq!(store.get(&note.id), Some(&updated));
    }

    #[test]
    fn delete_removes_note() {
        let (mut store, _) = empty_store();
        let keep = store.create(1);
        let removed = store.create(2);

        assert!(store.delete(&removed.id));
        assert_eq!(store.len(), 1);
        assert!(store.contains(&keep.id));
        assert!(!store.contains(&removed.id));
    }
}
