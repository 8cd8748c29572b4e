//! Application controller for the notes UI.
//!
//! # Responsibility
//! - Own the note store, selection, autosave draft and search query.
//! - Turn UI intents into store mutations and controller transitions.
//! - Expose the observables a renderer needs, including a serializable
//!   snapshot.
//!
//! # Invariants
//! - The open editor note always equals the selected note.
//! - Intents never fail; unknown ids are ignored.
//! - Switching notes applies `SwitchPolicy` to a pending edit before the
//!   editor moves (default: discard).

use crate::clock::Clock;
use crate::config::{CoreConfig, SwitchPolicy};
use crate::controller::autosave::{AutosaveController, Draft, PendingCommit};
use crate::controller::selection::SelectionController;
use crate::model::note::{Note, NoteId, NotePatch};
use crate::query::view::view;
use crate::storage::kv::{KeyValueStore, KvError};
use crate::storage::persistence::NotePersistence;
use crate::store::note_store::NoteStore;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// User intent forwarded by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    CreateNote,
    DeleteNote { id: NoteId },
    TogglePin { id: NoteId },
    EditNote { id: NoteId, patch: NotePatch },
    SelectNote { id: NoteId },
    SetSearchQuery { text: String },
    /// Lets the autosave deadline fire when due.
    Tick,
    /// Commits any pending edit immediately.
    Flush,
}

/// Render-ready view of application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    /// Visible notes in display order.
    pub notes: Vec<Note>,
    pub selected_id: Option<NoteId>,
    pub query: String,
    pub draft: Option<Draft>,
    pub has_pending_edit: bool,
}

pub struct NotesApp<S: KeyValueStore, C: Clock> {
    config: CoreConfig,
    clock: C,
    store: NoteStore<S>,
    selection: SelectionController,
    autosave: AutosaveController,
    query: String,
}

impl<S: KeyValueStore, C: Clock> NotesApp<S, C> {
    /// Loads the collection from `kv` and starts with nothing selected.
    pub fn open(kv: S, clock: C, config: CoreConfig) -> Self {
        let persistence = NotePersistence::new(kv, config.storage_key.clone());
        let store = NoteStore::load(persistence, clock.now_ms());
        info!(
            "event=app_open module=app status=ok count={} debounce_ms={} switch_policy={:?}",
            store.len(),
            config.autosave_debounce_ms,
            config.switch_policy
        );

        Self {
            autosave: AutosaveController::new(config.autosave_debounce()),
            selection: SelectionController::new(),
            query: String::new(),
            config,
            clock,
            store,
        }
    }

    /// Applies one intent.
    pub fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::CreateNote => {
                self.create_note();
            }
            Intent::DeleteNote { id } => self.delete_note(&id),
            Intent::TogglePin { id } => {
                self.toggle_pin(&id);
            }
            Intent::EditNote { id, patch } => {
                self.edit_note(&id, patch);
            }
            Intent::SelectNote { id } => {
                self.select_note(&id);
            }
            Intent::SetSearchQuery { text } => self.set_search_query(text),
            Intent::Tick => {
                self.tick();
            }
            Intent::Flush => {
                self.flush_pending();
            }
        }
    }

    /// Creates an empty note, selects it and opens it for editing.
    pub fn create_note(&mut self) -> Note {
        self.apply_switch_policy();
        let note = self.store.create(self.clock.now_ms());
        self.selection.on_created(note.id.clone());
        self.autosave.open(&note);
        note
    }

    /// Deletes a note and resolves the replacement selection.
    pub fn delete_note(&mut self, id: &NoteId) {
        if !self.store.delete(id) {
            return;
        }
        if self.autosave.is_editing(id) {
            self.autosave.close();
        }

        let view_after = self.visible_notes();
        if self.selection.on_deleted(id, &view_after) {
            debug!(
                "event=selection_change module=app status=ok reason=delete has_selection={}",
                self.selection.selected().is_some()
            );
            self.sync_editor();
        }
    }

    pub fn toggle_pin(&mut self, id: &NoteId) -> Option<Note> {
        self.store.toggle_pin(id, self.clock.now_ms())
    }

    /// Buffers an edit of the open note. Edits to any other id are ignored.
    pub fn edit_note(&mut self, id: &NoteId, patch: NotePatch) -> bool {
        if !self.autosave.is_editing(id) {
            debug!("event=note_edit module=app status=skipped reason=not_open");
            return false;
        }
        self.autosave.edit(&patch, self.clock.now_ms())
    }

    /// Selects and opens a note. Unknown ids are ignored.
    pub fn select_note(&mut self, id: &NoteId) -> bool {
        if !self.store.contains(id) {
            debug!("event=selection_change module=app status=skipped reason=not_found");
            return false;
        }
        if self.selection.is_selected(id) && self.autosave.is_editing(id) {
            return true;
        }

        self.apply_switch_policy();
        self.selection.select(id.clone());
        self.sync_editor();
        true
    }

    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    /// Commits the draft if its quiescence window has elapsed.
    pub fn tick(&mut self) -> Option<Note> {
        let commit = self.autosave.poll(self.clock.now_ms())?;
        self.commit(commit)
    }

    /// Commits the pending draft regardless of its deadline.
    pub fn flush_pending(&mut self) -> Option<Note> {
        let commit = self.autosave.flush()?;
        self.commit(commit)
    }

    /// Observes storage write failures without changing save semantics.
    pub fn set_save_error_hook(&mut self, hook: impl FnMut(&KvError) + Send + 'static) {
        self.store.persistence_mut().set_save_error_hook(hook);
    }

    pub fn visible_notes(&self) -> Vec<Note> {
        view(self.store.list(), &self.query)
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selection
            .selected()
            .and_then(|id| self.store.get(id))
    }

    pub fn selected_id(&self) -> Option<&NoteId> {
        self.selection.selected()
    }

    pub fn search_query(&self) -> &str {
        self.query.as_str()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.autosave.draft()
    }

    pub fn has_pending_edit(&self) -> bool {
        self.autosave.has_pending()
    }

    /// Full collection in storage order.
    pub fn notes(&self) -> &[Note] {
        self.store.list()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        self.store.persistence().store()
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            notes: self.visible_notes(),
            selected_id: self.selection.selected().cloned(),
            query: self.query.clone(),
            draft: self.autosave.draft().cloned(),
            has_pending_edit: self.autosave.has_pending(),
        }
    }

    fn commit(&mut self, commit: PendingCommit) -> Option<Note> {
        debug!(
            "event=autosave_commit module=app status=ok note_id={}",
            commit.note_id
        );
        self.store
            .update(&commit.note_id, &commit.patch, self.clock.now_ms())
    }

    fn apply_switch_policy(&mut self) {
        if self.config.switch_policy == SwitchPolicy::Flush {
            self.flush_pending();
        }
    }

    fn sync_editor(&mut self) {
        let selected = self
            .selection
            .selected()
            .and_then(|id| self.store.get(id));
        match selected {
            Some(note) => self.autosave.open(note),
            None => self.autosave.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Intent, NotesApp};
    use crate::clock::ManualClock;
    use crate::config::CoreConfig;
    use crate::model::note::{NoteId, NotePatch};
    use crate::storage::kv::MemoryKvStore;

    #[test]
    fn dispatch_routes_intents() {
        let clock = ManualClock::new(1_000);
        let mut app = NotesApp::open(MemoryKvStore::new(), &clock, CoreConfig::default());

        app.dispatch(Intent::CreateNote);
        let id = app.selected_id().cloned().expect("new note is selected");
        app.dispatch(Intent::EditNote {
            id: id.clone(),
            patch: NotePatch::title("draft"),
        });
        app.dispatch(Intent::Flush);
        app.dispatch(Intent::TogglePin { id: id.clone() });
        app.dispatch(Intent::SetSearchQuery {
            text: "DRAFT".to_string(),
        });

        let snapshot = app.snapshot();
        assert_eq!(snapshot.notes.len(), 1);
        assert_eq!(snapshot.notes[0].title, "draft");
        assert!(snapshot.notes[0].pinned);
        assert_eq!(snapshot.query, "DRAFT");

        app.dispatch(Intent::DeleteNote { id });
        assert!(app.snapshot().notes.is_empty());
        assert_eq!(app.selected_id(), None);
        assert!(app.draft().is_none());
    }

    #[test]
    fn intents_deserialize_from_tagged_json() {
        let intent: Intent =
            serde_json::from_str(r#"{"type": "select_note", "id": "abc"}"#).unwrap();
        assert_eq!(
            intent,
            Intent::SelectNote {
                id: NoteId::new("abc")
            }
        );
    }
}
