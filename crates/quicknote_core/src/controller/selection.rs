//! Active note tracking.
//!
//! # Invariants
//! - Deleting the selected note moves selection to the head of the
//!   post-delete view, or clears it when that view is empty.
//! - Deleting any other note leaves selection unchanged.

use crate::model::note::{Note, NoteId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    selected: Option<NoteId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&NoteId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &NoteId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn select(&mut self, id: NoteId) {
        self.selected = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn on_created(&mut self, id: NoteId) {
        self.select(id);
    }

    /// Resolves selection after `deleted` was removed. `view_after` is the
    /// sorted, filtered list computed after the delete.
    ///
    /// Returns whether the selection changed.
    pub fn on_deleted(&mut self, deleted: &NoteId, view_after: &[Note]) -> bool {
        if !self.is_selected(deleted) {
            return false;
        }
        self.selected = view_after.first().map(|note| note.id.clone());
        true
    }
}
