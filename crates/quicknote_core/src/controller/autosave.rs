//! Debounced autosave of the note being edited.
//!
//! # Responsibility
//! - Buffer keystroke-level edits to one note as a transient draft.
//! - Decide when the draft is due for commit to the note store.
//!
//! # Invariants
//! - At most one pending commit exists, and it targets the open note.
//! - Every edit replaces the pending deadline with `now + debounce`.
//! - Leaving `pending` happens only by commit (`poll`/`flush`) or
//!   cancellation (`cancel`/`open`/`close`).
//!
//! The controller never reads a clock itself; callers pass `now_ms`, so a
//! virtual clock drives it in tests.

use crate::model::note::{Note, NoteId, NotePatch};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Editable copy of one note's text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub body: String,
}

impl Draft {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            body: note.body.clone(),
        }
    }

    fn apply(&mut self, patch: &NotePatch) {
        if let Some(title) = patch.title.as_ref() {
            self.title.clone_from(title);
        }
        if let Some(body) = patch.body.as_ref() {
            self.body.clone_from(body);
        }
    }
}

/// Edit that is due to be written to the note store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    pub note_id: NoteId,
    pub patch: NotePatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AutosaveState {
    Idle,
    Editing {
        note_id: NoteId,
        draft: Draft,
        /// Commit time of the scheduled task, if any.
        deadline: Option<i64>,
    },
}

#[derive(Debug, Clone)]
pub struct AutosaveController {
    debounce_ms: i64,
    state: AutosaveState,
}

impl AutosaveController {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce_ms: i64::try_from(debounce.as_millis()).unwrap_or(i64::MAX),
            state: AutosaveState::Idle,
        }
    }

    /// Starts editing `note`. A pending edit of the previously open note is
    /// abandoned.
    pub fn open(&mut self, note: &Note) {
        self.abandon_pending("switch");
        self.state = AutosaveState::Editing {
            note_id: note.id.clone(),
            draft: Draft::from_note(note),
            deadline: None,
        };
    }

    /// Stops editing. A pending edit is abandoned.
    pub fn close(&mut self) {
        self.abandon_pending("close");
        self.state = AutosaveState::Idle;
    }

    /// Applies a keystroke-level edit and reschedules the commit.
    ///
    /// Returns `false` when no note is open.
    pub fn edit(&mut self, patch: &NotePatch, now_ms: i64) -> bool {
        let debounce_ms = self.debounce_ms;
        match &mut self.state {
            AutosaveState::Idle => false,
            AutosaveState::Editing {
                draft, deadline, ..
            } => {
                draft.apply(patch);
                *deadline = Some(now_ms.saturating_add(debounce_ms));
                true
            }
        }
    }

    /// Returns the draft as a commit once its deadline has passed.
    pub fn poll(&mut self, now_ms: i64) -> Option<PendingCommit> {
        match self.deadline() {
            Some(deadline) if now_ms >= deadline => self.take_commit(),
            _ => None,
        }
    }

    /// Returns the pending draft as a commit immediately.
    pub fn flush(&mut self) -> Option<PendingCommit> {
        self.take_commit()
    }

    /// Drops the scheduled commit while keeping the draft.
    pub fn cancel(&mut self) {
        if let AutosaveState::Editing { deadline, .. } = &mut self.state {
            *deadline = None;
        }
    }

    pub fn note_id(&self) -> Option<&NoteId> {
        match &self.state {
            AutosaveState::Idle => None,
            AutosaveState::Editing { note_id, .. } => Some(note_id),
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            AutosaveState::Idle => None,
            AutosaveState::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn deadline(&self) -> Option<i64> {
        match &self.state {
            AutosaveState::Idle => None,
            AutosaveState::Editing { deadline, .. } => *deadline,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.deadline().is_some()
    }

    pub fn is_editing(&self, id: &NoteId) -> bool {
        self.note_id() == Some(id)
    }

    fn take_commit(&mut self) -> Option<PendingCommit> {
        let AutosaveState::Editing {
            note_id,
            draft,
            deadline,
        } = &mut self.state
        else {
            return None;
        };
        deadline.take()?;

        Some(PendingCommit {
            note_id: note_id.clone(),
            patch: NotePatch {
                title: Some(draft.title.clone()),
                body: Some(draft.body.clone()),
            },
        })
    }

    fn abandon_pending(&self, reason: &str) {
        if let AutosaveState::Editing {
            note_id,
            deadline: Some(_),
            ..
        } = &self.state
        {
            debug!(
                "event=autosave_discard module=autosave status=ok note_id={} reason={}",
                note_id, reason
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AutosaveController;
    use crate::model::note::{Note, NoteId, NotePatch};
    use std::time::Duration;

    fn controller() -> AutosaveController {
        AutosaveController::new(Duration::from_millis(350))
    }

    fn note(id: &str) -> Note {
        Note::with_id(NoteId::new(id), 0)
    }

    #[test]
    fn edits_while_idle_are_ignored() {
        let mut autosave = controller();
        assert!(!autosave.edit(&NotePatch::title("x"), 0));
        assert!(autosave.poll(10_000).is_none());
    }

    #[test]
    fn keystrokes_inside_window_produce_one_commit() {
        let mut autosave = controller();
        autosave.open(&note("a"));

        autosave.edit(&NotePatch::title("H"), 0);
        autosave.edit(&NotePatch::title("He"), 100);
        assert!(autosave.poll(349).is_none());
        autosave.edit(&NotePatch::title("Hel"), 300);
        assert!(autosave.poll(640).is_none());

        let commit = autosave.poll(650).expect("commit due");
        assert_eq!(commit.note_id, NoteId::new("a"));
        assert_eq!(commit.patch.title.as_deref(), Some("Hel"));
        assert_eq!(commit.patch.body.as_deref(), Some(""));
        assert!(autosave.poll(5_000).is_none());
        assert_eq!(autosave.draft().map(|d| d.title.as_str()), Some("Hel"));
    }

    #[test]
    fn open_abandons_pending_edit() {
        let mut autosave = controller();
        autosave.open(&note("a"));
        autosave.edit(&NotePatch::body("unsaved"), 0);

        autosave.open(&note("b"));
        assert!(!autosave.has_pending());
        assert!(autosave.poll(10_000).is_none());
        assert_eq!(autosave.note_id(), Some(&NoteId::new("b")));
        assert_eq!(autosave.draft().map(|d| d.body.as_str()), Some(""));
    }

    #[test]
    fn cancel_keeps_draft_and_flush_commits_immediately() {
        let mut autosave = controller();
        autosave.open(&note("a"));
        autosave.edit(&NotePatch::title("kept"), 0);
        autosave.cancel();
        assert!(autosave.flush().is_none());
        assert_eq!(autosave.draft().map(|d| d.title.as_str()), Some("kept"));

        autosave.edit(&NotePatch::body("now"), 10);
        let commit = autosave.flush().expect("pending edit");
        assert_eq!(commit.patch.title.as_deref(), Some("kept"));
        assert_eq!(commit.patch.body.as_deref(), Some("now"));
        assert!(!autosave.has_pending());
    }

    #[test]
    fn close_returns_to_idle() {
        let mut autosave = controller();
        autosave.open(&note("a"));
        autosave.edit(&NotePatch::title("x"), 0);
        autosave.close();
        assert!(autosave.note_id().is_none());
        assert!(autosave.draft().is_none());
        assert!(autosave.poll(10_000).is_none());
    }
}
