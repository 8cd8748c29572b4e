//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted entity of the notes core.
//! - Own timestamp bump rules shared by every mutation path.
//!
//! # Invariants
//! - `id` is stable and never reassigned once a note exists.
//! - `updated_at` never decreases for the lifetime of a note.
//! - Serialized field names match the persisted layout
//!   (`id`, `title`, `body`, `updatedAt`, `pinned`).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque, stable note identifier.
///
/// New ids are UUID v4 strings, but ids loaded from storage are accepted
/// verbatim, so no format is assumed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing id value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Short text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Stable identity, assigned at creation.
    pub id: NoteId,
    /// Free text, may be empty.
    pub title: String,
    /// Free text, may be empty.
    pub body: String,
    /// Unix epoch milliseconds of the last mutation.
    pub updated_at: i64,
    /// Pinned notes sort ahead of unpinned ones.
    pub pinned: bool,
}

impl Note {
    /// Creates an empty, unpinned note with a generated id.
    pub fn new(now_ms: i64) -> Self {
        Self::with_id(NoteId::generate(), now_ms)
    }

    /// Creates an empty, unpinned note with a caller-provided id.
    pub fn with_id(id: NoteId, now_ms: i64) -> Self {
        Self {
            id,
            title: String::new(),
            body: String::new(),
            updated_at: now_ms,
            pinned: false,
        }
    }

    /// Merges present patch fields and bumps `updated_at`.
    pub fn apply_patch(&mut self, patch: &NotePatch, now_ms: i64) {
        if let Some(title) = patch.title.as_ref() {
            self.title.clone_from(title);
        }
        if let Some(body) = patch.body.as_ref() {
            self.body.clone_from(body);
        }
        self.touch(now_ms);
    }

    /// Flips the pin flag and bumps `updated_at`.
    pub fn toggle_pin(&mut self, now_ms: i64) {
        self.pinned = !self.pinned;
        self.touch(now_ms);
    }

    /// Advances `updated_at` to `now_ms`, or by one millisecond when the
    /// clock has not moved past the previous value.
    pub fn touch(&mut self, now_ms: i64) {
        self.updated_at = now_ms.max(self.updated_at.saturating_add(1));
    }
}

/// Partial edit of a note's text fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NotePatch {
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            body: None,
        }
    }

    pub fn body(value: impl Into<String>) -> Self {
        Self {
            title: None,
            body: Some(value.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}
