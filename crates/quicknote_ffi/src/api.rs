//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Forward UI intents into one process-wide `NotesApp`.
//! - Return render-ready snapshots as plain DTOs.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every intent response carries the post-intent snapshot on success.
//! - Calls before `notes_open` fail with a message instead of panicking.

use log::warn;
use quicknote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppSnapshot, CoreConfig, Intent, Note, NoteId, NotePatch, NotesApp, SqliteKvStore,
    SystemClock,
};
use std::sync::{Mutex, PoisonError};

type HostApp = NotesApp<SqliteKvStore, SystemClock>;

static APP: Mutex<Option<HostApp>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rotating log files.
///
/// # FFI contract
/// - Sync call; may create the log directory.
/// - Idempotent for the same `level + log_dir`; other values return an error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Note row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    pub pinned: bool,
}

/// Render-ready state after an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesSnapshot {
    /// Visible notes, pinned first then most recent.
    pub items: Vec<NoteItem>,
    pub selected_id: Option<String>,
    pub query: String,
    /// Editor contents of the selected note (may be ahead of `items`).
    pub draft_title: Option<String>,
    pub draft_body: Option<String>,
    pub has_pending_edit: bool,
}

/// Generic response envelope for notes calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    pub ok: bool,
    /// Human-readable message for diagnostics.
    pub message: String,
    pub snapshot: Option<NotesSnapshot>,
}

impl NotesResponse {
    fn success(message: impl Into<String>, snapshot: NotesSnapshot) -> Self {
        Self {
            ok: true,
            message: message.into(),
            snapshot: Some(snapshot),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            snapshot: None,
        }
    }
}

/// Opens (or reopens) the notes database at `db_path`.
///
/// `config_json` overrides defaults, e.g. `{"autosave_debounce_ms": 500}`.
///
/// # FFI contract
/// - Sync call; opens and migrates the SQLite file.
/// - On success the previous session's pending edit is flushed and replaced.
/// - On failure the previous session stays open and usable.
/// - Never panics; failures are reported through `NotesResponse`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open(db_path: String, config_json: Option<String>) -> NotesResponse {
    let config = match config_json.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => match CoreConfig::from_json_str(raw) {
            Ok(config) => config,
            Err(err) => return NotesResponse::failure(format!("notes_open failed: {err}")),
        },
        _ => CoreConfig::default(),
    };

    let mut slot = APP.lock().unwrap_or_else(PoisonError::into_inner);
    let store = match SqliteKvStore::open(db_path.trim()) {
        Ok(store) => store,
        Err(err) => return NotesResponse::failure(format!("notes_open failed: {err}")),
    };
    // Pending edits of the previous session must land before the reload.
    if let Some(mut previous) = slot.take() {
        previous.flush_pending();
    }

    let mut app = NotesApp::open(store, SystemClock, config);
    app.set_save_error_hook(|err| {
        warn!("event=notes_save module=ffi status=error error={err}");
    });
    let snapshot = to_snapshot(app.snapshot());
    *slot = Some(app);
    NotesResponse::success("Notes opened.", snapshot)
}

/// Creates an empty note and selects it.
///
/// # FFI contract
/// - Sync call; may write the notes database.
/// - Fails with a message when `notes_open` has not succeeded yet.
/// - Never panics; returns the post-intent snapshot on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_create() -> NotesResponse {
    dispatch("notes_create", Intent::CreateNote)
}

/// Deletes a note; unknown ids are ignored.
///
/// # FFI contract
/// - Sync call; may write the notes database.
/// - Fails with a message when `notes_open` has not succeeded yet.
/// - Never panics; returns the post-intent snapshot on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(id: String) -> NotesResponse {
    dispatch("notes_delete", Intent::DeleteNote { id: NoteId::new(id) })
}

/// Flips the pinned flag of a note; unknown ids are ignored.
///
/// # FFI contract
/// - Sync call; may write the notes database.
/// - Fails with a message when `notes_open` has not succeeded yet.
/// - Never panics; returns the post-intent snapshot on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_toggle_pin(id: String) -> NotesResponse {
    dispatch("notes_toggle_pin", Intent::TogglePin { id: NoteId::new(id) })
}

/// Buffers a keystroke-level edit; committed by `notes_tick` after the
/// debounce window, or by `notes_flush`.
///
/// # FFI contract
/// - Sync call, non-blocking; never writes the database itself.
/// - Edits for a note other than the selected one are ignored.
/// - Never panics; returns the post-intent snapshot on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_edit(id: String, title: Option<String>, body: Option<String>) -> NotesResponse {
    dispatch(
        "notes_edit",
        Intent::EditNote {
            id: NoteId::new(id),
            patch: NotePatch { title, body },
        },
    )
}

/// Selects a note and loads it into the editor; unknown ids are ignored.
///
/// # FFI contract
/// - Sync call; writes only under the `flush` switch policy.
/// - Never panics; returns the post-intent snapshot on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_select(id: String) -> NotesResponse {
    dispatch("notes_select", Intent::SelectNote { id: NoteId::new(id) })
}

/// Replaces the search text; surrounding whitespace is ignored when matching.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; returns the filtered snapshot on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_set_query(text: String) -> NotesResponse {
    dispatch("notes_set_query", Intent::SetSearchQuery { text })
}

/// Host timer hook; commits the draft once the debounce window has elapsed.
///
/// # FFI contract
/// - Sync call; may write the notes database.
/// - Fails with a message when `notes_open` has not succeeded yet.
/// - Never panics; returns the post-intent snapshot on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_tick() -> NotesResponse {
    dispatch("notes_tick", Intent::Tick)
}

/// Commits any pending draft immediately (e.g. on app pause).
///
/// # FFI contract
/// - Sync call; may write the notes database.
/// - Fails with a message when `notes_open` has not succeeded yet.
/// - Never panics; returns the post-intent snapshot on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_flush() -> NotesResponse {
    dispatch("notes_flush", Intent::Flush)
}

/// Returns the current render state without changing it.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Fails with a message when `notes_open` has not succeeded yet.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_snapshot() -> NotesResponse {
    with_app("notes_snapshot", |_| ())
}

fn dispatch(operation: &str, intent: Intent) -> NotesResponse {
    with_app(operation, |app| app.dispatch(intent))
}

fn with_app(operation: &str, f: impl FnOnce(&mut HostApp)) -> NotesResponse {
    let mut slot = APP.lock().unwrap_or_else(PoisonError::into_inner);
    match slot.as_mut() {
        Some(app) => {
            f(app);
            NotesResponse::success("ok", to_snapshot(app.snapshot()))
        }
        None => NotesResponse::failure(format!(
            "{operation} failed: notes are not open; call notes_open first"
        )),
    }
}

fn to_snapshot(snapshot: AppSnapshot) -> NotesSnapshot {
    let (draft_title, draft_body) = match snapshot.draft {
        Some(draft) => (Some(draft.title), Some(draft.body)),
        None => (None, None),
    };
    NotesSnapshot {
        items: snapshot.notes.into_iter().map(to_note_item).collect(),
        selected_id: snapshot.selected_id.map(|id| id.to_string()),
        query: snapshot.query,
        draft_title,
        draft_body,
        has_pending_edit: snapshot.has_pending_edit,
    }
}

fn to_note_item(note: Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        title: note.title,
        body: note.body,
        updated_at: note.updated_at,
        pinned: note.pinned,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, notes_create, notes_delete, notes_edit, notes_flush,
        notes_open, notes_select, notes_set_query, notes_snapshot, notes_toggle_pin, ping,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_invalid_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    // Single test owns the process-wide app so parallel tests cannot interleave.
    #[test]
    fn notes_flow_round_trips_through_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("notes.db").to_str().unwrap().to_string();

        let bad = notes_open(db_path.clone(), Some(r#"{"autosave_debounce_ms": 0}"#.to_string()));
        assert!(!bad.ok);
        assert!(bad.message.contains("autosave_debounce_ms"));

        let opened = notes_open(db_path.clone(), None);
        assert!(opened.ok, "{}", opened.message);
        assert!(opened.snapshot.unwrap().items.is_empty());

        let created = notes_create().snapshot.expect("snapshot");
        let first_id = created.selected_id.clone().expect("new note selected");
        let edited = notes_edit(first_id.clone(), Some("Shopping".to_string()), None)
            .snapshot
            .unwrap();
        assert!(edited.has_pending_edit);
        assert_eq!(edited.draft_title.as_deref(), Some("Shopping"));

        let flushed = notes_flush().snapshot.unwrap();
        assert!(!flushed.has_pending_edit);
        assert_eq!(flushed.items[0].title, "Shopping");

        let second_id = notes_create().snapshot.unwrap().selected_id.unwrap();
        notes_toggle_pin(first_id.clone());
        let listed = notes_snapshot().snapshot.unwrap();
        assert_eq!(listed.items[0].id, first_id);
        assert!(listed.items[0].pinned);
        assert_eq!(listed.items[1].id, second_id);

        let filtered = notes_set_query("shop".to_string()).snapshot.unwrap();
        assert_eq!(filtered.items.len(), 1);
        notes_set_query(String::new());

        notes_select(first_id.clone());
        let after_delete = notes_delete(first_id).snapshot.unwrap();
        assert_eq!(after_delete.selected_id.as_deref(), Some(second_id.as_str()));

        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();
        let bad_path = blocker.join("notes.db").to_str().unwrap().to_string();
        let failed = notes_open(bad_path, None);
        assert!(!failed.ok);
        let still_open = notes_snapshot();
        assert!(still_open.ok, "{}", still_open.message);
        assert_eq!(still_open.snapshot.unwrap().items[0].id, second_id);

        let reopened = notes_open(db_path, None).snapshot.unwrap();
        assert_eq!(reopened.items.len(), 1);
        assert_eq!(reopened.items[0].id, second_id);
        assert_eq!(reopened.selected_id, None);
    }
}
