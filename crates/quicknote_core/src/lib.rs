//! Core domain logic for QuickNote.
//! This crate is the single source of truth for note state and persistence.

pub mod clock;
pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod service;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, CoreConfig, SwitchPolicy};
pub use controller::autosave::{AutosaveController, Draft, PendingCommit};
pub use controller::selection::SelectionController;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::note::{Note, NoteId, NotePatch};
pub use query::view::{compare_notes, matches_query, normalize_query, view};
pub use service::notes_app::{AppSnapshot, Intent, NotesApp};
pub use storage::kv::{KeyValueStore, KvError, KvResult, MemoryKvStore, SqliteKvStore};
pub use storage::persistence::{NotePersistence, SaveErrorHook};
pub use store::note_store::NoteStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
