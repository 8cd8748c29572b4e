//! Interaction controllers driven by UI intents.
//!
//! # Responsibility
//! - Track which note is active.
//! - Buffer and schedule edits to the active note.
//!
//! # Invariants
//! - Controllers hold derived, non-authoritative copies only; the note
//!   store stays the source of truth.

pub mod autosave;
pub mod selection;
