//! Note collection ownership.
//!
//! # Responsibility
//! - Hold the single authoritative copy of every note.
//! - Route each mutation through persistence.

pub mod note_store;
