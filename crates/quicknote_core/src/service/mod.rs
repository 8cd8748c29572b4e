//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and controllers into UI-level intents.
//! - Keep FFI/host layers decoupled from storage details.

pub mod notes_app;
