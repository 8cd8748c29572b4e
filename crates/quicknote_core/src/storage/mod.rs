//! Local storage layer.
//!
//! # Responsibility
//! - Define the key-value storage seam and its implementations.
//! - Map the note collection to and from its persisted JSON layout.
//!
//! # Invariants
//! - Storage failures never propagate into domain operations.

pub mod kv;
pub mod persistence;
