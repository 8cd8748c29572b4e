//! Read-side projections over the note collection.

pub mod view;
