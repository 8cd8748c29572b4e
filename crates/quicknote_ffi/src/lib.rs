//! Flutter Rust Bridge surface for QuickNote core.

pub mod api;
