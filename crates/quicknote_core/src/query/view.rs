//! Sorted and filtered projection of the note collection.
//!
//! # Responsibility
//! - Derive the displayed note list from the collection and a search text.
//!
//! # Invariants
//! - Pinned notes precede unpinned notes.
//! - Within equal pin state, newer `updated_at` comes first.
//! - Notes equal on both keys keep collection order (stable sort).
//! - A blank query filters nothing.

use crate::model::note::Note;
use std::cmp::Ordering;

/// Display order: pinned first, then most recently updated.
pub fn compare_notes(a: &Note, b: &Note) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

/// Trims and lowercases search input for matching.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Case-insensitive substring match against title or body.
///
/// `needle` must already be normalized; an empty needle matches everything.
pub fn matches_query(note: &Note, needle: &str) -> bool {
    needle.is_empty()
        || note.title.to_lowercase().contains(needle)
        || note.body.to_lowercase().contains(needle)
}

/// Builds the ordered, filtered list shown to the user.
pub fn view(notes: &[Note], query: &str) -> Vec<Note> {
    let needle = normalize_query(query);
    let mut visible: Vec<Note> = notes
        .iter()
        .filter(|note| matches_query(note, &needle))
        .cloned()
        .collect();
    visible.sort_by(compare_notes);
    visible
}

#[cfg(test)]
mod tests {
    use super::{compare_notes, normalize_query, view};
    use crate::model::note::{Note, NoteId};
    use std::cmp::Ordering;

    fn note(id: &str, title: &str, body: &str, updated_at: i64, pinned: bool) -> Note {
        Note {
            id: NoteId::new(id),
            title: title.to_string(),
            body: body.to_string(),
            updated_at,
            pinned,
        }
    }

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|note| note.id.as_str()).collect()
    }

    #[test]
    fn pinned_first_then_newest() {
        let notes = vec![
            note("old", "", "", 1, false),
            note("pinned-old", "", "", 2, true),
            note("new", "", "", 9, false),
            note("pinned-new", "", "", 8, true),
        ];
        assert_eq!(
            ids(&view(&notes, "")),
            vec!["pinned-new", "pinned-old", "new", "old"]
        );
    }

    #[test]
    fn pin_outranks_recency() {
        let pinned = note("a", "", "", 5, true);
        let fresh = note("b", "", "", 10, false);
        assert_eq!(compare_notes(&pinned, &fresh), Ordering::Less);
    }

    #[test]
    fn ties_keep_collection_order() {
        let notes = vec![note("x", "", "", 3, false), note("y", "", "", 3, false)];
        assert_eq!(ids(&view(&notes, "")), vec!["x", "y"]);
    }

    #[test]
    fn filter_matches_title_or_body_case_insensitively() {
        let notes = vec![
            note("title-hit", "Shopping LIST", "", 1, false),
            note("body-hit", "misc", "remember the list", 2, false),
            note("miss", "todo", "nothing here", 3, true),
        ];
        assert_eq!(ids(&view(&notes, "  List ")), vec!["body-hit", "title-hit"]);
    }

    #[test]
    fn whitespace_query_returns_everything() {
        let notes = vec![note("a", "", "", 1, false), note("b", "", "", 2, false)];
        assert_eq!(view(&notes, "   \t"), view(&notes, ""));
        assert_eq!(view(&notes, "").len(), 2);
    }

    #[test]
    fn surrounding_whitespace_is_not_part_of_the_needle() {
        let notes = vec![note("a", "alphabet", "", 1, false)];
        assert_eq!(ids(&view(&notes, " alpha")), vec!["a"]);
        assert_eq!(normalize_query("  MiXed Case \n"), "mixed case");
    }

    #[test]
    fn filter_does_not_match_ids() {
        let notes = vec![note("needle", "hay", "stack", 1, false)];
        assert!(view(&notes, "needle").is_empty());
    }
}
