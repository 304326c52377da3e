//! Note selection helpers
//!
//! Decides which notes are eligible for filling and groups notes by type.
//! The batcher expects its input to have been filtered here first.

use crate::types::{FieldSelection, Note, NoteId};
use std::collections::HashMap;

/// Check if a note has a present but blank field among `fields`.
pub fn has_empty_field(note: &Note, fields: &[String]) -> bool {
    fields
        .iter()
        .filter_map(|name| note.field(name))
        .any(|value| value.trim().is_empty())
}

/// Check if a note has any of the overwritable fields.
pub fn has_overwritable_field(note: &Note, fields: &FieldSelection) -> bool {
    fields.overwritable.iter().any(|name| note.has_field(name))
}

/// A note is eligible when it has something to fill: an empty target
/// field or a field that may be overwritten.
pub fn is_eligible(note: &Note, fields: &FieldSelection) -> bool {
    has_empty_field(note, fields.target_fields()) || has_overwritable_field(note, fields)
}

/// Keep eligible notes, preserving input order.
pub fn filter_eligible(notes: &[Note], fields: &FieldSelection) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| is_eligible(note, fields))
        .cloned()
        .collect()
}

/// Keep notes of one note type, preserving input order.
pub fn filter_by_note_type(notes: &[Note], note_type: &str) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| note.note_type == note_type)
        .cloned()
        .collect()
}

/// Count notes per note type, most common first.
pub fn note_type_counts(notes: &[Note]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for note in notes {
        *counts.entry(note.note_type.as_str()).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Split note ids into consecutive groups of at most `size`.
pub fn batched(ids: &[NoteId], size: usize) -> Vec<Vec<NoteId>> {
    ids.chunks(size.max(1)).map(<[NoteId]>::to_vec).collect()
}
