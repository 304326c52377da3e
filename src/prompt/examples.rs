//! Example note selection
//!
//! Picks well-filled notes of the same type to show the model what
//! finished notes look like.

use crate::types::{Note, NoteId};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Only this many candidates are scored.
pub const MAX_CANDIDATES: usize = 300;

/// Select up to `max_examples` example notes from `pool`.
///
/// Candidates share `note_type`, are not among `exclude`, and have at least
/// one non-empty selected field. Ranking, highest first:
/// 1. number of non-empty selected fields
/// 2. word count in selected fields
/// 3. same deck as `target_deck`
pub fn select_example_notes<'a>(
    pool: &'a [Note],
    note_type: &str,
    exclude: &HashSet<NoteId>,
    selected_fields: &[String],
    max_examples: usize,
    target_deck: Option<&str>,
) -> Vec<&'a Note> {
    if max_examples == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(usize, usize, bool, usize, &Note)> = pool
        .iter()
        .filter(|note| note.note_type == note_type && !exclude.contains(&note.id))
        .take(MAX_CANDIDATES)
        .enumerate()
        .filter_map(|(position, note)| {
            let (non_empty, words) = score(note, selected_fields);
            let same_deck = target_deck.is_some() && note.deck.as_deref() == target_deck;
            (non_empty > 0).then_some((non_empty, words, same_deck, position, note))
        })
        .collect();

    // Stable on pool position for equal scores.
    scored.sort_by_key(|&(non_empty, words, same_deck, position, _)| {
        (Reverse(non_empty), Reverse(words), Reverse(same_deck), position)
    });

    scored
        .into_iter()
        .take(max_examples)
        .map(|(_, _, _, _, note)| note)
        .collect()
}

/// Count non-empty selected fields and their words.
fn score(note: &Note, selected_fields: &[String]) -> (usize, usize) {
    selected_fields
        .iter()
        .filter_map(|name| note.field(name))
        .filter(|value| !value.trim().is_empty())
        .fold((0, 0), |(count, words), value| {
            (count + 1, words + value.split_whitespace().count())
        })
}
