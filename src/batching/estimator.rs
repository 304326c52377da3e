//! Note cost estimation
//!
//! Average rendered field size per note, measured on an evenly spaced
//! sample so huge collections are not scanned in full.

use crate::types::Note;

/// Maximum number of notes inspected when estimating the average size.
pub const MAX_SAMPLE_SIZE: usize = 4000;

/// Pick at most `max` items spread evenly across `items`, keeping order.
pub fn evenly_spaced_sample<T>(items: &[T], max: usize) -> Vec<&T> {
    if items.len() <= max {
        return items.iter().collect();
    }

    (0..max).map(|i| &items[i * items.len() / max]).collect()
}

/// Average number of characters in `field_names` per note.
///
/// Returns 0 for an empty input; callers then skip prediction.
pub fn estimate_average_note_size(notes: &[Note], field_names: &[String]) -> usize {
    let sample = evenly_spaced_sample(notes, MAX_SAMPLE_SIZE);
    if sample.is_empty() {
        return 0;
    }

    let total: usize = sample
        .iter()
        .map(|note| field_names.iter().map(|name| note.field_len(name)).sum::<usize>())
        .sum();

    total / sample.len()
}
