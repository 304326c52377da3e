//! Statistics for one partitioning run

use crate::types::NoteId;
use serde::Serialize;
use std::fmt;

/// Summary of a partitioning run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchingStats {
    /// Trial prompt renders performed while sizing batches
    pub num_prompts_tried: usize,
    /// Median batch size (upper median), None without batches
    pub median_batch_size: Option<usize>,
    /// Floor of the mean batch size, None without batches
    pub avg_batch_size: Option<usize>,
    /// Number of batches produced
    pub num_batches: usize,
    /// Number of eligible notes handed to the batcher
    pub num_notes_selected: usize,
    /// Estimated average note size in characters
    pub avg_note_size: usize,
    /// Prompt budget in characters
    pub max_prompt_size: usize,
    /// Notes reported as exceeding the budget on their own
    pub oversized_notes: Vec<NoteId>,
}

impl BatchingStats {
    /// Build stats from the sizes of the produced batches.
    pub fn from_batch_sizes(
        batch_sizes: &[usize],
        num_prompts_tried: usize,
        num_notes_selected: usize,
        avg_note_size: usize,
        max_prompt_size: usize,
        oversized_notes: Vec<NoteId>,
    ) -> Self {
        let (median_batch_size, avg_batch_size) = if batch_sizes.is_empty() {
            (None, None)
        } else {
            let mut sorted = batch_sizes.to_vec();
            sorted.sort_unstable();
            let total: usize = sorted.iter().sum();
            (Some(sorted[sorted.len() / 2]), Some(total / sorted.len()))
        };

        Self {
            num_prompts_tried,
            median_batch_size,
            avg_batch_size,
            num_batches: batch_sizes.len(),
            num_notes_selected,
            avg_note_size,
            max_prompt_size,
            oversized_notes,
        }
    }
}

impl fmt::Display for BatchingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<usize>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        write!(
            f,
            "{} batches from {} notes (median {}, avg {}), {} prompts tried, avg note size {}, max prompt size {}",
            self.num_batches,
            self.num_notes_selected,
            opt(self.median_batch_size),
            opt(self.avg_batch_size),
            self.num_prompts_tried,
            self.avg_note_size,
            self.max_prompt_size,
        )?;
        if !self.oversized_notes.is_empty() {
            write!(f, ", {} oversized", self.oversized_notes.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = BatchingStats::from_batch_sizes(&[], 0, 0, 0, 1000, Vec::new());
        assert_eq!(stats.num_batches, 0);
        assert_eq!(stats.median_batch_size, None);
        assert_eq!(stats.avg_batch_size, None);
    }

    #[test]
    fn test_median_and_average() {
        let stats = BatchingStats::from_batch_sizes(&[10, 3, 7, 4], 12, 24, 30, 5000, Vec::new());
        // sorted [3, 4, 7, 10], index 2
        assert_eq!(stats.median_batch_size, Some(7));
        assert_eq!(stats.avg_batch_size, Some(6));
        assert_eq!(stats.num_batches, 4);
    }

    #[test]
    fn test_display() {
        let stats = BatchingStats::from_batch_sizes(&[5], 2, 5, 10, 100, vec![NoteId(9)]);
        let line = stats.to_string();
        assert!(line.starts_with("1 batches from 5 notes"));
        assert!(line.ends_with("1 oversized"));
    }
}
