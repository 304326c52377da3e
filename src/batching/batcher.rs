//! Batcher
//!
//! Partitions an ordered sequence of eligible notes into batches whose
//! rendered prompt fits a character budget. Each batch boundary is found by
//! the adaptive search, seeded from the predictor for the first batch and
//! from the running average batch size afterwards.

use super::estimator::estimate_average_note_size;
use super::predictor::predict_batch_size;
use super::search;
use super::stats::BatchingStats;
use crate::config::Config;
use crate::error::BatchError;
use crate::prompt::{prompt_len, PromptRenderer};
use crate::types::{Note, NoteId, SelectionContext};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to do when a single note does not fit the budget on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OversizePolicy {
    /// Report the note and stop; later notes are left unbatched
    #[default]
    StopRun,
    /// Report the note and continue with the next one
    SkipNote,
}

impl OversizePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StopRun => "stop-run",
            Self::SkipNote => "skip-note",
        }
    }
}

/// A group of notes sent to the model in one prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Note ids, in input order
    note_ids: Vec<NoteId>,
    /// Selection this batch was carved out of
    context: Arc<SelectionContext>,
}

impl Batch {
    fn new(note_ids: Vec<NoteId>, context: Arc<SelectionContext>) -> Self {
        Self { note_ids, context }
    }

    pub fn ids(&self) -> &[NoteId] {
        &self.note_ids
    }

    pub fn len(&self) -> usize {
        self.note_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.note_ids.is_empty()
    }

    pub fn context(&self) -> &SelectionContext {
        &self.context
    }

    pub fn note_type(&self) -> &str {
        &self.context.note_type.name
    }

    /// Look up this batch's notes in `notes`, in batch order.
    pub fn notes_from(&self, notes: &[Note]) -> Vec<Note> {
        let by_id: HashMap<NoteId, &Note> = notes.iter().map(|n| (n.id, n)).collect();
        self.note_ids
            .iter()
            .filter_map(|id| by_id.get(id).map(|n| (*n).clone()))
            .collect()
    }
}

/// Batches produced by one run plus its statistics
#[derive(Debug, Clone)]
pub struct Partition {
    pub batches: Vec<Batch>,
    pub stats: BatchingStats,
}

/// Splits notes into prompt-sized batches using a [`PromptRenderer`].
///
/// Holds no per-run state: every [`Batcher::partition`] call starts with a
/// fresh accuracy factor and counters, so one batcher can serve concurrent
/// runs.
pub struct Batcher<R> {
    renderer: R,
    /// Prompt budget in characters
    max_chars: usize,
    /// Example notes the renderer may include
    max_examples: usize,
    oversize_policy: OversizePolicy,
}

impl<R: PromptRenderer> Batcher<R> {
    /// Create a batcher with default limits
    pub fn new(renderer: R) -> Self {
        Self::from_config(&Config::default(), renderer)
    }

    /// Create a batcher using the limits from `config`
    pub fn from_config(config: &Config, renderer: R) -> Self {
        Self {
            renderer,
            max_chars: config.max_prompt_size,
            max_examples: config.max_examples,
            oversize_policy: config.oversize_policy,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_max_examples(mut self, max_examples: usize) -> Self {
        self.max_examples = max_examples;
        self
    }

    pub fn with_oversize_policy(mut self, policy: OversizePolicy) -> Self {
        self.oversize_policy = policy;
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Partition `notes` into batches that fit the prompt budget.
    ///
    /// `notes` must already be filtered to eligible notes. Batches keep the
    /// input order and never overlap. A note whose prompt exceeds the budget
    /// on its own is reported with a warning and handled according to the
    /// oversize policy; it never ends up in a batch.
    ///
    /// Fails only when the renderer errors while checking a single note.
    pub fn partition(
        &self,
        notes: &[Note],
        context: Arc<SelectionContext>,
    ) -> Result<Partition, BatchError> {
        if notes.is_empty() {
            info!("No batches created!");
            return Ok(Partition {
                batches: Vec::new(),
                stats: BatchingStats::from_batch_sizes(&[], 0, 0, 0, self.max_chars, Vec::new()),
            });
        }

        let avg_note_size = estimate_average_note_size(notes, &context.fields.selected);
        let initial_prediction = predict_batch_size(self.max_chars, notes.len(), avg_note_size as f64);
        debug!(
            notes = notes.len(),
            avg_note_size, initial_prediction, "starting partition"
        );

        let mut num_prompts_tried = 0usize;
        let mut accuracy_factor = 1.0;
        let mut remaining = notes;
        let mut batches = Vec::new();
        let mut batch_sizes: Vec<usize> = Vec::new();
        let mut oversized = Vec::new();

        while !remaining.is_empty() {
            let predicted = if batch_sizes.is_empty() {
                initial_prediction
            } else {
                batch_sizes.iter().sum::<usize>() / batch_sizes.len()
            };

            let outcome = search::search(
                remaining.len(),
                predicted,
                |n| self.fits(&remaining[..n], &context, &mut num_prompts_tried),
                accuracy_factor,
            );
            accuracy_factor = outcome.accuracy_factor;
            let batch_size = outcome.batch_size;

            if batch_size == 1 && (predicted <= 1 || !outcome.confirmed) {
                let note = &remaining[0];
                let prompt_size = self.single_note_size(note, &context, &mut num_prompts_tried)?;
                if prompt_size > self.max_chars {
                    warn!(
                        note_id = %note.id,
                        prompt_size,
                        max_chars = self.max_chars,
                        "Note {} exceeds maximum prompt size ({} > {}). Skipping.",
                        note.id,
                        prompt_size,
                        self.max_chars
                    );
                    oversized.push(note.id);
                    match self.oversize_policy {
                        OversizePolicy::StopRun => break,
                        OversizePolicy::SkipNote => {
                            remaining = &remaining[1..];
                            continue;
                        }
                    }
                }
            }

            let (batch, rest) = remaining.split_at(batch_size);
            debug!(
                batch = batches.len(),
                size = batch_size,
                predicted,
                accuracy_factor,
                "batch found"
            );
            batches.push(Batch::new(
                batch.iter().map(|n| n.id).collect(),
                Arc::clone(&context),
            ));
            batch_sizes.push(batch_size);
            remaining = rest;
        }

        if batches.is_empty() {
            info!("No batches created!");
        }

        let stats = BatchingStats::from_batch_sizes(
            &batch_sizes,
            num_prompts_tried,
            notes.len(),
            avg_note_size,
            self.max_chars,
            oversized,
        );
        debug!(%stats, "partition finished");

        Ok(Partition { batches, stats })
    }

    /// Trial render: does a prompt for `notes` fit the budget?
    ///
    /// Renderer failures count as "does not fit".
    fn fits(&self, notes: &[Note], context: &SelectionContext, tried: &mut usize) -> bool {
        if notes.is_empty() {
            return true;
        }

        *tried += 1;
        match self.renderer.render(notes, context, self.max_examples) {
            Ok(prompt) => prompt_len(&prompt) <= self.max_chars,
            Err(err) => {
                debug!(size = notes.len(), error = %err, "trial render failed");
                false
            }
        }
    }

    /// Prompt length for `note` alone. Renderer failures are returned.
    fn single_note_size(
        &self,
        note: &Note,
        context: &SelectionContext,
        tried: &mut usize,
    ) -> Result<usize, BatchError> {
        *tried += 1;
        let prompt = self
            .renderer
            .render(std::slice::from_ref(note), context, self.max_examples)
            .map_err(|source| BatchError::Render {
                note_id: note.id,
                source,
            })?;
        Ok(prompt_len(&prompt))
    }
}
