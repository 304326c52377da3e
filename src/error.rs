//! Error types for prompt rendering and batching.

use crate::types::NoteId;
use thiserror::Error;

/// Failure while rendering a prompt for a set of notes.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no target notes with empty writable fields or overwritable fields")]
    NoTargetNotes,

    #[error("no writable or overwritable fields specified")]
    NoFieldsToFill,

    #[error("prompt rendering failed: {0}")]
    Other(String),
}

/// Failure that aborts a partitioning run.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The renderer failed while checking whether a single note fits on its own.
    #[error("renderer failed on single-note size check for note {note_id}")]
    Render {
        note_id: NoteId,
        #[source]
        source: RenderError,
    },
}
