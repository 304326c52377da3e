//! cardfill - fill flashcard fields with a language model
//!
//! Notes are grouped into batches whose rendered prompt fits a character
//! budget; each batch becomes one model request.
//!
//! ```no_run
//! use cardfill::{filter_eligible, Batcher, FieldSelection, NoteType, SelectionContext, TransformPromptRenderer};
//! use std::sync::Arc;
//!
//! # fn notes() -> Vec<cardfill::Note> { Vec::new() }
//! let fields = FieldSelection::new(["Front", "Back"], ["Back"], Vec::new());
//! let eligible = filter_eligible(&notes(), &fields);
//! let context = Arc::new(SelectionContext::new(NoteType::new("Basic"), fields));
//!
//! let batcher = Batcher::new(TransformPromptRenderer::new()).with_max_chars(20_000);
//! let partition = batcher.partition(&eligible, context)?;
//! println!("{}", partition.stats);
//! # Ok::<(), cardfill::BatchError>(())
//! ```

pub mod batching;
pub mod config;
pub mod error;
pub mod prompt;
pub mod selection;
pub mod types;

pub use batching::{
    estimate_average_note_size, find_batch_size, predict_batch_size, Batch, Batcher,
    BatchingStats, OversizePolicy, Partition,
};
pub use config::Config;
pub use error::{BatchError, RenderError};
pub use prompt::{PromptRenderer, TransformPromptRenderer};
pub use selection::{filter_eligible, filter_by_note_type, is_eligible, note_type_counts};
pub use types::{FieldSelection, Note, NoteId, NoteType, SelectionContext};
