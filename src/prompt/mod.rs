//! Prompt layer
//!
//! The batcher only needs to know how long a prompt for a set of notes
//! would be. Anything that can render notes into text implements
//! [`PromptRenderer`]:
//! - `transform`: the field-filling prompt sent to the language model
//! - `xml`: note formatting shared by prompts
//! - `examples`: picking example notes to show the model

pub mod examples;
pub mod transform;
pub mod xml;

pub use examples::select_example_notes;
pub use transform::TransformPromptRenderer;

use crate::error::RenderError;
use crate::types::{Note, SelectionContext};

/// Renders a prompt for a set of target notes.
///
/// Rendering must be deterministic: the same notes, context and example
/// budget always produce the same text. The batcher may call this many
/// times while sizing a batch, so it should stay in-memory and cheap.
pub trait PromptRenderer {
    fn render(
        &self,
        notes: &[Note],
        context: &SelectionContext,
        max_examples: usize,
    ) -> Result<String, RenderError>;
}

impl<F> PromptRenderer for F
where
    F: Fn(&[Note], &SelectionContext, usize) -> Result<String, RenderError>,
{
    fn render(
        &self,
        notes: &[Note],
        context: &SelectionContext,
        max_examples: usize,
    ) -> Result<String, RenderError> {
        self(notes, context, max_examples)
    }
}

/// Prompt length in the unit budgets are expressed in.
pub fn prompt_len(prompt: &str) -> usize {
    prompt.chars().count()
}
