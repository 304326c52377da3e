//! Field-filling prompt
//!
//! Renders the prompt asking the model to fill empty (or overwritable)
//! fields of the target notes. Layout:
//! 1. introduction and per-field instructions
//! 2. example notes from the collection (optional)
//! 3. the target notes as XML

use super::examples::select_example_notes;
use super::xml::format_notes;
use super::PromptRenderer;
use crate::error::RenderError;
use crate::selection::is_eligible;
use crate::types::{Note, NoteId, SelectionContext};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

const INTRODUCTION: &str =
    "You are an Anki note assistant. Your task is to fill empty fields in notes based on context.";

/// Renders field-filling prompts for a set of target notes.
#[derive(Debug, Clone, Default)]
pub struct TransformPromptRenderer {
    /// Instruction per field name, used instead of the generic instructions
    field_instructions: BTreeMap<String, String>,
    /// Notes examples are drawn from
    example_pool: Vec<Note>,
    /// Notes never used as examples (usually the whole target selection)
    excluded: HashSet<NoteId>,
}

impl TransformPromptRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set per-field instructions.
    pub fn with_field_instructions(mut self, instructions: BTreeMap<String, String>) -> Self {
        self.field_instructions = instructions;
        self
    }

    /// Set the notes examples are drawn from.
    pub fn with_example_pool(mut self, pool: Vec<Note>) -> Self {
        self.example_pool = pool;
        self
    }

    /// Never use these notes as examples.
    ///
    /// Excluding the full target selection up front keeps the example
    /// section identical for every subset rendered while batching.
    pub fn excluding(mut self, ids: impl IntoIterator<Item = NoteId>) -> Self {
        self.excluded.extend(ids);
        self
    }

    fn introduction(&self, fields_to_fill: &[String], has_examples: bool) -> Vec<String> {
        let mut parts = vec![INTRODUCTION.to_string(), String::new(), "Instructions:".to_string()];

        if !self.field_instructions.is_empty() {
            for (name, instruction) in &self.field_instructions {
                if fields_to_fill.contains(name) {
                    parts.push(format!("- For field '{}': {}", name, instruction));
                }
            }
            return parts;
        }

        if has_examples {
            parts.push(
                "- Fill empty fields intelligently based on field names, deck context, and examples."
                    .to_string(),
            );
        } else {
            parts.push("- Fill empty fields intelligently based on field names and deck context.".to_string());
        }

        match fields_to_fill {
            [] => {}
            [single] => parts.push(format!("- Fill in only the following empty field: \"{}\".", single)),
            many => {
                let names: Vec<String> = many.iter().map(|f| format!("'{}'", f)).collect();
                parts.push(format!("- Fill in only the following empty fields: {}.", names.join(", ")));
            }
        }
        parts
    }

    fn target_instruction(fields_to_fill: &[String]) -> String {
        match fields_to_fill {
            [single] => format!(
                "Please fill the specified empty field (\"{}\") in the following notes and return them in the same XML format:",
                single
            ),
            _ => "Please fill the specified empty fields in the following notes and return them in the same XML format:"
                .to_string(),
        }
    }
}

impl PromptRenderer for TransformPromptRenderer {
    fn render(
        &self,
        notes: &[Note],
        context: &SelectionContext,
        max_examples: usize,
    ) -> Result<String, RenderError> {
        let fields = &context.fields;
        let fields_to_fill = fields.fields_to_fill();
        if fields_to_fill.is_empty() {
            return Err(RenderError::NoFieldsToFill);
        }

        let targets: Cow<'_, [Note]> = if notes.iter().all(|n| is_eligible(n, fields)) {
            Cow::Borrowed(notes)
        } else {
            Cow::Owned(notes.iter().filter(|n| is_eligible(n, fields)).cloned().collect())
        };
        if targets.is_empty() {
            return Err(RenderError::NoTargetNotes);
        }

        let mut excluded = self.excluded.clone();
        excluded.extend(targets.iter().map(|n| n.id));
        let examples: Vec<Note> = select_example_notes(
            &self.example_pool,
            &context.note_type.name,
            &excluded,
            &fields.selected,
            max_examples,
            targets[0].deck.as_deref(),
        )
        .into_iter()
        .cloned()
        .collect();

        let mut parts = self.introduction(fields_to_fill, !examples.is_empty());

        if !examples.is_empty() {
            parts.push(String::new());
            parts.push("Here are some example notes from the collection:".to_string());
            parts.push(String::new());
            parts.push(format_notes(&examples, &context.note_type.name, &fields.selected, &[]));
            parts.push(String::new());
        }

        parts.push(Self::target_instruction(fields_to_fill));
        parts.push(String::new());
        parts.push(format_notes(
            &targets,
            &context.note_type.name,
            &fields.selected,
            &fields.overwritable,
        ));

        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldSelection, NoteType};

    fn context(writable: &[&str], overwritable: &[&str]) -> SelectionContext {
        SelectionContext::new(
            NoteType::new("Basic"),
            FieldSelection::new(
                ["Front", "Back"].iter().copied(),
                writable.iter().copied(),
                overwritable.iter().copied(),
            ),
        )
    }

    #[test]
    fn test_render_basic_prompt() {
        let notes = vec![Note::new(1, "Basic").with_field("Front", "Hola").with_field("Back", "")];
        let prompt = TransformPromptRenderer::new()
            .render(&notes, &context(&["Back"], &[]), 3)
            .unwrap();

        assert!(prompt.starts_with(INTRODUCTION));
        assert!(prompt.contains("- Fill in only the following empty field: \"Back\"."));
        assert!(prompt.contains("<field name=\"Front\">Hola</field>"));
        assert!(!prompt.contains("example notes"));
        assert!(prompt.ends_with("</notes>"));
    }

    #[test]
    fn test_render_with_examples_and_instructions() {
        let notes = vec![Note::new(1, "Basic").with_field("Front", "Hola").with_field("Back", "")];
        let pool = vec![Note::new(2, "Basic").with_field("Front", "Adiós").with_field("Back", "Goodbye")];
        let mut instructions = BTreeMap::new();
        instructions.insert("Back".to_string(), "English translation".to_string());

        let prompt = TransformPromptRenderer::new()
            .with_example_pool(pool)
            .with_field_instructions(instructions)
            .render(&notes, &context(&["Back"], &[]), 3)
            .unwrap();

        assert!(prompt.contains("- For field 'Back': English translation"));
        assert!(prompt.contains("Here are some example notes from the collection:"));
        assert!(prompt.contains("Goodbye"));
    }

    #[test]
    fn test_excluded_notes_are_not_examples() {
        let notes = vec![Note::new(1, "Basic").with_field("Front", "Hola").with_field("Back", "")];
        let pool = vec![Note::new(2, "Basic").with_field("Front", "Adiós").with_field("Back", "Goodbye")];

        let prompt = TransformPromptRenderer::new()
            .with_example_pool(pool)
            .excluding([NoteId(2)])
            .render(&notes, &context(&["Back"], &[]), 3)
            .unwrap();

        assert!(!prompt.contains("Goodbye"));
    }

    #[test]
    fn test_overwritable_rendered_empty() {
        let notes = vec![Note::new(1, "Basic").with_field("Front", "Hola").with_field("Back", "old")];
        let prompt = TransformPromptRenderer::new()
            .render(&notes, &context(&[], &["Back"]), 0)
            .unwrap();

        assert!(prompt.contains("<field name=\"Back\"></field>"));
        assert!(!prompt.contains("old"));
    }

    #[test]
    fn test_no_target_notes() {
        let notes = vec![Note::new(1, "Basic").with_field("Front", "Hola").with_field("Back", "done")];
        let err = TransformPromptRenderer::new()
            .render(&notes, &context(&["Back"], &[]), 0)
            .unwrap_err();
        assert!(matches!(err, RenderError::NoTargetNotes));
    }

    #[test]
    fn test_no_fields_to_fill() {
        let notes = vec![Note::new(1, "Basic").with_field("Front", "")];
        let err = TransformPromptRenderer::new()
            .render(&notes, &context(&[], &[]), 0)
            .unwrap_err();
        assert!(matches!(err, RenderError::NoFieldsToFill));
    }
}
