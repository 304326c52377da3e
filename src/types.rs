//! Core data types shared across the crate.
//!
//! Notes are owned by the caller's collection store; everything here only
//! reads them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier of a note in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub u64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NoteId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A single flashcard record with named string fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Name of the note type (model) this note belongs to
    pub note_type: String,
    /// Deck the note's cards live in, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deck: Option<String>,
    /// Field name -> content
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, note_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            note_type: note_type.into(),
            deck: None,
            fields: BTreeMap::new(),
        }
    }

    /// Set the deck name.
    pub fn with_deck(mut self, deck: impl Into<String>) -> Self {
        self.deck = Some(deck.into());
        self
    }

    /// Add or replace a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Character length of a field, 0 when the note lacks it.
    pub fn field_len(&self, name: &str) -> usize {
        self.field(name).map_or(0, |v| v.chars().count())
    }
}

/// Which fields are read as context and which may be written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    /// Fields included as context in the prompt
    pub selected: Vec<String>,
    /// Fields that may be filled when currently empty
    pub writable: Vec<String>,
    /// Fields that may be filled regardless of content
    pub overwritable: Vec<String>,
}

impl FieldSelection {
    pub fn new<S: Into<String>>(
        selected: impl IntoIterator<Item = S>,
        writable: impl IntoIterator<Item = S>,
        overwritable: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            selected: selected.into_iter().map(Into::into).collect(),
            writable: writable.into_iter().map(Into::into).collect(),
            overwritable: overwritable.into_iter().map(Into::into).collect(),
        }
    }

    /// Fields the language model is asked to produce.
    pub fn fields_to_fill(&self) -> &[String] {
        if self.overwritable.is_empty() {
            &self.writable
        } else {
            &self.overwritable
        }
    }

    /// Fields checked for emptiness when deciding eligibility.
    pub fn target_fields(&self) -> &[String] {
        if self.writable.is_empty() {
            &self.selected
        } else {
            &self.writable
        }
    }
}

/// Note type (model) a selection is built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteType {
    pub name: String,
}

impl NoteType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The parent selection a batch was carved out of.
///
/// Shared by every batch of one partitioning run so each batch can be
/// traced back to the note type and fields it was sized against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    pub note_type: NoteType,
    pub fields: FieldSelection,
}

impl SelectionContext {
    pub fn new(note_type: NoteType, fields: FieldSelection) -> Self {
        Self { note_type, fields }
    }
}
