//! XML formatting of notes for prompts.

use crate::types::Note;

/// Escape special XML characters in content.
pub fn escape_xml(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format a single note as a `<note>` element.
///
/// Only fields in `fields_included` that exist on the note are emitted;
/// those in `leave_empty` are written without their content.
pub fn format_note(
    note: &Note,
    fields_included: &[String],
    leave_empty: &[String],
    include_deck: bool,
) -> String {
    let mut lines = Vec::with_capacity(fields_included.len() + 2);

    match (&note.deck, include_deck) {
        (Some(deck), true) => lines.push(format!(
            "  <note nid=\"{}\" deck=\"{}\">",
            note.id,
            escape_xml(deck)
        )),
        _ => lines.push(format!("  <note nid=\"{}\">", note.id)),
    }

    for name in fields_included {
        let Some(value) = note.field(name) else {
            continue;
        };
        let value = if leave_empty.contains(name) {
            String::new()
        } else {
            escape_xml(value)
        };
        lines.push(format!(
            "    <field name=\"{}\">{}</field>",
            escape_xml(name),
            value
        ));
    }

    lines.push("  </note>".to_string());
    lines.join("\n")
}

/// Format notes as a `<notes>` document for one note type.
///
/// When every note shares a deck it is written once on the root element,
/// otherwise on each note.
pub fn format_notes(
    notes: &[Note],
    note_type: &str,
    fields_included: &[String],
    leave_empty: &[String],
) -> String {
    let common_deck = notes.first().and_then(|first| {
        let deck = first.deck.as_deref()?;
        notes
            .iter()
            .all(|n| n.deck.as_deref() == Some(deck))
            .then_some(deck)
    });

    let mut lines = Vec::with_capacity(notes.len() + 2);
    match common_deck {
        Some(deck) => lines.push(format!(
            "<notes model=\"{}\" deck=\"{}\">",
            escape_xml(note_type),
            escape_xml(deck)
        )),
        None => lines.push(format!("<notes model=\"{}\">", escape_xml(note_type))),
    }

    for note in notes {
        lines.push(format_note(note, fields_included, leave_empty, common_deck.is_none()));
    }

    lines.push("</notes>".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"a < b & "c" 'd' >"#), "a &lt; b &amp; &quot;c&quot; &apos;d&apos; &gt;");
    }

    #[test]
    fn test_format_note_skips_missing_and_empties() {
        let note = Note::new(7, "Basic")
            .with_field("Front", "Hello")
            .with_field("Back", "World");
        let xml = format_note(&note, &fields(&["Front", "Back", "Extra"]), &fields(&["Back"]), false);

        assert_eq!(
            xml,
            "  <note nid=\"7\">\n    <field name=\"Front\">Hello</field>\n    <field name=\"Back\"></field>\n  </note>"
        );
    }

    #[test]
    fn test_common_deck_on_root() {
        let notes = vec![
            Note::new(1, "Basic").with_deck("Spanish").with_field("Front", "uno"),
            Note::new(2, "Basic").with_deck("Spanish").with_field("Front", "dos"),
        ];
        let xml = format_notes(&notes, "Basic", &fields(&["Front"]), &[]);

        assert!(xml.starts_with("<notes model=\"Basic\" deck=\"Spanish\">"));
        assert!(xml.contains("  <note nid=\"1\">"));
        assert!(xml.ends_with("</notes>"));
    }

    #[test]
    fn test_mixed_decks_per_note() {
        let notes = vec![
            Note::new(1, "Basic").with_deck("A").with_field("Front", "x"),
            Note::new(2, "Basic").with_deck("B & C").with_field("Front", "y"),
        ];
        let xml = format_notes(&notes, "Basic", &fields(&["Front"]), &[]);

        assert!(xml.starts_with("<notes model=\"Basic\">"));
        assert!(xml.contains("<note nid=\"2\" deck=\"B &amp; C\">"));
    }
}
