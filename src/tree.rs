//! Depth-first rendering of schema-less payloads into indented lines.

use crate::{
    format::{format_date_value, format_key, format_value},
    layout::{LayoutWriter, TextStyle},
    models::{ActivityProgress, ACTIVITY_TYPE_KEYS},
    value::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub indent: u16,
    pub bold: bool,
}

impl Line {
    fn plain(text: impl Into<String>, indent: u16) -> Self { Self { text: text.into(), indent, bold: false } }

    fn label(text: impl Into<String>, indent: u16) -> Self { Self { text: text.into(), indent, bold: true } }
}

/// Renders `value` starting at `indent`.
///
/// Record entries that are null, `""`, `[]` or `{}` produce no output;
/// nested lists and records get a `Key:` label and are rendered one level
/// deeper. List elements keep their position: records are labelled
/// `- Item N` by index and nulls render as `- None`.
pub fn render_key_value(value: &Value, indent: u16) -> Vec<Line> {
    let mut out = Vec::new();
    render_into(value, indent, &mut out);
    out
}

fn render_into(value: &Value, indent: u16, out: &mut Vec<Line>) {
    match value {
        Value::Null => {}
        Value::Bool(_) | Value::Number(_) | Value::Text(_) | Value::Date(_) => {
            let text = format_value(value);
            if !text.is_empty() {
                out.push(Line::plain(text, indent));
            }
        }
        Value::List(items) if items.is_empty() => out.push(Line::plain("None", indent)),
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Record(_) => {
                        out.push(Line::label(format!("- Item {}", i + 1), indent));
                        render_into(item, indent + 1, out);
                    }
                    Value::Null => out.push(Line::plain("- None", indent)),
                    other => out.push(Line::plain(format!("- {}", format_value(other)), indent)),
                }
            }
        }
        Value::Record(entries) => {
            for (key, entry) in entries {
                if entry.is_empty() {
                    continue;
                }
                if entry.is_structured() {
                    out.push(Line::label(format!("{}:", format_key(key)), indent));
                    render_into(entry, indent + 1, out);
                } else {
                    out.push(Line::plain(format!("{}: {}", format_key(key), format_value(entry)), indent));
                }
            }
        }
    }
}

/// Status, completion date, notes and any reflection or worksheet answers
/// recorded for one activity.
pub fn render_progress_details(progress: &ActivityProgress, indent: u16) -> Vec<Line> {
    let mut out = Vec::new();
    let status = if progress.completed { "Completed" } else { "Not completed" };
    out.push(Line::plain(format!("Status: {status}"), indent));
    if let Some(at) = progress.completed_at.as_ref().filter(|v| !v.is_empty()) {
        out.push(Line::plain(format!("Completed At: {}", format_date_value(at)), indent));
    }
    if let Some(notes) = progress.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        out.push(Line::plain(format!("Notes: {notes}"), indent));
    }
    for (label, data) in [("Reflection", &progress.reflection_data), ("Worksheet", &progress.worksheet_data)] {
        if !data.is_empty() {
            out.push(Line::label(format!("{label}:"), indent));
            render_into(data, indent + 1, &mut out);
        }
    }
    let extra: Vec<(String, Value)> = progress
        .extra
        .iter()
        .filter(|(k, _)| !ACTIVITY_TYPE_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), Value::from(v.clone())))
        .collect();
    render_into(&Value::Record(extra), indent, &mut out);
    out
}

/// Writes rendered lines with `base` styling; indentation and weight come
/// from each line.
pub fn write_lines(writer: &mut LayoutWriter, lines: &[Line], base: TextStyle) {
    for line in lines {
        let mut style = base.indent(base.indent + line.indent);
        style.bold = base.bold || line.bold;
        writer.add_text(&line.text, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{layout::PageLayout, value::strategies::arb_value};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn texts(lines: &[Line]) -> Vec<(u16, &str)> { lines.iter().map(|l| (l.indent, l.text.as_str())).collect() }

    #[test]
    fn empty_entries_are_skipped() {
        let value = Value::from(json!({"a": "", "b": [], "c": {}, "d": "x", "e": null}));
        assert_eq!(texts(&render_key_value(&value, 0)), vec![(0, "D: x")]);
    }

    #[test]
    fn primitive_lists_are_bulleted() {
        let value = Value::from(json!(["a", "b"]));
        assert_eq!(texts(&render_key_value(&value, 0)), vec![(0, "- a"), (0, "- b")]);
    }

    #[test]
    fn record_list_items_are_numbered_and_nested() {
        let value = Value::from(json!([{"x": 1}]));
        assert_eq!(texts(&render_key_value(&value, 0)), vec![(0, "- Item 1"), (1, "X: 1")]);
    }

    #[test]
    fn list_items_are_numbered_by_position() {
        let value = Value::from(json!(["a", null, {"x": 1}]));
        assert_eq!(texts(&render_key_value(&value, 0)), vec![(0, "- a"), (0, "- None"), (0, "- Item 3"), (1, "X: 1")]);
    }

    #[test]
    fn empty_list_renders_none() {
        assert_eq!(texts(&render_key_value(&Value::List(vec![]), 2)), vec![(2, "None")]);
    }

    #[test]
    fn nested_structures_indent_one_level_per_depth() {
        let value = Value::from(json!({
            "situation": "meeting at work",
            "evidenceFor": ["heart racing"],
            "balancedThought": {"belief_rating": 40, "helpful": true}
        }));
        assert_eq!(
            texts(&render_key_value(&value, 1)),
            vec![
                (1, "Situation: meeting at work"),
                (1, "Evidence For:"),
                (2, "- heart racing"),
                (1, "Balanced Thought:"),
                (2, "Belief Rating: 40"),
                (2, "Helpful: Yes"),
            ]
        );
    }

    #[test]
    fn null_and_blank_roots_render_nothing() {
        assert!(render_key_value(&Value::Null, 0).is_empty());
        assert!(render_key_value(&Value::text(""), 0).is_empty());
    }

    #[test]
    fn progress_details_include_notes_and_answers() {
        let progress: ActivityProgress = serde_json::from_value(json!({
            "completed": true,
            "completedAt": "2024-03-05T09:30:00Z",
            "notes": "felt better",
            "reflectionData": {"whatHelped": "slow breathing"},
            "worksheetData": {},
            "type": "reflection",
            "rating": 4
        }))
        .unwrap();
        assert_eq!(
            texts(&render_progress_details(&progress, 1)),
            vec![
                (1, "Status: Completed"),
                (1, "Completed At: 5 March 2024, 09:30"),
                (1, "Notes: felt better"),
                (1, "Reflection:"),
                (2, "What Helped: slow breathing"),
                (1, "Rating: 4"),
            ]
        );
    }

    #[test]
    fn written_lines_keep_relative_indent() {
        let mut writer = LayoutWriter::new("t", PageLayout::default());
        let lines = render_key_value(&Value::from(json!({"outer": {"inner": 1}})), 0);
        write_lines(&mut writer, &lines, TextStyle::default().indent(1));
        let doc = writer.finish();
        let indents: Vec<u16> = doc.lines().map(|l| l.indent).collect();
        assert_eq!(indents, vec![1, 2]);
    }

    proptest! {
        #[test]
        fn empty_values_never_emit_lines(
            keys in prop::collection::vec("[a-z]{1,8}", 1..8),
            kinds in prop::collection::vec(0u8..4, 8),
        ) {
            let entries = keys.iter().zip(kinds.iter()).map(|(k, kind)| {
                let v = match kind {
                    0 => Value::Null,
                    1 => Value::text(""),
                    2 => Value::List(vec![]),
                    _ => Value::Record(vec![]),
                };
                (k.clone(), v)
            });
            prop_assert!(render_key_value(&Value::record(entries), 0).is_empty());
        }

        #[test]
        fn renderer_is_total_and_indents_within_depth(value in arb_value()) {
            for line in render_key_value(&value, 0) {
                prop_assert!(line.indent <= 5);
            }
        }
    }
}
