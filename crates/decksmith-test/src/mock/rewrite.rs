//! Mechanical shorten and split used by the deterministic backend.
//!
//! Both operate on the slide JSON carried in the call metadata and follow
//! the violation field paths (`blocks[1].items[3]`, `title`, ...).

use serde::Deserialize;
use serde_json::{Value, json};

use super::content::Lang;

#[derive(Debug, Deserialize)]
pub(crate) struct Violation {
    pub field: String,
    pub limit: usize,
    pub action: String,
}

/// One step of a parsed field path.
#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let (name, rest) = part.split_once('[').unwrap_or((part, ""));
        if !name.is_empty() {
            segments.push(Segment::Key(name.to_string()));
        }
        for index in rest.split('[') {
            if let Ok(i) = index.trim_end_matches(']').parse() {
                segments.push(Segment::Index(i));
            }
        }
    }
    segments
}

fn resolve<'a>(root: &'a mut Value, path: &[Segment]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in path {
        current = match segment {
            Segment::Key(key) => current.get_mut(key.as_str())?,
            Segment::Index(index) => current.get_mut(*index)?,
        };
    }
    Some(current)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect::<String>().trim_end().to_string()
}

fn truncate_value(value: &mut Value, limit: usize) {
    match value {
        Value::String(text) => *text = truncate_chars(text, limit),
        Value::Array(items) => items.truncate(limit),
        _ => {}
    }
}

/// Applies every `shorten` violation to the slide and returns its blocks.
pub(crate) fn shorten(mut slide: Value, violations: &[Violation]) -> Value {
    let mut drop_kinds = Vec::new();

    for violation in violations.iter().filter(|v| v.action == "shorten") {
        if violation.field == "title" {
            if let Some(blocks) = slide.get_mut("blocks").and_then(Value::as_array_mut)
                && let Some(title) = blocks.iter_mut().find(|b| b["kind"] == "title")
            {
                truncate_value(&mut title["text"], violation.limit);
            }
            continue;
        }

        if let Some(kind) = violation.field.strip_prefix("blocks.") {
            if violation.limit == 0 {
                drop_kinds.push(kind.to_string());
            }
            continue;
        }

        let path = parse_path(&violation.field);
        if let Some(target) = resolve(&mut slide, &path) {
            truncate_value(target, violation.limit);
        }
    }

    let mut blocks = slide
        .get_mut("blocks")
        .map(Value::take)
        .unwrap_or_else(|| json!([]));
    if let Some(list) = blocks.as_array_mut() {
        list.retain(|b| !drop_kinds.iter().any(|kind| b["kind"] == kind.as_str()));
    }

    json!({ "blocks": blocks })
}

/// Splits list content of a slide into two halves.
pub(crate) fn split(slide: &Value, lang: Lang) -> Value {
    let blocks = slide["blocks"].as_array().cloned().unwrap_or_default();
    let title = blocks
        .iter()
        .find(|b| b["kind"] == "title")
        .and_then(|b| b["text"].as_str())
        .unwrap_or_default()
        .to_string();

    let (first_suffix, second_suffix) = match lang {
        Lang::En => ("overview", "details"),
        Lang::No => ("oversikt", "detaljer"),
    };

    let repeated = ["stat_block", "timeline_step", "icon_card", "numbered_card"];
    let repeated_total = blocks
        .iter()
        .filter(|b| repeated.iter().any(|k| b["kind"] == *k))
        .count();
    let mut repeated_seen = 0;

    let mut first = vec![json!({"kind": "title", "text": format!("{title}: {first_suffix}")})];
    let mut second = vec![json!({"kind": "title", "text": format!("{title}: {second_suffix}")})];

    for block in blocks.iter().filter(|b| b["kind"] != "title") {
        if let Some(items) = block["items"].as_array() {
            let (a, b) = items.split_at(items.len().div_ceil(2));
            first.push(json!({"kind": "bullets", "items": a}));
            second.push(json!({"kind": "bullets", "items": b}));
        } else if let Some(rows) = block["rows"].as_array() {
            let (a, b) = rows.split_at(rows.len().div_ceil(2));
            first.push(json!({"kind": "table", "columns": block["columns"], "rows": a}));
            second.push(json!({"kind": "table", "columns": block["columns"], "rows": b}));
        } else if repeated.iter().any(|k| block["kind"] == *k) {
            if repeated_seen < repeated_total.div_ceil(2) {
                first.push(block.clone());
            } else {
                second.push(block.clone());
            }
            repeated_seen += 1;
        } else {
            first.push(block.clone());
            second.push(block.clone());
        }
    }

    json!({ "slides": [{ "blocks": first }, { "blocks": second }] })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_parsed() {
        assert_eq!(
            parse_path("blocks[2].rows[0][1]"),
            vec![
                Segment::Key("blocks".into()),
                Segment::Index(2),
                Segment::Key("rows".into()),
                Segment::Index(0),
                Segment::Index(1),
            ]
        );
    }

    #[test]
    fn shorten_follows_field_paths() {
        let slide = json!({
            "slide_type": "bullets",
            "blocks": [
                {"kind": "title", "text": "A very long title indeed"},
                {"kind": "bullets", "items": ["abcdefghij", "short"]},
                {"kind": "image", "url": ""}
            ]
        });
        let violations = vec![
            Violation { field: "title".into(), limit: 6, action: "shorten".into() },
            Violation { field: "blocks[1].items[0]".into(), limit: 4, action: "shorten".into() },
            Violation { field: "blocks.image".into(), limit: 0, action: "shorten".into() },
        ];

        let out = shorten(slide, &violations);
        assert_eq!(out["blocks"][0]["text"], "A very");
        assert_eq!(out["blocks"][1]["items"][0], "abcd");
        assert_eq!(out["blocks"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn split_halves_lists() {
        let slide = json!({
            "blocks": [
                {"kind": "title", "text": "Risks"},
                {"kind": "bullets", "items": ["a", "b", "c", "d", "e"]}
            ]
        });
        let out = split(&slide, Lang::En);
        assert_eq!(out["slides"][0]["blocks"][0]["text"], "Risks: overview");
        assert_eq!(out["slides"][0]["blocks"][1]["items"].as_array().unwrap().len(), 3);
        assert_eq!(out["slides"][1]["blocks"][1]["items"].as_array().unwrap().len(), 2);
    }
}
