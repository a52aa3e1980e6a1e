//! Best-effort parsing of incomplete JSON.
//!
//! While a response streams in, the accumulated text is usually cut in the
//! middle of a string, key or number. [`parse_partial`] closes what is open
//! and, if that is not enough, falls back to the last point where the text
//! was structurally complete.

use serde_json::Value;

/// Number of earlier cut points tried before giving up.
const MAX_CUT_POINTS: usize = 8;

/// A position in the text after which the open containers can be closed.
struct CutPoint {
    end: usize,
    closers: Vec<char>,
}

/// Repairs truncated JSON into a parseable string.
///
/// Returns `None` when no object or array has started yet.
pub fn repair(input: &str) -> Option<String> {
    let start = input.find(['{', '['])?;
    let text = &input[start..];

    let mut closers: Vec<char> = Vec::new();
    let mut cut_points: Vec<CutPoint> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                cut_points.push(CutPoint {
                    end: i + 1,
                    closers: closers.clone(),
                });
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => {
                closers.push(if c == '{' { '}' } else { ']' });
                cut_points.push(CutPoint {
                    end: i + 1,
                    closers: closers.clone(),
                });
            }
            '}' | ']' => {
                if closers.pop() != Some(c) {
                    return None;
                }
                if closers.is_empty() {
                    return Some(text[..=i].to_string());
                }
                cut_points.push(CutPoint {
                    end: i + 1,
                    closers: closers.clone(),
                });
            }
            ',' => cut_points.push(CutPoint {
                end: i,
                closers: closers.clone(),
            }),
            _ => {}
        }
    }

    let mut head = text.to_string();
    if in_string {
        if escaped {
            head.pop();
        }
        head.push('"');
    }
    let candidate = close(&head, &closers);
    if serde_json::from_str::<Value>(&candidate).is_ok() {
        return Some(candidate);
    }

    cut_points
        .iter()
        .rev()
        .take(MAX_CUT_POINTS)
        .map(|point| close(&text[..point.end], &point.closers))
        .find(|candidate| serde_json::from_str::<Value>(candidate).is_ok())
}

/// Parses truncated JSON into its best-effort value.
pub fn parse_partial(input: &str) -> Option<Value> {
    let repaired = repair(input)?;
    serde_json::from_str(&repaired).ok()
}

fn close(head: &str, closers: &[char]) -> String {
    let mut out = head.trim_end().trim_end_matches(',').to_string();
    out.extend(closers.iter().rev());
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn closes_open_string_and_containers() {
        let value = parse_partial(r#"{"blocks": [{"kind": "text", "text": "Hel"#).unwrap();
        assert_eq!(value, json!({"blocks": [{"kind": "text", "text": "Hel"}]}));
    }

    #[test]
    fn drops_dangling_key() {
        let value = parse_partial(r#"{"a": 1, "b": "#).unwrap();
        assert_eq!(value, json!({"a": 1}));

        let value = parse_partial(r#"{"a": 1, "b"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn drops_trailing_comma() {
        let value = parse_partial(r#"{"items": ["x", "y", "#).unwrap();
        assert_eq!(value, json!({"items": ["x", "y"]}));
    }

    #[test]
    fn complete_json_is_returned_as_is() {
        let value = parse_partial(r#"prefix {"a": [1, 2]} trailing"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
    }

    #[test]
    fn nothing_started_yields_none() {
        assert!(parse_partial("Sure, here is").is_none());
    }

    #[test]
    fn pending_escape_is_dropped() {
        let value = parse_partial(r#"{"text": "a\"#).unwrap();
        assert_eq!(value, json!({"text": "a"}));
    }
}
