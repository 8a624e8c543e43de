//! Shape classification for provider responses.
//!
//! All probing of an untyped value happens here; extraction is a single
//! exhaustive match over [`RawResponse`].

use serde_json::{Map, Value};

use crate::config::Precedence;

/// A provider response, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse<'a> {
    /// `None` or JSON `null`.
    Absent,
    /// A string that does not look like a JSON object.
    PlainString(&'a str),
    /// A `{...}` string that decoded to a JSON object.
    ///
    /// `hit` is the first configured string field found on it, if any.
    JsonEncodedString {
        raw: &'a str,
        hit: Option<FieldHit>,
    },
    /// A `{...}` string that failed to decode.
    MalformedJsonString { raw: &'a str, error: String },
    /// A structured object carrying one of the configured text fields.
    ObjectWithField { field: &'a str, text: &'a str },
    /// A structured object whose `choices[0]` carries text at a configured path.
    ChoiceListObject { path: &'a str, text: &'a str },
    /// A structured object with nothing recognizable.
    UnrecognizedObject(&'a Map<String, Value>),
    /// Numbers, booleans, arrays.
    Other(&'a Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHit {
    pub field: String,
    pub text: String,
}

impl<'a> RawResponse<'a> {
    pub fn classify(raw: Option<&'a Value>, precedence: &'a Precedence) -> Self {
        match raw {
            None | Some(Value::Null) => RawResponse::Absent,
            Some(Value::String(s)) => classify_string(s, precedence),
            Some(Value::Object(map)) => classify_object(map, precedence),
            Some(other) => RawResponse::Other(other),
        }
    }
}

/// `true` when `s` starts with `{` and ends with `}` (no trimming).
pub fn looks_like_json_object(s: &str) -> bool {
    s.starts_with('{') && s.ends_with('}')
}

/// Resolve a dotted path (`"message.content"`) against nested objects.
pub fn lookup_path<'v>(v: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(v, |cur, seg| cur.get(seg))
}

fn classify_string<'a>(s: &'a str, precedence: &Precedence) -> RawResponse<'a> {
    if !looks_like_json_object(s) {
        return RawResponse::PlainString(s);
    }
    match serde_json::from_str::<Value>(s) {
        Ok(parsed) => {
            // Decoded strings accept empty fields: only the type is checked.
            let hit = precedence.json_string_fields.iter().find_map(|field| {
                parsed
                    .get(field)
                    .and_then(Value::as_str)
                    .map(|text| FieldHit {
                        field: field.clone(),
                        text: text.to_string(),
                    })
            });
            RawResponse::JsonEncodedString { raw: s, hit }
        }
        Err(e) => RawResponse::MalformedJsonString {
            raw: s,
            error: e.to_string(),
        },
    }
}

fn classify_object<'a>(map: &'a Map<String, Value>, precedence: &'a Precedence) -> RawResponse<'a> {
    for field in &precedence.object_fields {
        if let Some(text) = non_empty_str(map.get(field)) {
            return RawResponse::ObjectWithField {
                field: field.as_str(),
                text,
            };
        }
    }

    let first_choice = map
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first());
    if let Some(choice) = first_choice {
        for path in &precedence.choice_paths {
            if let Some(text) = non_empty_str(lookup_path(choice, path)) {
                return RawResponse::ChoiceListObject {
                    path: path.as_str(),
                    text,
                };
            }
        }
    }

    RawResponse::UnrecognizedObject(map)
}

fn non_empty_str(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_missing_are_absent() {
        let p = Precedence::default();
        assert_eq!(RawResponse::classify(None, &p), RawResponse::Absent);
        assert_eq!(RawResponse::classify(Some(&Value::Null), &p), RawResponse::Absent);
    }

    #[test]
    fn json_looking_detection_does_not_trim() {
        assert!(looks_like_json_object("{}"));
        assert!(looks_like_json_object("{not valid json}"));
        assert!(!looks_like_json_object(" {\"text\": \"a\"}"));
        assert!(!looks_like_json_object("{"));
        assert!(!looks_like_json_object("[1]"));
    }

    #[test]
    fn malformed_string_keeps_error() {
        let p = Precedence::default();
        let v = json!("{not valid json}");
        match RawResponse::classify(Some(&v), &p) {
            RawResponse::MalformedJsonString { raw, error } => {
                assert_eq!(raw, "{not valid json}");
                assert!(!error.is_empty());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn json_string_without_known_field_has_no_hit() {
        let p = Precedence::default();
        let v = json!("{\"answer\": \"x\", \"text\": 3}");
        assert_eq!(
            RawResponse::classify(Some(&v), &p),
            RawResponse::JsonEncodedString {
                raw: "{\"answer\": \"x\", \"text\": 3}",
                hit: None
            }
        );
    }

    #[test]
    fn empty_object_field_falls_through_to_next() {
        let p = Precedence::default();
        let v = json!({"text": "", "content": "body"});
        assert_eq!(
            RawResponse::classify(Some(&v), &p),
            RawResponse::ObjectWithField {
                field: "content",
                text: "body"
            }
        );
    }

    #[test]
    fn choices_need_a_first_entry() {
        let p = Precedence::default();
        let v = json!({"choices": []});
        assert!(matches!(RawResponse::classify(Some(&v), &p), RawResponse::UnrecognizedObject(_)));
    }

    #[test]
    fn nested_choice_path() {
        let p = Precedence::default();
        let v = json!({"id": "chatcmpl-123", "choices": [{"message": {"content": "B"}}]});
        assert_eq!(
            RawResponse::classify(Some(&v), &p),
            RawResponse::ChoiceListObject {
                path: "message.content",
                text: "B"
            }
        );
    }

    #[test]
    fn arrays_and_scalars_are_other() {
        let p = Precedence::default();
        assert!(matches!(RawResponse::classify(Some(&json!(42)), &p), RawResponse::Other(_)));
        assert!(matches!(RawResponse::classify(Some(&json!(true)), &p), RawResponse::Other(_)));
        assert!(matches!(RawResponse::classify(Some(&json!([1, 2])), &p), RawResponse::Other(_)));
    }

    #[test]
    fn lookup_path_walks_objects() {
        let v = json!({"a": {"b": {"c": "deep"}}});
        assert_eq!(lookup_path(&v, "a.b.c"), Some(&json!("deep")));
        assert_eq!(lookup_path(&v, "a.x"), None);
    }
}
