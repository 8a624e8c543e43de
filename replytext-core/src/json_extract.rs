use serde_json::Value;

/// Recover a JSON value that a model wrapped in prose or code fences.
///
/// Order of attempts:
/// - the whole (trimmed) input
/// - the body of the first ```` ```json ```` fence, then of a bare ```` ``` ```` fence
/// - the span from the first `{` to the last `}`
///
/// Returns `None` when the input is blank or nothing parses.
pub fn extract_first_json_value(s: &str) -> Option<Value> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(v) = serde_json::from_str::<Value>(s) {
        return Some(v);
    }

    for fence in ["```json", "```"] {
        if let Some(body) = fenced_body(s, fence) {
            if let Ok(v) = serde_json::from_str::<Value>(body) {
                return Some(v);
            }
        }
    }

    let i = s.find('{')?;
    let j = s.rfind('}')?;
    if j <= i {
        return None;
    }
    serde_json::from_str::<Value>(&s[i..=j]).ok()
}

fn fenced_body<'a>(s: &'a str, fence: &str) -> Option<&'a str> {
    let start = s.find(fence)? + fence.len();
    let rest = &s[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_is_none() {
        assert_eq!(extract_first_json_value("   \n"), None);
    }

    #[test]
    fn bare_json_parses_directly() {
        assert_eq!(extract_first_json_value(" [1, 2] "), Some(json!([1, 2])));
    }

    #[test]
    fn prefers_json_fence() {
        let s = "Here you go:\n```json\n{\"text\": \"hi\"}\n```\nand {\"other\": 1}";
        assert_eq!(extract_first_json_value(s), Some(json!({"text": "hi"})));
    }

    #[test]
    fn bare_fence_is_accepted() {
        let s = "```\n{\"content\": \"x\"}\n```";
        assert_eq!(extract_first_json_value(s), Some(json!({"content": "x"})));
    }

    #[test]
    fn falls_back_to_brace_span() {
        let s = "The answer is {\"text\": \"Paris\"} as requested.";
        assert_eq!(extract_first_json_value(s), Some(json!({"text": "Paris"})));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(extract_first_json_value("no json } here {"), None);
        assert_eq!(extract_first_json_value("{not valid json}"), None);
    }
}
