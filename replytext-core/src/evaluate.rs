//! Request body for the evaluation endpoint.
//!
//! The endpoint scores one answer per provider for a single question; every
//! answer must already be plain text, so raw provider values go through the
//! [`Extractor`] first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extract::Extractor;

pub const EVALUATE_PATH: &str = "/api/evaluate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub question: String,
    /// Provider name -> extracted answer text.
    pub responses: BTreeMap<String, String>,
}

impl EvaluateRequest {
    pub fn from_raw(question: impl Into<String>, raws: &Map<String, Value>, extractor: &Extractor) -> Self {
        let responses = raws
            .iter()
            .map(|(provider, raw)| (provider.clone(), extractor.extract_text(Some(raw))))
            .collect();
        Self {
            question: question.into(),
            responses,
        }
    }
}

pub fn evaluate_url(base: &str) -> String {
    format!("{}{EVALUATE_PATH}", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_mixed_provider_shapes() {
        let raws = json!({
            "ChatGPT": "The capital of France is Paris.",
            "Gemini": "{\"text\": \"Paris is the capital of France.\", \"confidence\": 0.95}",
            "Claude": {
                "id": "chatcmpl-123",
                "choices": [{"message": {"content": "The capital of France is Paris."}}]
            },
            "Llama": null
        });
        let req = EvaluateRequest::from_raw(
            "What is the capital of France?",
            raws.as_object().unwrap(),
            &Extractor::default(),
        );
        assert_eq!(req.responses["ChatGPT"], "The capital of France is Paris.");
        assert_eq!(req.responses["Gemini"], "Paris is the capital of France.");
        assert_eq!(req.responses["Claude"], "The capital of France is Paris.");
        assert_eq!(req.responses["Llama"], "");

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["question"], "What is the capital of France?");
        assert!(body["responses"].as_object().unwrap().values().all(Value::is_string));
    }

    #[test]
    fn url_joins_without_double_slash() {
        assert_eq!(evaluate_url("http://localhost:5000"), "http://localhost:5000/api/evaluate");
        assert_eq!(evaluate_url("http://localhost:5000/"), "http://localhost:5000/api/evaluate");
    }
}
