//! Normalize provider responses to plain text.
//!
//! The extractor is total: every input yields a string. Soft failures
//! (a `{...}` string that does not decode, an object with no usable field)
//! are logged and reported through [`Extraction::fallback`].

use std::sync::OnceLock;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Precedence, ReplytextConfig};
use crate::raw::RawResponse;

/// Where the extracted text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TextSource {
    Absent,
    PlainString,
    /// Field of a JSON object decoded from a string.
    JsonField(String),
    /// Field of a structured object.
    ObjectField(String),
    /// Path inside `choices[0]`.
    Choice(String),
    /// Whole object serialized as compact JSON.
    Serialized,
    /// String form of a number, boolean or array.
    Scalar,
}

/// Why the extractor had to fall back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Fallback {
    MalformedJson(String),
    NoJsonField,
    NoRecognizedField,
    SerializationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub text: String,
    pub source: TextSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

impl Extraction {
    fn found(text: impl Into<String>, source: TextSource) -> Self {
        Self {
            text: text.into(),
            source,
            fallback: None,
        }
    }

    fn fell_back(text: impl Into<String>, source: TextSource, fallback: Fallback) -> Self {
        Self {
            text: text.into(),
            source,
            fallback: Some(fallback),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    precedence: Precedence,
}

impl Extractor {
    pub fn new(precedence: Precedence) -> Self {
        Self { precedence }
    }

    pub fn from_config(cfg: &ReplytextConfig) -> Self {
        Self::new(cfg.precedence.clone())
    }

    pub fn extract_text(&self, raw: Option<&Value>) -> String {
        self.extract(raw).text
    }

    pub fn extract(&self, raw: Option<&Value>) -> Extraction {
        let out = match RawResponse::classify(raw, &self.precedence) {
            RawResponse::Absent => Extraction::found("", TextSource::Absent),
            RawResponse::PlainString(s) => Extraction::found(s, TextSource::PlainString),
            RawResponse::JsonEncodedString {
                hit: Some(hit), ..
            } => Extraction::found(hit.text, TextSource::JsonField(hit.field)),
            RawResponse::JsonEncodedString { raw, hit: None } => {
                Extraction::fell_back(raw, TextSource::PlainString, Fallback::NoJsonField)
            }
            RawResponse::MalformedJsonString { raw, error } => {
                warn!("failed to parse JSON-looking response: {error}");
                Extraction::fell_back(raw, TextSource::PlainString, Fallback::MalformedJson(error))
            }
            RawResponse::ObjectWithField { field, text } => {
                Extraction::found(text, TextSource::ObjectField(field.to_string()))
            }
            RawResponse::ChoiceListObject { path, text } => {
                Extraction::found(text, TextSource::Choice(path.to_string()))
            }
            RawResponse::UnrecognizedObject(map) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                warn!("could not extract text from object with keys {keys:?}; serializing it");
                match serde_json::to_string(map) {
                    Ok(s) => Extraction::fell_back(s, TextSource::Serialized, Fallback::NoRecognizedField),
                    Err(e) => {
                        warn!("failed to serialize response object: {e}");
                        Extraction::fell_back(
                            "",
                            TextSource::Serialized,
                            Fallback::SerializationFailed(e.to_string()),
                        )
                    }
                }
            }
            RawResponse::Other(v) => match render_other(v) {
                Ok(s) => Extraction::found(s, TextSource::Scalar),
                Err(e) => {
                    warn!("failed to render response value: {e}");
                    Extraction::fell_back(
                        "",
                        TextSource::Scalar,
                        Fallback::SerializationFailed(e.to_string()),
                    )
                }
            },
        };
        debug!(source = ?out.source, len = out.text.len(), "extracted response text");
        out
    }
}

/// Integral floats drop the `.0` (`1.0` -> `1`), like JavaScript's `String(n)`.
fn render_other(v: &Value) -> serde_json::Result<String> {
    if let Some(f) = v.as_f64().filter(|_| v.is_f64()) {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 {
            if f == 0.0 {
                return Ok("0".to_string());
            }
            return Ok(format!("{f:.0}"));
        }
    }
    serde_json::to_string(v)
}

fn default_extractor() -> &'static Extractor {
    static DEFAULT: OnceLock<Extractor> = OnceLock::new();
    DEFAULT.get_or_init(Extractor::default)
}

/// Plain text of `raw` using the default field precedence.
pub fn extract_text(raw: Option<&Value>) -> String {
    default_extractor().extract_text(raw)
}

/// Like [`extract_text`], but also reports provenance and any fallback.
pub fn extract(raw: Option<&Value>) -> Extraction {
    default_extractor().extract(raw)
}
