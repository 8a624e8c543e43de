use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplytextConfig {
    #[serde(default)]
    pub precedence: Precedence,
}

/// Field lookup order used by the extractor.
///
/// An empty list disables that stage entirely (e.g. `choice_paths = []`
/// never looks inside `choices`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Precedence {
    /// Fields tried on a JSON object decoded from a string input.
    #[serde(default = "default_json_string_fields")]
    pub json_string_fields: Vec<String>,
    /// Fields tried on a structured object input.
    #[serde(default = "default_object_fields")]
    pub object_fields: Vec<String>,
    /// Dotted paths tried on `choices[0]`.
    #[serde(default = "default_choice_paths")]
    pub choice_paths: Vec<String>,
}

impl Default for Precedence {
    fn default() -> Self {
        Self {
            json_string_fields: default_json_string_fields(),
            object_fields: default_object_fields(),
            choice_paths: default_choice_paths(),
        }
    }
}

fn default_json_string_fields() -> Vec<String> {
    vec!["text".into(), "content".into(), "message".into()]
}

fn default_object_fields() -> Vec<String> {
    vec!["text".into(), "content".into()]
}

fn default_choice_paths() -> Vec<String> {
    vec!["text".into(), "message.content".into()]
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join("replytext.toml")
}

pub fn load_from_dir(root: &Path) -> Result<Option<ReplytextConfig>, String> {
    let p = config_path(root);
    if !p.exists() {
        return Ok(None);
    }
    load_from_path(&p).map(Some)
}

pub fn load_from_path(p: &Path) -> Result<ReplytextConfig, String> {
    let txt = std::fs::read_to_string(p).map_err(|e| format!("read {}: {e}", p.display()))?;
    toml::from_str(&txt).map_err(|e| format!("parse {}: {e}", p.display()))
}
