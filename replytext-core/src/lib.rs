pub mod config;
pub mod evaluate;
pub mod extract;
pub mod json_extract;
pub mod raw;

pub use config::{Precedence, ReplytextConfig};
pub use evaluate::{evaluate_url, EvaluateRequest, EVALUATE_PATH};
pub use extract::{extract, extract_text, Extraction, Extractor, Fallback, TextSource};
pub use raw::RawResponse;
