use serde::{Deserialize, Serialize};

/// A media source attached to the user's theater (a direct file URI or a
/// provider-backed entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSource {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub source: Option<String>,
    pub service: Option<String>,
    pub selected: Option<bool>,
}

/// Metadata the backend extracted from a raw source URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedSource {
    pub title: Option<String>,
    pub source: Option<String>,
    pub service: Option<String>,
}
