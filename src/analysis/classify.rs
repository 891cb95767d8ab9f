//! Keyword-bucket document classification.
//!
//! Buckets are checked in a fixed order and the first bucket with any
//! indicator present in the lowercased text wins. Matching is by substring,
//! so "terms" also matches inside "midterms".

use serde::{Deserialize, Serialize};

/// Coarse document category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "Legal Document")]
    Legal,
    #[serde(rename = "Academic Document")]
    Academic,
    #[serde(rename = "Report")]
    Report,
    #[serde(rename = "Resume/CV")]
    Resume,
    #[serde(rename = "Financial Document")]
    Financial,
    #[serde(rename = "General Document")]
    General,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Legal => "Legal Document",
            Self::Academic => "Academic Document",
            Self::Report => "Report",
            Self::Resume => "Resume/CV",
            Self::Financial => "Financial Document",
            Self::General => "General Document",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Indicator buckets in priority order.
const BUCKETS: &[(ContentType, &[&str])] = &[
    (
        ContentType::Legal,
        &["contract", "agreement", "clause", "terms", "conditions", "legal", "whereas"],
    ),
    (
        ContentType::Academic,
        &["abstract", "introduction", "methodology", "results", "discussion", "references"],
    ),
    (
        ContentType::Report,
        &["report", "analysis", "findings", "conclusion", "executive summary", "methodology"],
    ),
    (
        ContentType::Resume,
        &["resume", "cv", "curriculum vitae", "experience", "education", "skills"],
    ),
    (
        ContentType::Financial,
        &["invoice", "receipt", "payment", "amount", "total", "tax", "billing"],
    ),
];

/// Classify `text` into a [`ContentType`].
///
/// Empty text is [`ContentType::Unknown`]; text matching no bucket is
/// [`ContentType::General`].
pub fn classify(text: &str) -> ContentType {
    if text.is_empty() {
        return ContentType::Unknown;
    }

    let lowered = text.to_lowercase();
    BUCKETS
        .iter()
        .find(|(_, indicators)| indicators.iter().any(|kw| lowered.contains(kw)))
        .map(|(content_type, _)| *content_type)
        .unwrap_or(ContentType::General)
}
