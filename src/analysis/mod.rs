//! Text heuristics applied to extracted text: keywords, summary and
//! content-type classification.

pub mod classify;
pub mod keywords;
pub mod stopwords;
pub mod summary;

pub use classify::{ContentType, classify};
pub use keywords::extract_keywords;
pub use summary::summarize;
