//! Frequency-based keyword ranking.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::stopwords::is_stop_word;

/// Anything that is neither a word character nor whitespace.
static RE_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Return up to `limit` keywords, most frequent first.
///
/// Tokens must be purely alphabetic, longer than two characters and not a stop
/// word. Ties keep the order in which the tokens first appear in the text.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    if text.is_empty() || limit == 0 {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    let cleaned = RE_PUNCTUATION.replace_all(&lowered, " ");

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for token in cleaned.split_whitespace().filter(|t| qualifies(t)) {
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            first_seen.push(token);
        }
        *count += 1;
    }

    // Stable sort: equal counts stay in first-seen order.
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    first_seen
        .into_iter()
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn qualifies(token: &str) -> bool {
    token.chars().count() > 2 && token.chars().all(char::is_alphabetic) && !is_stop_word(token)
}
