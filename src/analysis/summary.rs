//! Positional extractive summary: first, middle and last sentence.

use std::sync::LazyLock;

use regex::Regex;

/// Returned when there is no text at all.
pub const NO_TEXT_FOR_SUMMARY: &str = "No text available for summary";

/// Returned when no sentence survives the length filter.
pub const NO_MEANINGFUL_SENTENCES: &str = "No meaningful sentences found";

/// Sentences of this many characters or fewer are dropped.
const MIN_SENTENCE_CHARS: usize = 10;

static RE_PAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[Page \d+ .*?\]").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "a.m", "p.m",
    "inc", "ltd", "co", "corp", "fig", "al", "approx", "dept", "jan", "feb", "mar", "apr", "jun",
    "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Summarise `text` in at most `max_sentences` sentences.
///
/// When the text has no more qualifying sentences than requested, all of them
/// are returned. Otherwise the first, middle (`len / 2`, only with more than
/// two sentences) and last sentences are picked, in that order, and the
/// selection is cut to `max_sentences`.
pub fn summarize(text: &str, max_sentences: usize) -> String {
    if text.is_empty() {
        return NO_TEXT_FOR_SUMMARY.to_string();
    }

    let without_markers = RE_PAGE_MARKER.replace_all(text, "");
    let normalized = RE_WHITESPACE.replace_all(&without_markers, " ");
    let sentences: Vec<String> = split_sentences(normalized.trim())
        .into_iter()
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect();

    if sentences.is_empty() {
        return NO_MEANINGFUL_SENTENCES.to_string();
    }
    if sentences.len() <= max_sentences {
        return sentences.join(" ");
    }

    let n = sentences.len();
    let mut picked = vec![&sentences[0]];
    if n > 2 {
        picked.push(&sentences[n / 2]);
    }
    if n > 1 {
        picked.push(&sentences[n - 1]);
    }
    picked.truncate(max_sentences);
    picked
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split on `.`, `!` or `?` followed by whitespace, keeping closing quotes and
/// brackets with their sentence and not splitting after known abbreviations
/// or single-letter initials.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            // Absorb runs like "?!" or "..." and closing punctuation.
            while i + 1 < chars.len()
                && matches!(
                    chars[i + 1],
                    '.' | '!' | '?' | '"' | '\'' | ')' | ']' | '”' | '’'
                )
            {
                i += 1;
                current.push(chars[i]);
            }
            let at_boundary = i + 1 >= chars.len() || chars[i + 1].is_whitespace();
            if at_boundary && !(ch == '.' && ends_with_abbreviation(&current)) {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }
        i += 1;
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Whether the text ends in "<abbrev>." or a single-letter initial like "J.".
fn ends_with_abbreviation(current: &str) -> bool {
    let Some(stem) = current.strip_suffix('.') else {
        return false;
    };
    let word = stem
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .to_lowercase();
    if word.chars().count() == 1 && word.chars().all(char::is_alphabetic) {
        return true;
    }
    ABBREVIATIONS.contains(&word.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_returns_all_sentences() {
        let text = "Hello world. This is a report. Findings are positive.";
        assert_eq!(summarize(text, 3), text);
    }

    #[test]
    fn picks_first_middle_last() {
        let text = "Sentence number one. Sentence number two. Sentence number three. \
                    Sentence number four. Sentence number five.";
        assert_eq!(
            summarize(text, 3),
            "Sentence number one. Sentence number three. Sentence number five."
        );
    }

    #[test]
    fn selection_is_capped() {
        let text = "Sentence number one. Sentence number two. Sentence number three. \
                    Sentence number four.";
        assert_eq!(summarize(text, 1), "Sentence number one.");
        assert_eq!(
            summarize(text, 2),
            "Sentence number one. Sentence number three."
        );
    }

    #[test]
    fn strips_page_markers_and_whitespace() {
        let text = "\n[Page 1 Text]\nThe  first   page\nsays hello.\n[Page 2 OCR Text]\nThe second page agrees.";
        assert_eq!(
            summarize(text, 3),
            "The first page says hello. The second page agrees."
        );
    }

    #[test]
    fn drops_short_sentences() {
        assert_eq!(summarize("Hi. Ok. Yes.", 3), NO_MEANINGFUL_SENTENCES);
        assert_eq!(
            summarize("Hi. This one is long enough.", 3),
            "This one is long enough."
        );
    }

    #[test]
    fn empty_text() {
        assert_eq!(summarize("", 3), NO_TEXT_FOR_SUMMARY);
        assert_eq!(summarize("   ", 3), NO_MEANINGFUL_SENTENCES);
    }

    #[test]
    fn abbreviations_do_not_split() {
        let sentences = split_sentences("Dr. Smith met J. Doe at 5 p.m. on Monday. They talked.");
        assert_eq!(
            sentences,
            vec!["Dr. Smith met J. Doe at 5 p.m. on Monday.", "They talked."]
        );
    }

    #[test]
    fn closing_quotes_stay_with_sentence() {
        let sentences = split_sentences("He said \"stop.\" Then he left!");
        assert_eq!(sentences, vec!["He said \"stop.\"", "Then he left!"]);
    }

    #[test]
    fn absorbs_punctuation_runs() {
        let sentences = split_sentences("Really?! (See below.) It’s ‘done.’ End...");
        assert_eq!(sentences, vec!["Really?!", "(See below.)", "It’s ‘done.’", "End..."]);
    }
}
