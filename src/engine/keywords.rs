use std::collections::HashMap;

pub const DEFAULT_NGRAM: usize = 2;
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MAX_LENGTH: usize = 100;

/// Turn free text into a short search-query string: the `top_k` most frequent
/// contiguous `n`-token phrases, joined by spaces and truncated to
/// `max_length` chars.
///
/// Tokens are maximal alphanumeric runs (Unicode-aware), case-folded; tokens
/// of 3 chars or fewer are discarded. Ties in frequency keep first-occurrence
/// order. Returns an empty string when fewer than `n` tokens qualify.
pub fn extract_keywords(text: &str, n: usize, top_k: usize, max_length: usize) -> String {
    if n == 0 || top_k == 0 || max_length == 0 {
        return String::new();
    }

    let tokens = qualifying_tokens(text);
    if tokens.len() < n {
        return String::new();
    }

    // phrase -> (count, index of first occurrence)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (idx, window) in tokens.windows(n).enumerate() {
        let phrase = window.join(" ");
        counts.entry(phrase).or_insert((0, idx)).0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

    let joined = ranked
        .into_iter()
        .take(top_k)
        .map(|(phrase, _)| phrase)
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(joined, max_length)
}

/// [`extract_keywords`] with the caller-level fallback: when no `n`-gram can
/// form, retry with single tokens before giving up.
pub fn extract_keywords_or_fallback(
    text: &str,
    n: usize,
    top_k: usize,
    max_length: usize,
) -> String {
    let phrases = extract_keywords(text, n, top_k, max_length);
    if !phrases.is_empty() || n <= 1 {
        return phrases;
    }
    extract_keywords(text, 1, top_k, max_length)
}

fn qualifying_tokens(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| token.chars().count() > 3)
        .map(|token| token.to_lowercase())
        .collect()
}

fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((byte_idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_idx);
    }
    text
}
