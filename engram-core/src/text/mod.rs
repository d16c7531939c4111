//! Mixed-script text utilities: tokenization, CJK n-grams, keyword and
//! summary extraction, and the word-level Jaccard used by dedup.

pub mod stopwords;

pub use stopwords::Stopwords;

use std::collections::HashMap;

use crate::constants::{KEYWORD_LIMIT, SUMMARY_MAX_CHARS};

/// Whether a character belongs to the CJK ranges the search layer treats
/// as ideographic: unified ideographs (+ext A), kana, and hangul.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{AC00}'..='\u{D7AF}'
    )
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// ASCII identifier-form tokens, lowercased. CJK text contributes nothing
/// here; it goes through [`cjk_runs`] instead.
pub fn ascii_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_word_char(c) {
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Maximal contiguous runs of CJK characters.
pub fn cjk_runs(text: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_cjk(c) {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Expand a CJK run into its bigrams and trigrams. Runs shorter than two
/// characters yield nothing.
pub fn cjk_ngrams(run: &str) -> Vec<String> {
    let chars: Vec<char> = run.chars().collect();
    let mut grams = Vec::new();
    for n in [2usize, 3] {
        if chars.len() < n {
            continue;
        }
        for window in chars.windows(n) {
            grams.push(window.iter().collect());
        }
    }
    grams
}

/// Tokens for frequency counting: ASCII identifier tokens plus whole CJK
/// runs, in document order.
fn frequency_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_cjk = false;
    for c in text.chars() {
        let word = is_word_char(c);
        let cjk = is_cjk(c);
        if word || cjk {
            if !current.is_empty() && cjk != current_cjk {
                tokens.push(std::mem::take(&mut current));
            }
            current_cjk = cjk;
            current.extend(c.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Rank tokens by frequency (ties broken by first occurrence), dropping
/// stopwords and anything at or under `min_len` characters.
fn top_tokens(text: &str, stopwords: &Stopwords, min_len: usize, limit: usize) -> Vec<String> {
    let tokens = frequency_tokens(text);
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.chars().count() <= min_len || stopwords.is_stopword(token) {
            continue;
        }
        let entry = counts.entry(token.as_str()).or_insert((0, i));
        entry.0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> =
        counts.into_iter().map(|(t, (n, i))| (t, n, i)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(limit);
    ranked.into_iter().map(|(t, _, _)| t.to_string()).collect()
}

/// The comma-joined keyword field: top-10 content tokens by frequency,
/// stopwords and single-character tokens excluded.
pub fn keywords(text: &str, stopwords: &Stopwords) -> String {
    top_tokens(text, stopwords, 1, KEYWORD_LIMIT).join(",")
}

/// Theme tokens for cluster naming: the three most frequent tokens longer
/// than two characters. Empty when nothing qualifies.
pub fn theme_tokens(text: &str, stopwords: &Stopwords) -> Vec<String> {
    top_tokens(text, stopwords, 2, 3)
}

/// Leading prefix of `content`, at most 100 characters, `...` when cut.
pub fn summarize(content: &str) -> String {
    let mut chars = content.chars();
    let prefix: String = chars.by_ref().take(SUMMARY_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{prefix}...")
    } else {
        prefix
    }
}

/// Word-level Jaccard similarity over whitespace tokens. Two empty texts
/// are identical (1.0); one empty text matches nothing (0.0).
pub fn jaccard(a: &str, b: &str) -> f64 {
    let set_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let set_b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}
