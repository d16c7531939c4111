//! Stopword sets. Both lists are data, extendable through `[text]` config;
//! nothing else in the workspace hard-codes a stopword.

use std::collections::HashSet;

/// English stopwords dropped from keyword and theme extraction.
const ENGLISH: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "did", "do", "does",
    "for", "from", "had", "has", "have", "her", "his", "how", "if", "in", "into", "is", "it",
    "its", "more", "not", "of", "on", "one", "or", "other", "our", "out", "said", "should",
    "that", "the", "their", "then", "there", "they", "this", "to", "use", "was", "we", "were",
    "what", "when", "which", "will", "with", "would", "you", "your",
];

/// CJK n-grams too common to score in the bigram/trigram search path.
const CJK: &[&str] = &[
    "的", "了", "是", "在", "我", "有", "和", "就", "不", "人", "都", "一", "一个", "这个",
    "我们", "你们", "他们", "什么", "时候", "可以", "这样", "那样", "因为", "所以", "如果",
    "的话", "です", "ます", "した", "する", "いる", "ある", "これ", "それ", "あれ",
];

/// The configured stopword sets used by keyword extraction, theme
/// inference, and the CJK search path.
#[derive(Debug, Clone)]
pub struct Stopwords {
    english: HashSet<String>,
    cjk: HashSet<String>,
}

impl Stopwords {
    /// Built-in sets plus caller extensions from config.
    pub fn with_extra(extra_english: &[String], extra_cjk: &[String]) -> Self {
        let mut s = Self::default();
        s.english.extend(extra_english.iter().map(|w| w.to_lowercase()));
        s.cjk.extend(extra_cjk.iter().cloned());
        s
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.english.contains(token)
    }

    pub fn is_cjk_stopword(&self, ngram: &str) -> bool {
        self.cjk.contains(ngram)
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self {
            english: ENGLISH.iter().map(|w| w.to_string()).collect(),
            cjk: CJK.iter().map(|w| w.to_string()).collect(),
        }
    }
}
