use std::collections::HashSet;

/// Decides whether two post topics are close enough to compete for attention.
pub trait TopicSimilarity: Send + Sync {
    fn is_similar(&self, a: &str, b: &str) -> bool;
}

/// Topics match when they are identical (ignoring case) or share enough
/// significant words.
#[derive(Debug, Clone)]
pub struct WordOverlap {
    pub min_shared_words: usize,
    /// Words must be strictly longer than this to count.
    pub min_word_len: usize,
}

impl Default for WordOverlap {
    fn default() -> Self {
        Self {
            min_shared_words: 2,
            min_word_len: 3,
        }
    }
}

impl WordOverlap {
    pub fn significant_words(&self, topic: &str) -> HashSet<String> {
        topic
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .filter(|word| word.chars().count() > self.min_word_len)
            .collect()
    }

    pub fn shared_words(&self, a: &str, b: &str) -> usize {
        let left = self.significant_words(a);
        let right = self.significant_words(b);
        left.intersection(&right).count()
    }
}

impl TopicSimilarity for WordOverlap {
    fn is_similar(&self, a: &str, b: &str) -> bool {
        if a.trim().to_lowercase() == b.trim().to_lowercase() {
            return true;
        }
        self.shared_words(a, b) >= self.min_shared_words
    }
}
