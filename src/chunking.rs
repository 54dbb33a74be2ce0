//! Splitting content into fixed-size word windows ("passages").
//!
//! A word is any maximal run of non-whitespace characters. Consecutive words
//! are grouped into windows of `chunk_size` words and re-joined with a single
//! space, so the original spacing and line breaks are not preserved. The final
//! passage may be shorter than `chunk_size`; nothing is padded or dropped.

use serde::Serialize;

/// Default passage length in words.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// A contiguous word window of the analyzed content.
///
/// Produced by [`chunk_words`]. Indices are 1-based and follow the order of
/// the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Passage {
    /// One-based position of this passage within the content.
    pub index: usize,
    /// Words of the window joined by single spaces.
    pub text: String,
}

impl Passage {
    /// Display label used in tables, charts and CSV exports.
    ///
    /// ```
    /// use passageiq::chunking::Passage;
    ///
    /// let passage = Passage { index: 3, text: "x".to_string() };
    /// assert_eq!(passage.label(), "Passage 3");
    /// ```
    pub fn label(&self) -> String {
        passage_label(self.index)
    }

    /// Number of words in this passage.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Format the label for the passage at `index`.
pub fn passage_label(index: usize) -> String {
    format!("Passage {index}")
}

/// Parse a label produced by [`passage_label`] back into an index.
pub fn parse_passage_label(label: &str) -> Option<usize> {
    label
        .trim()
        .strip_prefix("Passage ")?
        .trim()
        .parse()
        .ok()
        .filter(|&index| index > 0)
}

/// Split text into passages of `chunk_size` words.
///
/// Returns an empty vector for empty or whitespace-only input. A
/// `chunk_size` of zero is treated as one word per passage; callers going
/// through [`crate::analysis::analyze`] get a configuration error instead.
///
/// # Examples
///
/// ```
/// use passageiq::chunking::chunk_words;
///
/// let passages = chunk_words("A B C D E", 2);
/// let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
/// assert_eq!(texts, ["A B", "C D", "E"]);
/// assert_eq!(passages[2].index, 3);
///
/// assert!(chunk_words("   \n\t ", 50).is_empty());
/// ```
pub fn chunk_words(text: &str, chunk_size: usize) -> Vec<Passage> {
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(chunk_size.max(1))
        .enumerate()
        .map(|(i, window)| Passage {
            index: i + 1,
            text: window.join(" "),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn short_text_single_passage() {
        let passages = chunk_words("Hello, world!", DEFAULT_CHUNK_SIZE);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, "Hello, world!");
        assert_eq!(passages[0].index, 1);
    }

    #[test]
    fn remainder_is_kept_as_short_final_passage() {
        let passages = chunk_words("A B C D E", 2);
        assert_eq!(passages.len(), 3);
        assert_eq!(passages[0].text, "A B");
        assert_eq!(passages[1].text, "C D");
        assert_eq!(passages[2].text, "E");
    }

    #[test]
    fn exact_multiple_has_no_trailing_passage() {
        let passages = chunk_words("one two three four", 2);
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[1].text, "three four");
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(chunk_words("", DEFAULT_CHUNK_SIZE).is_empty());
        assert!(chunk_words(" \t\r\n  ", DEFAULT_CHUNK_SIZE).is_empty());
    }

    #[test]
    fn mixed_whitespace_collapses_to_single_spaces() {
        let passages = chunk_words("  alpha\tbeta\n\ngamma   delta ", 3);
        assert_eq!(passages[0].text, "alpha beta gamma");
        assert_eq!(passages[1].text, "delta");
    }

    #[test]
    fn punctuation_and_unicode_stay_inside_words() {
        let passages = chunk_words("café ☕ naïve, 日本語! 🎉", 2);
        assert_eq!(passages[0].text, "café ☕");
        assert_eq!(passages[1].text, "naïve, 日本語!");
        assert_eq!(passages[2].text, "🎉");
    }

    #[test]
    fn zero_chunk_size_degrades_to_single_words() {
        let passages = chunk_words("a b c", 0);
        assert_eq!(passages.len(), 3);
    }

    #[test]
    fn default_chunk_size_splits_long_content() {
        let text = "word ".repeat(120);
        let passages = chunk_words(&text, DEFAULT_CHUNK_SIZE);
        assert_eq!(passages.len(), 3);
        assert_eq!(passages[0].word_count(), 50);
        assert_eq!(passages[1].word_count(), 50);
        assert_eq!(passages[2].word_count(), 20);
    }

    #[test]
    fn labels_roundtrip() {
        assert_eq!(passage_label(12), "Passage 12");
        assert_eq!(parse_passage_label("Passage 12"), Some(12));
        assert_eq!(parse_passage_label("Passage 0"), None);
        assert_eq!(parse_passage_label("Chunk 1"), None);
        assert_eq!(parse_passage_label("Passage x"), None);
    }

    fn words_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-zA-Z0-9.,!?']{1,8}", 0..200)
    }

    proptest! {
        #[test]
        fn passage_count_is_ceiling(words in words_strategy(), size in 1usize..60) {
            let text = words.join(" ");
            let passages = chunk_words(&text, size);
            prop_assert_eq!(passages.len(), words.len().div_ceil(size));
        }

        #[test]
        fn all_but_last_are_full(words in words_strategy(), size in 1usize..60) {
            let passages = chunk_words(&words.join("  \n"), size);
            if let Some((last, full)) = passages.split_last() {
                for passage in full {
                    prop_assert_eq!(passage.word_count(), size);
                }
                prop_assert!(last.word_count() >= 1 && last.word_count() <= size);
            }
        }

        #[test]
        fn passages_concatenate_to_original_words(
            words in words_strategy(),
            size in 1usize..60,
        ) {
            let passages = chunk_words(&words.join("\t"), size);
            let rejoined: Vec<String> = passages
                .iter()
                .flat_map(|p| p.text.split(' ').map(str::to_string))
                .collect();
            prop_assert_eq!(rejoined, words);
        }

        #[test]
        fn indices_are_contiguous_from_one(
            words in words_strategy(),
            size in 1usize..60,
        ) {
            let passages = chunk_words(&words.join(" "), size);
            for (i, passage) in passages.iter().enumerate() {
                prop_assert_eq!(passage.index, i + 1);
            }
        }
    }
}
