use crate::core::errors::HanError;

use super::Tokenize;

/// Rule-based English tokenizer
///
/// Lower-cases the text, drops double quotes, `;`, `:` and `<br />` tags,
/// splits `'`, `.`, `,`, `(`, `)`, `!`, `?` off into their own tokens and
/// finally splits on whitespace. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEnglishTokenizer;

impl BasicEnglishTokenizer {
    pub fn new() -> Self {
        Self
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase().replace("<br />", " ");
        let mut spaced = String::with_capacity(lowered.len() * 2);
        for c in lowered.chars() {
            match c {
                '\'' | '.' | ',' | '(' | ')' | '!' | '?' => {
                    spaced.push(' ');
                    spaced.push(c);
                    spaced.push(' ');
                }
                '"' => {}
                ';' | ':' => spaced.push(' '),
                _ => spaced.push(c),
            }
        }
        spaced.split_whitespace().map(str::to_string).collect()
    }
}

impl Tokenize for BasicEnglishTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, HanError> {
        Ok(self.split(text))
    }
}

/// Split raw text into sentences after runs of `.`, `!` or `?`
///
/// Sentences are trimmed and empty pieces are dropped; trailing text without
/// a terminator forms the last sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut terminated = false;

    for c in text.chars() {
        let is_terminator = matches!(c, '.' | '!' | '?');
        if terminated && !is_terminator {
            push_trimmed(&mut sentences, &current);
            current.clear();
            terminated = false;
        }
        current.push(c);
        terminated |= is_terminator;
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, sentence: &str) {
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_english_splits_punctuation() {
        let tokenizer = BasicEnglishTokenizer::new();
        let tokens = tokenizer.tokenize("Hello, World! It's (very) \"nice\".").unwrap();
        assert_eq!(
            tokens,
            vec!["hello", ",", "world", "!", "it", "'", "s", "(", "very", ")", "nice", "."]
        );
    }

    #[test]
    fn test_basic_english_drops_markup_and_separators() {
        let tokenizer = BasicEnglishTokenizer::new();
        assert_eq!(tokenizer.split("a;b:c<br />D"), vec!["a", "b", "c", "d"]);
        assert!(tokenizer.split("   ").is_empty());
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Stocks rose. Why?  Nobody knows... Or do they");
        assert_eq!(
            sentences,
            vec!["Stocks rose.", "Why?", "Nobody knows...", "Or do they"]
        );
        assert!(split_sentences("  ").is_empty());
        assert_eq!(split_sentences("One."), vec!["One."]);
    }
}
