use crate::core::errors::HanError;
use crate::tokenizer::{BasicEnglishTokenizer, Tokenize};
use crate::vocabulary::Vocabulary;

/// Encode texts to word index sequences
pub trait SentenceEncode {
    /// One sequence per text, in input order
    fn forward<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>, HanError>;
}

/// Tokenizes each text independently and looks every token up in the vocabulary
#[derive(Debug, Clone)]
pub struct SentenceEncoder<T = BasicEnglishTokenizer> {
    vocabulary: Vocabulary,
    tokenizer: T,
}

impl SentenceEncoder<BasicEnglishTokenizer> {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self::with_tokenizer(vocabulary, BasicEnglishTokenizer::new())
    }
}

impl<T: Tokenize> SentenceEncoder<T> {
    pub fn with_tokenizer(vocabulary: Vocabulary, tokenizer: T) -> Self {
        Self {
            vocabulary,
            tokenizer,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u32>, HanError> {
        let tokens = self.tokenizer.tokenize(text)?;
        Ok(self.vocabulary.encode(&tokens))
    }
}

impl<T: Tokenize> SentenceEncode for SentenceEncoder<T> {
    fn forward<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>, HanError> {
        texts.iter().map(|text| self.encode(text.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::VocabularyConfig;

    fn encoder() -> SentenceEncoder {
        let tokenizer = BasicEnglishTokenizer::new();
        let corpus = ["The stock market fell.", "The market rallied!"]
            .iter()
            .map(|text| tokenizer.split(text))
            .collect::<Vec<_>>();
        SentenceEncoder::new(Vocabulary::build(corpus, &VocabularyConfig::default()).unwrap())
    }

    #[test]
    fn test_forward_preserves_order_and_lengths() {
        let sut = encoder();
        let encoded = sut.forward(&["The market fell.", "Rallied"]).unwrap();
        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[0].len(), 4);
        assert_eq!(encoded[1].len(), 1);

        let vocabulary = sut.vocabulary();
        assert_eq!(encoded[0][0], vocabulary.lookup("the"));
        assert_eq!(encoded[0][1], vocabulary.lookup("market"));
        assert_eq!(encoded[1][0], vocabulary.lookup("rallied"));
    }

    #[test]
    fn test_texts_are_independent() {
        let sut = encoder();
        let together = sut.forward(&["stock fell", "market"]).unwrap();
        let alone = sut.forward(&["market"]).unwrap();
        assert_eq!(together[1], alone[0]);
    }

    #[test]
    fn test_unknown_words_use_default_index() {
        let sut = encoder();
        let encoded = sut.forward(&["zebra"]).unwrap();
        assert_eq!(encoded, vec![vec![sut.vocabulary().default_index()]]);
    }
}
