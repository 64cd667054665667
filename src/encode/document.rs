use log::warn;

use crate::core::errors::HanError;
use crate::tokenizer::{BasicEnglishTokenizer, Tokenize, split_sentences};
use crate::vocabulary::Vocabulary;

use super::sentence::{SentenceEncode, SentenceEncoder};

/// Encode documents (ordered sentences) to per-sentence index sequences
pub trait DocumentEncode {
    fn forward<S: AsRef<str>>(&self, documents: &[Vec<S>]) -> Result<Vec<Vec<Vec<u32>>>, HanError>;

    /// Split raw document texts into sentences first
    fn forward_texts<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<Vec<u32>>>, HanError> {
        let documents: Vec<Vec<String>> = texts
            .iter()
            .map(|text| split_sentences(text.as_ref()))
            .collect();
        self.forward(&documents)
    }
}

/// `SentenceEncoder` lifted to documents
///
/// Sentences that tokenize to nothing are dropped, since a sentence without
/// words has no place in the recurrent encoder.
#[derive(Debug, Clone)]
pub struct DocumentEncoder<T = BasicEnglishTokenizer> {
    sentence_encoder: SentenceEncoder<T>,
}

impl DocumentEncoder<BasicEnglishTokenizer> {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            sentence_encoder: SentenceEncoder::new(vocabulary),
        }
    }
}

impl<T: Tokenize> DocumentEncoder<T> {
    pub fn with_tokenizer(vocabulary: Vocabulary, tokenizer: T) -> Self {
        Self {
            sentence_encoder: SentenceEncoder::with_tokenizer(vocabulary, tokenizer),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.sentence_encoder.vocabulary()
    }
}

impl<T: Tokenize> DocumentEncode for DocumentEncoder<T> {
    fn forward<S: AsRef<str>>(&self, documents: &[Vec<S>]) -> Result<Vec<Vec<Vec<u32>>>, HanError> {
        documents
            .iter()
            .enumerate()
            .map(|(position, sentences)| {
                let encoded = self.sentence_encoder.forward(sentences)?;
                let total = encoded.len();
                let kept: Vec<Vec<u32>> = encoded.into_iter().filter(|s| !s.is_empty()).collect();
                if kept.len() < total {
                    warn!(
                        "Document {}: dropped {} sentence(s) without tokens",
                        position,
                        total - kept.len()
                    );
                }
                Ok(kept)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::VocabularyConfig;

    fn encoder() -> DocumentEncoder {
        let tokenizer = BasicEnglishTokenizer::new();
        let corpus: Vec<Vec<String>> = ["Rain is coming.", "Bring an umbrella!"]
            .iter()
            .map(|s| tokenizer.split(s))
            .collect();
        DocumentEncoder::new(Vocabulary::build(corpus, &VocabularyConfig::default()).unwrap())
    }

    #[test]
    fn test_forward_keeps_sentence_order() {
        let sut = encoder();
        let documents = vec![
            vec!["Rain is coming.", "Bring an umbrella!"],
            vec!["Umbrella."],
        ];
        let encoded = sut.forward(&documents).unwrap();
        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[0].len(), 2);
        assert_eq!(encoded[0][0].len(), 4);
        assert_eq!(encoded[0][1][0], sut.vocabulary().lookup("bring"));
        assert_eq!(encoded[1], vec![vec![sut.vocabulary().lookup("umbrella"), sut.vocabulary().lookup(".")]]);
    }

    #[test]
    fn test_empty_sentences_are_dropped() {
        let sut = encoder();
        let encoded = sut.forward(&[vec!["", "rain", "   "]]).unwrap();
        assert_eq!(encoded, vec![vec![vec![sut.vocabulary().lookup("rain")]]]);
    }

    #[test]
    fn test_forward_texts_splits_sentences() {
        let sut = encoder();
        let encoded = sut.forward_texts(&["Rain is coming. Bring an umbrella!"]).unwrap();
        assert_eq!(encoded[0].len(), 2);
        assert_eq!(encoded[0][1].len(), 4);
    }
}
