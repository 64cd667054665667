/// Tokenizer module for converting raw text to token strings
///
/// Models never see text directly: encoders run a `Tokenize` implementation
/// and hand the tokens to a `Vocabulary`. Two implementations are provided,
/// a rule-based English tokenizer and a wrapper around a pretrained
/// `tokenizer.json` loaded with the `tokenizers` crate.
pub mod basic_english;
pub mod pretrained;

pub use basic_english::{BasicEnglishTokenizer, split_sentences};
pub use pretrained::PretrainedTokenizer;

use crate::core::errors::HanError;

/// Pure text → ordered token sequence capability
pub trait Tokenize {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, HanError>;
}
