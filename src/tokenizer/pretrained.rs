use std::path::Path;

use crate::core::errors::HanError;

use super::Tokenize;

/// Pretrained tokenizer wrapper
///
/// Loads a `tokenizer.json` (WordPiece, BPE, WordLevel, ...) with the
/// `tokenizers` crate and exposes the token strings of each encoding, so the
/// result can be fed to a `Vocabulary` like any other token stream.
#[derive(Clone)]
pub struct PretrainedTokenizer {
    inner: tokenizers::Tokenizer,
}

impl PretrainedTokenizer {
    /// Load a tokenizer from a `tokenizer.json` file
    ///
    /// # Errors
    /// Returns `HanError::Tokenizer` if the file is missing or not a valid
    /// tokenizer definition
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HanError> {
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| HanError::Tokenizer(format!("Failed to load tokenizer: {e}")))?;
        Ok(Self { inner })
    }

    pub fn from_tokenizer(inner: tokenizers::Tokenizer) -> Self {
        Self { inner }
    }
}

impl Tokenize for PretrainedTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, HanError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| HanError::Tokenizer(format!("Failed to encode text: {e}")))?;
        Ok(encoding.get_tokens().to_vec())
    }
}
