use std::collections::HashMap;

use log::info;

use crate::core::config::{TokenOrdering, VocabularyConfig};
use crate::core::errors::HanError;
use crate::core::types::PaddedBatch;
use crate::ops::pack::pad_sequence;

/// Placeholder token stored at the reserved padding index
pub const PAD_TOKEN: &str = "<pad>";

/// Immutable token ↔ index mapping
///
/// The padding index is reserved and never handed to a real token. Unknown
/// tokens map to the default index, which is the padding index unless
/// configured otherwise. `len()` counts the padding slot, so it can be used
/// directly as the number of embedding rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    stoi: HashMap<String, u32>,
    itos: Vec<String>,
    pad_index: u32,
    default_index: u32,
}

impl Vocabulary {
    /// Build from an iterable of token sequences
    pub fn build<I, S, T>(sentences: I, config: &VocabularyConfig) -> Result<Self, HanError>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut builder = VocabularyBuilder::new(config.clone());
        for sentence in sentences {
            builder.add_sentence(sentence);
        }
        builder.build()
    }

    /// Look up a token, falling back to the default index for unseen tokens
    pub fn lookup(&self, token: &str) -> u32 {
        self.stoi.get(token).copied().unwrap_or(self.default_index)
    }

    pub fn encode<T: AsRef<str>>(&self, tokens: &[T]) -> Vec<u32> {
        tokens.iter().map(|t| self.lookup(t.as_ref())).collect()
    }

    /// Look up every token of every sentence and right-pad to the longest one
    ///
    /// The matrix has shape `(max_len, batch)`; `lengths` keeps the true lengths.
    pub fn create_matrix<S, T>(&self, sentences: &[S]) -> PaddedBatch
    where
        S: AsRef<[T]>,
        T: AsRef<str>,
    {
        let encoded: Vec<Vec<u32>> = sentences
            .iter()
            .map(|sentence| self.encode(sentence.as_ref()))
            .collect();
        pad_sequence(&encoded, self.pad_index)
    }

    /// Number of indices, including the padding slot
    pub fn len(&self) -> usize {
        self.itos.len()
    }

    /// True when no real token was kept; the padding slot still counts in `len()`
    pub fn is_empty(&self) -> bool {
        self.stoi.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.stoi.contains_key(token)
    }

    /// Token stored at `index`
    pub fn token(&self, index: u32) -> Option<&str> {
        self.itos.get(index as usize).map(String::as_str)
    }

    /// Real tokens and their indices; the padding slot is not included
    pub fn tokens(&self) -> &HashMap<String, u32> {
        &self.stoi
    }

    pub fn pad_index(&self) -> u32 {
        self.pad_index
    }

    pub fn default_index(&self) -> u32 {
        self.default_index
    }
}

/// Streaming counterpart of `Vocabulary::build`, fed one sentence at a time
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    config: VocabularyConfig,
    /// token -> (count, first position)
    counts: HashMap<String, (usize, usize)>,
}

impl VocabularyBuilder {
    pub fn new(config: VocabularyConfig) -> Self {
        Self {
            config,
            counts: HashMap::new(),
        }
    }

    pub fn add_sentence<S, T>(&mut self, sentence: S) -> &mut Self
    where
        S: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for token in sentence {
            let seen = self.counts.len();
            let token = token.as_ref();
            match self.counts.get_mut(token) {
                Some((count, _)) => *count += 1,
                None => {
                    self.counts.insert(token.to_string(), (1, seen));
                }
            }
        }
        self
    }

    /// Assign indices and freeze the vocabulary
    ///
    /// # Errors
    /// `IndexOutOfRange` when the padding or default index lies beyond the last slot
    pub fn build(self) -> Result<Vocabulary, HanError> {
        let VocabularyConfig {
            pad_index,
            default_index,
            ordering,
            min_frequency,
            max_tokens,
        } = self.config;

        let mut entries: Vec<(String, usize, usize)> = self
            .counts
            .into_iter()
            .filter(|(_, (count, _))| *count >= min_frequency)
            .map(|(token, (count, first))| (token, count, first))
            .collect();

        match ordering {
            TokenOrdering::Frequency => {
                entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            }
            TokenOrdering::FirstSeen => entries.sort_by_key(|entry| entry.2),
        }
        if let Some(max_tokens) = max_tokens {
            entries.truncate(max_tokens);
        }

        if pad_index as usize > entries.len() {
            return Err(HanError::IndexOutOfRange {
                index: pad_index as usize,
                size: entries.len() + 1,
            });
        }

        let mut itos: Vec<String> = entries.into_iter().map(|(token, _, _)| token).collect();
        itos.insert(pad_index as usize, PAD_TOKEN.to_string());

        let stoi: HashMap<String, u32> = itos
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != pad_index as usize)
            .map(|(index, token)| (token.clone(), index as u32))
            .collect();

        let default_index = default_index.unwrap_or(pad_index);
        if default_index as usize >= itos.len() {
            return Err(HanError::IndexOutOfRange {
                index: default_index as usize,
                size: itos.len(),
            });
        }
        info!(
            "Built vocabulary: {} tokens, pad index {}, default index {}",
            stoi.len(),
            pad_index,
            default_index
        );

        Ok(Vocabulary {
            stoi,
            itos,
            pad_index,
            default_index,
        })
    }
}
