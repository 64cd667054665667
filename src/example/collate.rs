use crate::core::errors::HanError;
use crate::encode::{DocumentEncode, SentenceEncode};

/// Turn a batch of `(label, text)` pairs into `(targets, model inputs)`
///
/// Dataset labels start at 1 (AG News convention); targets start at 0.
pub trait Collate {
    type Inputs;

    fn collate<S: AsRef<str>>(&self, batch: &[(usize, S)]) -> Result<(Vec<usize>, Self::Inputs), HanError>;
}

/// Collate for `SentenceClassifier`: one index sequence per text
#[derive(Debug, Clone)]
pub struct CollateSentenceFn<E> {
    encoder: E,
}

impl<E: SentenceEncode> CollateSentenceFn<E> {
    pub fn new(encoder: E) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

impl<E: SentenceEncode> Collate for CollateSentenceFn<E> {
    type Inputs = Vec<Vec<u32>>;

    fn collate<S: AsRef<str>>(&self, batch: &[(usize, S)]) -> Result<(Vec<usize>, Self::Inputs), HanError> {
        let targets = targets(batch)?;
        let texts: Vec<&str> = batch.iter().map(|(_, text)| text.as_ref()).collect();
        Ok((targets, self.encoder.forward(&texts)?))
    }
}

/// Collate for `DocumentClassifier`: texts are split into sentences first
#[derive(Debug, Clone)]
pub struct CollateDocumentFn<E> {
    encoder: E,
}

impl<E: DocumentEncode> CollateDocumentFn<E> {
    pub fn new(encoder: E) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

impl<E: DocumentEncode> Collate for CollateDocumentFn<E> {
    type Inputs = Vec<Vec<Vec<u32>>>;

    fn collate<S: AsRef<str>>(&self, batch: &[(usize, S)]) -> Result<(Vec<usize>, Self::Inputs), HanError> {
        let targets = targets(batch)?;
        let texts: Vec<&str> = batch.iter().map(|(_, text)| text.as_ref()).collect();
        Ok((targets, self.encoder.forward_texts(&texts)?))
    }
}

fn targets<S>(batch: &[(usize, S)]) -> Result<Vec<usize>, HanError> {
    batch
        .iter()
        .map(|&(label, _)| label.checked_sub(1).ok_or(HanError::InvalidLabel(label)))
        .collect()
}
