use thiserror::Error;

/// Errors raised by kernels, layers and models.
///
/// Unknown tokens are not errors: vocabulary lookups fall back to the
/// default index instead.
#[derive(Debug, Error)]
pub enum HanError {
    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Index {index} is out of range [0, {size})")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Batch is empty")]
    EmptyBatch,

    #[error("Sequence at position {position} is empty")]
    EmptySequence { position: usize },

    #[error("Label {0} is invalid, labels start at 1")]
    InvalidLabel(usize),

    #[error("Tokenizer failure: {0}")]
    Tokenizer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HanError {
    pub(crate) fn shape(context: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        HanError::ShapeMismatch {
            context,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}
