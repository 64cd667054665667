use crate::core::errors::HanError;
use crate::core::types::Tensor;

use super::softmax::log_softmax;

/// Mean negative log-likelihood of `targets` under raw `logits` `[batch, classes]`
///
/// Expects train-mode classifier output (logits, not probabilities).
pub fn cross_entropy(logits: &Tensor, targets: &[usize]) -> Result<f32, HanError> {
    logits.expect_rank("cross_entropy logits", 2)?;
    let (batch, classes) = (logits.dimensions()[0], logits.dimensions()[1]);
    if targets.len() != batch {
        return Err(HanError::shape("cross_entropy targets", &[batch], &[targets.len()]));
    }
    if batch == 0 {
        return Err(HanError::EmptyBatch);
    }
    if classes == 0 {
        return Err(HanError::shape("cross_entropy logits", &[batch, 1], &[batch, 0]));
    }

    let mut log_probs = vec![0.0; classes];
    let mut total = 0.0;
    for (row, &target) in logits.data().chunks(classes).zip(targets) {
        if target >= classes {
            return Err(HanError::IndexOutOfRange {
                index: target,
                size: classes,
            });
        }
        log_softmax(row, &mut log_probs)?;
        total -= log_probs[target];
    }
    Ok(total / batch as f32)
}
