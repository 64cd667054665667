use crate::core::errors::HanError;
use crate::core::types::Tensor;

pub fn softmax(input: &[f32], output: &mut [f32]) -> Result<(), HanError> {
    if input.len() != output.len() {
        return Err(HanError::shape("softmax", &[input.len()], &[output.len()]));
    }
    if input.is_empty() {
        return Err(HanError::EmptySequence { position: 0 });
    }

    // Find max value for numerical stability
    let max = input.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum_exp = 0.0;
    for (out, &x) in output.iter_mut().zip(input) {
        *out = (x - max).exp();
        sum_exp += *out;
    }
    for out in output.iter_mut() {
        *out /= sum_exp;
    }

    Ok(())
}

/// Softmax over the first `valid` entries; the rest of `output` is zeroed
pub fn masked_softmax(input: &[f32], valid: usize, output: &mut [f32]) -> Result<(), HanError> {
    if input.len() != output.len() {
        return Err(HanError::shape("masked_softmax", &[input.len()], &[output.len()]));
    }
    if valid > input.len() {
        return Err(HanError::IndexOutOfRange {
            index: valid,
            size: input.len() + 1,
        });
    }
    softmax(&input[..valid], &mut output[..valid])?;
    output[valid..].fill(0.0);
    Ok(())
}

/// Softmax over the last axis of a `[rows, classes]` tensor
pub fn softmax_rows(logits: &Tensor) -> Result<Tensor, HanError> {
    logits.expect_rank("softmax_rows", 2)?;
    let classes = logits.dimensions()[1];
    let mut probabilities = Tensor::zeros("probabilities", logits.dimensions().to_vec());
    if logits.num_elements() == 0 {
        return Ok(probabilities);
    }
    for (row, out) in logits
        .data()
        .chunks(classes)
        .zip(probabilities.data_mut().chunks_mut(classes))
    {
        softmax(row, out)?;
    }
    Ok(probabilities)
}

pub fn log_softmax(input: &[f32], output: &mut [f32]) -> Result<(), HanError> {
    if input.len() != output.len() {
        return Err(HanError::shape("log_softmax", &[input.len()], &[output.len()]));
    }
    if input.is_empty() {
        return Err(HanError::EmptySequence { position: 0 });
    }

    let max = input.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let log_sum = input.iter().map(|&x| (x - max).exp()).sum::<f32>().ln();
    for (out, &x) in output.iter_mut().zip(input) {
        *out = x - max - log_sum;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_softmax_test() {
        let input = vec![0.0, 1.0];
        let mut output = vec![0.0; input.len()];

        softmax(&input, &mut output).unwrap();

        let sum: f32 = output.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "Softmax outputs should sum to 1.0");

        assert!((output[0] - 0.26894142).abs() < 1e-5);
        assert!((output[1] - 0.73105858).abs() < 1e-5);
    }

    #[test]
    fn softmax_large_inputs_stay_finite() {
        let input = vec![1000.0, 1000.0, 999.0];
        let mut output = vec![0.0; 3];
        softmax(&input, &mut output).unwrap();
        assert!(output.iter().all(|x| x.is_finite()));
        assert!((output.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn softmax_empty_is_error() {
        let mut output: Vec<f32> = vec![];
        assert!(softmax(&[], &mut output).is_err());
    }

    #[test]
    fn masked_softmax_zeroes_tail() {
        let input = vec![0.3, 2.0, 50.0, -1.0];
        let mut output = vec![9.0; 4];
        masked_softmax(&input, 2, &mut output).unwrap();
        assert!((output[0] + output[1] - 1.0).abs() < 1e-5);
        assert_eq!(output[2], 0.0);
        assert_eq!(output[3], 0.0);
    }

    #[test]
    fn softmax_rows_normalises_each_row() {
        let logits = Tensor::new("logits", vec![2, 3], vec![1.0, 2.0, 3.0, -5.0, 0.0, 5.0]).unwrap();
        let probabilities = softmax_rows(&logits).unwrap();
        for sum in probabilities.row_sums() {
            assert!((sum - 1.0).abs() < 1e-5);
        }
        assert!(probabilities.get2(1, 2) > 0.99);
    }

    #[test]
    fn log_softmax_matches_softmax() {
        let input = vec![0.5, -1.0, 2.0];
        let mut probs = vec![0.0; 3];
        let mut logs = vec![0.0; 3];
        softmax(&input, &mut probs).unwrap();
        log_softmax(&input, &mut logs).unwrap();
        for (p, l) in probs.iter().zip(&logs) {
            assert!((p.ln() - l).abs() < 1e-5);
        }
    }
}
