/// Matrix multiplication kernels
///
/// Matrix Layout:
/// - All tensors stored in row-major order
/// - Weights are stored as `[in_features, out_features]`
///   We compute: output[i] = sum_j(input[j] * weight[j,i])
///
/// Note: scalar loops only; batched calls just repeat the vector kernel per row

use crate::core::errors::HanError;
use crate::core::types::Tensor;

/// Vector-matrix multiplication: output = input × weight
///
/// # Arguments
/// * `input` - Input vector of length `in_features`
/// * `weight` - Weight matrix `[in_features, out_features]`
/// * `output` - Output buffer (must be pre-allocated with `out_features` slots)
pub fn matmul(input: &[f32], weight: &Tensor, output: &mut [f32]) -> Result<(), HanError> {
    weight.expect_rank("matmul weight", 2)?;
    let in_features = weight.dimensions()[0];
    let out_features = weight.dimensions()[1];

    if input.len() != in_features {
        return Err(HanError::shape("matmul input", &[in_features], &[input.len()]));
    }
    if output.len() != out_features {
        return Err(HanError::shape("matmul output", &[out_features], &[output.len()]));
    }

    let weight_data = weight.data();
    output.fill(0.0);

    // Walk weight rows so the inner loop stays contiguous
    for (in_idx, &x) in input.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        let row = &weight_data[in_idx * out_features..(in_idx + 1) * out_features];
        for (out, &w) in output.iter_mut().zip(row) {
            *out += x * w;
        }
    }

    Ok(())
}

/// Row-wise matmul over a `[rows, in_features]` buffer, producing `[rows, out_features]`
pub fn matmul_rows(input: &[f32], rows: usize, weight: &Tensor) -> Result<Vec<f32>, HanError> {
    weight.expect_rank("matmul weight", 2)?;
    let in_features = weight.dimensions()[0];
    let out_features = weight.dimensions()[1];
    if input.len() != rows * in_features {
        return Err(HanError::shape(
            "matmul_rows input",
            &[rows, in_features],
            &[input.len()],
        ));
    }

    let mut output = vec![0.0; rows * out_features];
    if in_features == 0 || out_features == 0 {
        return Ok(output);
    }
    for (row_in, row_out) in input
        .chunks(in_features)
        .zip(output.chunks_mut(out_features))
    {
        matmul(row_in, weight, row_out)?;
    }
    Ok(output)
}
