use rand::Rng;

use crate::core::errors::HanError;
use crate::core::types::{Parameter, Tensor};
use crate::ops::activation::tanh_inplace;
use crate::ops::softmax::masked_softmax;

use super::linear::Linear;

/// Attention pooling over the step axis of a padded `[steps, batch, input_dim]` batch
///
/// For every valid step: `u = tanh(x W + b)`, `score = u · c` with a learned
/// context vector `c`. Scores are normalised with a softmax over the first
/// `lengths[b]` steps of each column, and the pooled vector is `Σ α_t u_t`,
/// so its width is `output_dim`. Padded steps get exactly zero weight.
#[derive(Debug, Clone)]
pub struct AttentionModel {
    dense: Linear,
    context: Linear,
}

impl AttentionModel {
    pub fn new<R: Rng>(
        name: &str,
        input_dim: usize,
        output_dim: usize,
        rng: &mut R,
    ) -> Result<Self, HanError> {
        Ok(Self {
            dense: Linear::new(&format!("{name}.dense"), input_dim, output_dim, true, rng)?,
            context: Linear::new(&format!("{name}.context"), output_dim, 1, false, rng)?,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.dense.in_features()
    }

    pub fn output_dim(&self) -> usize {
        self.dense.out_features()
    }

    /// Returns `(pooled [batch, output_dim], weights [steps, batch])`
    pub fn forward(&self, x: &Tensor, lengths: &[usize]) -> Result<(Tensor, Tensor), HanError> {
        x.expect_rank("AttentionModel input", 3)?;
        let dims = x.dimensions();
        let (steps, batch, features) = (dims[0], dims[1], dims[2]);
        if features != self.input_dim() {
            return Err(HanError::shape("AttentionModel input", &[self.input_dim()], &[features]));
        }
        if lengths.len() != batch {
            return Err(HanError::shape("AttentionModel lengths", &[batch], &[lengths.len()]));
        }

        let out_dim = self.output_dim();
        let rows = steps * batch;
        let mut projected = self.dense.forward_rows(x.data(), rows)?;
        tanh_inplace(&mut projected);
        let scores = self.context.forward_rows(&projected, rows)?;

        let mut weights = Tensor::zeros("attention", vec![steps, batch]);
        let mut pooled = Tensor::zeros("pooled", vec![batch, out_dim]);
        let mut column_scores = vec![0.0; steps];
        let mut column_weights = vec![0.0; steps];

        for (b, &length) in lengths.iter().enumerate() {
            if length == 0 {
                return Err(HanError::EmptySequence { position: b });
            }
            for t in 0..steps {
                column_scores[t] = scores[t * batch + b];
            }
            masked_softmax(&column_scores, length, &mut column_weights)?;

            let target = &mut pooled.data_mut()[b * out_dim..(b + 1) * out_dim];
            for t in 0..length {
                let alpha = column_weights[t];
                weights.data_mut()[t * batch + b] = alpha;
                let u = &projected[(t * batch + b) * out_dim..(t * batch + b + 1) * out_dim];
                for (acc, &v) in target.iter_mut().zip(u) {
                    *acc += alpha * v;
                }
            }
        }

        Ok((pooled, weights))
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        let mut parameters = self.dense.parameters();
        parameters.extend(self.context.parameters());
        parameters
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        let mut parameters = self.dense.parameters_mut();
        parameters.extend(self.context.parameters_mut());
        parameters
    }
}
