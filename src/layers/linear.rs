use rand::Rng;

use crate::core::errors::HanError;
use crate::core::types::{Parameter, Tensor};
use crate::ops::matmul::matmul_rows;

use super::init::{fan_bound, uniform};

/// Affine layer `y = x W + b` with `W` stored as `[in_features, out_features]`
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Parameter,
    bias: Option<Parameter>,
}

impl Linear {
    /// U(-1/sqrt(in), 1/sqrt(in)) initialisation for weight and bias
    pub fn new<R: Rng>(
        name: &str,
        in_features: usize,
        out_features: usize,
        bias: bool,
        rng: &mut R,
    ) -> Result<Self, HanError> {
        let bound = fan_bound(in_features);
        let weight = Tensor::new(
            format!("{name}.weight"),
            vec![in_features, out_features],
            uniform(rng, in_features * out_features, bound),
        )?;
        let bias = if bias {
            Some(Parameter::dense(Tensor::new(
                format!("{name}.bias"),
                vec![out_features],
                uniform(rng, out_features, bound),
            )?))
        } else {
            None
        };
        Ok(Self {
            weight: Parameter::dense(weight),
            bias,
        })
    }

    pub fn in_features(&self) -> usize {
        self.weight.tensor.dimensions()[0]
    }

    pub fn out_features(&self) -> usize {
        self.weight.tensor.dimensions()[1]
    }

    /// Apply to `rows` stacked input vectors
    pub fn forward_rows(&self, input: &[f32], rows: usize) -> Result<Vec<f32>, HanError> {
        let mut output = matmul_rows(input, rows, &self.weight.tensor)?;
        if let Some(bias) = &self.bias {
            let bias = bias.tensor.data();
            if !bias.is_empty() {
                for row in output.chunks_mut(bias.len()) {
                    for (out, &b) in row.iter_mut().zip(bias) {
                        *out += b;
                    }
                }
            }
        }
        Ok(output)
    }

    /// Apply to a `[rows, in_features]` tensor
    pub fn forward(&self, input: &Tensor) -> Result<Tensor, HanError> {
        input.expect_rank("Linear input", 2)?;
        let rows = input.dimensions()[0];
        let output = self.forward_rows(input.data(), rows)?;
        Tensor::new("linear", vec![rows, self.out_features()], output)
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        std::iter::once(&self.weight).chain(self.bias.as_ref()).collect()
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        std::iter::once(&mut self.weight)
            .chain(self.bias.as_mut())
            .collect()
    }
}
