//! Bidirectional gated recurrent unit over packed sequences
//!
//! Gate equations (per step, per direction):
//!   r  = sigmoid(x W_ir + b_ir + h W_hr + b_hr)
//!   z  = sigmoid(x W_iz + b_iz + h W_hz + b_hz)
//!   n  = tanh(x W_in + b_in + r * (h W_hn + b_hn))
//!   h' = (1 - z) * n + z * h
//!
//! Weights are stored `[in, 3H]` with the gate blocks in r, z, n order.
//! Each sequence starts from a zero hidden state in both directions; the
//! backward direction starts at the sequence's own last valid step, never at
//! padding.

use log::debug;
use rand::Rng;

use crate::core::errors::HanError;
use crate::core::types::{Parameter, Tensor};
use crate::ops::activation::sigmoid;
use crate::ops::matmul::matmul_rows;
use crate::ops::pack::PackedSequence;

use super::init::{fan_bound, uniform};

#[derive(Debug, Clone)]
struct GruDirection {
    weight_ih: Parameter,
    weight_hh: Parameter,
    bias_ih: Parameter,
    bias_hh: Parameter,
}

impl GruDirection {
    fn new<R: Rng>(
        suffix: &str,
        input_size: usize,
        hidden_size: usize,
        rng: &mut R,
    ) -> Result<Self, HanError> {
        let bound = fan_bound(hidden_size);
        let gates = 3 * hidden_size;
        let mut param = |name: &str, dims: Vec<usize>| -> Result<Parameter, HanError> {
            let len = dims.iter().product();
            Ok(Parameter::dense(Tensor::new(
                format!("gru.{name}.{suffix}"),
                dims,
                uniform(&mut *rng, len, bound),
            )?))
        };
        Ok(Self {
            weight_ih: param("weight_ih", vec![input_size, gates])?,
            weight_hh: param("weight_hh", vec![hidden_size, gates])?,
            bias_ih: param("bias_ih", vec![gates])?,
            bias_hh: param("bias_hh", vec![gates])?,
        })
    }

    /// Advance `active` hidden states by one step
    fn step(&self, x: &[f32], hidden: &mut [f32], active: usize) -> Result<(), HanError> {
        let h_size = self.weight_hh.tensor.dimensions()[0];
        let gates = 3 * h_size;
        let gi = matmul_rows(x, active, &self.weight_ih.tensor)?;
        let gh = matmul_rows(&hidden[..active * h_size], active, &self.weight_hh.tensor)?;
        let b_ih = self.bias_ih.tensor.data();
        let b_hh = self.bias_hh.tensor.data();

        for slot in 0..active {
            let gi = &gi[slot * gates..(slot + 1) * gates];
            let gh = &gh[slot * gates..(slot + 1) * gates];
            let h = &mut hidden[slot * h_size..(slot + 1) * h_size];
            for j in 0..h_size {
                let r = sigmoid(gi[j] + b_ih[j] + gh[j] + b_hh[j]);
                let z = sigmoid(gi[h_size + j] + b_ih[h_size + j] + gh[h_size + j] + b_hh[h_size + j]);
                let n = (gi[2 * h_size + j] + b_ih[2 * h_size + j]
                    + r * (gh[2 * h_size + j] + b_hh[2 * h_size + j]))
                    .tanh();
                h[j] = (1.0 - z) * n + z * h[j];
            }
        }
        Ok(())
    }

    fn parameters(&self) -> [&Parameter; 4] {
        [&self.weight_ih, &self.weight_hh, &self.bias_ih, &self.bias_hh]
    }

    fn parameters_mut(&mut self) -> [&mut Parameter; 4] {
        [
            &mut self.weight_ih,
            &mut self.weight_hh,
            &mut self.bias_ih,
            &mut self.bias_hh,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Gru {
    input_size: usize,
    hidden_size: usize,
    forward: GruDirection,
    backward: GruDirection,
}

impl Gru {
    pub fn new<R: Rng>(input_size: usize, hidden_size: usize, rng: &mut R) -> Result<Self, HanError> {
        Ok(Self {
            input_size,
            hidden_size,
            forward: GruDirection::new("forward", input_size, hidden_size, rng)?,
            backward: GruDirection::new("backward", input_size, hidden_size, rng)?,
        })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Width of each output step, forward and backward states concatenated
    pub fn output_size(&self) -> usize {
        2 * self.hidden_size
    }

    /// Run both directions over a packed batch
    ///
    /// Returns a packed sequence with the same structure whose rows are
    /// `[forward_h ‖ backward_h]`.
    pub fn forward(&self, packed: &PackedSequence) -> Result<PackedSequence, HanError> {
        if packed.feature_dim() != self.input_size {
            return Err(HanError::shape(
                "Gru input",
                &[self.input_size],
                &[packed.feature_dim()],
            ));
        }
        let h_size = self.hidden_size;
        let out_size = self.output_size();
        let steps = packed.max_len();
        debug!(
            "GRU over {} sequences, {} steps, {} rows",
            packed.batch_size(),
            steps,
            packed.num_rows()
        );

        let mut output = vec![0.0; packed.num_rows() * out_size];

        let mut hidden = vec![0.0; packed.batch_size() * h_size];
        for t in 0..steps {
            let active = packed.batch_sizes()[t];
            self.forward.step(packed.step(t), &mut hidden, active)?;
            write_states(&mut output, packed.step_offset(t), &hidden, active, h_size, out_size, 0);
        }

        // Slots that join late are still at zero when their last step comes up
        let mut hidden = vec![0.0; packed.batch_size() * h_size];
        for t in (0..steps).rev() {
            let active = packed.batch_sizes()[t];
            self.backward.step(packed.step(t), &mut hidden, active)?;
            write_states(&mut output, packed.step_offset(t), &hidden, active, h_size, out_size, h_size);
        }

        packed.with_data(output, out_size)
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        self.forward
            .parameters()
            .into_iter()
            .chain(self.backward.parameters())
            .collect()
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        let (forward, backward) = (&mut self.forward, &mut self.backward);
        forward
            .parameters_mut()
            .into_iter()
            .chain(backward.parameters_mut())
            .collect()
    }
}

fn write_states(
    output: &mut [f32],
    first_row: usize,
    hidden: &[f32],
    active: usize,
    h_size: usize,
    out_size: usize,
    column: usize,
) {
    for slot in 0..active {
        let start = (first_row + slot) * out_size + column;
        output[start..start + h_size].copy_from_slice(&hidden[slot * h_size..(slot + 1) * h_size]);
    }
}
