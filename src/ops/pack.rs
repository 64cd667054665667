/// Padding and packing of variable-length sequence batches
///
/// Layout:
/// - Padded batches are time-major: `[max_len, batch, features]`
/// - Packed batches keep only the valid steps. Sequences are stably sorted by
///   descending length and rows are stored step by step, so step `t` holds the
///   `batch_sizes[t]` sequences that are still running at `t`
///
/// Recurrent layers walk the packed rows, which keeps pad embeddings out of the
/// hidden state and skips the wasted work on padding.

use crate::core::errors::HanError;
use crate::core::types::{IndexMatrix, PaddedBatch, Tensor};

/// Right-pad index sequences to the longest one, producing a `[max_len, batch]` matrix
pub fn pad_sequence<S: AsRef<[u32]>>(sequences: &[S], padding_value: u32) -> PaddedBatch {
    let lengths: Vec<usize> = sequences.iter().map(|s| s.as_ref().len()).collect();
    let max_len = lengths.iter().copied().max().unwrap_or(0);
    let batch = sequences.len();

    let mut data = vec![padding_value; max_len * batch];
    for (column, sequence) in sequences.iter().enumerate() {
        for (step, &index) in sequence.as_ref().iter().enumerate() {
            data[step * batch + column] = index;
        }
    }

    PaddedBatch {
        matrix: IndexMatrix::from_parts(max_len, batch, data),
        lengths,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackedSequence {
    data: Vec<f32>,
    feature_dim: usize,
    batch_sizes: Vec<usize>,
    /// Start row of each step inside `data`
    offsets: Vec<usize>,
    sorted_indices: Vec<usize>,
    unsorted_indices: Vec<usize>,
}

impl PackedSequence {
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// Number of active sequences at each step
    pub fn batch_sizes(&self) -> &[usize] {
        &self.batch_sizes
    }

    /// Original batch position of the sequence stored at sorted slot `i`
    pub fn sorted_indices(&self) -> &[usize] {
        &self.sorted_indices
    }

    /// Sorted slot of the sequence at original batch position `i`
    pub fn unsorted_indices(&self) -> &[usize] {
        &self.unsorted_indices
    }

    pub fn max_len(&self) -> usize {
        self.batch_sizes.len()
    }

    pub fn batch_size(&self) -> usize {
        self.sorted_indices.len()
    }

    /// Total number of valid steps across the batch
    pub fn num_rows(&self) -> usize {
        self.batch_sizes.iter().sum()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Index of the first row of step `t`
    pub fn step_offset(&self, t: usize) -> usize {
        self.offsets[t]
    }

    /// Rows for step `t`, one per active sequence in sorted order
    pub fn step(&self, t: usize) -> &[f32] {
        let start = self.offsets[t] * self.feature_dim;
        &self.data[start..start + self.batch_sizes[t] * self.feature_dim]
    }

    /// True lengths in original batch order
    pub fn lengths(&self) -> Vec<usize> {
        let mut sorted_lengths = vec![0; self.batch_size()];
        for &active in &self.batch_sizes {
            for length in sorted_lengths.iter_mut().take(active) {
                *length += 1;
            }
        }
        self.unsorted_indices
            .iter()
            .map(|&slot| sorted_lengths[slot])
            .collect()
    }

    /// Same packing structure, new per-row features (e.g. recurrent outputs)
    pub fn with_data(&self, data: Vec<f32>, feature_dim: usize) -> Result<Self, HanError> {
        let rows = self.num_rows();
        if data.len() != rows * feature_dim {
            return Err(HanError::shape(
                "PackedSequence::with_data",
                &[rows, feature_dim],
                &[data.len()],
            ));
        }
        Ok(Self {
            data,
            feature_dim,
            batch_sizes: self.batch_sizes.clone(),
            offsets: self.offsets.clone(),
            sorted_indices: self.sorted_indices.clone(),
            unsorted_indices: self.unsorted_indices.clone(),
        })
    }
}

/// Pack a padded `[max_len, batch, features]` tensor using the true lengths
///
/// Lengths may come in any order. Every length must be in `1..=max_len`.
pub fn pack_padded_sequence(padded: &Tensor, lengths: &[usize]) -> Result<PackedSequence, HanError> {
    padded.expect_rank("pack_padded_sequence", 3)?;
    let dims = padded.dimensions();
    let (steps, batch, feature_dim) = (dims[0], dims[1], dims[2]);

    if lengths.len() != batch {
        return Err(HanError::shape("pack_padded_sequence lengths", &[batch], &[lengths.len()]));
    }
    if batch == 0 {
        return Err(HanError::EmptyBatch);
    }
    for (position, &length) in lengths.iter().enumerate() {
        if length == 0 {
            return Err(HanError::EmptySequence { position });
        }
        if length > steps {
            return Err(HanError::IndexOutOfRange {
                index: length,
                size: steps + 1,
            });
        }
    }

    let mut sorted_indices: Vec<usize> = (0..batch).collect();
    sorted_indices.sort_by(|&a, &b| lengths[b].cmp(&lengths[a]));
    let mut unsorted_indices = vec![0; batch];
    for (slot, &original) in sorted_indices.iter().enumerate() {
        unsorted_indices[original] = slot;
    }

    let max_len = lengths[sorted_indices[0]];
    let batch_sizes: Vec<usize> = (0..max_len)
        .map(|t| lengths.iter().filter(|&&length| length > t).count())
        .collect();

    let offsets: Vec<usize> = batch_sizes
        .iter()
        .scan(0, |rows, &active| {
            let start = *rows;
            *rows += active;
            Some(start)
        })
        .collect();

    let mut data = Vec::with_capacity(batch_sizes.iter().sum::<usize>() * feature_dim);
    for (t, &active) in batch_sizes.iter().enumerate() {
        for &original in sorted_indices.iter().take(active) {
            data.extend_from_slice(padded.vector3(t, original));
        }
    }

    Ok(PackedSequence {
        data,
        feature_dim,
        batch_sizes,
        offsets,
        sorted_indices,
        unsorted_indices,
    })
}

/// Undo packing: `[max_len, batch, features]` in original batch order, zeros at padding
pub fn pad_packed_sequence(packed: &PackedSequence) -> Tensor {
    let max_len = packed.max_len();
    let batch = packed.batch_size();
    let feature_dim = packed.feature_dim();

    let mut padded = Tensor::zeros("unpacked", vec![max_len, batch, feature_dim]);
    for t in 0..max_len {
        let rows = packed.step(t);
        for slot in 0..packed.batch_sizes()[t] {
            let original = packed.sorted_indices()[slot];
            padded
                .vector3_mut(t, original)
                .copy_from_slice(&rows[slot * feature_dim..(slot + 1) * feature_dim]);
        }
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded_from(sequences: &[Vec<f32>]) -> (Tensor, Vec<usize>) {
        let lengths: Vec<usize> = sequences.iter().map(Vec::len).collect();
        let max_len = *lengths.iter().max().unwrap();
        let mut t = Tensor::zeros("padded", vec![max_len, sequences.len(), 1]);
        for (b, seq) in sequences.iter().enumerate() {
            for (step, &v) in seq.iter().enumerate() {
                t.vector3_mut(step, b)[0] = v;
            }
        }
        (t, lengths)
    }

    #[test]
    fn test_pad_sequence_shape_and_padding() {
        let batch = pad_sequence(&[vec![4u32, 5], vec![6, 7, 8], vec![9]], 0);
        assert_eq!(batch.matrix.shape(), (3, 3));
        assert_eq!(batch.lengths, vec![2, 3, 1]);
        assert_eq!(batch.matrix.column(0), vec![4, 5, 0]);
        assert_eq!(batch.matrix.column(1), vec![6, 7, 8]);
        assert_eq!(batch.matrix.column(2), vec![9, 0, 0]);
    }

    #[test]
    fn test_pack_unsorted_lengths() {
        let (padded, lengths) = padded_from(&[vec![1.0], vec![2.0, 3.0, 4.0], vec![5.0, 6.0]]);
        let packed = pack_padded_sequence(&padded, &lengths).unwrap();

        assert_eq!(packed.batch_sizes(), &[3, 2, 1]);
        assert_eq!(packed.sorted_indices(), &[1, 2, 0]);
        assert_eq!(packed.unsorted_indices(), &[2, 0, 1]);
        assert_eq!(packed.data(), &[2.0, 5.0, 1.0, 3.0, 6.0, 4.0]);
        assert_eq!(packed.step(1), &[3.0, 6.0]);
        assert_eq!(packed.lengths(), lengths);
    }

    #[test]
    fn test_pack_then_pad_restores_order_and_zeroes_padding() {
        let (mut padded, lengths) = padded_from(&[vec![1.0, 2.0], vec![3.0, 4.0, 5.0]]);
        // garbage in the pad slot must not survive the round trip
        padded.vector3_mut(2, 0)[0] = 99.0;
        let packed = pack_padded_sequence(&padded, &lengths).unwrap();
        let restored = pad_packed_sequence(&packed);
        assert_eq!(restored.dimensions(), &[3, 2, 1]);
        assert_eq!(restored.data(), &[1.0, 3.0, 2.0, 4.0, 0.0, 5.0]);
    }

    #[test]
    fn test_pack_rejects_bad_lengths() {
        let (padded, _) = padded_from(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert!(matches!(
            pack_padded_sequence(&padded, &[2, 0]),
            Err(HanError::EmptySequence { position: 1 })
        ));
        assert!(pack_padded_sequence(&padded, &[3, 1]).is_err());
        assert!(pack_padded_sequence(&padded, &[2]).is_err());
    }

    #[test]
    fn test_with_data_keeps_structure() {
        let (padded, lengths) = padded_from(&[vec![1.0, 2.0], vec![3.0]]);
        let packed = pack_padded_sequence(&padded, &lengths).unwrap();
        let wider = packed.with_data(vec![0.5; 6], 2).unwrap();
        assert_eq!(wider.feature_dim(), 2);
        assert_eq!(wider.step(0).len(), 4);
        assert!(packed.with_data(vec![0.0; 5], 2).is_err());
    }
}
