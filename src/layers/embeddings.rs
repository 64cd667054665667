use log::debug;
use rand::Rng;

use crate::core::errors::HanError;
use crate::core::types::{IndexMatrix, Parameter, Partition, Tensor};

use super::init::normal;

/// Embedding lookup table for converting word indices to dense vectors
///
/// # Architecture Notes
/// - Shape: [num_embeddings, embedding_dim], row `i` belongs to word index `i`
/// - Lookup is a simple row selection: `embedding = weights[index]`
/// - One row is reserved for padding. A freshly initialised table keeps that row
///   at zero; a pretrained table keeps whatever vector it was given
/// - The table is tagged `Partition::Sparse` when configured for sparse updates
#[derive(Debug, Clone)]
pub struct Embedding {
    weight: Parameter,
    padding_idx: u32,
}

impl Embedding {
    /// Random N(0, 1) table with a zeroed padding row
    pub fn new<R: Rng>(
        num_embeddings: usize,
        embedding_dim: usize,
        padding_idx: u32,
        sparse: bool,
        rng: &mut R,
    ) -> Result<Self, HanError> {
        check_padding_idx(padding_idx, num_embeddings)?;

        let mut data = normal(rng, num_embeddings * embedding_dim);
        let row_start = padding_idx as usize * embedding_dim;
        data[row_start..row_start + embedding_dim].fill(0.0);

        let weight = Tensor::new("embedding.weight", vec![num_embeddings, embedding_dim], data)?;
        Ok(Self {
            weight: tag(weight, sparse, true),
            padding_idx,
        })
    }

    /// Wrap a precomputed `[num_embeddings, embedding_dim]` matrix
    ///
    /// With `freeze` the table is marked non-trainable.
    pub fn from_pretrained(
        embeddings: Tensor,
        freeze: bool,
        padding_idx: u32,
        sparse: bool,
    ) -> Result<Self, HanError> {
        embeddings.expect_rank("pretrained embeddings", 2)?;
        check_padding_idx(padding_idx, embeddings.dimensions()[0])?;

        let weight = embeddings.with_name("embedding.weight");
        debug!(
            "Loaded pretrained embeddings {:?} (freeze: {}, sparse: {})",
            weight.dimensions(),
            freeze,
            sparse
        );
        Ok(Self {
            weight: tag(weight, sparse, !freeze),
            padding_idx,
        })
    }

    pub fn num_embeddings(&self) -> usize {
        self.weight.tensor.dimensions()[0]
    }

    pub fn embedding_dim(&self) -> usize {
        self.weight.tensor.dimensions()[1]
    }

    pub fn padding_idx(&self) -> u32 {
        self.padding_idx
    }

    pub fn is_sparse(&self) -> bool {
        self.weight.partition == Partition::Sparse
    }

    /// Lookup embeddings for a sequence of word indices
    ///
    /// # Returns
    /// Flat buffer of `indices.len() * embedding_dim` floats, one row per index
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` if an index is outside the table
    pub fn lookup(&self, indices: &[u32]) -> Result<Vec<f32>, HanError> {
        let embedding_dim = self.embedding_dim();
        let num_embeddings = self.num_embeddings();
        let table = self.weight.tensor.data();

        let mut embeddings = Vec::with_capacity(indices.len() * embedding_dim);
        for &index in indices {
            let index = index as usize;
            if index >= num_embeddings {
                return Err(HanError::IndexOutOfRange {
                    index,
                    size: num_embeddings,
                });
            }
            let row_start = index * embedding_dim;
            embeddings.extend_from_slice(&table[row_start..row_start + embedding_dim]);
        }
        Ok(embeddings)
    }

    /// Embed a `[max_len, batch]` index matrix into `[max_len, batch, embedding_dim]`
    pub fn forward(&self, matrix: &IndexMatrix) -> Result<Tensor, HanError> {
        let (max_len, batch) = matrix.shape();
        let data = self.lookup(matrix.data())?;
        Tensor::new("embedded", vec![max_len, batch, self.embedding_dim()], data)
    }

    pub fn parameter(&self) -> &Parameter {
        &self.weight
    }

    pub fn parameter_mut(&mut self) -> &mut Parameter {
        &mut self.weight
    }
}

fn check_padding_idx(padding_idx: u32, num_embeddings: usize) -> Result<(), HanError> {
    if padding_idx as usize >= num_embeddings {
        return Err(HanError::IndexOutOfRange {
            index: padding_idx as usize,
            size: num_embeddings,
        });
    }
    Ok(())
}

fn tag(tensor: Tensor, sparse: bool, trainable: bool) -> Parameter {
    Parameter {
        tensor,
        partition: if sparse { Partition::Sparse } else { Partition::Dense },
        trainable,
    }
}
