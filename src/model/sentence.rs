use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::{PretrainedConfig, SentenceModelConfig};
use crate::core::errors::HanError;
use crate::core::types::{Parameter, Tensor, partition_parameters};
use crate::layers::attention::AttentionModel;
use crate::layers::embeddings::Embedding;
use crate::layers::gru::Gru;
use crate::ops::pack::{pack_padded_sequence, pad_packed_sequence, pad_sequence};

/// Word-level half of the Hierarchical Attention Network
///
/// Transforms word index sequences into sentence vectors:
/// embed → pack → bidirectional GRU → unpack → attention over word positions.
/// Build it through `SentenceModelFactory`.
#[derive(Debug, Clone)]
pub struct SentenceModel {
    embedding: Embedding,
    gru: Gru,
    attention: AttentionModel,
}

impl SentenceModel {
    fn new<R: Rng>(
        embedding: Embedding,
        gru_hidden_size: usize,
        sentence_dim: usize,
        rng: &mut R,
    ) -> Result<Self, HanError> {
        let gru = Gru::new(embedding.embedding_dim(), gru_hidden_size, rng)?;
        let attention = AttentionModel::new("word_attention", gru.output_size(), sentence_dim, rng)?;
        Ok(Self {
            embedding,
            gru,
            attention,
        })
    }

    /// Calculate sentence vectors and word attention
    ///
    /// `x` holds one index sequence per sentence, in any length order.
    ///
    /// # Returns
    /// * sentence vectors, shape `[x.len(), sentence_dim]`
    /// * attention, shape `[longest sentence, x.len()]`, zero past each
    ///   sentence's length
    ///
    /// # Errors
    /// `EmptyBatch` for no sentences, `EmptySequence` for a sentence without
    /// words, `IndexOutOfRange` for an index outside the embedding table
    pub fn forward<S: AsRef<[u32]>>(&self, x: &[S]) -> Result<(Tensor, Tensor), HanError> {
        if x.is_empty() {
            return Err(HanError::EmptyBatch);
        }
        // padded.matrix is (longest length, batch size)
        let padded = pad_sequence(x, self.embedding.padding_idx());
        let (max_len, batch) = padded.matrix.shape();
        debug!("SentenceModel forward: {} sentences, longest {}", batch, max_len);

        // (longest length, batch size, embedding dim)
        let embedded = self.embedding.forward(&padded.matrix)?;
        let packed = pack_padded_sequence(&embedded, &padded.lengths)?;
        let encoded = self.gru.forward(&packed)?;
        // Attention works on the padded layout, masked by the true lengths
        let unpacked = pad_packed_sequence(&encoded);
        self.attention.forward(&unpacked, &padded.lengths)
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    pub fn gru_hidden_size(&self) -> usize {
        self.gru.hidden_size()
    }

    /// Width of the produced sentence vectors
    pub fn sentence_dim(&self) -> usize {
        self.attention.output_dim()
    }

    /// All parameters, embedding table first
    pub fn parameters(&self) -> Vec<&Parameter> {
        let mut parameters = vec![self.embedding.parameter()];
        parameters.extend(self.gru.parameters());
        parameters.extend(self.attention.parameters());
        parameters
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        let mut parameters = vec![self.embedding.parameter_mut()];
        parameters.extend(self.gru.parameters_mut());
        parameters.extend(self.attention.parameters_mut());
        parameters
    }

    /// `(sparse, dense)` parameters; the sparse side is empty unless the
    /// embedding table was built sparse
    pub fn sparse_dense_parameters(&self) -> (Vec<&Parameter>, Vec<&Parameter>) {
        partition_parameters(self.parameters())
    }
}

/// Create `SentenceModel`s from configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceModelFactory;

impl SentenceModelFactory {
    pub fn new() -> Self {
        Self
    }

    /// Randomly initialised model; `vocabulary_size` counts the padding index
    pub fn create(&self, vocabulary_size: usize, config: &SentenceModelConfig) -> Result<SentenceModel, HanError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        self.create_with_rng(vocabulary_size, config, &mut rng)
    }

    pub fn create_with_rng<R: Rng>(
        &self,
        vocabulary_size: usize,
        config: &SentenceModelConfig,
        rng: &mut R,
    ) -> Result<SentenceModel, HanError> {
        let embedding = Embedding::new(
            vocabulary_size,
            config.embedding_dim,
            config.padding_idx,
            config.embedding_sparse,
            rng,
        )?;
        let model = SentenceModel::new(embedding, config.gru_hidden_size, config.sentence_dim, rng)?;
        log_created(&model);
        Ok(model)
    }

    /// Model on top of pretrained word vectors `[vocabulary_size, embedding_dim]`
    pub fn use_pretrained(&self, embeddings: Tensor, config: &PretrainedConfig) -> Result<SentenceModel, HanError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        self.use_pretrained_with_rng(embeddings, config, &mut rng)
    }

    pub fn use_pretrained_with_rng<R: Rng>(
        &self,
        embeddings: Tensor,
        config: &PretrainedConfig,
        rng: &mut R,
    ) -> Result<SentenceModel, HanError> {
        let embedding = Embedding::from_pretrained(embeddings, config.freeze, config.padding_idx, config.sparse)?;
        let model = SentenceModel::new(embedding, config.gru_hidden_size, config.sentence_dim, rng)?;
        log_created(&model);
        Ok(model)
    }
}

fn log_created(model: &SentenceModel) {
    let (sparse, dense) = model.sparse_dense_parameters();
    info!(
        "Created SentenceModel: vocabulary {}, embedding dim {}, GRU hidden {}, sentence dim {} ({} sparse / {} dense parameters)",
        model.embedding.num_embeddings(),
        model.embedding.embedding_dim(),
        model.gru_hidden_size(),
        model.sentence_dim(),
        sparse.len(),
        dense.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(sparse: bool) -> SentenceModelConfig {
        SentenceModelConfig {
            embedding_dim: 6,
            embedding_sparse: sparse,
            gru_hidden_size: 4,
            sentence_dim: 5,
            seed: 3,
            ..SentenceModelConfig::default()
        }
    }

    fn batch() -> Vec<Vec<u32>> {
        vec![vec![1, 2, 3], vec![4], vec![5, 6, 7, 8, 9], vec![2, 2]]
    }

    #[test]
    fn test_forward_shapes() {
        let model = SentenceModelFactory::new().create(10, &small_config(true)).unwrap();
        let (sentences, attention) = model.forward(&batch()).unwrap();
        assert_eq!(sentences.dimensions(), &[4, 5]);
        assert_eq!(attention.dimensions(), &[5, 4]);
    }

    #[test]
    fn test_attention_masks_padding() {
        let model = SentenceModelFactory::new().create(10, &small_config(true)).unwrap();
        let x = batch();
        let (_, attention) = model.forward(&x).unwrap();
        for (b, sentence) in x.iter().enumerate() {
            let column: Vec<f32> = (0..5).map(|t| attention.get2(t, b)).collect();
            assert!((column.iter().sum::<f32>() - 1.0).abs() < 1e-5);
            assert!(column[sentence.len()..].iter().all(|&w| w == 0.0));
        }
    }

    #[test]
    fn test_forward_is_deterministic() {
        let model = SentenceModelFactory::new().create(10, &small_config(true)).unwrap();
        let (a, alpha_a) = model.forward(&batch()).unwrap();
        let (b, alpha_b) = model.forward(&batch()).unwrap();
        assert_eq!(a, b);
        assert_eq!(alpha_a, alpha_b);

        let again = SentenceModelFactory::new().create(10, &small_config(true)).unwrap();
        assert_eq!(again.forward(&batch()).unwrap().0, a);
    }

    #[test]
    fn test_sentence_vector_independent_of_batch() {
        let model = SentenceModelFactory::new().create(10, &small_config(false)).unwrap();
        let (batched, _) = model.forward(&batch()).unwrap();
        let (alone, _) = model.forward(&[vec![4u32]]).unwrap();
        for (a, b) in batched.row(1).unwrap().iter().zip(alone.row(0).unwrap()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_forward_errors() {
        let model = SentenceModelFactory::new().create(10, &small_config(true)).unwrap();
        let empty: Vec<Vec<u32>> = vec![];
        assert!(matches!(model.forward(&empty), Err(HanError::EmptyBatch)));
        assert!(matches!(
            model.forward(&[vec![1u32], vec![]]),
            Err(HanError::EmptySequence { position: 1 })
        ));
        assert!(matches!(
            model.forward(&[vec![10u32]]),
            Err(HanError::IndexOutOfRange { index: 10, size: 10 })
        ));
    }

    #[test]
    fn test_sparse_dense_partition() {
        for sparse in [true, false] {
            let model = SentenceModelFactory::new().create(10, &small_config(sparse)).unwrap();
            let all = model.parameters();
            let (s, d) = model.sparse_dense_parameters();
            assert_eq!(s.len() + d.len(), all.len());

            let names = |ps: &[&Parameter]| ps.iter().map(|p| p.name().to_string()).collect::<Vec<_>>();
            let mut union = names(&s);
            union.extend(names(&d));
            union.sort();
            let mut expected = names(&all);
            expected.sort();
            assert_eq!(union, expected);
            union.dedup();
            assert_eq!(union.len(), all.len());

            let in_sparse = s.iter().filter(|p| p.name() == "embedding.weight").count();
            let in_dense = d.iter().filter(|p| p.name() == "embedding.weight").count();
            assert_eq!(in_sparse + in_dense, 1);
            assert_eq!(in_sparse == 1, sparse);
        }
    }

    #[test]
    fn test_use_pretrained() {
        let vectors = Tensor::new("glove", vec![4, 3], (0..12).map(|v| v as f32 / 12.0).collect()).unwrap();
        let config = PretrainedConfig {
            gru_hidden_size: 2,
            sentence_dim: 3,
            ..PretrainedConfig::default()
        };
        let model = SentenceModelFactory::new().use_pretrained(vectors.clone(), &config).unwrap();
        assert_eq!(model.embedding().embedding_dim(), 3);
        assert_eq!(model.embedding().parameter().tensor.data(), vectors.data());
        assert!(!model.embedding().parameter().trainable);

        let (sentences, _) = model.forward(&[vec![1u32, 3], vec![2]]).unwrap();
        assert_eq!(sentences.dimensions(), &[2, 3]);
    }

    #[test]
    fn test_pretrained_rejects_non_matrix() {
        let vectors = Tensor::new("flat", vec![6], vec![0.0; 6]).unwrap();
        let result = SentenceModelFactory::new().use_pretrained(vectors, &PretrainedConfig::default());
        assert!(matches!(result, Err(HanError::ShapeMismatch { .. })));
    }
}
