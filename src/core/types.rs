use super::errors::HanError;

/// Dense f32 tensor stored in row-major order
///
/// Shapes used across the crate:
/// - `[rows, cols]` for weight matrices (`[in_features, out_features]`)
/// - `[steps, batch, features]` for padded sequence batches
/// - `[batch, features]` for pooled vectors and logits
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// Tensor name (e.g., "gru.weight_ih.forward")
    name: String,

    /// Tensor dimensions (e.g., [200, 150] for 2D matrix)
    dimensions: Vec<usize>,

    /// Raw float32 values (row-major order)
    data: Vec<f32>,
}

impl Tensor {
    /// Wrap `data` with a shape, checking that the element count matches
    pub fn new(name: impl Into<String>, dimensions: Vec<usize>, data: Vec<f32>) -> Result<Self, HanError> {
        let expected: usize = dimensions.iter().product();
        if expected != data.len() {
            return Err(HanError::shape("Tensor::new", &[expected], &[data.len()]));
        }
        Ok(Self {
            name: name.into(),
            dimensions,
            data,
        })
    }

    pub fn zeros(name: impl Into<String>, dimensions: Vec<usize>) -> Self {
        let len = dimensions.iter().product();
        Self {
            name: name.into(),
            dimensions,
            data: vec![0.0; len],
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get tensor dimensions
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Get total number of elements
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Row `index` of a 2D tensor, or the `[batch, features]` slab of step
    /// `index` of a 3D tensor
    pub fn row(&self, index: usize) -> Result<&[f32], HanError> {
        let rows = *self.dimensions.first().ok_or(HanError::EmptyBatch)?;
        if index >= rows {
            return Err(HanError::IndexOutOfRange { index, size: rows });
        }
        let stride = self.data.len() / rows;
        Ok(&self.data[index * stride..(index + 1) * stride])
    }

    /// Element of a 2D tensor
    pub fn get2(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.dimensions[1] + col]
    }

    /// Feature vector at `[step, batch]` of a 3D tensor
    pub fn vector3(&self, step: usize, batch: usize) -> &[f32] {
        let features = self.dimensions[2];
        let start = (step * self.dimensions[1] + batch) * features;
        &self.data[start..start + features]
    }

    pub(crate) fn vector3_mut(&mut self, step: usize, batch: usize) -> &mut [f32] {
        let features = self.dimensions[2];
        let start = (step * self.dimensions[1] + batch) * features;
        &mut self.data[start..start + features]
    }

    /// Sum over the last axis of a 2D tensor, one value per row
    pub fn row_sums(&self) -> Vec<f32> {
        let cols = self.dimensions.get(1).copied().unwrap_or(0);
        if cols == 0 {
            return vec![0.0; self.dimensions.first().copied().unwrap_or(0)];
        }
        self.data.chunks(cols).map(|row| row.iter().sum()).collect()
    }

    pub(crate) fn expect_rank(&self, context: &'static str, rank: usize) -> Result<(), HanError> {
        if self.dimensions.len() != rank {
            return Err(HanError::ShapeMismatch {
                context,
                expected: vec![rank],
                actual: vec![self.dimensions.len()],
            });
        }
        Ok(())
    }
}

/// Which optimizer group a parameter belongs to
///
/// Embedding tables configured for sparse updates only touch the rows seen in
/// a batch, so they are optimized separately from the dense weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Sparse,
    Dense,
}

/// Trainable weight tagged with its partition at creation time
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub tensor: Tensor,
    pub partition: Partition,
    /// False for frozen pretrained embeddings
    pub trainable: bool,
}

impl Parameter {
    pub fn dense(tensor: Tensor) -> Self {
        Self {
            tensor,
            partition: Partition::Dense,
            trainable: true,
        }
    }

    pub fn name(&self) -> &str {
        self.tensor.name()
    }
}

/// Split parameters into `(sparse, dense)` by their partition tag
pub fn partition_parameters<'a>(
    parameters: impl IntoIterator<Item = &'a Parameter>,
) -> (Vec<&'a Parameter>, Vec<&'a Parameter>) {
    parameters
        .into_iter()
        .partition(|p| p.partition == Partition::Sparse)
}

/// Forward-pass mode, passed explicitly into every classifier call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Raw logits
    #[default]
    Train,
    /// Softmax probabilities over the class dimension
    Eval,
}

/// Integer matrix of word indices, shape `[max_len, batch]`, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMatrix {
    rows: usize,
    cols: usize,
    data: Vec<u32>,
}

impl IndexMatrix {
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<u32>) -> Self {
        debug_assert_eq!(rows * cols, data.len());
        Self { rows, cols, data }
    }

    /// `(max_len, batch)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, step: usize, column: usize) -> u32 {
        self.data[step * self.cols + column]
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// The `index`-th sequence read down its column
    pub fn column(&self, index: usize) -> Vec<u32> {
        (0..self.rows).map(|step| self.get(step, index)).collect()
    }
}

/// Right-padded index matrix together with the true sequence lengths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedBatch {
    pub matrix: IndexMatrix,
    pub lengths: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_new_checks_element_count() {
        assert!(Tensor::new("t", vec![2, 3], vec![0.0; 6]).is_ok());
        let err = Tensor::new("t", vec![2, 3], vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, HanError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_tensor_row_and_vector3() {
        let t = Tensor::new("t", vec![2, 2, 3], (0..12).map(|x| x as f32).collect()).unwrap();
        assert_eq!(t.row(1).unwrap(), &[6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(t.vector3(1, 0), &[6.0, 7.0, 8.0]);
        assert_eq!(t.vector3(0, 1), &[3.0, 4.0, 5.0]);
        assert!(t.row(2).is_err());
    }

    #[test]
    fn test_row_sums() {
        let t = Tensor::new("t", vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(t.row_sums(), vec![3.0, 7.0]);
    }

    #[test]
    fn test_partition_parameters_by_tag() {
        let mut sparse = Parameter::dense(Tensor::zeros("embedding", vec![3, 2]));
        sparse.partition = Partition::Sparse;
        let dense = Parameter::dense(Tensor::zeros("linear", vec![2, 2]));
        let all = vec![sparse, dense];
        let (s, d) = partition_parameters(&all);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].name(), "embedding");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].name(), "linear");
    }
}
