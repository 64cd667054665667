// Core compute kernels
pub mod matmul;

// Activation functions (element-wise transforms)
pub mod activation;
pub mod softmax;

// Variable-length batch handling
pub mod pack;

// Training objective over raw logits
pub mod loss;
