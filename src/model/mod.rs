// Word level: embedding, GRU and word attention
pub mod sentence;

// Classification heads
pub mod classifier;
pub mod document;

pub use classifier::SentenceClassifier;
pub use document::{DocumentClassifier, DocumentOutput};
pub use sentence::{SentenceModel, SentenceModelFactory};
