// Text -> word index sequences, one level per module
pub mod sentence;
pub mod document;

pub use document::{DocumentEncode, DocumentEncoder};
pub use sentence::{SentenceEncode, SentenceEncoder};
