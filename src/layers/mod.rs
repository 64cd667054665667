// Weight initialisation
pub mod init;

// Building blocks
pub mod embeddings;
pub mod linear;
pub mod gru;

// Pooling
pub mod attention;
