pub mod error;
pub mod normalizer;

pub use error::ClientError;
pub use normalizer::{normalize, NormalizedError};
