pub mod error_classifier;

pub use error_classifier::{ErrorClassifier, ErrorClassifierImpl};
