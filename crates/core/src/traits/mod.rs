//! Collaborator traits
//!
//! The pipeline's external collaborators - classification, embedding, the
//! API executor, response synthesis, and the observability sink - are kept
//! behind narrow trait interfaces so backing services stay out of the core.

pub mod classifier;
pub mod embedder;
pub mod executor;
pub mod synthesizer;
pub mod sink;

pub use classifier::DomainClassifier;
pub use embedder::Embedder;
pub use executor::ApiExecutor;
pub use synthesizer::ResponseSynthesizer;
pub use sink::{EventSink, NullSink, TransitionEvent};
