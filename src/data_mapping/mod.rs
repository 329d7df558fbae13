//! Channel classification: the category registry and the matching engine

pub mod engine;
pub mod registry;

pub use engine::ChannelClassifier;
pub use registry::{CategoryRegistry, MatchInput};
