//! Gateway implementation and builder

mod builder;
mod engine;

pub use builder::{TimeoutConfig, Verbatim, VerbatimBuilder};
pub use engine::Gateway;
