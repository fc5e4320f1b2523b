//! Public types for the Verbatim API.

mod generate;

pub use generate::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerationRequest};
