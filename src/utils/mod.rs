// Utility functions

pub mod json;
pub mod summarizer;

pub use json::*;
pub use summarizer::*;
