//! Language-model providers used to generate replies.

pub mod model;
pub mod providers;

pub use {model::LlmProvider, providers::gemini::GeminiProvider};
