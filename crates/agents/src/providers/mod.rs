//! Concrete [`LlmProvider`](crate::model::LlmProvider) implementations.

pub mod gemini;
