use async_trait::async_trait;

/// A text-generation backend.
///
/// The bridge sends a single flattened prompt per reply, so the interface is
/// one call: prompt in, generated text out. Failures are opaque to callers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Model identifier (e.g. "gemini-2.5-flash").
    fn id(&self) -> &str;

    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
