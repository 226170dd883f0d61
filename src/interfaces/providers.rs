use async_trait::async_trait;

use crate::error::Result;

/// One LLM backend behind a uniform completion surface. Implemented
/// once per provider (local daemon, cloud API); the gateway treats all
/// implementations as capability-equivalent.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short stable tag, recorded in message metadata (e.g. "ollama").
    fn name(&self) -> &str;

    /// Model identifier the provider will complete with.
    fn model(&self) -> &str;

    /// Full completion for a rendered prompt. No streaming; the whole
    /// response is returned atomically.
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;
}
