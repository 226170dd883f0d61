use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::{ConciergeError, Result};
use crate::interfaces::providers::LlmProvider;

/// Outcome of one provider call. `provider` / `model` identify which
/// backend actually answered; fallback substitution is otherwise
/// invisible to the caller.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
}

/// Ordered preference over capability-equivalent LLM backends. One
/// pass over the list per request: each provider gets one attempt
/// under a hard timeout, then the next takes over. No caching, no
/// streaming, no retries beyond the single pass.
pub struct ProviderGateway {
    providers: Vec<Arc<dyn LlmProvider>>,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl std::fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderGateway")
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl ProviderGateway {
    pub fn new(
        providers: Vec<Arc<dyn LlmProvider>>,
        timeout: Duration,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Self> {
        if providers.is_empty() {
            return Err(ConciergeError::Config(
                "provider gateway needs at least one provider".to_string(),
            ));
        }
        Ok(Self {
            providers,
            timeout,
            max_tokens,
            temperature,
        })
    }

    /// Whether a secondary backend is configured. Fallback is a
    /// runtime capability, not a toggle.
    pub fn has_fallback(&self) -> bool {
        self.providers.len() > 1
    }

    pub async fn generate(&self, prompt: &str) -> Result<Completion> {
        let mut failures = Vec::new();

        for provider in &self.providers {
            let started = Instant::now();
            let attempt = tokio::time::timeout(
                self.timeout,
                provider.complete(prompt, self.max_tokens, self.temperature),
            )
            .await;

            match attempt {
                Ok(Ok(text)) => {
                    let latency_ms = started.elapsed().as_millis() as u64;
                    info!(
                        provider = provider.name(),
                        model = provider.model(),
                        latency_ms,
                        "completion succeeded"
                    );
                    return Ok(Completion {
                        text,
                        provider: provider.name().to_string(),
                        model: provider.model().to_string(),
                        latency_ms,
                    });
                }
                Ok(Err(err)) => {
                    warn!(provider = provider.name(), %err, "provider failed, trying next");
                    failures.push(format!("{}: {err}", provider.name()));
                }
                Err(_) => {
                    warn!(
                        provider = provider.name(),
                        timeout_secs = self.timeout.as_secs(),
                        "provider timed out, trying next"
                    );
                    failures.push(format!(
                        "{}: timed out after {}s",
                        provider.name(),
                        self.timeout.as_secs()
                    ));
                }
            }
        }

        Err(ConciergeError::ProviderUnavailable(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedProvider {
        name: &'static str,
        reply: std::result::Result<&'static str, &'static str>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn model(&self) -> &str {
            "test-model"
        }

        async fn complete(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(message) => Err(ConciergeError::Http(message.to_string())),
            }
        }
    }

    fn gateway(providers: Vec<Arc<dyn LlmProvider>>) -> ProviderGateway {
        ProviderGateway::new(providers, Duration::from_millis(50), 100, 0.7).unwrap()
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let gateway = gateway(vec![
            Arc::new(FixedProvider {
                name: "primary",
                reply: Ok("hello"),
                delay: None,
            }),
            Arc::new(FixedProvider {
                name: "secondary",
                reply: Ok("unused"),
                delay: None,
            }),
        ]);
        let completion = gateway.generate("hi").await.unwrap();
        assert_eq!(completion.text, "hello");
        assert_eq!(completion.provider, "primary");
    }

    #[tokio::test]
    async fn error_falls_back_to_secondary() {
        let gateway = gateway(vec![
            Arc::new(FixedProvider {
                name: "primary",
                reply: Err("connection refused"),
                delay: None,
            }),
            Arc::new(FixedProvider {
                name: "secondary",
                reply: Ok("backup answer"),
                delay: None,
            }),
        ]);
        let completion = gateway.generate("hi").await.unwrap();
        assert_eq!(completion.provider, "secondary");
        assert_eq!(completion.text, "backup answer");
    }

    #[tokio::test]
    async fn timeout_counts_as_failure() {
        let gateway = gateway(vec![
            Arc::new(FixedProvider {
                name: "slow",
                reply: Ok("too late"),
                delay: Some(Duration::from_millis(200)),
            }),
            Arc::new(FixedProvider {
                name: "fast",
                reply: Ok("in time"),
                delay: None,
            }),
        ]);
        let completion = gateway.generate("hi").await.unwrap();
        assert_eq!(completion.provider, "fast");
    }

    #[tokio::test]
    async fn exhausted_providers_surface_provider_unavailable() {
        let gateway = gateway(vec![
            Arc::new(FixedProvider {
                name: "a",
                reply: Err("down"),
                delay: None,
            }),
            Arc::new(FixedProvider {
                name: "b",
                reply: Err("also down"),
                delay: None,
            }),
        ]);
        let err = gateway.generate("hi").await.unwrap_err();
        assert!(matches!(err, ConciergeError::ProviderUnavailable(_)));
    }

    #[test]
    fn empty_provider_list_is_a_config_error() {
        let err = ProviderGateway::new(Vec::new(), Duration::from_secs(1), 10, 0.0).unwrap_err();
        assert!(matches!(err, ConciergeError::Config(_)));
    }
}
