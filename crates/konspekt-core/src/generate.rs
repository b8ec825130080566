use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use crate::{
    error::{KonspektError, Result},
    provider::Provider,
};

/// Capability to produce text from (context, instruction). Implementations
/// must be safe to call from several map-stage workers at once.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, context: &str, instruction: &str) -> Result<String>;
}

/// Retry configuration for outbound calls. `immediate` gives tests a
/// zero-latency policy.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retrying after `failed_attempts` failures, doubling each
    /// time.
    pub fn delay_after(&self, failed_attempts: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(failed_attempts.saturating_sub(1))
    }
}

/// Generation client over an OpenAI-compatible chat completions endpoint.
///
/// The reqwest client and API key are read-only after construction, so one
/// instance can be shared across all map-stage workers.
pub struct HttpGenerator {
    client: reqwest::Client,
    provider: Provider,
    api_key: String,
    retry: RetryPolicy,
}

impl HttpGenerator {
    pub fn new(provider: Provider, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            provider,
            api_key: provider.api_key()?,
            retry,
        })
    }

    async fn request(&self, context: &str, instruction: &str) -> Result<String> {
        let config = self.provider.config();
        let response = self
            .client
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": config.model,
                "messages": [
                    {
                        "role": "system",
                        "content": instruction,
                    },
                    {
                        "role": "user",
                        "content": context,
                    },
                ],
                "temperature": 0.7,
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| KonspektError::Generation {
                reason: format!("Invalid API response: {response:?}"),
            })?;

        if content.trim().is_empty() {
            return Err(KonspektError::Generation {
                reason: "backend returned an empty completion".to_string(),
            });
        }

        Ok(content.to_string())
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, context: &str, instruction: &str) -> Result<String> {
        let mut last_error = None;
        for attempt in 1..=self.retry.max_attempts.max(1) {
            if attempt > 1 {
                sleep(self.retry.delay_after(attempt - 1)).await;
            }
            match self.request(context, instruction).await {
                Ok(text) => return Ok(normalize_output(&text)),
                Err(error) => {
                    debug!(attempt, %error, "generation attempt failed");
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or(KonspektError::Generation {
            reason: "no generation attempts were made".to_string(),
        }))
    }
}

/// Collapse runs of three or more newlines to exactly two and canonicalize
/// bullet markers at line starts to `- `. Applied to every generated string.
pub fn normalize_output(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut newlines = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 {
                collapsed.push(ch);
            }
        } else {
            newlines = 0;
            collapsed.push(ch);
        }
    }

    collapsed
        .split('\n')
        .map(normalize_bullet)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_bullet(line: &str) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];
    match body.strip_prefix("• ").or_else(|| body.strip_prefix("- ")) {
        Some(rest) => format!("{indent}- {rest}"),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs_of_blank_lines() {
        assert_eq!(normalize_output("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_output("a\n\nb"), "a\n\nb");
        assert_eq!(normalize_output("a\nb"), "a\nb");
    }

    #[test]
    fn canonicalizes_bullet_markers() {
        assert_eq!(normalize_output("• first\n- second"), "- first\n- second");
        assert_eq!(normalize_output("  • indented"), "  - indented");
    }

    #[test]
    fn leaves_non_bullet_dashes_alone() {
        assert_eq!(normalize_output("well-known fact"), "well-known fact");
        assert_eq!(normalize_output("-nospace"), "-nospace");
    }

    #[test]
    fn retry_delay_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
        assert_eq!(RetryPolicy::immediate(2).delay_after(1), Duration::ZERO);
    }
}
