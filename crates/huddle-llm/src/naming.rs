// Themed group names from the LLM.
//
// Asks Claude for `count` names as a JSON array of strings and falls back to
// "Team <i>" placeholders when the client is disabled, the request fails,
// the reply cannot be parsed, or the timeout elapses.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use huddle_core::config::Config;
use huddle_core::grouping::{placeholder_names, GroupNamer};

use crate::client::{ClaudeClient, LlmError};

const SYSTEM_PROMPT: &str = "You name teams for office events and workshops. \
Reply with only a JSON array of strings and no other text.";

/// User prompt asking for `count` names on `theme`.
pub fn naming_prompt(count: usize, theme: &str) -> String {
    format!(
        "Generate {count} creative and fun team names based on the theme: {theme}. \
         Return as a JSON array of strings."
    )
}

/// Extract the first JSON array of strings from an LLM reply. Tolerates
/// surrounding prose and markdown code fences.
pub fn parse_name_list(reply: &str) -> Option<Vec<String>> {
    let start = reply.find('[')?;
    let end = reply.rfind(']')?;
    if end < start {
        return None;
    }
    let names: Vec<String> = serde_json::from_str(&reply[start..=end]).ok()?;
    Some(
        names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
    )
}

#[derive(Debug, thiserror::Error)]
enum NamingError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("reply did not contain a JSON array of names")]
    Unparseable,
}

/// `GroupNamer` backed by Claude. Without a client every request falls back.
pub struct LlmGroupNamer {
    client: Option<ClaudeClient>,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmGroupNamer {
    pub fn new(client: Option<ClaudeClient>, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            client,
            max_tokens,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ClaudeClient::from_config(config),
            config.llm.max_tokens,
            Duration::from_secs(config.llm.timeout_secs),
        )
    }

    /// False when no API key is configured and every request falls back.
    pub fn is_active(&self) -> bool {
        self.client.is_some()
    }

    async fn request_names(
        &self,
        client: &ClaudeClient,
        count: usize,
        theme: &str,
    ) -> Result<Vec<String>, NamingError> {
        let reply = client
            .complete(SYSTEM_PROMPT, &naming_prompt(count, theme), self.max_tokens)
            .await?;
        debug!(reply_len = reply.len(), "naming reply received");

        parse_name_list(&reply)
            .filter(|names| !names.is_empty())
            .ok_or(NamingError::Unparseable)
    }
}

#[async_trait]
impl GroupNamer for LlmGroupNamer {
    async fn generate_names(&self, count: usize, theme: &str) -> Vec<String> {
        if count == 0 {
            return Vec::new();
        }
        let Some(client) = &self.client else {
            debug!("LLM disabled, using placeholder group names");
            return placeholder_names(count);
        };

        match tokio::time::timeout(self.timeout, self.request_names(client, count, theme)).await {
            Ok(Ok(names)) => {
                info!(count, received = names.len(), theme, "generated group names");
                names
            }
            Ok(Err(e)) => {
                warn!("group naming failed, using placeholders: {e}");
                placeholder_names(count)
            }
            Err(_) => {
                warn!(
                    "group naming timed out after {}s, using placeholders",
                    self.timeout.as_secs()
                );
                placeholder_names(count)
            }
        }
    }
}
