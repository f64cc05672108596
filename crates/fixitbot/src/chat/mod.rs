use crate::config::ChatConfig;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const UPSTREAM_DETAIL_LIMIT: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat agent is not configured: set CHAT_AGENT_URL and CHAT_AGENT_TOKEN")]
    Unconfigured,
    #[error("failed to reach the chat agent: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat agent returned {status}: {detail}")]
    UpstreamStatus { status: u16, detail: String },
}

#[derive(Debug, Default, Deserialize)]
struct AgentTextBlock {
    #[serde(default)]
    text: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentMessage {
    #[serde(default)]
    text: Option<AgentTextBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentQueryResult {
    #[serde(default)]
    response_messages: Vec<AgentMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentResponse {
    #[serde(default)]
    query_result: Option<AgentQueryResult>,
}

/// Thin proxy to the conversational-agent backend. The agent itself is an
/// external service; this client only forwards a text turn for one session
/// and flattens the reply messages.
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.agent_url.is_some() && self.config.access_token.is_some()
    }

    /// Sends one user turn and returns the agent's text replies in order.
    pub async fn send(&self, session_id: &str, text: &str) -> Result<Vec<String>, ChatError> {
        let agent_url = self
            .config
            .agent_url
            .as_deref()
            .ok_or(ChatError::Unconfigured)?;
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or(ChatError::Unconfigured)?;

        let endpoint = format!(
            "{}/sessions/{}:detectIntent",
            agent_url.trim_end_matches('/'),
            session_id
        );
        let payload = json!({
            "queryInput": {
                "text": { "text": text },
                "languageCode": self.config.language,
            }
        });

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ChatError::UpstreamStatus {
                status: status.as_u16(),
                detail: detail.chars().take(UPSTREAM_DETAIL_LIMIT).collect(),
            });
        }

        let data: AgentResponse = response.json().await?;
        let mut replies = Vec::new();
        if let Some(result) = data.query_result {
            for message in result.response_messages {
                if let Some(block) = message.text {
                    replies.extend(block.text);
                }
            }
        }
        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_reply_messages_in_order() {
        let raw = json!({
            "queryResult": {
                "responseMessages": [
                    { "text": { "text": ["hola", "¿en qué ayudo?"] } },
                    { "payload": { "ignored": true } },
                    { "text": { "text": ["adiós"] } }
                ]
            }
        });
        let parsed: AgentResponse = serde_json::from_value(raw).expect("parses");
        let mut replies = Vec::new();
        for message in parsed.query_result.expect("result present").response_messages {
            if let Some(block) = message.text {
                replies.extend(block.text);
            }
        }
        assert_eq!(replies, vec!["hola", "¿en qué ayudo?", "adiós"]);
    }

    #[test]
    fn unconfigured_client_reports_itself() {
        let client = ChatClient::new(ChatConfig {
            agent_url: None,
            access_token: None,
            language: "es".to_string(),
        })
        .expect("client builds");
        assert!(!client.is_configured());
    }
}
