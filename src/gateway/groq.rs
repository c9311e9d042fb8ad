//! OpenAI-compatible chat completions over blocking HTTP (Groq by default)

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CompletionGateway, CompletionRequest, GatewayError};
use crate::config::{Credential, GatewayConfig};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

pub struct GroqGateway {
    endpoint: String,
    credential: Credential,
    agent: ureq::Agent,
}

impl GroqGateway {
    pub fn new(config: &GatewayConfig, credential: Credential) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            credential,
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CompletionGateway for GroqGateway {
    fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };
        let request_body =
            serde_json::to_string(&body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        log::debug!(
            "POST {} model={} prompt_len={}",
            self.endpoint,
            request.model,
            request.prompt.len()
        );

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", &format!("Bearer {}", self.credential.expose()))
            .header("Content-Type", "application/json")
            .send(request_body.as_bytes())
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let response_body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| GatewayError::Transport(format!("Failed to read response: {}", e)))?;

        match status {
            200..=299 => parse_completion(&response_body),
            401 | 403 => Err(GatewayError::Auth {
                status,
                body: error_message(&response_body),
            }),
            _ => Err(GatewayError::Status {
                status,
                body: error_message(&response_body),
            }),
        }
    }
}

fn parse_completion(body: &str) -> Result<String, GatewayError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| GatewayError::MalformedResponse("no message content in first choice".to_string()))
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
