use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, ConfigError};

/// Custom error types for generation backend interactions
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("No API key supplied; the run cannot start without a credential")]
    MissingCredential,

    #[error("Gemini servers are currently busy. Please try again in a few moments.")]
    ServerBusy,

    #[error("Network connection failed: {message}")]
    NetworkError { message: String },

    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {message}")]
    ParseError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl GeminiError {
    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            GeminiError::MissingCredential => {
                "🔑 No API key supplied. Set GEMINI_API_KEY and try again.".to_string()
            }
            GeminiError::ServerBusy => {
                "🚫 Gemini servers are currently busy. Please try again in a few moments."
                    .to_string()
            }
            GeminiError::NetworkError { .. } => {
                "🌐 Network connection failed. Please check your internet connection and try again."
                    .to_string()
            }
            GeminiError::Timeout { seconds } => {
                format!(
                    "⏰ Request timed out after {} seconds. The server might be overloaded.",
                    seconds
                )
            }
            GeminiError::ApiError { status, .. } => match *status {
                401 | 403 => {
                    "🔑 Authentication failed. Check that your API key is valid.".to_string()
                }
                429 => {
                    "🚫 Rate limit exceeded. Please wait a moment before trying again.".to_string()
                }
                _ => format!("❌ API error ({}). Please try again later.", status),
            },
            GeminiError::ParseError { .. } => {
                "⚠️ Failed to parse server response. Please try again.".to_string()
            }
            GeminiError::ConfigError { message } => {
                format!("⚙️ Configuration error: {}", message)
            }
        }
    }
}

/// API request/response structures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// A tool result turn answering the backend's call with the given id.
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// A tool invocation requested by the backend mid-generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the backend sent it.
    pub arguments: String,
}

/// A tool made available to the backend for one generation.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDeclaration {
    #[serde(rename = "type")]
    pub decl_type: String,
    pub function: FunctionDeclaration,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDeclaration>>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// One completed generation turn: either final text, or a request to run
/// tools and come back with their results in a follow-up call. The caller
/// resolves the calls and re-invokes `chat` with `message` and one tool
/// turn per call appended.
#[derive(Debug)]
pub enum ChatOutcome {
    Text(String),
    ToolCalls {
        message: ChatMessage,
        calls: Vec<ToolCall>,
    },
}

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: Config,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

impl GeminiClient {
    /// Create a new client with the given configuration
    pub fn new(config: Config) -> Result<Self, GeminiError> {
        config.validate().map_err(|e| match e {
            ConfigError::MissingCredential => GeminiError::MissingCredential,
            other => GeminiError::ConfigError {
                message: other.to_string(),
            },
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent("market_agents/0.1.0")
            .build()
            .map_err(|e| GeminiError::ConfigError {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send one chat turn. Tool declarations are forwarded only when
    /// non-empty, so an agent without tools can never be asked to run one.
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        tools: &[ToolDeclaration],
    ) -> Result<ChatOutcome, GeminiError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.to_vec())
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_error_response(status, response).await);
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| GeminiError::ParseError {
                message: format!("Failed to parse API response: {}", e),
            })?;

        let Some(choice) = api_response.choices.into_iter().next() else {
            return Err(GeminiError::ParseError {
                message: "No choices in API response".to_string(),
            });
        };

        let message = choice.message;
        let calls = message.tool_calls.clone().unwrap_or_default();
        if calls.is_empty() {
            let text = message.content.ok_or_else(|| GeminiError::ParseError {
                message: "Empty content in API response".to_string(),
            })?;
            Ok(ChatOutcome::Text(text))
        } else {
            Ok(ChatOutcome::ToolCalls { message, calls })
        }
    }

    /// Map reqwest errors to our custom error types
    fn map_reqwest_error(&self, error: reqwest::Error) -> GeminiError {
        if error.is_timeout() {
            return GeminiError::Timeout {
                seconds: self.config.timeout,
            };
        }

        if error.is_connect() {
            return GeminiError::NetworkError {
                message: "Failed to connect to server".to_string(),
            };
        }

        if error.is_request() {
            return GeminiError::NetworkError {
                message: "Request failed".to_string(),
            };
        }

        let error_msg = error.to_string().to_lowercase();
        if error_msg.contains("dns") {
            return GeminiError::NetworkError {
                message: "DNS resolution failed".to_string(),
            };
        }

        if error_msg.contains("connection refused") {
            return GeminiError::NetworkError {
                message: "Connection refused by server".to_string(),
            };
        }

        if error_msg.contains("network") || error_msg.contains("connection") {
            return GeminiError::NetworkError {
                message: error.to_string(),
            };
        }

        GeminiError::NetworkError {
            message: format!("Request error: {}", error),
        }
    }

    /// Handle error responses from the server
    async fn handle_error_response(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> GeminiError {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match status {
            StatusCode::TOO_MANY_REQUESTS => GeminiError::ServerBusy,
            StatusCode::SERVICE_UNAVAILABLE => GeminiError::ServerBusy,
            StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => GeminiError::ServerBusy,
            _ => GeminiError::ApiError {
                status: status.as_u16(),
                message: error_text,
            },
        }
    }
}
