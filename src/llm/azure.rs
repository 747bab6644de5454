//! Azure OpenAI (chat-completions) client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChatError, ChatMessage, ChatReply, ChatService, ToolCall, ToolDeclaration};

/// Connection and sampling settings for the chat endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Full chat-completions URL, including deployment and api-version.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: 60,
            max_tokens: 1500,
            temperature: 0.7,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
}

/// Completion response (only fields we need).
#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

pub struct AzureChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

impl AzureChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }
}

#[async_trait]
impl ChatService for AzureChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDeclaration]>,
    ) -> Result<ChatReply, ChatError> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or(ChatError::NotConfigured)?;

        let offered = tools.filter(|t| !t.is_empty());
        let body = CompletionRequest {
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools: offered.map(|t| t.iter().map(ToolDeclaration::to_wire).collect()),
            tool_choice: offered.map(|_| "auto"),
        };

        let mut request = self.client.post(endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header("api-key", key);
        }

        tracing::debug!(
            messages = messages.len(),
            tools = offered.map_or(0, |t| t.len()),
            "chat completion request"
        );
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: CompletionResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => {
                return Err(ChatError::MalformedResponse(e.to_string()));
            }
            Err(_) => return Err(ChatError::Service(format!("{}: {}", status, text))),
        };

        if let Some(error) = parsed.error {
            tracing::warn!(%status, message = %error.message, "chat service returned an error");
            return Err(ChatError::Service(error.message));
        }
        if !status.is_success() {
            return Err(ChatError::Service(format!("{}: {}", status, text)));
        }

        let message = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::MalformedResponse("response has no choices".into()))?
            .message;

        match message.tool_calls {
            Some(calls) if !calls.is_empty() => Ok(ChatReply::ToolCalls {
                content: message.content,
                calls,
            }),
            _ => Ok(ChatReply::Text(message.content.unwrap_or_default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AzureChatClient {
        AzureChatClient::new(ChatConfig {
            endpoint: Some(format!("{}/chat/completions", server.uri())),
            api_key: Some("test-key".into()),
            timeout_secs: 2,
            ..ChatConfig::default()
        })
        .unwrap()
    }

    fn completion(message: Value) -> Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": message, "finish_reason": "stop"}]
        })
    }

    #[tokio::test]
    async fn text_reply_sends_api_key_and_no_tools() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({"max_tokens": 1500})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                serde_json::json!({"role": "assistant", "content": "你好"}),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .complete(&[ChatMessage::user("hi")], None)
            .await
            .unwrap();
        assert_eq!(reply, ChatReply::Text("你好".into()));

        let requests = server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(sent.get("tools").is_none());
        assert!(sent.get("tool_choice").is_none());
    }

    #[tokio::test]
    async fn tool_calls_are_returned_with_tool_choice_auto() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"tool_choice": "auto"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(serde_json::json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "get_todos", "arguments": "{}"}
                }]
            }))))
            .mount(&server)
            .await;

        let tools = vec![ToolDeclaration {
            name: "get_todos".into(),
            description: "list".into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }];
        let reply = client_for(&server)
            .complete(&[ChatMessage::user("list")], Some(&tools))
            .await
            .unwrap();

        match reply {
            ChatReply::ToolCalls { content, calls } => {
                assert!(content.is_none());
                assert_eq!(calls[0].function.name, "get_todos");
            }
            other => panic!("expected tool calls, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn error_body_becomes_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"code": "429", "message": "Rate limit exceeded"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&[ChatMessage::user("hi")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Service(ref m) if m == "Rate limit exceeded"));
    }

    #[tokio::test]
    async fn missing_endpoint_is_not_configured() {
        let client = AzureChatClient::new(ChatConfig::default()).unwrap();
        let err = client
            .complete(&[ChatMessage::user("hi")], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotConfigured));
    }
}
