use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::debug;

use crate::chat::SessionConfig;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_EMPTY_REPLIES, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::types::{ChatRequest, ChatResponse, Turn, Usage};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The decoded outcome of a successful (HTTP 200) chat-completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The first choice, or `None` when the endpoint returned no choices.
    pub reply: Option<Turn>,
    /// Token accounting for the call.
    pub usage: Usage,
    /// The response body exactly as received.
    pub raw_body: String,
}

impl Completion {
    /// Decode a 200 response body.
    pub fn from_body(body: String) -> Result<Self> {
        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(response) => {
                let (reply, usage) = response.into_first();
                Ok(Self {
                    reply,
                    usage,
                    raw_body: body,
                })
            }
            Err(e) => Err(Error::decode(
                format!("failed to parse response: {e}"),
                body,
                Some(Box::new(e)),
            )),
        }
    }
}

/// Something that can answer a conversation.
///
/// The session drives the remote endpoint only through this trait.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the full conversation and return the decoded reply.
    async fn complete(
        &self,
        messages: &[Turn],
        model: &str,
        temperature: f32,
    ) -> Result<Completion>;
}

/// Client for a chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: ReqwestClient,
    endpoint: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl ChatClient {
    /// Create a new client for `endpoint` authenticating with `credential`.
    pub fn new(endpoint: impl Into<String>, credential: &str) -> Result<Self> {
        Self::with_timeout(endpoint, credential, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        credential: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::transport(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            headers: Self::default_headers(credential)?,
            timeout,
        })
    }

    /// Create a client from the session configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        Self::with_timeout(&config.endpoint_url, &config.credential, config.timeout)
    }

    /// Returns the endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn default_headers(credential: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let mut authorization = HeaderValue::from_str(&format!("Bearer {credential}"))
            .map_err(|_| {
                Error::config(
                    "API key contains characters not allowed in a header",
                    Some("api-key".to_string()),
                )
            })?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);
        Ok(headers)
    }

    /// Send the conversation and decode the reply.
    pub async fn send(&self, request: &ChatRequest<'_>) -> Result<Completion> {
        CLIENT_REQUESTS.click();
        let started = Instant::now();
        let result = self.send_inner(request).await;
        CLIENT_REQUEST_DURATION.add(started.elapsed().as_secs_f64());
        match &result {
            Ok(completion) if completion.reply.is_none() => CLIENT_EMPTY_REPLIES.click(),
            Ok(_) => {}
            Err(_) => CLIENT_REQUEST_ERRORS.click(),
        }
        result
    }

    async fn send_inner(&self, request: &ChatRequest<'_>) -> Result<Completion> {
        debug!(
            endpoint = %self.endpoint,
            model = request.model,
            messages = request.messages.len(),
            "sending chat request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::transport(
                        format!(
                            "Request timed out after {} seconds: {e}",
                            self.timeout.as_secs_f64()
                        ),
                        Some(Box::new(e)),
                    )
                } else if e.is_connect() {
                    Error::transport(format!("Connection error: {e}"), Some(Box::new(e)))
                } else {
                    Error::transport(format!("Request failed: {e}"), Some(Box::new(e)))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::transport(
                format!("Failed to read response body: {e}"),
                Some(Box::new(e)),
            )
        })?;
        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        if status != StatusCode::OK {
            return Err(Error::remote(status.as_u16(), body));
        }
        Completion::from_body(body)
    }
}

#[async_trait::async_trait]
impl ChatBackend for ChatClient {
    async fn complete(
        &self,
        messages: &[Turn],
        model: &str,
        temperature: f32,
    ) -> Result<Completion> {
        self.send(&ChatRequest::new(model, temperature, messages))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn client_creation() {
        let client = ChatClient::new("https://llm.example.com/v1/chat/completions", "k").unwrap();
        assert_eq!(client.endpoint(), "https://llm.example.com/v1/chat/completions");
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = ChatClient::with_timeout("http://localhost/", "k", Duration::from_secs(5))
            .unwrap();
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn credential_with_newline_is_rejected() {
        let err = ChatClient::new("http://localhost/", "bad\nkey").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn decode_empty_choices() {
        let completion = Completion::from_body(r#"{"choices": []}"#.to_string()).unwrap();
        assert!(completion.reply.is_none());
        assert_eq!(completion.raw_body, r#"{"choices": []}"#);
    }

    #[test]
    fn decode_null_fields_is_not_an_error() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}],"usage":null}"#;
        let completion = Completion::from_body(body.to_string()).unwrap();
        assert_eq!(completion.reply, Some(Turn::assistant("")));
        assert_eq!(completion.usage, Usage::default());

        let completion = Completion::from_body(r#"{"choices":null}"#.to_string()).unwrap();
        assert!(completion.reply.is_none());
    }

    #[test]
    fn decode_garbage_keeps_body() {
        let err = Completion::from_body("<html>bad gateway</html>".to_string()).unwrap_err();
        assert!(err.is_decode());
        assert_eq!(err.raw_body(), Some("<html>bad gateway</html>"));
    }

    #[tokio::test]
    async fn posts_conversation_with_bearer() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer secret")
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "model": "org/model",
                        "temperature": 0.25,
                        "messages": [{"role": "user", "content": "ping"}]
                    }));
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "pong"}}],
                    "usage": {"prompt_tokens": 3, "completion_tokens": 1}
                }));
            })
            .await;

        let client = ChatClient::new(server.url("/v1/chat/completions"), "secret").unwrap();
        let completion = client
            .complete(&[Turn::user("ping")], "org/model", 0.25)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(completion.reply, Some(Turn::assistant("pong")));
        assert_eq!(completion.usage, Usage::new(3, 1));
    }

    #[tokio::test]
    async fn non_200_is_remote_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat");
                then.status(401).body(r#"{"error":"invalid key"}"#);
            })
            .await;

        let client = ChatClient::new(server.url("/chat"), "wrong").unwrap();
        let err = client
            .complete(&[Turn::user("hi")], "m", 0.0)
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.raw_body(), Some(r#"{"error":"invalid key"}"#));
    }

    #[tokio::test]
    async fn undecodable_200_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat");
                then.status(200).body("upstream timeout");
            })
            .await;

        let client = ChatClient::new(server.url("/chat"), "k").unwrap();
        let err = client
            .complete(&[Turn::user("hi")], "m", 0.0)
            .await
            .unwrap_err();
        assert!(err.is_decode());
        assert_eq!(err.raw_body(), Some("upstream timeout"));
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        let client = ChatClient::with_timeout(
            "http://127.0.0.1:1/chat",
            "k",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client
            .complete(&[Turn::user("hi")], "m", 0.0)
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(err.is_recoverable());
    }
}
