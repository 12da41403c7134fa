//! HTTP clients for the chat and sensor endpoints

use fridge_protocol::{ChatRequest, ChatResponse, ErrorResponse, TemperatureData, TemperatureResponse};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use validator::Validate;

use crate::config::ClientConfig;
use crate::error::{FridgeError, Result};

/// Longest slice of an undecodable body quoted back in errors
const MAX_BODY_EXCERPT: usize = 200;

/// A chat endpoint that answers one prompt with one message
#[allow(async_fn_in_trait)]
pub trait ChatBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// A source of fridge temperature readings
#[allow(async_fn_in_trait)]
pub trait SensorBackend {
    async fn current_temperature(&self) -> Result<TemperatureResponse>;

    async fn temperature_history(&self) -> Result<Vec<TemperatureData>>;
}

/// Base HTTP client shared by both endpoints
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("fridge-assistant/", env!("CARGO_PKG_VERSION")));

        if !config.use_proxy {
            client_builder = client_builder.no_proxy();
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get_json<R>(&self, url: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        decode_body(status, &body)
    }

    pub async fn post_json<T, R>(&self, url: &str, payload: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        decode_body(status, &body)
    }
}

impl ChatBackend for HttpClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        request.validate()?;

        let response: ChatResponse = self.post_json(&self.config.chat_url(), request).await?;

        if let Some(error) = response.error.as_deref().filter(|e| !e.is_empty()) {
            warn!(model = %request.model, %error, "chat endpoint reported an error alongside its answer");
        }

        Ok(response)
    }
}

impl SensorBackend for HttpClient {
    async fn current_temperature(&self) -> Result<TemperatureResponse> {
        self.get_json(&self.config.sensor_url("getTemp.php")).await
    }

    async fn temperature_history(&self) -> Result<Vec<TemperatureData>> {
        self.get_json(&self.config.sensor_url("api.php")).await
    }
}

/// Decode a response body, turning anything unusable into a terminal error
pub fn decode_body<R>(status: StatusCode, body: &str) -> Result<R>
where
    R: DeserializeOwned,
{
    match serde_json::from_str::<R>(body) {
        Ok(value) if status.is_success() => Ok(value),
        Ok(_) => Err(FridgeError::api(status.as_u16(), excerpt(body))),
        Err(decode_error) => {
            if let Ok(ErrorResponse { error }) = serde_json::from_str::<ErrorResponse>(body) {
                return Err(FridgeError::api(status.as_u16(), error));
            }

            if !status.is_success() {
                return Err(FridgeError::api(status.as_u16(), excerpt(body)));
            }

            Err(FridgeError::invalid_response(
                status.as_u16(),
                format!("{} in response: {}", decode_error, excerpt(body)),
            ))
        }
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    match trimmed.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_decode_chat_response() {
        let response: ChatResponse = decode_body(
            StatusCode::OK,
            r#"{"model":"llama3.1:latest","message":{"role":"assistant","content":"Salade"},"done":true}"#,
        )
        .unwrap();
        assert_eq!(response.message.content, "Salade");
    }

    #[test]
    fn test_decode_error_body_reports_endpoint_message() {
        let err = decode_body::<ChatResponse>(
            StatusCode::NOT_FOUND,
            r#"{"error":"model 'llama3.2-vision' not found"}"#,
        )
        .unwrap_err();

        match err {
            FridgeError::Api { status, message, .. } => {
                assert_eq!(status, 404);
                assert!(message.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_garbage_is_invalid_response() {
        let err = decode_body::<ChatResponse>(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidResponse);
        assert!(!err.is_network_error());
    }

    #[test]
    fn test_decode_non_success_status_fails_even_if_body_decodes() {
        let err = decode_body::<Vec<TemperatureData>>(StatusCode::INTERNAL_SERVER_ERROR, "[]")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ApiError);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let body = r#"{"status":"success","data":{"temperature":3}}"#;
        let first: TemperatureResponse = decode_body(StatusCode::OK, body).unwrap();
        let second: TemperatureResponse = decode_body(StatusCode::OK, body).unwrap();
        assert_eq!(first, second);

        let bad = r#"{"status":"success","data":{}}"#;
        assert!(decode_body::<TemperatureResponse>(StatusCode::OK, bad).is_err());
        assert!(decode_body::<TemperatureResponse>(StatusCode::OK, bad).is_err());
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let long = "x".repeat(500);
        let short = excerpt(&long);
        assert!(short.ends_with('…'));
        assert_eq!(short.chars().count(), MAX_BODY_EXCERPT + 1);
        assert_eq!(excerpt("   "), "<empty body>");
    }

    #[test]
    fn test_http_client_rejects_invalid_config() {
        let config = ClientConfig {
            chat_endpoint: String::new(),
            ..ClientConfig::default()
        };
        assert!(HttpClient::new(config).is_err());
        assert!(HttpClient::new(ClientConfig::default()).is_ok());
    }

    mod transport {
        use super::*;
        use fridge_protocol::ChatMessage;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;
        use tokio::task::JoinHandle;

        /// Answer a single connection with `status` and `body`; yields the raw request
        async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());

            let handle = tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                while !request_complete(&request) {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }

                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;

                String::from_utf8(request).unwrap()
            });

            (base, handle)
        }

        fn request_complete(raw: &[u8]) -> bool {
            let text = String::from_utf8_lossy(raw);
            let Some((head, body)) = text.split_once("\r\n\r\n") else {
                return false;
            };
            let length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            body.len() >= length
        }

        fn client_for(base: &str) -> HttpClient {
            HttpClient::new(ClientConfig {
                chat_endpoint: format!("{}/api/chat", base),
                sensor_endpoint: format!("{}/crios", base),
                use_proxy: false,
                ..ClientConfig::default()
            })
            .unwrap()
        }

        fn split_request(raw: &str) -> (String, String) {
            let (head, body) = raw.split_once("\r\n\r\n").unwrap();
            (head.to_lowercase(), body.to_string())
        }

        #[tokio::test]
        async fn test_chat_posts_json_and_keeps_content_next_to_error() {
            let (base, server) = serve_once(
                "200 OK",
                r#"{"message":{"role":"assistant","content":"Omelette"},"error":"warn","done":true}"#,
            )
            .await;
            let client = client_for(&base);

            let request = ChatRequest::single("llama3.1:latest", ChatMessage::user("hi"));
            let response = client.chat(&request).await.unwrap();
            assert_eq!(response.message.content, "Omelette");
            assert_eq!(response.error.as_deref(), Some("warn"));

            let (head, body) = split_request(&server.await.unwrap());
            assert!(head.starts_with("post /api/chat http/1.1"));
            assert!(head.contains("content-type: application/json"));
            assert_eq!(
                body,
                r#"{"model":"llama3.1:latest","messages":[{"role":"user","content":"hi"}],"stream":false}"#
            );
        }

        #[tokio::test]
        async fn test_chat_error_body_becomes_api_error() {
            let (base, server) =
                serve_once("404 Not Found", r#"{"error":"model 'mistral' not found"}"#).await;
            let client = client_for(&base);

            let request = ChatRequest::single("mistral", ChatMessage::user("hi"));
            let err = client.chat(&request).await.unwrap_err();
            match err {
                FridgeError::Api { status, message, .. } => {
                    assert_eq!(status, 404);
                    assert_eq!(message, "model 'mistral' not found");
                }
                other => panic!("unexpected error: {other}"),
            }
            server.await.unwrap();
        }

        #[tokio::test]
        async fn test_current_temperature_gets_sensor_resource() {
            let (base, server) =
                serve_once("200 OK", r#"{"status":"success","data":{"temperature":4}}"#).await;
            let client = client_for(&base);

            let response = client.current_temperature().await.unwrap();
            assert_eq!(response.data.temperature, 4);

            let (head, _) = split_request(&server.await.unwrap());
            assert!(head.starts_with("get /crios/gettemp.php http/1.1"));
        }

        #[tokio::test]
        async fn test_temperature_history_gets_api_resource() {
            let (base, server) = serve_once(
                "200 OK",
                r#"[{"id":1,"temperature":4.5,"humidity":41,"timestamp":"2024-11-02T08:00:00"}]"#,
            )
            .await;
            let client = client_for(&base);

            let history = client.temperature_history().await.unwrap();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].temperature, 4.5);

            let (head, _) = split_request(&server.await.unwrap());
            assert!(head.starts_with("get /crios/api.php http/1.1"));
        }

        #[tokio::test]
        async fn test_unreachable_sensor_is_network_error() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            drop(listener);

            let err = client_for(&base).current_temperature().await.unwrap_err();
            assert!(err.is_network_error());
        }
    }
}
