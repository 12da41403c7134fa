//! Chat endpoint DTOs
//!
//! The chat endpoint takes a single non-streamed request and answers with
//! one message. Images travel as base64 strings next to the prompt.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use crate::common::Role;

// ============================================================================
// Request DTOs
// ============================================================================

/// One message of a chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Base64 encoded images, only understood by vision models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            images: None,
        }
    }

    pub fn with_image(mut self, base64_image: impl Into<String>) -> Self {
        self.images
            .get_or_insert_with(Vec::new)
            .push(base64_image.into());
        self
    }

    pub fn has_images(&self) -> bool {
        self.images.as_ref().is_some_and(|images| !images.is_empty())
    }
}

/// Chat request body
///
/// Used for POST /api/chat
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 255))]
    pub model: String,
    #[validate(length(min = 1))]
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Build a non-streamed request carrying a single user message
    pub fn single(model: impl Into<String>, message: ChatMessage) -> Self {
        Self {
            model: model.into(),
            messages: vec![message],
            stream: false,
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Generated message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

/// Chat response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ResponseMessage,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error-only body returned when the endpoint rejects a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape_without_images() {
        let request = ChatRequest::single("llama3.1:latest", ChatMessage::user("Bonjour"));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "model": "llama3.1:latest",
                "messages": [{"role": "user", "content": "Bonjour"}],
                "stream": false
            })
        );
    }

    #[test]
    fn test_request_shape_with_image() {
        let message = ChatMessage::user("Quel aliment ?").with_image("aGVsbG8=");
        let request = ChatRequest::single("llama3.2-vision", message);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["messages"][0]["images"], json!(["aGVsbG8="]));
        assert!(request.messages[0].has_images());
    }

    #[test]
    fn test_request_validation() {
        let valid = ChatRequest::single("llama3.1:latest", ChatMessage::user("hi"));
        assert!(valid.validate().is_ok());

        let no_model = ChatRequest::single("", ChatMessage::user("hi"));
        assert!(no_model.validate().is_err());

        let no_messages = ChatRequest {
            model: "llama3.1:latest".to_string(),
            messages: vec![],
            stream: false,
        };
        assert!(no_messages.validate().is_err());
    }

    #[test]
    fn test_response_decodes_with_and_without_error() {
        let plain: ChatResponse =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"Omelette"}}"#)
                .unwrap();
        assert_eq!(plain.message.content, "Omelette");
        assert!(plain.error.is_none());

        let with_error: ChatResponse =
            serde_json::from_str(r#"{"message":{"content":""},"error":"overloaded"}"#).unwrap();
        assert_eq!(with_error.error.as_deref(), Some("overloaded"));
    }

    #[test]
    fn test_response_decode_fails_without_message() {
        assert!(serde_json::from_str::<ChatResponse>(r#"{"error":"model not found"}"#).is_err());
        assert!(serde_json::from_str::<ChatResponse>(r#"{"message":{}}"#).is_err());
        assert!(serde_json::from_str::<ChatResponse>("not json").is_err());
    }
}
