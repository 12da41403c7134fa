//! Chat session with the local LLM

use fridge_protocol::{ChatMessage, ChatRequest, Role};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::ChatBackend;
use crate::config::ClientConfig;
use crate::error::{FridgeError, Result};
use crate::utils::ImageUtils;

/// An image attached to a user message
#[derive(Debug, Clone)]
pub struct Attachment {
    pub path: PathBuf,
    /// PNG bytes, base64 encoded
    pub base64_png: String,
}

impl Attachment {
    pub async fn from_path(path: &Path) -> Result<Self> {
        let base64_png = ImageUtils::encode_file_as_png_base64(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
            base64_png,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// One chat turn; immutable once created
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub image: Option<Attachment>,
}

impl Message {
    pub fn user(content: impl Into<String>, image: Option<Attachment>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            image,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            image: None,
        }
    }

    /// Wire form of this message
    pub fn to_wire(&self) -> ChatMessage {
        let message = ChatMessage {
            role: self.role,
            content: self.content.clone(),
            images: None,
        };
        match &self.image {
            Some(image) => message.with_image(image.base64_png.clone()),
            None => message,
        }
    }
}

// Attachments are not compared
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.role == other.role && self.content == other.content
    }
}

impl Eq for Message {}

/// Lifecycle of a single request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

/// Models used for text-only and image prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Models {
    pub text: String,
    pub vision: String,
}

impl Models {
    pub fn new(text: impl Into<String>, vision: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            vision: vision.into(),
        }
    }

    /// The vision model is only used when the message carries images
    pub fn for_message(&self, message: &ChatMessage) -> &str {
        if message.has_images() {
            &self.vision
        } else {
            &self.text
        }
    }
}

impl From<&ClientConfig> for Models {
    fn from(config: &ClientConfig) -> Self {
        Self::new(&config.text_model, &config.vision_model)
    }
}

/// Send one user message and return the generated content
pub async fn complete<C: ChatBackend>(
    backend: &C,
    models: &Models,
    message: ChatMessage,
) -> Result<String> {
    let model = models.for_message(&message).to_string();
    let request = ChatRequest::single(&model, message);

    debug!(%model, images = request.messages[0].has_images(), "sending chat request");
    let response = backend.chat(&request).await?;

    Ok(response.message.content)
}

/// Ordered list of messages exchanged during a session
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Free-form chat; only the latest user message is sent to the endpoint
pub struct ChatSession<'a, C: ChatBackend> {
    backend: &'a C,
    models: Models,
    conversation: Conversation,
    state: RequestState,
}

impl<'a, C: ChatBackend> ChatSession<'a, C> {
    pub fn new(backend: &'a C, models: Models) -> Self {
        Self {
            backend,
            models,
            conversation: Conversation::new(),
            state: RequestState::Idle,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Send `text` with an optional image and wait for the assistant's answer
    ///
    /// The user message stays in the conversation even when the request fails.
    pub async fn send(&mut self, text: &str, image: Option<Attachment>) -> Result<&Message> {
        if text.trim().is_empty() && image.is_none() {
            return Err(FridgeError::invalid_input(
                "Message must contain text or an image",
            ));
        }

        let user_message = Message::user(text, image);
        let wire = user_message.to_wire();
        self.conversation.push(user_message);

        self.state = RequestState::Pending;
        match complete(self.backend, &self.models, wire).await {
            Ok(content) => {
                self.conversation.push(Message::assistant(content));
                self.state = RequestState::Succeeded;
                self.conversation
                    .messages()
                    .last()
                    .ok_or_else(|| FridgeError::internal("Conversation unexpectedly empty"))
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                self.state = RequestState::Failed(e.to_string());
                Err(e)
            }
        }
    }
}
