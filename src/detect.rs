//! Food detection from a photo using the vision model

use fridge_protocol::ChatMessage;
use tracing::{info, warn};

use crate::chat::{complete, Attachment, Models};
use crate::client::ChatBackend;
use crate::error::{FridgeError, Result};
use crate::store::Inventory;
use crate::templates::FOOD_DETECTION_PROMPT;

/// Result of a detection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub label: String,
    /// Whether the label was new to the inventory
    pub added: bool,
}

pub struct FoodDetector<'a, C: ChatBackend> {
    backend: &'a C,
    models: Models,
}

impl<'a, C: ChatBackend> FoodDetector<'a, C> {
    pub fn new(backend: &'a C, models: Models) -> Self {
        Self { backend, models }
    }

    /// Ask the vision model which food `image` shows
    pub async fn detect(&self, image: &Attachment) -> Result<String> {
        let message =
            ChatMessage::user(FOOD_DETECTION_PROMPT).with_image(image.base64_png.clone());

        let outcome = complete(self.backend, &self.models, message)
            .await
            .and_then(|answer| {
                normalize_label(&answer).ok_or_else(|| {
                    FridgeError::invalid_response(200, "Vision model returned an empty label")
                })
            });

        match outcome {
            Ok(label) => {
                info!(image = %image.file_name(), %label, "food detected");
                Ok(label)
            }
            Err(e) => {
                warn!(image = %image.file_name(), error = %e, "food detection failed");
                Err(e)
            }
        }
    }

    /// Detect the food in `image` and add it to `inventory` when it is new
    pub async fn detect_into(
        &self,
        image: &Attachment,
        inventory: &mut Inventory,
    ) -> Result<Detection> {
        let label = self.detect(image).await?;
        let added = inventory.add(&label);
        Ok(Detection { label, added })
    }
}

/// Trim whitespace and a trailing period from the model's answer
fn normalize_label(answer: &str) -> Option<String> {
    let label = answer.trim().trim_end_matches('.').trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}
