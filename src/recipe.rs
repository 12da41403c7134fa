//! Recipe suggestions from a selection of fridge items

use fridge_protocol::ChatMessage;
use tracing::{info, warn};

use crate::chat::{complete, Models};
use crate::client::ChatBackend;
use crate::error::{FridgeError, Result};
use crate::templates::{RECIPE_ITEM_SEPARATOR, RECIPE_PROMPT_PREFIX};

/// Items picked for a recipe, in the order they were picked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `item` if absent, deselect it otherwise; returns whether it is now selected
    pub fn toggle(&mut self, item: &str) -> bool {
        if self.contains(item) {
            self.items.retain(|selected| selected != item);
            false
        } else {
            self.items.push(item.to_string());
            true
        }
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|selected| selected == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Prompt asking for a short recipe with the selected items
    pub fn prompt(&self) -> String {
        recipe_prompt(&self.items)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for item in iter {
            let item = item.as_ref().trim();
            if !item.is_empty() && !selection.contains(item) {
                selection.items.push(item.to_string());
            }
        }
        selection
    }
}

pub fn recipe_prompt<S: AsRef<str>>(items: &[S]) -> String {
    let joined = items
        .iter()
        .map(|item| item.as_ref())
        .collect::<Vec<_>>()
        .join(RECIPE_ITEM_SEPARATOR);
    format!("{}{}", RECIPE_PROMPT_PREFIX, joined)
}

/// Asks the text model for a short recipe
pub struct RecipeService<'a, C: ChatBackend> {
    backend: &'a C,
    models: Models,
}

impl<'a, C: ChatBackend> RecipeService<'a, C> {
    pub fn new(backend: &'a C, models: Models) -> Self {
        Self { backend, models }
    }

    pub async fn generate(&self, selection: &Selection) -> Result<String> {
        if selection.is_empty() {
            return Err(FridgeError::validation_field(
                "Select at least one item to generate a recipe",
                "items",
            ));
        }

        info!(items = selection.items().len(), "requesting recipe");
        complete(self.backend, &self.models, ChatMessage::user(selection.prompt()))
            .await
            .inspect_err(|e| warn!(error = %e, "recipe request failed"))
    }
}
