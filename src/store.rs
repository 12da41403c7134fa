//! Food inventory and its on-disk storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{FridgeError, Result};

/// Items a fresh inventory starts with
pub const DEFAULT_ITEMS: [&str; 7] = [
    "🍎 Pomme",
    "🥚 Oeuf",
    "🍌 Banane",
    "🥕 Carotte",
    "🌽 Maïs",
    "🍗 Poulet",
    "🥩 Steak",
];

/// Ordered list of unique food items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS)
    }
}

impl Inventory {
    /// Build an inventory, trimming names and dropping blanks and duplicates
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inventory = Self {
            items: Vec::new(),
            updated_at: None,
        };
        for item in items {
            inventory.insert(item.as_ref());
        }
        inventory
    }

    /// Add `name` unless it is blank or already present; returns whether it was added
    pub fn add(&mut self, name: &str) -> bool {
        let added = self.insert(name);
        if added {
            self.touch();
        }
        added
    }

    /// Remove `name`; a missing item is a no-op
    pub fn remove(&mut self, name: &str) -> bool {
        let name = name.trim();
        let before = self.items.len();
        self.items.retain(|item| item != name);

        let removed = self.items.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.items.iter().any(|item| item == name)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// First `limit` items, and whether more exist
    pub fn preview(&self, limit: usize) -> (&[String], bool) {
        let shown = &self.items[..self.items.len().min(limit)];
        (shown, self.items.len() > limit)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.items.push(name.to_string());
        true
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Inventory persistence as a JSON file
#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the inventory; a missing or empty file yields the default items
    pub fn load(&self) -> Result<Inventory> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no inventory yet, using defaults");
            return Ok(Inventory::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| FridgeError::io_from_error("Inventory read", e))?;

        if content.trim().is_empty() {
            return Ok(Inventory::default());
        }

        let stored: Inventory = serde_json::from_str(&content).map_err(|e| {
            FridgeError::serialization(format!(
                "Failed to parse inventory {}: {}",
                self.path.display(),
                e
            ))
        })?;

        // Re-normalize in case the file was edited by hand
        Ok(Inventory {
            updated_at: stored.updated_at,
            ..Inventory::new(stored.items)
        })
    }

    pub fn save(&self, inventory: &Inventory) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FridgeError::io_from_error("Inventory directory", e)
            })?;
        }

        let content = serde_json::to_string_pretty(inventory)?;
        fs::write(&self.path, content)
            .map_err(|e| FridgeError::io_from_error("Inventory write", e))?;

        debug!(path = %self.path.display(), items = inventory.len(), "inventory saved");
        Ok(())
    }
}
