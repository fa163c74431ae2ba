//! Snapshotting quote state into a string-keyed store and restoring it.
//!
//! Key names and value encodings match what the browser widget writes, so a
//! store populated by the widget restores here unchanged. Absent values are
//! removed on save; on load the widget's `"null"` and empty-string sentinels
//! are read as absent.

use std::{
    collections::{BTreeSet, HashMap},
    str::FromStr,
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use shared::domain::{AddonKind, BracketType, LineItem, SizeClass, WallType};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    cart::{QuoteCart, QuoteState},
    selection::Selection,
};

pub const CART_ITEMS_KEY: &str = "lg_quoteItems";
pub const SELECTION_SIZE_KEY: &str = "lg_currentSize";
pub const SELECTION_BRACKET_KEY: &str = "lg_currentBracket";
pub const SELECTION_WALL_KEY: &str = "lg_currentWall";
pub const EDITING_INDEX_KEY: &str = "lg_editingIndex";
pub const SELECTION_ADDONS_KEY: &str = "lg_selectedAddons";

const SELECTION_KEYS: [&str; 5] = [
    SELECTION_SIZE_KEY,
    SELECTION_BRACKET_KEY,
    SELECTION_WALL_KEY,
    EDITING_INDEX_KEY,
    SELECTION_ADDONS_KEY,
];

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
}

/// Process-local store, used when nothing durable is configured and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Stored state that could not be used. Logged and replaced by defaults.
#[derive(Debug, Error)]
enum PersistenceCorruption {
    #[error("store read failed: {0:#}")]
    Read(anyhow::Error),
    #[error("value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("value is not a JSON array")]
    NotASequence,
    #[error("unrecognised value {0:?}")]
    UnknownValue(String),
    #[error("cart entry {position} is unusable: {source}")]
    CartEntry {
        position: usize,
        source: serde_json::Error,
    },
    #[error("editing index {index} is outside a cart of {len}")]
    EditingOutOfRange { index: usize, len: usize },
    #[error("editing index is set but the selection is incomplete")]
    EditingIncompleteSelection,
}

fn report(key: &str, corruption: PersistenceCorruption) {
    warn!(key, error = %corruption, "persistence: discarding corrupt stored state");
}

pub struct PersistenceAdapter<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrites every persisted key with the given state. Write failures are
    /// logged and otherwise ignored.
    pub async fn save(&self, state: &QuoteState) {
        let selection = &state.selection;
        let items = match serde_json::to_string(state.cart.items()) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "persistence: failed to encode cart; skipping save");
                return;
            }
        };
        let addons = serde_json::to_string(selection.addons())
            .unwrap_or_else(|_| "[]".to_string());

        self.write(CART_ITEMS_KEY, Some(items)).await;
        self.write(SELECTION_SIZE_KEY, selection.size().map(|v| v.key().to_string()))
            .await;
        self.write(
            SELECTION_BRACKET_KEY,
            selection.bracket().map(|v| v.key().to_string()),
        )
        .await;
        self.write(SELECTION_WALL_KEY, selection.wall().map(|v| v.key().to_string()))
            .await;
        self.write(
            EDITING_INDEX_KEY,
            selection.editing_index().map(|index| index.to_string()),
        )
        .await;
        self.write(SELECTION_ADDONS_KEY, Some(addons)).await;

        debug!(
            items = state.cart.len(),
            editing_index = ?selection.editing_index(),
            "persistence: saved quote state"
        );
    }

    /// Restores the last saved state. Never fails: anything unreadable falls
    /// back to an empty value, and an empty cart always starts a fresh session.
    pub async fn load(&self) -> QuoteState {
        let items = self.load_cart().await;
        if items.is_empty() {
            self.clear_selection_keys().await;
            return QuoteState::default();
        }

        let size = self.read_key::<SizeClass>(SELECTION_SIZE_KEY).await;
        let bracket = self.read_key::<BracketType>(SELECTION_BRACKET_KEY).await;
        let wall = self.read_key::<WallType>(SELECTION_WALL_KEY).await;
        let addons = self.read_addons().await;
        let mut editing_index = self.read_editing_index(items.len()).await;

        if editing_index.is_some() && (size.is_none() || bracket.is_none() || wall.is_none()) {
            report(
                EDITING_INDEX_KEY,
                PersistenceCorruption::EditingIncompleteSelection,
            );
            editing_index = None;
        }

        let selection = Selection::from_parts(size, bracket, wall, addons, editing_index);
        QuoteState::new(QuoteCart::from(items), selection)
    }

    pub async fn clear(&self) {
        self.write(CART_ITEMS_KEY, None).await;
        self.clear_selection_keys().await;
    }

    async fn write(&self, key: &str, value: Option<String>) {
        let result = match value {
            Some(value) => self.store.set(key, &value).await,
            None => self.store.remove(key).await,
        };
        if let Err(err) = result {
            warn!(key, error = %err, "persistence: store write failed");
        }
    }

    async fn clear_selection_keys(&self) {
        for key in SELECTION_KEYS {
            self.write(key, None).await;
        }
    }

    async fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value.filter(|raw| !is_absent_sentinel(raw)),
            Err(err) => {
                report(key, PersistenceCorruption::Read(err));
                None
            }
        }
    }

    async fn load_cart(&self) -> Vec<LineItem> {
        let Some(raw) = self.read_raw(CART_ITEMS_KEY).await else {
            return Vec::new();
        };
        match decode_cart(&raw) {
            Ok(items) => items,
            Err(corruption) => {
                report(CART_ITEMS_KEY, corruption);
                Vec::new()
            }
        }
    }

    async fn read_key<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key).await?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                report(key, PersistenceCorruption::UnknownValue(raw));
                None
            }
        }
    }

    async fn read_editing_index(&self, len: usize) -> Option<usize> {
        let raw = self.read_raw(EDITING_INDEX_KEY).await?;
        let Ok(index) = raw.trim().parse::<usize>() else {
            report(EDITING_INDEX_KEY, PersistenceCorruption::UnknownValue(raw));
            return None;
        };
        if index >= len {
            report(
                EDITING_INDEX_KEY,
                PersistenceCorruption::EditingOutOfRange { index, len },
            );
            return None;
        }
        Some(index)
    }

    async fn read_addons(&self) -> BTreeSet<AddonKind> {
        let Some(raw) = self.read_raw(SELECTION_ADDONS_KEY).await else {
            return BTreeSet::new();
        };
        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                report(SELECTION_ADDONS_KEY, PersistenceCorruption::NotASequence);
                return BTreeSet::new();
            }
            Err(err) => {
                report(SELECTION_ADDONS_KEY, err.into());
                return BTreeSet::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|entry| match entry.as_str().and_then(AddonKind::from_key) {
                Some(addon) => Some(addon),
                None => {
                    report(
                        SELECTION_ADDONS_KEY,
                        PersistenceCorruption::UnknownValue(entry.to_string()),
                    );
                    None
                }
            })
            .collect()
    }
}

fn is_absent_sentinel(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "null" || trimmed == "undefined"
}

/// Decodes the cart array, dropping individual entries that do not describe a
/// usable line item.
fn decode_cart(raw: &str) -> Result<Vec<LineItem>, PersistenceCorruption> {
    let Value::Array(entries) = serde_json::from_str::<Value>(raw)? else {
        return Err(PersistenceCorruption::NotASequence);
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(
            |(position, entry)| match serde_json::from_value::<LineItem>(entry) {
                Ok(item) => Some(item),
                Err(source) => {
                    report(
                        CART_ITEMS_KEY,
                        PersistenceCorruption::CartEntry { position, source },
                    );
                    None
                }
            },
        )
        .collect())
}

#[cfg(test)]
#[path = "tests/persistence_tests.rs"]
mod tests;
