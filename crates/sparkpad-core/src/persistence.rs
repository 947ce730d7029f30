// SPDX-License-Identifier: AGPL-3.0-or-later
//! Snapshot persistence against an injected key-value store

use crate::model::ContentState;
use crate::snapshot;
use crate::storage::Result;
use crate::traits::KeyValueStore;

/// Keeps the stored snapshot in step with the live document
#[derive(Debug)]
pub struct PersistenceAdapter<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Restore the stored document
    ///
    /// An absent or unreadable snapshot yields an empty document; only a
    /// failing store is reported as an error.
    pub fn load_initial(&self) -> Result<ContentState> {
        let Some(json) = self.store.get(&self.key)? else {
            tracing::info!(key = %self.key, "no stored snapshot, starting empty");
            return Ok(ContentState::empty());
        };

        match snapshot::deserialize(&json) {
            Ok(content) => {
                tracing::info!(
                    key = %self.key,
                    blocks = content.blocks().len(),
                    "restored snapshot"
                );
                Ok(content)
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding unreadable snapshot");
                Ok(ContentState::empty())
            }
        }
    }

    /// Re-save the full document after an accepted change
    pub fn on_change(&mut self, content: &ContentState) -> Result<()> {
        let json = snapshot::serialize(content)?;
        self.store.set(&self.key, &json)?;
        tracing::trace!(key = %self.key, bytes = json.len(), "snapshot written");
        Ok(())
    }

    /// Explicit save, same semantics as [`PersistenceAdapter::on_change`]
    pub fn save_now(&mut self, content: &ContentState) -> Result<()> {
        self.on_change(content)?;
        tracing::info!(key = %self.key, "saved");
        Ok(())
    }
}
