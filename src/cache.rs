use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;
use once_cell::sync::Lazy;

use crate::config::DatasetConfig;
use crate::engine::PivotDataset;

/// Process-wide dataset cache shared by every chart.
pub static DATASETS: Lazy<DatasetCache> = Lazy::new(DatasetCache::new);

// ---------------------------------------------------------------------------
// DatasetCache – load each dataset once, share it read-only
// ---------------------------------------------------------------------------

/// Loaded datasets keyed by their full configuration.
///
/// Two catalogs that reuse an id for a different source (or rule, or
/// palette) get separate entries. Entries are inserted once and never
/// replaced; callers hold `Arc<PivotDataset>` handles and query them
/// without further locking.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: RwLock<HashMap<DatasetConfig, Arc<PivotDataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, config: &DatasetConfig) -> Option<Arc<PivotDataset>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(config)
            .cloned()
    }

    /// Return the cached dataset for `config`, running `load` only on a miss.
    ///
    /// The loader runs outside the lock. If two callers race on the same
    /// config the first insert wins and both receive that entry.
    pub fn get_or_try_insert_with<E>(
        &self,
        config: &DatasetConfig,
        load: impl FnOnce() -> Result<PivotDataset, E>,
    ) -> Result<Arc<PivotDataset>, E> {
        if let Some(hit) = self.get(config) {
            return Ok(hit);
        }

        let loaded = Arc::new(load()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.entry(config.clone()).or_insert(loaded).clone())
    }

    /// Load `config.source` on first use.
    pub fn get_or_load(&self, config: &DatasetConfig) -> Result<Arc<PivotDataset>> {
        self.get_or_try_insert_with(config, || {
            log::info!("Loading dataset '{}'", config.id);
            PivotDataset::load(config.clone())
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
