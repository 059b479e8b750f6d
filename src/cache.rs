//! Session-scoped cache of ingestion + cleaning results.
//!
//! Entries are keyed by the SHA-256 digest of the uploaded bytes and live for
//! the lifetime of the cache; there is no eviction.

use std::{collections::HashMap, sync::Arc};

use log::debug;
use sha2::{Digest, Sha256};

use crate::{
    config::PipelineConfig,
    error::IngestError,
    io_utils,
    pipeline::{self, CleanedTable},
};

pub type ContentKey = [u8; 32];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Delimiter and pipeline configuration are fixed per cache, so the content
/// digest alone identifies a cleaned table.
#[derive(Debug)]
pub struct IngestCache {
    delimiter: u8,
    config: PipelineConfig,
    entries: HashMap<ContentKey, Arc<CleanedTable>>,
    stats: CacheStats,
}

impl IngestCache {
    pub fn new(delimiter: u8, config: PipelineConfig) -> Self {
        Self {
            delimiter,
            config,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cleaned table for `bytes`, ingesting and cleaning only on
    /// the first request for that content. Failed ingestion is not cached.
    pub fn load(&mut self, bytes: &[u8]) -> Result<Arc<CleanedTable>, IngestError> {
        let key = content_key(bytes);
        if let Some(hit) = self.entries.get(&key) {
            self.stats.hits += 1;
            debug!("Cache hit for content {}", short_hex(&key));
            return Ok(Arc::clone(hit));
        }
        self.stats.misses += 1;
        debug!("Cache miss for content {}", short_hex(&key));
        let raw = io_utils::ingest_bytes(bytes, self.delimiter)?;
        let cleaned = Arc::new(pipeline::clean(raw, &self.config));
        self.entries.insert(key, Arc::clone(&cleaned));
        Ok(cleaned)
    }
}

pub fn content_key(bytes: &[u8]) -> ContentKey {
    Sha256::digest(bytes).into()
}

fn short_hex(key: &ContentKey) -> String {
    key.iter().take(6).map(|b| format!("{b:02x}")).collect()
}
