//! In-memory rep lookup

use std::collections::HashMap;

use quotesync_domain::{Rep, Result};
use tracing::debug;

use crate::sync::ports::RepSource;

/// Name → rep table, loaded once per sweep or webhook delivery.
///
/// Lookups trim both the stored name and the queried name and are otherwise exact.
#[derive(Debug, Clone, Default)]
pub struct RepDirectory {
    by_name: HashMap<String, Rep>,
}

impl RepDirectory {
    pub async fn load(source: &dyn RepSource) -> Result<Self> {
        let reps = source.load_reps().await?;
        let directory = Self::from_reps(reps);
        debug!(reps = directory.len(), "rep directory loaded");
        Ok(directory)
    }

    /// Build from rows. The first of any duplicate names wins.
    pub fn from_reps(reps: impl IntoIterator<Item = Rep>) -> Self {
        let mut by_name = HashMap::new();
        for rep in reps {
            by_name.entry(rep.name.trim().to_string()).or_insert(rep);
        }
        Self { by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<&Rep> {
        self.by_name.get(name.trim())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
