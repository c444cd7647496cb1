//! Department label normalization

use std::collections::BTreeMap;

use quotesync_domain::default_departments;

/// Maps free-text provider department labels to canonical codes.
///
/// Matching is exact: no trimming and no case folding. A miss is a normal
/// outcome and tells the caller to drop the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentNormalizer {
    table: BTreeMap<String, String>,
}

impl DepartmentNormalizer {
    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self { table }
    }

    pub fn normalize(&self, label: &str) -> Option<&str> {
        self.table.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for DepartmentNormalizer {
    fn default() -> Self {
        Self::new(default_departments())
    }
}
