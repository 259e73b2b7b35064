use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Exact-match list filter: JSON field name to raw value.
pub type Filter = BTreeMap<String, String>;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page size limits applied by [`crate::Dao::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitCfg {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "max_page_size")]
    pub max_page_size: u64,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn max_page_size() -> u64 {
    MAX_PAGE_SIZE
}

impl Default for LimitCfg {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl LimitCfg {
    /// Clamp a requested page and size into `page >= 1` and `1 <= size <= max_page_size`.
    #[must_use]
    pub fn clamp(&self, page: i64, size: i64) -> (u64, u64) {
        let page = u64::try_from(page).unwrap_or(0).max(1);
        let size = u64::try_from(size)
            .unwrap_or(0)
            .clamp(1, self.max_page_size.max(1));
        (page, size)
    }
}

/// One page of a listing plus the total number of matching records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}

impl<T> Page<T> {
    /// Number of pages needed to show `total` records at this page size.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(self.size.max(1))
    }
}
