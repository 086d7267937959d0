//! History pagination
//!
//! Pages are 1-indexed. Sorting and slicing happen after retrieval, so the
//! helpers here work on in-memory item lists.

use fusion_common::api::PaginationInfo;

/// Items per page when `limit` is absent
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest accepted page size; larger requests are clamped
pub const MAX_LIMIT: u32 = 50;

pub const INVALID_PAGE_MESSAGE: &str = "Page and limit must be positive numbers";

/// Validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Parse raw `page` / `limit` query values
    ///
    /// Missing values take their defaults. Non-numeric or non-positive
    /// values are rejected with a client-facing message; `limit` above
    /// [`MAX_LIMIT`] is clamped.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, String> {
        let page = match page {
            Some(raw) => parse_positive(raw).ok_or(INVALID_PAGE_MESSAGE)?,
            None => 1,
        };
        let limit = match limit {
            Some(raw) => parse_positive(raw).ok_or(INVALID_PAGE_MESSAGE)?,
            None => DEFAULT_LIMIT,
        };

        Ok(Self {
            page,
            limit: limit.min(MAX_LIMIT),
        })
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    /// Whether items remain after this page in a collection of `total`
    pub fn has_next(&self, total: u64) -> bool {
        u64::from(self.page) * u64::from(self.limit) < total
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Items `[offset, offset + limit)` of `items`; empty past the end
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect()
    }

    /// Envelope pagination block for a collection of `total` items
    pub fn info(&self, total: u64) -> PaginationInfo {
        PaginationInfo {
            page: self.page,
            limit: self.limit,
            total,
            has_next: self.has_next(total),
            has_prev: self.has_prev(),
        }
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<i64>().ok().filter(|value| *value >= 1).map(|value| {
        u32::try_from(value).unwrap_or(u32::MAX)
    })
}
