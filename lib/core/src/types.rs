use serde::{Deserialize, Serialize};

/// Offset pagination parameters, 1-based.
///
/// `skip` is computed as `(page - 1) * limit`. This is classic offset
/// pagination: it is not stable under concurrent inserts/deletes into
/// the source collection between page requests — an item may be skipped
/// or show up twice across pages. Accepted limitation.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    /// 1-based page number. Values below 1 are clamped to 1.
    #[serde(default = "default_page")]
    pub page: usize,

    /// Maximum number of results per page. Values below 1 are clamped to 1.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageParams {
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Page size after clamping.
    pub fn limit(&self) -> usize {
        self.limit.max(1)
    }

    /// Number of records to skip: `(page - 1) * limit`.
    pub fn skip(&self) -> usize {
        (self.page.max(1) - 1) * self.limit()
    }

    /// Same parameters with a different default limit applied when the
    /// caller did not override it (the liked-videos view pages by 20).
    pub fn or_limit(mut self, limit: usize) -> Self {
        if self.limit == default_limit() {
            self.limit = limit;
        }
        self
    }
}

/// Result wrapper for list operations.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult<T: Serialize> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Generate a new random ID (UUIDv4, no dashes — 32 lowercase hex chars).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }

    #[test]
    fn skip_is_offset_times_limit() {
        assert_eq!(PageParams::new(1, 10).skip(), 0);
        assert_eq!(PageParams::new(3, 10).skip(), 20);
        assert_eq!(PageParams::new(2, 20).skip(), 20);
    }

    #[test]
    fn zero_page_and_limit_clamp_to_one() {
        let p = PageParams::new(0, 0);
        assert_eq!(p.skip(), 0);
        assert_eq!(p.limit(), 1);
    }

    #[test]
    fn or_limit_only_replaces_the_default() {
        assert_eq!(PageParams::default().or_limit(20).limit(), 20);
        assert_eq!(PageParams::new(1, 5).or_limit(20).limit(), 5);
    }
}
