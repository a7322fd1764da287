//! Request types shared across the API

/// Pagination query parameters
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-based, default: 1)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page (default: 50, max: 200)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    50
}

impl PaginationQuery {
    /// Offset for database queries
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1) * self.limit()
    }

    /// Limit (clamped to max 200)
    pub fn limit(&self) -> u32 {
        std::cmp::min(self.per_page, 200)
    }
}
