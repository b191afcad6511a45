//! Offset/limit page arithmetic.

use serde::Serialize;

/// Maximum items per page (enforced for every listing).
pub const MAX_ITEMS_PER_PAGE: u32 = 100;

/// Row window for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Zero-based index of the first row.
    pub offset: u64,
    /// Maximum number of rows.
    pub limit: u64,
}

impl PageWindow {
    /// Window for a 1-based page. Page 0 is treated as page 1.
    pub fn for_page(page: u32, per_page: u32) -> Self {
        let per_page = clamp_per_page(per_page);
        let offset = u64::from(page.max(1) - 1) * u64::from(per_page);
        Self {
            offset,
            limit: u64::from(per_page),
        }
    }

    /// Inclusive index of the last row in the window.
    pub fn last_index(&self) -> u64 {
        (self.offset + self.limit).saturating_sub(1)
    }
}

/// Apply the page size cap. A page size of zero becomes one.
pub fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, MAX_ITEMS_PER_PAGE)
}

/// Number of pages needed to show `total` rows.
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
