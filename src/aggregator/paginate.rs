//! Local pagination over a fully ranked pool.
//!
//! Converts a ranked item pool plus a page request into a bounded slice
//! with page metadata. Out-of-range page numbers clamp instead of erroring,
//! and `total_pages` is at least 1 even for an empty pool.

use crate::types::{Item, PageResult};

/// Slice one page out of a ranked pool.
///
/// `page` is 1-based; values below 1 clamp up to 1 and values past the last
/// page clamp down to it. `page_size` below 1 is treated as 1.
pub fn paginate(pool: Vec<Item>, page: usize, page_size: usize, query: &str) -> PageResult {
    let page_size = page_size.max(1);
    let total_results = pool.len();
    let total_pages = total_results.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_results);
    let items = if start < total_results {
        pool[start..end].to_vec()
    } else {
        Vec::new()
    };

    PageResult {
        query: query.to_string(),
        page,
        page_size,
        total_results,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
        items,
        continuation: None,
    }
}
