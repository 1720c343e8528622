use crate::error::{Result, StoreError};
use crate::store::ImageStore;
use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Index range covered by a 1-indexed page. Pages below 1 are read as page 1.
pub fn page_bounds(page: i64, page_size: usize) -> Range<usize> {
    let page = usize::try_from(page.max(1)).unwrap_or(usize::MAX);
    let start = (page - 1).saturating_mul(page_size);
    start..start.saturating_add(page_size)
}

/// One page of the current listing, recomputed on every call.
///
/// A listing failure is logged and read as an empty folder, so it surfaces as
/// `NoMoreResults` like any other empty page.
pub fn get_page(store: &ImageStore, page: i64, page_size: usize) -> Result<Vec<String>> {
    let images = store.list_images().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "image listing failed, treating as empty");
        Vec::new()
    });
    let bounds = page_bounds(page, page_size);
    let start = bounds.start.min(images.len());
    let end = bounds.end.min(images.len());
    let slice = images[start..end].to_vec();
    if slice.is_empty() {
        return Err(StoreError::NoMoreResults { page });
    }
    Ok(slice)
}
