//! `?page=N` handling shared by every listing.

use blogicum_core::PostQuery;
use blogicum_core::domain::PostEntry;
use blogicum_core::ports::{Page, PageRequest, PostRepository};
use blogicum_shared::dto::PageQuery;

use crate::middleware::error::{AppError, AppResult};

pub fn page_request(query: &PageQuery, per_page: u64) -> AppResult<PageRequest> {
    match query.page {
        None => Ok(PageRequest::new(1, per_page)),
        Some(0) => Err(AppError::BadRequest(
            "page must be a positive integer".to_string(),
        )),
        // No listing holds u64::MAX rows, so such a page is past the end.
        Some(page) if page.checked_mul(per_page).is_none() => {
            Err(AppError::NotFound("Page not found".to_string()))
        }
        Some(page) => Ok(PageRequest::new(page, per_page)),
    }
}

/// Fetch a page of posts. Pages past the end are `404`; page 1 always exists.
pub async fn load_page(
    posts: &dyn PostRepository,
    query: &PostQuery,
    request: PageRequest,
) -> AppResult<Page<PostEntry>> {
    let page = posts.list(query, request).await?;
    if page.is_out_of_range() {
        return Err(AppError::NotFound("Page not found".to_string()));
    }
    Ok(page)
}
