//! Category listing.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::error::DomainError;
use blogicum_core::{PostFilter, PostQuery};
use blogicum_shared::dto::{CategoryPageResponse, PageQuery};

use super::pagination::{load_page, page_request};
use super::presenters::{category_response, post_page};
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories/{slug}/posts
pub async fn category_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(|category| category.is_published)
        .ok_or_else(DomainError::category_not_found)?;

    let request = page_request(&query, state.posts_per_page)?;
    let query = PostQuery::new(&identity.viewer(), PostFilter::category(slug), Utc::now());
    let page = load_page(state.posts.as_ref(), &query, request).await?;

    Ok(HttpResponse::Ok().json(CategoryPageResponse {
        category: category_response(category),
        page: post_page(page),
    }))
}
