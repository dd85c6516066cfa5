//! Post handlers.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use blogicum_core::domain::{Post, PostDraft, PostEntry};
use blogicum_core::error::DomainError;
use blogicum_core::ports::BaseRepository;
use blogicum_core::{PostFilter, PostQuery, Viewer, can_mutate};
use blogicum_shared::dto::{PageQuery, PostDetailResponse, PostForm};

use super::auth::current_user;
use super::pagination::{load_page, page_request};
use super::presenters::{comment_response, post_page, post_response};
use super::redirect::{post_detail_url, profile_url, see_other};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Load a post the viewer is allowed to see. Hidden and absent posts
/// produce the same error.
pub(super) async fn visible_entry(
    state: &AppState,
    post_id: Uuid,
    viewer: &Viewer,
    now: DateTime<Utc>,
) -> AppResult<PostEntry> {
    state
        .posts
        .find_entry(post_id)
        .await?
        .filter(|entry| entry.is_visible_to(viewer, now))
        .ok_or_else(|| DomainError::post_not_found().into())
}

/// Validate the form and resolve its category.
async fn draft_from(state: &AppState, form: PostForm) -> AppResult<PostDraft> {
    form.validate().map_err(AppError::Validation)?;

    if state.categories.find_by_id(form.category_id).await?.is_none() {
        return Err(AppError::Validation(vec![
            "category does not exist".to_string(),
        ]));
    }

    Ok(PostDraft {
        title: form.title.trim().to_string(),
        text: form.text,
        pub_date: form.pub_date,
        is_published: form.is_published,
        category_id: form.category_id,
    })
}

/// GET /api/posts
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = page_request(&query, state.posts_per_page)?;
    let query = PostQuery::new(&identity.viewer(), PostFilter::default(), Utc::now());
    let page = load_page(state.posts.as_ref(), &query, request).await?;

    Ok(HttpResponse::Ok().json(post_page(page)))
}

/// GET /api/posts/{id}
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let entry = visible_entry(&state, path.into_inner(), &identity.viewer(), Utc::now()).await?;
    let comments = state.comments.list_for_post(entry.post.id).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: post_response(entry),
        comments: comments.into_iter().map(comment_response).collect(),
    }))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let draft = draft_from(&state, body.into_inner()).await?;
    let author = current_user(&state, &identity).await?;

    let post = state.posts.insert(Post::new(author.id, draft)).await?;
    tracing::info!(post_id = %post.id, author = %author.username, "Post created");

    Ok(see_other(profile_url(&author.username)))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let viewer = identity.viewer();
    let entry = visible_entry(&state, post_id, &viewer, Utc::now()).await?;

    if !can_mutate(&entry, &viewer) {
        tracing::warn!(%post_id, user_id = %identity.user_id, "Rejected edit of another user's post");
        return Ok(see_other(post_detail_url(post_id)));
    }

    let draft = draft_from(&state, body.into_inner()).await?;
    let mut post = entry.post;
    post.apply(draft);
    state.posts.update(post).await?;
    tracing::info!(%post_id, "Post updated");

    Ok(see_other(post_detail_url(post_id)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let viewer = identity.viewer();
    let entry = visible_entry(&state, post_id, &viewer, Utc::now()).await?;

    if !can_mutate(&entry, &viewer) {
        tracing::warn!(%post_id, user_id = %identity.user_id, "Rejected delete of another user's post");
        return Ok(see_other(post_detail_url(post_id)));
    }

    state.posts.delete(post_id).await?;
    tracing::info!(%post_id, "Post deleted");

    Ok(see_other(profile_url(&entry.author.username)))
}
