//! Comment handlers. Every outcome short of an error redirects to the post.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use blogicum_core::domain::Comment;
use blogicum_core::error::DomainError;
use blogicum_core::ports::BaseRepository;
use blogicum_core::{Viewer, can_mutate};
use blogicum_shared::dto::CommentForm;

use super::auth::current_user;
use super::posts::visible_entry;
use super::redirect::{post_detail_url, see_other};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// A comment under a post the viewer can see.
async fn comment_on(
    state: &AppState,
    post_id: Uuid,
    comment_id: Uuid,
    viewer: &Viewer,
    now: DateTime<Utc>,
) -> AppResult<Comment> {
    visible_entry(state, post_id, viewer, now).await?;

    state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or_else(|| DomainError::comment_not_found().into())
}

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let author = current_user(&state, &identity).await?;
    let entry = visible_entry(&state, post_id, &identity.viewer(), Utc::now()).await?;

    let form = body.into_inner();
    form.validate().map_err(AppError::Validation)?;

    let comment = state
        .comments
        .insert(Comment::new(entry.post.id, author.id, form.text))
        .await?;
    tracing::info!(%post_id, comment_id = %comment.id, "Comment added");

    Ok(see_other(post_detail_url(post_id)))
}

/// PUT /api/posts/{post_id}/comments/{comment_id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let viewer = identity.viewer();
    let mut comment = comment_on(&state, post_id, comment_id, &viewer, Utc::now()).await?;

    if !can_mutate(&comment, &viewer) {
        tracing::warn!(%comment_id, user_id = %identity.user_id, "Rejected edit of another user's comment");
        return Ok(see_other(post_detail_url(post_id)));
    }

    let form = body.into_inner();
    form.validate().map_err(AppError::Validation)?;

    comment.text = form.text;
    state.comments.update(comment).await?;
    tracing::info!(%comment_id, "Comment updated");

    Ok(see_other(post_detail_url(post_id)))
}

/// DELETE /api/posts/{post_id}/comments/{comment_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let viewer = identity.viewer();
    let comment = comment_on(&state, post_id, comment_id, &viewer, Utc::now()).await?;

    if !can_mutate(&comment, &viewer) {
        tracing::warn!(%comment_id, user_id = %identity.user_id, "Rejected delete of another user's comment");
        return Ok(see_other(post_detail_url(post_id)));
    }

    state.comments.delete(comment.id).await?;
    tracing::info!(%comment_id, "Comment deleted");

    Ok(see_other(post_detail_url(post_id)))
}
