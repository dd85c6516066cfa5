//! Public profile pages and editing of the current user's profile.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::error::DomainError;
use blogicum_core::ports::BaseRepository;
use blogicum_core::{PostFilter, PostQuery};
use blogicum_shared::dto::{PageQuery, ProfileForm, ProfilePageResponse};

use super::auth::current_user;
use super::pagination::{load_page, page_request};
use super::presenters::{post_page, user_response};
use super::redirect::{profile_url, see_other};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/profiles/{username}
///
/// The owner sees all of their posts; everyone else only live ones.
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(DomainError::user_not_found)?;

    let request = page_request(&query, state.posts_per_page)?;
    let query = PostQuery::new(&identity.viewer(), PostFilter::author(username), Utc::now());
    let page = load_page(state.posts.as_ref(), &query, request).await?;

    Ok(HttpResponse::Ok().json(ProfilePageResponse {
        profile: user_response(user),
        page: post_page(page),
    }))
}

/// PUT /api/profile
pub async fn edit_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ProfileForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    form.validate().map_err(AppError::Validation)?;

    let mut user = current_user(&state, &identity).await?;

    if let Some(other) = state.users.find_by_username(&form.username).await? {
        if other.id != user.id {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
    }
    if let Some(other) = state.users.find_by_email(&form.email).await? {
        if other.id != user.id {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
    }

    user.username = form.username;
    user.email = form.email;
    user.first_name = form.first_name;
    user.last_name = form.last_name;
    user.updated_at = Utc::now();

    let user = state.users.update(user).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "Profile updated");

    Ok(see_other(profile_url(&user.username)))
}
