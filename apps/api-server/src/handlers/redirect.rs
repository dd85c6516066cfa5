//! `303 See Other` responses sent after successful or refused writes.

use actix_web::{HttpResponse, http::header};
use uuid::Uuid;

use blogicum_shared::dto::RedirectResponse;

pub fn post_detail_url(post_id: Uuid) -> String {
    format!("/api/posts/{post_id}")
}

pub fn profile_url(username: &str) -> String {
    format!("/api/profiles/{username}")
}

/// Redirect with the target in both the `Location` header and the body.
pub fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.clone()))
        .json(RedirectResponse { location })
}
