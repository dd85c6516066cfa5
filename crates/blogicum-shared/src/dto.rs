//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_TITLE_LENGTH: usize = 256;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LENGTH
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

fn check_username(username: &str, errors: &mut Vec<String>) {
    if !is_valid_username(username) {
        errors.push(format!(
            "username must be 1-{MAX_USERNAME_LENGTH} letters, digits or @/./+/-/_"
        ));
    }
}

fn check_email(email: &str, errors: &mut Vec<String>) {
    if !is_valid_email(email) {
        errors.push("email is not a valid address".to_string());
    }
}

fn into_result(errors: Vec<String>) -> Result<(), Vec<String>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_username(&self.username, &mut errors);
        check_email(&self.email, &mut errors);
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            ));
        }
        into_result(errors)
    }
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Editable profile fields of the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl ProfileForm {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_username(&self.username, &mut errors);
        check_email(&self.email, &mut errors);
        into_result(errors)
    }
}

fn default_published() -> bool {
    true
}

/// Create/update body for a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default = "default_published")]
    pub is_published: bool,
    pub category_id: Uuid,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let title = self.title.trim();
        if title.is_empty() {
            errors.push("title must not be empty".to_string());
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.push(format!(
                "title must be at most {MAX_TITLE_LENGTH} characters"
            ));
        }
        if self.text.trim().is_empty() {
            errors.push("text must not be empty".to_string());
        }
        into_result(errors)
    }
}

/// Create/update body for a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        if self.text.trim().is_empty() {
            return Err(vec!["text must not be empty".to_string()]);
        }
        Ok(())
    }
}

/// Listing query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
}

/// A post as shown in listings and on its detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub author: String,
    pub category: CategoryResponse,
    pub comment_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// One page of posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<PostResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPageResponse {
    pub category: CategoryResponse,
    #[serde(flatten)]
    pub page: PostPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePageResponse {
    pub profile: UserResponse,
    #[serde(flatten)]
    pub page: PostPage,
}

/// Body sent along with every `303 See Other`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectResponse {
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_form(title: &str, text: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            text: text.to_string(),
            pub_date: Utc::now(),
            is_published: true,
            category_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_post_form_requires_title_and_text() {
        assert!(post_form("Hello", "World").validate().is_ok());

        let errors = post_form("  ", "").validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_post_form_title_length() {
        let long = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert!(post_form(&long, "text").validate().is_err());
        let exact = "x".repeat(MAX_TITLE_LENGTH);
        assert!(post_form(&exact, "text").validate().is_ok());
    }

    #[test]
    fn test_post_form_defaults_to_published() {
        let json = serde_json::json!({
            "title": "t",
            "text": "x",
            "pub_date": "2024-01-01T00:00:00Z",
            "category_id": Uuid::new_v4(),
        });
        let form: PostForm = serde_json::from_value(json).unwrap();
        assert!(form.is_published);
    }

    #[test]
    fn test_register_validation() {
        let ok = RegisterUserRequest {
            username: "alice_01".to_string(),
            email: "alice@example.com".to_string(),
            password: "long-enough".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterUserRequest {
            username: "bad name".to_string(),
            email: "nope".to_string(),
            password: "short".to_string(),
            ..ok
        };
        assert_eq!(bad.validate().unwrap_err().len(), 3);
    }

    #[test]
    fn test_comment_form_rejects_blank() {
        assert!(CommentForm { text: " \n".into() }.validate().is_err());
        assert!(CommentForm { text: "hi".into() }.validate().is_ok());
    }
}
