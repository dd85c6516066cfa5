//! Domain entities - the core business objects.

mod category;
mod comment;
mod post;
mod user;

use uuid::Uuid;

pub use category::Category;
pub use comment::{Comment, CommentEntry};
pub use post::{Post, PostDraft, PostEntry};
pub use user::User;

/// Anything owned by a single user.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}
