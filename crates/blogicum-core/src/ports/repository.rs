use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentEntry, Post, PostEntry, User};
use crate::error::RepoError;
use crate::policy::PostQuery;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their public handle.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Find a category by slug, published or not.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Post repository.
///
/// Deleting a post also deletes its comments.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of the posts selected by `query`, in listing order.
    async fn list(&self, query: &PostQuery, page: PageRequest)
    -> Result<Page<PostEntry>, RepoError>;

    /// A single post with author, category and comment count, regardless
    /// of visibility.
    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments under a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError>;
}

/// 1-based page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Zero-based page index.
    pub fn index(&self) -> u64 {
        self.page - 1
    }

    /// Rows to skip. Saturates for pages no listing can reach.
    pub fn offset(&self) -> u64 {
        self.index().saturating_mul(self.per_page)
    }
}

/// One page of results plus the totals needed to render a paginator.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total_items,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.per_page)
    }

    /// Page 1 always exists, even when the listing is empty.
    pub fn is_out_of_range(&self) -> bool {
        self.page > 1 && self.page > self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps_to_first_page() {
        let request = PageRequest::new(0, 10);
        assert_eq!(request.page, 1);
        assert_eq!(request.offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        assert_eq!(PageRequest::new(u64::MAX, 10).offset(), u64::MAX);
    }

    #[test]
    fn test_total_pages_and_range() {
        let page: Page<()> = Page::new(vec![], PageRequest::new(1, 10), 0);
        assert_eq!(page.total_pages(), 0);
        assert!(!page.is_out_of_range());

        let page: Page<()> = Page::new(vec![], PageRequest::new(3, 10), 21);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.is_out_of_range());

        let page: Page<()> = Page::new(vec![], PageRequest::new(4, 10), 21);
        assert!(page.is_out_of_range());
    }
}
