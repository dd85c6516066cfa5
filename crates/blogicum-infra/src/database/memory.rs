//! In-memory repositories - used when no database is configured, and in tests.
//!
//! All four repositories share one [`InMemoryDatabase`] so that listings can
//! join posts with their authors, categories and comments.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, CommentEntry, Post, PostEntry, User};
use blogicum_core::error::RepoError;
use blogicum_core::policy::{PostQuery, list_visible_posts};
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, Page, PageRequest, PostRepository,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn entry(&self, post: &Post) -> Result<PostEntry, RepoError> {
        let author = self
            .users
            .get(&post.author_id)
            .cloned()
            .ok_or_else(|| RepoError::Query(format!("post {} has no author row", post.id)))?;
        let category = self
            .categories
            .get(&post.category_id)
            .cloned()
            .ok_or_else(|| RepoError::Query(format!("post {} has no category row", post.id)))?;
        let comment_count = self
            .comments
            .values()
            .filter(|c| c.post_id == post.id)
            .count() as u64;

        Ok(PostEntry {
            post: post.clone(),
            author,
            category,
            comment_count,
        })
    }

    fn username_taken(&self, user: &User) -> bool {
        self.users
            .values()
            .any(|u| u.id != user.id && (u.username == user.username || u.email == user.email))
    }

    fn slug_taken(&self, category: &Category) -> bool {
        self.categories
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
    }

    fn check_post_refs(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("unknown author".to_string()));
        }
        if !self.categories.contains_key(&post.category_id) {
            return Err(RepoError::Constraint("unknown category".to_string()));
        }
        Ok(())
    }

    fn check_comment_refs(&self, comment: &Comment) -> Result<(), RepoError> {
        if !self.users.contains_key(&comment.author_id) {
            return Err(RepoError::Constraint("unknown author".to_string()));
        }
        if !self.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("unknown post".to_string()));
        }
        Ok(())
    }
}

/// Shared storage behind the in-memory repositories.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository { db: self.clone() }
    }

    pub fn categories(&self) -> InMemoryCategoryRepository {
        InMemoryCategoryRepository { db: self.clone() }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository { db: self.clone() }
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository { db: self.clone() }
    }
}

pub struct InMemoryUserRepository {
    db: InMemoryDatabase,
}

pub struct InMemoryCategoryRepository {
    db: InMemoryDatabase,
}

pub struct InMemoryPostRepository {
    db: InMemoryDatabase,
}

pub struct InMemoryCommentRepository {
    db: InMemoryDatabase,
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.db.tables.read().await.users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.users.contains_key(&user.id) || tables.username_taken(&user) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.db.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if tables.username_taken(&user) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        // Mirrors the ON DELETE CASCADE of the schema.
        let post_ids: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.posts.retain(|_, p| p.author_id != id);
        tables
            .comments
            .retain(|_, c| c.author_id != id && !post_ids.contains(&c.post_id));
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.db.tables.read().await.categories.get(&id).cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.categories.contains_key(&category.id) || tables.slug_taken(&category) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.db.tables.write().await;
        if !tables.categories.contains_key(&category.id) {
            return Err(RepoError::NotFound);
        }
        if tables.slug_taken(&category) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.posts.values().any(|p| p.category_id == id) {
            return Err(RepoError::Constraint("category still has posts".to_string()));
        }
        match tables.categories.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.db.tables.read().await.posts.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.check_post_refs(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.db.tables.write().await;
        if !tables.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_post_refs(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(
        &self,
        query: &PostQuery,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, RepoError> {
        let tables = self.db.tables.read().await;
        let entries = tables
            .posts
            .values()
            .map(|post| tables.entry(post))
            .collect::<Result<Vec<_>, _>>()?;

        let visible = list_visible_posts(entries, query);
        let total_items = visible.len() as u64;
        let items = visible
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.per_page).unwrap_or(usize::MAX))
            .collect();

        Ok(Page::new(items, page, total_items))
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<PostEntry>, RepoError> {
        let tables = self.db.tables.read().await;
        tables.posts.get(&id).map(|post| tables.entry(post)).transpose()
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.db.tables.read().await.comments.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.db.tables.write().await;
        if tables.comments.contains_key(&comment.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.check_comment_refs(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.db.tables.write().await;
        if !tables.comments.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_comment_refs(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        match tables.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.db.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        comments
            .into_iter()
            .map(|comment| {
                let author = tables.users.get(&comment.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("comment {} has no author row", comment.id))
                })?;
                Ok(CommentEntry {
                    comment: comment.clone(),
                    author,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use blogicum_core::domain::PostDraft;
    use blogicum_core::policy::{PostFilter, Viewer};

    use super::*;

    struct Fixture {
        users: InMemoryUserRepository,
        categories: InMemoryCategoryRepository,
        posts: InMemoryPostRepository,
        comments: InMemoryCommentRepository,
    }

    fn fixture() -> Fixture {
        let db = InMemoryDatabase::new();
        Fixture {
            users: db.users(),
            categories: db.categories(),
            posts: db.posts(),
            comments: db.comments(),
        }
    }

    async fn user(f: &Fixture, username: &str) -> User {
        f.users
            .insert(User::new(
                username.to_string(),
                format!("{username}@example.com"),
                "hash".to_string(),
            ))
            .await
            .unwrap()
    }

    async fn category(f: &Fixture, slug: &str) -> Category {
        f.categories
            .insert(Category::new(slug.to_string(), String::new(), slug.to_string()))
            .await
            .unwrap()
    }

    async fn post(f: &Fixture, author: &User, category: &Category, days: i64) -> Post {
        f.posts
            .insert(Post::new(
                author.id,
                PostDraft {
                    title: format!("Post {days}"),
                    text: "Body".to_string(),
                    pub_date: Utc::now() + Duration::days(days),
                    is_published: true,
                    category_id: category.id,
                },
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_annotates_comment_count_and_orders() {
        let f = fixture();
        let alice = user(&f, "alice").await;
        let travel = category(&f, "travel").await;
        let older = post(&f, &alice, &travel, -2).await;
        let newer = post(&f, &alice, &travel, -1).await;
        post(&f, &alice, &travel, 1).await;

        for text in ["one", "two"] {
            f.comments
                .insert(Comment::new(older.id, alice.id, text.to_string()))
                .await
                .unwrap();
        }

        let query = PostQuery::new(&Viewer::Anonymous, PostFilter::default(), Utc::now());
        let page = f.posts.list(&query, PageRequest::new(1, 10)).await.unwrap();

        assert_eq!(page.total_items, 2);
        assert_eq!(page.items[0].post.id, newer.id);
        assert_eq!(page.items[1].post.id, older.id);
        assert_eq!(page.items[1].comment_count, 2);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let f = fixture();
        let alice = user(&f, "alice").await;
        let travel = category(&f, "travel").await;
        for days in 1..=5 {
            post(&f, &alice, &travel, -days).await;
        }

        let query = PostQuery::new(&Viewer::Anonymous, PostFilter::default(), Utc::now());
        let page = f.posts.list(&query, PageRequest::new(3, 2)).await.unwrap();

        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_post_cascades_comments() {
        let f = fixture();
        let alice = user(&f, "alice").await;
        let travel = category(&f, "travel").await;
        let p = post(&f, &alice, &travel, -1).await;
        let c = f
            .comments
            .insert(Comment::new(p.id, alice.id, "hi".to_string()))
            .await
            .unwrap();

        f.posts.delete(p.id).await.unwrap();

        assert!(f.comments.find_by_id(c.id).await.unwrap().is_none());
        assert!(f.posts.find_entry(p.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let f = fixture();
        user(&f, "alice").await;

        let result = f
            .users
            .insert(User::new(
                "alice".to_string(),
                "other@example.com".to_string(),
                "hash".to_string(),
            ))
            .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_post_requires_existing_category() {
        let f = fixture();
        let alice = user(&f, "alice").await;
        let ghost = Category::new("Ghost".into(), String::new(), "ghost".into());

        let result = f
            .posts
            .insert(Post::new(
                alice.id,
                PostDraft {
                    title: "t".to_string(),
                    text: "x".to_string(),
                    pub_date: Utc::now(),
                    is_published: true,
                    category_id: ghost.id,
                },
            ))
            .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_comments_oldest_first() {
        let f = fixture();
        let alice = user(&f, "alice").await;
        let bob = user(&f, "bob").await;
        let travel = category(&f, "travel").await;
        let p = post(&f, &alice, &travel, -1).await;

        let mut first = Comment::new(p.id, bob.id, "first".to_string());
        first.created_at = Utc::now() - Duration::minutes(5);
        f.comments.insert(first).await.unwrap();
        f.comments
            .insert(Comment::new(p.id, alice.id, "second".to_string()))
            .await
            .unwrap();

        let listed = f.comments.list_for_post(p.id).await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|c| c.comment.text.as_str()).collect();

        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(listed[0].author.username, "bob");
    }
}
