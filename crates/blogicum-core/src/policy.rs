//! Visibility and access-control policy.
//!
//! Every read and write entry point goes through these predicates. They are
//! pure: the caller supplies already-loaded entities, the viewer and the
//! request's wall-clock time.
//!
//! A post that fails [`is_visible`] must be reported exactly like a post
//! that does not exist. Splitting the two into "not found" and "forbidden"
//! would reveal that hidden drafts and scheduled posts exist.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Authored, Category, Post, PostEntry};

/// The principal making the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(Uuid),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    /// True when the viewer is the authenticated user `id`.
    pub fn is(&self, id: Uuid) -> bool {
        self.user_id() == Some(id)
    }
}

impl From<Option<Uuid>> for Viewer {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(Viewer::Anonymous, Viewer::User)
    }
}

/// A post is live when it, and its category, are published and its
/// publication date has passed.
pub fn is_live(post: &Post, category: &Category, now: DateTime<Utc>) -> bool {
    post.is_published && category.is_published && post.pub_date <= now
}

/// Whether `viewer` may read `post`. Authors always see their own posts.
pub fn is_visible(post: &Post, category: &Category, viewer: &Viewer, now: DateTime<Utc>) -> bool {
    viewer.is(post.author_id) || is_live(post, category, now)
}

/// Whether `viewer` may edit or delete `entity`. Only the author may.
pub fn can_mutate<E: Authored + ?Sized>(entity: &E, viewer: &Viewer) -> bool {
    viewer.is(entity.author_id())
}

impl PostEntry {
    pub fn is_visible_to(&self, viewer: &Viewer, now: DateTime<Utc>) -> bool {
        is_visible(&self.post, &self.category, viewer, now)
    }
}

/// Optional narrowing of a post listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Only posts in the published category with this slug.
    pub category_slug: Option<String>,
    /// Only posts by the user with this username (profile listing).
    pub author_username: Option<String>,
}

impl PostFilter {
    pub fn category(slug: impl Into<String>) -> Self {
        Self {
            category_slug: Some(slug.into()),
            author_username: None,
        }
    }

    pub fn author(username: impl Into<String>) -> Self {
        Self {
            category_slug: None,
            author_username: Some(username.into()),
        }
    }
}

/// A fully resolved listing query.
///
/// Repositories evaluate it either with [`PostQuery::matches`] or by
/// translating the same fields into SQL. Both must agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub category_slug: Option<String>,
    pub author_username: Option<String>,
    /// Posts by this user skip the live predicate. Only set for a profile
    /// listing viewed by an authenticated user.
    pub owner_bypass: Option<Uuid>,
    pub now: DateTime<Utc>,
}

impl PostQuery {
    pub fn new(viewer: &Viewer, filter: PostFilter, now: DateTime<Utc>) -> Self {
        // Combined with the username filter, the bypass only ever matches
        // when the viewer is the profile owner.
        let owner_bypass = filter
            .author_username
            .as_ref()
            .and_then(|_| viewer.user_id());

        Self {
            category_slug: filter.category_slug,
            author_username: filter.author_username,
            owner_bypass,
            now,
        }
    }

    pub fn matches(&self, entry: &PostEntry) -> bool {
        if let Some(slug) = &self.category_slug {
            if entry.category.slug != *slug || !entry.category.is_published {
                return false;
            }
        }
        if let Some(username) = &self.author_username {
            if entry.author.username != *username {
                return false;
            }
        }

        self.owner_bypass == Some(entry.post.author_id)
            || is_live(&entry.post, &entry.category, self.now)
    }
}

/// Listing order: newest publication date first, then newest creation,
/// then id for a total order.
pub fn listing_order(a: &Post, b: &Post) -> Ordering {
    b.pub_date
        .cmp(&a.pub_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Filter and order already-loaded entries for a listing.
pub fn list_visible_posts<I>(entries: I, query: &PostQuery) -> Vec<PostEntry>
where
    I: IntoIterator<Item = PostEntry>,
{
    let mut visible: Vec<PostEntry> = entries
        .into_iter()
        .filter(|entry| query.matches(entry))
        .collect();
    visible.sort_by(|a, b| listing_order(&a.post, &b.post));
    visible
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::{Comment, PostDraft, User};

    fn author(username: &str) -> User {
        User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "hash".to_string(),
        )
    }

    fn entry(author: &User, category: &Category, offset: Duration, published: bool) -> PostEntry {
        let post = Post::new(
            author.id,
            PostDraft {
                title: "Title".to_string(),
                text: "Body".to_string(),
                pub_date: Utc::now() + offset,
                is_published: published,
                category_id: category.id,
            },
        );
        PostEntry {
            post,
            author: author.clone(),
            category: category.clone(),
            comment_count: 0,
        }
    }

    fn travel() -> Category {
        Category::new(
            "Travel".to_string(),
            "Trips".to_string(),
            "travel".to_string(),
        )
    }

    #[test]
    fn test_live_post_is_visible_to_anonymous() {
        let alice = author("alice");
        let category = travel();
        let e = entry(&alice, &category, -Duration::days(1), true);

        assert!(e.is_visible_to(&Viewer::Anonymous, Utc::now()));
    }

    #[test]
    fn test_future_post_hidden_from_others_but_not_author() {
        let alice = author("alice");
        let bob = author("bob");
        let category = travel();
        let e = entry(&alice, &category, Duration::days(1), true);
        let now = Utc::now();

        assert!(!e.is_visible_to(&Viewer::Anonymous, now));
        assert!(!e.is_visible_to(&Viewer::User(bob.id), now));
        assert!(e.is_visible_to(&Viewer::User(alice.id), now));
    }

    #[test]
    fn test_draft_hidden_from_others() {
        let alice = author("alice");
        let bob = author("bob");
        let category = travel();
        let e = entry(&alice, &category, -Duration::days(1), false);

        assert!(!e.is_visible_to(&Viewer::User(bob.id), Utc::now()));
        assert!(e.is_visible_to(&Viewer::User(alice.id), Utc::now()));
    }

    #[test]
    fn test_unpublished_category_hides_post() {
        let alice = author("alice");
        let category = travel().unpublished();
        let e = entry(&alice, &category, -Duration::days(1), true);

        assert!(!is_live(&e.post, &e.category, Utc::now()));
        assert!(!e.is_visible_to(&Viewer::Anonymous, Utc::now()));
        assert!(e.is_visible_to(&Viewer::User(alice.id), Utc::now()));
    }

    #[test]
    fn test_pub_date_equal_to_now_is_live() {
        let alice = author("alice");
        let category = travel();
        let e = entry(&alice, &category, Duration::zero(), true);

        assert!(is_live(&e.post, &e.category, e.post.pub_date));
    }

    #[test]
    fn test_can_mutate_only_author() {
        let alice = author("alice");
        let bob = author("bob");
        let category = travel();
        let e = entry(&alice, &category, -Duration::days(1), true);
        let comment = Comment::new(e.post.id, alice.id, "Nice".to_string());

        assert!(can_mutate(&e.post, &Viewer::User(alice.id)));
        assert!(!can_mutate(&e.post, &Viewer::User(bob.id)));
        assert!(!can_mutate(&e.post, &Viewer::Anonymous));
        assert!(can_mutate(&comment, &Viewer::User(alice.id)));
        assert!(!can_mutate(&comment, &Viewer::User(bob.id)));
    }

    #[test]
    fn test_anonymous_listing_only_live_posts() {
        let alice = author("alice");
        let published = travel();
        let hidden = Category::new("Secret".into(), String::new(), "secret".into()).unpublished();

        let live = entry(&alice, &published, -Duration::days(1), true);
        let entries = vec![
            live.clone(),
            entry(&alice, &published, -Duration::days(1), false),
            entry(&alice, &published, Duration::days(1), true),
            entry(&alice, &hidden, -Duration::days(1), true),
        ];

        let query = PostQuery::new(&Viewer::Anonymous, PostFilter::default(), Utc::now());
        let listed = list_visible_posts(entries, &query);

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].post.id, live.post.id);
    }

    #[test]
    fn test_index_listing_hides_own_drafts() {
        let alice = author("alice");
        let category = travel();
        let entries = vec![entry(&alice, &category, Duration::days(1), true)];

        let query = PostQuery::new(&Viewer::User(alice.id), PostFilter::default(), Utc::now());

        assert!(list_visible_posts(entries, &query).is_empty());
    }

    #[test]
    fn test_own_profile_lists_everything() {
        let alice = author("alice");
        let bob = author("bob");
        let published = travel();
        let hidden = Category::new("Secret".into(), String::new(), "secret".into()).unpublished();
        let entries = vec![
            entry(&alice, &published, -Duration::days(1), true),
            entry(&alice, &published, -Duration::days(1), false),
            entry(&alice, &published, Duration::days(1), true),
            entry(&alice, &hidden, -Duration::days(1), true),
            entry(&bob, &published, -Duration::days(1), true),
        ];

        let own = PostQuery::new(&Viewer::User(alice.id), PostFilter::author("alice"), Utc::now());
        assert_eq!(list_visible_posts(entries.clone(), &own).len(), 4);

        let other = PostQuery::new(&Viewer::User(bob.id), PostFilter::author("alice"), Utc::now());
        assert_eq!(list_visible_posts(entries.clone(), &other).len(), 1);

        let anonymous = PostQuery::new(&Viewer::Anonymous, PostFilter::author("alice"), Utc::now());
        assert_eq!(list_visible_posts(entries, &anonymous).len(), 1);
    }

    #[test]
    fn test_category_filter() {
        let alice = author("alice");
        let travel = travel();
        let food = Category::new("Food".into(), String::new(), "food".into());
        let entries = vec![
            entry(&alice, &travel, -Duration::days(1), true),
            entry(&alice, &food, -Duration::days(1), true),
            entry(&alice, &food, -Duration::days(2), true),
        ];

        let query = PostQuery::new(&Viewer::Anonymous, PostFilter::category("food"), Utc::now());
        let listed = list_visible_posts(entries, &query);

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|e| e.category.slug == "food"));
    }

    #[test]
    fn test_listing_newest_first() {
        let alice = author("alice");
        let category = travel();
        let old = entry(&alice, &category, -Duration::days(3), true);
        let mid = entry(&alice, &category, -Duration::days(2), true);
        let new = entry(&alice, &category, -Duration::days(1), true);

        let query = PostQuery::new(&Viewer::Anonymous, PostFilter::default(), Utc::now());
        let listed = list_visible_posts(vec![mid.clone(), old.clone(), new.clone()], &query);
        let ids: Vec<Uuid> = listed.iter().map(|e| e.post.id).collect();

        assert_eq!(ids, vec![new.post.id, mid.post.id, old.post.id]);
    }

    #[test]
    fn test_listing_ties_are_deterministic() {
        let alice = author("alice");
        let category = travel();
        let first = entry(&alice, &category, -Duration::days(1), true);
        let mut second = first.clone();
        second.post.id = Uuid::new_v4();

        let query = PostQuery::new(&Viewer::Anonymous, PostFilter::default(), Utc::now());
        let a = list_visible_posts(vec![first.clone(), second.clone()], &query);
        let b = list_visible_posts(vec![second, first], &query);

        let ids_a: Vec<Uuid> = a.iter().map(|e| e.post.id).collect();
        let ids_b: Vec<Uuid> = b.iter().map(|e| e.post.id).collect();
        assert_eq!(ids_a, ids_b);
    }
}
