#[cfg(test)]
mod tests {
    use crate::database::entity::{category, comment, post, user};
    use crate::database::postgres_repo::{
        PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    };
    use std::collections::BTreeMap;

    use blogicum_core::domain::Post;
    use blogicum_core::error::RepoError;
    use blogicum_core::ports::{
        BaseRepository, CategoryRepository, CommentRepository, PageRequest, PostRepository,
    };
    use blogicum_core::{PostFilter, PostQuery, Viewer};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn user_model(id: uuid::Uuid, username: &str) -> user::Model {
        let now = chrono::Utc::now();
        user::Model {
            id,
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();
        let category_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                id: post_id,
                author_id,
                category_id,
                title: "Test Post".to_owned(),
                text: "Content".to_owned(),
                pub_date: now.into(),
                is_published: false,
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, post_id);
        assert_eq!(post.author_id, author_id);
        assert!(!post.is_published);
    }

    #[tokio::test]
    async fn test_find_category_by_slug() {
        let now = chrono::Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![category::Model {
                id: uuid::Uuid::new_v4(),
                title: "Travel".to_owned(),
                description: "Trips".to_owned(),
                slug: "travel".to_owned(),
                is_published: true,
                created_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresCategoryRepository::new(db);

        let category = repo.find_by_slug("travel").await.unwrap().unwrap();
        assert_eq!(category.slug, "travel");
        assert!(category.is_published);
    }

    #[tokio::test]
    async fn test_list_comments_with_authors() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![(
                comment::Model {
                    id: uuid::Uuid::new_v4(),
                    post_id,
                    author_id,
                    text: "Nice post".to_owned(),
                    created_at: now.into(),
                },
                user_model(author_id, "bob"),
            )]])
            .into_connection();

        let repo = PostgresCommentRepository::new(db);

        let comments = repo.list_for_post(post_id).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment.text, "Nice post");
        assert_eq!(comments[0].author.username, "bob");
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result = BaseRepository::<Post, uuid::Uuid>::delete(&repo, uuid::Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    /// Run `list` against an empty mock and return the logged SQL with the
    /// Debug escaping of quotes removed.
    async fn listing_sql(query: PostQuery) -> String {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![BTreeMap::from([(
                "num_items",
                Value::from(0i64),
            )])]])
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let page = repo.list(&query, PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(page.total_items, 0);
        assert!(page.items.is_empty());

        let log = repo.db.into_transaction_log();
        assert_eq!(log.len(), 2);
        format!("{log:?}").replace("\\\"", "\"")
    }

    fn assert_live_predicates(sql: &str) {
        assert!(sql.contains(r#""posts"."is_published" = $"#), "{sql}");
        assert!(sql.contains(r#""categories"."is_published" = $"#), "{sql}");
        assert!(sql.contains(r#""posts"."pub_date" <= $"#), "{sql}");
    }

    #[tokio::test]
    async fn test_index_listing_sql_requires_live_posts() {
        let query = PostQuery::new(
            &Viewer::User(uuid::Uuid::new_v4()),
            PostFilter::default(),
            chrono::Utc::now(),
        );
        let sql = listing_sql(query).await;

        assert_live_predicates(&sql);
        assert!(!sql.contains(r#""posts"."author_id" = $"#), "{sql}");
        assert!(!sql.contains(" OR "), "{sql}");
    }

    #[tokio::test]
    async fn test_profile_listing_sql_lets_owner_bypass() {
        let owner = uuid::Uuid::new_v4();
        let query = PostQuery::new(
            &Viewer::User(owner),
            PostFilter::author("alice"),
            chrono::Utc::now(),
        );
        let sql = listing_sql(query).await;

        assert!(sql.contains(r#""users"."username" = $"#), "{sql}");
        assert!(sql.contains(r#""posts"."author_id" = $"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert_live_predicates(&sql);
    }

    #[tokio::test]
    async fn test_anonymous_profile_listing_sql_has_no_bypass() {
        let query = PostQuery::new(
            &Viewer::Anonymous,
            PostFilter::author("alice"),
            chrono::Utc::now(),
        );
        let sql = listing_sql(query).await;

        assert!(sql.contains(r#""users"."username" = $"#), "{sql}");
        assert!(!sql.contains(r#""posts"."author_id" = $"#), "{sql}");
        assert_live_predicates(&sql);
    }

    #[tokio::test]
    async fn test_category_listing_sql_filters_slug() {
        let query = PostQuery::new(
            &Viewer::Anonymous,
            PostFilter::category("travel"),
            chrono::Utc::now(),
        );
        let sql = listing_sql(query).await;

        assert!(sql.contains(r#""categories"."slug" = $"#), "{sql}");
        assert_live_predicates(&sql);
    }
}
