//! Domain to DTO conversions.

use blogicum_core::domain::{Category, CommentEntry, PostEntry, User};
use blogicum_core::ports::Page;
use blogicum_shared::dto::{
    CategoryResponse, CommentResponse, PostPage, PostResponse, UserResponse,
};

pub fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        date_joined: user.created_at,
    }
}

pub fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        title: category.title,
        description: category.description,
        slug: category.slug,
    }
}

pub fn post_response(entry: PostEntry) -> PostResponse {
    let PostEntry {
        post,
        author,
        category,
        comment_count,
    } = entry;

    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        author: author.username,
        category: category_response(category),
        comment_count,
    }
}

pub fn comment_response(entry: CommentEntry) -> CommentResponse {
    CommentResponse {
        id: entry.comment.id,
        text: entry.comment.text,
        author: entry.author.username,
        created_at: entry.comment.created_at,
    }
}

pub fn post_page(page: Page<PostEntry>) -> PostPage {
    let total_pages = page.total_pages();
    PostPage {
        posts: page.items.into_iter().map(post_response).collect(),
        page: page.page,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages,
    }
}
