//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Feed of all posts
//! GET  /health                  - Health check (in main.rs)
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action
//! GET  /logout                  - Clear session cookie
//! GET  /signup                  - Signup page
//! POST /signup                  - Signup action (multipart, `profilePhoto`)
//!
//! # Posts (require auth)
//! POST /add-post                - Create post (multipart, `photo`)
//! GET  /your-posts              - Own post list
//! GET  /post/edit/{postId}      - Own post list with edit form pre-filled
//! POST /update-post/{postId}    - Replace photo and caption
//! GET  /post/delete/{postId}    - Delete post
//! GET  /like-post/{likedPostId} - Toggle like (`?from=profile|own|feed`)
//!
//! # Profile (requires auth)
//! GET  /profile/{userId}        - Public profile + that user's posts
//!
//! # Fallback
//! *                             - Rendered 404 page
//! ```

pub mod auth;
pub mod home;
pub mod posts;
pub mod profile;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use shutterbook_core::UserId;

use crate::filters;
use crate::models::post::{Author, Post, PostWithAuthor};
use crate::state::AppState;

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Feed
        .route("/", get(home::feed))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        // Posts
        .route("/add-post", post(posts::create))
        .route("/your-posts", get(posts::own_posts))
        .route("/post/edit/{postId}", get(posts::edit_page))
        .route("/update-post/{postId}", post(posts::update))
        .route("/post/delete/{postId}", get(posts::delete))
        .route("/like-post/{likedPostId}", get(posts::toggle_like))
        // Profile
        .route("/profile/{userId}", get(profile::show))
}

// =============================================================================
// Shared Query Types
// =============================================================================

/// Query parameters for notice display (`?msg=`).
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub msg: Option<String>,
}

// =============================================================================
// Shared View Types
// =============================================================================

/// Post display data for templates.
#[derive(Clone)]
pub struct PostView {
    pub id: i32,
    pub photo_url: String,
    pub about: String,
    pub date: String,
    pub like_count: usize,
    pub liked_by_me: bool,
    pub author_id: i32,
    pub author_name: String,
    pub author_photo_url: String,
}

impl PostView {
    /// Build display data for a post, marking whether `viewer` likes it.
    #[must_use]
    pub fn new(post: &Post, author: &Author, viewer: Option<UserId>) -> Self {
        Self {
            id: post.id.as_i32(),
            photo_url: post.photo_url.clone(),
            about: post.about.clone(),
            date: post.created_at.format("%b %e, %Y").to_string(),
            like_count: post.like_count(),
            liked_by_me: viewer.is_some_and(|v| post.liked_by(v)),
            author_id: author.id.as_i32(),
            author_name: author.display_name(),
            author_photo_url: author.photo_url.clone(),
        }
    }

    /// Build display data for a post joined with its owner.
    #[must_use]
    pub fn from_feed(item: &PostWithAuthor, viewer: Option<UserId>) -> Self {
        Self::new(&item.post, &item.author, viewer)
    }
}

// =============================================================================
// Not Found
// =============================================================================

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub logged_in: bool,
}

/// Build the rendered 404 response (also used by `AppError::NotFound`).
pub fn not_found_page() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate { logged_in: false })
}

/// Fallback handler for unmatched routes.
pub async fn not_found() -> impl IntoResponse {
    not_found_page()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shutterbook_core::PostId;

    fn sample() -> PostWithAuthor {
        PostWithAuthor {
            post: Post {
                id: PostId::new(9),
                photo_url: "https://images.test/p/9.png".to_string(),
                about: "sunset".to_string(),
                created_at: Utc::now(),
                liked_user_ids: vec![UserId::new(2)],
                user_id: UserId::new(1),
            },
            author: Author {
                id: UserId::new(1),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                photo_url: "https://images.test/u/1.png".to_string(),
            },
        }
    }

    #[test]
    fn test_post_view_marks_viewer_like() {
        let item = sample();
        let liked = PostView::from_feed(&item, Some(UserId::new(2)));
        assert!(liked.liked_by_me);
        assert_eq!(liked.like_count, 1);

        let not_liked = PostView::from_feed(&item, Some(UserId::new(3)));
        assert!(!not_liked.liked_by_me);

        let guest = PostView::from_feed(&item, None);
        assert!(!guest.liked_by_me);
    }

    #[test]
    fn test_post_view_author_name() {
        let view = PostView::from_feed(&sample(), None);
        assert_eq!(view.author_name, "Ada Lovelace");
        assert_eq!(view.author_id, 1);
    }
}
