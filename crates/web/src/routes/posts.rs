//! Post route handlers.
//!
//! Create, list, edit, delete and like-toggle for photo posts.
//!
//! Update and delete check authentication only, not ownership: any logged-in
//! user may edit or delete any post by id. This is preserved behavior from
//! the original application, kept as a documented limitation (see DESIGN.md)
//! pending a product decision.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shutterbook_core::{PostId, UserId};

use crate::db::{PostRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::auth::{UploadedFile, read_file, read_text};
use crate::routes::{MessageQuery, PostView};
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Where a like was toggled from; decides the post-toggle redirect.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LikeOrigin {
    /// The owner's public profile page.
    Profile,
    /// The caller's own-posts page.
    Own,
    /// The default feed.
    #[default]
    Feed,
}

/// Query parameters for the like toggle.
#[derive(Debug, Deserialize)]
pub struct LikeQuery {
    #[serde(default)]
    pub from: LikeOrigin,
}

// =============================================================================
// Templates
// =============================================================================

/// Edit form pre-fill for the own-posts page.
pub struct EditFormView {
    pub id: i32,
    pub about: String,
}

/// Own-posts page template, doubling as the edit page when `editing` is set.
#[derive(Template, WebTemplate)]
#[template(path = "your_posts.html")]
pub struct YourPostsTemplate {
    pub logged_in: bool,
    pub user_name: String,
    pub user_photo_url: String,
    pub posts: Vec<PostView>,
    pub msg: Option<String>,
    pub editing: Option<EditFormView>,
}

// =============================================================================
// Create
// =============================================================================

/// Handle post creation (multipart `photo` + `about`).
///
/// The quota count runs before the photo is uploaded.
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let (photo, about) = read_post_form(multipart).await?;

    let posts = PostRepository::new(state.pool());

    let limit = state.config().limits.max_posts_per_user;
    if posts.count_by_owner(user.id).await? >= limit {
        return Err(AppError::QuotaExceeded { limit });
    }

    let photo = photo.ok_or_else(|| AppError::BadRequest("a photo is required".to_string()))?;
    let stored = state
        .image_host()
        .upload(&photo.file_name, &photo.content_type, photo.data)
        .await?;

    let post = posts.create(user.id, &stored.secure_url, &about).await?;
    tracing::info!(post_id = %post.id, "post created");

    Ok(Redirect::to("/your-posts").into_response())
}

// =============================================================================
// Own List & Edit Page
// =============================================================================

/// Display the caller's posts.
pub async fn own_posts(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<YourPostsTemplate> {
    render_own_posts(&state, user.id, query.msg, None).await
}

/// Display the caller's posts with the edit form pre-filled from `post_id`.
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(post_id): Path<i32>,
) -> Result<YourPostsTemplate> {
    let post = PostRepository::new(state.pool())
        .get_by_id(PostId::new(post_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

    let editing = EditFormView {
        id: post.id.as_i32(),
        about: post.about,
    };

    render_own_posts(&state, user.id, None, Some(editing)).await
}

/// Shared renderer for the own-posts page.
async fn render_own_posts(
    state: &AppState,
    user_id: UserId,
    msg: Option<String>,
    editing: Option<EditFormView>,
) -> Result<YourPostsTemplate> {
    let user = AuthService::new(state.pool()).get_user(user_id).await?;
    let author = (&user).into();

    let posts = PostRepository::new(state.pool())
        .list_by_owner(user.id)
        .await?
        .iter()
        .map(|post| PostView::new(post, &author, Some(user.id)))
        .collect();

    Ok(YourPostsTemplate {
        logged_in: true,
        user_name: user.display_name(),
        user_photo_url: user.photo_url,
        posts,
        msg,
        editing,
    })
}

// =============================================================================
// Update
// =============================================================================

/// Replace a post's photo and caption (multipart `photo` + `about`).
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(post_id): Path<i32>,
    multipart: Multipart,
) -> Result<Response> {
    let (photo, about) = read_post_form(multipart).await?;
    let photo = photo
        .ok_or_else(|| AppError::BadRequest("a replacement photo is required".to_string()))?;

    let stored = state
        .image_host()
        .upload(&photo.file_name, &photo.content_type, photo.data)
        .await?;

    PostRepository::new(state.pool())
        .update(PostId::new(post_id), &stored.secure_url, &about)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("post {post_id}")),
            other => AppError::Database(other),
        })?;

    Ok(Redirect::to("/your-posts").into_response())
}

// =============================================================================
// Delete
// =============================================================================

/// Delete a post.
///
/// The hosted image is removed best-effort first: a failed removal is logged
/// and never blocks deleting the record.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(post_id): Path<i32>,
) -> Result<Response> {
    let posts = PostRepository::new(state.pool());

    let post = posts
        .get_by_id(PostId::new(post_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

    if let Err(e) = state.image_host().delete(&post.photo_url).await {
        tracing::warn!(error = %e, post_id, "failed to remove hosted image, deleting record anyway");
    }

    posts.delete(post.id).await?;
    tracing::info!(post_id, "post deleted");

    Ok(Redirect::to("/your-posts").into_response())
}

// =============================================================================
// Toggle Like
// =============================================================================

/// Toggle the caller's like on a post, then redirect back to where the
/// toggle came from.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn toggle_like(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(post_id): Path<i32>,
    Query(query): Query<LikeQuery>,
) -> Result<Response> {
    let post = PostRepository::new(state.pool())
        .toggle_like(PostId::new(post_id), user.id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("post {post_id}")),
            other => AppError::Database(other),
        })?;

    let target = match query.from {
        LikeOrigin::Profile => format!("/profile/{}", post.user_id),
        LikeOrigin::Own => "/your-posts".to_string(),
        LikeOrigin::Feed => "/".to_string(),
    };

    Ok(Redirect::to(&target).into_response())
}

// =============================================================================
// Multipart Parsing
// =============================================================================

/// Pull the post form fields (`photo`, `about`) out of the multipart stream.
async fn read_post_form(mut multipart: Multipart) -> Result<(Option<UploadedFile>, String)> {
    let mut photo = None;
    let mut about = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => photo = read_file(field).await?,
            "about" => about = read_text(field).await?,
            _ => {}
        }
    }

    Ok((photo, about))
}
