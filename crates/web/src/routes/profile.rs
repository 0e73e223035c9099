//! Public profile route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use shutterbook_core::UserId;

use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::PostView;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub logged_in: bool,
    pub name: String,
    pub photo_url: String,
    pub posts: Vec<PostView>,
}

/// Display a user's public profile and their posts.
#[instrument(skip(state, viewer), fields(viewer_id = %viewer.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(viewer): RequireAuth,
    Path(user_id): Path<i32>,
) -> Result<ProfileTemplate> {
    let user = AuthService::new(state.pool())
        .get_user(UserId::new(user_id))
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound => AppError::NotFound(format!("user {user_id}")),
            other => AppError::Auth(other),
        })?;

    let author = (&user).into();
    let posts = PostRepository::new(state.pool())
        .list_by_owner(user.id)
        .await?
        .iter()
        .map(|post| PostView::new(post, &author, Some(viewer.id)))
        .collect();

    Ok(ProfileTemplate {
        logged_in: true,
        name: user.display_name(),
        photo_url: user.photo_url,
        posts,
    })
}
