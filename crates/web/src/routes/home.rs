//! Feed route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use tracing::instrument;

use crate::db::PostRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::{MessageQuery, PostView};
use crate::state::AppState;

/// Feed page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Whether a user is logged in (controls nav and like affordances).
    pub logged_in: bool,
    /// All posts, insertion order, with owners resolved.
    pub posts: Vec<PostView>,
    /// Optional notice carried in the query string.
    pub msg: Option<String>,
}

/// Display the feed of all posts.
///
/// Visible to guests; like and post actions require login.
#[instrument(skip(state, viewer))]
pub async fn feed(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Result<HomeTemplate> {
    let viewer_id = viewer.as_ref().map(|u| u.id);

    let posts = PostRepository::new(state.pool())
        .list_feed()
        .await?
        .iter()
        .map(|item| PostView::from_feed(item, viewer_id))
        .collect();

    Ok(HomeTemplate {
        logged_in: viewer.is_some(),
        posts,
        msg: query.msg,
    })
}
