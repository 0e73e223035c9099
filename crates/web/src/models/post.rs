//! Post domain types.

use chrono::{DateTime, Utc};

use shutterbook_core::{PostId, UserId};

/// A photo post.
///
/// `liked_user_ids` is the set of users who currently like the post; the
/// repository's toggle keeps each liker present at most once.
#[derive(Debug, Clone)]
pub struct Post {
    /// Unique post ID.
    pub id: PostId,
    /// Durable public URL of the uploaded photo.
    pub photo_url: String,
    /// Caption text.
    pub about: String,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// Users who currently like this post.
    pub liked_user_ids: Vec<UserId>,
    /// Owning user. Immutable after creation.
    pub user_id: UserId,
}

impl Post {
    /// Whether the given user currently likes this post.
    #[must_use]
    pub fn liked_by(&self, user_id: UserId) -> bool {
        self.liked_user_ids.contains(&user_id)
    }

    /// Current number of likes.
    #[must_use]
    pub fn like_count(&self) -> usize {
        self.liked_user_ids.len()
    }
}

/// Public fields of a post's owner, resolved for display.
#[derive(Debug, Clone)]
pub struct Author {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub photo_url: String,
}

impl Author {
    /// Full display name, with the possibly-empty last name handled.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

impl From<&super::user::User> for Author {
    fn from(user: &super::user::User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            photo_url: user.photo_url.clone(),
        }
    }
}

/// A post joined with its owner's public fields (feed and profile listings).
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Author,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn post(liked: Vec<UserId>) -> Post {
        Post {
            id: PostId::new(1),
            photo_url: "https://images.test/p/1.png".to_string(),
            about: "caption".to_string(),
            created_at: Utc::now(),
            liked_user_ids: liked,
            user_id: UserId::new(1),
        }
    }

    #[test]
    fn test_liked_by() {
        let p = post(vec![UserId::new(2), UserId::new(5)]);
        assert!(p.liked_by(UserId::new(2)));
        assert!(!p.liked_by(UserId::new(3)));
    }

    #[test]
    fn test_like_count() {
        assert_eq!(post(vec![]).like_count(), 0);
        assert_eq!(post(vec![UserId::new(2)]).like_count(), 1);
    }
}
