use crate::{
    error::{AppError, Result},
    models::follow::FollowStats,
    models::tweet::TweetWithAuthor,
    models::user::User,
    services::{Database, FollowService},
};
use std::sync::Arc;
use tracing::debug;

/// Read-only composition over the tweet store and the follow graph. Owns no
/// data; every method materializes a fully ordered result.
#[derive(Clone)]
pub struct FeedService {
    db: Arc<Database>,
    follow_service: FollowService,
}

impl FeedService {
    pub fn new(db: Arc<Database>, follow_service: FollowService) -> Self {
        Self { db, follow_service }
    }

    /// Every tweet across all users, newest first. Ties on `created_at`
    /// break by id descending so the ordering is deterministic.
    pub async fn home_feed(&self, viewer: &User) -> Result<Vec<TweetWithAuthor>> {
        debug!("Composing home feed for {}", viewer.username);

        let tweets = sqlx::query_as::<_, TweetWithAuthor>(
            r#"
            SELECT t.id, t.user_id, u.username, t.content, t.created_at
            FROM tweets t
            JOIN users u ON u.id = t.user_id
            ORDER BY t.created_at DESC, t.id DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(tweets)
    }

    /// Tweets authored by `username`, newest first. An unknown username is
    /// a 404, not an empty feed.
    pub async fn profile_feed(&self, username: &str) -> Result<Vec<TweetWithAuthor>> {
        self.ensure_user_exists(username).await?;

        let tweets = sqlx::query_as::<_, TweetWithAuthor>(
            r#"
            SELECT t.id, t.user_id, u.username, t.content, t.created_at
            FROM tweets t
            JOIN users u ON u.id = t.user_id
            WHERE u.username = ?
            ORDER BY t.created_at DESC, t.id DESC
            "#,
        )
        .bind(username)
        .fetch_all(self.db.pool())
        .await?;
        Ok(tweets)
    }

    /// Follow counts for a profile plus the viewer's relationship to it.
    pub async fn profile_summary(&self, username: &str, viewer: Option<&User>) -> Result<FollowStats> {
        self.ensure_user_exists(username).await?;

        let following_count = self.follow_service.count_following(username).await?;
        let follower_count = self.follow_service.count_followers(username).await?;

        let mut stats = FollowStats {
            following_count,
            follower_count,
            is_following: false,
        };

        if let Some(viewer) = viewer {
            if viewer.username != username {
                stats.is_following = self
                    .follow_service
                    .is_following(&viewer.id, username)
                    .await?;
            }
        }

        Ok(stats)
    }

    async fn ensure_user_exists(&self, username: &str) -> Result<()> {
        let found: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?;
        match found {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("User")),
        }
    }
}
