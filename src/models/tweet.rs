use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tweet {
    pub id: i64,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Tweet joined with its author's username, as rendered in feeds.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TweetWithAuthor {
    pub id: i64,
    pub user_id: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTweetRequest {
    pub content: String,
}
