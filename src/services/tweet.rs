use crate::{
    config::Config,
    error::{AppError, Result},
    models::tweet::{Tweet, TweetWithAuthor},
    models::user::User,
    services::Database,
    utils::validation,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct TweetService {
    db: Arc<Database>,
    max_tweet_length: usize,
}

impl TweetService {
    pub fn new(db: Arc<Database>, config: &Config) -> Self {
        Self {
            db,
            max_tweet_length: config.max_tweet_length,
        }
    }

    pub async fn create_tweet(&self, author: &User, content: &str) -> Result<Tweet> {
        validation::validate_tweet_content(content, self.max_tweet_length)?;

        let created_at = Utc::now();
        let result = sqlx::query("INSERT INTO tweets (user_id, content, created_at) VALUES (?, ?, ?)")
            .bind(&author.id)
            .bind(content)
            .bind(created_at)
            .execute(self.db.pool())
            .await?;

        info!("User {} posted tweet {}", author.username, result.last_insert_rowid());
        Ok(Tweet {
            id: result.last_insert_rowid(),
            user_id: author.id.clone(),
            content: content.to_string(),
            created_at,
        })
    }

    pub async fn get_tweet(&self, id: i64) -> Result<TweetWithAuthor> {
        sqlx::query_as::<_, TweetWithAuthor>(
            r#"
            SELECT t.id, t.user_id, u.username, t.content, t.created_at
            FROM tweets t
            JOIN users u ON u.id = t.user_id
            WHERE t.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Tweet"))
    }

    /// Only the author may delete a tweet.
    pub async fn delete_tweet(&self, actor: &User, id: i64) -> Result<()> {
        debug!("User {} deleting tweet {}", actor.username, id);

        let tweet = sqlx::query_as::<_, Tweet>("SELECT * FROM tweets WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::not_found("Tweet"))?;

        if tweet.user_id != actor.id {
            return Err(AppError::forbidden("Only the author can delete a tweet"));
        }

        sqlx::query("DELETE FROM tweets WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::test_support::{seed_user, test_database};

    async fn setup() -> (Arc<Database>, TweetService) {
        let db = Arc::new(test_database().await);
        let tweets = TweetService::new(db.clone(), &Config::default());
        (db, tweets)
    }

    #[tokio::test]
    async fn rejects_empty_content() {
        let (db, tweets) = setup().await;
        let alice = seed_user(&db, "alice").await;

        let err = tweets.create_tweet(&alice, "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_content_over_140_characters() {
        let (db, tweets) = setup().await;
        let alice = seed_user(&db, "alice").await;

        let err = tweets.create_tweet(&alice, &"a".repeat(141)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn accepts_content_of_exactly_140_characters() {
        let (db, tweets) = setup().await;
        let alice = seed_user(&db, "alice").await;

        let tweet = tweets.create_tweet(&alice, &"a".repeat(140)).await.unwrap();
        assert_eq!(tweet.content.len(), 140);
    }

    #[tokio::test]
    async fn length_limit_counts_characters_not_bytes() {
        let (db, tweets) = setup().await;
        let alice = seed_user(&db, "alice").await;

        // 140 three-byte characters
        let content = "あ".repeat(140);
        assert!(tweets.create_tweet(&alice, &content).await.is_ok());
    }

    #[tokio::test]
    async fn author_can_delete_own_tweet() {
        let (db, tweets) = setup().await;
        let alice = seed_user(&db, "alice").await;

        let tweet = tweets.create_tweet(&alice, "hello").await.unwrap();
        tweets.delete_tweet(&alice, tweet.id).await.unwrap();

        let err = tweets.get_tweet(tweet.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn non_author_cannot_delete_tweet() {
        let (db, tweets) = setup().await;
        let dave = seed_user(&db, "dave").await;
        let carol = seed_user(&db, "carol").await;

        let tweet = tweets.create_tweet(&dave, "mine").await.unwrap();
        let err = tweets.delete_tweet(&carol, tweet.id).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));

        // The tweet must survive the failed delete
        assert_eq!(tweets.get_tweet(tweet.id).await.unwrap().id, tweet.id);
    }

    #[tokio::test]
    async fn deleting_missing_tweet_is_not_found() {
        let (db, tweets) = setup().await;
        let alice = seed_user(&db, "alice").await;

        let err = tweets.delete_tweet(&alice, 9999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
