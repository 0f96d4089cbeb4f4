use crate::{
    error::{AppError, Result},
    models::follow::FriendShip,
    models::user::{User, UserSummary},
    services::Database,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Maintains the directed follow graph.
///
/// Writes are single statements; duplicate edges and self-edges are caught
/// by the `friendships` constraints and translated into domain errors, so
/// two concurrent follows of the same pair cannot both succeed.
#[derive(Clone)]
pub struct FollowService {
    db: Arc<Database>,
}

impl FollowService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn follow_user(&self, actor: &User, target_username: &str) -> Result<FriendShip> {
        debug!("User {} following {}", actor.username, target_username);

        let target = sqlx::query_as::<_, UserSummary>("SELECT id, username FROM users WHERE username = ?")
            .bind(target_username)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if target.id == actor.id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        let created_at = Utc::now();
        let insert = sqlx::query(
            "INSERT INTO friendships (from_user, to_user, created_at) VALUES (?, ?, ?)",
        )
        .bind(&actor.id)
        .bind(&target.id)
        .bind(created_at)
        .execute(self.db.pool())
        .await;

        let result = match insert {
            Ok(result) => result,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AppError::Conflict("Already following this user".to_string()));
            }
            Err(sqlx::Error::Database(e)) if e.is_check_violation() => {
                return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        info!("User {} followed {}", actor.username, target.username);
        Ok(FriendShip {
            id: result.last_insert_rowid(),
            from_user: actor.id.clone(),
            to_user: target.id,
            created_at,
        })
    }

    pub async fn unfollow_user(&self, actor: &User, target_username: &str) -> Result<()> {
        debug!("User {} unfollowing {}", actor.username, target_username);

        let result = sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE from_user = ?
              AND to_user = (SELECT id FROM users WHERE username = ?)
            "#,
        )
        .bind(&actor.id)
        .bind(target_username)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Not following this user".to_string()));
        }

        info!("User {} unfollowed {}", actor.username, target_username);
        Ok(())
    }

    /// Out-degree: how many users `username` follows.
    pub async fn count_following(&self, username: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM friendships f
            JOIN users u ON u.id = f.from_user
            WHERE u.username = ?
            "#,
        )
        .bind(username)
        .fetch_one(self.db.pool())
        .await?;
        Ok(count)
    }

    /// In-degree: how many users follow `username`.
    pub async fn count_followers(&self, username: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM friendships f
            JOIN users u ON u.id = f.to_user
            WHERE u.username = ?
            "#,
        )
        .bind(username)
        .fetch_one(self.db.pool())
        .await?;
        Ok(count)
    }

    pub async fn is_following(&self, actor_id: &str, target_username: &str) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM friendships f
            JOIN users u ON u.id = f.to_user
            WHERE f.from_user = ? AND u.username = ?
            "#,
        )
        .bind(actor_id)
        .bind(target_username)
        .fetch_one(self.db.pool())
        .await?;
        Ok(count > 0)
    }

    /// Users that `username` follows, newest edge first.
    pub async fn list_following(&self, username: &str) -> Result<Vec<UserSummary>> {
        let following = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username
            FROM friendships f
            JOIN users source ON source.id = f.from_user
            JOIN users u ON u.id = f.to_user
            WHERE source.username = ?
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(username)
        .fetch_all(self.db.pool())
        .await?;
        Ok(following)
    }

    /// Users following `username`, newest edge first.
    pub async fn list_followers(&self, username: &str) -> Result<Vec<UserSummary>> {
        let followers = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.username
            FROM friendships f
            JOIN users target ON target.id = f.to_user
            JOIN users u ON u.id = f.from_user
            WHERE target.username = ?
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(username)
        .fetch_all(self.db.pool())
        .await?;
        Ok(followers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::database::test_support::{seed_user, test_database};

    async fn setup() -> (Arc<Database>, FollowService) {
        let db = Arc::new(test_database().await);
        let follows = FollowService::new(db.clone());
        (db, follows)
    }

    async fn edge_count(db: &Database) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM friendships")
            .fetch_one(db.pool())
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn follow_creates_edge_and_updates_counts() {
        let (db, follows) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;

        let edge = follows.follow_user(&alice, "bob").await.unwrap();
        assert_eq!(edge.from_user, alice.id);
        assert_eq!(edge.to_user, bob.id);

        assert!(follows.is_following(&alice.id, "bob").await.unwrap());
        assert_eq!(follows.count_following("alice").await.unwrap(), 1);
        assert_eq!(follows.count_followers("bob").await.unwrap(), 1);
        // The edge is directed
        assert!(!follows.is_following(&bob.id, "alice").await.unwrap());
        assert_eq!(follows.count_followers("alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn self_follow_is_rejected() {
        let (db, follows) = setup().await;
        let alice = seed_user(&db, "alice").await;

        let err = follows.follow_user(&alice, "alice").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(edge_count(&db).await, 0);
    }

    #[tokio::test]
    async fn duplicate_follow_conflicts_and_leaves_single_edge() {
        let (db, follows) = setup().await;
        let alice = seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        follows.follow_user(&alice, "bob").await.unwrap();
        let err = follows.follow_user(&alice, "bob").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(edge_count(&db).await, 1);
    }

    #[tokio::test]
    async fn following_unknown_user_is_not_found() {
        let (db, follows) = setup().await;
        let alice = seed_user(&db, "alice").await;

        let err = follows.follow_user(&alice, "nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unfollow_without_edge_is_not_found() {
        let (db, follows) = setup().await;
        let alice = seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        let err = follows.unfollow_user(&alice, "bob").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(follows.count_followers("bob").await.unwrap(), 0);
        assert_eq!(follows.count_following("alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn follow_then_unfollow_round_trips_counts() {
        let (db, follows) = setup().await;
        let alice = seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;

        follows.follow_user(&alice, "bob").await.unwrap();
        assert_eq!(follows.count_following("alice").await.unwrap(), 1);
        assert_eq!(follows.count_followers("bob").await.unwrap(), 1);

        follows.unfollow_user(&alice, "bob").await.unwrap();
        assert_eq!(follows.count_following("alice").await.unwrap(), 0);
        assert_eq!(follows.count_followers("bob").await.unwrap(), 0);
        assert!(!follows.is_following(&alice.id, "bob").await.unwrap());
    }

    #[tokio::test]
    async fn listings_reflect_the_graph() {
        let (db, follows) = setup().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        seed_user(&db, "carol").await;

        follows.follow_user(&alice, "bob").await.unwrap();
        follows.follow_user(&alice, "carol").await.unwrap();
        follows.follow_user(&bob, "carol").await.unwrap();

        let alice_follows = follows.list_following("alice").await.unwrap();
        let names: Vec<_> = alice_follows.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["carol", "bob"]);

        let carol_followers = follows.list_followers("carol").await.unwrap();
        let names: Vec<_> = carol_followers.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice"]);

        assert!(follows.list_followers("alice").await.unwrap().is_empty());
    }
}
