use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Directed follow edge: `from_user` follows `to_user`.
///
/// Edges are immutable once created; the only operations are insert and
/// delete. Uniqueness of (from_user, to_user) and `from_user <> to_user`
/// are enforced by the schema, not re-checked here.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendShip {
    pub id: i64,
    pub from_user: String,
    pub to_user: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregated follow numbers for a profile page.
#[derive(Debug, Clone, Serialize)]
pub struct FollowStats {
    pub following_count: i64,
    pub follower_count: i64,
    /// Whether the viewing user follows this profile. Always false for
    /// anonymous viewers and for a user viewing their own profile.
    pub is_following: bool,
}
