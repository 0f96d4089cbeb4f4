pub mod auth;
pub mod database;
pub mod feed;
pub mod follow;
pub mod tweet;
pub mod user;

pub use auth::AuthService;
pub use database::Database;
pub use feed::FeedService;
pub use follow::FollowService;
pub use tweet::TweetService;
pub use user::UserService;
