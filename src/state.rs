use crate::{
    config::Config,
    services::{AuthService, FeedService, FollowService, TweetService, UserService},
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub auth_service: AuthService,

    pub user_service: UserService,

    pub tweet_service: TweetService,

    pub follow_service: FollowService,

    pub feed_service: FeedService,
}
