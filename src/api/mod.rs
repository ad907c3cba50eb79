pub mod http;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ClientResult;
use crate::feed::state::{SearchScope, SortDirection, SortField};
use crate::models::{ApiMessage, Credentials, LikeState, Post, PostPage, SessionInfo};

pub use http::HttpApi;

/// Query string of `GET /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub offset: usize,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortField>,
    pub direction: SortDirection,
}

/// Query string of `GET /posts/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub query: String,
    pub scope: SearchScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortField>,
    pub direction: SortDirection,
}

/// The blog's REST surface as seen by the feed. Every call shares one
/// session (cookie jar) with the others.
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn session(&self) -> ClientResult<SessionInfo>;

    async fn list_posts(&self, query: &ListQuery) -> ClientResult<PostPage>;

    async fn search_posts(&self, query: &SearchQuery) -> ClientResult<PostPage>;

    async fn create_post(&self, title: &str, content: &str) -> ClientResult<Post>;

    async fn update_post(&self, id: &str, title: &str, content: &str) -> ClientResult<Post>;

    async fn delete_post(&self, id: &str) -> ClientResult<ApiMessage>;

    async fn toggle_like(&self, id: &str) -> ClientResult<LikeState>;

    async fn add_comment(&self, id: &str, text: &str) -> ClientResult<ApiMessage>;

    async fn register(&self, credentials: Credentials<'_>) -> ClientResult<ApiMessage>;

    async fn login(&self, credentials: Credentials<'_>) -> ClientResult<ApiMessage>;

    async fn logout(&self) -> ClientResult<ApiMessage>;
}
