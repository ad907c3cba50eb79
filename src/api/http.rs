use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{BlogApi, ListQuery, SearchQuery};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    ApiErrorBody, ApiMessage, CommentInput, Credentials, LikeState, Post, PostInput, PostPage,
    SessionInfo,
};

/// `BlogApi` over HTTP. Cookies set by the server (the login session) are
/// kept in the client's jar and sent with every request.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: parse_base(base_url)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Point the client at another server. The cookie jar is kept; cookies
    /// are scoped by host anyway.
    pub fn set_base_url(&mut self, base_url: &str) -> ClientResult<()> {
        self.base_url = parse_base(base_url)?;
        Ok(())
    }

    /// Build an endpoint URL under the base, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Config(format!("{} cannot be a base URL", self.base_url)))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Like `send`, for endpoints whose success body is only informational.
    async fn send_ack(&self, request: RequestBuilder) -> ClientResult<ApiMessage> {
        let body = self.send_raw(request).await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn send_raw(&self, request: RequestBuilder) -> ClientResult<String> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Request failed: {}", e);
            ClientError::Network(e)
        })?;

        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;
        tracing::debug!("{} -> {}", url, status);

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .map(|b| b.error);
            tracing::warn!("{} rejected with {}: {:?}", url, status, message);
            return Err(ClientError::Http { status, message });
        }

        Ok(body)
    }
}

fn parse_base(raw: &str) -> ClientResult<Url> {
    Url::parse(raw.trim().trim_end_matches('/'))
        .map_err(|e| ClientError::Config(format!("invalid base URL {raw:?}: {e}")))
}

#[async_trait]
impl BlogApi for HttpApi {
    async fn session(&self) -> ClientResult<SessionInfo> {
        let url = self.endpoint(&["session"])?;
        self.send(self.client.get(url)).await
    }

    async fn list_posts(&self, query: &ListQuery) -> ClientResult<PostPage> {
        let url = self.endpoint(&["posts"])?;
        self.send(self.client.get(url).query(query)).await
    }

    async fn search_posts(&self, query: &SearchQuery) -> ClientResult<PostPage> {
        let url = self.endpoint(&["posts", "search"])?;
        self.send(self.client.get(url).query(query)).await
    }

    async fn create_post(&self, title: &str, content: &str) -> ClientResult<Post> {
        let url = self.endpoint(&["posts"])?;
        let body = PostInput { title, content };
        self.send(self.client.post(url).json(&body)).await
    }

    async fn update_post(&self, id: &str, title: &str, content: &str) -> ClientResult<Post> {
        let url = self.endpoint(&["posts", id])?;
        let body = PostInput { title, content };
        self.send(self.client.put(url).json(&body)).await
    }

    async fn delete_post(&self, id: &str) -> ClientResult<ApiMessage> {
        let url = self.endpoint(&["posts", id])?;
        self.send_ack(self.client.delete(url)).await
    }

    async fn toggle_like(&self, id: &str) -> ClientResult<LikeState> {
        let url = self.endpoint(&["posts", id, "like-toggle"])?;
        self.send(self.client.put(url)).await
    }

    async fn add_comment(&self, id: &str, text: &str) -> ClientResult<ApiMessage> {
        let url = self.endpoint(&["posts", id, "comments"])?;
        self.send_ack(self.client.post(url).json(&CommentInput { text }))
            .await
    }

    async fn register(&self, credentials: Credentials<'_>) -> ClientResult<ApiMessage> {
        let url = self.endpoint(&["register"])?;
        self.send_ack(self.client.post(url).json(&credentials)).await
    }

    async fn login(&self, credentials: Credentials<'_>) -> ClientResult<ApiMessage> {
        let url = self.endpoint(&["login"])?;
        self.send_ack(self.client.post(url).json(&credentials)).await
    }

    async fn logout(&self) -> ClientResult<ApiMessage> {
        let url = self.endpoint(&["logout"])?;
        self.send_ack(self.client.post(url)).await
    }
}
