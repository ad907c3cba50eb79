//! In-memory `BlogApi` used by the controller tests. Mirrors the server's
//! rules (newest first, author-only edits, like toggling) and can be told
//! to drop requests on the floor.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use reqwest::StatusCode;

use crate::api::{BlogApi, ListQuery, SearchQuery};
use crate::error::{ClientError, ClientResult};
use crate::feed::state::{SearchScope, SortDirection, SortField};
use crate::models::{ApiMessage, Comment, Credentials, LikeState, Post, PostPage, SessionInfo};

#[derive(Default)]
struct Store {
    users: HashMap<String, String>,
    /// Oldest first.
    posts: Vec<Post>,
    session: Option<String>,
    next_id: usize,
}

#[derive(Default)]
pub(crate) struct MemoryApi {
    store: Mutex<Store>,
    offline: AtomicBool,
    session_offline: AtomicBool,
    listing_offline: AtomicBool,
    requests: AtomicUsize,
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

/// What a gateway in front of a stopped server answers: a status and no
/// `{error}` body.
fn unavailable() -> ClientError {
    ClientError::Http {
        status: StatusCode::SERVICE_UNAVAILABLE,
        message: None,
    }
}

fn http(status: StatusCode, message: &str) -> ClientError {
    ClientError::Http {
        status,
        message: Some(message.to_string()),
    }
}

impl MemoryApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_user(self, username: &str, password: &str) -> Self {
        self.store
            .lock()
            .unwrap()
            .users
            .insert(username.to_string(), password.to_string());
        self
    }

    pub(crate) fn signed_in(self, username: &str) -> Self {
        self.store.lock().unwrap().session = Some(username.to_string());
        self
    }

    /// Insert a post directly, bypassing auth. Returns its id.
    pub(crate) fn seed(&self, author: &str, title: &str, content: &str) -> String {
        let mut store = self.store.lock().unwrap();
        store.next_id += 1;
        let id = format!("p{}", store.next_id);
        let timestamp = base_time() + Duration::minutes(store.next_id as i64);
        store.posts.push(Post {
            id: id.clone(),
            title: title.to_string(),
            content: content.to_string(),
            author: author.to_string(),
            timestamp,
            likes: BTreeSet::new(),
            comments: Vec::new(),
        });
        id
    }

    pub(crate) fn seed_many(&self, author: &str, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| self.seed(author, &format!("Post {i}"), &format!("Body {i}")))
            .collect()
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn set_session_offline(&self, offline: bool) {
        self.session_offline.store(offline, Ordering::SeqCst);
    }

    /// Fail only the listing and search endpoints.
    pub(crate) fn set_listing_offline(&self, offline: bool) {
        self.listing_offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub(crate) fn post(&self, id: &str) -> Option<Post> {
        let store = self.store.lock().unwrap();
        store.posts.iter().find(|p| p.id == id).cloned()
    }

    fn enter(&self) -> ClientResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn enter_listing(&self) -> ClientResult<()> {
        self.enter()?;
        if self.listing_offline.load(Ordering::SeqCst) {
            return Err(http(StatusCode::INTERNAL_SERVER_ERROR, "Listing unavailable"));
        }
        Ok(())
    }

    fn require_user(store: &Store) -> ClientResult<String> {
        store
            .session
            .clone()
            .ok_or_else(|| http(StatusCode::UNAUTHORIZED, "Authentication required"))
    }

    fn newest_first(store: &Store) -> Vec<Post> {
        store.posts.iter().rev().cloned().collect()
    }

    fn apply_sort(posts: &mut [Post], sort: Option<SortField>, direction: SortDirection) {
        if let Some(field) = sort {
            posts.sort_by_key(|p| match field {
                SortField::Title => p.title.to_lowercase(),
                SortField::Content => p.content.to_lowercase(),
            });
            if direction == SortDirection::Desc {
                posts.reverse();
            }
        }
    }
}

#[async_trait]
impl BlogApi for MemoryApi {
    async fn session(&self) -> ClientResult<SessionInfo> {
        self.enter()?;
        if self.session_offline.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let store = self.store.lock().unwrap();
        Ok(SessionInfo {
            user: store.session.clone(),
        })
    }

    async fn list_posts(&self, query: &ListQuery) -> ClientResult<PostPage> {
        self.enter_listing()?;
        let store = self.store.lock().unwrap();
        let mut posts = Self::newest_first(&store);
        Self::apply_sort(&mut posts, query.sort, query.direction);
        let total = posts.len();
        let page: Vec<Post> = posts
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        let has_more = query.offset + page.len() < total;
        Ok(PostPage {
            posts: page,
            has_more,
            total_posts: Some(total),
        })
    }

    async fn search_posts(&self, query: &SearchQuery) -> ClientResult<PostPage> {
        self.enter_listing()?;
        let store = self.store.lock().unwrap();
        let needle = query.query.to_lowercase();
        let posts: Vec<Post> = Self::newest_first(&store)
            .into_iter()
            .filter(|p| {
                let title = p.title.to_lowercase().contains(&needle);
                let content = p.content.to_lowercase().contains(&needle);
                match query.scope {
                    SearchScope::All => title || content,
                    SearchScope::Title => title,
                    SearchScope::Content => content,
                }
            })
            .collect();
        Ok(PostPage {
            total_posts: Some(posts.len()),
            posts,
            has_more: false,
        })
    }

    async fn create_post(&self, title: &str, content: &str) -> ClientResult<Post> {
        self.enter()?;
        let author = Self::require_user(&self.store.lock().unwrap())?;
        let id = self.seed(&author, title, content);
        self.post(&id)
            .ok_or_else(|| ClientError::Parse("post vanished".into()))
    }

    async fn update_post(&self, id: &str, title: &str, content: &str) -> ClientResult<Post> {
        self.enter()?;
        let mut store = self.store.lock().unwrap();
        let user = Self::require_user(&store)?;
        let post = store
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| http(StatusCode::NOT_FOUND, "Post not found."))?;
        if post.author != user {
            return Err(http(StatusCode::FORBIDDEN, "Not authorized to edit this post."));
        }
        post.title = title.to_string();
        post.content = content.to_string();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: &str) -> ClientResult<ApiMessage> {
        self.enter()?;
        let mut store = self.store.lock().unwrap();
        let user = Self::require_user(&store)?;
        let index = store
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| http(StatusCode::NOT_FOUND, "Post not found."))?;
        if store.posts[index].author != user {
            return Err(http(StatusCode::FORBIDDEN, "Not authorized to delete this post."));
        }
        store.posts.remove(index);
        Ok(ApiMessage {
            message: Some(format!("Post with id {id} has been deleted successfully.")),
        })
    }

    async fn toggle_like(&self, id: &str) -> ClientResult<LikeState> {
        self.enter()?;
        let mut store = self.store.lock().unwrap();
        let user = Self::require_user(&store)?;
        let post = store
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| http(StatusCode::NOT_FOUND, "Post not found"))?;
        if !post.likes.remove(&user) {
            post.likes.insert(user.clone());
        }
        Ok(LikeState {
            likes: post.likes.len() as u32,
            liked_by_user: post.likes.contains(&user),
        })
    }

    async fn add_comment(&self, id: &str, text: &str) -> ClientResult<ApiMessage> {
        self.enter()?;
        let mut store = self.store.lock().unwrap();
        let user = Self::require_user(&store)?;
        let post = store
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| http(StatusCode::NOT_FOUND, "Post not found."))?;
        let timestamp = base_time() + Duration::hours(post.comments.len() as i64 + 1);
        post.comments.push(Comment {
            author: user,
            text: text.to_string(),
            timestamp,
        });
        Ok(ApiMessage {
            message: Some("Comment added.".into()),
        })
    }

    async fn register(&self, credentials: Credentials<'_>) -> ClientResult<ApiMessage> {
        self.enter()?;
        let mut store = self.store.lock().unwrap();
        if store.users.contains_key(credentials.username) {
            return Err(http(StatusCode::BAD_REQUEST, "Username already exists"));
        }
        store
            .users
            .insert(credentials.username.into(), credentials.password.into());
        Ok(ApiMessage {
            message: Some(format!(
                "User {} registered successfully.",
                credentials.username
            )),
        })
    }

    async fn login(&self, credentials: Credentials<'_>) -> ClientResult<ApiMessage> {
        self.enter()?;
        let mut store = self.store.lock().unwrap();
        if store.users.get(credentials.username).map(String::as_str)
            != Some(credentials.password)
        {
            return Err(http(StatusCode::UNAUTHORIZED, "Invalid credentials"));
        }
        store.session = Some(credentials.username.to_string());
        Ok(ApiMessage {
            message: Some(format!("Logged in as {}", credentials.username)),
        })
    }

    async fn logout(&self) -> ClientResult<ApiMessage> {
        self.enter()?;
        self.store.lock().unwrap().session = None;
        Ok(ApiMessage {
            message: Some("Logged out successfully".into()),
        })
    }
}
