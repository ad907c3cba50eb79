use crate::api::{BlogApi, ListQuery, SearchQuery};
use crate::error::{require, ClientError, ClientResult};
use crate::feed::action::FeedAction;
use crate::feed::state::{FeedState, SearchScope, SortDirection, SortField};
use crate::models::Credentials;
use crate::view::notice::NoticeLevel;
use crate::view::FeedView;

/// Keeps the rendered feed in line with the server and the user's
/// pagination/search/sort selection.
///
/// Every operation catches its own failures and turns them into a notice;
/// the returned `bool` only reports whether the action went through.
pub struct FeedController<A, V> {
    api: A,
    view: V,
    state: FeedState,
    page_size: usize,
}

fn validate_post<'a>(title: &'a str, content: &'a str) -> ClientResult<(&'a str, &'a str)> {
    Ok((require("Title", title)?, require("Content", content)?))
}

fn validate_credentials<'a>(username: &'a str, password: &'a str) -> ClientResult<Credentials<'a>> {
    Ok(Credentials {
        username: require("Username", username)?,
        password: require("Password", password)?,
    })
}

impl<A: BlogApi, V: FeedView> FeedController<A, V> {
    pub fn new(api: A, view: V, page_size: usize) -> Self {
        Self {
            api,
            view,
            state: FeedState::default(),
            page_size: page_size.max(1),
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    fn report(&mut self, err: &ClientError) {
        let level = if err.is_validation() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        self.view.notify(level, &err.user_message());
    }

    /// The session user, or anonymous when the lookup fails.
    async fn resolve_session(&self) -> Option<String> {
        match self.api.session().await {
            Ok(session) => session.user,
            Err(e) => {
                tracing::warn!("Session lookup failed, continuing anonymously: {}", e);
                None
            }
        }
    }

    /// Fetch a page (or the search results) and render it. When `append`
    /// is false everything rendered before is replaced. On failure nothing
    /// but the notice changes.
    pub async fn load_feed(&mut self, append: bool) -> bool {
        let target = self.state.clone();
        self.load_into(target, append).await
    }

    /// Fetch with the criteria in `target` and commit it as the new state
    /// only once the page has arrived.
    async fn load_into(&mut self, target: FeedState, append: bool) -> bool {
        let user = self.resolve_session().await;
        let searching = target.is_searching();
        let append = append && !searching;

        self.view.set_loading(true);
        let result = if searching {
            let query = SearchQuery {
                query: target.query.trim().to_string(),
                scope: target.scope,
                sort: target.sort,
                direction: target.direction,
            };
            tracing::debug!("Searching posts: {:?}", query);
            self.api.search_posts(&query).await
        } else {
            let query = ListQuery {
                offset: target.request_offset(append),
                limit: self.page_size,
                sort: target.sort,
                direction: target.direction,
            };
            tracing::debug!("Listing posts: {:?}", query);
            self.api.list_posts(&query).await
        };
        self.view.set_loading(false);

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.report(&e);
                return false;
            }
        };

        let received = page.posts.len();
        self.state = target
            .with_user(user)
            .after_page(append, received, page.has_more, page.total_posts);

        let current_user = self.state.current_user.as_deref();
        self.view.set_session(current_user);
        if append {
            self.view.append_posts(&page.posts, current_user);
        } else {
            self.view.replace_posts(&page.posts, current_user);
        }
        self.view.set_load_more_visible(self.state.can_load_more());
        self.view.set_total_posts(self.state.total_posts);

        tracing::debug!(
            "Rendered {} posts (offset {}, has_more {})",
            received,
            self.state.offset,
            self.state.has_more
        );
        true
    }

    pub async fn load_more(&mut self) -> bool {
        if self.state.is_searching() {
            self.view
                .notify(NoticeLevel::Info, "Clear the search to page through all posts.");
            return false;
        }
        if !self.state.has_more {
            self.view.notify(NoticeLevel::Info, "No more posts to load.");
            return false;
        }
        self.load_feed(true).await
    }

    pub async fn search(&mut self, query: &str, scope: SearchScope) -> bool {
        let target = self.state.clone().with_search(query, scope);
        self.load_into(target, false).await
    }

    pub async fn clear_search(&mut self) -> bool {
        let target = self.state.clone().without_search();
        self.load_into(target, false).await
    }

    pub async fn set_sort(&mut self, sort: Option<SortField>, direction: SortDirection) -> bool {
        let target = self.state.clone().with_sort(sort, direction);
        self.load_into(target, false).await
    }

    /// Common tail of every successful mutation: reload from the top so the
    /// view shows the server's ordering. A failed reload keeps the previous
    /// pagination in step with what is still rendered.
    async fn after_mutation(&mut self, message: Option<&str>) {
        if let Some(message) = message {
            self.view.notify(NoticeLevel::Success, message);
        }
        self.load_feed(false).await;
    }

    pub async fn submit_post(&mut self, title: &str, content: &str) -> bool {
        let (title, content) = match validate_post(title, content) {
            Ok(fields) => fields,
            Err(e) => {
                self.report(&e);
                return false;
            }
        };

        match self.api.create_post(title, content).await {
            Ok(post) => {
                tracing::info!("Created post {}", post.id);
                self.after_mutation(Some("Post created.")).await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    pub fn begin_edit(&mut self, post_id: &str) -> bool {
        if self.view.begin_edit(post_id) {
            true
        } else {
            self.view.notify(NoticeLevel::Warning, "That post is no longer shown.");
            false
        }
    }

    pub async fn cancel_edit(&mut self, post_id: &str) -> bool {
        tracing::debug!("Cancelled edit of post {}", post_id);
        self.load_feed(false).await
    }

    pub async fn submit_edit(&mut self, post_id: &str, title: &str, content: &str) -> bool {
        let (title, content) = match validate_post(title, content) {
            Ok(fields) => fields,
            Err(e) => {
                self.report(&e);
                return false;
            }
        };

        match self.api.update_post(post_id, title, content).await {
            Ok(post) => {
                tracing::info!("Updated post {}", post.id);
                self.after_mutation(Some("Post updated.")).await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    pub async fn delete_post(&mut self, post_id: &str) -> bool {
        match self.api.delete_post(post_id).await {
            Ok(ack) => {
                tracing::info!("Deleted post {}", post_id);
                let message = ack.message.unwrap_or_else(|| "Post deleted.".to_string());
                self.after_mutation(Some(&message)).await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Toggle the session user's like. The displayed count and state are
    /// taken from the server's answer, never computed here.
    pub async fn toggle_like(&mut self, post_id: &str) -> bool {
        match self.api.toggle_like(post_id).await {
            Ok(likes) => {
                tracing::debug!("Post {} now has {} likes", post_id, likes.likes);
                self.view.update_likes(post_id, likes);
                self.after_mutation(None).await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    pub async fn submit_comment(&mut self, post_id: &str, text: &str) -> bool {
        let text = match require("Comment", text) {
            Ok(text) => text,
            Err(e) => {
                self.report(&e);
                return false;
            }
        };

        match self.api.add_comment(post_id, text).await {
            Ok(ack) => {
                let message = ack.message.unwrap_or_else(|| "Comment added.".to_string());
                self.after_mutation(Some(&message)).await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    pub fn toggle_comments(&mut self, post_id: &str) -> bool {
        if self.view.toggle_comments(post_id) {
            true
        } else {
            self.view.notify(NoticeLevel::Warning, "That post is no longer shown.");
            false
        }
    }

    pub async fn register(&mut self, username: &str, password: &str) -> bool {
        let credentials = match validate_credentials(username, password) {
            Ok(c) => c,
            Err(e) => {
                self.report(&e);
                return false;
            }
        };

        match self.api.register(credentials).await {
            Ok(ack) => {
                tracing::info!("Registered user {}", credentials.username);
                let message = ack
                    .message
                    .unwrap_or_else(|| format!("User {} registered.", credentials.username));
                self.after_mutation(Some(&message)).await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        let credentials = match validate_credentials(username, password) {
            Ok(c) => c,
            Err(e) => {
                self.report(&e);
                return false;
            }
        };

        match self.api.login(credentials).await {
            Ok(ack) => {
                tracing::info!("Logged in as {}", credentials.username);
                let message = ack
                    .message
                    .unwrap_or_else(|| format!("Logged in as {}", credentials.username));
                self.after_mutation(Some(&message)).await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    pub async fn logout(&mut self) -> bool {
        match self.api.logout().await {
            Ok(ack) => {
                tracing::info!("Logged out");
                let message = ack
                    .message
                    .unwrap_or_else(|| "Logged out.".to_string());
                self.after_mutation(Some(&message)).await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Act on a control activation. Post controls are honoured only when
    /// the rendered card actually offers them.
    pub async fn dispatch(&mut self, action: FeedAction) -> bool {
        if let (Some(post_id), Some(control)) = (action.post_id(), action.control()) {
            if !self.view.has_control(post_id, control) {
                tracing::debug!("Ignoring {} on post {}", control.as_str(), post_id);
                self.view.notify(
                    NoticeLevel::Warning,
                    "That action is not available for this post.",
                );
                return false;
            }
        }

        match action {
            FeedAction::LoadMore => self.load_more().await,
            FeedAction::Like { post_id } => self.toggle_like(&post_id).await,
            FeedAction::Comment { post_id, text } => self.submit_comment(&post_id, &text).await,
            FeedAction::ToggleComments { post_id } => self.toggle_comments(&post_id),
            FeedAction::Edit { post_id } => self.begin_edit(&post_id),
            FeedAction::Delete { post_id } => self.delete_post(&post_id).await,
            FeedAction::SaveEdit {
                post_id,
                title,
                content,
            } => self.submit_edit(&post_id, &title, &content).await,
            FeedAction::CancelEdit { post_id } => self.cancel_edit(&post_id).await,
        }
    }
}
