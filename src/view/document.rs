use std::fmt::{self, Write as _};
use std::time::Duration;

use askama::Template;

use crate::feed::action::Control;
use crate::models::{LikeState, Post};
use crate::view::notice::{Notice, NoticeBoard, NoticeLevel};
use crate::view::templates::{visible_comments, CardOptions, FeedPageTemplate, PostCard, PostCardTemplate};
use crate::view::FeedView;

/// One rendered post card.
#[derive(Debug, Clone)]
pub struct PostNode {
    post: Post,
    owned: bool,
    editing: bool,
    expanded: bool,
    likes: LikeState,
    markup: String,
}

impl PostNode {
    fn new(post: &Post, current_user: Option<&str>) -> Self {
        let mut node = Self {
            post: post.clone(),
            owned: post.is_authored_by(current_user),
            editing: false,
            expanded: false,
            likes: LikeState {
                likes: post.likes.len() as u32,
                liked_by_user: post.is_liked_by(current_user),
            },
            markup: String::new(),
        };
        node.rerender();
        node
    }

    fn rerender(&mut self) {
        let card = PostCard::new(
            &self.post,
            CardOptions {
                owned: self.owned,
                editing: self.editing,
                liked: self.likes.liked_by_user,
                like_count: self.likes.likes,
                expanded: self.expanded,
            },
        );
        self.markup = match (PostCardTemplate { card: &card }).render() {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Template render error for post {}: {}", self.post.id, e);
                String::new()
            }
        };
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn id(&self) -> &str {
        &self.post.id
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn comments_expanded(&self) -> bool {
        self.expanded
    }

    pub fn likes(&self) -> LikeState {
        self.likes
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Controls currently offered by this card.
    pub fn controls(&self) -> Vec<Control> {
        if self.editing {
            return vec![Control::SaveEdit, Control::CancelEdit];
        }
        let mut controls = vec![Control::Like, Control::Comment];
        if self.post.comments.len() > 1 {
            controls.push(Control::ToggleComments);
        }
        if self.owned {
            controls.push(Control::Edit);
            controls.push(Control::Delete);
        }
        controls
    }
}

/// The client's rendered feed: post cards in server order plus the page
/// chrome around them (auth bar, spinner, load-more button, notice).
pub struct HtmlDocument {
    nodes: Vec<PostNode>,
    load_more_visible: bool,
    loading: bool,
    user: Option<String>,
    total_posts: Option<usize>,
    notices: NoticeBoard,
}

impl HtmlDocument {
    pub fn new(notice_delay: Duration) -> Self {
        Self {
            nodes: Vec::new(),
            load_more_visible: false,
            loading: false,
            user: None,
            total_posts: None,
            notices: NoticeBoard::new(notice_delay),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[PostNode] {
        &self.nodes
    }

    pub fn node(&self, post_id: &str) -> Option<&PostNode> {
        self.nodes.iter().find(|n| n.id() == post_id)
    }

    fn node_mut(&mut self, post_id: &str) -> Option<&mut PostNode> {
        self.nodes.iter_mut().find(|n| n.id() == post_id)
    }

    pub fn post_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(PostNode::id).collect()
    }

    pub fn load_more_visible(&self) -> bool {
        self.load_more_visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    pub fn render_page(&self) -> String {
        let page = FeedPageTemplate {
            user: self.user.as_deref(),
            notice: self.notices.current(),
            loading: self.loading,
            load_more: self.load_more_visible,
            cards: self.nodes.iter().map(PostNode::markup).collect(),
        };
        match page.render() {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Template render error for feed page: {}", e);
                String::new()
            }
        }
    }

    /// Plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> fmt::Result {
        match &self.user {
            Some(user) => writeln!(out, "Logged in as {user}")?,
            None => writeln!(out, "Not logged in")?,
        }
        if let Some(notice) = self.notices.current() {
            writeln!(out, "[{}] {}", notice.level, notice.text)?;
        }
        match self.total_posts {
            _ if self.nodes.is_empty() => writeln!(out, "(no posts)")?,
            Some(total) => writeln!(out, "Showing {} of {} posts", self.nodes.len(), total)?,
            None => writeln!(out, "Showing {} posts", self.nodes.len())?,
        }
        for node in &self.nodes {
            let post = &node.post;
            writeln!(out)?;
            if node.editing {
                writeln!(out, "[{}] editing: {} | {}", post.id, post.title, post.content)?;
                continue;
            }
            writeln!(
                out,
                "[{}] {} (by {} at {})",
                post.id,
                post.title,
                post.author,
                post.timestamp.format("%Y-%m-%d %H:%M:%S")
            )?;
            writeln!(out, "    {}", post.content)?;
            writeln!(
                out,
                "    likes: {}{}",
                node.likes.likes,
                if node.likes.liked_by_user { " (liked)" } else { "" }
            )?;
            let (shown, hidden) = visible_comments(&post.comments, node.expanded);
            for comment in shown {
                writeln!(out, "    > {}: {}", comment.author, comment.text)?;
            }
            if hidden > 0 {
                writeln!(out, "    ({hidden} earlier comments, `expand {}`)", post.id)?;
            }
            if node.owned {
                writeln!(out, "    [edit] [delete]")?;
            }
        }
        if self.load_more_visible {
            writeln!(out, "\n-- more posts available (`more`) --")?;
        }
        Ok(())
    }
}

impl FeedView for HtmlDocument {
    fn replace_posts(&mut self, posts: &[Post], current_user: Option<&str>) {
        self.nodes.clear();
        self.append_posts(posts, current_user);
    }

    fn append_posts(&mut self, posts: &[Post], current_user: Option<&str>) {
        self.nodes
            .extend(posts.iter().map(|post| PostNode::new(post, current_user)));
    }

    fn set_load_more_visible(&mut self, visible: bool) {
        self.load_more_visible = visible;
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_total_posts(&mut self, total: Option<usize>) {
        self.total_posts = total;
    }

    fn set_session(&mut self, user: Option<&str>) {
        self.user = user.map(str::to_string);
    }

    fn update_likes(&mut self, post_id: &str, likes: LikeState) {
        if let Some(node) = self.node_mut(post_id) {
            node.likes = likes;
            node.rerender();
        }
    }

    fn begin_edit(&mut self, post_id: &str) -> bool {
        match self.node_mut(post_id) {
            Some(node) => {
                node.editing = true;
                node.rerender();
                true
            }
            None => false,
        }
    }

    fn toggle_comments(&mut self, post_id: &str) -> bool {
        match self.node_mut(post_id) {
            Some(node) => {
                node.expanded = !node.expanded;
                node.rerender();
                true
            }
            None => false,
        }
    }

    fn has_control(&self, post_id: &str, control: Control) -> bool {
        self.node(post_id)
            .is_some_and(|node| node.controls().contains(&control))
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.notices.show(level, message);
    }
}
