pub mod document;
pub mod notice;
pub mod templates;

use crate::feed::action::Control;
use crate::models::{LikeState, Post};
use notice::NoticeLevel;

pub use document::HtmlDocument;

/// Where the controller puts the feed. The controller never inspects what
/// was rendered; it only asks whether a control exists before acting on it.
pub trait FeedView {
    /// Drop every rendered post, then render `posts` in the given order.
    fn replace_posts(&mut self, posts: &[Post], current_user: Option<&str>);

    /// Render `posts` after the existing ones.
    fn append_posts(&mut self, posts: &[Post], current_user: Option<&str>);

    fn set_load_more_visible(&mut self, visible: bool);

    fn set_loading(&mut self, loading: bool);

    /// Size of the whole listing (or search result), when the server says.
    fn set_total_posts(&mut self, total: Option<usize>);

    fn set_session(&mut self, user: Option<&str>);

    /// Show the server's like count and state for one post.
    fn update_likes(&mut self, post_id: &str, likes: LikeState);

    /// Switch a post into edit mode. False when the post is not rendered.
    fn begin_edit(&mut self, post_id: &str) -> bool;

    /// Expand or collapse a post's comments. False when the post is not
    /// rendered.
    fn toggle_comments(&mut self, post_id: &str) -> bool;

    fn has_control(&self, post_id: &str, control: Control) -> bool;

    fn notify(&mut self, level: NoticeLevel, message: &str);
}
