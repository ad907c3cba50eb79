use askama::Template;

use crate::models::{Comment, Post};
use crate::view::notice::Notice;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// --- View structs ---

pub struct CardComment {
    pub author: String,
    pub text: String,
    pub created_at: String,
}

pub struct PostCard {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: String,
    pub owned: bool,
    pub editing: bool,
    pub liked: bool,
    pub like_count: u32,
    pub comments: Vec<CardComment>,
    pub hidden_comments: usize,
    pub expanded: bool,
}

impl CardComment {
    fn from_comment(comment: &Comment) -> Self {
        Self {
            author: comment.author.clone(),
            text: comment.text.clone(),
            created_at: comment.timestamp.format(DISPLAY_FORMAT).to_string(),
        }
    }
}

/// Comments shown on a card: everything when expanded, otherwise only the
/// most recent one. Returns the visible comments and how many are hidden.
pub fn visible_comments(comments: &[Comment], expanded: bool) -> (&[Comment], usize) {
    if expanded || comments.len() <= 1 {
        (comments, 0)
    } else {
        let last = comments.len() - 1;
        (&comments[last..], last)
    }
}

pub struct CardOptions {
    pub owned: bool,
    pub editing: bool,
    pub liked: bool,
    pub like_count: u32,
    pub expanded: bool,
}

impl PostCard {
    pub fn new(post: &Post, options: CardOptions) -> Self {
        let (shown, hidden_comments) = visible_comments(&post.comments, options.expanded);
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            author: post.author.clone(),
            created_at: post.timestamp.format(DISPLAY_FORMAT).to_string(),
            owned: options.owned,
            editing: options.editing,
            liked: options.liked,
            like_count: options.like_count,
            comments: shown.iter().map(CardComment::from_comment).collect(),
            hidden_comments,
            expanded: options.expanded && post.comments.len() > 1,
        }
    }
}

// --- Templates ---

#[derive(Template)]
#[template(path = "components/post_card.html")]
pub struct PostCardTemplate<'a> {
    pub card: &'a PostCard,
}

#[derive(Template)]
#[template(path = "pages/feed.html")]
pub struct FeedPageTemplate<'a> {
    pub user: Option<&'a str>,
    pub notice: Option<Notice>,
    pub loading: bool,
    pub load_more: bool,
    pub cards: Vec<&'a str>,
}
