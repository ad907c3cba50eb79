/// A control a rendered post card can offer. Cards carry these as
/// `data-action` attributes next to `data-post-id`; activating one becomes
/// a `FeedAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Like,
    Comment,
    ToggleComments,
    Edit,
    Delete,
    SaveEdit,
    CancelEdit,
}

impl Control {
    pub fn as_str(&self) -> &'static str {
        match self {
            Control::Like => "like",
            Control::Comment => "comment",
            Control::ToggleComments => "toggle-comments",
            Control::Edit => "edit",
            Control::Delete => "delete",
            Control::SaveEdit => "save-edit",
            Control::CancelEdit => "cancel-edit",
        }
    }
}

/// A user interaction with the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    LoadMore,
    Like {
        post_id: String,
    },
    Comment {
        post_id: String,
        text: String,
    },
    ToggleComments {
        post_id: String,
    },
    Edit {
        post_id: String,
    },
    Delete {
        post_id: String,
    },
    SaveEdit {
        post_id: String,
        title: String,
        content: String,
    },
    CancelEdit {
        post_id: String,
    },
}

impl FeedAction {
    pub fn post_id(&self) -> Option<&str> {
        match self {
            FeedAction::LoadMore => None,
            FeedAction::Like { post_id }
            | FeedAction::Comment { post_id, .. }
            | FeedAction::ToggleComments { post_id }
            | FeedAction::Edit { post_id }
            | FeedAction::Delete { post_id }
            | FeedAction::SaveEdit { post_id, .. }
            | FeedAction::CancelEdit { post_id } => Some(post_id),
        }
    }

    /// The card control this action comes from, if any.
    pub fn control(&self) -> Option<Control> {
        match self {
            FeedAction::LoadMore => None,
            FeedAction::Like { .. } => Some(Control::Like),
            FeedAction::Comment { .. } => Some(Control::Comment),
            FeedAction::ToggleComments { .. } => Some(Control::ToggleComments),
            FeedAction::Edit { .. } => Some(Control::Edit),
            FeedAction::Delete { .. } => Some(Control::Delete),
            FeedAction::SaveEdit { .. } => Some(Control::SaveEdit),
            FeedAction::CancelEdit { .. } => Some(Control::CancelEdit),
        }
    }
}
