// Feed state - plain values with pure transitions, owned by the controller
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which post fields a search matches against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    All,
    Title,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Title,
    Content,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::All => "all",
            SearchScope::Title => "title",
            SearchScope::Content => "content",
        }
    }
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Content => "content",
        }
    }
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(SearchScope::All),
            "title" => Ok(SearchScope::Title),
            "content" => Ok(SearchScope::Content),
            other => Err(format!("unknown search scope: {other}")),
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "content" => Ok(SortField::Content),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// Everything the client remembers about the feed between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedState {
    /// Number of posts loaded so far; the next page starts here.
    pub offset: usize,
    pub query: String,
    pub scope: SearchScope,
    pub sort: Option<SortField>,
    pub direction: SortDirection,
    pub has_more: bool,
    pub total_posts: Option<usize>,
    pub current_user: Option<String>,
}

impl FeedState {
    pub fn is_searching(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.is_searching()
    }

    /// Offset to request for the next page.
    pub fn request_offset(&self, append: bool) -> usize {
        if append && !self.is_searching() {
            self.offset
        } else {
            0
        }
    }

    /// State after a page of `received` posts arrived.
    pub fn after_page(
        mut self,
        append: bool,
        received: usize,
        has_more: bool,
        total_posts: Option<usize>,
    ) -> Self {
        if self.is_searching() {
            self.offset = 0;
            self.has_more = false;
            self.total_posts = Some(received);
        } else {
            self.offset = if append {
                self.offset + received
            } else {
                received
            };
            self.has_more = has_more;
            self.total_posts = total_posts;
        }
        self
    }

    pub fn with_search(mut self, query: &str, scope: SearchScope) -> Self {
        self.query = query.trim().to_string();
        self.scope = scope;
        self.offset = 0;
        self
    }

    pub fn without_search(mut self) -> Self {
        self.query.clear();
        self.scope = SearchScope::All;
        self.offset = 0;
        self
    }

    pub fn with_sort(mut self, sort: Option<SortField>, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self.offset = 0;
        self
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.current_user = user;
        self
    }
}
