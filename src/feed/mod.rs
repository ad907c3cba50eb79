pub mod action;
pub mod controller;
pub mod state;

pub use action::{Control, FeedAction};
pub use controller::FeedController;
pub use state::{FeedState, SearchScope, SortDirection, SortField};
