//! Terminal live feed for a running show: polls the public messages endpoint
//! and redraws the list whenever new messages arrive.

pub mod source;
pub mod state;
pub mod worker;

pub use source::{FeedMessage, HttpMessageSource, MessageSource};
pub use state::FeedState;
pub use worker::{poll_once, render, run_feed, FeedError};
