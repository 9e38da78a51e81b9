//! Hot Rank RSS - turns the 36kr 24h hot ranking into an RSS 2.0 feed
//!
//! One run fetches the ranking from the 36kr gateway (retrying transient
//! failures with jittered exponential backoff), renders the head of the
//! list as RSS and writes it to disk.

pub mod config;
pub mod fetcher;
pub mod model;
pub mod output;
pub mod retry;
pub mod rss;
