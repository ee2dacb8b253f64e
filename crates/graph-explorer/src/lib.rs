//! Social graph explorer for Bluesky / AT Protocol accounts.
//!
//! Fetches an actor's followers and follows, derives mutuals / fans /
//! not-following-back, and exports the result as JSON, CSV or a console
//! summary.

pub mod analysis;
pub mod cli;
pub mod client;
pub mod error;
pub mod export;
pub mod graph;

pub use analysis::{analyze, Relationships};
pub use client::{BskyClient, GraphEntry, ProfileView};
pub use error::{Error, Result};
pub use graph::{fetch_social_graph, SocialGraph};
