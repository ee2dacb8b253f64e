use serde::Serialize;
use tracing::info;

use crate::client::{BskyClient, GraphEntry, ProfileView};
use crate::error::Result;

/// Complete social graph snapshot for one actor.
#[derive(Debug, Clone, Serialize)]
pub struct SocialGraph {
    pub actor: String,
    pub profile: ProfileView,
    pub followers: Vec<GraphEntry>,
    pub follows: Vec<GraphEntry>,
}

/// Fetch the full graph for an actor: profile first, then the two
/// paginated lists. A failed profile lookup aborts before any list
/// endpoint is called.
pub async fn fetch_social_graph(client: &BskyClient, actor: &str) -> Result<SocialGraph> {
    let profile = client.get_profile(actor).await?;
    info!(
        handle = %profile.handle,
        followers = profile.followers_count,
        follows = profile.follows_count,
        "resolved profile"
    );

    println!("Fetching followers for {actor}...");
    let followers = client.get_followers(actor).await?;
    println!("  Found {} followers", followers.len());

    println!("Fetching follows for {actor}...");
    let follows = client.get_follows(actor).await?;
    println!("  Found {} follows", follows.len());

    Ok(SocialGraph {
        actor: actor.to_string(),
        profile,
        followers,
        follows,
    })
}
