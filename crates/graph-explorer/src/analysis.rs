use std::collections::HashSet;

use serde::Serialize;

use crate::client::GraphEntry;

/// The relationship split derived from a followers and a follows list.
///
/// As DID sets: mutuals ∪ fans = followers, mutuals ∪ not_following_back =
/// follows, and the three categories are pairwise disjoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Relationships {
    /// Accounts in both lists. Follows-list order.
    pub mutuals: Vec<GraphEntry>,
    /// Followers the actor does not follow back. Followers-list order.
    pub fans: Vec<GraphEntry>,
    /// Follows who do not follow the actor back. Follows-list order.
    pub not_following_back: Vec<GraphEntry>,
}

/// Compute mutuals, fans and not-following-back from the two lists.
///
/// Membership is decided by DID. Duplicate DIDs (possible across page
/// boundaries while the live graph is changing) collapse to their first
/// occurrence, so the computation is idempotent.
pub fn analyze(followers: &[GraphEntry], follows: &[GraphEntry]) -> Relationships {
    let followers = dedup_by_did(followers);
    let follows = dedup_by_did(follows);

    let follower_dids: HashSet<&str> = followers.iter().map(|e| e.did.as_str()).collect();
    let follow_dids: HashSet<&str> = follows.iter().map(|e| e.did.as_str()).collect();

    let mutuals = follows
        .iter()
        .filter(|e| follower_dids.contains(e.did.as_str()))
        .map(|e| (*e).clone())
        .collect();

    let fans = followers
        .iter()
        .filter(|e| !follow_dids.contains(e.did.as_str()))
        .map(|e| (*e).clone())
        .collect();

    let not_following_back = follows
        .iter()
        .filter(|e| !follower_dids.contains(e.did.as_str()))
        .map(|e| (*e).clone())
        .collect();

    Relationships {
        mutuals,
        fans,
        not_following_back,
    }
}

/// Keep the first occurrence of every DID, preserving list order.
fn dedup_by_did(entries: &[GraphEntry]) -> Vec<&GraphEntry> {
    let mut seen = HashSet::new();
    entries.iter().filter(|e| seen.insert(e.did.as_str())).collect()
}
