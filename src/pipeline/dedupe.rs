use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::domain::Post;

/// Content identity for duplicate grouping: hash over date, platform and
/// the first 100 characters of the caption (or the post type when there is
/// no caption). Not globally unique by construction.
pub fn content_id(post: &Post) -> String {
    let basis = post
        .caption
        .as_deref()
        .or(post.post_type.as_deref())
        .unwrap_or("");
    let prefix: String = basis.chars().take(100).collect();

    let mut hasher = Sha256::new();
    hasher.update(post.date.as_bytes());
    hasher.update(post.platform.as_str().as_bytes());
    hasher.update(prefix.as_bytes());
    hex::encode(hasher.finalize())
}

/// Count of populated fields, the "most complete wins" score.
fn completeness(post: &Post) -> usize {
    let counters = [
        post.likes,
        post.comments,
        post.shares,
        post.saves,
        post.reach,
        post.impressions,
        post.link_clicks,
    ];
    let mut score = counters.iter().filter(|&&c| c > 0).count();
    score += [&post.post_type, &post.caption, &post.permalink]
        .iter()
        .filter(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
        .count();
    if post.engagement_rate.is_some() {
        score += 1;
    }
    score
}

/// Collapses posts that share a content id, keeping the variant with the
/// strictly greater count of populated fields. Ties keep the earlier-seen
/// record; that order dependence is deliberate so repeated runs over the
/// same input pick the same survivor. Returns the surviving posts sorted
/// ascending by date and the number of duplicates dropped.
pub fn deduplicate(posts: Vec<Post>) -> (Vec<Post>, u64) {
    let mut kept: Vec<Post> = Vec::with_capacity(posts.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut removed = 0u64;

    for mut post in posts {
        let id = content_id(&post);
        post.post_id = Some(id.clone());

        match index.get(&id) {
            Some(&slot) => {
                removed += 1;
                if completeness(&post) > completeness(&kept[slot]) {
                    kept[slot] = post;
                }
            }
            None => {
                index.insert(id, kept.len());
                kept.push(post);
            }
        }
    }

    // Stable sort: same-day posts keep their first-seen order.
    kept.sort_by(|a, b| a.date.cmp(&b.date));
    (kept, removed)
}
