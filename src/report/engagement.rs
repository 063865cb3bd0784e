use crate::domain::Post;
use crate::pipeline::normalize::round2;

/// Outcome counts of one backfill pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EngagementSummary {
    pub calculated: u64,
    pub skipped: u64,
    pub zero_reach: u64,
}

/// Fills in engagement rates for posts that came out of parsing without
/// one. Posts that already carry a positive rate are left alone; posts
/// with zero reach keep their rate unset.
pub fn backfill_rates(posts: &mut [Post]) -> EngagementSummary {
    let mut summary = EngagementSummary::default();

    for post in posts {
        if post.engagement_rate.is_some_and(|r| r > 0.0) {
            summary.skipped += 1;
            continue;
        }

        if post.reach > 0 {
            let rate = post.total_interactions() as f64 / post.reach as f64 * 100.0;
            post.engagement_rate = Some(round2(rate));
            summary.calculated += 1;
        } else {
            post.engagement_rate = None;
            summary.zero_reach += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Platform;

    fn post(reach: u64, likes: u64) -> Post {
        let mut p = Post::new("2024-03-01".into(), Platform::Instagram, "ig.csv".into());
        p.reach = reach;
        p.likes = likes;
        p
    }

    #[test]
    fn computes_missing_rates() {
        let mut posts = vec![post(200, 20)];
        let summary = backfill_rates(&mut posts);
        assert_eq!(posts[0].engagement_rate, Some(10.0));
        assert_eq!(summary.calculated, 1);
    }

    #[test]
    fn existing_positive_rate_is_kept() {
        let mut p = post(200, 20);
        p.engagement_rate = Some(4.5);
        let mut posts = vec![p];
        let summary = backfill_rates(&mut posts);
        assert_eq!(posts[0].engagement_rate, Some(4.5));
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn zero_reach_stays_unset() {
        let mut posts = vec![post(0, 15)];
        let summary = backfill_rates(&mut posts);
        assert_eq!(posts[0].engagement_rate, None);
        assert_eq!(summary.zero_reach, 1);
    }

    #[test]
    fn zero_rate_is_recomputed() {
        // A parsed 0.0 (e.g. a blank "Engagement Rate" column) is treated
        // as missing.
        let mut p = post(100, 50);
        p.engagement_rate = Some(0.0);
        let mut posts = vec![p];
        backfill_rates(&mut posts);
        assert_eq!(posts[0].engagement_rate, Some(50.0));
    }
}
