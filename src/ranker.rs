use std::cmp::{Ordering, Reverse};

use crate::data_models::{RankKey, VideoRecord};

/// `views + 10 * likes`, saturating.
pub fn composite_score(record: &VideoRecord) -> u64 {
    record
        .view_count
        .saturating_add(record.like_count.saturating_mul(10))
}

fn primary(record: &VideoRecord, key: RankKey) -> u64 {
    match key {
        RankKey::Views => record.view_count,
        RankKey::Likes => record.like_count,
        RankKey::Composite => composite_score(record),
    }
}

/// Total order used for ranking: primary key descending, then views and likes
/// descending, then most recent first (undated last), then id ascending.
pub fn compare(a: &VideoRecord, b: &VideoRecord, key: RankKey) -> Ordering {
    Reverse(primary(a, key))
        .cmp(&Reverse(primary(b, key)))
        .then_with(|| b.view_count.cmp(&a.view_count))
        .then_with(|| b.like_count.cmp(&a.like_count))
        .then_with(|| b.published_at.cmp(&a.published_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts records by `key`. Identical input always yields identical output.
pub fn rank(mut records: Vec<VideoRecord>, key: RankKey) -> Vec<VideoRecord> {
    records.sort_by(|a, b| compare(a, b, key));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, views: u64, likes: u64, day: Option<u32>) -> VideoRecord {
        VideoRecord {
            id: id.into(),
            title: id.into(),
            channel: "chan".into(),
            published_at: day.and_then(|d| NaiveDate::from_ymd_opt(2024, 3, d)),
            thumbnail_url: String::new(),
            view_count: views,
            like_count: likes,
            comment_count: 0,
            favorite_count: 0,
            like_rate: 0.0,
        }
    }

    fn ids(records: &[VideoRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_views_descending() {
        let ranked = rank(
            vec![
                record("b", 50, 0, Some(1)),
                record("c", 0, 0, Some(1)),
                record("a", 100, 5, Some(1)),
            ],
            RankKey::Views,
        );
        assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tie_breakers() {
        let ranked = rank(
            vec![
                record("z", 100, 1, Some(5)),
                record("y", 100, 2, Some(1)),
                record("x", 100, 1, Some(9)),
                record("w", 100, 1, None),
                record("v", 100, 1, Some(9)),
            ],
            RankKey::Views,
        );
        // likes desc, then newest first, then undated, then id asc
        assert_eq!(ids(&ranked), vec!["y", "v", "x", "z", "w"]);
    }

    #[test]
    fn test_likes_key() {
        let ranked = rank(
            vec![record("a", 1000, 1, None), record("b", 10, 50, None), record("c", 500, 50, None)],
            RankKey::Likes,
        );
        assert_eq!(ids(&ranked), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_composite_key() {
        // a: 100 + 10*0 = 100, b: 20 + 10*9 = 110, c: 60 + 10*4 = 100
        let ranked = rank(
            vec![record("a", 100, 0, None), record("b", 20, 9, None), record("c", 60, 4, None)],
            RankKey::Composite,
        );
        assert_eq!(ids(&ranked), vec!["b", "a", "c"]);
        assert_eq!(composite_score(&record("m", u64::MAX, u64::MAX, None)), u64::MAX);
    }

    #[test]
    fn test_rank_is_reproducible() {
        let input = vec![
            record("d", 10, 1, Some(2)),
            record("a", 10, 1, Some(2)),
            record("c", 10, 1, Some(2)),
            record("b", 10, 1, Some(2)),
        ];
        let mut reversed = input.clone();
        reversed.reverse();

        let first = serde_json::to_string(&rank(input.clone(), RankKey::Views)).unwrap();
        let second = serde_json::to_string(&rank(input, RankKey::Views)).unwrap();
        let from_reversed = serde_json::to_string(&rank(reversed, RankKey::Views)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, from_reversed);
    }
}
