use std::collections::HashMap;

use chrono::NaiveDate;

use crate::data_models::{StatsBlock, VideoRecord, VideoRef};

/// Parses a raw counter. Absent, negative, or non-numeric text becomes 0.
pub fn coerce_count(raw: Option<&str>) -> u64 {
    let Some(raw) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(n) = raw.parse::<u64>() {
        return n;
    }
    // "1200.0" style values from loosely typed payloads.
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

/// Calendar date of a `YYYY-MM-DD...` timestamp; the time of day is dropped.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn like_rate(likes: u64, views: u64) -> f64 {
    if views == 0 {
        0.0
    } else {
        likes as f64 / views as f64
    }
}

/// Joins each reference with its statistics, keeping the order of `refs`.
/// A reference without statistics gets all counters set to 0.
pub fn merge(refs: Vec<VideoRef>, stats: &HashMap<String, StatsBlock>) -> Vec<VideoRecord> {
    let missing = StatsBlock::default();
    refs.into_iter()
        .map(|video| {
            let block = stats.get(&video.id).unwrap_or(&missing);
            let view_count = coerce_count(block.view_count.as_deref());
            let like_count = coerce_count(block.like_count.as_deref());
            VideoRecord {
                published_at: normalize_date(&video.published_at),
                id: video.id,
                title: video.title,
                channel: video.channel,
                thumbnail_url: video.thumbnail_url,
                view_count,
                like_count,
                comment_count: coerce_count(block.comment_count.as_deref()),
                favorite_count: coerce_count(block.favorite_count.as_deref()),
                like_rate: like_rate(like_count, view_count),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_ref(id: &str, published_at: &str) -> VideoRef {
        VideoRef {
            id: id.into(),
            title: format!("title {id}"),
            channel: "chan".into(),
            published_at: published_at.into(),
            thumbnail_url: format!("https://img/{id}.jpg"),
        }
    }

    fn stats(views: Option<&str>, likes: Option<&str>) -> StatsBlock {
        StatsBlock {
            view_count: views.map(String::from),
            like_count: likes.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(None), 0);
        assert_eq!(coerce_count(Some("1234")), 1234);
        assert_eq!(coerce_count(Some(" 42 ")), 42);
        assert_eq!(coerce_count(Some("12.9")), 12);
        assert_eq!(coerce_count(Some("")), 0);
        assert_eq!(coerce_count(Some("n/a")), 0);
        assert_eq!(coerce_count(Some("-5")), 0);
        assert_eq!(coerce_count(Some("NaN")), 0);
        assert_eq!(coerce_count(Some("inf")), 0);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(
            normalize_date("2023-11-05T18:30:00Z"),
            NaiveDate::from_ymd_opt(2023, 11, 5)
        );
        assert_eq!(
            normalize_date("2023-11-05"),
            NaiveDate::from_ymd_opt(2023, 11, 5)
        );
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("yesterday!"), None);
        assert_eq!(normalize_date("2023-13-40T00:00:00Z"), None);
    }

    #[test]
    fn test_like_rate_never_divides_by_zero() {
        assert_eq!(like_rate(10, 0), 0.0);
        assert_eq!(like_rate(0, 0), 0.0);
        assert_eq!(like_rate(5, 100), 0.05);
    }

    #[test]
    fn test_merge_zero_fills_and_keeps_order() {
        let refs = vec![
            video_ref("C", "2024-01-03T00:00:00Z"),
            video_ref("A", "2024-01-01T00:00:00Z"),
            video_ref("B", "2024-01-02T00:00:00Z"),
        ];
        let mut map = HashMap::new();
        map.insert("A".to_string(), stats(Some("100"), Some("5")));
        map.insert("B".to_string(), stats(Some("50"), None));

        let records = merge(refs, &map);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);

        let counts: Vec<(u64, u64, u64)> = records
            .iter()
            .map(|r| (r.view_count, r.like_count, r.comment_count))
            .collect();
        assert_eq!(counts, vec![(0, 0, 0), (100, 5, 0), (50, 0, 0)]);
        assert_eq!(records[1].like_rate, 0.05);
        assert_eq!(records[0].like_rate, 0.0);
        assert_eq!(records[0].published_at, NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn test_merge_dirty_counters() {
        let refs = vec![video_ref("X", "garbage")];
        let mut map = HashMap::new();
        map.insert(
            "X".to_string(),
            StatsBlock {
                view_count: Some("lots".into()),
                like_count: Some("7".into()),
                comment_count: Some("-3".into()),
                favorite_count: Some("0".into()),
            },
        );
        let records = merge(refs, &map);
        assert_eq!(records[0].view_count, 0);
        assert_eq!(records[0].like_count, 7);
        assert_eq!(records[0].comment_count, 0);
        assert_eq!(records[0].like_rate, 0.0);
        assert_eq!(records[0].published_at, None);
    }
}
