use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Platform, Post, RawRow};

/// Filename substrings checked in order; first match wins.
const FILENAME_KEYWORDS: &[(&[&str], Platform)] = &[
    (&["instagram", "ig"], Platform::Instagram),
    (&["facebook", "fb"], Platform::Facebook),
    (&["google", "gbp", "gmb"], Platform::GoogleBusinessProfile),
    (&["linkedin"], Platform::Linkedin),
    (&["twitter", "x.com"], Platform::Twitter),
];

/// Column-header substrings that identify a platform when the filename
/// gives no hint.
const HEADER_HINTS: &[(&str, Platform)] = &[
    ("ig reach", Platform::Instagram),
    ("store code", Platform::GoogleBusinessProfile),
    ("page name", Platform::Facebook),
];

/// Candidate date headers in priority order. "Publish time" comes first
/// because Meta exports carry both it and a useless "Date" column.
const DATE_FIELDS: &[&str] = &[
    "publish time",
    "publish date",
    "posted date",
    "created",
    "timestamp",
    "posted",
    "date",
];

/// Phrases that mark a row as a vendor aggregate/description line rather
/// than a real post record.
const SUMMARY_INDICATORS: &[&str] = &[
    "number of",
    "total count",
    "interactions with",
    "people that viewed",
];

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

/// Converts one raw export row plus filename context into a canonical
/// [`Post`], or rejects it. Rejection is silent by design: callers count
/// skips, nothing here panics or returns errors.
pub struct Normalizer {
    /// Platform assumed when neither the filename nor the headers give a
    /// hint. `None` means such rows are rejected.
    pub default_platform: Option<Platform>,
}

impl Normalizer {
    pub fn new(default_platform: Option<Platform>) -> Self {
        Self { default_platform }
    }

    pub fn normalize(&self, row: &RawRow, filename: &str) -> Option<Post> {
        let platform = self.detect_platform(filename, row)?;

        let date = extract_date(row)?;

        let mut post = Post::new(date, platform, filename.to_string());
        let mut mapped = 0usize;

        if let Some(v) = first_value(row, &["type", "post type", "media_type", "format", "media type"]) {
            post.post_type = Some(v);
            mapped += 1;
        }
        if let Some(v) = first_value(
            row,
            &["caption", "description", "text", "post text", "content", "message"],
        ) {
            post.caption = Some(v);
            mapped += 1;
        }
        if let Some(v) = first_value(row, &["permalink", "post url", "url", "link"]) {
            post.permalink = Some(v);
            mapped += 1;
        }

        for (target, synonyms) in [
            (&mut post.likes, &["likes", "like count", "reactions", "reaction count"][..]),
            (&mut post.comments, &["comments", "comment count", "comments count"][..]),
            (&mut post.shares, &["shares", "share count", "shares count", "reshares"][..]),
            (&mut post.saves, &["saves", "save count", "saved", "bookmarks"][..]),
            (&mut post.reach, &["reach", "accounts reached", "unique viewers"][..]),
            (&mut post.impressions, &["impressions", "views", "total views"][..]),
            (&mut post.link_clicks, &["link clicks", "clicks", "website clicks"][..]),
        ] {
            if let Some(v) = first_value(row, synonyms) {
                *target = parse_count(&v);
                mapped += 1;
            }
        }

        if let Some(v) = first_value(row, &["engagement rate", "engagement", "engagement %"]) {
            mapped += 1;
            post.engagement_rate = Some(parse_percentage(&v));
        } else if post.reach > 0 {
            let rate = post.total_interactions() as f64 / post.reach as f64 * 100.0;
            post.engagement_rate = Some(round2(rate));
        }
        // reach == 0: leave the rate unset, never synthesize one.

        // A record carrying nothing beyond date/platform/source is not a post.
        if mapped == 0 {
            return None;
        }

        Some(post)
    }

    /// Platform resolution: filename keywords, then header hints, then the
    /// caller-supplied default.
    fn detect_platform(&self, filename: &str, row: &RawRow) -> Option<Platform> {
        let fname = filename.to_lowercase();
        for (keywords, platform) in FILENAME_KEYWORDS {
            if keywords.iter().any(|k| fname.contains(k)) {
                return Some(*platform);
            }
        }

        for (header, _) in row {
            let header = normalize_header(header);
            for (hint, platform) in HEADER_HINTS {
                if header.contains(hint) {
                    return Some(*platform);
                }
            }
        }

        self.default_platform
    }
}

/// Value of the first synonym present in the row with a non-empty cell.
/// Synonym order is the precedence order; later synonyms for the same field
/// are ignored once one matches.
fn first_value(row: &RawRow, synonyms: &[&str]) -> Option<String> {
    for synonym in synonyms {
        for (header, value) in row {
            if normalize_header(header) == *synonym && !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// True for vendor aggregate/description rows that some export formats
/// interleave with data rows. GBP location exports are the main offender:
/// they carry a "Store code"/"Business name" summary block and secondary
/// header rows describing each metric.
pub fn is_summary_row(row: &RawRow) -> bool {
    let headers: Vec<String> = row.iter().map(|(h, _)| normalize_header(h)).collect();
    if headers.iter().any(|h| h == "store code") && headers.iter().any(|h| h == "business name") {
        return true;
    }

    let joined = row
        .iter()
        .map(|(_, v)| v.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    SUMMARY_INDICATORS.iter().any(|ind| joined.contains(ind))
}

/// Scans the candidate date headers in priority order and returns the first
/// parseable date as YYYY-MM-DD.
fn extract_date(row: &RawRow) -> Option<String> {
    for field in DATE_FIELDS {
        for (header, value) in row {
            if normalize_header(header) != *field || value.trim().is_empty() {
                continue;
            }
            // Meta exports sometimes put the aggregate "Lifetime" label in a
            // date column; skip to the next candidate header.
            if value.to_lowercase().contains("lifetime") {
                continue;
            }
            if let Some(date) = parse_date(value) {
                return Some(date);
            }
        }
    }
    None
}

/// Parses a date string in any of the known export formats to YYYY-MM-DD.
pub fn parse_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    const DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M", "%Y-%m-%d %H:%M:%S"];
    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%Y/%m/%d",
        "%B %d, %Y",
        "%b %d, %Y",
        "%m-%d-%Y",
        "%d-%m-%Y",
    ];

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date().format("%Y-%m-%d").to_string());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }

    // Last resort: any ISO date embedded in the value.
    ISO_DATE_RE.find(raw).map(|m| m.as_str().to_string())
}

/// Tolerant count parser: strips thousands separators, understands k/m
/// suffixes, and yields 0 for anything unparseable. Total by design.
pub fn parse_count(raw: &str) -> u64 {
    let clean = raw.trim().to_lowercase().replace([',', ' '], "");
    if clean.is_empty() {
        return 0;
    }

    let (digits, multiplier) = if let Some(prefix) = clean.strip_suffix('k') {
        (prefix, 1_000.0)
    } else if let Some(prefix) = clean.strip_suffix('m') {
        (prefix, 1_000_000.0)
    } else {
        (clean.as_str(), 1.0)
    };

    match digits.parse::<f64>() {
        Ok(n) if n > 0.0 => (n * multiplier) as u64,
        _ => 0,
    }
}

/// Tolerant percentage parser: strips a trailing `%`, yields 0.0 on failure.
pub fn parse_percentage(raw: &str) -> f64 {
    let clean = raw.trim().trim_end_matches('%').trim();
    clean.parse::<f64>().unwrap_or(0.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Case- and whitespace-insensitive header key, with any UTF-8 BOM removed.
fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_count_handles_separators_and_suffixes() {
        assert_eq!(parse_count("1,234"), 1234);
        assert_eq!(parse_count("2k"), 2000);
        assert_eq!(parse_count("1.5m"), 1_500_000);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("garbage"), 0);
        assert_eq!(parse_count("-40"), 0);
    }

    #[test]
    fn parse_percentage_strips_sign() {
        assert_eq!(parse_percentage("4.25%"), 4.25);
        assert_eq!(parse_percentage(""), 0.0);
        assert_eq!(parse_percentage("n/a"), 0.0);
    }

    #[test]
    fn parse_date_accepts_known_formats() {
        assert_eq!(parse_date("2024-03-01"), Some("2024-03-01".to_string()));
        assert_eq!(parse_date("3/1/2024 14:30"), Some("2024-03-01".to_string()));
        assert_eq!(parse_date("March 1, 2024"), Some("2024-03-01".to_string()));
        assert_eq!(parse_date("Mar 1, 2024"), Some("2024-03-01".to_string()));
        assert_eq!(
            parse_date("exported 2024-03-01 10:00"),
            Some("2024-03-01".to_string())
        );
        assert_eq!(parse_date("last week"), None);
    }

    #[test]
    fn lifetime_value_skips_to_next_date_header() {
        let normalizer = Normalizer::new(None);
        let r = row(&[
            ("Publish time", "Lifetime"),
            ("Date", "2024-05-02"),
            ("Likes", "12"),
        ]);
        let post = normalizer.normalize(&r, "ig_export.csv").unwrap();
        assert_eq!(post.date, "2024-05-02");
    }

    #[test]
    fn lifetime_only_date_rejects_row() {
        let normalizer = Normalizer::new(None);
        let r = row(&[("Publish time", "LIFETIME"), ("Likes", "12")]);
        assert!(normalizer.normalize(&r, "ig_export.csv").is_none());
    }

    #[test]
    fn derives_engagement_rate_from_reach() {
        let normalizer = Normalizer::new(None);
        let r = row(&[
            ("Date", "2024-03-01"),
            ("Likes", "10"),
            ("Comments", "5"),
            ("Shares", "2"),
            ("Saves", "3"),
            ("Reach", "200"),
        ]);
        let post = normalizer.normalize(&r, "instagram_2024.csv").unwrap();
        assert_eq!(post.engagement_rate, Some(10.0));
    }

    #[test]
    fn zero_reach_leaves_rate_unset() {
        let normalizer = Normalizer::new(None);
        let r = row(&[("Date", "2024-03-01"), ("Likes", "10"), ("Reach", "0")]);
        let post = normalizer.normalize(&r, "instagram_2024.csv").unwrap();
        assert_eq!(post.engagement_rate, None);
    }

    #[test]
    fn supplied_rate_wins_over_derivation() {
        let normalizer = Normalizer::new(None);
        let r = row(&[
            ("Date", "2024-03-01"),
            ("Likes", "10"),
            ("Reach", "200"),
            ("Engagement Rate", "7.5%"),
        ]);
        let post = normalizer.normalize(&r, "ig.csv").unwrap();
        assert_eq!(post.engagement_rate, Some(7.5));
    }

    #[test]
    fn first_synonym_wins() {
        let normalizer = Normalizer::new(None);
        let r = row(&[
            ("Date", "2024-03-01"),
            ("Views", "500"),
            ("Impressions", "900"),
        ]);
        let post = normalizer.normalize(&r, "fb_page.csv").unwrap();
        // "impressions" precedes "views" in the synonym list.
        assert_eq!(post.impressions, 900);
    }

    #[test]
    fn platform_from_headers_when_filename_is_mute() {
        let normalizer = Normalizer::new(None);
        let r = row(&[("Date", "2024-03-01"), ("IG Reach", "150")]);
        let post = normalizer.normalize(&r, "march_export.csv").unwrap();
        assert_eq!(post.platform, Platform::Instagram);
    }

    #[test]
    fn unresolvable_platform_rejects_unless_default_given() {
        let r = row(&[("Date", "2024-03-01"), ("Likes", "9")]);
        assert!(Normalizer::new(None).normalize(&r, "export.csv").is_none());

        let post = Normalizer::new(Some(Platform::Unknown))
            .normalize(&r, "export.csv")
            .unwrap();
        assert_eq!(post.platform, Platform::Unknown);
    }

    #[test]
    fn bare_date_row_is_not_a_post() {
        let normalizer = Normalizer::new(Some(Platform::Instagram));
        let r = row(&[("Date", "2024-03-01"), ("Irrelevant", "x")]);
        assert!(normalizer.normalize(&r, "ig.csv").is_none());
    }

    #[test]
    fn summary_rows_are_flagged() {
        let r = row(&[
            ("Metric", "Impressions"),
            ("Description", "Number of times your post was shown"),
        ]);
        assert!(is_summary_row(&r));

        let gbp = row(&[
            ("Store code", "123"),
            ("Business name", "Acme"),
            ("Date", "2024-03-01"),
        ]);
        assert!(is_summary_row(&gbp));

        let data = row(&[("Date", "2024-03-01"), ("Likes", "4")]);
        assert!(!is_summary_row(&data));
    }
}
