use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One raw tabular row: (header, cell) pairs in file order.
/// Header casing and spacing vary by export source.
pub type RawRow = Vec<(String, String)>;

/// Social platforms we recognize in analytics exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Facebook,
    GoogleBusinessProfile,
    Linkedin,
    Twitter,
    Unknown,
}

impl Platform {
    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::GoogleBusinessProfile => "google_business_profile",
            Platform::Linkedin => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical normalized record of one social-media publication.
///
/// Field names are the wire contract: downstream metrics aggregation and
/// report templating look posts up by exactly these names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Calendar date as YYYY-MM-DD. A row without a resolvable date never
    /// becomes a Post, so this is always present and lexicographically
    /// sortable in chronological order.
    pub date: String,
    pub platform: Platform,
    pub source_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub saves: u64,
    #[serde(default)]
    pub reach: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub link_clicks: u64,
    /// Percentage, rounded to 2 decimals. Left unset when the source did
    /// not supply one and reach is zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_rate: Option<f64>,
    /// Content hash over (date, platform, caption-or-type prefix). Set by
    /// the deduplicator; only used for duplicate grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
}

impl Post {
    pub fn new(date: String, platform: Platform, source_file: String) -> Self {
        Self {
            date,
            platform,
            source_file,
            post_type: None,
            caption: None,
            permalink: None,
            likes: 0,
            comments: 0,
            shares: 0,
            saves: 0,
            reach: 0,
            impressions: 0,
            link_clicks: 0,
            engagement_rate: None,
            post_id: None,
        }
    }

    /// Sum of the interaction counters used in the engagement-rate numerator.
    pub fn total_interactions(&self) -> u64 {
        self.likes + self.comments + self.shares + self.saves
    }
}

/// Earliest and latest post date in a parsed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

/// Counters carried into the output document for auditability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingStats {
    pub files_processed: u64,
    pub files_failed: u64,
    pub files_skipped: u64,
    pub posts_parsed: u64,
    pub posts_skipped: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// ISO-8601 timestamp of document generation.
    pub generated_at: String,
    pub total_posts: usize,
    pub duplicates_removed: u64,
    pub date_range: DateRange,
    pub platforms: BTreeMap<String, u64>,
    pub parsing_stats: ParsingStats,
}

/// The unified JSON document produced by a parse run and consumed by the
/// engagement and metrics stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub metadata: Metadata,
    pub posts: Vec<Post>,
}
