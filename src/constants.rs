/// Shared layout and rule tables used across the scaffolding, validation
/// and reporting commands.

/// Standard client folder layout, relative to the client root.
pub const CLIENT_FOLDERS: &[&str] = &[
    "01_Admin_Legal",
    "02_Onboarding_Access",
    "03_Brand_Assets",
    "04_Marketing_Deliverables",
    "05_Reports_Analytics",
    "06_Paid_Ads",
    "07_Social_Media",
    "07_Social_Media/01_Content_Calendars",
    "07_Social_Media/02_Performance_Data",
    "07_Social_Media/03_Post_Archive",
    "07_Social_Media/04_Audit_Reports",
    "08_SEO",
    "09_Website",
    "10_Email_Marketing",
    "90_Archive",
];

pub const SOCIAL_MEDIA_DIR: &str = "07_Social_Media";
pub const CONTENT_CALENDARS_DIR: &str = "07_Social_Media/01_Content_Calendars";
pub const PERFORMANCE_DATA_DIR: &str = "07_Social_Media/02_Performance_Data";
pub const POST_ARCHIVE_DIR: &str = "07_Social_Media/03_Post_Archive";
pub const AUDIT_REPORTS_DIR: &str = "07_Social_Media/04_Audit_Reports";
pub const SOCIAL_STRATEGY_FILE: &str = "07_Social_Media/00_SOCIAL_STRATEGY.md";

/// File name of the metrics document exchanged between the metrics and
/// fill-report commands.
pub const METRICS_SUMMARY_FILE: &str = "metrics_summary.json";

/// Sections a completed audit report must contain.
pub const REQUIRED_REPORT_SECTIONS: &[&str] = &["Executive Summary", "Hall of Fame", "Red Flags"];

/// Healthy minimum engagement rate per platform, used when no benchmark
/// file is supplied.
pub const DEFAULT_BENCHMARKS: &[(&str, f64)] = &[
    ("instagram", 3.0),
    ("facebook", 1.0),
    ("google_business_profile", 2.0),
];

/// Fallback benchmark for platforms without an entry.
pub const FALLBACK_HEALTHY_MIN: f64 = 2.0;
