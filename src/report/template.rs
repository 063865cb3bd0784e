use std::collections::BTreeMap;

use super::metrics::{FormatBreakdown, HallOfFameEntry, MetricsSummary, PlatformBreakdown, RedFlag};

/// Placeholder keys the audit template uses for each platform block.
const PLATFORM_KEYS: &[(&str, &str)] = &[
    ("instagram", "ig"),
    ("facebook", "fb"),
    ("google_business_profile", "gbp"),
];

const FORMAT_KEYS: &[&str] = &["Static", "Carousel", "Reel"];

/// Builds the complete replacement map for the audit report template from
/// a computed metrics document.
pub fn build_replacements(
    metrics: &MetricsSummary,
    client_name: &str,
    report_date: &str,
) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut set = |key: &str, value: String| {
        map.insert(key.to_string(), value);
    };

    set("client_name", client_name.to_string());
    set("report_date", report_date.to_string());
    set("growth_status", metrics.macro_trend.growth_status.clone());
    set("yoy_comparison", metrics.macro_trend.yoy_comparison.clone());
    set(
        "trajectory_analysis",
        metrics.macro_trend.trajectory_analysis.clone(),
    );
    set("start_date", metrics.meta.start_date.clone());
    set("end_date", metrics.meta.end_date.clone());
    set("data_months", metrics.meta.total_months.to_string());
    set("peak_months_list", metrics.seasonality.peak_months.clone());
    set(
        "valley_months_list",
        metrics.seasonality.valley_months.clone(),
    );
    set(
        "seasonality_implications",
        metrics.seasonality.implications.clone(),
    );
    set(
        "executive_summary_paragraph",
        "Analysis Complete. See Agency Brain for strategic context.".to_string(),
    );
    set("strategic_diagnosis", metrics.strategic_pivot.diagnosis.clone());
    set(
        "pivot_core_strategy",
        metrics.strategic_pivot.core_strategy.clone(),
    );

    for (platform, prefix) in PLATFORM_KEYS {
        let found = metrics
            .mechanics
            .platforms
            .iter()
            .find(|p| p.platform == *platform);
        let fallback = PlatformBreakdown {
            platform: platform.to_string(),
            volume: 0,
            avg_engagement: 0.0,
            recommendation: "No Data".to_string(),
        };
        let entry = found.unwrap_or(&fallback);
        set(&format!("{prefix}_volume"), entry.volume.to_string());
        set(
            &format!("{prefix}_engagement"),
            format!("{}%", entry.avg_engagement),
        );
        set(
            &format!("{prefix}_recommendation"),
            entry.recommendation.clone(),
        );
    }

    for format in FORMAT_KEYS {
        let prefix = format.to_lowercase();
        let found = metrics.mechanics.formats.iter().find(|f| f.format == *format);
        let fallback = FormatBreakdown {
            format: format.to_string(),
            avg_engagement: 0.0,
            percent_of_feed: 0.0,
            verdict: "No Data".to_string(),
        };
        let entry = found.unwrap_or(&fallback);
        set(&format!("{prefix}_percent"), entry.percent_of_feed.to_string());
        set(
            &format!("{prefix}_engagement"),
            format!("{}%", entry.avg_engagement),
        );
        set(&format!("{prefix}_verdict"), entry.verdict.clone());
    }

    // The template has two hall-of-fame slots; pad when data is thin.
    let placeholder_entry = HallOfFameEntry {
        date: "N/A".to_string(),
        metrics: "N/A".to_string(),
        format: "N/A".to_string(),
        why_legendary: "N/A".to_string(),
        reboot_action: "N/A".to_string(),
    };
    for slot in 0..2 {
        let entry = metrics.hall_of_fame.get(slot).unwrap_or(&placeholder_entry);
        let n = slot + 1;
        set(
            &format!("post_{n}_title"),
            format!("{} - {}", entry.format, entry.date),
        );
        set(&format!("post_{n}_metric"), entry.metrics.clone());
        set(&format!("post_{n}_why"), entry.why_legendary.clone());
        set(&format!("post_{n}_action"), entry.reboot_action.clone());
    }

    let placeholder_flag = RedFlag {
        name: "Monitoring".to_string(),
        fix: "Continue".to_string(),
    };
    for slot in 0..2 {
        let flag = metrics.red_flags.get(slot).unwrap_or(&placeholder_flag);
        let n = slot + 1;
        set(&format!("red_flag_{n}"), flag.name.clone());
        set(&format!("red_flag_{n}_fix"), flag.fix.clone());
    }

    map
}

/// Replaces every `{{key}}` token present in the map. Unknown tokens are
/// left in place so report validation can catch them.
pub fn render(template: &str, replacements: &BTreeMap<String, String>) -> String {
    let mut text = template.to_string();
    for (key, value) in replacements {
        text = text.replace(&format!("{{{{{key}}}}}"), value);
    }
    text
}

/// Derives the display client name from a `client-<slug>` folder name.
pub fn client_name_from_folder(folder_name: &str) -> String {
    let slug = folder_name.strip_prefix("client-").unwrap_or(folder_name);
    slug.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
