use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::REQUIRED_REPORT_SECTIONS;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").unwrap());
static EMPTY_SECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"## ([^\n]+)\n+---").unwrap());
static NO_DATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bN/A\b|\bNo Data\b|\bInsufficient data\b").unwrap());

/// How many N/A-style markers a finished report may carry before it is
/// suspected of missing data.
const NA_TOLERANCE: usize = 3;

/// Checks a completed audit report for unfilled placeholders and common
/// completeness problems. An empty list means the report passed.
pub fn validate_report(content: &str) -> Vec<String> {
    let mut issues = Vec::new();

    let placeholders: BTreeSet<&str> = PLACEHOLDER_RE
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if !placeholders.is_empty() {
        issues.push(format!(
            "Unfilled placeholders ({}): {}",
            placeholders.len(),
            placeholders.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    let empty_sections: Vec<&str> = EMPTY_SECTION_RE
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if !empty_sections.is_empty() {
        issues.push(format!("Empty sections: {}", empty_sections.join(", ")));
    }

    let na_count = NO_DATA_RE.find_iter(content).count();
    if na_count > NA_TOLERANCE {
        issues.push(format!(
            "High N/A count ({na_count}) - may indicate missing data"
        ));
    }

    let missing: Vec<&str> = REQUIRED_REPORT_SECTIONS
        .iter()
        .filter(|s| !content.contains(*s))
        .copied()
        .collect();
    if !missing.is_empty() {
        issues.push(format!("Missing sections: {}", missing.join(", ")));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = "\
# Audit\n\n## Executive Summary\nAll good.\n\n## Hall of Fame\nPost one.\n\n## Red Flags\nNone.\n";

    #[test]
    fn complete_report_passes() {
        assert!(validate_report(COMPLETE).is_empty());
    }

    #[test]
    fn unfilled_placeholders_are_reported_once_each() {
        let content = format!("{COMPLETE}\n{{{{client_name}}}} {{{{client_name}}}}");
        let issues = validate_report(&content);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("Unfilled placeholders (1)"));
        assert!(issues[0].contains("client_name"));
    }

    #[test]
    fn empty_sections_are_detected() {
        let content = format!("{COMPLETE}\n## Seasonality\n\n---\n");
        let issues = validate_report(&content);
        assert!(issues.iter().any(|i| i.contains("Empty sections")));
        assert!(issues.iter().any(|i| i.contains("Seasonality")));
    }

    #[test]
    fn excess_na_markers_are_flagged() {
        let content = format!("{COMPLETE}\nN/A N/A No Data Insufficient data");
        let issues = validate_report(&content);
        assert!(issues.iter().any(|i| i.contains("High N/A count (4)")));
    }

    #[test]
    fn missing_sections_are_listed() {
        let issues = validate_report("# Audit\n\n## Executive Summary\nText.\n");
        assert!(issues
            .iter()
            .any(|i| i.contains("Missing sections: Hall of Fame, Red Flags")));
    }
}
