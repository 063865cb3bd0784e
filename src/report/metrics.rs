use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BENCHMARKS, FALLBACK_HEALTHY_MIN};
use crate::domain::Post;
use crate::error::{AuditError, Result};
use crate::pipeline::normalize::round2;

/// Computed metrics document consumed by the report template filler.
/// Field names mirror the template's placeholder vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub meta: MetaSection,
    #[serde(rename = "macro")]
    pub macro_trend: MacroSection,
    pub seasonality: SeasonalitySection,
    pub mechanics: MechanicsSection,
    pub hall_of_fame: Vec<HallOfFameEntry>,
    pub red_flags: Vec<RedFlag>,
    pub strategic_pivot: StrategicPivot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaSection {
    pub start_date: String,
    pub end_date: String,
    pub total_months: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroSection {
    pub growth_status: String,
    pub yoy_delta: String,
    pub yoy_comparison: String,
    pub trajectory_analysis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalitySection {
    pub peak_months: String,
    pub valley_months: String,
    pub implications: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanicsSection {
    pub platforms: Vec<PlatformBreakdown>,
    pub formats: Vec<FormatBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformBreakdown {
    pub platform: String,
    pub volume: usize,
    pub avg_engagement: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatBreakdown {
    pub format: String,
    pub avg_engagement: f64,
    pub percent_of_feed: f64,
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallOfFameEntry {
    pub date: String,
    pub metrics: String,
    pub format: String,
    pub why_legendary: String,
    pub reboot_action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedFlag {
    pub name: String,
    pub fix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicPivot {
    pub diagnosis: String,
    pub core_strategy: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Benchmark {
    pub healthy_min: f64,
}

/// Groups posts by platform, format and month and reduces them to the
/// metrics document. All aggregation is deterministic for a fixed input.
pub struct Analyzer {
    benchmarks: BTreeMap<String, Benchmark>,
}

impl Analyzer {
    pub fn new() -> Self {
        let benchmarks = DEFAULT_BENCHMARKS
            .iter()
            .map(|(name, min)| (name.to_string(), Benchmark { healthy_min: *min }))
            .collect();
        Self { benchmarks }
    }

    /// Replaces the default benchmarks with a `{platform: {healthy_min}}`
    /// JSON file.
    pub fn with_benchmark_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let benchmarks = serde_json::from_str(&content)?;
        Ok(Self { benchmarks })
    }

    pub fn analyze(&self, posts: &[Post]) -> Result<MetricsSummary> {
        let mut dated: Vec<(NaiveDate, &Post)> = posts
            .iter()
            .filter_map(|p| {
                NaiveDate::parse_from_str(&p.date, "%Y-%m-%d")
                    .ok()
                    .map(|d| (d, p))
            })
            .collect();
        if dated.is_empty() {
            return Err(AuditError::InvalidInput(
                "no dated posts to analyze".to_string(),
            ));
        }
        dated.sort_by_key(|(d, _)| *d);

        let start = dated[0].0;
        let end = dated[dated.len() - 1].0;
        let total_days = (end - start).num_days();

        let macro_trend = self.macro_trend(&dated, start, end, total_days);
        let seasonality = self.seasonality(&dated);
        let platforms = self.platform_breakdown(&dated);
        let formats = self.format_breakdown(&dated);
        let hall_of_fame = self.hall_of_fame(&dated);
        let red_flags = red_flags(&formats);

        Ok(MetricsSummary {
            meta: MetaSection {
                start_date: start.format("%Y-%m-%d").to_string(),
                end_date: end.format("%Y-%m-%d").to_string(),
                total_months: (total_days as f64 / 30.0 * 10.0).round() / 10.0,
            },
            macro_trend,
            seasonality,
            mechanics: MechanicsSection { platforms, formats },
            hall_of_fame,
            red_flags,
            strategic_pivot: StrategicPivot {
                diagnosis: "Review format mix".to_string(),
                core_strategy: "Double down on top formats".to_string(),
            },
        })
    }

    /// Year-over-year delta when two full years of data exist, otherwise a
    /// first-half vs. second-half split.
    fn macro_trend(
        &self,
        dated: &[(NaiveDate, &Post)],
        start: NaiveDate,
        end: NaiveDate,
        total_days: i64,
    ) -> MacroSection {
        let (yoy, yoy_comparison) = if total_days >= 730 {
            let cutoff = end - chrono::Duration::days(365);
            let recent = mean_rate(dated.iter().filter(|(d, _)| *d > cutoff).map(|(_, p)| *p));
            let previous = mean_rate(dated.iter().filter(|(d, _)| *d <= cutoff).map(|(_, p)| *p));
            let yoy = if previous > 0.0 {
                (recent - previous) / previous * 100.0
            } else {
                0.0
            };
            (yoy, format!("{yoy:+.1}% vs previous year"))
        } else {
            let mid = start + chrono::Duration::days(total_days / 2);
            let first = mean_rate(dated.iter().filter(|(d, _)| *d < mid).map(|(_, p)| *p));
            let second = mean_rate(dated.iter().filter(|(d, _)| *d >= mid).map(|(_, p)| *p));
            let yoy = if first > 0.0 {
                (second - first) / first * 100.0
            } else {
                0.0
            };
            (yoy, format!("{yoy:+.1}% (first half vs second half)"))
        };

        MacroSection {
            growth_status: if yoy > 0.0 {
                "Trending Up".to_string()
            } else {
                "Trending Down".to_string()
            },
            yoy_delta: format!("{yoy:.1}%"),
            yoy_comparison,
            trajectory_analysis: format!("Growth is {yoy:.1}%"),
        }
    }

    /// Mean engagement per calendar month; needs six distinct months before
    /// naming peaks and valleys.
    fn seasonality(&self, dated: &[(NaiveDate, &Post)]) -> SeasonalitySection {
        let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for (date, post) in dated {
            if let Some(rate) = post.engagement_rate {
                by_month.entry(date.month()).or_default().push(rate);
            }
        }

        let (peak, valley) = if by_month.len() >= 6 {
            let mut means: Vec<(u32, f64)> = by_month
                .iter()
                .map(|(m, rates)| (*m, rates.iter().sum::<f64>() / rates.len() as f64))
                .collect();
            // Descending by mean; month number breaks ties deterministically.
            means.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

            let names = |slice: &[(u32, f64)]| {
                slice
                    .iter()
                    .map(|(m, _)| month_name(*m))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let peak = names(&means[..3.min(means.len())]);
            let valley = names(&means[means.len().saturating_sub(3)..]);
            (peak, valley)
        } else {
            ("Insufficient data".to_string(), "Insufficient data".to_string())
        };

        SeasonalitySection {
            peak_months: peak,
            valley_months: valley,
            implications: "Align calendar with peaks".to_string(),
        }
    }

    fn platform_breakdown(&self, dated: &[(NaiveDate, &Post)]) -> Vec<PlatformBreakdown> {
        let mut grouped: BTreeMap<String, Vec<&Post>> = BTreeMap::new();
        for (_, post) in dated {
            grouped
                .entry(post.platform.as_str().to_string())
                .or_default()
                .push(*post);
        }

        grouped
            .into_iter()
            .map(|(platform, posts)| {
                let avg = round2(mean_rate(posts.iter().copied()));
                let target = self
                    .benchmarks
                    .get(&platform)
                    .map(|b| b.healthy_min)
                    .unwrap_or(FALLBACK_HEALTHY_MIN);
                PlatformBreakdown {
                    platform,
                    volume: posts.len(),
                    avg_engagement: avg,
                    recommendation: if avg >= target {
                        "Scale up".to_string()
                    } else {
                        "Review strategy".to_string()
                    },
                }
            })
            .collect()
    }

    fn format_breakdown(&self, dated: &[(NaiveDate, &Post)]) -> Vec<FormatBreakdown> {
        let total = dated.len();
        let mut out = Vec::new();
        for format in ["Static", "Carousel", "Reel"] {
            let posts: Vec<&Post> = dated
                .iter()
                .filter(|(_, p)| classify_format(p.post_type.as_deref()) == format)
                .map(|(_, p)| *p)
                .collect();
            if posts.is_empty() {
                continue;
            }
            let rates: Vec<f64> = posts.iter().filter_map(|p| p.engagement_rate).collect();
            let avg = if rates.is_empty() {
                0.0
            } else {
                round2(rates.iter().sum::<f64>() / rates.len() as f64)
            };
            out.push(FormatBreakdown {
                format: format.to_string(),
                avg_engagement: avg,
                percent_of_feed: (posts.len() as f64 / total as f64 * 1000.0).round() / 10.0,
                verdict: if avg > 2.0 {
                    "Keep".to_string()
                } else {
                    "Improve".to_string()
                },
            });
        }
        out
    }

    /// Top five posts by raw interaction volume.
    fn hall_of_fame(&self, dated: &[(NaiveDate, &Post)]) -> Vec<HallOfFameEntry> {
        let mut ranked: Vec<&Post> = dated.iter().map(|(_, p)| *p).collect();
        ranked.sort_by(|a, b| {
            (b.likes + b.comments + b.shares)
                .cmp(&(a.likes + a.comments + a.shares))
                .then(a.date.cmp(&b.date))
        });

        ranked
            .iter()
            .take(5)
            .map(|post| {
                let interactions = post.likes + post.comments + post.shares;
                let format = classify_format(post.post_type.as_deref());
                HallOfFameEntry {
                    date: post.date.clone(),
                    metrics: format!("{interactions} interactions"),
                    format: format.to_string(),
                    why_legendary: format!(
                        "High engagement ({}%)",
                        post.engagement_rate.unwrap_or(0.0)
                    ),
                    reboot_action: format!("Recreate this {format}"),
                }
            })
            .collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Format label from the free-text post type.
pub fn classify_format(post_type: Option<&str>) -> &'static str {
    let lower = post_type.unwrap_or("").to_lowercase();
    if lower.contains("carousel") {
        "Carousel"
    } else if lower.contains("reel") {
        "Reel"
    } else {
        "Static"
    }
}

fn mean_rate<'a, I>(posts: I) -> f64
where
    I: Iterator<Item = &'a Post>,
{
    let rates: Vec<f64> = posts.filter_map(|p| p.engagement_rate).collect();
    if rates.is_empty() {
        0.0
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    }
}

/// Carousel posts that outperform statics while staying a small share of
/// the feed get flagged; the list is padded so the template always has two
/// entries to fill.
fn red_flags(formats: &[FormatBreakdown]) -> Vec<RedFlag> {
    let mut flags = Vec::new();
    let find = |name: &str| formats.iter().find(|f| f.format == name);

    if let (Some(carousel), Some(statics)) = (find("Carousel"), find("Static")) {
        if carousel.avg_engagement > statics.avg_engagement && carousel.percent_of_feed < 25.0 {
            flags.push(RedFlag {
                name: "Format Misallocation".to_string(),
                fix: "Increase Carousel output".to_string(),
            });
        }
    }

    while flags.len() < 2 {
        flags.push(RedFlag {
            name: "Monitoring".to_string(),
            fix: "Continue current strategy".to_string(),
        });
    }
    flags
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Platform;

    fn post(date: &str, platform: Platform, post_type: &str, rate: f64, likes: u64) -> Post {
        let mut p = Post::new(date.to_string(), platform, "test.csv".to_string());
        p.post_type = Some(post_type.to_string());
        p.engagement_rate = Some(rate);
        p.likes = likes;
        p
    }

    #[test]
    fn classifies_formats() {
        assert_eq!(classify_format(Some("IG carousel")), "Carousel");
        assert_eq!(classify_format(Some("Reels")), "Reel");
        assert_eq!(classify_format(Some("Photo")), "Static");
        assert_eq!(classify_format(None), "Static");
    }

    #[test]
    fn platform_recommendations_use_benchmarks() {
        let posts = vec![
            post("2024-01-10", Platform::Instagram, "Photo", 4.0, 10),
            post("2024-02-10", Platform::Facebook, "Photo", 0.5, 5),
        ];
        let summary = Analyzer::new().analyze(&posts).unwrap();
        let platforms = &summary.mechanics.platforms;

        let ig = platforms.iter().find(|p| p.platform == "instagram").unwrap();
        assert_eq!(ig.recommendation, "Scale up");
        let fb = platforms.iter().find(|p| p.platform == "facebook").unwrap();
        assert_eq!(fb.recommendation, "Review strategy");
    }

    #[test]
    fn short_span_uses_half_split() {
        let posts = vec![
            post("2024-01-01", Platform::Instagram, "Photo", 2.0, 1),
            post("2024-06-01", Platform::Instagram, "Photo", 4.0, 1),
        ];
        let summary = Analyzer::new().analyze(&posts).unwrap();
        assert!(summary.macro_trend.yoy_comparison.contains("first half"));
        assert_eq!(summary.macro_trend.growth_status, "Trending Up");
    }

    #[test]
    fn seasonality_needs_six_months() {
        let posts = vec![
            post("2024-01-01", Platform::Instagram, "Photo", 2.0, 1),
            post("2024-02-01", Platform::Instagram, "Photo", 3.0, 1),
        ];
        let summary = Analyzer::new().analyze(&posts).unwrap();
        assert_eq!(summary.seasonality.peak_months, "Insufficient data");
    }

    #[test]
    fn format_share_adds_up() {
        let posts = vec![
            post("2024-01-01", Platform::Instagram, "Carousel", 5.0, 1),
            post("2024-01-02", Platform::Instagram, "Photo", 1.0, 1),
            post("2024-01-03", Platform::Instagram, "Photo", 1.0, 1),
            post("2024-01-04", Platform::Instagram, "Photo", 1.0, 1),
        ];
        let summary = Analyzer::new().analyze(&posts).unwrap();
        let carousel = summary
            .mechanics
            .formats
            .iter()
            .find(|f| f.format == "Carousel")
            .unwrap();
        assert_eq!(carousel.percent_of_feed, 25.0);
    }

    #[test]
    fn misallocated_carousel_is_flagged() {
        let mut posts = vec![post("2024-01-01", Platform::Instagram, "Carousel", 6.0, 1)];
        for day in 2..=9 {
            posts.push(post(
                &format!("2024-01-{day:02}"),
                Platform::Instagram,
                "Photo",
                1.0,
                1,
            ));
        }
        let summary = Analyzer::new().analyze(&posts).unwrap();
        assert_eq!(summary.red_flags[0].name, "Format Misallocation");
        assert_eq!(summary.red_flags.len(), 2);
    }

    #[test]
    fn hall_of_fame_ranks_by_interactions() {
        let posts = vec![
            post("2024-01-01", Platform::Instagram, "Photo", 1.0, 10),
            post("2024-01-02", Platform::Instagram, "Photo", 1.0, 500),
        ];
        let summary = Analyzer::new().analyze(&posts).unwrap();
        assert_eq!(summary.hall_of_fame[0].date, "2024-01-02");
        assert_eq!(summary.hall_of_fame[0].metrics, "500 interactions");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(Analyzer::new().analyze(&[]).is_err());
    }
}
