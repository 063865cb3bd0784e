pub mod dedupe;
pub mod normalize;
pub mod reader;
pub mod stats;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::domain::{DateRange, Metadata, ParsedDocument, Platform, Post};
use crate::error::Result;
use normalize::Normalizer;
use stats::BatchStats;

/// Batch driver for one parse run: walks input files, normalizes rows,
/// dedups and wraps the result in an output document. Single-threaded and
/// synchronous throughout; nothing past file granularity is fatal.
pub struct Pipeline {
    normalizer: Normalizer,
    stats: BatchStats,
    verbose: bool,
}

impl Pipeline {
    pub fn new(default_platform: Option<Platform>) -> Self {
        Self {
            normalizer: Normalizer::new(default_platform),
            stats: BatchStats::default(),
            verbose: true,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.verbose = false;
        self
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Dispatches one input file by extension. Spreadsheet and PDF exports
    /// are enumerated and reported rather than silently ignored; the batch
    /// stays auditable either way.
    pub fn parse_file(&mut self, path: &Path) -> Vec<Post> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "tsv" | "txt" => self.parse_csv(path),
            "xlsx" | "xls" => {
                self.stats.record_skipped_file(stats::SKIP_SPREADSHEET_UNSUPPORTED);
                self.stats.warn(format!(
                    "Spreadsheet not parsed (convert to CSV): {}",
                    display_name(path)
                ));
                Vec::new()
            }
            "pdf" => {
                self.stats.record_skipped_file(stats::SKIP_PDF_UNSUPPORTED);
                self.stats.warn(format!(
                    "PDF archive not parsed (visual review recommended): {}",
                    display_name(path)
                ));
                Vec::new()
            }
            _ => {
                self.stats.record_skipped_file(stats::SKIP_UNSUPPORTED_TYPE);
                self.stats
                    .warn(format!("Unsupported file type: {}", display_name(path)));
                Vec::new()
            }
        }
    }

    /// Parses one delimited analytics export. File-level failures are
    /// recorded and yield an empty list; row-level failures drop the row.
    pub fn parse_csv(&mut self, path: &Path) -> Vec<Post> {
        let filename = display_name(path);

        let rows = match reader::read_rows(path) {
            Ok(rows) => rows,
            Err(e) => {
                self.stats.files_failed += 1;
                self.stats.error(format!("Failed to parse {filename}: {e}"));
                return Vec::new();
            }
        };
        self.stats.files_processed += 1;

        let mut posts = Vec::new();
        for (row_num, row) in rows.into_iter().enumerate() {
            // Header row is line 1.
            let line = row_num + 2;
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    self.stats.record_skip(stats::SKIP_PARSE_ERROR);
                    self.stats.error(format!("Row {line} in {filename}: {e}"));
                    continue;
                }
            };

            if normalize::is_summary_row(&row) {
                self.stats.record_skip(stats::SKIP_SUMMARY_ROW);
                continue;
            }

            match self.normalizer.normalize(&row, &filename) {
                Some(post) => {
                    self.check_post(&post);
                    self.stats.record_post(post.platform);
                    posts.push(post);
                }
                None => self.stats.record_skip(stats::SKIP_NORMALIZATION_FAILED),
            }
        }

        if self.verbose {
            if posts.is_empty() {
                println!("⚠️  Parsed 0 posts from {filename} (check date formats)");
            } else {
                println!("✅ Parsed {} posts from {filename}", posts.len());
            }
        }
        posts
    }

    /// Finds analytics files under a directory, recursively by default, and
    /// parses them in path order for reproducible output.
    pub fn search_directory(&mut self, dir: &Path, recursive: bool) -> Result<Vec<Post>> {
        let mut files = Vec::new();
        collect_files(dir, recursive, &mut files)?;
        files.sort();

        let candidates: Vec<PathBuf> = files
            .into_iter()
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref(),
                    Some("csv" | "tsv" | "txt" | "xlsx" | "xls" | "pdf")
                )
            })
            .collect();

        self.stats.files_found += candidates.len() as u64;
        if self.verbose {
            println!(
                "\n📂 Searching {}/ {}...",
                display_name(dir),
                if recursive { "(recursive)" } else { "(non-recursive)" }
            );
            println!("   Found {} candidate files\n", candidates.len());
        }

        let mut posts = Vec::new();
        for (i, file) in candidates.iter().enumerate() {
            info!(file = %file.display(), "processing input file");
            if self.verbose {
                println!("[{}/{}] Processing {}", i + 1, candidates.len(), display_name(file));
            }
            posts.extend(self.parse_file(file));
        }
        Ok(posts)
    }

    /// Dedups, sorts and wraps the collected posts into the unified output
    /// document. Consumes the pipeline; the stats move into the metadata.
    pub fn into_document(mut self, posts: Vec<Post>) -> ParsedDocument {
        let (posts, removed) = dedupe::deduplicate(posts);
        self.stats.duplicates_removed = removed;

        let date_range = DateRange {
            earliest: posts.first().map(|p| p.date.clone()),
            latest: posts.last().map(|p| p.date.clone()),
        };

        ParsedDocument {
            metadata: Metadata {
                generated_at: Utc::now().to_rfc3339(),
                total_posts: posts.len(),
                duplicates_removed: removed,
                date_range,
                platforms: self.stats.posts_by_platform.clone(),
                parsing_stats: self.stats.parsing_stats(),
            },
            posts,
        }
    }

    /// Post-normalization sanity checks carried into the warning list.
    fn check_post(&mut self, post: &Post) {
        if let Some(rate) = post.engagement_rate {
            if rate > 50.0 {
                self.stats.warn(format!(
                    "Suspicious engagement rate ({rate}%) on {} - {}",
                    post.date, post.platform
                ));
            }
        }
        if post.reach == 0 && post.likes > 0 {
            self.stats.warn(format!(
                "Missing reach data on {} - {} (has {} likes)",
                post.date, post.platform, post.likes
            ));
        }
    }
}

/// Writes the document as pretty-printed JSON, creating parent directories
/// as needed.
pub fn save_document(document: &ParsedDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json)?;
    info!(path = %path.display(), posts = document.posts.len(), "saved parsed document");
    Ok(())
}

pub fn load_document(path: &Path) -> Result<ParsedDocument> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn collect_files(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, recursive, out)?;
            }
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .unwrap_or_else(|| path.display().to_string())
}
