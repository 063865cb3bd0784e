use std::collections::BTreeMap;

use crate::domain::{ParsingStats, Platform};

/// Skip reasons recorded per rejected row or file. Stable strings so the
/// printed summary is diffable between runs.
pub const SKIP_SUMMARY_ROW: &str = "summary_row";
pub const SKIP_NORMALIZATION_FAILED: &str = "normalization_failed";
pub const SKIP_PARSE_ERROR: &str = "parse_error";
pub const SKIP_SPREADSHEET_UNSUPPORTED: &str = "spreadsheet_unsupported";
pub const SKIP_PDF_UNSUPPORTED: &str = "pdf_unsupported";
pub const SKIP_UNSUPPORTED_TYPE: &str = "unsupported_type";

/// Mutable batch context for one parse run. Owned by the pipeline, merged
/// into the output document's metadata at the end; no process-wide state.
#[derive(Debug, Default, Clone)]
pub struct BatchStats {
    pub files_found: u64,
    pub files_processed: u64,
    pub files_failed: u64,
    pub files_skipped: u64,
    pub posts_parsed: u64,
    pub posts_skipped: u64,
    pub duplicates_removed: u64,
    pub skip_reasons: BTreeMap<String, u64>,
    pub posts_by_platform: BTreeMap<String, u64>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl BatchStats {
    pub fn record_skip(&mut self, reason: &str) {
        self.posts_skipped += 1;
        *self.skip_reasons.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn record_skipped_file(&mut self, reason: &str) {
        self.files_skipped += 1;
        *self.skip_reasons.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn record_post(&mut self, platform: Platform) {
        self.posts_parsed += 1;
        *self
            .posts_by_platform
            .entry(platform.as_str().to_string())
            .or_insert(0) += 1;
    }

    pub fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    pub fn error(&mut self, message: String) {
        tracing::error!("{message}");
        self.errors.push(message);
    }

    /// The counter subset embedded in the output document.
    pub fn parsing_stats(&self) -> ParsingStats {
        ParsingStats {
            files_processed: self.files_processed,
            files_failed: self.files_failed,
            files_skipped: self.files_skipped,
            posts_parsed: self.posts_parsed,
            posts_skipped: self.posts_skipped,
            errors: self.errors.len() as u64,
        }
    }

    /// Human-readable end-of-run summary.
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("PARSING STATISTICS");
        println!("{}", "=".repeat(60));
        println!("\nFiles:");
        println!("  Found:     {}", self.files_found);
        println!("  Processed: {}", self.files_processed);
        println!("  Failed:    {}", self.files_failed);
        println!("  Skipped:   {}", self.files_skipped);
        println!("\nPosts:");
        println!("  Parsed:     {}", self.posts_parsed);
        println!("  Skipped:    {}", self.posts_skipped);
        println!("  Duplicates: {}", self.duplicates_removed);

        if !self.posts_by_platform.is_empty() {
            println!("\nBy Platform:");
            for (platform, count) in &self.posts_by_platform {
                println!("  {platform}: {count}");
            }
        }

        if !self.skip_reasons.is_empty() {
            println!("\nSkip Reasons:");
            for (reason, count) in &self.skip_reasons {
                println!("  {reason}: {count}");
            }
        }

        if !self.warnings.is_empty() {
            println!("\n⚠️  Warnings ({}):", self.warnings.len());
            for warning in self.warnings.iter().take(5) {
                println!("  • {warning}");
            }
            if self.warnings.len() > 5 {
                println!("  ... and {} more", self.warnings.len() - 5);
            }
        }

        if !self.errors.is_empty() {
            println!("\n❌ Errors ({}):", self.errors.len());
            for error in self.errors.iter().take(3) {
                println!("  • {error}");
            }
            if self.errors.len() > 3 {
                println!("  ... and {} more", self.errors.len() - 3);
            }
        }

        println!("\n{}", "=".repeat(60));
    }
}
