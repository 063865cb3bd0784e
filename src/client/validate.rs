use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::constants::{
    CONTENT_CALENDARS_DIR, PERFORMANCE_DATA_DIR, POST_ARCHIVE_DIR, SOCIAL_MEDIA_DIR,
    SOCIAL_STRATEGY_FILE,
};

/// Required subfolders of 07_Social_Media; 03_Post_Archive is optional.
const REQUIRED_SOCIAL_SUBDIRS: &[&str] = &[
    "01_Content_Calendars",
    "02_Performance_Data",
    "04_Audit_Reports",
];

/// Machine-readable validation outcome for `--json` output.
#[derive(Debug, Serialize)]
pub struct ValidationSummary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub valid: bool,
    pub path: String,
}

/// Checks a client folder against the audit-readiness layout. Errors block
/// an audit, warnings degrade it, info lines document what was found.
pub struct FolderValidator {
    client_path: PathBuf,
    verbose: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl FolderValidator {
    pub fn new(client_path: &Path, verbose: bool) -> Self {
        Self {
            client_path: client_path.to_path_buf(),
            verbose,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Runs all checks; true when no blocking errors were found.
    pub fn validate(&mut self) -> bool {
        if !self.client_path.exists() {
            self.errors
                .push(format!("Path does not exist: {}", self.client_path.display()));
            return false;
        }
        if !self.client_path.is_dir() {
            self.errors
                .push(format!("Path is not a directory: {}", self.client_path.display()));
            return false;
        }

        self.check_client_profile();
        self.check_social_media_folder();
        self.check_social_strategy();
        self.check_content_calendars();
        self.check_performance_data();
        self.check_post_archive();

        self.errors.is_empty()
    }

    fn check_client_profile(&mut self) {
        let profiles = match_files(&self.client_path, |name| {
            name.starts_with("00_") && name.ends_with("_CLIENT_PROFILE.md")
        });

        match profiles.len() {
            0 => self.errors.push("Missing: 00_*_CLIENT_PROFILE.md".to_string()),
            1 => {
                let profile = &profiles[0];
                self.info.push(format!("Found: {}", file_name(profile)));
                if file_len(profile) < 100 {
                    self.warnings
                        .push("CLIENT_PROFILE.md appears empty or incomplete".to_string());
                }
            }
            n => self
                .warnings
                .push(format!("Multiple CLIENT_PROFILE files found: {n}")),
        }
    }

    fn check_social_media_folder(&mut self) {
        let social_dir = self.client_path.join(SOCIAL_MEDIA_DIR);
        if !social_dir.exists() {
            self.errors
                .push(format!("Missing: {SOCIAL_MEDIA_DIR}/ directory"));
            return;
        }
        self.info.push(format!("Found: {SOCIAL_MEDIA_DIR}/"));

        for subdir in REQUIRED_SOCIAL_SUBDIRS {
            if social_dir.join(subdir).exists() {
                self.info.push(format!("Found: {SOCIAL_MEDIA_DIR}/{subdir}/"));
            } else {
                self.errors
                    .push(format!("Missing: {SOCIAL_MEDIA_DIR}/{subdir}/"));
            }
        }
    }

    fn check_social_strategy(&mut self) {
        let strategy = self.client_path.join(SOCIAL_STRATEGY_FILE);
        if !strategy.exists() {
            self.warnings
                .push(format!("Missing: {SOCIAL_STRATEGY_FILE}"));
            self.warnings
                .push("   → Strategy will be inferred from execution".to_string());
        } else {
            self.info.push(format!("Found: {SOCIAL_STRATEGY_FILE}"));
            if file_len(&strategy) < 200 {
                self.warnings
                    .push("SOCIAL_STRATEGY.md appears empty or incomplete".to_string());
            }
        }
    }

    fn check_content_calendars(&mut self) {
        let calendars_dir = self.client_path.join(CONTENT_CALENDARS_DIR);
        if !calendars_dir.exists() {
            return;
        }

        let files = match_files(&calendars_dir, |name| {
            name.ends_with(".csv") || name.ends_with(".xlsx")
        });
        if files.is_empty() {
            self.errors
                .push("No content calendar files found in 01_Content_Calendars/".to_string());
            return;
        }
        self.info
            .push(format!("Found {} content calendar file(s)", files.len()));

        let misnamed: Vec<String> = files
            .iter()
            .filter(|f| !has_valid_date_prefix(&stem(f)))
            .map(|f| file_name(f))
            .collect();
        if !misnamed.is_empty() {
            self.warnings.push(format!(
                "{}/{} calendar files don't follow YYYY-MM naming convention",
                misnamed.len(),
                files.len()
            ));
            if self.verbose {
                for name in misnamed {
                    self.warnings.push(format!("   Non-standard name: {name}"));
                }
            }
        }
    }

    fn check_performance_data(&mut self) {
        let data_dir = self.client_path.join(PERFORMANCE_DATA_DIR);
        if !data_dir.exists() {
            return;
        }

        let files = match_files(&data_dir, |name| {
            name.ends_with(".csv") || name.ends_with(".xlsx")
        });
        if files.is_empty() {
            self.warnings
                .push("No analytics files found in 02_Performance_Data/".to_string());
            self.warnings
                .push("   → Audit will be qualitative-only".to_string());
            return;
        }
        self.info
            .push(format!("Found {} analytics file(s)", files.len()));

        let mut platforms: Vec<&str> = Vec::new();
        for file in &files {
            let name = file_name(file).to_lowercase();
            for (keywords, label) in [
                (&["instagram", "ig"][..], "Instagram"),
                (&["facebook", "fb"][..], "Facebook"),
                (&["google", "gbp", "gmb"][..], "Google Business Profile"),
            ] {
                if keywords.iter().any(|k| name.contains(k)) && !platforms.contains(&label) {
                    platforms.push(label);
                }
            }
        }
        if !platforms.is_empty() {
            platforms.sort_unstable();
            self.info
                .push(format!("   Platforms detected: {}", platforms.join(", ")));
        }
    }

    fn check_post_archive(&mut self) {
        let archive_dir = self.client_path.join(POST_ARCHIVE_DIR);
        if !archive_dir.exists() {
            self.warnings
                .push(format!("Optional: {POST_ARCHIVE_DIR}/ not found"));
            return;
        }

        let pdfs = match_files(&archive_dir, |name| name.ends_with(".pdf"));
        if pdfs.is_empty() {
            self.info
                .push("No PDF files in 03_Post_Archive/ (optional)".to_string());
        } else {
            self.info
                .push(format!("Found {} post archive PDF(s)", pdfs.len()));
        }
    }

    pub fn summary(&self, valid: bool) -> ValidationSummary {
        ValidationSummary {
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            info: self.info.len(),
            valid,
            path: self.client_path.display().to_string(),
        }
    }

    /// Banner-style report mirroring the CLI's other summaries.
    pub fn print_report(&self) {
        println!("\n{}", "=".repeat(60));
        println!(
            "VALIDATION REPORT: {}",
            file_name(&self.client_path)
        );
        println!("{}\n", "=".repeat(60));

        if !self.errors.is_empty() {
            println!("🔴 CRITICAL ISSUES (Must Fix):");
            for error in &self.errors {
                println!("  ❌ {error}");
            }
            println!();
        }

        if !self.warnings.is_empty() {
            println!("🟡 WARNINGS (Should Fix):");
            for warning in &self.warnings {
                println!("  ⚠️  {warning}");
            }
            println!();
        }

        if self.verbose || (self.errors.is_empty() && self.warnings.is_empty()) {
            println!("✅ STATUS:");
            for info in &self.info {
                println!("  {info}");
            }
            println!();
        }

        println!("{}", "=".repeat(60));
        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("✅ RESULT: READY FOR AUDIT");
        } else if self.errors.is_empty() {
            println!("⚠️  RESULT: READY WITH WARNINGS");
        } else {
            println!("❌ RESULT: NOT READY");
        }
        println!("{}\n", "=".repeat(60));
    }
}

/// True when the name starts with a plausible `YYYY-MM` prefix before the
/// first underscore.
pub fn has_valid_date_prefix(stem: &str) -> bool {
    let first = stem.split('_').next().unwrap_or("");
    if first.len() != 7 || first.as_bytes().get(4) != Some(&b'-') {
        return false;
    }
    let year: u32 = match first[..4].parse() {
        Ok(y) => y,
        Err(_) => return false,
    };
    let month: u32 = match first[5..7].parse() {
        Ok(m) => m,
        Err(_) => return false,
    };
    (2000..=2100).contains(&year) && (1..=12).contains(&month)
}

fn match_files(dir: &Path, predicate: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file() && predicate(&file_name(p)))
                .collect()
        })
        .unwrap_or_default();
    out.sort();
    out
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
