use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use sidekick_audit::client::scaffold::create_client_folder;
use sidekick_audit::client::validate::FolderValidator;
use sidekick_audit::constants::{AUDIT_REPORTS_DIR, METRICS_SUMMARY_FILE};
use sidekick_audit::domain::Platform;
use sidekick_audit::logging;
use sidekick_audit::pipeline::{load_document, save_document, Pipeline};
use sidekick_audit::report::engagement::backfill_rates;
use sidekick_audit::report::metrics::Analyzer;
use sidekick_audit::report::template::{build_replacements, client_name_from_folder, render};
use sidekick_audit::report::validate::validate_report;

#[derive(Parser)]
#[command(name = "sidekick_audit")]
#[command(about = "Social media analytics parsing and audit toolkit")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse analytics exports into the unified post document
    Parse {
        /// Analytics files to parse
        #[arg(long, num_args = 1..)]
        analytics: Vec<PathBuf>,
        /// Directory to search for analytics files
        #[arg(long)]
        search_dir: Option<PathBuf>,
        /// Don't descend into subdirectories when searching
        #[arg(long)]
        no_recursive: bool,
        /// Platform to assume when a file gives no hint
        #[arg(long, value_enum)]
        default_platform: Option<Platform>,
        /// Output JSON path
        #[arg(long)]
        output: PathBuf,
        /// Suppress per-file progress output
        #[arg(long)]
        quiet: bool,
    },
    /// Backfill missing engagement rates in a parsed document
    Engagement {
        /// Parsed document to update
        #[arg(long)]
        json_file: PathBuf,
        /// Where to write the updated document (defaults to in-place)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compute the metrics summary from a parsed document
    Metrics {
        /// Parsed document to analyze
        #[arg(long)]
        input: PathBuf,
        /// Output path for the metrics summary JSON
        #[arg(long)]
        output: Option<PathBuf>,
        /// Benchmark overrides as {platform: {healthy_min}} JSON
        #[arg(long)]
        benchmarks: Option<PathBuf>,
    },
    /// Fill the audit report template from a metrics summary
    FillReport {
        /// Client folder the report belongs to
        #[arg(long)]
        client_folder: PathBuf,
        /// Audit report template with {{placeholder}} tokens
        #[arg(long)]
        template: PathBuf,
        /// Metrics summary (defaults to the one in the audit reports folder)
        #[arg(long)]
        metrics: Option<PathBuf>,
    },
    /// Check a completed audit report for leftover placeholders and gaps
    ValidateReport {
        /// Report file to check
        #[arg(long)]
        report: PathBuf,
    },
    /// Scaffold a standardized client folder
    SetupClient {
        /// Client display name
        #[arg(long)]
        client_name: String,
        /// Where to create the folder
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Short code to use in the folder name instead of the full name
        #[arg(long)]
        short_code: Option<String>,
        /// Overwrite an existing folder
        #[arg(long)]
        force: bool,
    },
    /// Validate a client folder against the audit-readiness layout
    ValidateFolder {
        /// Client folder to check
        #[arg(long)]
        path: PathBuf,
        /// Show every check, not just problems
        #[arg(long)]
        verbose: bool,
        /// Emit a machine-readable summary instead of the report
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            analytics,
            search_dir,
            no_recursive,
            default_platform,
            output,
            quiet,
        } => run_parse(analytics, search_dir, !no_recursive, default_platform, &output, quiet),
        Commands::Engagement { json_file, output } => run_engagement(&json_file, output.as_deref()),
        Commands::Metrics {
            input,
            output,
            benchmarks,
        } => run_metrics(&input, output.as_deref(), benchmarks.as_deref()),
        Commands::FillReport {
            client_folder,
            template,
            metrics,
        } => run_fill_report(&client_folder, &template, metrics.as_deref()),
        Commands::ValidateReport { report } => run_validate_report(&report),
        Commands::SetupClient {
            client_name,
            output_dir,
            short_code,
            force,
        } => {
            create_client_folder(&client_name, &output_dir, short_code.as_deref(), force)?;
            println!("\n🎉 Client folder ready for {client_name}");
            Ok(())
        }
        Commands::ValidateFolder { path, verbose, json } => run_validate_folder(&path, verbose, json),
    }
}

fn run_parse(
    analytics: Vec<PathBuf>,
    search_dir: Option<PathBuf>,
    recursive: bool,
    default_platform: Option<Platform>,
    output: &Path,
    quiet: bool,
) -> anyhow::Result<()> {
    if analytics.is_empty() && search_dir.is_none() {
        anyhow::bail!("nothing to parse: pass --analytics files or --search-dir");
    }

    let mut pipeline = Pipeline::new(default_platform);
    if quiet {
        pipeline = pipeline.quiet();
    }

    let mut posts = Vec::new();
    if let Some(dir) = &search_dir {
        posts.extend(pipeline.search_directory(dir, recursive)?);
    }
    for file in &analytics {
        info!(file = %file.display(), "processing input file");
        posts.extend(pipeline.parse_file(file));
    }

    if !quiet {
        pipeline.stats().print_summary();
    }

    // An empty document is still written so downstream steps see the stats.
    let document = pipeline.into_document(posts);
    save_document(&document, output)?;
    println!(
        "✅ Saved {} posts to {}",
        document.metadata.total_posts,
        output.display()
    );
    if document.metadata.total_posts == 0 {
        warn!("no posts parsed in this run");
    }
    Ok(())
}

fn run_engagement(json_file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let mut document = load_document(json_file)?;
    let summary = backfill_rates(&mut document.posts);

    println!("📈 Engagement backfill:");
    println!("   Calculated: {}", summary.calculated);
    println!("   Already set: {}", summary.skipped);
    println!("   Zero reach (left unset): {}", summary.zero_reach);

    let target = output.unwrap_or(json_file);
    save_document(&document, target)?;
    println!("✅ Saved to {}", target.display());
    Ok(())
}

fn run_metrics(input: &Path, output: Option<&Path>, benchmarks: Option<&Path>) -> anyhow::Result<()> {
    let document = load_document(input)?;
    let analyzer = match benchmarks {
        Some(path) => Analyzer::with_benchmark_file(path)?,
        None => Analyzer::new(),
    };
    let metrics = analyzer.analyze(&document.posts)?;

    let default_output = PathBuf::from(METRICS_SUMMARY_FILE);
    let target = output.unwrap_or(&default_output);
    fs::write(target, serde_json::to_string_pretty(&metrics)?)?;
    info!(path = %target.display(), "metrics summary written");

    println!("📊 Metrics summary for {} posts", document.metadata.total_posts);
    println!("   Period: {} to {}", metrics.meta.start_date, metrics.meta.end_date);
    println!("   Growth: {}", metrics.macro_trend.growth_status);
    println!("✅ Saved to {}", target.display());
    Ok(())
}

fn run_fill_report(
    client_folder: &Path,
    template: &Path,
    metrics_path: Option<&Path>,
) -> anyhow::Result<()> {
    let folder_name = client_folder
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid client folder path"))?;
    let client_name = client_name_from_folder(folder_name);

    let audit_dir = client_folder.join(AUDIT_REPORTS_DIR);
    let default_metrics = audit_dir.join(METRICS_SUMMARY_FILE);
    let metrics_path = metrics_path.unwrap_or(&default_metrics);

    let metrics = serde_json::from_str(&fs::read_to_string(metrics_path)?)?;
    let template_text = fs::read_to_string(template)?;

    let report_date = Local::now().format("%Y-%m-%d").to_string();
    let replacements = build_replacements(&metrics, &client_name, &report_date);
    let rendered = render(&template_text, &replacements);

    fs::create_dir_all(&audit_dir)?;
    let report_path = audit_dir.join(format!("{folder_name}_Audit_COMPLETE.md"));
    fs::write(&report_path, &rendered)?;
    info!(client = %client_name, path = %report_path.display(), "report rendered");
    println!("✅ Report written to {}", report_path.display());

    let issues = validate_report(&rendered);
    if !issues.is_empty() {
        println!("\n⚠️  {} issue(s) remain in the rendered report:", issues.len());
        for issue in &issues {
            println!("   - {issue}");
        }
    }
    Ok(())
}

fn run_validate_report(report: &Path) -> anyhow::Result<()> {
    let content = fs::read_to_string(report)?;
    let issues = validate_report(&content);

    if issues.is_empty() {
        println!("✅ Report looks complete: {}", report.display());
        return Ok(());
    }

    println!("❌ {} issue(s) in {}:", issues.len(), report.display());
    for issue in &issues {
        println!("   - {issue}");
    }
    error!(report = %report.display(), issues = issues.len(), "report validation failed");
    process::exit(1);
}

fn run_validate_folder(path: &Path, verbose: bool, json: bool) -> anyhow::Result<()> {
    let mut validator = FolderValidator::new(path, verbose);
    let valid = validator.validate();

    if json {
        println!("{}", serde_json::to_string_pretty(&validator.summary(valid))?);
    } else {
        validator.print_report();
    }

    if !valid {
        process::exit(1);
    }
    Ok(())
}
