use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use tracing::info;

use crate::constants::{CLIENT_FOLDERS, SOCIAL_STRATEGY_FILE};
use crate::error::{AuditError, Result};

/// Folder name for a new client: the short code when given, otherwise a
/// slug of the client name.
pub fn folder_name(client_name: &str, short_code: Option<&str>) -> String {
    match short_code {
        Some(code) => format!("client-{}", code.to_lowercase()),
        None => format!(
            "client-{}",
            client_name.to_lowercase().replace(' ', "-").replace('&', "and")
        ),
    }
}

/// Creates the standardized client folder tree with starter documents.
/// Refuses to touch an existing folder unless `force` is set.
pub fn create_client_folder(
    client_name: &str,
    output_dir: &Path,
    short_code: Option<&str>,
    force: bool,
) -> Result<PathBuf> {
    let name = folder_name(client_name, short_code);
    let client_folder = output_dir.join(&name);

    if client_folder.exists() && !force {
        return Err(AuditError::InvalidInput(format!(
            "folder '{name}' already exists (use --force to overwrite)"
        )));
    }

    fs::create_dir_all(&client_folder)?;
    println!("✅ Created: {}", client_folder.display());

    for folder in CLIENT_FOLDERS {
        fs::create_dir_all(client_folder.join(folder))?;
        println!("  📁 {folder}");
    }

    write_client_profile(&client_folder, client_name)?;
    write_social_strategy(&client_folder, client_name)?;
    write_readme_files(&client_folder)?;
    write_start_here(&client_folder, client_name)?;

    info!(client = client_name, path = %client_folder.display(), "client folder scaffolded");
    Ok(client_folder)
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn write_client_profile(client_folder: &Path, client_name: &str) -> Result<()> {
    let safe_name = client_name.to_uppercase().replace(' ', "_").replace('&', "AND");
    let filename = format!("00_{safe_name}_CLIENT_PROFILE.md");

    let content = format!(
        "# Client Profile: {client_name}\n\n\
         **Last Updated:** {date}\n\
         **Account Manager:** [YOUR NAME]\n\
         **Active Since:** [START DATE]\n\n\
         ## Business Overview\n\n\
         [TODO: Industry, locations, target audience]\n\n\
         ## Platform Access\n\n\
         [TODO: Accounts managed and access status]\n\n\
         ## Goals & KPIs\n\n\
         [TODO: Engagement targets, growth targets]\n",
        date = today()
    );

    fs::write(client_folder.join(&filename), content)?;
    println!("✅ Created: {filename}");
    Ok(())
}

fn write_social_strategy(client_folder: &Path, client_name: &str) -> Result<()> {
    let year = Local::now().year();
    let content = format!(
        "# Social Media Strategy: {client_name}\n\n\
         **Strategy Period:** {year}-{next_year}\n\
         **Last Updated:** {date}\n\n\
         ## Content Pillars\n\n\
         [TODO: Define pillars with target percentages]\n\n\
         ## Posting Cadence\n\n\
         [TODO: Frequency by platform]\n",
        next_year = year + 1,
        date = today()
    );

    fs::write(client_folder.join(SOCIAL_STRATEGY_FILE), content)?;
    println!("✅ Created: {SOCIAL_STRATEGY_FILE}");
    Ok(())
}

fn write_readme_files(client_folder: &Path) -> Result<()> {
    let readmes: &[(&str, &str)] = &[
        (
            "07_Social_Media/01_Content_Calendars/README.md",
            "# Content Calendars\n\n\
             Store monthly content calendars here.\n\n\
             **File naming convention:**\n\
             - `YYYY-MM_Content_Calendar.csv`\n\
             - Example: `2024-01_Content_Calendar.csv`\n\n\
             **Required columns:** Date, Platform, Format, Caption, Pillar, Status\n",
        ),
        (
            "07_Social_Media/02_Performance_Data/README.md",
            "# Performance Data\n\n\
             Store analytics exports here.\n\n\
             **File naming convention:**\n\
             - `Platform_Analytics_YYYY_Q#.csv` (quarterly exports)\n\
             - `Platform_Analytics_YYYY-MM.csv` (monthly exports)\n\n\
             **Required columns:** Date, Post_ID, Type, Likes, Comments, Shares,\n\
             Saves (if available), Reach, Impressions\n",
        ),
        (
            "07_Social_Media/03_Post_Archive/README.md",
            "# Post Archive\n\n\
             Store PDF exports of actual posts here (optional).\n\n\
             **File naming convention:**\n\
             - `YYYY-MM_Platform_Posts.pdf`\n\
             - Example: `2024-01_Instagram_Posts.pdf`\n",
        ),
        (
            "07_Social_Media/04_Audit_Reports/README.md",
            "# Audit Reports\n\n\
             Completed social media audit reports land here.\n\n\
             **File naming convention:**\n\
             - `YYYY-MM_Social_Audit.md`\n\
             - Example: `2024-06_Social_Audit.md`\n",
        ),
    ];

    for (path, content) in readmes {
        fs::write(client_folder.join(path), content)?;
        println!("  📄 {path}");
    }
    Ok(())
}

fn write_start_here(client_folder: &Path, client_name: &str) -> Result<()> {
    let content = format!(
        "# START HERE: {client_name}\n\n\
         Welcome! This folder contains all files and assets for {client_name}.\n\n\
         ## Onboarding Checklist\n\n\
         - [ ] Complete the client profile in the folder root\n\
         - [ ] Define strategy in `07_Social_Media/00_SOCIAL_STRATEGY.md`\n\
         - [ ] Import historical content calendars (`YYYY-MM_Content_Calendar.csv`)\n\
         - [ ] Export 6-12 months of platform analytics into\n\
               `07_Social_Media/02_Performance_Data/`\n\
         - [ ] Run `sidekick_audit validate-folder --path <this folder>`\n\n\
         See the README files in each subfolder for naming conventions.\n\n\
         *Last updated: {date}*\n",
        date = today()
    );

    fs::write(client_folder.join("00_START_HERE.md"), content)?;
    println!("✅ Created: 00_START_HERE.md");
    Ok(())
}
