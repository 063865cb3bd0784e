use std::fs;
use std::path::{Path, PathBuf};

use sidekick_audit::domain::Platform;
use sidekick_audit::pipeline::{load_document, save_document, Pipeline};
use sidekick_audit::report::engagement::backfill_rates;

fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn end_to_end_parse_dedupe_and_document() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "instagram_analytics_2024.csv",
        "Date,Likes,Comments,Shares,Saves,Reach\n\
         2024-03-01,100,10,5,5,1000\n\
         2024-03-01,100,10,5,5,1000\n\
         not-a-date,3,1,0,0,50\n",
    );

    let mut pipeline = Pipeline::new(None).quiet();
    let posts = pipeline.parse_file(&file);
    assert_eq!(posts.len(), 2);

    let document = pipeline.into_document(posts);
    assert_eq!(document.metadata.total_posts, 1);
    assert_eq!(document.metadata.duplicates_removed, 1);
    assert!(document.metadata.parsing_stats.posts_skipped >= 1);
    assert_eq!(document.metadata.platforms.get("instagram"), Some(&2));

    let post = &document.posts[0];
    assert_eq!(post.date, "2024-03-01");
    assert_eq!(post.platform, Platform::Instagram);
    assert_eq!(post.engagement_rate, Some(12.0));
    assert!(post.post_id.is_some());

    assert_eq!(
        document.metadata.date_range.earliest.as_deref(),
        Some("2024-03-01")
    );
    assert_eq!(
        document.metadata.date_range.latest.as_deref(),
        Some("2024-03-01")
    );
}

#[test]
fn aggregate_rows_never_become_posts() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "fb_posts.csv",
        "Date,Description,Likes\n\
         2024-04-02,Spring promo,40\n\
         2024-04-03,Number of interactions with your posts,9999\n",
    );

    let mut pipeline = Pipeline::new(None).quiet();
    let posts = pipeline.parse_file(&file);
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].caption.as_deref(), Some("Spring promo"));
    assert_eq!(
        pipeline.stats().skip_reasons.get("summary_row"),
        Some(&1)
    );
}

#[test]
fn parse_runs_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "ig_q1.csv",
        "Date,Likes,Reach\n\
         2024-01-10,20,400\n\
         2024-01-15,35,700\n\
         2024-01-10,20,400\n",
    );

    let run = || {
        let mut pipeline = Pipeline::new(None).quiet();
        let posts = pipeline.parse_file(&file);
        pipeline.into_document(posts)
    };
    let first = run();
    let second = run();

    assert_eq!(first.posts, second.posts);
    assert_eq!(
        first.metadata.duplicates_removed,
        second.metadata.duplicates_removed
    );
}

#[test]
fn directory_search_reports_unsupported_files() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(
        dir.path(),
        "gbp_locations.csv",
        "Date,Likes\n2024-02-01,8\n",
    );
    fs::write(dir.path().join("raw_export.xlsx"), b"not a real workbook").unwrap();
    fs::write(dir.path().join("2024-01_Instagram_Posts.pdf"), b"%PDF-1.4").unwrap();
    fs::write(dir.path().join("notes.docx"), b"ignored").unwrap();

    let mut pipeline = Pipeline::new(None).quiet();
    let posts = pipeline.search_directory(dir.path(), true).unwrap();
    assert_eq!(posts.len(), 1);

    let stats = pipeline.stats();
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.files_skipped, 2);
    assert_eq!(stats.skip_reasons.get("spreadsheet_unsupported"), Some(&1));
    assert_eq!(stats.skip_reasons.get("pdf_unsupported"), Some(&1));
}

#[test]
fn saved_document_reloads_and_backfills() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_csv(
        dir.path(),
        "instagram_march.csv",
        "Date,Likes,Comments,Reach,Engagement Rate\n\
         2024-03-05,50,5,500,\n\
         2024-03-06,30,0,0,\n",
    );

    let mut pipeline = Pipeline::new(None).quiet();
    let posts = pipeline.parse_file(&file);
    let document = pipeline.into_document(posts);

    let out = dir.path().join("out/parsed_posts.json");
    save_document(&document, &out).unwrap();

    let mut reloaded = load_document(&out).unwrap();
    let summary = backfill_rates(&mut reloaded.posts);
    assert_eq!(summary.calculated + summary.skipped, 1);
    assert_eq!(summary.zero_reach, 1);

    let with_reach = reloaded
        .posts
        .iter()
        .find(|p| p.date == "2024-03-05")
        .unwrap();
    assert_eq!(with_reach.engagement_rate, Some(11.0));
    let without_reach = reloaded
        .posts
        .iter()
        .find(|p| p.date == "2024-03-06")
        .unwrap();
    assert_eq!(without_reach.engagement_rate, None);
}

#[test]
fn empty_input_still_yields_a_document() {
    let dir = tempfile::tempdir().unwrap();

    let mut pipeline = Pipeline::new(None).quiet();
    let posts = pipeline.search_directory(dir.path(), true).unwrap();
    let document = pipeline.into_document(posts);

    assert_eq!(document.metadata.total_posts, 0);
    assert!(document.metadata.date_range.earliest.is_none());

    let out = dir.path().join("empty.json");
    save_document(&document, &out).unwrap();
    assert!(out.is_file());
}
