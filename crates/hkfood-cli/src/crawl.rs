//! `crawl` command: resolve coordinates, run the crawler, export the result.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use hkfood_core::{load_coordinates, parse_coordinate_text, AppConfig, Coordinate};
use hkfood_scraper::{CancelToken, CoordinateStatus, CrawlReport, CrawlSettings, Crawler, ListingClient};

use crate::export;

#[derive(Debug, Args)]
pub(crate) struct CrawlArgs {
    /// Coordinate text, "longitude,latitude[,label]" (repeatable)
    #[arg(long = "coord", value_name = "TEXT")]
    pub(crate) coords: Vec<String>,

    /// Coordinates YAML file; defaults to the configured path when no --coord is given
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,

    /// Maximum listings to collect per coordinate
    #[arg(long)]
    pub(crate) limit: Option<u32>,

    /// Directory to write the export into
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,

    /// Name embedded in the export file name
    #[arg(long, default_value = "coordinates")]
    pub(crate) name: String,

    /// List the resolved coordinates without sending any requests
    #[arg(long)]
    pub(crate) dry_run: bool,
}

/// Resolve the coordinates to crawl from `--coord` text and/or a file.
///
/// Unparseable `--coord` values are logged and skipped. A file is read when
/// `--file` is given, or from the configured path when there are no `--coord`
/// values at all.
///
/// # Errors
///
/// Returns an error if the coordinates file cannot be loaded or nothing
/// usable remains.
pub(crate) fn resolve_coordinates(
    args: &CrawlArgs,
    config: &AppConfig,
) -> anyhow::Result<Vec<Coordinate>> {
    let mut coordinates = Vec::new();

    for text in &args.coords {
        match parse_coordinate_text(text, &config.bounds) {
            Some(coordinate) => coordinates.push(coordinate),
            None => tracing::warn!(text = %text, "skipping unusable --coord value"),
        }
    }

    let file = match (&args.file, args.coords.is_empty()) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(config.coordinates_path.clone()),
        (None, false) => None,
    };
    if let Some(path) = file {
        let loaded = load_coordinates(&path, &config.bounds)
            .with_context(|| format!("failed to load coordinates from {}", path.display()))?;
        coordinates.extend(loaded.coordinates);
    }

    if coordinates.is_empty() {
        anyhow::bail!("no usable coordinates to crawl");
    }
    Ok(coordinates)
}

/// Runs the `crawl` command end to end.
///
/// Ctrl-C stops the crawl between pages; the records collected so far are
/// still summarized and exported.
///
/// # Errors
///
/// Returns an error if no coordinates resolve, the HTTP client cannot be
/// built, or the export cannot be written.
pub(crate) async fn run_crawl(config: &AppConfig, args: &CrawlArgs) -> anyhow::Result<()> {
    let coordinates = resolve_coordinates(args, config)?;

    if args.dry_run {
        println!("[dry-run] would crawl {} coordinate(s):", coordinates.len());
        for coordinate in &coordinates {
            println!("  {coordinate}");
        }
        return Ok(());
    }

    let client = ListingClient::new(
        &config.api,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .context("failed to build listing client")?;

    let mut settings = CrawlSettings::from_config(config);
    if let Some(limit) = args.limit {
        anyhow::ensure!(limit > 0, "--limit must be greater than zero");
        settings.plan.result_limit = limit;
    }

    let cancel = CancelToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let report = Crawler::new(&client, settings)
        .run(&coordinates, &cancel)
        .await;
    log_report(&report);

    let output_dir = args.output.as_ref().unwrap_or(&config.output_dir);
    match export::write_dataset(&report.dataset, output_dir, &args.name)? {
        Some(path) => println!("exported {} listings to {}", report.dataset.records.len(), path.display()),
        None => tracing::warn!("no listings collected; nothing exported"),
    }
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancelToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::warn!("received ctrl-c; finishing current page and stopping");
            cancel.cancel();
        }
        Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
    }
}

fn log_report(report: &CrawlReport) {
    for outcome in &report.outcomes {
        match outcome.status {
            CoordinateStatus::Collected { stop } => tracing::info!(
                area = %outcome.label,
                fetched = outcome.records,
                stop = ?stop,
                "coordinate done"
            ),
            CoordinateStatus::Rejected => {
                tracing::warn!(area = %outcome.label, "coordinate rejected: outside bounding box");
            }
            CoordinateStatus::Cancelled => {
                tracing::warn!(area = %outcome.label, "coordinate not crawled: cancelled");
            }
        }
    }

    let dataset = &report.dataset;
    let summary = &dataset.summary;
    tracing::info!(
        raw = dataset.raw_count,
        unique = summary.total,
        duplicates = dataset.duplicates_removed(),
        rated = summary.rated,
        mean_rating = summary.mean_rating,
        areas = summary.areas,
        with_coordinates = summary.with_coordinates,
        with_phone = summary.with_phone,
        chains = summary.chains,
        failed = report.failed().count(),
        cancelled = report.cancelled,
        "crawl complete"
    );
    for area in &dataset.areas {
        tracing::info!(
            area = %area.area,
            count = area.count,
            rated = area.rated,
            mean_rating = area.mean_rating,
            mean_budget = area.mean_budget,
            "area summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use hkfood_core::{ApiProfile, BoundingBox, CrawlTiming};

    use super::*;

    fn config(coordinates_path: PathBuf) -> AppConfig {
        AppConfig {
            log_level: "info".to_owned(),
            coordinates_path,
            output_dir: ".".into(),
            api: ApiProfile::default(),
            bounds: BoundingBox::default(),
            timing: CrawlTiming::immediate(),
            request_timeout_secs: 15,
            page_size: 48,
            result_limit: 150,
            max_retries: 0,
            retry_backoff_base_secs: 5,
        }
    }

    fn args(coords: &[&str], file: Option<PathBuf>) -> CrawlArgs {
        CrawlArgs {
            coords: coords.iter().map(|c| (*c).to_owned()).collect(),
            file,
            limit: None,
            output: None,
            name: "coordinates".to_owned(),
            dry_run: false,
        }
    }

    fn coordinates_file(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn coord_values_skip_unusable_text_and_ignore_default_file() {
        let cfg = config("/nonexistent/coordinates.yaml".into());
        let resolved = resolve_coordinates(
            &args(&["114.1578,22.2842,Central", "not,numbers", "200,200"], None),
            &cfg,
        )
        .unwrap();
        assert_eq!(resolved, [Coordinate::new(114.1578, 22.2842, "Central")]);
    }

    #[test]
    fn no_coord_values_reads_configured_file() {
        let file = coordinates_file(
            "coordinates:\n  - label: Mong Kok\n    longitude: 114.1694\n    latitude: 22.3193\n",
        );
        let cfg = config(file.path().to_path_buf());
        let resolved = resolve_coordinates(&args(&[], None), &cfg).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].label, "Mong Kok");
    }

    #[test]
    fn explicit_file_is_appended_after_coord_values() {
        let file = coordinates_file(
            "coordinates:\n  - label: Mong Kok\n    longitude: 114.1694\n    latitude: 22.3193\n",
        );
        let cfg = config("/nonexistent/coordinates.yaml".into());
        let resolved = resolve_coordinates(
            &args(&["114.1578 22.2842"], Some(file.path().to_path_buf())),
            &cfg,
        )
        .unwrap();
        let labels: Vec<&str> = resolved.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Custom Location", "Mong Kok"]);
    }

    #[test]
    fn nothing_usable_is_an_error() {
        let cfg = config("/nonexistent/coordinates.yaml".into());
        let err = resolve_coordinates(&args(&["garbage"], None), &cfg).unwrap_err();
        assert!(err.to_string().contains("no usable coordinates"));
    }

    #[test]
    fn missing_default_file_is_an_error() {
        let cfg = config("/nonexistent/coordinates.yaml".into());
        let err = resolve_coordinates(&args(&[], None), &cfg).unwrap_err();
        assert!(err.to_string().contains("failed to load coordinates"));
    }
}
