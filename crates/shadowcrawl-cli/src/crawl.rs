//! Crawl and fingerprint command handlers.
//!
//! Per-store failures are logged and counted rather than propagated, so one
//! bad store never aborts the run. The run only fails when every store does.

use std::io::Write;
use std::path::Path;

use shadowcrawl_core::{AppConfig, StoreTarget, StoresFile};
use shadowcrawl_scraper::{BatchReport, CrawlPipeline, JobOutcome, PageFetcher};

/// Picks the targets for a crawl run.
///
/// With `store_filter` set, returns that single store or an error when no
/// store has the slug. Otherwise returns every store in file order.
pub(crate) fn select_targets(
    stores: &StoresFile,
    store_filter: Option<&str>,
) -> anyhow::Result<Vec<StoreTarget>> {
    match store_filter {
        Some(slug) => {
            let store = stores
                .find(slug)
                .ok_or_else(|| anyhow::anyhow!("store '{slug}' not found"))?;
            Ok(vec![store.to_target()])
        }
        None => Ok(stores.targets()),
    }
}

/// Crawls the selected stores and writes every extracted record to stdout as
/// one JSON object per line.
///
/// # Errors
///
/// Returns an error if the stores file cannot be loaded, the filter matches
/// nothing, the pipeline cannot be built, stdout cannot be written, or every
/// store failed.
pub(crate) async fn run_crawl(
    config: &AppConfig,
    stores_path: Option<&Path>,
    store_filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let path = stores_path.unwrap_or(&config.stores_path);
    let stores = shadowcrawl_core::load_stores(path)?;
    let targets = select_targets(&stores, store_filter)?;

    if targets.is_empty() {
        tracing::warn!(path = %path.display(), "stores file lists no stores");
        return Ok(());
    }

    if dry_run {
        let ids: Vec<&str> = targets
            .iter()
            .filter_map(|t| t.store_id.as_deref())
            .collect();
        println!(
            "dry-run: would crawl {} stores: [{}]",
            targets.len(),
            ids.join(", ")
        );
        return Ok(());
    }

    tracing::info!(
        stores = targets.len(),
        max_concurrent = config.max_concurrent_crawls,
        env = %config.env,
        "starting crawl run"
    );

    let pipeline = CrawlPipeline::from_config(config)?;
    let outcomes = pipeline
        .run_batch(&targets, config.max_concurrent_crawls)
        .await;

    let written = write_records(&mut std::io::stdout().lock(), &outcomes)?;
    let report = BatchReport::from_outcomes(&outcomes);
    log_report(&report, written);

    if report.failed > 0 && report.failed == report.jobs.len() {
        anyhow::bail!("all {} stores failed crawling", report.failed);
    }

    Ok(())
}

/// Writes the records of every successful outcome as JSON lines. Returns the
/// number of records written.
pub(crate) fn write_records<W: Write>(
    out: &mut W,
    outcomes: &[JobOutcome],
) -> anyhow::Result<usize> {
    let mut written = 0;
    for records in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
        for record in records {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
            written += 1;
        }
    }
    out.flush()?;
    Ok(written)
}

fn log_report(report: &BatchReport, written: usize) {
    for job in &report.jobs {
        match (&job.error_kind, &job.error) {
            (Some(kind), Some(error)) => tracing::warn!(
                store_id = %job.store_id,
                url = %job.url,
                kind = %kind,
                error = %error,
                "store failed"
            ),
            _ => tracing::info!(
                store_id = %job.store_id,
                records = job.records,
                "store crawled"
            ),
        }
    }

    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        records = written,
        "crawl run finished"
    );
}

/// Fingerprints `url` and prints the result as one JSON object.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the page cannot be
/// fetched, or the result cannot be serialized.
pub(crate) async fn run_fingerprint(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let client =
        shadowcrawl_scraper::build_http_client(config.request_timeout(), &config.user_agent)?;
    let result = PageFetcher::new(client).fetch_and_classify(url).await?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
