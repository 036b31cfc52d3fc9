//! Crawl job orchestration: pacing, fingerprinting, adapter selection and
//! extraction for one store at a time.
//!
//! A job moves through [`JobStage`]s:
//!
//! ```text
//! Pending -> RateLimited -> Fetching -> Classifying -> Extracting -> Completed
//!                 \______________\____________\_____________\-------> Failed(kind)
//! ```
//!
//! `Fetching` and `Classifying` are skipped when the target already names its
//! platform. Jobs share nothing but the domain rate limiter, so one job's
//! failure never reaches another.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use shadowcrawl_core::{AppConfig, PlatformKind, StoreTarget};
use tracing::Instrument;
use uuid::Uuid;

use crate::adapters::AdapterRegistry;
use crate::error::{CrawlError, CrawlErrorKind};
use crate::fetch::{build_http_client, PageFetcher};
use crate::origin::extract_domain;
use crate::rate_limit::DomainRateLimiter;
use crate::record::RawProductRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Pending,
    RateLimited,
    Fetching,
    Classifying,
    Extracting,
    Completed,
    Failed(CrawlErrorKind),
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStage::Pending => write!(f, "pending"),
            JobStage::RateLimited => write!(f, "rate_limited"),
            JobStage::Fetching => write!(f, "fetching"),
            JobStage::Classifying => write!(f, "classifying"),
            JobStage::Extracting => write!(f, "extracting"),
            JobStage::Completed => write!(f, "completed"),
            JobStage::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

fn enter(stage: JobStage) {
    tracing::debug!(%stage, "crawl job stage");
}

pub struct CrawlPipeline {
    limiter: Arc<DomainRateLimiter>,
    fetcher: PageFetcher,
    registry: AdapterRegistry,
}

impl CrawlPipeline {
    #[must_use]
    pub fn new(
        limiter: Arc<DomainRateLimiter>,
        fetcher: PageFetcher,
        registry: AdapterRegistry,
    ) -> Self {
        Self {
            limiter,
            fetcher,
            registry,
        }
    }

    /// Wires the default pipeline: one shared HTTP client, one rate limiter,
    /// and every built-in adapter.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Network`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, CrawlError> {
        let client = build_http_client(config.request_timeout(), &config.user_agent)?;
        let limiter = Arc::new(DomainRateLimiter::new(config.rate_limit_delay()));
        let registry = AdapterRegistry::with_default_adapters(&client);
        Ok(Self::new(limiter, PageFetcher::new(client), registry))
    }

    #[must_use]
    pub fn limiter(&self) -> &Arc<DomainRateLimiter> {
        &self.limiter
    }

    #[must_use]
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Runs one crawl job to completion.
    ///
    /// Every returned record carries the target's store id (or its domain
    /// when the target has none).
    ///
    /// # Errors
    ///
    /// Returns the [`CrawlError`] of the stage that failed. Errors are never
    /// retried here.
    pub async fn run(&self, target: &StoreTarget) -> Result<Vec<RawProductRecord>, CrawlError> {
        let job_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "crawl_job",
            %job_id,
            url = %target.url,
            label = target.label.as_deref().unwrap_or("")
        );

        async {
            enter(JobStage::Pending);
            let result = self.run_stages(target).await;
            match &result {
                Ok(records) => {
                    enter(JobStage::Completed);
                    tracing::info!(records = records.len(), "crawl job completed");
                }
                Err(e) => {
                    enter(JobStage::Failed(e.kind()));
                    tracing::warn!(kind = %e.kind(), error = %e, "crawl job failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, target: &StoreTarget) -> Result<Vec<RawProductRecord>, CrawlError> {
        enter(JobStage::RateLimited);
        self.limiter.wait_turn(&target.url).await;

        let (platform, fetched) = match target.known_platform {
            Some(platform) => (platform, false),
            None => (self.resolve_platform(&target.url).await?, true),
        };

        let adapter = self.registry.get(platform, &target.url)?;

        // The fingerprint fetch used this domain's last turn.
        if fetched {
            self.limiter.wait_turn(&target.url).await;
        }

        enter(JobStage::Extracting);
        let mut records = adapter.extract(&target.url).await?;

        let store_id = store_id_for(target);
        for record in &mut records {
            record.store_id.clone_from(&store_id);
        }
        Ok(records)
    }

    async fn resolve_platform(&self, url: &str) -> Result<PlatformKind, CrawlError> {
        enter(JobStage::Fetching);
        let page = self.fetcher.fetch_page(url).await?;

        enter(JobStage::Classifying);
        let fingerprint = page.fingerprint();
        tracing::info!(
            platform = %fingerprint.platform,
            confidence = fingerprint.confidence,
            reason = %fingerprint.reason,
            "platform resolved"
        );
        Ok(fingerprint.platform)
    }

    /// Runs every target as an independent job, at most `max_concurrent` at
    /// a time, and returns one outcome per target in input order.
    pub async fn run_batch(&self, targets: &[StoreTarget], max_concurrent: usize) -> Vec<JobOutcome> {
        stream::iter(targets)
            .map(|target| async move {
                JobOutcome {
                    target: target.clone(),
                    result: self.run(target).await,
                }
            })
            .buffered(max_concurrent.max(1))
            .collect()
            .await
    }
}

fn store_id_for(target: &StoreTarget) -> String {
    target
        .store_id
        .clone()
        .unwrap_or_else(|| extract_domain(&target.url))
}

/// Result of one job in a batch.
#[derive(Debug)]
pub struct JobOutcome {
    pub target: StoreTarget,
    pub result: Result<Vec<RawProductRecord>, CrawlError>,
}

impl JobOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    #[must_use]
    pub fn summary(&self) -> JobSummary {
        let (records, error_kind, error) = match &self.result {
            Ok(records) => (records.len(), None, None),
            Err(e) => (0, Some(e.kind()), Some(e.to_string())),
        };
        JobSummary {
            url: self.target.url.clone(),
            store_id: store_id_for(&self.target),
            label: self.target.label.clone(),
            records,
            error_kind,
            error,
        }
    }
}

/// Reportable outcome of one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub url: String,
    pub store_id: String,
    pub label: Option<String>,
    pub records: usize,
    pub error_kind: Option<CrawlErrorKind>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub jobs: Vec<JobSummary>,
    pub succeeded: usize,
    pub failed: usize,
    pub records: usize,
}

impl BatchReport {
    #[must_use]
    pub fn from_outcomes(outcomes: &[JobOutcome]) -> Self {
        let jobs: Vec<JobSummary> = outcomes.iter().map(JobOutcome::summary).collect();
        let failed = jobs.iter().filter(|j| j.error_kind.is_some()).count();
        let records = jobs.iter().map(|j| j.records).sum();
        Self {
            succeeded: jobs.len() - failed,
            failed,
            records,
            jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(url: &str, err: CrawlError) -> JobOutcome {
        JobOutcome {
            target: StoreTarget::new(url),
            result: Err(err),
        }
    }

    #[test]
    fn store_id_prefers_explicit_id() {
        let target = StoreTarget::new("https://shop.example.com/x").with_store_id("corner");
        assert_eq!(store_id_for(&target), "corner");
    }

    #[test]
    fn store_id_falls_back_to_domain() {
        let target = StoreTarget::new("https://shop.example.com/x");
        assert_eq!(store_id_for(&target), "shop.example.com");
    }

    #[test]
    fn summary_reports_error_kind() {
        let outcome = failed(
            "https://sq.example.com",
            CrawlError::UnsupportedPlatform {
                platform: PlatformKind::Square,
                url: "https://sq.example.com".to_owned(),
            },
        );
        let summary = outcome.summary();
        assert_eq!(summary.records, 0);
        assert_eq!(summary.error_kind, Some(CrawlErrorKind::UnsupportedPlatform));
        assert!(summary.error.unwrap().contains("square"));
        assert!(!outcome.is_success());
    }

    #[test]
    fn batch_report_tallies_jobs() {
        let ok = JobOutcome {
            target: StoreTarget::new("https://a.example.com"),
            result: Ok(Vec::new()),
        };
        let bad = failed(
            "https://b.example.com",
            CrawlError::HttpStatus {
                status: 503,
                url: "https://b.example.com".to_owned(),
            },
        );
        let report = BatchReport::from_outcomes(&[ok, bad]);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.records, 0);
        assert_eq!(report.jobs.len(), 2);
    }

    #[test]
    fn stage_display_includes_failure_kind() {
        assert_eq!(
            JobStage::Failed(CrawlErrorKind::Network).to_string(),
            "failed(network)"
        );
        assert_eq!(JobStage::Classifying.to_string(), "classifying");
    }
}
