pub mod adapters;
pub mod error;
pub mod fetch;
pub mod fingerprint;
pub mod origin;
pub mod pipeline;
pub mod rate_limit;
pub mod record;

pub use adapters::{AdapterRegistry, PlatformAdapter, ShopifyAdapter, WooCommerceAdapter};
pub use error::{CrawlError, CrawlErrorKind};
pub use fetch::{build_http_client, FetchedPage, PageFetcher};
pub use fingerprint::{classify, Detection, FingerprintResult, FINGERPRINT_RULES};
pub use pipeline::{BatchReport, CrawlPipeline, JobOutcome, JobStage, JobSummary};
pub use rate_limit::DomainRateLimiter;
pub use record::RawProductRecord;
