//! The hand-off record produced by platform adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shadowcrawl_core::PlatformKind;

/// One product listing as returned by a storefront's platform.
///
/// `raw` is the platform's product object exactly as served; the typed
/// fields are read from it by the adapter. Ownership passes to the caller of
/// [`crate::CrawlPipeline::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProductRecord {
    pub store_id: String,
    pub platform: PlatformKind,
    /// Platform-native product id, stored as a string to avoid precision loss.
    pub source_product_id: Option<String>,
    pub title: String,
    /// Decimal price string of the default variant, e.g. `"24.99"`.
    pub price: Option<String>,
    pub currency: Option<String>,
    pub images: Vec<String>,
    /// Canonical storefront URL of the product page.
    pub source_url: Option<String>,
    pub extracted_at: DateTime<Utc>,
    pub raw: serde_json::Value,
}
