//! Platform-specific product extractors and the registry that selects them.
//!
//! Each supported platform registers one [`PlatformAdapter`] instance keyed by
//! its [`PlatformKind`]. Selection is a map lookup; adding a platform means
//! adding a variant, an adapter, and a `register` call.

mod shopify;
mod woocommerce;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use shadowcrawl_core::PlatformKind;

use crate::error::CrawlError;
use crate::record::RawProductRecord;

pub use shopify::ShopifyAdapter;
pub use woocommerce::WooCommerceAdapter;

/// Extracts product listings from a storefront running one specific platform.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// The platform this adapter understands.
    fn platform(&self) -> PlatformKind;

    /// Fetches the store's product listing.
    ///
    /// Records that cannot be read are skipped with a warning; an error is
    /// returned only when the response as a whole is unusable.
    async fn extract(&self, store_url: &str) -> Result<Vec<RawProductRecord>, CrawlError>;
}

#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<PlatformKind, Arc<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in adapter, sharing one HTTP client.
    #[must_use]
    pub fn with_default_adapters(client: &Client) -> Self {
        let mut registry = Self::new();
        registry.register(ShopifyAdapter::new(client.clone()));
        registry.register(WooCommerceAdapter::new(client.clone()));
        registry
    }

    /// Adds `adapter` under its own platform, replacing any previous entry.
    pub fn register<A>(&mut self, adapter: A) -> &mut Self
    where
        A: PlatformAdapter + 'static,
    {
        self.adapters.insert(adapter.platform(), Arc::new(adapter));
        self
    }

    /// Returns the adapter for `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::UnsupportedPlatform`] for [`PlatformKind::Unknown`]
    /// or a platform with no registered adapter.
    pub fn get(
        &self,
        platform: PlatformKind,
        store_url: &str,
    ) -> Result<Arc<dyn PlatformAdapter>, CrawlError> {
        let unsupported = || CrawlError::UnsupportedPlatform {
            platform,
            url: store_url.to_owned(),
        };
        if platform == PlatformKind::Unknown {
            return Err(unsupported());
        }
        self.adapters.get(&platform).cloned().ok_or_else(unsupported)
    }

    #[must_use]
    pub fn supports(&self, platform: PlatformKind) -> bool {
        platform != PlatformKind::Unknown && self.adapters.contains_key(&platform)
    }

    /// Registered platforms, in a stable order.
    #[must_use]
    pub fn platforms(&self) -> Vec<PlatformKind> {
        let mut platforms: Vec<_> = self.adapters.keys().copied().collect();
        platforms.sort_by_key(|p| p.as_str());
        platforms
    }
}

/// Reads an image `src` list out of a product object's `images` array.
pub(crate) fn image_sources(product: &serde_json::Value) -> Vec<String> {
    product
        .get("images")
        .and_then(serde_json::Value::as_array)
        .map(|images| {
            images
                .iter()
                .filter_map(|img| img.get("src").and_then(serde_json::Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Renders a JSON string or number as text. Empty strings and other types
/// read as absent.
pub(crate) fn scalar_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a non-empty string field.
pub(crate) fn text_field(product: &serde_json::Value, key: &str) -> Option<String> {
    product
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
