//! Commerce platform identifiers and the per-job crawl target.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commerce engine powering a storefront.
///
/// New variants are added together with a matching extractor adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Shopify,
    WooCommerce,
    Square,
    Unknown,
}

impl PlatformKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformKind::Shopify => "shopify",
            PlatformKind::WooCommerce => "woocommerce",
            PlatformKind::Square => "square",
            PlatformKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown platform \"{0}\"; expected shopify, woocommerce, square or unknown")]
pub struct UnknownPlatform(pub String);

impl FromStr for PlatformKind {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shopify" => Ok(PlatformKind::Shopify),
            "woocommerce" | "woo" => Ok(PlatformKind::WooCommerce),
            "square" => Ok(PlatformKind::Square),
            "unknown" => Ok(PlatformKind::Unknown),
            _ => Err(UnknownPlatform(s.to_owned())),
        }
    }
}

/// One store to crawl in one cycle.
///
/// Built by whoever dispatches crawls and never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTarget {
    /// Storefront URL; any path is ignored when building platform endpoints.
    pub url: String,
    /// Skips fingerprinting when set.
    #[serde(default)]
    pub known_platform: Option<PlatformKind>,
    /// Free-form grouping label, e.g. the store's neighborhood.
    #[serde(default)]
    pub label: Option<String>,
    /// Identifier stamped onto every extracted record. Defaults to the host.
    #[serde(default)]
    pub store_id: Option<String>,
}

impl StoreTarget {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            known_platform: None,
            label: None,
            store_id: None,
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: PlatformKind) -> Self {
        self.known_platform = Some(platform);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_store_id(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }
}
