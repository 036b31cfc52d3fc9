//! Commerce platform detection from a fetched storefront page.
//!
//! Detection is an ordered table of rules ([`FINGERPRINT_RULES`]). The first
//! rule whose predicate matches decides the result; later rules are never
//! consulted. Body matching is case-insensitive.
//!
//! | # | Signal | Platform | Confidence |
//! |---|--------|----------|------------|
//! | 1 | `x-shopify-stage` / `x-shopid` header, or `cdn.shopify.com` in body | shopify | 0.95 |
//! | 2 | `/wp-content/plugins/woocommerce` or `/wc-api/` in body | woocommerce | 0.9 |
//! | 3 | `squareup.com` or `sq-payment-form` in body | square | 0.85 |
//! | 4 | a `<script>` whose text mentions shopify | shopify | 0.8 |
//! | - | nothing matched | unknown | 0.1 |

use reqwest::header::HeaderMap;
use scraper::{Html, Selector};
use serde::Serialize;
use shadowcrawl_core::PlatformKind;

pub const SHOPIFY_SIGNAL_CONFIDENCE: f64 = 0.95;
pub const WOOCOMMERCE_CONFIDENCE: f64 = 0.9;
pub const SQUARE_CONFIDENCE: f64 = 0.85;
pub const SHOPIFY_SCRIPT_CONFIDENCE: f64 = 0.8;
pub const UNKNOWN_CONFIDENCE: f64 = 0.1;
pub const UNKNOWN_REASON: &str = "no known markers found";

const SHOPIFY_HEADERS: [&str; 2] = ["x-shopify-stage", "x-shopid"];
const SHOPIFY_ASSET_MARKERS: [&str; 1] = ["cdn.shopify.com"];
const WOOCOMMERCE_MARKERS: [&str; 2] = ["/wp-content/plugins/woocommerce", "/wc-api/"];
const SQUARE_MARKERS: [&str; 2] = ["squareup.com", "sq-payment-form"];
const SHOPIFY_SCRIPT_TOKEN: &str = "shopify";

/// What a page looks like to the rule predicates.
pub struct PageSignals<'a> {
    body: &'a str,
    body_lower: String,
    headers: &'a HeaderMap,
}

impl<'a> PageSignals<'a> {
    fn new(body: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            body,
            body_lower: body.to_lowercase(),
            headers,
        }
    }

    fn body_contains_any(&self, markers: &[&str]) -> bool {
        markers.iter().any(|m| self.body_lower.contains(m))
    }

    fn has_any_header(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.headers.contains_key(*name))
    }
}

/// One heuristic in the detection ladder.
pub struct FingerprintRule {
    pub platform: PlatformKind,
    pub confidence: f64,
    pub reason: &'static str,
    predicate: fn(&PageSignals<'_>) -> bool,
}

impl FingerprintRule {
    fn matches(&self, signals: &PageSignals<'_>) -> bool {
        (self.predicate)(signals)
    }

    fn detection(&self) -> Detection {
        Detection {
            platform: self.platform,
            confidence: self.confidence,
            reason: self.reason,
        }
    }
}

/// Detection rules in evaluation order.
pub const FINGERPRINT_RULES: &[FingerprintRule] = &[
    FingerprintRule {
        platform: PlatformKind::Shopify,
        confidence: SHOPIFY_SIGNAL_CONFIDENCE,
        reason: "shopify headers/assets detected",
        predicate: shopify_headers_or_assets,
    },
    FingerprintRule {
        platform: PlatformKind::WooCommerce,
        confidence: WOOCOMMERCE_CONFIDENCE,
        reason: "woocommerce assets detected",
        predicate: woocommerce_assets,
    },
    FingerprintRule {
        platform: PlatformKind::Square,
        confidence: SQUARE_CONFIDENCE,
        reason: "square commerce markers found",
        predicate: square_markers,
    },
    FingerprintRule {
        platform: PlatformKind::Shopify,
        confidence: SHOPIFY_SCRIPT_CONFIDENCE,
        reason: "shopify script marker found",
        predicate: shopify_script_block,
    },
];

fn shopify_headers_or_assets(signals: &PageSignals<'_>) -> bool {
    signals.has_any_header(&SHOPIFY_HEADERS) || signals.body_contains_any(&SHOPIFY_ASSET_MARKERS)
}

fn woocommerce_assets(signals: &PageSignals<'_>) -> bool {
    signals.body_contains_any(&WOOCOMMERCE_MARKERS)
}

fn square_markers(signals: &PageSignals<'_>) -> bool {
    signals.body_contains_any(&SQUARE_MARKERS)
}

fn shopify_script_block(signals: &PageSignals<'_>) -> bool {
    // No token anywhere means no script can carry it.
    if !signals.body_lower.contains(SHOPIFY_SCRIPT_TOKEN) {
        return false;
    }
    let Ok(selector) = Selector::parse("script") else {
        return false;
    };
    let document = Html::parse_document(signals.body);
    document.select(&selector).any(|script| {
        script
            .text()
            .collect::<String>()
            .to_lowercase()
            .contains(SHOPIFY_SCRIPT_TOKEN)
    })
}

/// Platform guess for one page, without the page URL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub platform: PlatformKind,
    pub confidence: f64,
    pub reason: &'static str,
}

impl Detection {
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            platform: PlatformKind::Unknown,
            confidence: UNKNOWN_CONFIDENCE,
            reason: UNKNOWN_REASON,
        }
    }
}

/// Platform guess for a fetched storefront URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FingerprintResult {
    pub url: String,
    pub platform: PlatformKind,
    pub confidence: f64,
    pub reason: String,
}

impl FingerprintResult {
    #[must_use]
    pub fn new(url: impl Into<String>, detection: Detection) -> Self {
        Self {
            url: url.into(),
            platform: detection.platform,
            confidence: detection.confidence,
            reason: detection.reason.to_owned(),
        }
    }
}

/// Classifies a page by running [`FINGERPRINT_RULES`] in order.
///
/// Pure and deterministic: the same body and headers always produce the same
/// detection.
#[must_use]
pub fn classify(body: &str, headers: &HeaderMap) -> Detection {
    let signals = PageSignals::new(body, headers);
    FINGERPRINT_RULES
        .iter()
        .find(|rule| rule.matches(&signals))
        .map_or_else(Detection::unknown, FingerprintRule::detection)
}

#[cfg(test)]
#[path = "fingerprint_test.rs"]
mod tests;
