//! Shopify storefronts via the public `products.json` endpoint.
//!
//! ## Observed response shape
//!
//! `GET /products.json?limit=250` returns `{"products": [...]}`. Each product
//! carries a numeric `id`, `title`, URL `handle`, an `images` array of
//! `{src, ...}` objects and a `variants` array whose `price` is a decimal
//! string such as `"30.00"`. Currency is not exposed per product. The
//! `position == 1` variant is the storefront default; older stores omit
//! `position`, in which case the first variant is used.
//!
//! Every product object is returned verbatim. Typed fields are filled in when
//! present; a missing `handle` or a numeric `price` never drops the product.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use shadowcrawl_core::PlatformKind;

use super::{image_sources, scalar_string, text_field, PlatformAdapter};
use crate::error::CrawlError;
use crate::origin::store_origin;
use crate::record::RawProductRecord;

/// Page size requested from `products.json`; Shopify's documented maximum.
const PRODUCTS_PAGE_LIMIT: u32 = 250;

/// Price of the storefront's default variant: `position == 1`, else the first.
fn default_price(product: &Value) -> Option<String> {
    let variants = product.get("variants").and_then(Value::as_array)?;
    variants
        .iter()
        .find(|v| v.get("position").and_then(Value::as_i64) == Some(1))
        .or_else(|| variants.first())
        .and_then(|v| scalar_string(v.get("price")))
}

pub struct ShopifyAdapter {
    client: Client,
}

impl ShopifyAdapter {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the `products.json` URL from the store root.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidUrl`] if the store URL has no usable origin.
    fn products_url(store_url: &str) -> Result<String, CrawlError> {
        let origin = store_origin(store_url)?;
        let mut url = reqwest::Url::parse(&format!("{origin}/products.json")).map_err(|e| {
            CrawlError::InvalidUrl {
                url: store_url.to_owned(),
                reason: e.to_string(),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("limit", &PRODUCTS_PAGE_LIMIT.to_string());
        Ok(url.to_string())
    }
}

#[async_trait]
impl PlatformAdapter for ShopifyAdapter {
    fn platform(&self) -> PlatformKind {
        PlatformKind::Shopify
    }

    async fn extract(&self, store_url: &str) -> Result<Vec<RawProductRecord>, CrawlError> {
        let url = Self::products_url(store_url)?;
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let origin = store_origin(store_url)?;
        parse_products(&body, &origin)
    }
}

/// Parses a `products.json` body into records, skipping elements that are
/// not JSON objects.
///
/// # Errors
///
/// Returns [`CrawlError::Parse`] if the body is not JSON or has no
/// `products` array.
fn parse_products(body: &str, origin: &str) -> Result<Vec<RawProductRecord>, CrawlError> {
    let payload: Value =
        serde_json::from_str(body).map_err(|e| CrawlError::Parse {
            context: format!("products.json from {origin}"),
            reason: e.to_string(),
        })?;

    let Some(products) = payload.get("products").and_then(Value::as_array) else {
        return Err(CrawlError::Parse {
            context: format!("products.json from {origin}"),
            reason: "missing \"products\" array".to_owned(),
        });
    };

    let extracted_at = Utc::now();
    let records = products
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            if !raw.is_object() {
                tracing::warn!(origin, index, "skipping non-object shopify product");
                return None;
            }
            Some(RawProductRecord {
                store_id: origin.to_owned(),
                platform: PlatformKind::Shopify,
                source_product_id: scalar_string(raw.get("id")),
                title: text_field(raw, "title").unwrap_or_default(),
                price: default_price(raw),
                currency: None,
                images: image_sources(raw),
                source_url: text_field(raw, "handle")
                    .map(|handle| format!("{origin}/products/{handle}")),
                extracted_at,
                raw: raw.clone(),
            })
        })
        .collect();

    Ok(records)
}
