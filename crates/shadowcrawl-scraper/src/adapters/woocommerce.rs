//! WooCommerce storefronts via the public Store API.
//!
//! `GET /wp-json/wc/store/v1/products?per_page=100` returns a bare JSON array.
//! Prices are integer strings in the currency's minor unit, e.g.
//! `{"price": "1999", "currency_code": "CAD", "currency_minor_unit": 2}` for
//! $19.99.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use shadowcrawl_core::PlatformKind;

use super::{image_sources, scalar_string, text_field, PlatformAdapter};
use crate::error::CrawlError;
use crate::origin::store_origin;
use crate::record::RawProductRecord;

const STORE_API_PATH: &str = "/wp-json/wc/store/v1/products";
const PER_PAGE: u32 = 100;

const DEFAULT_MINOR_UNIT: u32 = 2;

/// Decimal price and currency from a product's `prices` object.
fn product_price(product: &Value) -> (Option<String>, Option<String>) {
    let Some(prices) = product.get("prices").filter(|p| p.is_object()) else {
        return (None, None);
    };
    let minor_unit = prices
        .get("currency_minor_unit")
        .and_then(Value::as_u64)
        .and_then(|unit| u32::try_from(unit).ok())
        .unwrap_or(DEFAULT_MINOR_UNIT);
    let price = scalar_string(prices.get("price"))
        .and_then(|amount| minor_units_to_decimal(&amount, minor_unit));
    (price, text_field(prices, "currency_code"))
}

pub struct WooCommerceAdapter {
    client: Client,
}

impl WooCommerceAdapter {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn products_url(store_url: &str) -> Result<String, CrawlError> {
        let origin = store_origin(store_url)?;
        let mut url = reqwest::Url::parse(&format!("{origin}{STORE_API_PATH}")).map_err(|e| {
            CrawlError::InvalidUrl {
                url: store_url.to_owned(),
                reason: e.to_string(),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("per_page", &PER_PAGE.to_string());
        Ok(url.to_string())
    }
}

#[async_trait]
impl PlatformAdapter for WooCommerceAdapter {
    fn platform(&self) -> PlatformKind {
        PlatformKind::WooCommerce
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

fn parse_products(body: &str, origin: &str) -> Result<Vec<RawProductRecord>, CrawlError> {
    let context = || format!("store API products from {origin}");
    let payload: Value =
        serde_json::from_str(body).map_err(|e| CrawlError::Parse {
            context: context(),
            reason: e.to_string(),
        })?;

    let Some(products) = payload.as_array() else {
        return Err(CrawlError::Parse {
            context: context(),
            reason: "expected a JSON array of products".to_owned(),
        });
    };

    let extracted_at = Utc::now();
    let records = products
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            if !raw.is_object() {
                tracing::warn!(origin, index, "skipping non-object woocommerce product");
                return None;
            }
            let (price, currency) = product_price(raw);
            Some(RawProductRecord {
                store_id: origin.to_owned(),
                platform: PlatformKind::WooCommerce,
                source_product_id: scalar_string(raw.get("id")),
                title: text_field(raw, "name").unwrap_or_default(),
                price,
                currency,
                images: image_sources(raw),
                source_url: text_field(raw, "permalink"),
                extracted_at,
                raw: raw.clone(),
            })
        })
        .collect();

    Ok(records)
}

/// Renders an integer minor-unit amount as a decimal string.
///
/// `("1999", 2)` becomes `"19.99"`, `("5", 2)` becomes `"0.05"`. Returns
/// `None` for anything that is not an optionally negative digit string.
fn minor_units_to_decimal(amount: &str, minor_unit: u32) -> Option<String> {
    let amount = amount.trim();
    let (sign, digits) = match amount.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", amount),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let scale = usize::try_from(minor_unit).ok()?;
    if scale == 0 {
        return Some(format!("{sign}{digits}"));
    }

    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (whole, fraction) = padded.split_at(padded.len() - scale);
    Some(format!("{sign}{whole}.{fraction}"))
}
