use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::platform::{PlatformKind, StoreTarget};
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub url: String,
    /// Skips fingerprinting when the platform is already known.
    #[serde(default)]
    pub platform: Option<PlatformKind>,
    #[serde(default)]
    pub neighborhood: Option<String>,
}

impl StoreConfig {
    /// Lowercase ASCII letters and digits joined by single dashes. Spaces and
    /// dashes separate words; any other character is dropped.
    #[must_use]
    pub fn slug(&self) -> String {
        let kept: String = self
            .name
            .chars()
            .filter_map(|c| match c {
                ' ' | '-' => Some('-'),
                c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
                _ => None,
            })
            .collect();
        kept.split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Build the crawl target for this store, keyed by its slug.
    #[must_use]
    pub fn to_target(&self) -> StoreTarget {
        StoreTarget {
            url: self.url.clone(),
            known_platform: self.platform,
            label: self.neighborhood.clone(),
            store_id: Some(self.slug()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
}

impl StoresFile {
    /// Looks up a store by slug.
    #[must_use]
    pub fn find(&self, slug: &str) -> Option<&StoreConfig> {
        self.stores.iter().find(|s| s.slug() == slug)
    }

    #[must_use]
    pub fn targets(&self) -> Vec<StoreTarget> {
        self.stores.iter().map(StoreConfig::to_target).collect()
    }
}

/// Reads and validates a `stores.yaml` file.
///
/// # Errors
///
/// - [`ConfigError::StoresFileIo`] when the file cannot be read.
/// - [`ConfigError::StoresFileParse`] for malformed YAML or an unknown platform.
/// - [`ConfigError::Validation`] for empty or duplicate names, empty or
///   duplicate slugs, or a non-HTTP URL.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_stores(&content)
}

fn parse_stores(content: &str) -> Result<StoresFile, ConfigError> {
    let stores_file: StoresFile = serde_yaml::from_str(content)?;
    validate_stores(&stores_file)?;
    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for store in &stores_file.stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store name must be non-empty".to_string(),
            ));
        }

        let url = store.url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "store '{}' has url '{}'; must start with http:// or https://",
                store.name, store.url
            )));
        }

        let lower_name = store.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate store name: '{}'",
                store.name
            )));
        }

        let slug = store.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "store '{}' has no letters or digits to build a slug from",
                store.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store slug: '{}' (from store '{}')",
                slug, store.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
