//! Catalog seeding from YAML.
//!
//! The built-in catalog ships with the binary (`data/catalog.yaml`). A
//! different file can replace it via `STOREFRONT_CATALOG_PATH` or
//! `aviator-cli seed catalog --file`.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use aviator_core::NewProduct;

use super::{CatalogRepository, RepositoryError};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.yaml");

/// One catalog entry: product fields plus the creation time to stamp.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    #[serde(flatten)]
    pub product: NewProduct,
    /// Defaults to the time of seeding when omitted.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Parse a catalog document.
///
/// # Errors
///
/// Returns `SeedError::Parse` if the YAML does not describe a product list.
pub fn parse_catalog(yaml: &str) -> Result<Vec<SeedProduct>, SeedError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// The catalog compiled into the binary.
///
/// # Errors
///
/// Returns `SeedError::Parse` if the embedded file is malformed.
pub fn builtin_catalog() -> Result<Vec<SeedProduct>, SeedError> {
    parse_catalog(BUILTIN_CATALOG)
}

/// Read a catalog from disk.
///
/// # Errors
///
/// Returns `SeedError::Read` if the file cannot be read, or
/// `SeedError::Parse` if its contents are malformed.
pub async fn load_catalog_file(path: &Path) -> Result<Vec<SeedProduct>, SeedError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
    parse_catalog(&content)
}

/// The file at `path` when given, otherwise the built-in catalog.
///
/// # Errors
///
/// See [`load_catalog_file`] and [`builtin_catalog`].
pub async fn load_catalog(path: Option<&Path>) -> Result<Vec<SeedProduct>, SeedError> {
    match path {
        Some(path) => load_catalog_file(path).await,
        None => builtin_catalog(),
    }
}

/// Insert every entry in order, so ids follow file order.
///
/// Returns the number of products inserted.
///
/// # Errors
///
/// Stops at the first repository failure.
pub async fn seed_catalog<R>(repo: &R, catalog: Vec<SeedProduct>) -> Result<usize, SeedError>
where
    R: CatalogRepository + ?Sized,
{
    let count = catalog.len();
    for entry in catalog {
        let created_at = entry.created_at.unwrap_or_else(Utc::now);
        repo.insert_product(entry.product, created_at).await?;
    }
    info!(products = count, "Catalog seeded");
    Ok(count)
}
