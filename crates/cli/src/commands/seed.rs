//! Seed the storefront database with the product catalog.
//!
//! Reads the catalog YAML (the built-in one unless a file is given, or
//! `STOREFRONT_CATALOG_PATH` is set) and inserts every product in file
//! order, so ids follow the file.

use std::path::Path;

use tracing::{info, warn};

use aviator_storefront::config::StorefrontConfig;
use aviator_storefront::db::{self, CatalogRepository, PgStore, seed};

/// Seed the catalog into `PostgreSQL`.
///
/// Refuses to run against a non-empty catalog unless `force` is set, since
/// a second run would insert every product again.
///
/// # Errors
///
/// Returns an error if no database is configured, the catalog cannot be
/// read, or an insert fails.
pub async fn catalog(file: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let database_url = config
        .database_url
        .as_ref()
        .ok_or("STOREFRONT_DATABASE_URL not set")?;

    // Read and parse the catalog before connecting to the database
    let path = file.or(config.catalog_path.as_deref());
    let products = seed::load_catalog(path).await?;
    info!(
        products = products.len(),
        source = %path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        "Parsed catalog"
    );

    let pool = db::create_pool(database_url).await?;
    info!("Connected to database");
    let store = PgStore::new(pool);

    let existing = store.get_products(None).await?.len();
    if existing > 0 {
        if !force {
            return Err(format!(
                "catalog already has {existing} products; pass --force to seed anyway"
            )
            .into());
        }
        warn!(existing, "Seeding into a non-empty catalog");
    }

    let inserted = seed::seed_catalog(&store, products).await?;
    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    Ok(())
}
