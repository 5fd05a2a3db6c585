//! Aviator CLI - Database migrations, catalog seeding and a terminal cart.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! aviator-cli migrate
//!
//! # Load the built-in catalog (or a YAML file) into PostgreSQL
//! aviator-cli seed catalog
//! aviator-cli seed catalog --file catalog.yaml
//!
//! # Drive a cart mirrored to .aviator/cart.json
//! aviator-cli cart add 1 --size M --color brown
//! aviator-cli cart show
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed catalog` - Seed the product catalog
//! - `cart` - Inspect and mutate a file-backed cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod storage;

#[derive(Parser)]
#[command(name = "aviator-cli")]
#[command(author, version, about = "Aviator Store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Inspect and mutate a cart stored on disk
    Cart {
        /// Directory holding the cart mirror
        #[arg(long, default_value = ".aviator", global = true)]
        dir: PathBuf,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the product catalog
    Catalog {
        /// YAML catalog to load instead of the built-in one
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Seed even if the catalog already has products
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show line items and the checkout summary
    Show,
    /// Add a catalog product
    Add {
        /// Catalog product id
        product_id: u32,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[arg(short, long)]
        size: Option<String>,

        #[arg(short, long)]
        color: Option<String>,

        /// YAML catalog to look the product up in
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Remove every line for a product
    Remove { product_id: String },
    /// Add one unit to a product's line
    Increment { product_id: String },
    /// Remove one unit from a product's line
    Decrement { product_id: String },
    /// Set the quantity of a product's line
    Set { product_id: String, quantity: u32 },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, force } => {
                commands::seed::catalog(file.as_deref(), force).await?;
            }
        },
        Commands::Cart { dir, action } => {
            let mut cart = commands::cart::open(&dir);
            match action {
                CartAction::Show => {}
                CartAction::Add {
                    product_id,
                    quantity,
                    size,
                    color,
                    catalog,
                } => {
                    let catalog =
                        aviator_storefront::db::seed::load_catalog(catalog.as_deref()).await?;
                    let item =
                        commands::cart::line_item(&catalog, product_id, quantity, size, color)?;
                    cart.add_item(item)?;
                }
                CartAction::Remove { product_id } => cart.remove_item(&product_id)?,
                CartAction::Increment { product_id } => cart.increment_item(&product_id)?,
                CartAction::Decrement { product_id } => cart.decrement_item(&product_id)?,
                CartAction::Set {
                    product_id,
                    quantity,
                } => cart.update_item_quantity(&product_id, quantity)?,
                CartAction::Clear => cart.clear_cart()?,
            }
            commands::cart::show(&cart)?;
        }
    }
    Ok(())
}
