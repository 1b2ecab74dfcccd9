//! Operator entry points: run migrations, trigger a sync pass.
//!
//! `sync` shares the orchestration (and the preserve-on-resync counter
//! policy) with the server's sync route and nightly job; re-running after a
//! failure is always safe.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "vitrine-cli")]
#[command(about = "Vitrine command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations.
    Migrate,
    /// Sync products from the configured Shopify store into the catalog.
    Sync {
        /// Restrict the sync to a single vendor (server-side filter).
        #[arg(long)]
        vendor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = vitrine_core::load_app_config()?;

    let pool_config = vitrine_db::PoolConfig::from_app_config(&config);
    let pool = vitrine_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Migrate => {
            let applied = vitrine_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Sync { vendor } => {
            let shopify = config.shopify_config().ok_or_else(|| {
                anyhow::anyhow!(
                    "VITRINE_SHOPIFY_SHOP_DOMAIN and VITRINE_SHOPIFY_ACCESS_TOKEN must be set to sync"
                )
            })?;
            let client = vitrine_shopify::ShopifyClient::new(&shopify)?;

            match vitrine_shopify::sync_products(&pool, &client, vendor.as_deref()).await {
                Ok(report) => println!("sync complete: {} product(s) synced", report.synced),
                Err(e) => {
                    // Partial progress is retained; the upsert is idempotent,
                    // so the fix is to re-run.
                    tracing::error!(synced = e.synced(), error = %e, "sync aborted");
                    anyhow::bail!("sync aborted after {} product(s): {e}", e.synced());
                }
            }
        }
    }

    Ok(())
}
