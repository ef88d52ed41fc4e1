use anyhow::{Context, Result};
use catalog_admin::config::AppConfig;
use catalog_admin::logic::IntegrityChecker;
use catalog_admin::store::PostgresStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    println!("Catalog reference check");

    let config = AppConfig::load()?;
    let database_url = config.database_url();

    println!("Connecting to database...");
    let store = PostgresStore::new(&database_url, config.max_connections())
        .await
        .context("Failed to connect to database")?;
    println!("Connected to database. Checking references...");

    let report = IntegrityChecker::check(&store)
        .await
        .context("Failed to check references")?;
    store.close().await;

    println!(
        "Checked {} collections, {} categories, {} products",
        report.collections_checked, report.categories_checked, report.products_checked
    );

    if report.is_clean() {
        println!("No dangling references");
        return Ok(());
    }

    println!("\nFound {} dangling references:", report.dangling.len());
    for dangling in &report.dangling {
        println!(
            "  {:?} {} {} -> {} (missing)",
            dangling.owner_kind, dangling.owner_id, dangling.field, dangling.missing_id
        );
    }

    std::process::exit(1);
}
