// Catalog scoring CLI
//
// Purpose: Score a product catalog against a location CSV and print the table
// Usage: cargo run --bin score_catalog -- [MARKET_CSV] [PRODUCTS_JSON]
//
// Arguments fall back to the MARKET_CSV / PRODUCTS_JSON environment variables;
// ENGINE_CONFIG optionally points at a JSON engine config.

use anyhow::{Context, Result};
use product_fit_scorer::store::StoredProduct;
use product_fit_scorer::{
    load_location_csv, sort_scores, AppState, CatalogScorer, EngineConfig, Product, SortColumn, SortDirection,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_fit_scorer=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let market_csv = args.next().or_else(|| std::env::var("MARKET_CSV").ok()).map(PathBuf::from);
    let products_json = args.next().or_else(|| std::env::var("PRODUCTS_JSON").ok()).map(PathBuf::from);

    let config = match std::env::var("ENGINE_CONFIG") {
        Ok(path) => EngineConfig::load(Path::new(&path))?,
        Err(_) => EngineConfig::DEFAULT,
    };

    let mut state = AppState::new();

    match &market_csv {
        Some(path) => {
            let market = load_location_csv(path)?;
            state.set_current_mix_with_totals(market.region_mix, market.country_totals);
        }
        None => tracing::info!("No location CSV given, using default mixes without population weighting"),
    }

    if let Some(path) = &products_json {
        state.products = load_products(path)?;
        tracing::info!("Loaded {} products from {:?}", state.products.len(), path);
    }

    let scorer = CatalogScorer::new(config);
    let Some(mut scores) = scorer.score_all(&state) else {
        anyhow::bail!("Customer mixes must sum to 100% in every region before scoring");
    };
    sort_scores(&mut scores, SortColumn::Category, SortDirection::Ascending);

    println!();
    println!("{:<22} {:<40} {:>8} {:>12} {:>9}", "Category", "Product", "Attach", "Penetration", "Coverage");
    println!("{}", "-".repeat(95));
    for score in &scores {
        let coverage = score
            .coverage
            .map(|c| format!("{:.1}%", c.base))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<22} {:<40} {:>7.1}% {:>11.1}% {:>9}",
            score.category,
            score.name,
            score.display_attach(),
            score.display_penetration(),
            coverage
        );
    }
    println!();

    Ok(())
}

fn load_products(path: &Path) -> Result<Vec<Product>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read products file: {:?}", path))?;

    let stored: Vec<StoredProduct> = serde_json::from_str(&contents)
        .with_context(|| "Failed to parse products JSON (expected an array of products)")?;

    Ok(stored.into_iter().map(StoredProduct::into_product).collect())
}
