use doc_store::tracing::setup_tracing;
use stock_sync::config::Settings;
use stock_sync::model::{CartLineItem, Product, Variant};
use stock_sync::{AttributePruner, Connection, StockAdjuster};
use tracing::{info, warn, Instrument};

fn demo_catalog() -> Vec<Product> {
    vec![
        Product::new("mug", "Enamel Mug", 40),
        Product::with_variants(
            "tee",
            "Logo Tee",
            vec![
                Variant::new("tee-red-s", 10)
                    .attribute("color", "red")
                    .attribute("size", "S"),
                Variant::new("tee-red-m", 12)
                    .attribute("color", "red")
                    .attribute("size", "M"),
                Variant::new("tee-blue-m", 8)
                    .attribute("color", "blue")
                    .attribute("size", "M"),
            ],
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let settings = Settings::load().map_err(|e| e.to_string())?;
    let connection = Connection::open(&settings.store)
        .await
        .map_err(|e| e.to_string())?;
    let products = connection.products();

    if products
        .combination_products()
        .await
        .map_err(|e| e.to_string())?
        .is_empty()
    {
        let count = products
            .insert_products(demo_catalog())
            .await
            .map_err(|e| e.to_string())?;
        info!(count, "Seeded demo catalog");
    }

    let cart = vec![
        CartLineItem::simple("mug", 2),
        CartLineItem::combination("tee", "tee-red-m", 1),
    ];
    let adjuster = StockAdjuster::new(products.clone()).with_policy(settings.catalog.failure_policy);
    let report = async { adjuster.adjust_stock(&cart).await }
        .instrument(tracing::info_span!("order_placed"))
        .await;
    for product in report.applied() {
        info!(product_id = %product.id, stock = product.stock, sales = product.sales, "Stock after order");
    }

    let schema = settings.catalog.schema().map_err(|e| e.to_string())?;
    let pruner = AttributePruner::new(products, schema).with_policy(settings.catalog.failure_policy);
    match pruner.prune_attribute("color", "red".into(), false).await {
        Ok(report) => info!(summary = %report.summary(), "Retired color red"),
        Err(e) => warn!(error = %e, "Prune rejected"),
    }

    connection.close().await.map_err(|e| e.to_string())?;
    info!("Done");
    Ok(())
}
