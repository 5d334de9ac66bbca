use stock_sync::clients::ProductClient;
use stock_sync::config::StoreConfig;
use stock_sync::model::{AttributeValue, CartLineItem, Product, ProductId, Variant};
use stock_sync::product_store::{AttributeSchema, ProductError};
use stock_sync::{AttributePruner, Connection, FailurePolicy, ItemOutcome, StockAdjuster};

fn tee() -> Product {
    Product::with_variants(
        "tee",
        "Logo Tee",
        vec![
            Variant::new("tee-red-s", 10)
                .attribute("color", "red")
                .attribute("size", "S"),
            Variant::new("tee-red-m", 10)
                .attribute("color", "red")
                .attribute("size", "M"),
            Variant::new("tee-blue-l", 10)
                .attribute("color", "blue")
                .attribute("size", "L"),
        ],
    )
}

fn cap() -> Product {
    Product::with_variants(
        "cap",
        "Cap",
        vec![
            Variant::new("cap-red", 5).attribute("color", "red"),
            Variant::new("cap-plain", 5),
        ],
    )
}

/// A product that has variants but is not flagged as a combination.
fn poster() -> Product {
    let mut poster = Product::with_variants(
        "poster",
        "Poster",
        vec![Variant::new("poster-red", 3).attribute("color", "red")],
    );
    poster.is_combination = false;
    poster
}

async fn open_catalog() -> (Connection, ProductClient) {
    let connection = Connection::open(&StoreConfig::default())
        .await
        .expect("Failed to open connection");
    let products = connection.products();
    products
        .insert_products(vec![
            Product::new("mug", "Mug", 40),
            Product::new("bowl", "Bowl", 10),
            tee(),
            cap(),
            poster(),
        ])
        .await
        .expect("Failed to seed catalog");
    (connection, products)
}

async fn product(products: &ProductClient, id: &str) -> Product {
    products
        .get_product(ProductId::from(id))
        .await
        .expect("Failed to get product")
        .expect("Product not found")
}

fn pruner(products: &ProductClient) -> AttributePruner {
    AttributePruner::new(
        products.clone(),
        AttributeSchema::new(["color", "size"]).unwrap(),
    )
}

fn variant_ids(product: &Product) -> Vec<&str> {
    product
        .variants
        .iter()
        .map(|v| v.product_id.as_str())
        .collect()
}

#[tokio::test]
async fn test_simple_items_move_stock_and_sales_by_summed_quantity() {
    let (connection, products) = open_catalog().await;
    let adjuster = StockAdjuster::new(products.clone());

    let report = adjuster
        .adjust_stock(&[
            CartLineItem::simple("mug", 2),
            CartLineItem::simple("bowl", 1),
            CartLineItem::simple("mug", 3),
        ])
        .await;

    assert!(report.is_complete());
    assert_eq!(report.summary().applied, 3);
    // Applied items carry the document as stored after their own update.
    let stocks: Vec<i64> = report.applied().map(|p| p.stock).collect();
    assert_eq!(stocks, vec![38, 9, 35]);

    let mug = product(&products, "mug").await;
    assert_eq!((mug.stock, mug.sales), (35, 5));
    let bowl = product(&products, "bowl").await;
    assert_eq!((bowl.stock, bowl.sales), (9, 1));

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_combination_item_decrements_its_variant() {
    let (connection, products) = open_catalog().await;

    let report = StockAdjuster::new(products.clone())
        .adjust_stock(&[CartLineItem::combination("tee", "tee-red-m", 4)])
        .await;
    assert!(report.is_complete());

    let tee = product(&products, "tee").await;
    assert_eq!(tee.stock, 26);
    assert_eq!(tee.sales, 4);
    assert_eq!(tee.variant("tee-red-m").unwrap().quantity, 6);
    assert_eq!(tee.variant("tee-red-s").unwrap().quantity, 10);

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_unknown_variant_leaves_product_untouched() {
    let (connection, products) = open_catalog().await;

    let mut no_variant = CartLineItem::combination("tee", "ignored", 1);
    no_variant.variant = None;
    let report = StockAdjuster::new(products.clone())
        .adjust_stock(&[CartLineItem::combination("tee", "tee-green-xl", 2), no_variant])
        .await;

    assert_eq!(report.items[0].outcome, ItemOutcome::Unmatched);
    assert_eq!(report.items[1].outcome, ItemOutcome::Unmatched);
    assert!(report.is_complete());
    assert_eq!(product(&products, "tee").await, tee());

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_failing_item_stops_the_rest_of_the_cart() {
    let connection = Connection::open(&StoreConfig::default()).await.unwrap();
    let products = connection.products();
    let mut saturated = Product::new("saturated", "Saturated", 1);
    saturated.sales = i64::MAX;
    products
        .insert_products(vec![
            Product::new("a", "A", 5),
            saturated,
            Product::new("c", "C", 5),
        ])
        .await
        .unwrap();

    let cart = [
        CartLineItem::simple("a", 1),
        CartLineItem::simple("saturated", 1),
        CartLineItem::simple("c", 1),
    ];
    let report = StockAdjuster::new(products.clone()).adjust_stock(&cart).await;

    assert!(matches!(report.items[0].outcome, ItemOutcome::Applied(_)));
    assert_eq!(
        report.items[1].outcome,
        ItemOutcome::Failed(ProductError::CounterOverflow {
            product: "saturated".into(),
            field: "sales",
        })
    );
    assert_eq!(report.items[2].outcome, ItemOutcome::Skipped);
    assert_eq!(product(&products, "a").await.stock, 4);
    assert_eq!(product(&products, "saturated").await.stock, 1);
    assert_eq!(product(&products, "c").await.stock, 5);

    // The same cart under ContinueOnError reaches the last item.
    let report = StockAdjuster::new(products.clone())
        .with_policy(FailurePolicy::ContinueOnError)
        .adjust_stock(&cart)
        .await;
    assert!(matches!(report.items[2].outcome, ItemOutcome::Applied(_)));
    assert_eq!(product(&products, "c").await.stock, 4);

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_prune_single_value() {
    let (connection, products) = open_catalog().await;

    let report = pruner(&products)
        .prune_attribute("color", "red".into(), false)
        .await
        .unwrap();

    assert!(report.is_complete());
    // tee and cap, in insertion order; poster is not a combination product.
    let ids: Vec<&str> = report.items.iter().map(|i| i.product_id.0.as_str()).collect();
    assert_eq!(ids, vec!["tee", "cap"]);

    assert_eq!(variant_ids(&product(&products, "tee").await), vec!["tee-blue-l"]);
    assert_eq!(variant_ids(&product(&products, "cap").await), vec!["cap-plain"]);
    assert_eq!(product(&products, "poster").await, poster());
    assert_eq!(product(&products, "mug").await.stock, 40);

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_prune_set_of_values() {
    let (connection, products) = open_catalog().await;

    let report = pruner(&products)
        .prune_attribute("size", vec!["S", "M"].into(), true)
        .await
        .unwrap();

    let modified: u64 = report.applied().map(|r| r.modified_count).sum();
    assert_eq!(modified, 1);
    assert_eq!(variant_ids(&product(&products, "tee").await), vec!["tee-blue-l"]);
    // cap variants carry no size and survive.
    assert_eq!(product(&products, "cap").await, cap());

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_prune_compares_numbers_by_value() {
    let connection = Connection::open(&StoreConfig::default()).await.unwrap();
    let products = connection.products();
    products
        .insert_products(vec![Product::with_variants(
            "shoe",
            "Shoe",
            vec![
                Variant::new("shoe-40", 1).attribute("size", 40.0f64),
                Variant::new("shoe-41", 1).attribute("size", 41i64),
                Variant::new("shoe-40-text", 1).attribute("size", "40"),
            ],
        )])
        .await
        .unwrap();

    let report = pruner(&products)
        .prune_attribute("size", AttributeValue::Integer(40).into(), false)
        .await
        .unwrap();

    assert_eq!(report.applied().map(|r| r.modified_count).sum::<u64>(), 1);
    assert_eq!(
        variant_ids(&product(&products, "shoe").await),
        vec!["shoe-41", "shoe-40-text"]
    );
    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_bulk_prune_matches_per_product_prune() {
    let (connection, products) = open_catalog().await;

    let result = pruner(&products)
        .prune_attribute_bulk("color", "red".into(), false)
        .await
        .unwrap();

    assert_eq!(result.matched_count, 2);
    assert_eq!(result.modified_count, 2);
    assert_eq!(variant_ids(&product(&products, "tee").await), vec!["tee-blue-l"]);
    assert_eq!(product(&products, "poster").await, poster());

    // Nothing left to remove.
    let again = pruner(&products)
        .prune_attribute_bulk("color", "red".into(), false)
        .await
        .unwrap();
    assert_eq!(again.modified_count, 0);

    connection.close().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_carts_lose_no_decrements() {
    let (connection, products) = open_catalog().await;
    let adjuster = StockAdjuster::new(products.clone());

    let mut handles = vec![];
    for _ in 0..25 {
        let adjuster = adjuster.clone();
        handles.push(tokio::spawn(async move {
            adjuster
                .adjust_stock(&[
                    CartLineItem::simple("mug", 1),
                    CartLineItem::combination("tee", "tee-blue-l", 1),
                ])
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_complete());
    }

    let mug = product(&products, "mug").await;
    assert_eq!((mug.stock, mug.sales), (15, 25));
    let tee = product(&products, "tee").await;
    assert_eq!((tee.stock, tee.sales), (5, 25));
    // No floor: the variant goes negative.
    assert_eq!(tee.variant("tee-blue-l").unwrap().quantity, -15);

    connection.close().await.unwrap();
}
