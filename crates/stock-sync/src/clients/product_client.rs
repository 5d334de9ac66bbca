//! # Product Client
//!
//! Provides a high‑level API for the `Product` collection.
//! It wraps a `CollectionClient<Product>` and exposes domain‑specific methods.
use crate::model::{Product, ProductId};
use crate::product_store::{
    ProductError, ProductFilter, ProductUpdate, StockIncrement, VariantPredicate,
};
use async_trait::async_trait;
use doc_store::{CollectionClient, CollectionHandle, ReturnDocument, StoreError, UpdateResult};
use tracing::{debug, instrument};

/// Client for the Product collection.
#[derive(Clone)]
pub struct ProductClient {
    inner: CollectionClient<Product>,
}

impl ProductClient {
    pub fn new(inner: CollectionClient<Product>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CollectionHandle<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &CollectionClient<Product> {
        &self.inner
    }

    /// Recovers the [`ProductError`] raised by [`Product`]'s update logic;
    /// anything else is a store failure.
    fn map_error(e: StoreError) -> Self::Error {
        match e {
            StoreError::DocumentError(source) => match source.downcast::<ProductError>() {
                Ok(product_error) => *product_error,
                Err(other) => ProductError::StoreError(other.to_string()),
            },
            other => ProductError::StoreError(other.to_string()),
        }
    }
}

impl ProductClient {
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn insert_products(&self, products: Vec<Product>) -> Result<usize, ProductError> {
        debug!("Sending request");
        self.inner
            .insert_many(products)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, ProductError> {
        self.find_one(ProductFilter::Id(id)).await
    }

    /// Every product flagged `isCombination`, in insertion order.
    #[instrument(skip(self))]
    pub async fn combination_products(&self) -> Result<Vec<Product>, ProductError> {
        self.find(ProductFilter::Combination).await
    }

    /// The whole collection, in insertion order.
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Vec<Product>, ProductError> {
        self.find(ProductFilter::All).await
    }

    /// Applies a sale to the first product matching `filter`.
    ///
    /// Returns the product as stored after the update, or `None` when nothing
    /// matched.
    #[instrument(skip(self))]
    pub async fn record_sale(
        &self,
        filter: ProductFilter,
        increment: StockIncrement,
    ) -> Result<Option<Product>, ProductError> {
        debug!("Sending request");
        self.inner
            .find_one_and_update(
                filter,
                ProductUpdate::Increment(increment),
                ReturnDocument::After,
            )
            .await
            .map_err(Self::map_error)
    }

    /// Removes the variants matched by `predicate` from one product.
    #[instrument(skip(self))]
    pub async fn pull_variants(
        &self,
        id: ProductId,
        predicate: VariantPredicate,
    ) -> Result<UpdateResult, ProductError> {
        debug!("Sending request");
        self.inner
            .update_one(ProductFilter::Id(id), ProductUpdate::PullVariants(predicate))
            .await
            .map_err(Self::map_error)
    }

    /// Removes the variants matched by `predicate` from every combination
    /// product in a single request.
    #[instrument(skip(self))]
    pub async fn pull_variants_everywhere(
        &self,
        predicate: VariantPredicate,
    ) -> Result<UpdateResult, ProductError> {
        debug!("Sending request");
        self.inner
            .update_many(
                ProductFilter::Combination,
                ProductUpdate::PullVariants(predicate),
            )
            .await
            .map_err(Self::map_error)
    }

    pub async fn ping(&self) -> Result<(), ProductError> {
        self.inner.ping().await.map_err(Self::map_error)
    }

    /// Stops the collection task, even while other clones are alive.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), ProductError> {
        self.inner.shutdown().await.map_err(Self::map_error)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
