//! Pricing service functions.
//!
//! Thin adapters that gather a [`CostSpecification`] from a request or a stored
//! product and hand it to [`compute_prices`].

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::AppCache;
use crate::error::AppError;

use super::calculators::{compute_prices, CostSpecification, PriceOverflow, PriceResult};
use super::models::Product;
use super::queries;
use super::requests::PriceSimulationRequest;

/// Pricing calculation error types
#[derive(Debug)]
pub enum PricingError {
    ProductNotFound {
        product_id: i32,
    },
    NotOwner {
        product_id: i32,
        user_id: i32,
    },
    InvalidSalesChannels {
        product_id: i32,
        source: serde_json::Error,
    },
    Overflow,
    Lookup(AppError),
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::ProductNotFound { product_id } => {
                write!(f, "Product {} not found", product_id)
            }
            PricingError::NotOwner { product_id, user_id } => {
                write!(f, "User {} may not access product {}", user_id, product_id)
            }
            PricingError::InvalidSalesChannels { product_id, source } => {
                write!(f, "Product {} has malformed sales channels: {}", product_id, source)
            }
            PricingError::Overflow => write!(f, "{}", PriceOverflow),
            PricingError::Lookup(e) => write!(f, "Product lookup failed: {}", e),
        }
    }
}

impl std::error::Error for PricingError {}

impl From<PriceOverflow> for PricingError {
    fn from(_: PriceOverflow) -> Self {
        PricingError::Overflow
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::ProductNotFound { .. } => AppError::NotFound("Product not found".to_string()),
            PricingError::NotOwner { .. } => {
                AppError::Forbidden("You do not have permission to access this product".to_string())
            }
            PricingError::InvalidSalesChannels { product_id, source } => AppError::Internal(
                format!("Product {} has malformed sales channels: {}", product_id, source),
            ),
            PricingError::Overflow => AppError::Validation {
                message: "Prices cannot be calculated for these inputs".to_string(),
                errors: vec![PriceOverflow.to_string()],
            },
            PricingError::Lookup(e) => e,
        }
    }
}

/// Calculate prices straight from a simulation request.
///
/// The request must already be validated.
pub fn calculate_from_simulation(
    request: PriceSimulationRequest,
) -> Result<PriceResult, PricingError> {
    Ok(compute_prices(&request.into_cost_specification())?)
}

/// Calculate prices for a stored product the caller already holds.
pub fn calculate_from_product(
    product: &Product,
    premium_factor: Decimal,
) -> Result<PriceResult, PricingError> {
    let spec: CostSpecification = product
        .cost_specification(premium_factor)
        .map_err(|source| PricingError::InvalidSalesChannels {
            product_id: product.id,
            source,
        })?;

    Ok(compute_prices(&spec)?)
}

/// Look up a product owned by `user_id`, consulting the cache first.
///
/// # Returns
/// The product, `ProductNotFound` if no such id exists, or `NotOwner` if it
/// belongs to another user.
pub async fn load_owned_product(
    pool: &PgPool,
    cache: &AppCache,
    product_id: i32,
    user_id: i32,
) -> Result<Arc<Product>, PricingError> {
    let product = match cache.products.get(&product_id).await {
        Some(cached) => {
            tracing::debug!("Cache HIT for product: {}", product_id);
            cached
        }
        None => {
            tracing::debug!("Cache MISS for product: {}", product_id);
            let product = queries::find_product(pool, product_id)
                .await
                .map_err(PricingError::Lookup)?
                .ok_or(PricingError::ProductNotFound { product_id })?;

            let product = Arc::new(product);
            cache.products.insert(product_id, product.clone()).await;
            product
        }
    };

    if !product.is_owned_by(user_id) {
        tracing::warn!(
            "User {} attempted to price product {} owned by {}",
            user_id,
            product_id,
            product.user_id
        );
        return Err(PricingError::NotOwner { product_id, user_id });
    }

    Ok(product)
}

/// Calculate prices for a stored product on behalf of its owner.
pub async fn calculate_for_product(
    pool: &PgPool,
    cache: &AppCache,
    product_id: i32,
    user_id: i32,
    premium_factor: Decimal,
) -> Result<PriceResult, PricingError> {
    let product = load_owned_product(pool, cache, product_id, user_id).await?;
    let result = calculate_from_product(&product, premium_factor)?;

    tracing::info!(
        "Priced product {}: minimum={} ideal={} premium={}",
        product_id,
        result.minimum_price,
        result.ideal_price,
        result.premium_price
    );

    Ok(result)
}
