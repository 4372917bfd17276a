//! Database queries for pricing engine.

use sqlx::PgPool;

use crate::error::AppError;

use super::models::Product;

/// Find a product by id, regardless of owner
pub async fn find_product(pool: &PgPool, product_id: i32) -> Result<Option<Product>, AppError> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT
            id, user_id, name, category, description,
            cost_price, tax_percentage, variable_costs, fixed_costs_allocated,
            sales_channels, additional_fees, desired_margin_percentage,
            is_active, created_at, updated_at
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}
