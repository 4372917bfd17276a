//! Database models for pricing queries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use super::calculators::{ChannelFee, CostSpecification};

/// Product from products
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub cost_price: Decimal,
    pub tax_percentage: Decimal,
    pub variable_costs: Decimal,
    pub fixed_costs_allocated: Decimal,
    /// JSON array of `{"channel": ..., "fee_percentage": ...}` objects
    pub sales_channels: Option<serde_json::Value>,
    pub additional_fees: Decimal,
    pub desired_margin_percentage: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Check whether the product belongs to the given user
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }

    /// Parse the stored sales channels, preserving their order.
    ///
    /// A missing column or JSON `null` means no channels.
    pub fn sales_channels(&self) -> Result<Vec<ChannelFee>, serde_json::Error> {
        match &self.sales_channels {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()),
        }
    }

    /// Build the cost specification for this product.
    ///
    /// The premium factor is not stored with the product; callers supply it.
    pub fn cost_specification(
        &self,
        premium_factor: Decimal,
    ) -> Result<CostSpecification, serde_json::Error> {
        Ok(CostSpecification {
            cost_price: self.cost_price,
            tax_percentage: self.tax_percentage,
            variable_costs: self.variable_costs,
            fixed_costs_allocated: self.fixed_costs_allocated,
            additional_fees: self.additional_fees,
            desired_margin_percentage: self.desired_margin_percentage,
            premium_factor,
            sales_channels: self.sales_channels()?,
        })
    }
}
