//! Request DTOs for pricing API endpoints.
//!
//! The engine trusts its inputs, so every range rule lives here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::error::AppError;

use super::calculators::{ChannelFee, CostSpecification};

const MAX_CHANNEL_NAME_CHARS: usize = 100;

fn default_margin() -> Decimal {
    dec!(30)
}

fn default_premium_factor() -> Decimal {
    dec!(1.3)
}

/// A sales channel in the request
#[derive(Debug, Clone, Deserialize)]
pub struct SalesChannelRequest {
    pub channel: String,
    #[serde(default)]
    pub fee_percentage: Decimal,
}

/// Request to simulate pricing without a stored product
#[derive(Debug, Clone, Deserialize)]
pub struct PriceSimulationRequest {
    pub cost_price: Decimal,
    #[serde(default)]
    pub tax_percentage: Decimal,
    #[serde(default)]
    pub variable_costs: Decimal,
    #[serde(default)]
    pub fixed_costs_allocated: Decimal,
    #[serde(default)]
    pub sales_channels: Option<Vec<SalesChannelRequest>>,
    #[serde(default)]
    pub additional_fees: Decimal,
    #[serde(default = "default_margin")]
    pub desired_margin_percentage: Decimal,
    #[serde(default = "default_premium_factor")]
    pub premium_factor: Decimal,
}

/// Query string for pricing a stored product
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPriceQuery {
    #[serde(default = "default_premium_factor")]
    pub premium_factor: Decimal,
}

impl Default for ProductPriceQuery {
    fn default() -> Self {
        Self {
            premium_factor: default_premium_factor(),
        }
    }
}

/// Collects every rule violation instead of stopping at the first one
#[derive(Default)]
struct Violations(Vec<String>);

impl Violations {
    fn positive(&mut self, field: &str, value: Decimal) {
        if value <= Decimal::ZERO {
            self.0.push(format!("{}: must be greater than 0", field));
        }
    }

    fn non_negative(&mut self, field: &str, value: Decimal) {
        if value < Decimal::ZERO {
            self.0.push(format!("{}: must be greater than or equal to 0", field));
        }
    }

    fn within(&mut self, field: &str, value: Decimal, min: Decimal, max: Decimal) {
        if value < min || value > max {
            self.0.push(format!("{}: must be between {} and {}", field, min, max));
        }
    }

    fn into_result(self, message: &str) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation {
                message: message.to_string(),
                errors: self.0,
            })
        }
    }
}

impl SalesChannelRequest {
    fn check(&self, index: usize, violations: &mut Violations) {
        let name_chars = self.channel.chars().count();
        if name_chars == 0 || name_chars > MAX_CHANNEL_NAME_CHARS {
            violations.0.push(format!(
                "sales_channels[{}].channel: must be 1 to {} characters",
                index, MAX_CHANNEL_NAME_CHARS
            ));
        }
        violations.within(
            &format!("sales_channels[{}].fee_percentage", index),
            self.fee_percentage,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        );
    }
}

impl PriceSimulationRequest {
    /// Check every field against its documented range
    pub fn validate(&self) -> Result<(), AppError> {
        let mut violations = Violations::default();

        violations.positive("cost_price", self.cost_price);
        violations.within("tax_percentage", self.tax_percentage, Decimal::ZERO, Decimal::ONE_HUNDRED);
        violations.non_negative("variable_costs", self.variable_costs);
        violations.non_negative("fixed_costs_allocated", self.fixed_costs_allocated);
        violations.non_negative("additional_fees", self.additional_fees);
        violations.within(
            "desired_margin_percentage",
            self.desired_margin_percentage,
            Decimal::ZERO,
            Decimal::ONE_THOUSAND,
        );
        violations.within("premium_factor", self.premium_factor, Decimal::ONE, Decimal::TEN);

        for (index, channel) in self.sales_channels.iter().flatten().enumerate() {
            channel.check(index, &mut violations);
        }

        violations.into_result("Invalid price simulation request")
    }

    /// Convert into the engine's input, keeping channel order
    pub fn into_cost_specification(self) -> CostSpecification {
        CostSpecification {
            cost_price: self.cost_price,
            tax_percentage: self.tax_percentage,
            variable_costs: self.variable_costs,
            fixed_costs_allocated: self.fixed_costs_allocated,
            additional_fees: self.additional_fees,
            desired_margin_percentage: self.desired_margin_percentage,
            premium_factor: self.premium_factor,
            sales_channels: self
                .sales_channels
                .unwrap_or_default()
                .into_iter()
                .map(|c| ChannelFee {
                    channel: c.channel,
                    fee_percentage: c.fee_percentage,
                })
                .collect(),
        }
    }
}

impl ProductPriceQuery {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut violations = Violations::default();
        violations.within("premium_factor", self.premium_factor, Decimal::ONE, Decimal::TEN);
        violations.into_result("Invalid product price request")
    }
}
