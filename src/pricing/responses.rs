//! Response DTOs for pricing API endpoints.
//!
//! Amounts go out as JSON numbers; absent optional fields are `null`.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::{ChannelBreakdown, CostBreakdown, PriceResult};

/// Prices for one sales channel
#[derive(Debug, Serialize)]
pub struct ChannelBreakdownResponse {
    pub channel: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ideal_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub premium_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_per_unit_ideal: Decimal,
}

/// Itemized costs behind a calculation
#[derive(Debug, Serialize)]
pub struct CostBreakdownResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub production_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub variable_costs: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub additional_fees: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_variable_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fixed_costs_allocated: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub desired_margin_percentage: Decimal,
}

/// Response for both simulation and product price calculations
#[derive(Debug, Serialize)]
pub struct PriceCalculationResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ideal_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub premium_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_per_unit_minimum: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_per_unit_ideal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_per_unit_premium: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub break_even_units: Option<Decimal>,
    pub channel_breakdown: Option<Vec<ChannelBreakdownResponse>>,
    pub cost_breakdown: CostBreakdownResponse,
}

impl From<ChannelBreakdown> for ChannelBreakdownResponse {
    fn from(c: ChannelBreakdown) -> Self {
        Self {
            channel: c.channel,
            fee_percentage: c.fee_percentage,
            minimum_price: c.minimum_price,
            ideal_price: c.ideal_price,
            premium_price: c.premium_price,
            profit_per_unit_ideal: c.profit_per_unit_ideal,
        }
    }
}

impl From<CostBreakdown> for CostBreakdownResponse {
    fn from(c: CostBreakdown) -> Self {
        Self {
            production_cost: c.production_cost,
            variable_costs: c.variable_costs,
            additional_fees: c.additional_fees,
            total_variable_cost: c.total_variable_cost,
            fixed_costs_allocated: c.fixed_costs_allocated,
            tax_percentage: c.tax_percentage,
            desired_margin_percentage: c.desired_margin_percentage,
        }
    }
}

impl From<PriceResult> for PriceCalculationResponse {
    fn from(r: PriceResult) -> Self {
        Self {
            minimum_price: r.minimum_price,
            ideal_price: r.ideal_price,
            premium_price: r.premium_price,
            profit_per_unit_minimum: r.profit_per_unit_minimum,
            profit_per_unit_ideal: r.profit_per_unit_ideal,
            profit_per_unit_premium: r.profit_per_unit_premium,
            break_even_units: r.break_even_units,
            channel_breakdown: r
                .channel_breakdown
                .map(|channels| channels.into_iter().map(Into::into).collect()),
            cost_breakdown: r.cost_breakdown.into(),
        }
    }
}
