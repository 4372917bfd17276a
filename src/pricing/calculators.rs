//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access.
//! Both the simulation and the product endpoints build a [`CostSpecification`]
//! and funnel it through [`compute_prices`].

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use pricing_service::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Decimal places used for every monetary output.
const MONEY_PLACES: u32 = 2;

fn to_money(amount: Decimal) -> Decimal {
    let rounded = round_money(amount, MONEY_PLACES);
    // -0.00 from tiny negative residues
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Convert percentage points (e.g. `15`) into a fraction (`0.15`).
fn fraction(percentage: Decimal) -> Decimal {
    percentage / Decimal::ONE_HUNDRED
}

/// A sales channel and the percentage it deducts from each sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelFee {
    pub channel: String,
    #[serde(default)]
    pub fee_percentage: Decimal,
}

/// Everything the engine needs to price one unit.
///
/// Percentages are expressed in points (`15` means 15%). Range checks are the
/// caller's job; the engine trusts whatever it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct CostSpecification {
    pub cost_price: Decimal,
    pub tax_percentage: Decimal,
    pub variable_costs: Decimal,
    /// Only used for break-even, never for per-unit pricing.
    pub fixed_costs_allocated: Decimal,
    pub additional_fees: Decimal,
    pub desired_margin_percentage: Decimal,
    pub premium_factor: Decimal,
    /// Empty means no per-channel breakdown.
    pub sales_channels: Vec<ChannelFee>,
}

/// Prices for one sales channel, grossed up for the channel fee.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelBreakdown {
    pub channel: String,
    pub fee_percentage: Decimal,
    pub minimum_price: Decimal,
    pub ideal_price: Decimal,
    pub premium_price: Decimal,
    pub profit_per_unit_ideal: Decimal,
}

/// Itemized cost components considered by the calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub production_cost: Decimal,
    pub variable_costs: Decimal,
    pub additional_fees: Decimal,
    pub total_variable_cost: Decimal,
    pub fixed_costs_allocated: Decimal,
    pub tax_percentage: Decimal,
    pub desired_margin_percentage: Decimal,
}

/// Result of a price calculation. All money values are rounded to 2 places.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceResult {
    pub minimum_price: Decimal,
    pub ideal_price: Decimal,
    pub premium_price: Decimal,
    pub profit_per_unit_minimum: Decimal,
    pub profit_per_unit_ideal: Decimal,
    pub profit_per_unit_premium: Decimal,
    /// `None` when there are no fixed costs or the ideal price makes no profit.
    pub break_even_units: Option<Decimal>,
    /// `None` when no sales channels were given.
    pub channel_breakdown: Option<Vec<ChannelBreakdown>>,
    pub cost_breakdown: CostBreakdown,
}

/// Unrounded base price points shared by the summary and the channel breakdown.
#[derive(Debug, Clone, Copy)]
struct BasePrices {
    minimum: Decimal,
    ideal: Decimal,
    premium: Decimal,
}

/// The calculation left the range `Decimal` can represent.
///
/// Only reachable with enormous costs or percentages a hair below a saturation
/// point (e.g. tax 99.99999999999999%), where the gross-up factor explodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("price calculation exceeds the representable range")]
pub struct PriceOverflow;

fn add(a: Decimal, b: Decimal) -> Result<Decimal, PriceOverflow> {
    a.checked_add(b).ok_or(PriceOverflow)
}

fn sub(a: Decimal, b: Decimal) -> Result<Decimal, PriceOverflow> {
    a.checked_sub(b).ok_or(PriceOverflow)
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, PriceOverflow> {
    a.checked_mul(b).ok_or(PriceOverflow)
}

fn div(a: Decimal, b: Decimal) -> Result<Decimal, PriceOverflow> {
    a.checked_div(b).ok_or(PriceOverflow)
}

/// Profit per unit at `price` under the tax-on-revenue model.
fn profit_at(
    price: Decimal,
    total_variable_cost: Decimal,
    tax: Decimal,
) -> Result<Decimal, PriceOverflow> {
    sub(sub(price, total_variable_cost)?, mul(price, tax)?)
}

/// Calculate minimum, ideal and premium prices for a cost specification.
///
/// Taxes and the desired margin are both taken as a share of the final price:
///
/// * minimum = total cost / (1 - tax)
/// * ideal = total cost / (1 - tax - margin)
/// * premium = ideal * premium factor
///
/// Degenerate denominators never fail. A tax of 100% or more leaves the minimum
/// at total cost, tax plus margin of 100% or more sets the ideal price to twice
/// the minimum, and a channel fee of 100% or more leaves that channel at the
/// base prices.
///
/// Intermediate values keep full precision; rounding happens once, when the
/// result is assembled. The only error is [`PriceOverflow`], returned instead of
/// a panic when an intermediate value leaves the `Decimal` range.
pub fn compute_prices(spec: &CostSpecification) -> Result<PriceResult, PriceOverflow> {
    let total_variable_cost = add(
        add(spec.cost_price, spec.variable_costs)?,
        spec.additional_fees,
    )?;
    let tax = fraction(spec.tax_percentage);

    let minimum = if tax < Decimal::ONE {
        div(total_variable_cost, Decimal::ONE - tax)?
    } else {
        total_variable_cost
    };

    let margin = fraction(spec.desired_margin_percentage);
    let denominator = Decimal::ONE - tax - margin;
    let ideal = if denominator > Decimal::ZERO {
        div(total_variable_cost, denominator)?
    } else {
        mul(minimum, Decimal::TWO)?
    };

    let base = BasePrices {
        minimum,
        ideal,
        premium: mul(ideal, spec.premium_factor)?,
    };

    let profit_minimum = profit_at(base.minimum, total_variable_cost, tax)?;
    let profit_ideal = profit_at(base.ideal, total_variable_cost, tax)?;
    let profit_premium = profit_at(base.premium, total_variable_cost, tax)?;

    // a vanishing profit can overflow Decimal::MAX; treat that as undefined too
    let break_even_units = if spec.fixed_costs_allocated > Decimal::ZERO
        && profit_ideal > Decimal::ZERO
    {
        spec.fixed_costs_allocated
            .checked_div(profit_ideal)
            .map(to_money)
    } else {
        None
    };

    let channel_breakdown = if spec.sales_channels.is_empty() {
        None
    } else {
        Some(
            spec.sales_channels
                .iter()
                .map(|channel| channel_prices(channel, base, total_variable_cost, tax))
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(PriceResult {
        minimum_price: to_money(base.minimum),
        ideal_price: to_money(base.ideal),
        premium_price: to_money(base.premium),
        profit_per_unit_minimum: to_money(profit_minimum),
        profit_per_unit_ideal: to_money(profit_ideal),
        profit_per_unit_premium: to_money(profit_premium),
        break_even_units,
        channel_breakdown,
        cost_breakdown: CostBreakdown {
            production_cost: to_money(spec.cost_price),
            variable_costs: to_money(spec.variable_costs),
            additional_fees: to_money(spec.additional_fees),
            total_variable_cost: to_money(total_variable_cost),
            fixed_costs_allocated: to_money(spec.fixed_costs_allocated),
            tax_percentage: spec.tax_percentage,
            desired_margin_percentage: spec.desired_margin_percentage,
        },
    })
}

/// Gross up the base prices so the seller still nets them after the channel fee.
fn channel_prices(
    channel: &ChannelFee,
    base: BasePrices,
    total_variable_cost: Decimal,
    tax: Decimal,
) -> Result<ChannelBreakdown, PriceOverflow> {
    let fee = fraction(channel.fee_percentage);
    let denominator = Decimal::ONE - fee;

    let prices = if denominator <= Decimal::ZERO {
        base
    } else {
        BasePrices {
            minimum: div(base.minimum, denominator)?,
            ideal: div(base.ideal, denominator)?,
            premium: div(base.premium, denominator)?,
        }
    };

    let profit = sub(
        profit_at(prices.ideal, total_variable_cost, tax)?,
        mul(prices.ideal, fee)?,
    )?;

    Ok(ChannelBreakdown {
        channel: channel.channel.clone(),
        fee_percentage: channel.fee_percentage,
        minimum_price: to_money(prices.minimum),
        ideal_price: to_money(prices.ideal),
        premium_price: to_money(prices.premium),
        profit_per_unit_ideal: to_money(profit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn spec(cost_price: Decimal, tax: Decimal, margin: Decimal) -> CostSpecification {
        CostSpecification {
            cost_price,
            tax_percentage: tax,
            variable_costs: dec!(0),
            fixed_costs_allocated: dec!(0),
            additional_fees: dec!(0),
            desired_margin_percentage: margin,
            premium_factor: dec!(1.3),
            sales_channels: vec![],
        }
    }

    fn channel(name: &str, fee: Decimal) -> ChannelFee {
        ChannelFee {
            channel: name.to_string(),
            fee_percentage: fee,
        }
    }

    fn reference_spec() -> CostSpecification {
        CostSpecification {
            cost_price: dec!(50),
            tax_percentage: dec!(15),
            variable_costs: dec!(5),
            fixed_costs_allocated: dec!(1000),
            additional_fees: dec!(3),
            desired_margin_percentage: dec!(30),
            premium_factor: dec!(1.3),
            sales_channels: vec![],
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(2.25), 1), dec!(2.2));
        assert_eq!(round_money(dec!(2.35), 1), dec!(2.4));
        // exact decimal tie, unlike a binary float
        assert_eq!(round_money(dec!(2.675), 2), dec!(2.68));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(-1.234), 2), dec!(-1.23));
        assert_eq!(round_money(dec!(999999.995), 2), dec!(1000000.00));
    }

    // ==================== compute_prices tests ====================

    #[test]
    fn test_reference_prices() {
        let result = compute_prices(&reference_spec()).unwrap();

        // total variable cost = 50 + 5 + 3 = 58
        assert_eq!(result.cost_breakdown.total_variable_cost, dec!(58));
        assert_eq!(result.minimum_price, dec!(68.24)); // 58 / 0.85
        assert_eq!(result.ideal_price, dec!(105.45)); // 58 / 0.55
        assert_eq!(result.premium_price, dec!(137.09)); // 105.4545... * 1.3
    }

    #[test]
    fn test_reference_profits_and_break_even() {
        let result = compute_prices(&reference_spec()).unwrap();

        assert_eq!(result.profit_per_unit_minimum, dec!(0));
        assert_eq!(result.profit_per_unit_ideal, dec!(31.64));
        assert_eq!(result.profit_per_unit_premium, dec!(58.53));
        // 1000 / 31.6363...
        assert_eq!(result.break_even_units, Some(dec!(31.61)));
        assert!(result.channel_breakdown.is_none());
    }

    #[test]
    fn test_cost_breakdown_passes_percentages_through() {
        let mut input = reference_spec();
        input.tax_percentage = dec!(12.345);
        input.cost_price = dec!(49.999);

        let breakdown = compute_prices(&input).unwrap().cost_breakdown;

        assert_eq!(breakdown.production_cost, dec!(50.00));
        assert_eq!(breakdown.variable_costs, dec!(5));
        assert_eq!(breakdown.additional_fees, dec!(3));
        assert_eq!(breakdown.fixed_costs_allocated, dec!(1000));
        assert_eq!(breakdown.tax_percentage, dec!(12.345));
        assert_eq!(breakdown.desired_margin_percentage, dec!(30));
    }

    #[test]
    fn test_premium_uses_unrounded_ideal() {
        // 58 / 0.55 = 105.4545...; 105.45 * 1.3 would give 137.085 -> 137.08
        let result = compute_prices(&reference_spec()).unwrap();
        assert_eq!(result.premium_price, dec!(137.09));
    }

    #[test]
    fn test_tax_and_margin_saturation_doubles_minimum() {
        // 60% tax + 50% margin >= 100%
        let result = compute_prices(&spec(dec!(40), dec!(60), dec!(50))).unwrap();

        assert_eq!(result.minimum_price, dec!(100)); // 40 / 0.4
        assert_eq!(result.ideal_price, dec!(200));
        assert_eq!(result.ideal_price, result.minimum_price * dec!(2));
        assert_eq!(result.premium_price, dec!(260));
    }

    #[test]
    fn test_tax_and_margin_exactly_one_hundred_uses_fallback() {
        let result = compute_prices(&spec(dec!(40), dec!(60), dec!(40))).unwrap();
        assert_eq!(result.ideal_price, dec!(200));
    }

    #[test]
    fn test_full_tax_passes_cost_through() {
        let mut input = spec(dec!(40), dec!(100), dec!(30));
        input.fixed_costs_allocated = dec!(1000);

        let result = compute_prices(&input).unwrap();

        assert_eq!(result.minimum_price, dec!(40));
        assert_eq!(result.ideal_price, dec!(80));
        // every sale is fully taxed away, so there is no break-even volume
        assert_eq!(result.profit_per_unit_ideal, dec!(-40));
        assert_eq!(result.break_even_units, None);
    }

    #[test]
    fn test_break_even_absent_without_fixed_costs() {
        let mut input = reference_spec();
        input.fixed_costs_allocated = dec!(0);

        let result = compute_prices(&input).unwrap();

        assert_eq!(result.break_even_units, None);
        assert_eq!(result.profit_per_unit_ideal, dec!(31.64));
    }

    #[test]
    fn test_break_even_absent_with_zero_margin() {
        let mut input = spec(dec!(85), dec!(15), dec!(0));
        input.fixed_costs_allocated = dec!(500);

        let result = compute_prices(&input).unwrap();

        assert_eq!(result.minimum_price, dec!(100));
        assert_eq!(result.ideal_price, dec!(100));
        assert_eq!(result.profit_per_unit_ideal, dec!(0));
        assert_eq!(result.break_even_units, None);
    }

    #[test]
    fn test_zero_tax_zero_margin() {
        let result = compute_prices(&spec(dec!(10), dec!(0), dec!(0))).unwrap();

        assert_eq!(result.minimum_price, dec!(10));
        assert_eq!(result.ideal_price, dec!(10));
        assert_eq!(result.premium_price, dec!(13));
        assert_eq!(result.profit_per_unit_premium, dec!(3));
    }

    #[test]
    fn test_channel_markup() {
        // 55 / (1 - 0.15 - 0.30) = 100
        let mut input = spec(dec!(55), dec!(15), dec!(30));
        input.sales_channels = vec![
            channel("Physical store", dec!(0)),
            channel("Marketplace", dec!(15)),
        ];

        let result = compute_prices(&input).unwrap();
        assert_eq!(result.ideal_price, dec!(100));

        let channels = result.channel_breakdown.expect("channels requested");
        assert_eq!(channels.len(), 2);

        let store = &channels[0];
        assert_eq!(store.channel, "Physical store");
        assert_eq!(store.minimum_price, result.minimum_price);
        assert_eq!(store.ideal_price, dec!(100));
        assert_eq!(store.premium_price, dec!(130));
        assert_eq!(store.profit_per_unit_ideal, dec!(30));

        let marketplace = &channels[1];
        assert_eq!(marketplace.channel, "Marketplace");
        assert_eq!(marketplace.fee_percentage, dec!(15));
        assert_eq!(marketplace.minimum_price, dec!(76.12));
        assert_eq!(marketplace.ideal_price, dec!(117.65)); // 100 / 0.85
        assert_eq!(marketplace.premium_price, dec!(152.94));
        // 117.647... - 55 - 15% tax - 15% fee
        assert_eq!(marketplace.profit_per_unit_ideal, dec!(27.35));
    }

    #[test]
    fn test_channel_fee_saturation_uses_base_prices() {
        let mut input = spec(dec!(55), dec!(15), dec!(30));
        input.sales_channels = vec![channel("Consignment", dec!(100))];

        let result = compute_prices(&input).unwrap();
        let channels = result.channel_breakdown.clone().expect("channels requested");

        assert_eq!(channels[0].minimum_price, result.minimum_price);
        assert_eq!(channels[0].ideal_price, result.ideal_price);
        assert_eq!(channels[0].premium_price, result.premium_price);
        // 100 - 55 - 15 - 100
        assert_eq!(channels[0].profit_per_unit_ideal, dec!(-70));
    }

    #[test]
    fn test_channel_order_and_duplicates_preserved() {
        let mut input = reference_spec();
        input.sales_channels = vec![
            channel("Web", dec!(5)),
            channel("Marketplace", dec!(15)),
            channel("Web", dec!(5)),
            channel("Kiosk", dec!(2.5)),
        ];

        let channels = compute_prices(&input)
            .unwrap()
            .channel_breakdown
            .expect("channels requested");

        let names: Vec<&str> = channels.iter().map(|c| c.channel.as_str()).collect();
        assert_eq!(names, vec!["Web", "Marketplace", "Web", "Kiosk"]);
        assert_eq!(channels[0], channels[2]);
    }

    #[test]
    fn test_channel_prices_never_below_base() {
        let mut input = reference_spec();
        input.sales_channels = [dec!(0), dec!(1), dec!(12.5), dec!(50), dec!(99.99)]
            .into_iter()
            .map(|fee| channel("c", fee))
            .collect();

        let result = compute_prices(&input).unwrap();
        for entry in result.channel_breakdown.expect("channels requested") {
            assert!(entry.minimum_price >= result.minimum_price);
            assert!(entry.ideal_price >= result.ideal_price);
            assert!(entry.premium_price >= result.premium_price);
        }
    }

    #[test]
    fn test_empty_channels_mean_no_breakdown() {
        let mut input = reference_spec();
        input.sales_channels = Vec::new();
        assert!(compute_prices(&input).unwrap().channel_breakdown.is_none());
    }

    #[test]
    fn test_price_points_are_ordered() {
        for tax in [dec!(0), dec!(7.5), dec!(15), dec!(40)] {
            for margin in [dec!(0), dec!(10), dec!(30), dec!(59)] {
                for factor in [dec!(1), dec!(1.3), dec!(10)] {
                    let mut input = spec(dec!(19.9), tax, margin);
                    input.variable_costs = dec!(2.35);
                    input.premium_factor = factor;

                    let result = compute_prices(&input).unwrap();
                    assert!(
                        result.minimum_price <= result.ideal_price
                            && result.ideal_price <= result.premium_price,
                        "tax={tax} margin={margin} factor={factor}: {result:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_compute_prices_is_deterministic() {
        let mut input = reference_spec();
        input.sales_channels = vec![channel("Marketplace", dec!(15))];
        let before = input.clone();

        let first = compute_prices(&input).unwrap();
        let second = compute_prices(&input).unwrap();

        assert_eq!(first, second);
        assert_eq!(input, before);
    }

    // ==================== overflow tests ====================

    #[test]
    fn test_overflowing_minimum_price_is_an_error() {
        let input = spec(dec!(10000000000000), dec!(99.99999999999999), dec!(0));
        assert_eq!(compute_prices(&input), Err(PriceOverflow));
    }

    #[test]
    fn test_overflowing_ideal_price_is_an_error() {
        let input = spec(dec!(1000000000000000000), dec!(15), dec!(84.99999999999));
        assert_eq!(compute_prices(&input), Err(PriceOverflow));
    }

    #[test]
    fn test_overflowing_channel_gross_up_is_an_error() {
        let mut input = spec(dec!(1000000000000000000000000), dec!(0), dec!(0));
        assert!(compute_prices(&input).is_ok());

        input.sales_channels = vec![channel("Web", dec!(5)), channel("Thin", dec!(99.99999))];
        assert_eq!(compute_prices(&input), Err(PriceOverflow));
    }

    #[test]
    fn test_large_but_representable_costs_still_price() {
        let input = spec(dec!(100000000000000000000), dec!(15), dec!(30));
        let result = compute_prices(&input).unwrap();
        assert_eq!(result.ideal_price, dec!(181818181818181818181.82));
        assert!(result.premium_price > result.ideal_price);
    }
}
