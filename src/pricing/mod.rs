//! Pricing engine module.
//!
//! Derives minimum, ideal and premium sale prices from cost structures, taxes,
//! channel fees and desired margins.

pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{
    compute_prices, round_money, ChannelFee, CostSpecification, PriceOverflow, PriceResult,
};
pub use routes::router;
pub use services::PricingError;
