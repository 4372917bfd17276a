//! Pricing route handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::post,
    Json, Router,
};

use crate::error::Result;
use crate::identity::CallerId;
use crate::AppState;

use super::requests::{PriceSimulationRequest, ProductPriceQuery};
use super::responses::PriceCalculationResponse;
use super::services;

/// Pricing routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/simulation/calculate", post(calculate_simulation))
        .route("/products/:product_id/calculate-price", post(calculate_product_price))
}

/// Price a cost structure without a stored product
async fn calculate_simulation(
    payload: std::result::Result<Json<PriceSimulationRequest>, JsonRejection>,
) -> Result<Json<PriceCalculationResponse>> {
    let Json(request) = payload?;
    request.validate()?;
    let result = services::calculate_from_simulation(request)?;
    Ok(Json(result.into()))
}

/// Price a stored product owned by the caller
async fn calculate_product_price(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    product_id: std::result::Result<Path<i32>, PathRejection>,
    query: std::result::Result<Query<ProductPriceQuery>, QueryRejection>,
) -> Result<Json<PriceCalculationResponse>> {
    let Path(product_id) = product_id?;
    let Query(query) = query?;
    query.validate()?;
    let result = services::calculate_for_product(
        &state.db,
        &state.cache,
        product_id,
        user_id,
        query.premium_factor,
    )
    .await?;
    Ok(Json(result.into()))
}
