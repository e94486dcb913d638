use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{patch, post};
use axum::Json;
use axum::Router;
use tracing::debug;

use crate::error::AppError;
use crate::models::order::{
    Coordinates, CreateOrderRequest, ListOrdersQuery, Order, OrderStatus, TakeOrderRequest,
    TakeOrderResponse,
};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", patch(take_order))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<Order>, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected create order body");
        AppError::InvalidRequest
    })?;

    let origin = Coordinates::from_pair(&payload.origin).ok_or(AppError::InvalidRequest)?;
    let destination =
        Coordinates::from_pair(&payload.destination).ok_or(AppError::InvalidRequest)?;

    let order = state.orders.create_order(&origin, &destination).await?;
    Ok(Json(order))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, AppError> {
    let Query(query) = query.map_err(|rejection| {
        debug!(error = %rejection, "rejected list orders query");
        AppError::InvalidQuery
    })?;

    let page = u32::try_from(query.page.unwrap_or(0)).map_err(|_| AppError::InvalidQuery)?;
    let limit = u32::try_from(query.limit.unwrap_or(0)).map_err(|_| AppError::InvalidQuery)?;

    let orders = state.orders.get_orders(page, limit).await?;
    Ok(Json(orders))
}

async fn take_order(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TakeOrderRequest>, JsonRejection>,
) -> Result<Json<TakeOrderResponse>, AppError> {
    let Path(id) = id.map_err(|_| AppError::InvalidRequest)?;
    let Json(payload) = payload.map_err(|_| AppError::InvalidRequest)?;

    if payload.status.parse::<OrderStatus>() != Ok(OrderStatus::Taken) {
        return Err(AppError::InvalidRequest);
    }

    state.orders.take_order(id).await?;
    Ok(Json(TakeOrderResponse::success()))
}
