use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::AppError,
    orders::{
        dto::{CheckoutRequest, MerchantOrderDetails, OrderDetails, StatusChange, UpdateStatusRequest},
        repo::Order,
        services,
    },
    state::AppState,
};

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/checkout", post(checkout))
        .route("/orders/:id", get(order_details))
}

pub fn merchant_routes() -> Router<AppState> {
    Router::new()
        .route("/businesses/:id/orders", get(merchant_orders))
        .route("/businesses/:id/orders/:order_id", get(merchant_order_details))
        .route("/orders/:id/status", put(update_order_status))
}

#[instrument(skip(state, payload))]
pub async fn checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = services::checkout(
        &state.db,
        user.id,
        &payload.shipping_address,
        state.config.tax_rate,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = services::list_orders(&state.db, user.id).await?;
    Ok(Json(orders))
}

#[instrument(skip(state))]
pub async fn order_details(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetails>, AppError> {
    let details = services::order_details(&state.db, user.id, id).await?;
    Ok(Json(details))
}

#[instrument(skip(state))]
pub async fn merchant_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(business_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = services::merchant_orders(&state.db, &user, business_id).await?;
    Ok(Json(orders))
}

#[instrument(skip(state))]
pub async fn merchant_order_details(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((business_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MerchantOrderDetails>, AppError> {
    let details =
        services::merchant_order_details(&state.db, &user, business_id, order_id).await?;
    Ok(Json(details))
}

#[instrument(skip(state, payload))]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<StatusChange>, AppError> {
    let change = services::update_order_status(&state.db, &user, id, payload.status).await?;
    Ok(Json(change))
}
