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
    cart::{
        dto::{AddToCartRequest, CartView, UpdateCartItemRequest, UpdateCartResponse},
        repo::{CartItem, CartLine},
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(view_cart).delete(clear_cart))
        .route("/cart/items", post(add_to_cart))
        .route(
            "/cart/items/:id",
            put(update_cart_item).delete(remove_from_cart),
        )
}

#[instrument(skip(state))]
pub async fn view_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<CartView>, AppError> {
    let items = CartLine::list_for_user(&state.db, user.id).await?;
    let totals = services::line_totals(&items, state.config.tax_rate);
    Ok(Json(CartView { items, totals }))
}

#[instrument(skip(state, payload))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItem>), AppError> {
    let item =
        services::add_to_cart(&state.db, user.id, payload.product_id, payload.quantity).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, payload))]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<UpdateCartResponse>, AppError> {
    let response = match services::update_item(&state.db, user.id, id, payload.quantity).await? {
        Some(item) => UpdateCartResponse::Updated(item),
        None => UpdateCartResponse::Removed { removed: true },
    };
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::remove_item(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = services::clear(&state.db, user.id).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}
