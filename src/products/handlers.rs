use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    businesses::repo::Business,
    error::AppError,
    products::{
        dto::{CreateProductRequest, SearchQuery, UpdateProductRequest},
        repo::{CatalogEntry, Product},
    },
    state::AppState,
};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
}

pub fn merchant_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", patch(update_product))
        .route("/businesses/me/products", get(list_my_products))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    let products = Product::list_active(&state.db).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<CatalogEntry>>, AppError> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(AppError::InvalidInput("Search term is required".into()));
    }
    let products = Product::search_active(&state.db, term).await?;
    Ok(Json(products))
}

/// The caller's business, required for any catalog mutation.
async fn owned_business(state: &AppState, user: &CurrentUser) -> Result<Business, AppError> {
    user.require_merchant()?;
    Business::find_by_owner(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Register a business first".into()))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<Product>, AppError> {
    let business = owned_business(&state, &user).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Product name is required".into()));
    }
    if payload.price <= Decimal::ZERO {
        return Err(AppError::InvalidInput("Price must be positive".into()));
    }
    if payload.stock_quantity < 0 {
        return Err(AppError::InvalidInput(
            "Stock quantity cannot be negative".into(),
        ));
    }

    let product = Product::create(
        &state.db,
        business.id,
        name,
        payload.description.as_deref(),
        payload.price.round_dp(2),
        payload.stock_quantity,
        payload.category.trim(),
    )
    .await?;

    info!(product_id = %product.id, business_id = %business.id, "product created");
    Ok(Json(product))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>, AppError> {
    let business = owned_business(&state, &user).await?;

    if let Some(price) = payload.price {
        if price <= Decimal::ZERO {
            return Err(AppError::InvalidInput("Price must be positive".into()));
        }
    }
    if let Some(stock) = payload.stock_quantity {
        if stock < 0 {
            return Err(AppError::InvalidInput(
                "Stock quantity cannot be negative".into(),
            ));
        }
    }

    let product = Product::update_owned(
        &state.db,
        id,
        business.id,
        payload.price.map(|p| p.round_dp(2)),
        payload.stock_quantity,
        payload.is_active,
    )
    .await?
    .ok_or(AppError::NotFound("Product"))?;

    info!(product_id = %product.id, "product updated");
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn list_my_products(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Product>>, AppError> {
    let business = owned_business(&state, &user).await?;
    let products = Product::list_by_business(&state.db, business.id).await?;
    Ok(Json(products))
}
