use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{repo::User, CurrentUser},
    businesses::{dto::CreateBusinessRequest, repo::Business},
    error::AppError,
    state::AppState,
};

pub fn business_routes() -> Router<AppState> {
    Router::new()
        .route("/businesses", post(create_business))
        .route("/businesses/me", get(get_my_business))
}

#[instrument(skip(state, payload))]
pub async fn create_business(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateBusinessRequest>,
) -> Result<Json<Business>, AppError> {
    user.require_merchant()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Business name is required".into()));
    }

    if Business::find_by_owner(&state.db, user.id).await?.is_some() {
        warn!(user_id = %user.id, "merchant already has a business");
        return Err(AppError::Conflict(
            "You already have a registered business".into(),
        ));
    }

    let contact_email = match payload.contact_email {
        Some(email) => email,
        None => {
            let owner = User::find_by_id(&state.db, user.id)
                .await?
                .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
            owner.email
        }
    };

    let business = Business::create(
        &state.db,
        user.id,
        name,
        payload.description.as_deref(),
        &contact_email,
    )
    .await?;

    info!(business_id = %business.id, owner_id = %user.id, "business registered");
    Ok(Json(business))
}

#[instrument(skip(state))]
pub async fn get_my_business(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Business>, AppError> {
    user.require_merchant()?;
    let business = Business::find_by_owner(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound("Business"))?;
    Ok(Json(business))
}
