use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::CurrentUser,
        jwt::JwtKeys,
        repo::User,
        services::{hash_password, is_valid_email, verify_password},
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn public(user: &User) -> PublicUser {
    PublicUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
    }
}

fn token_pair(state: &AppState, user: &User) -> Result<(String, String), AppError> {
    let keys = JwtKeys::from_ref(state);
    let access = keys.sign_access(user.id, user.role)?;
    let refresh = keys.sign_refresh(user.id, user.role)?;
    Ok((access, refresh))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if payload.username.is_empty() {
        return Err(AppError::InvalidInput("Username is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::InvalidInput("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::InvalidInput("Password too short".into()));
    }

    match User::find_conflict(&state.db, &payload.username, &payload.email).await? {
        Some("username") => {
            warn!(username = %payload.username, "username already taken");
            return Err(AppError::Conflict("Username already taken".into()));
        }
        Some(_) => {
            warn!(email = %payload.email, "email already registered");
            return Err(AppError::Conflict("Email already registered".into()));
        }
        None => {}
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.username, &payload.email, &hash, payload.role)
        .await?;

    let (access_token, refresh_token) = token_pair(&state, &user)?;

    info!(user_id = %user.id, username = %user.username, role = ?user.role, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: public(&user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let ident = payload.username_or_email.trim();

    let user = User::find_by_username_or_email(&state.db, ident)
        .await?
        .ok_or_else(|| {
            warn!(ident = %ident, "login unknown user");
            AppError::Unauthorized("Invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let (access_token, refresh_token) = token_pair(&state, &user)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: public(&user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    // Re-read the user so a role change invalidates stale claims.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    let (access_token, refresh_token) = token_pair(&state, &user)?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: public(&user),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(public(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::UserRole;

    #[test]
    fn public_user_serialization_hides_nothing_sensitive() {
        let user = PublicUser {
            id: uuid::Uuid::new_v4(),
            username: "amina".into(),
            email: "amina@souk.example".into(),
            role: UserRole::Merchant,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("amina@souk.example"));
        assert!(json.contains("\"merchant\""));
        assert!(!json.contains("password"));
    }
}
