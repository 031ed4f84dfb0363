use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenKind, UserRole};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated identity extracted from the access token.
///
/// Every operation that mutates or reads caller-owned data takes this
/// explicitly; there is no ambient session state.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_merchant(&self) -> bool {
        self.role == UserRole::Merchant
    }

    /// Guard for merchant-only operations, checked before any storage access.
    pub fn require_merchant(&self) -> Result<(), AppError> {
        if self.is_merchant() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "This feature is only available to merchants".into(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".into()))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("invalid auth scheme".into()))?;

        let cfg = &state.config.jwt;
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&cfg.audience));
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());

        let data = decode::<Claims>(token, &decoding, &validation)
            .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))?;

        if data.claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized("access token required".into()));
        }

        Ok(CurrentUser {
            id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merchant_guard_rejects_customers() {
        let customer = CurrentUser {
            id: Uuid::new_v4(),
            role: UserRole::Customer,
        };
        let err = customer.require_merchant().unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let merchant = CurrentUser {
            id: Uuid::new_v4(),
            role: UserRole::Merchant,
        };
        assert!(merchant.require_merchant().is_ok());
    }
}
