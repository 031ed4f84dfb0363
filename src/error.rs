use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Application error surfaced by every domain operation.
///
/// Authorization failures are raised before any mutation is attempted;
/// storage failures abort the current unit of work and are reported as-is,
/// never left partially applied.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    /// Requested quantity exceeds what is on hand.
    #[error("Not enough stock. Available: {available}")]
    InsufficientStock { available: i32 },

    #[error("Product not found or unavailable")]
    ProductUnavailable,

    #[error("Your cart is empty")]
    EmptyCart,

    /// Checkout aborted; one reason per failed cart line.
    #[error("checkout validation failed")]
    CheckoutRejected(Vec<String>),

    #[error("{0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::ProductUnavailable => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::EmptyCart => StatusCode::BAD_REQUEST,
            AppError::InsufficientStock { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::CheckoutRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Storage(e) => error!(error = %e, "storage error"),
            AppError::Internal(e) => error!(error = %e, "internal error"),
            _ => {}
        }

        let body = match &self {
            AppError::CheckoutRejected(reasons) => json!({
                "error": "Checkout failed",
                "reasons": reasons,
            }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_error_kinds() {
        assert_eq!(
            AppError::Unauthorized("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("merchants only".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::NotFound("Order").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::ProductUnavailable.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InsufficientStock { available: 3 }.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::EmptyCart.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::CheckoutRejected(vec![]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn insufficient_stock_reports_available_amount() {
        let err = AppError::InsufficientStock { available: 3 };
        assert_eq!(err.to_string(), "Not enough stock. Available: 3");
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(AppError::NotFound("Order").to_string(), "Order not found");
        assert_eq!(
            AppError::NotFound("Cart item").to_string(),
            "Cart item not found"
        );
    }
}
