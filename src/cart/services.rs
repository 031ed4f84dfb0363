use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::cart::repo::{CartItem, CartLine};
use crate::error::AppError;
use crate::products::repo::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Tax-inclusive totals over (unit price, quantity) pairs.
///
/// The grand total is round(subtotal * (1 + rate), 2); the tax is derived as
/// the difference so that subtotal + tax always equals total.
pub fn compute_totals<I>(lines: I, tax_rate: Decimal) -> CartTotals
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    let subtotal: Decimal = lines
        .into_iter()
        .map(|(price, qty)| price * Decimal::from(qty))
        .sum();
    let total = (subtotal * (Decimal::ONE + tax_rate)).round_dp(2);
    CartTotals {
        subtotal,
        tax: total - subtotal,
        total,
    }
}

pub fn line_totals(lines: &[CartLine], tax_rate: Decimal) -> CartTotals {
    compute_totals(lines.iter().map(|l| (l.unit_price, l.quantity)), tax_rate)
}

/// Add a product to the caller's cart, summing with any existing line.
/// The (combined) quantity is checked against live stock before committing.
pub async fn add_to_cart(
    db: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> Result<CartItem, AppError> {
    if quantity <= 0 {
        return Err(AppError::InvalidInput(
            "Quantity must be a positive number".into(),
        ));
    }

    let product = Product::find_active_by_id(db, product_id)
        .await?
        .ok_or(AppError::ProductUnavailable)?;

    if product.stock_quantity < quantity {
        return Err(AppError::InsufficientStock {
            available: product.stock_quantity,
        });
    }

    let item = match CartItem::find_for_product(db, user_id, product_id).await? {
        Some(existing) => {
            let combined = existing.quantity + quantity;
            if combined > product.stock_quantity {
                return Err(AppError::InsufficientStock {
                    available: product.stock_quantity,
                });
            }
            CartItem::set_quantity(db, existing.id, combined).await?
        }
        None => CartItem::insert(db, user_id, product_id, quantity).await?,
    };

    info!(user_id = %user_id, product_id = %product_id, quantity = item.quantity, "cart line upserted");
    Ok(item)
}

/// Set a cart line's quantity. Zero or negative delegates to removal and
/// returns `None`; otherwise the new quantity is checked against live stock.
pub async fn update_item(
    db: &PgPool,
    user_id: Uuid,
    cart_item_id: Uuid,
    quantity: i32,
) -> Result<Option<CartItem>, AppError> {
    if quantity <= 0 {
        remove_item(db, user_id, cart_item_id).await?;
        return Ok(None);
    }

    let item = CartItem::find_owned(db, cart_item_id, user_id)
        .await?
        .ok_or(AppError::NotFound("Cart item"))?;

    let product = Product::find_by_id(db, item.product_id)
        .await?
        .ok_or(AppError::ProductUnavailable)?;

    if quantity > product.stock_quantity {
        return Err(AppError::InsufficientStock {
            available: product.stock_quantity,
        });
    }

    let updated = CartItem::set_quantity(db, item.id, quantity).await?;
    Ok(Some(updated))
}

pub async fn remove_item(db: &PgPool, user_id: Uuid, cart_item_id: Uuid) -> Result<(), AppError> {
    let item = CartItem::find_owned(db, cart_item_id, user_id)
        .await?
        .ok_or(AppError::NotFound("Cart item"))?;
    CartItem::delete(db, item.id).await?;
    info!(user_id = %user_id, cart_item_id = %cart_item_id, "cart line removed");
    Ok(())
}

pub async fn clear(db: &PgPool, user_id: Uuid) -> Result<u64, AppError> {
    let removed = CartItem::clear(db, user_id).await?;
    info!(user_id = %user_id, removed, "cart cleared");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn totals_for_the_reference_cart() {
        // price 10.00 x 2 at 8% tax
        let totals = compute_totals([(dec("10.00"), 2)], dec("0.08"));
        assert_eq!(totals.subtotal, dec("20.00"));
        assert_eq!(totals.tax, dec("1.60"));
        assert_eq!(totals.total, dec("21.60"));
    }

    #[test]
    fn totals_sum_multiple_lines() {
        let totals = compute_totals([(dec("3.50"), 3), (dec("12.99"), 1)], dec("0.08"));
        assert_eq!(totals.subtotal, dec("23.49"));
        assert_eq!(totals.total, dec("25.37")); // 23.49 * 1.08 = 25.3692
        assert_eq!(totals.subtotal + totals.tax, totals.total);
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let totals = compute_totals(std::iter::empty::<(Decimal, i32)>(), dec("0.08"));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn zero_tax_rate_keeps_total_equal_to_subtotal() {
        let totals = compute_totals([(dec("5.25"), 4)], Decimal::ZERO);
        assert_eq!(totals.subtotal, dec("21.00"));
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, dec("21.00"));
    }
}
