//! Inventory lookups and simulated stock reservation.

use serde::Serialize;

use explainx_core::{traced, TraceContext};

use crate::{
    functions::round2,
    mock_data::{find_product, normalize_product_id},
};

/// Minutes a reservation holds stock before it lapses.
pub const RESERVATION_EXPIRY_MINUTES: u32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockCheck {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub found: bool,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_after: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortage: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_reserved: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reservation {
    fn unfilled(product_id: String) -> Self {
        Self {
            success: false,
            reservation_id: None,
            product_id,
            product_name: None,
            quantity_reserved: None,
            unit_price: None,
            total_weight_kg: None,
            line_total: None,
            expiry_minutes: None,
            requested: None,
            available: None,
            error: None,
        }
    }

    fn rejected(product_id: String, error: &str) -> Self {
        Self { error: Some(error.to_string()), ..Self::unfilled(product_id) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetails {
    pub found: bool,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

traced! {
    /// Report whether `requested_quantity` units of a product are on hand.
    pub fn check_stock(ctx: &TraceContext, product_id: &str, requested_quantity: i64) -> StockCheck {
        let id = normalize_product_id(product_id);
        let mut check = StockCheck {
            product_id: id,
            product_name: None,
            found: false,
            available: false,
            requested: None,
            current_stock: None,
            remaining_after: None,
            unit_price: None,
            weight_kg: None,
            shortage: None,
            suggestion: None,
            error: None,
        };

        let Some(product) = find_product(&check.product_id) else {
            check.error = Some("Product not found in inventory".to_string());
            return check;
        };

        let stock = i64::from(product.stock);
        check.product_name = Some(product.name.to_string());
        check.found = true;
        check.requested = Some(requested_quantity);
        check.current_stock = Some(stock);

        if requested_quantity <= stock {
            check.available = true;
            check.remaining_after = Some(stock - requested_quantity);
            check.unit_price = Some(product.price);
            check.weight_kg = Some(product.weight_kg);
        } else {
            check.shortage = Some(requested_quantity - stock);
            check.suggestion = Some(format!("Maximum available: {} units", stock));
        }
        check
    }
}

traced! {
    /// Reserve stock for an order. Simulated: nothing is actually held.
    pub fn reserve_stock(ctx: &TraceContext, product_id: &str, quantity: i64) -> Reservation {
        let id = normalize_product_id(product_id);
        let Some(product) = find_product(&id) else {
            return Reservation::rejected(id, "Product not found");
        };

        let stock = i64::from(product.stock);
        if quantity > stock {
            return Reservation {
                product_name: Some(product.name.to_string()),
                requested: Some(quantity),
                available: Some(stock),
                ..Reservation::rejected(id, "Insufficient stock")
            };
        }

        Reservation {
            success: true,
            reservation_id: Some(format!("RES-{}-{}", id, quantity)),
            product_name: Some(product.name.to_string()),
            quantity_reserved: Some(quantity),
            unit_price: Some(product.price),
            total_weight_kg: Some(product.weight_kg * quantity as f64),
            line_total: Some(round2(product.price * quantity as f64)),
            expiry_minutes: Some(RESERVATION_EXPIRY_MINUTES),
            ..Reservation::unfilled(id)
        }
    }
}

traced! {
    /// Full catalog entry for a product.
    pub fn get_product_details(ctx: &TraceContext, product_id: &str) -> ProductDetails {
        let id = normalize_product_id(product_id);
        match find_product(&id) {
            Some(product) => ProductDetails {
                found: true,
                product_id: id,
                name: Some(product.name.to_string()),
                price: Some(product.price),
                stock: Some(i64::from(product.stock)),
                weight_kg: Some(product.weight_kg),
                in_stock: Some(product.stock > 0),
                error: None,
            },
            None => ProductDetails {
                found: false,
                product_id: id,
                name: None,
                price: None,
                stock: None,
                weight_kg: None,
                in_stock: None,
                error: Some("Product not found".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use explainx_core::TraceContext;

    use super::*;

    #[test]
    fn stock_check_available_and_short() {
        let ctx = TraceContext::new();
        let ok = check_stock(&ctx, "laptop-001", 5);
        assert!(ok.found && ok.available);
        assert_eq!(ok.product_id, "LAPTOP-001");
        assert_eq!(ok.remaining_after, Some(20));

        let short = check_stock(&ctx, "LAPTOP-001", 30);
        assert!(short.found && !short.available);
        assert_eq!(short.shortage, Some(5));
        assert_eq!(short.suggestion.as_deref(), Some("Maximum available: 25 units"));

        let missing = check_stock(&ctx, "DRONE-001", 1);
        assert!(!missing.found);
        assert_eq!(missing.error.as_deref(), Some("Product not found in inventory"));
    }

    #[test]
    fn reservation_totals() {
        let ctx = TraceContext::new();
        let res = reserve_stock(&ctx, "TABLET-001", 3);
        assert!(res.success);
        assert_eq!(res.reservation_id.as_deref(), Some("RES-TABLET-001-3"));
        assert_eq!(res.line_total, Some(2399.97));
        assert!((res.total_weight_kg.unwrap() - 1.8).abs() < 1e-9);
        assert_eq!(res.expiry_minutes, Some(15));
        assert!(res.error.is_none());

        let too_many = reserve_stock(&ctx, "TABLET-001", 41);
        assert!(!too_many.success);
        assert_eq!(too_many.error.as_deref(), Some("Insufficient stock"));
        assert_eq!(too_many.available, Some(40));
    }

    #[test]
    fn product_details_lookup() {
        let ctx = TraceContext::new();
        let watch = get_product_details(&ctx, " watch-001 ");
        assert!(watch.found);
        assert_eq!(watch.price, Some(399.99));
        assert_eq!(watch.in_stock, Some(true));

        assert!(!get_product_details(&ctx, "nope").found);
    }
}
