//! Input validation: customer type, price, quantity.

use serde::Serialize;

use explainx_core::{traced, TraceContext};

use crate::mock_data::USER_TYPES;

/// Largest price accepted by `validate_price`.
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Orders below this value are raised to it.
pub const MIN_ORDER_VALUE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserValidation {
    pub valid: bool,
    pub user_type: String,
    pub tier: u8,
    pub discount_eligible: bool,
    pub max_discount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceValidation {
    pub valid: bool,
    pub original_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityValidation {
    pub valid: bool,
    pub requested: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

traced! {
    /// Resolve a customer type (case and surrounding space ignored) to its tier.
    pub fn validate_user_type(ctx: &TraceContext, user_type: &str) -> UserValidation {
        let normalized = user_type.trim().to_lowercase();
        match USER_TYPES.iter().find(|t| t.user_type == normalized) {
            Some(tier) => UserValidation {
                valid: true,
                user_type: normalized,
                tier: tier.tier,
                discount_eligible: tier.discount_eligible,
                max_discount: tier.max_discount,
                error: None,
            },
            None => UserValidation {
                valid: false,
                user_type: normalized,
                tier: 0,
                discount_eligible: false,
                max_discount: 0.0,
                error: Some(format!("Invalid user type: {}", user_type)),
            },
        }
    }
}

traced! {
    /// Check a price against the allowed range and the minimum order value.
    pub fn validate_price(ctx: &TraceContext, price: f64) -> PriceValidation {
        let rejected = |error: &str| PriceValidation {
            valid: false,
            original_price: price,
            adjusted_price: None,
            warning: None,
            error: Some(error.to_string()),
        };

        if !price.is_finite() {
            return rejected("Price must be a number");
        }
        if price <= 0.0 {
            return rejected("Price must be positive");
        }
        if price > MAX_PRICE {
            return rejected("Price exceeds maximum allowed (1,000,000)");
        }
        if price < MIN_ORDER_VALUE {
            return PriceValidation {
                valid: true,
                original_price: price,
                adjusted_price: Some(MIN_ORDER_VALUE),
                warning: Some("Minimum order value applied (10)".to_string()),
                error: None,
            };
        }
        PriceValidation {
            valid: true,
            original_price: price,
            adjusted_price: Some(price),
            warning: None,
            error: None,
        }
    }
}

traced! {
    /// Approve an order quantity, capping it at `max_stock`.
    pub fn validate_quantity(ctx: &TraceContext, quantity: i64, max_stock: i64) -> QuantityValidation {
        if quantity <= 0 {
            return QuantityValidation {
                valid: false,
                requested: quantity,
                approved: None,
                warning: None,
                error: Some("Quantity must be a positive integer".to_string()),
            };
        }
        if quantity > max_stock {
            return QuantityValidation {
                valid: true,
                requested: quantity,
                approved: Some(max_stock),
                warning: Some(format!("Only {} items available, quantity adjusted", max_stock)),
                error: None,
            };
        }
        QuantityValidation {
            valid: true,
            requested: quantity,
            approved: Some(quantity),
            warning: None,
            error: None,
        }
    }
}
