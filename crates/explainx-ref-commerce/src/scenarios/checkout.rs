//! Checkout pipelines.
//!
//! Two flows share the pricing functions:
//!
//!   simple:  validate user → validate price → tier discount → tax
//!
//!   full:    validate user → product lookup → stock check → validate quantity
//!            → reserve → tier discount → volume discount → [promo code]
//!            → tax → shipping → final total
//!
//! The orchestrators themselves are not traced; every step they call is.
//! A business rejection in the full flow is a normal result naming the step
//! that stopped the order, not an error.

use serde::Serialize;
use tracing::debug;

use explainx_core::TraceContext;

use crate::{
    functions::{
        inventory::{check_stock, get_product_details, reserve_stock},
        pricing::{apply_promo_code, apply_volume_discount, calculate_base_discount},
        round2,
        tax::{calculate_final_total, calculate_sales_tax, calculate_shipping_cost},
        validation::{validate_price, validate_quantity, validate_user_type},
    },
    mock_data::DEFAULT_STATE,
};

// ── Simple checkout ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleCheckout {
    pub success: bool,
    pub original_price: f64,
    pub user_type: String,
    pub discount_applied: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub final_total: f64,
}

/// Tier discount plus default-state tax on a single price.
///
/// Unknown customer types get no discount rather than a rejection.
pub fn simple_checkout(ctx: &TraceContext, price: f64, user_type: &str) -> SimpleCheckout {
    let user = validate_user_type(ctx, user_type);
    let validated = validate_price(ctx, price);
    let price_to_use = validated.adjusted_price.unwrap_or(price);

    let discount = calculate_base_discount(ctx, price_to_use, user.tier);
    let tax = calculate_sales_tax(ctx, discount.discounted_price, DEFAULT_STATE);

    SimpleCheckout {
        success: true,
        original_price: price,
        user_type: user.user_type,
        discount_applied: discount.discount_amount,
        subtotal: discount.discounted_price,
        tax: tax.tax_amount,
        final_total: tax.total_with_tax,
    }
}

// ── Full checkout ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub product_id: String,
    pub quantity: i64,
    pub user_type: String,
    pub state: String,
    pub promo_code: Option<String>,
    pub express: bool,
}

/// The checkout step at which an order was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    UserValidation,
    ProductLookup,
    StockCheck,
    QuantityValidation,
    Reservation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CheckoutOutcome {
    Completed { success: bool, order_summary: OrderSummary },
    Rejected { success: bool, error: String, step: CheckoutStep },
}

impl CheckoutOutcome {
    fn rejected(step: CheckoutStep, error: impl Into<String>) -> Self {
        debug!(step = ?step, "checkout rejected");
        CheckoutOutcome::Rejected { success: false, error: error.into(), step }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CheckoutOutcome::Completed { .. })
    }

    pub fn order_summary(&self) -> Option<&OrderSummary> {
        match self {
            CheckoutOutcome::Completed { order_summary, .. } => Some(order_summary),
            CheckoutOutcome::Rejected { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub reservation_id: String,
    pub product: OrderedProduct,
    pub customer: Customer,
    pub pricing: Pricing,
    pub promo_applied: bool,
    pub free_shipping: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedProduct {
    pub id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    #[serde(rename = "type")]
    pub user_type: String,
    pub tier: u8,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pricing {
    pub original_subtotal: f64,
    pub tier_discount: f64,
    pub volume_discount: f64,
    pub promo_discount: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub tax_rate: String,
    pub shipping: f64,
    pub shipping_type: String,
    pub grand_total: f64,
}

/// Price, reserve and total one order line.
pub fn process_checkout(ctx: &TraceContext, request: &CheckoutRequest) -> CheckoutOutcome {
    // Steps 1-5: who is buying what, and can we hold it.
    let user = validate_user_type(ctx, &request.user_type);
    if !user.valid {
        let error = user.error.unwrap_or_else(|| "Invalid user type".to_string());
        return CheckoutOutcome::rejected(CheckoutStep::UserValidation, error);
    }

    let product = get_product_details(ctx, &request.product_id);
    let (Some(name), Some(unit_price)) = (product.name.clone(), product.price) else {
        let error = product.error.unwrap_or_else(|| "Product not found".to_string());
        return CheckoutOutcome::rejected(CheckoutStep::ProductLookup, error);
    };

    let stock = check_stock(ctx, &request.product_id, request.quantity);
    let Some(current_stock) = stock.current_stock.filter(|_| stock.available) else {
        let error = stock.suggestion.unwrap_or_else(|| "Out of stock".to_string());
        return CheckoutOutcome::rejected(CheckoutStep::StockCheck, error);
    };

    let quantity_check = validate_quantity(ctx, request.quantity, current_stock);
    let Some(quantity) = quantity_check.approved else {
        let error = quantity_check.error.unwrap_or_else(|| "Invalid quantity".to_string());
        return CheckoutOutcome::rejected(CheckoutStep::QuantityValidation, error);
    };

    let reservation = reserve_stock(ctx, &request.product_id, quantity);
    let (true, Some(reservation_id)) = (reservation.success, reservation.reservation_id.clone()) else {
        let error = reservation.error.unwrap_or_else(|| "Could not reserve stock".to_string());
        return CheckoutOutcome::rejected(CheckoutStep::Reservation, error);
    };

    // Steps 6-8: discounts, per unit first and then on the line.
    let base = calculate_base_discount(ctx, unit_price, user.tier);
    let volume = apply_volume_discount(ctx, base.discounted_price, quantity);
    let mut subtotal = volume.subtotal_after_discount;

    let promo = request
        .promo_code
        .as_deref()
        .filter(|code| !code.is_empty())
        .map(|code| apply_promo_code(ctx, subtotal, code));
    if let Some(promo) = &promo {
        subtotal = promo.final_price;
    }

    // Steps 9-11: tax, shipping, total.
    let tax = calculate_sales_tax(ctx, subtotal, &request.state);
    let weight = reservation.total_weight_kg.unwrap_or(0.0);
    let shipping = calculate_shipping_cost(ctx, subtotal, weight, request.express);
    let total = calculate_final_total(ctx, subtotal, tax.tax_amount, shipping.shipping_cost, 0.0);

    CheckoutOutcome::Completed {
        success: true,
        order_summary: OrderSummary {
            reservation_id,
            product: OrderedProduct {
                id: request.product_id.clone(),
                name,
                unit_price,
                quantity,
            },
            customer: Customer {
                user_type: user.user_type,
                tier: user.tier,
                state: request.state.clone(),
            },
            pricing: Pricing {
                original_subtotal: round2(unit_price * quantity as f64),
                tier_discount: round2(base.discount_amount * quantity as f64),
                volume_discount: volume.volume_discount,
                promo_discount: promo.as_ref().map_or(0.0, |p| p.discount_applied),
                subtotal,
                tax: tax.tax_amount,
                tax_rate: tax.tax_rate_percent,
                shipping: shipping.shipping_cost,
                shipping_type: shipping.shipping_type.unwrap_or("Free").to_string(),
                grand_total: total.grand_total,
            },
            promo_applied: promo.as_ref().is_some_and(|p| p.valid),
            free_shipping: shipping.free_shipping,
        },
    }
}
