//! Sales tax, shipping and the final order total.

use serde::Serialize;

use explainx_core::{traced, TraceContext};

use crate::{
    functions::round2,
    mock_data::{format_rate_percent, tax_rate, DEFAULT_STATE},
};

/// Orders at or above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: f64 = 100.0;
const BASE_SHIPPING: f64 = 5.0;
const SHIPPING_PER_KG: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesTax {
    pub subtotal: f64,
    pub state: String,
    pub tax_rate: f64,
    pub tax_rate_percent: String,
    pub tax_amount: f64,
    pub total_with_tax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingQuote {
    pub subtotal: f64,
    pub weight_kg: f64,
    pub express: bool,
    pub free_shipping: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_cost: Option<f64>,
    pub shipping_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub products: f64,
    pub tax: f64,
    pub shipping: f64,
    pub tip: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalTotal {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub tip_percent: f64,
    pub tip_amount: f64,
    pub grand_total: f64,
    pub breakdown: Breakdown,
}

traced! {
    /// Sales tax on `amount` at the state's rate; unknown states use the default.
    pub fn calculate_sales_tax(ctx: &TraceContext, amount: f64, state: &str) -> SalesTax {
        let trimmed = state.trim();
        let state = if trimmed.is_empty() { DEFAULT_STATE.to_string() } else { trimmed.to_uppercase() };
        let rate = tax_rate(&state);
        let tax_amount = amount * rate;
        SalesTax {
            subtotal: round2(amount),
            state,
            tax_rate: rate,
            tax_rate_percent: format_rate_percent(rate),
            tax_amount: round2(tax_amount),
            total_with_tax: round2(amount + tax_amount),
        }
    }
}

traced! {
    /// Shipping cost from order value and weight.
    pub fn calculate_shipping_cost(ctx: &TraceContext, subtotal: f64, weight_kg: f64, express: bool) -> ShippingQuote {
        if subtotal >= FREE_SHIPPING_THRESHOLD {
            return ShippingQuote {
                subtotal: round2(subtotal),
                weight_kg,
                express,
                free_shipping: true,
                shipping_type: None,
                base_cost: None,
                shipping_cost: 0.0,
                reason: Some("Free shipping for orders over $100"),
            };
        }

        let base_cost = BASE_SHIPPING + weight_kg * SHIPPING_PER_KG;
        let (shipping_cost, shipping_type) = if express {
            (base_cost * 2.0, "Express (2-day)")
        } else {
            (base_cost, "Standard (5-7 days)")
        };

        ShippingQuote {
            subtotal: round2(subtotal),
            weight_kg,
            express,
            free_shipping: false,
            shipping_type: Some(shipping_type),
            base_cost: Some(round2(base_cost)),
            shipping_cost: round2(shipping_cost),
            reason: None,
        }
    }
}

traced! {
    /// Combine subtotal, tax, shipping and an optional tip.
    pub fn calculate_final_total(
        ctx: &TraceContext,
        subtotal: f64,
        tax_amount: f64,
        shipping_cost: f64,
        tip_percent: f64,
    ) -> FinalTotal {
        let tip_amount = if tip_percent > 0.0 { subtotal * tip_percent / 100.0 } else { 0.0 };
        let total = subtotal + tax_amount + shipping_cost + tip_amount;
        FinalTotal {
            subtotal: round2(subtotal),
            tax: round2(tax_amount),
            shipping: round2(shipping_cost),
            tip_percent,
            tip_amount: round2(tip_amount),
            grand_total: round2(total),
            breakdown: Breakdown {
                products: round2(subtotal),
                tax: round2(tax_amount),
                shipping: round2(shipping_cost),
                tip: round2(tip_amount),
            },
        }
    }
}
