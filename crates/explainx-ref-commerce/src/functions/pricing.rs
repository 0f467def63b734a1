//! Discounts: customer tier, order volume, promo codes.

use serde::Serialize;

use explainx_core::{traced, TraceContext};

use crate::{
    functions::round2,
    mock_data::{find_promo, tier_discount_rate, PromoKind},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseDiscount {
    pub original_price: f64,
    pub discount_rate: f64,
    pub discount_amount: f64,
    pub discounted_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeDiscount {
    pub unit_price: f64,
    pub quantity: i64,
    pub volume_tier: &'static str,
    pub discount_rate: f64,
    pub subtotal_before_discount: f64,
    pub volume_discount: f64,
    pub subtotal_after_discount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromoResult {
    pub original_price: f64,
    pub promo_code: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_type: Option<&'static str>,
    pub discount_applied: f64,
    pub final_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Volume tiers, largest first: (minimum quantity, rate, label).
const VOLUME_TIERS: [(i64, f64, &str); 4] = [
    (100, 0.20, "Bulk (100+)"),
    (50, 0.15, "Large (50+)"),
    (25, 0.10, "Medium (25+)"),
    (10, 0.05, "Small (10+)"),
];

traced! {
    /// Apply the customer-tier discount to a unit price.
    pub fn calculate_base_discount(ctx: &TraceContext, price: f64, user_tier: u8) -> BaseDiscount {
        let discount_rate = tier_discount_rate(user_tier);
        let discount_amount = price * discount_rate;
        BaseDiscount {
            original_price: price,
            discount_rate,
            discount_amount: round2(discount_amount),
            discounted_price: round2(price - discount_amount),
        }
    }
}

traced! {
    /// Price a line of `quantity` units, discounting larger orders.
    pub fn apply_volume_discount(ctx: &TraceContext, price: f64, quantity: i64) -> VolumeDiscount {
        let (discount_rate, volume_tier) = VOLUME_TIERS
            .iter()
            .find(|(min_quantity, _, _)| quantity >= *min_quantity)
            .map_or((0.0, "No volume discount"), |(_, rate, label)| (*rate, *label));

        let total_before = price * quantity as f64;
        let discount = total_before * discount_rate;
        VolumeDiscount {
            unit_price: price,
            quantity,
            volume_tier,
            discount_rate,
            subtotal_before_discount: round2(total_before),
            volume_discount: round2(discount),
            subtotal_after_discount: round2(total_before - discount),
        }
    }
}

traced! {
    /// Apply a promo code to an order subtotal.
    ///
    /// Unknown codes and subtotals under the code's minimum leave the price
    /// unchanged and report why.
    pub fn apply_promo_code(ctx: &TraceContext, price: f64, promo_code: &str) -> PromoResult {
        let code = promo_code.trim().to_uppercase();
        let unchanged = |code: String, error: String| PromoResult {
            original_price: price,
            promo_code: code,
            valid: false,
            promo_type: None,
            discount_applied: 0.0,
            final_price: price,
            bonus: None,
            error: Some(error),
        };

        let Some(promo) = find_promo(&code) else {
            return unchanged(promo_code.to_string(), "Invalid promo code".to_string());
        };
        if price < promo.min_purchase {
            return unchanged(code, format!("Minimum purchase of ${} required", promo.min_purchase));
        }

        let (discount, bonus) = match promo.kind {
            PromoKind::Percent(rate) => (price * rate, None),
            PromoKind::Fixed(amount) => (amount.min(price), None),
            PromoKind::Bonus(perk) => (0.0, Some(perk)),
        };

        PromoResult {
            original_price: price,
            promo_code: code,
            valid: true,
            promo_type: Some(promo.kind.label()),
            discount_applied: round2(discount),
            final_price: round2(price - discount),
            bonus,
            error: None,
        }
    }
}
