//! Simulated commerce data for the ExplainX reference pipelines.
//!
//! All data in this module is hardcoded and fictional. No external systems are
//! contacted. The tables stand in for an inventory service, a tax service and
//! a promotions service; the generator stands in for an applicant tracking
//! system.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

use crate::functions::resume::Application;

// ── Inventory (mock) ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub stock: u32,
    pub price: f64,
    pub weight_kg: f64,
}

pub const INVENTORY: [Product; 5] = [
    Product { id: "LAPTOP-001", name: "Pro Laptop 15\"", stock: 25, price: 1299.99, weight_kg: 2.1 },
    Product { id: "PHONE-001", name: "Smart Phone X", stock: 150, price: 899.99, weight_kg: 0.2 },
    Product { id: "HEADPHONES-001", name: "Wireless Headphones", stock: 75, price: 249.99, weight_kg: 0.3 },
    Product { id: "TABLET-001", name: "Pro Tablet 12\"", stock: 40, price: 799.99, weight_kg: 0.6 },
    Product { id: "WATCH-001", name: "Smart Watch Pro", stock: 200, price: 399.99, weight_kg: 0.1 },
];

/// Normalize a product ID the way every inventory lookup does.
pub fn normalize_product_id(product_id: &str) -> String {
    product_id.trim().to_uppercase()
}

/// Look up a product by an already-normalized ID.
pub fn find_product(normalized_id: &str) -> Option<&'static Product> {
    INVENTORY.iter().find(|p| p.id == normalized_id)
}

// ── Tax table (mock) ──────────────────────────────────────────────────────────

pub const DEFAULT_STATE: &str = "DEFAULT";

/// Sales tax rate by state; `DEFAULT` applies to any state not listed.
pub const TAX_RATES: [(&str, f64); 7] = [
    ("CA", 0.0725),
    ("NY", 0.08),
    ("TX", 0.0625),
    ("FL", 0.06),
    ("WA", 0.065),
    ("OR", 0.0),
    (DEFAULT_STATE, 0.07),
];

pub fn tax_rate(normalized_state: &str) -> f64 {
    TAX_RATES
        .iter()
        .find(|(code, _)| *code == normalized_state)
        .or_else(|| TAX_RATES.iter().find(|(code, _)| *code == DEFAULT_STATE))
        .map_or(0.07, |(_, rate)| *rate)
}

/// A rate as shown to customers, e.g. `7.25%`.
pub fn format_rate_percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

// ── Promotions (mock) ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromoKind {
    /// Fraction of the price taken off.
    Percent(f64),
    /// Fixed amount taken off, never more than the price.
    Fixed(f64),
    /// No price change; grants a named perk.
    Bonus(&'static str),
}

impl PromoKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromoKind::Percent(_) => "percent",
            PromoKind::Fixed(_) => "fixed",
            PromoKind::Bonus(_) => "bonus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromoCode {
    pub code: &'static str,
    pub kind: PromoKind,
    pub min_purchase: f64,
    pub description: &'static str,
}

pub const PROMO_CODES: [PromoCode; 4] = [
    PromoCode { code: "SAVE10", kind: PromoKind::Percent(0.10), min_purchase: 0.0, description: "10% off any order" },
    PromoCode { code: "SAVE20", kind: PromoKind::Percent(0.20), min_purchase: 50.0, description: "20% off orders $50+" },
    PromoCode { code: "FLAT50", kind: PromoKind::Fixed(50.0), min_purchase: 100.0, description: "$50 off orders $100+" },
    PromoCode { code: "FREESHIP", kind: PromoKind::Bonus("free_shipping"), min_purchase: 0.0, description: "Free shipping bonus" },
];

pub fn find_promo(normalized_code: &str) -> Option<&'static PromoCode> {
    PROMO_CODES.iter().find(|p| p.code == normalized_code)
}

// ── Customer tiers (mock) ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserTier {
    pub user_type: &'static str,
    pub tier: u8,
    pub discount_eligible: bool,
    pub max_discount: f64,
}

pub const USER_TYPES: [UserTier; 3] = [
    UserTier { user_type: "premium", tier: 3, discount_eligible: true, max_discount: 0.25 },
    UserTier { user_type: "standard", tier: 2, discount_eligible: true, max_discount: 0.10 },
    UserTier { user_type: "guest", tier: 1, discount_eligible: false, max_discount: 0.0 },
];

/// Base discount rate for a tier; unknown tiers get none.
pub fn tier_discount_rate(tier: u8) -> f64 {
    match tier {
        3 => 0.20,
        2 => 0.10,
        _ => 0.0,
    }
}

// ── Catalog listings ──────────────────────────────────────────────────────────

pub fn product_listing() -> Value {
    let products: Vec<Value> = INVENTORY
        .iter()
        .map(|p| json!({ "id": p.id, "name": p.name, "price": p.price, "stock": p.stock }))
        .collect();
    json!({ "products": products })
}

pub fn promo_code_listing() -> Value {
    let codes: Vec<Value> = PROMO_CODES
        .iter()
        .map(|p| json!({ "code": p.code, "description": p.description }))
        .collect();
    json!({ "codes": codes })
}

pub fn user_type_listing() -> Value {
    let types: Vec<Value> = USER_TYPES
        .iter()
        .map(|u| {
            json!({
                "type": u.user_type,
                "tier": u.tier,
                "discount": format!("{:.0}%", tier_discount_rate(u.tier) * 100.0)
            })
        })
        .collect();
    json!({ "types": types })
}

pub fn state_listing() -> Value {
    let states: Vec<Value> = TAX_RATES
        .iter()
        .filter(|(code, _)| *code != DEFAULT_STATE)
        .map(|(code, rate)| json!({ "code": code, "tax_rate": format_rate_percent(*rate) }))
        .collect();
    json!({ "states": states })
}

pub fn health() -> Value {
    json!({ "status": "healthy", "service": "explainx-api" })
}

// ── Applicant generator (mock) ────────────────────────────────────────────────

pub const NAMES: [&str; 10] = [
    "John", "Jane", "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Heidi",
];

pub const DOMAINS: [&str; 6] = ["backend", "frontend", "fullstack", "data_science", "devops", "mobile"];

/// Round to `decimals` places; negative values round to tens, hundreds, ...
fn round_to(value: f64, decimals: i32) -> f64 {
    if decimals < 0 {
        let step = 10f64.powi(-decimals);
        return (value / step).round() * step;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Generate `count` fictional job applications.
///
/// The same `seed` always yields the same applications.
pub fn generate_applications(count: usize, seed: u64) -> Vec<Application> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let first_name = NAMES.choose(&mut rng).copied().unwrap_or("Candidate");
            let domain = DOMAINS.choose(&mut rng).copied().unwrap_or("backend");
            Application {
                id: format!("APP-{:04}", i + 1),
                name: format!("{} {}", first_name, i),
                email: format!("user{}@example.com", i),
                // About 95% of applicants are verified.
                verified: rng.gen::<f64>() > 0.05,
                experience_years: round_to(rng.gen_range(0.0..=15.0), 1),
                domain: domain.to_string(),
                current_salary: round_to(rng.gen_range(30_000.0..=150_000.0), -2),
                expected_salary: round_to(rng.gen_range(40_000.0..=200_000.0), -2),
                cgpa: round_to(rng.gen_range(7.0..=10.0), 2),
            }
        })
        .collect()
}
