//! Shipping and order total arithmetic.

use rust_decimal::Decimal;
use serde::Serialize;

/// Flat shipping fee below a subtotal threshold, free at or above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub flat_fee: Decimal,
    pub free_threshold: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self { flat_fee: Decimal::new(7, 0), free_threshold: Decimal::new(200, 0) }
    }
}

impl ShippingPolicy {
    pub fn cost_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_threshold { Decimal::ZERO } else { self.flat_fee }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// `total = subtotal + shipping - discount`; the discount is clamped to
    /// `[0, subtotal + shipping]`.
    pub fn compute(subtotal: Decimal, discount: Decimal, policy: &ShippingPolicy) -> Self {
        let shipping_cost = policy.cost_for(subtotal);
        let gross = subtotal + shipping_cost;
        let discount = discount.max(Decimal::ZERO).min(gross);
        Self { subtotal, shipping_cost, discount, total: gross - discount }
    }

    pub fn empty() -> Self {
        Self { subtotal: Decimal::ZERO, shipping_cost: Decimal::ZERO, discount: Decimal::ZERO, total: Decimal::ZERO }
    }
}

/// Variant price when the variant overrides it, otherwise the product price.
pub fn effective_unit_price(product_price: Decimal, variant_price: Option<Decimal>) -> Decimal {
    variant_price.unwrap_or(product_price)
}

pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal { Decimal::new(v, 0) }

    #[test]
    fn test_shipping_step_function() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.cost_for(d(0)), d(7));
        assert_eq!(policy.cost_for(Decimal::new(199_999, 3)), d(7));
        assert_eq!(policy.cost_for(d(200)), Decimal::ZERO);
        assert_eq!(policy.cost_for(d(1500)), Decimal::ZERO);
    }

    #[test]
    fn test_custom_policy() {
        let policy = ShippingPolicy { flat_fee: d(10), free_threshold: d(50) };
        assert_eq!(policy.cost_for(d(49)), d(10));
        assert_eq!(policy.cost_for(d(50)), Decimal::ZERO);
    }

    #[test]
    fn test_totals_without_discount() {
        let totals = OrderTotals::compute(d(120), Decimal::ZERO, &ShippingPolicy::default());
        assert_eq!(totals.shipping_cost, d(7));
        assert_eq!(totals.total, d(127));
    }

    #[test]
    fn test_totals_with_discount() {
        let totals = OrderTotals::compute(d(250), d(25), &ShippingPolicy::default());
        assert_eq!(totals.shipping_cost, Decimal::ZERO);
        assert_eq!(totals.total, d(225));
    }

    #[test]
    fn test_discount_is_clamped() {
        let totals = OrderTotals::compute(d(10), d(100), &ShippingPolicy::default());
        assert_eq!(totals.discount, d(17));
        assert_eq!(totals.total, Decimal::ZERO);
        let totals = OrderTotals::compute(d(10), d(-5), &ShippingPolicy::default());
        assert_eq!(totals.discount, Decimal::ZERO);
    }

    #[test]
    fn test_effective_price_prefers_variant() {
        assert_eq!(effective_unit_price(d(30), Some(d(35))), d(35));
        assert_eq!(effective_unit_price(d(30), None), d(30));
        assert_eq!(line_total(Decimal::new(12_500, 3), 3), Decimal::new(37_500, 3));
    }
}
