//! Cart aggregation: an insertion-ordered collection of line items keyed by
//! product identifier. Pure domain logic, no IO.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::product::Product;

/// One cart row: a product reference plus display fields captured when the
/// product entered the cart. The stock ceiling is fixed at add time; the
/// quantity is always in `[1, stock_ceiling]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub stock_ceiling: u32,
    pub quantity: u32,
}

/// An in-memory cart. Lines keep insertion order for display; no two lines
/// ever share a product identifier; adding an existing product increments
/// its line instead of duplicating it.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product`. An existing line is incremented in
    /// place (keeping its position); otherwise a new line is appended.
    ///
    /// The resulting quantity is capped at the stock ceiling captured at add
    /// time; attempts beyond the ceiling are silently capped, not rejected.
    /// A product with zero stock adds nothing, and `quantity == 0` is a
    /// no-op; a line is never stored with a zero quantity.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 || product.stock == 0 {
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity).min(line.stock_ceiling);
            return;
        }

        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            stock_ceiling: product.stock,
            quantity: quantity.min(product.stock),
        });
    }

    /// Replace a line's quantity, clamped to its stock ceiling. A quantity
    /// of zero or less removes the line.
    ///
    /// Returns `false` if no line for `product_id` exists.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) else {
            return false;
        };

        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        line.quantity = requested.min(line.stock_ceiling).max(1);
        true
    }

    /// Delete the line for `product_id`. Idempotent; returns whether a line
    /// was present.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::compute_totals;
    use crate::product::Category;

    fn product(id: &str, price: Decimal, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: "desc".to_string(),
            price,
            category: Category::Electronics,
            image: "https://example.com/p.jpg".to_string(),
            stock,
            rating: 4.0,
            review_count: 0,
            is_active: true,
        }
    }

    #[test]
    fn add_item_merges_repeated_additions_into_one_line() {
        let p = product("p", Decimal::new(1000, 2), 3);
        let mut cart = Cart::new();

        cart.add_item(&p, 1);
        cart.add_item(&p, 1);
        cart.add_item(&p, 1);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);

        // A fourth addition is capped at the stock ceiling.
        cart.add_item(&p, 1);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn add_item_caps_initial_quantity_at_stock() {
        let p = product("p", Decimal::new(500, 2), 2);
        let mut cart = Cart::new();

        cart.add_item(&p, 10);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn add_item_preserves_insertion_order() {
        let a = product("a", Decimal::new(100, 2), 5);
        let b = product("b", Decimal::new(200, 2), 5);
        let mut cart = Cart::new();

        cart.add_item(&a, 1);
        cart.add_item(&b, 1);
        cart.add_item(&a, 1);

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn add_item_with_zero_stock_adds_nothing() {
        let p = product("p", Decimal::new(100, 2), 0);
        let mut cart = Cart::new();

        cart.add_item(&p, 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn line_captures_display_fields_at_add_time() {
        let p = product("p", Decimal::new(4999, 2), 7);
        let mut cart = Cart::new();

        cart.add_item(&p, 2);

        let line = &cart.lines()[0];
        assert_eq!(line.name, "Product p");
        assert_eq!(line.price, Decimal::new(4999, 2));
        assert_eq!(line.stock_ceiling, 7);
    }

    #[test]
    fn set_quantity_replaces_and_clamps() {
        let p = product("p", Decimal::new(100, 2), 4);
        let mut cart = Cart::new();
        cart.add_item(&p, 1);

        assert!(cart.set_quantity("p", 3));
        assert_eq!(cart.lines()[0].quantity, 3);

        assert!(cart.set_quantity("p", 99));
        assert_eq!(cart.lines()[0].quantity, 4);
    }

    #[test]
    fn set_quantity_zero_or_negative_removes_the_line() {
        let p = product("p", Decimal::new(100, 2), 4);

        let mut cart = Cart::new();
        cart.add_item(&p, 2);
        assert!(cart.set_quantity("p", 0));
        assert!(cart.is_empty());

        let mut cart = Cart::new();
        cart.add_item(&p, 2);
        assert!(cart.set_quantity("p", -3));
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_on_absent_line_reports_false() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity("missing", 2));
    }

    #[test]
    fn remove_item_is_idempotent_on_absent_id() {
        let p = product("p", Decimal::new(100, 2), 4);
        let mut cart = Cart::new();
        cart.add_item(&p, 1);

        assert!(!cart.remove_item("missing"));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn add_then_remove_restores_prior_state() {
        let a = product("a", Decimal::new(1200, 2), 5);
        let b = product("b", Decimal::new(800, 2), 5);
        let mut cart = Cart::new();
        cart.add_item(&a, 2);

        let lines_before = cart.lines().to_vec();
        let totals_before = compute_totals(cart.lines());

        cart.add_item(&b, 1);
        cart.remove_item("b");

        assert_eq!(cart.lines(), lines_before.as_slice());
        assert_eq!(compute_totals(cart.lines()), totals_before);
    }

    #[test]
    fn clear_empties_the_cart() {
        let p = product("p", Decimal::new(100, 2), 4);
        let mut cart = Cart::new();
        cart.add_item(&p, 2);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn quantities_stay_within_ceiling_across_mutations() {
        let p = product("p", Decimal::new(100, 2), 3);
        let mut cart = Cart::new();

        cart.add_item(&p, 2);
        cart.add_item(&p, 2);
        cart.set_quantity("p", 2);
        cart.add_item(&p, 5);

        for line in cart.lines() {
            assert!(line.quantity >= 1);
            assert!(line.quantity <= line.stock_ceiling);
        }
    }
}
