//! Order pricing: a pure function from cart lines to display totals.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::CartLine;

/// Orders with a subtotal strictly above this amount ship free.
fn free_shipping_threshold() -> Decimal {
    Decimal::new(50_00, 2)
}

/// Flat shipping fee below the free-shipping threshold.
fn shipping_fee() -> Decimal {
    Decimal::new(9_99, 2)
}

/// Sales tax rate applied to the subtotal.
fn tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// Derived order totals. Fields are rounded to two decimal places when the
/// struct is built; the API response is the display boundary, and everything
/// upstream is exact `Decimal` arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Compute subtotal, shipping, tax, and grand total for a set of lines.
///
/// Deterministic and side-effect free; totals are derived from the current
/// lines on every call, never cached.
///
/// - `subtotal` accumulates exact `price × quantity` per line.
/// - `shipping` is zero for an empty subtotal (no charge on an empty cart)
///   and above the strict `> 50.00` threshold; otherwise the flat fee.
/// - `tax` is 8% of the unrounded subtotal.
#[must_use]
pub fn compute_totals(lines: &[CartLine]) -> CartTotals {
    let subtotal: Decimal = lines
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum();

    let shipping = if subtotal.is_zero() || subtotal > free_shipping_threshold() {
        Decimal::ZERO
    } else {
        shipping_fee()
    };

    let tax = subtotal * tax_rate();
    let total = subtotal + shipping + tax;

    CartTotals {
        subtotal: display(subtotal),
        shipping: display(shipping),
        tax: display(tax),
        total: display(total),
    }
}

/// Round to cents and fix the scale at two digits so serialized amounts
/// always read `"12.30"`, never `"12.3"` or `"0"`.
fn display(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded
}
