//! Helpers for monetary values.

/// Round `amount` to whole cents, rounding halves up.
///
/// Amounts in this application are never negative (they are normalised at
/// load time), so rounding half away from zero is the same as half up.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
