//! Price estimation.
//!
//! The confirm dialog shows `guest_count × price_per_person × 1.15`, rounded
//! to cents. The per-guest price is recomputed from the server's transaction
//! amount whenever a booking comes back, so the estimate tracks what the
//! backend actually priced.

/// Platform fee applied on top of the vendor price.
pub const PLATFORM_FEE_MULTIPLIER: f64 = 1.15;

/// Round to two decimal places, half away from zero.
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimate for `guest_count` guests at `price_per_person`, fee included.
#[must_use]
pub fn estimate(guest_count: u32, price_per_person: f64) -> f64 {
    round_to_cents(f64::from(guest_count) * price_per_person * PLATFORM_FEE_MULTIPLIER)
}

/// Per-guest price implied by a server amount.
///
/// Zero guests yields 0 rather than a division by zero.
#[must_use]
pub fn price_per_person(amount: f64, guest_count: u32) -> f64 {
    if guest_count == 0 {
        0.0
    } else {
        amount / f64::from(guest_count)
    }
}

/// Total for the success summary: `guest_count × price_per_person`, 2 dp.
#[must_use]
pub fn subtotal(guest_count: u32, price_per_person: f64) -> f64 {
    round_to_cents(f64::from(guest_count) * price_per_person)
}
