//! Booking flow state.

use crate::error::BookingError;
use crate::pricing;
use crate::summary::SummarySources;
use crate::types::{
    BillingDetails, BookedInfo, BookingDraft, ConfirmPayload, EventDetails, MenuDetails,
    OrderDetails, PaymentIntent, PaymentMethodId, Vendor, VendorId,
};
use chrono::{DateTime, Utc};
use std::fmt;

/// Where the confirmation flow is
///
/// ```text
/// Idle ─► DetailsOpen ─► CreatingBooking ─► ConfirmOpen ─► RequestingPayment
///   ▲                                                            │
///   │                      Confirmed ◄── AwaitingPayment ◄───────┘
///   └──────────── CloseDialog from any phase
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowPhase {
    /// No dialog open
    #[default]
    Idle,
    /// Details dialog collecting event metadata
    DetailsOpen,
    /// Details submitted, booking creation in flight
    CreatingBooking,
    /// Confirm dialog showing the estimate
    ConfirmOpen,
    /// Payment method chosen, booking and/or intent request in flight
    RequestingPayment,
    /// Intent handed to the payment UI
    AwaitingPayment,
    /// Success dialog showing the summary
    Confirmed,
}

impl FlowPhase {
    /// Whether a backend request is in flight for this phase
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::CreatingBooking | Self::RequestingPayment)
    }
}

impl fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::DetailsOpen => "details-open",
            Self::CreatingBooking => "creating-booking",
            Self::ConfirmOpen => "confirm-open",
            Self::RequestingPayment => "requesting-payment",
            Self::AwaitingPayment => "awaiting-payment",
            Self::Confirmed => "confirmed",
        };
        f.write_str(name)
    }
}

/// State of one booking flow.
///
/// Vendor, menu and order context belong to the page and survive a closed
/// dialog. Everything from `event_details` down belongs to the current
/// confirmation cycle and is discarded on close.
#[derive(Clone, Debug, Default)]
pub struct BookingFlowState {
    /// Current phase
    pub phase: FlowPhase,
    /// Confirmation cycle counter; results tagged with an older value are stale
    pub attempt: u64,

    /// Marketplace listing
    pub vendors: Vec<Vendor>,
    /// Listing request in flight
    pub vendors_loading: bool,
    /// Vendor being booked
    pub selected_vendor: Option<VendorId>,
    /// Menu picked on the vendor page
    pub selected_menu: Option<MenuDetails>,
    /// Menu details fetched for the selected menu
    pub menu_details: Option<MenuDetails>,
    /// Existing order the flow was opened from
    pub order_details: Option<OrderDetails>,

    /// Details captured by the details dialog
    pub event_details: Option<EventDetails>,
    /// Server-acknowledged booking awaiting payment
    pub pending_payment: Option<BookingDraft>,
    /// Guest count and price behind the displayed estimate
    pub confirm_payload: Option<ConfirmPayload>,
    /// Payment method chosen in the confirm dialog
    pub payment_method: Option<PaymentMethodId>,
    /// Billing contact sent with the intent request
    pub billing: Option<BillingDetails>,
    /// Intent handed to the payment UI
    pub payment_intent: Option<PaymentIntent>,
    /// Success summary
    pub booked_info: Option<BookedInfo>,
    /// When the payment was confirmed
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Last failure shown to the user
    pub last_error: Option<BookingError>,
}

impl BookingFlowState {
    /// Fresh state for a page with no vendor context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a backend request is in flight
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.phase.is_busy() || self.vendors_loading
    }

    /// Estimate shown in the confirm dialog, fee included
    #[must_use]
    pub fn estimate(&self) -> Option<f64> {
        self.confirm_payload.as_ref().map(ConfirmPayload::estimate)
    }

    /// Per-guest price known before the backend prices anything.
    #[must_use]
    pub fn local_price_per_person(&self) -> f64 {
        [
            self.menu_details.as_ref().map(|m| m.price_per_person),
            self.selected_menu.as_ref().map(|m| m.price_per_person),
            self.order_details.as_ref().and_then(|o| o.price_per_person),
        ]
        .into_iter()
        .flatten()
        .find(|price| *price > 0.0)
        .unwrap_or(0.0)
    }

    /// Confirm payload for `guest_count`, priced from the server amount when
    /// there is one.
    #[must_use]
    pub fn confirm_payload_for(&self, guest_count: u32, draft: Option<&BookingDraft>) -> ConfirmPayload {
        let price_per_person = draft
            .and_then(BookingDraft::amount)
            .map_or_else(
                || self.local_price_per_person(),
                |amount| pricing::price_per_person(amount, guest_count),
            );
        ConfirmPayload {
            guest_count,
            price_per_person,
        }
    }

    /// Sources for the success summary
    #[must_use]
    pub fn summary_sources(&self) -> SummarySources<'_> {
        SummarySources {
            confirm_payload: self.confirm_payload.as_ref(),
            event_details: self.event_details.as_ref(),
            order_details: self.order_details.as_ref(),
            menu_details: self.menu_details.as_ref(),
            selected_menu: self.selected_menu.as_ref(),
            vendors: &self.vendors,
            vendor_id: self.selected_vendor.as_ref(),
            booking_draft: self.pending_payment.as_ref(),
        }
    }

    /// Drop everything belonging to the current confirmation cycle.
    pub(crate) fn clear_cycle(&mut self) {
        self.event_details = None;
        self.pending_payment = None;
        self.confirm_payload = None;
        self.payment_method = None;
        self.billing = None;
        self.payment_intent = None;
        self.booked_info = None;
        self.confirmed_at = None;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookingId, BookingRecord, Transaction};

    fn draft(amount: Option<f64>) -> BookingDraft {
        BookingDraft {
            booking: BookingRecord {
                booking_id: Some(BookingId::new("b-1")),
                raw: serde_json::Value::Null,
            },
            transaction: Transaction { amount },
        }
    }

    #[test]
    fn test_busy_phases() {
        assert!(FlowPhase::CreatingBooking.is_busy());
        assert!(FlowPhase::RequestingPayment.is_busy());
        assert!(!FlowPhase::ConfirmOpen.is_busy());
        assert!(!FlowPhase::Idle.is_busy());
    }

    #[test]
    fn test_server_amount_overrides_local_price() {
        let state = BookingFlowState {
            selected_menu: Some(MenuDetails {
                id: None,
                name: "Buffet".to_string(),
                price_per_person: 35.0,
            }),
            ..BookingFlowState::default()
        };

        let local = state.confirm_payload_for(20, None);
        assert!((local.price_per_person - 35.0).abs() < f64::EPSILON);

        let priced = state.confirm_payload_for(20, Some(&draft(Some(1000.0))));
        assert!((priced.price_per_person - 50.0).abs() < f64::EPSILON);

        let unpriced = state.confirm_payload_for(20, Some(&draft(None)));
        assert!((unpriced.price_per_person - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clear_cycle_keeps_page_context() {
        let mut state = BookingFlowState {
            selected_vendor: Some(VendorId::new("v-1")),
            pending_payment: Some(draft(Some(10.0))),
            confirm_payload: Some(ConfirmPayload {
                guest_count: 1,
                price_per_person: 10.0,
            }),
            ..BookingFlowState::default()
        };

        state.clear_cycle();

        assert!(state.pending_payment.is_none());
        assert!(state.estimate().is_none());
        assert_eq!(state.selected_vendor, Some(VendorId::new("v-1")));
    }
}
