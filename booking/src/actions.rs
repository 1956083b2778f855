//! Booking flow actions.

use crate::error::BookingError;
use crate::types::{
    BillingDetails, BookingDraft, EventDetails, MenuDetails, OrderDetails, PaymentIntent,
    PaymentMethodId, Vendor, VendorId,
};

/// Everything that can happen to a booking flow.
///
/// User intents come in through the facade; results carrying an `attempt`
/// are fed back by effects and ignored once that attempt is abandoned.
#[derive(Clone, Debug, PartialEq)]
pub enum BookingFlowAction {
    // Page context
    /// Fetch the marketplace listing
    LoadVendors,
    /// Listing arrived
    VendorsLoaded {
        /// Vendors in listing order
        vendors: Vec<Vendor>,
    },
    /// Listing request failed
    VendorsLoadFailed {
        /// Why
        error: BookingError,
    },
    /// Pick the vendor to book
    SelectVendor {
        /// Vendor id
        vendor_id: VendorId,
    },
    /// Pick (or clear) a menu on the vendor page
    SelectMenu {
        /// The menu, `None` for a custom request
        menu: Option<MenuDetails>,
    },
    /// Menu details fetched for the selected menu
    MenuDetailsReceived {
        /// The details
        menu: MenuDetails,
    },
    /// Open the flow from an existing order
    UseOrder {
        /// The order
        order: OrderDetails,
    },

    // Details dialog
    /// Open the details dialog
    OpenDetails,
    /// Submit captured details and create the booking
    SubmitDetails {
        /// What the dialog collected
        details: EventDetails,
    },
    /// Booking creation succeeded
    BookingCreated {
        /// Cycle the request belonged to
        attempt: u64,
        /// Server-acknowledged booking
        draft: BookingDraft,
    },
    /// Booking creation failed
    BookingCreationFailed {
        /// Cycle the request belonged to
        attempt: u64,
        /// Why
        error: BookingError,
    },

    // Confirm dialog
    /// Open the confirm dialog directly; the booking is created on method selection
    OpenConfirm {
        /// Details the booking will be created with
        details: EventDetails,
    },
    /// Choose a payment method and request a payment intent
    SelectPaymentMethod {
        /// Payment method id
        payment_method_id: PaymentMethodId,
        /// Billing contact
        billing: BillingDetails,
    },
    /// Intent created (booking created on the way if needed)
    PaymentIntentCreated {
        /// Cycle the request belonged to
        attempt: u64,
        /// Booking the intent is for
        draft: BookingDraft,
        /// The intent
        intent: PaymentIntent,
    },
    /// Intent request (or the booking creation before it) failed
    PaymentIntentFailed {
        /// Cycle the request belonged to
        attempt: u64,
        /// Why
        error: BookingError,
        /// Booking created before the failure, kept for the retry
        draft: Option<BookingDraft>,
    },

    // Success
    /// The payment UI reported success
    ConfirmPayment,
    /// Show the success dialog, assembling a summary from whatever exists
    OpenSuccess,
    /// Close whichever dialog is open
    CloseDialog,
}

impl BookingFlowAction {
    /// Attempt a result action belongs to, `None` for intents
    #[must_use]
    pub const fn attempt(&self) -> Option<u64> {
        match self {
            Self::BookingCreated { attempt, .. }
            | Self::BookingCreationFailed { attempt, .. }
            | Self::PaymentIntentCreated { attempt, .. }
            | Self::PaymentIntentFailed { attempt, .. } => Some(*attempt),
            _ => None,
        }
    }

    /// Whether this is the outcome of booking creation for `attempt`
    #[must_use]
    pub const fn is_booking_result(&self, attempt: u64) -> bool {
        matches!(
            self,
            Self::BookingCreated { attempt: a, .. } | Self::BookingCreationFailed { attempt: a, .. }
                if *a == attempt
        )
    }

    /// Whether this is the outcome of a payment-intent request for `attempt`
    #[must_use]
    pub const fn is_payment_result(&self, attempt: u64) -> bool {
        matches!(
            self,
            Self::PaymentIntentCreated { attempt: a, .. } | Self::PaymentIntentFailed { attempt: a, .. }
                if *a == attempt
        )
    }

    /// Whether this is the outcome of a vendor listing request
    #[must_use]
    pub const fn is_vendors_result(&self) -> bool {
        matches!(self, Self::VendorsLoaded { .. } | Self::VendorsLoadFailed { .. })
    }
}
