//! Request/response facade over the booking flow store.
//!
//! Pages talk to [`BookingFlow`]; it sends intents to the store and waits
//! for the matching result action, so callers get a `Result` per step.

use crate::actions::BookingFlowAction;
use crate::environment::BookingEnvironment;
use crate::error::{BookingError, Result};
use crate::reducer::BookingFlowReducer;
use crate::state::{BookingFlowState, FlowPhase};
use crate::types::{
    BillingDetails, BookedInfo, BookingDraft, EventDetails, MenuDetails, OrderDetails,
    PaymentIntent, PaymentMethodId, Vendor, VendorId,
};
use std::time::Duration;
use vibes_runtime::Store;

/// Store running the booking flow reducer
pub type BookingStore =
    Store<BookingFlowState, BookingFlowAction, BookingEnvironment, BookingFlowReducer>;

/// Default time to wait for a backend round-trip
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// One booking flow, driven step by step.
#[derive(Clone)]
pub struct BookingFlow {
    store: BookingStore,
    response_timeout: Duration,
}

impl BookingFlow {
    /// Create a flow over a fresh store
    #[must_use]
    pub fn new(env: BookingEnvironment) -> Self {
        Self::with_state(BookingFlowState::new(), env)
    }

    /// Create a flow starting from `state` (e.g. a page with a vendor preselected)
    #[must_use]
    pub fn with_state(state: BookingFlowState, env: BookingEnvironment) -> Self {
        Self {
            store: Store::new(state, BookingFlowReducer::new(), env),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    /// Override how long each step waits for the backend
    #[must_use]
    pub const fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// The underlying store, for subscribing to actions
    #[must_use]
    pub const fn store(&self) -> &BookingStore {
        &self.store
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> BookingFlowState {
        self.store.state(Clone::clone).await
    }

    /// Current phase
    pub async fn phase(&self) -> FlowPhase {
        self.store.state(|s| s.phase).await
    }

    /// Estimate shown in the confirm dialog, if one is open
    pub async fn estimate(&self) -> Option<f64> {
        self.store.state(BookingFlowState::estimate).await
    }

    /// Fetch the marketplace listing.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or [`BookingError::Store`] on timeout.
    #[tracing::instrument(skip(self))]
    pub async fn load_vendors(&self) -> Result<Vec<Vendor>> {
        let result = self
            .store
            .send_and_wait_for(
                BookingFlowAction::LoadVendors,
                BookingFlowAction::is_vendors_result,
                self.response_timeout,
            )
            .await?;

        match result {
            BookingFlowAction::VendorsLoaded { vendors } => Ok(vendors),
            BookingFlowAction::VendorsLoadFailed { error } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Pick the vendor to book.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidPhase`] while a dialog is open.
    pub async fn select_vendor(&self, vendor_id: VendorId) -> Result<()> {
        self.require_phase("select a vendor", &[FlowPhase::Idle]).await?;
        self.store.send(BookingFlowAction::SelectVendor { vendor_id }).await?;
        Ok(())
    }

    /// Pick a menu, or `None` for a custom request.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidPhase`] while a dialog is open.
    pub async fn select_menu(&self, menu: Option<MenuDetails>) -> Result<()> {
        self.require_phase("select a menu", &[FlowPhase::Idle]).await?;
        self.store.send(BookingFlowAction::SelectMenu { menu }).await?;
        Ok(())
    }

    /// Record menu details fetched for the selected menu.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the store is shutting down.
    pub async fn set_menu_details(&self, menu: MenuDetails) -> Result<()> {
        self.store.send(BookingFlowAction::MenuDetailsReceived { menu }).await?;
        Ok(())
    }

    /// Attach an existing order as a fallback summary source.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if the store is shutting down.
    pub async fn use_order(&self, order: OrderDetails) -> Result<()> {
        self.store.send(BookingFlowAction::UseOrder { order }).await?;
        Ok(())
    }

    /// Open the details dialog.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidPhase`] unless the flow is idle.
    pub async fn open_details(&self) -> Result<()> {
        self.require_phase("open the details dialog", &[FlowPhase::Idle]).await?;
        self.store.send(BookingFlowAction::OpenDetails).await?;
        Ok(())
    }

    /// Submit event details and create the booking.
    ///
    /// On success the confirm dialog is open with the server-priced estimate.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::NoVendorSelected`] without calling the backend,
    /// or the backend error; the details dialog stays open either way.
    /// Returns [`BookingError::Abandoned`] if the dialog was closed before
    /// the backend answered.
    #[tracing::instrument(skip(self, details), fields(guest_count = details.guest_count))]
    pub async fn submit_details(&self, details: EventDetails) -> Result<BookingDraft> {
        let attempt = self
            .store
            .state(|s| match s.phase {
                FlowPhase::DetailsOpen if s.selected_vendor.is_none() => {
                    Err(BookingError::NoVendorSelected)
                },
                FlowPhase::DetailsOpen => Ok(s.attempt),
                phase => Err(invalid_phase("submit details", phase)),
            })
            .await?;

        let result = self
            .store
            .send_and_wait_for(
                BookingFlowAction::SubmitDetails { details },
                move |action| action.is_booking_result(attempt),
                self.response_timeout,
            )
            .await?;
        self.ensure_current(attempt, "submit details").await?;

        match result {
            BookingFlowAction::BookingCreated { draft, .. } => Ok(draft),
            BookingFlowAction::BookingCreationFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Open the confirm dialog directly from captured details.
    ///
    /// The booking is created when a payment method is selected.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidPhase`] unless the flow is idle or
    /// showing the details dialog.
    pub async fn open_confirm(&self, details: EventDetails) -> Result<()> {
        self.require_phase("open the confirm dialog", &[FlowPhase::Idle, FlowPhase::DetailsOpen])
            .await?;
        self.store.send(BookingFlowAction::OpenConfirm { details }).await?;
        Ok(())
    }

    /// Choose a payment method and obtain a payment intent.
    ///
    /// Reuses the pending booking when there is one; otherwise creates it
    /// first. The returned intent is handed to the payment UI.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::MissingBookingId`] if the booking has no id
    /// (the intent endpoint is not called), [`BookingError::MissingPaymentIntent`]
    /// if the response carries none, [`BookingError::Abandoned`] if the flow
    /// was closed meanwhile, or the backend error.
    #[tracing::instrument(skip(self, payment_method_id, billing))]
    pub async fn select_payment_method(
        &self,
        payment_method_id: PaymentMethodId,
        billing: BillingDetails,
    ) -> Result<PaymentIntent> {
        let attempt = self
            .store
            .state(|s| match s.phase {
                FlowPhase::ConfirmOpen if s.pending_payment.is_none() && s.event_details.is_none() => {
                    Err(BookingError::NoBookingInProgress)
                },
                FlowPhase::ConfirmOpen
                    if s.pending_payment.is_none() && s.selected_vendor.is_none() =>
                {
                    Err(BookingError::NoVendorSelected)
                },
                FlowPhase::ConfirmOpen => Ok(s.attempt),
                phase => Err(invalid_phase("select a payment method", phase)),
            })
            .await?;

        let result = self
            .store
            .send_and_wait_for(
                BookingFlowAction::SelectPaymentMethod {
                    payment_method_id,
                    billing,
                },
                move |action| action.is_payment_result(attempt),
                self.response_timeout,
            )
            .await?;
        self.ensure_current(attempt, "select a payment method").await?;

        match result {
            BookingFlowAction::PaymentIntentCreated { intent, .. } => Ok(intent),
            BookingFlowAction::PaymentIntentFailed { error, .. } => Err(error),
            other => Err(unexpected(&other)),
        }
    }

    /// Report that the payment UI completed, and get the success summary.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidPhase`] unless a payment intent is pending.
    pub async fn confirm_payment(&self) -> Result<BookedInfo> {
        self.require_phase("confirm payment", &[FlowPhase::AwaitingPayment]).await?;
        self.store.send(BookingFlowAction::ConfirmPayment).await?;
        self.booked_info().await
    }

    /// Show the success dialog, assembling a summary from whatever exists.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidPhase`] while a request is in flight.
    pub async fn open_success(&self) -> Result<BookedInfo> {
        let phase = self.phase().await;
        if phase.is_busy() {
            return Err(invalid_phase("open the success dialog", phase));
        }
        self.store.send(BookingFlowAction::OpenSuccess).await?;
        self.booked_info().await
    }

    /// Close whichever dialog is open. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] only if the store is shutting down.
    pub async fn close(&self) -> Result<()> {
        self.store.send(BookingFlowAction::CloseDialog).await?;
        Ok(())
    }

    /// Stop accepting actions and wait for in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Store`] if requests are still running at the timeout.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        self.store.shutdown(timeout).await?;
        Ok(())
    }

    async fn booked_info(&self) -> Result<BookedInfo> {
        self.store
            .state(|s| s.booked_info.clone())
            .await
            .ok_or(BookingError::NoBookingInProgress)
    }

    async fn ensure_current(&self, attempt: u64, operation: &'static str) -> Result<()> {
        if self.store.state(|s| s.attempt).await == attempt {
            Ok(())
        } else {
            Err(BookingError::Abandoned { operation })
        }
    }

    async fn require_phase(&self, operation: &'static str, allowed: &[FlowPhase]) -> Result<()> {
        let phase = self.phase().await;
        if allowed.contains(&phase) {
            Ok(())
        } else {
            Err(invalid_phase(operation, phase))
        }
    }
}

impl std::fmt::Debug for BookingFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingFlow")
            .field("response_timeout", &self.response_timeout)
            .finish_non_exhaustive()
    }
}

fn invalid_phase(operation: &'static str, phase: FlowPhase) -> BookingError {
    BookingError::InvalidPhase {
        operation,
        phase: phase.to_string(),
    }
}

fn unexpected(action: &BookingFlowAction) -> BookingError {
    BookingError::Store(format!("unexpected result action: {action:?}"))
}
