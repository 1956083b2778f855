//! # Vibes Booking
//!
//! The booking-and-payment confirmation flow shared by the catering,
//! staffing and event marketplaces.
//!
//! ```text
//! ┌──────────────┐  SubmitDetails   ┌─────────────────┐  BookingCreated  ┌─────────────┐
//! │ DetailsOpen  │ ───────────────► │ CreatingBooking │ ───────────────► │ ConfirmOpen │
//! └──────────────┘ ◄─────────────── └─────────────────┘                  └──────┬──────┘
//!        ▲          BookingCreationFailed                    SelectPaymentMethod │
//!        │ OpenDetails                                                          ▼
//! ┌──────┴───────┐                 ┌─────────────────┐  PaymentIntentCreated ┌───────────────────┐
//! │     Idle     │ ◄── Close ───── │    Confirmed    │ ◄─ AwaitingPayment ◄─ │ RequestingPayment │
//! └──────────────┘                 └─────────────────┘    (ConfirmPayment)   └───────────────────┘
//! ```
//!
//! - [`BookingFlowReducer`] holds every transition; backend calls and
//!   toasts are returned as effects.
//! - [`BookingFlow`] runs the reducer in a [`vibes_runtime::Store`] and
//!   gives pages one `async` call per step.
//! - [`HttpBookingApi`] talks to the backend; [`mocks::InMemoryBookingApi`]
//!   stands in for it in tests and the demo.
//! - [`build_booked_summary`] is the only place a success summary is built.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use vibes_booking::mocks::InMemoryBookingApi;
//! use vibes_booking::{BookingEnvironment, BookingFlow, Marketplace, VendorId};
//!
//! # async fn example() -> vibes_booking::Result<()> {
//! let api = Arc::new(InMemoryBookingApi::new().with_amount(1000.0));
//! let flow = BookingFlow::new(BookingEnvironment::new(api, Marketplace::Catering));
//!
//! flow.select_vendor(VendorId::new("v-1")).await?;
//! flow.open_details().await?;
//! // flow.submit_details(details).await? opens the confirm dialog
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod api;
pub mod availability;
pub mod config;
pub mod environment;
pub mod error;
pub mod flow;
pub mod mocks;
pub mod notify;
pub mod pricing;
pub mod reducer;
pub mod request;
pub mod state;
pub mod summary;
pub mod types;

pub use actions::BookingFlowAction;
pub use api::{BookingApi, HttpBookingApi};
pub use availability::{AvailabilityAction, AvailabilityDialog, AvailabilityReducer, AvailabilityState};
pub use config::BookingConfig;
pub use environment::BookingEnvironment;
pub use error::{BookingError, Result};
pub use flow::{BookingFlow, BookingStore};
pub use notify::{Notifier, Toast, ToastLevel, TracingNotifier};
pub use reducer::BookingFlowReducer;
pub use request::{AvailabilitySlot, CreateBookingRequest, PaymentIntentRequest};
pub use state::{BookingFlowState, FlowPhase};
pub use summary::{SummarySources, build_booked_summary};
pub use types::{
    BillingDetails, BookedInfo, BookingDraft, BookingId, ConfirmPayload, EventDetails, Marketplace,
    MenuDetails, OrderDetails, PaymentIntent, PaymentMethodId, Vendor, VendorId,
};
