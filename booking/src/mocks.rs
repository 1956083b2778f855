//! In-memory collaborators for tests and the demo binary.

use crate::api::{ApiFuture, BookingApi};
use crate::error::BookingError;
use crate::notify::{Notifier, Toast};
use crate::request::{AvailabilitySlot, CreateBookingRequest, PaymentIntentRequest};
use crate::types::{
    BookingDraft, BookingId, BookingRecord, Marketplace, PaymentIntent, Transaction, Vendor,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct Calls {
    list: AtomicUsize,
    booking: AtomicUsize,
    intent: AtomicUsize,
    availability: AtomicUsize,
}

#[derive(Debug, Default)]
struct Recorded {
    bookings: Vec<CreateBookingRequest>,
    intents: Vec<PaymentIntentRequest>,
    slots: Vec<AvailabilitySlot>,
}

/// In-memory booking backend
///
/// Succeeds by default, pricing each booking at the request's `amount`.
/// Builder methods script failures and odd responses; call counters and
/// recorded requests let tests check what reached the backend.
#[derive(Debug, Default)]
pub struct InMemoryBookingApi {
    vendors: Vec<Vendor>,
    booking_error: Option<BookingError>,
    intent_error: Option<BookingError>,
    availability_error: Option<BookingError>,
    omit_booking_id: bool,
    amount: Option<f64>,
    latency: Option<Duration>,
    calls: Arc<Calls>,
    recorded: Arc<Mutex<Recorded>>,
}

impl InMemoryBookingApi {
    /// Backend with no vendors that accepts every request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `vendors` from the listing endpoint
    #[must_use]
    pub fn with_vendors(mut self, vendors: Vec<Vendor>) -> Self {
        self.vendors = vendors;
        self
    }

    /// Reject every booking creation with `error`
    #[must_use]
    pub fn failing_bookings(mut self, error: BookingError) -> Self {
        self.booking_error = Some(error);
        self
    }

    /// Reject every payment-intent request with `error`
    #[must_use]
    pub fn failing_intents(mut self, error: BookingError) -> Self {
        self.intent_error = Some(error);
        self
    }

    /// Reject every availability save with `error`
    #[must_use]
    pub fn failing_availability(mut self, error: BookingError) -> Self {
        self.availability_error = Some(error);
        self
    }

    /// Create bookings whose response carries no booking id
    #[must_use]
    pub const fn without_booking_id(mut self) -> Self {
        self.omit_booking_id = true;
        self
    }

    /// Price every booking at `amount`, ignoring the request
    #[must_use]
    pub const fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Delay every response by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Vendor listing requests received
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.calls.list.load(Ordering::SeqCst)
    }

    /// Booking creation requests received
    #[must_use]
    pub fn booking_calls(&self) -> usize {
        self.calls.booking.load(Ordering::SeqCst)
    }

    /// Payment-intent requests received
    #[must_use]
    pub fn intent_calls(&self) -> usize {
        self.calls.intent.load(Ordering::SeqCst)
    }

    /// Availability saves received
    #[must_use]
    pub fn availability_calls(&self) -> usize {
        self.calls.availability.load(Ordering::SeqCst)
    }

    /// Booking requests received, in order
    #[must_use]
    pub fn booking_requests(&self) -> Vec<CreateBookingRequest> {
        lock(&self.recorded).bookings.clone()
    }

    /// Payment-intent requests received, in order
    #[must_use]
    pub fn intent_requests(&self) -> Vec<PaymentIntentRequest> {
        lock(&self.recorded).intents.clone()
    }

    /// Availability slots saved, in order
    #[must_use]
    pub fn saved_slots(&self) -> Vec<AvailabilitySlot> {
        lock(&self.recorded).slots.clone()
    }

    fn respond<T: Send + 'static>(&self, result: crate::error::Result<T>) -> ApiFuture<T> {
        let latency = self.latency;
        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            result
        })
    }
}

impl BookingApi for InMemoryBookingApi {
    fn list_vendors(&self, _marketplace: Marketplace) -> ApiFuture<Vec<Vendor>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        self.respond(Ok(self.vendors.clone()))
    }

    fn create_booking(&self, request: CreateBookingRequest) -> ApiFuture<BookingDraft> {
        let n = self.calls.booking.fetch_add(1, Ordering::SeqCst) + 1;
        let marketplace = request.marketplace;
        let amount = self.amount.or(request.amount);
        lock(&self.recorded).bookings.push(request);

        if let Some(error) = &self.booking_error {
            return self.respond(Err(error.clone()));
        }

        let booking_id = (!self.omit_booking_id).then(|| BookingId::new(format!("bk-{n}")));
        let mut raw = serde_json::Map::new();
        if let Some(id) = &booking_id {
            raw.insert(marketplace.booking_field(), id.as_str().into());
        }
        raw.insert("status".to_string(), "pending".into());

        self.respond(Ok(BookingDraft {
            booking: BookingRecord {
                booking_id,
                raw: serde_json::Value::Object(raw),
            },
            transaction: Transaction { amount },
        }))
    }

    fn create_payment_intent(&self, request: PaymentIntentRequest) -> ApiFuture<PaymentIntent> {
        let n = self.calls.intent.fetch_add(1, Ordering::SeqCst) + 1;
        let booking_id = request.booking_id.to_string();
        lock(&self.recorded).intents.push(request);

        if let Some(error) = &self.intent_error {
            return self.respond(Err(error.clone()));
        }

        self.respond(Ok(PaymentIntent::new(serde_json::json!({
            "id": format!("pi_{n}"),
            "client_secret": format!("pi_{n}_secret"),
            "metadata": { "booking_id": booking_id },
        }))))
    }

    fn add_availability(&self, _marketplace: Marketplace, slot: AvailabilitySlot) -> ApiFuture<()> {
        self.calls.availability.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = &self.availability_error {
            return self.respond(Err(error.clone()));
        }

        lock(&self.recorded).slots.push(slot);
        self.respond(Ok(()))
    }
}

/// Notifier that keeps every toast for later inspection
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toasts shown so far, oldest first
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        lock(&self.toasts).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        lock(&self.toasts).push(toast);
    }
}
