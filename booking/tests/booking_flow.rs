//! Integration tests for the booking flow running in a Store
//!
//! Each test drives a `BookingFlow` against the in-memory backend and
//! checks both what the caller gets back and what reached the backend.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use vibes_booking::mocks::{InMemoryBookingApi, RecordingNotifier};
use vibes_booking::{
    AvailabilityAction, AvailabilityReducer, AvailabilitySlot, AvailabilityState,
    BillingDetails, BookingEnvironment, BookingError, BookingFlow, BookingFlowState, EventDetails,
    FlowPhase, Marketplace, MenuDetails, PaymentMethodId, ToastLevel, Vendor, VendorId,
};
use vibes_runtime::Store;
use vibes_testing::test_clock;

fn vendors() -> Vec<Vendor> {
    vec![Vendor {
        id: VendorId::new("v-1"),
        name: "Spice Route Catering".to_string(),
        mobile_no: None,
        category_id: None,
        address: None,
    }]
}

fn details(guests: u32) -> EventDetails {
    EventDetails {
        event_name: "Rooftop Reunion".to_string(),
        event_address: "77 High St".to_string(),
        event_type: None,
        event_type_id: None,
        start_date: NaiveDate::from_ymd_opt(2025, 11, 8).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 11, 8).unwrap(),
        start_time: None,
        end_time: None,
        guest_count: guests,
    }
}

fn card() -> PaymentMethodId {
    PaymentMethodId::new("pm_card_visa")
}

fn env(api: &Arc<InMemoryBookingApi>, notifier: &Arc<RecordingNotifier>) -> BookingEnvironment {
    BookingEnvironment::new(Arc::clone(api) as _, Marketplace::Catering)
        .with_notifier(Arc::clone(notifier) as _)
        .with_clock(Arc::new(test_clock()))
}

/// Flow with vendors loaded and `v-1` selected.
async fn ready_flow(api: InMemoryBookingApi) -> (BookingFlow, Arc<InMemoryBookingApi>, Arc<RecordingNotifier>) {
    let api = Arc::new(api.with_vendors(vendors()));
    let notifier = Arc::new(RecordingNotifier::new());
    let flow = BookingFlow::new(env(&api, &notifier)).with_response_timeout(Duration::from_secs(2));

    flow.load_vendors().await.unwrap();
    flow.select_vendor(VendorId::new("v-1")).await.unwrap();
    (flow, api, notifier)
}

async fn wait_for_toasts(notifier: &RecordingNotifier, count: usize) {
    for _ in 0..100 {
        if notifier.toasts().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn test_full_booking_flow() {
    let (flow, api, notifier) = ready_flow(InMemoryBookingApi::new().with_amount(1000.0)).await;

    flow.open_details().await.unwrap();
    let draft = flow.submit_details(details(20)).await.unwrap();
    assert_eq!(draft.amount(), Some(1000.0));

    let state = flow.snapshot().await;
    assert_eq!(state.phase, FlowPhase::ConfirmOpen);
    assert!((state.confirm_payload.unwrap().price_per_person - 50.0).abs() < f64::EPSILON);
    assert!((flow.estimate().await.unwrap() - 1150.0).abs() < f64::EPSILON);

    let intent = flow
        .select_payment_method(card(), BillingDetails::default())
        .await
        .unwrap();
    assert_eq!(intent.id(), Some("pi_1"));
    assert_eq!(flow.phase().await, FlowPhase::AwaitingPayment);

    let info = flow.confirm_payment().await.unwrap();
    assert_eq!(info.vendor_name, "Spice Route Catering");
    assert_eq!(info.event_name, "Rooftop Reunion");
    assert_eq!(info.guest_count, 20);
    assert!((info.total - 1000.0).abs() < f64::EPSILON);
    assert_eq!(info.booking_id.as_ref().map(|id| id.as_str()), Some("bk-1"));

    assert_eq!(api.booking_calls(), 1);
    assert_eq!(api.intent_calls(), 1);
    assert_eq!(api.intent_requests()[0].booking_id.as_str(), "bk-1");

    wait_for_toasts(&notifier, 1).await;
    assert_eq!(notifier.toasts()[0].level, ToastLevel::Success);
}

#[tokio::test]
async fn test_pending_booking_is_reused_on_retry() {
    let (flow, api, _notifier) = ready_flow(
        InMemoryBookingApi::new()
            .with_amount(600.0)
            .failing_intents(BookingError::Api {
                status: 502,
                message: "processor unavailable".to_string(),
            }),
    )
    .await;

    flow.open_details().await.unwrap();
    flow.submit_details(details(12)).await.unwrap();

    for attempt in 1..=2 {
        let result = flow.select_payment_method(card(), BillingDetails::default()).await;
        assert!(matches!(result, Err(BookingError::Api { status: 502, .. })));
        assert_eq!(flow.phase().await, FlowPhase::ConfirmOpen);
        assert_eq!(api.intent_calls(), attempt);
    }

    assert_eq!(api.booking_calls(), 1);
    let state = flow.snapshot().await;
    assert!(state.pending_payment.is_some());
}

#[tokio::test]
async fn test_missing_booking_id_rejects_before_intent() {
    let (flow, api, _notifier) =
        ready_flow(InMemoryBookingApi::new().with_amount(300.0).without_booking_id()).await;

    flow.open_details().await.unwrap();
    let draft = flow.submit_details(details(10)).await.unwrap();
    assert!(draft.booking_id().is_none());

    let result = flow.select_payment_method(card(), BillingDetails::default()).await;
    assert_eq!(result.unwrap_err(), BookingError::MissingBookingId);
    assert_eq!(api.intent_calls(), 0);
    assert_eq!(flow.phase().await, FlowPhase::ConfirmOpen);
}

#[tokio::test]
async fn test_booking_failure_keeps_details_open() {
    let (flow, api, notifier) = ready_flow(InMemoryBookingApi::new().failing_bookings(
        BookingError::Api {
            status: 409,
            message: "vendor is fully booked".to_string(),
        },
    ))
    .await;

    flow.open_details().await.unwrap();
    let result = flow.submit_details(details(40)).await;
    assert!(matches!(result, Err(BookingError::Api { status: 409, .. })));

    let state = flow.snapshot().await;
    assert_eq!(state.phase, FlowPhase::DetailsOpen);
    assert!(state.pending_payment.is_none());
    assert_eq!(api.booking_calls(), 1);

    wait_for_toasts(&notifier, 1).await;
    let toasts = notifier.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert!(toasts[0].message.contains("vendor is fully booked"));
}

#[tokio::test]
async fn test_submit_without_vendor_never_calls_backend() {
    let api = Arc::new(InMemoryBookingApi::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let flow = BookingFlow::new(env(&api, &notifier));

    flow.open_details().await.unwrap();
    let result = flow.submit_details(details(5)).await;

    assert_eq!(result.unwrap_err(), BookingError::NoVendorSelected);
    assert_eq!(api.booking_calls(), 0);
}

#[tokio::test]
async fn test_confirm_first_creates_booking_on_method_selection() {
    let api = InMemoryBookingApi::new();
    let (flow, api, _notifier) = ready_flow(api).await;
    flow.select_menu(Some(MenuDetails {
        id: Some("m-2".to_string()),
        name: "Tapas Spread".to_string(),
        price_per_person: 20.0,
    }))
    .await
    .unwrap();

    flow.open_confirm(details(50)).await.unwrap();
    assert!((flow.estimate().await.unwrap() - 1150.0).abs() < f64::EPSILON);
    assert_eq!(api.booking_calls(), 0);

    flow.select_payment_method(card(), BillingDetails::default())
        .await
        .unwrap();

    assert_eq!(api.booking_calls(), 1);
    assert_eq!(api.booking_requests()[0].amount, Some(1000.0));
    assert!((flow.estimate().await.unwrap() - 1150.0).abs() < f64::EPSILON);

    let info = flow.confirm_payment().await.unwrap();
    assert_eq!(info.menu_name, "Tapas Spread");
    assert!((info.price_per_person - 20.0).abs() < f64::EPSILON);
    assert!((info.total - 1000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_echoed_amount_keeps_local_estimate() {
    // No fixed amount: the backend prices the booking at what was sent
    let (flow, api, _notifier) = ready_flow(InMemoryBookingApi::new()).await;
    flow.select_menu(Some(MenuDetails {
        id: Some("m-1".to_string()),
        name: "Seasonal Buffet".to_string(),
        price_per_person: 20.0,
    }))
    .await
    .unwrap();

    flow.open_details().await.unwrap();
    let draft = flow.submit_details(details(50)).await.unwrap();

    assert_eq!(api.booking_requests()[0].amount, Some(1000.0));
    assert_eq!(draft.amount(), Some(1000.0));

    let state = flow.snapshot().await;
    assert!((state.confirm_payload.unwrap().price_per_person - 20.0).abs() < f64::EPSILON);
    assert!((flow.estimate().await.unwrap() - 1150.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_close_while_creating_discards_late_result() {
    let (flow, api, _notifier) = ready_flow(
        InMemoryBookingApi::new()
            .with_amount(900.0)
            .with_latency(Duration::from_millis(100)),
    )
    .await;

    flow.open_details().await.unwrap();
    let submit = {
        let flow = flow.clone();
        tokio::spawn(async move { flow.submit_details(details(30)).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(flow.phase().await, FlowPhase::CreatingBooking);
    flow.close().await.unwrap();

    // The server still answers; the flow has already moved on
    assert_eq!(
        submit.await.unwrap().unwrap_err(),
        BookingError::Abandoned {
            operation: "submit details"
        }
    );

    let state = flow.snapshot().await;
    assert_eq!(state.phase, FlowPhase::Idle);
    assert!(state.pending_payment.is_none());
    assert!(!state.is_busy());
    assert_eq!(api.booking_calls(), 1);
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (flow, _api, _notifier) = ready_flow(InMemoryBookingApi::new()).await;

    flow.close().await.unwrap();
    flow.open_details().await.unwrap();
    flow.close().await.unwrap();
    flow.close().await.unwrap();

    assert_eq!(flow.phase().await, FlowPhase::Idle);
}

#[tokio::test]
async fn test_steps_out_of_order_are_rejected() {
    let (flow, api, _notifier) = ready_flow(InMemoryBookingApi::new()).await;

    let result = flow.select_payment_method(card(), BillingDetails::default()).await;
    assert!(matches!(result, Err(BookingError::InvalidPhase { .. })));

    let result = flow.submit_details(details(3)).await;
    assert!(matches!(result, Err(BookingError::InvalidPhase { .. })));

    let result = flow.confirm_payment().await;
    assert!(matches!(result, Err(BookingError::InvalidPhase { .. })));

    assert_eq!(api.booking_calls(), 0);
}

#[tokio::test]
async fn test_open_success_without_payment_uses_fallbacks() {
    let (flow, _api, _notifier) = ready_flow(InMemoryBookingApi::new()).await;

    let info = flow.open_success().await.unwrap();

    assert_eq!(info.vendor_name, "Spice Route Catering");
    assert_eq!(info.menu_name, "Custom Menu");
    assert_eq!(info.event_name, "Your Event");
    assert_eq!(flow.phase().await, FlowPhase::Confirmed);
}

#[tokio::test]
async fn test_preselected_vendor_survives_listing() {
    let api = Arc::new(InMemoryBookingApi::new().with_latency(Duration::from_millis(10)));
    let notifier = Arc::new(RecordingNotifier::new());
    let state = BookingFlowState {
        selected_vendor: Some(VendorId::new("v-9")),
        ..BookingFlowState::default()
    };
    let flow = BookingFlow::with_state(state, env(&api, &notifier));

    let listed = flow.load_vendors().await.unwrap();
    assert!(listed.is_empty());
    assert_eq!(api.list_calls(), 1);
    assert_eq!(
        flow.snapshot().await.selected_vendor,
        Some(VendorId::new("v-9"))
    );
}

#[tokio::test]
async fn test_availability_dialog_in_store() {
    let api = Arc::new(InMemoryBookingApi::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Store::new(
        AvailabilityState::default(),
        AvailabilityReducer::new(),
        env(&api, &notifier),
    );

    let slot = AvailabilitySlot {
        vendor_id: VendorId::new("v-1"),
        date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        from_time: "09:00".to_string(),
        to_time: "17:00".to_string(),
    };

    store.send(AvailabilityAction::Open).await.unwrap();
    let result = store
        .send_and_wait_for(
            AvailabilityAction::Submit { slot: slot.clone() },
            |action| {
                matches!(
                    action,
                    AvailabilityAction::Saved { .. } | AvailabilityAction::SaveFailed { .. }
                )
            },
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert!(matches!(result, AvailabilityAction::Saved { .. }));
    assert!(store.state(AvailabilityState::is_closed).await);
    assert_eq!(api.saved_slots(), vec![slot]);
}

#[tokio::test]
async fn test_availability_failure_keeps_dialog_open() {
    let api = Arc::new(
        InMemoryBookingApi::new().failing_availability(BookingError::Unauthorized),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Store::new(
        AvailabilityState::default(),
        AvailabilityReducer::new(),
        env(&api, &notifier),
    );

    store.send(AvailabilityAction::Open).await.unwrap();
    store
        .send_and_wait_for(
            AvailabilityAction::Submit {
                slot: AvailabilitySlot {
                    vendor_id: VendorId::new("v-1"),
                    date: NaiveDate::from_ymd_opt(2025, 12, 2).unwrap(),
                    from_time: "09:00".to_string(),
                    to_time: "12:00".to_string(),
                },
            },
            |action| matches!(action, AvailabilityAction::SaveFailed { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    let state = store.state(Clone::clone).await;
    assert!(!state.is_closed());
    assert_eq!(state.last_error, Some(BookingError::Unauthorized));

    store.send(AvailabilityAction::Close).await.unwrap();
    assert!(store.state(AvailabilityState::is_closed).await);
}
