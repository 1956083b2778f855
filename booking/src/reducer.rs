//! The booking flow reducer.
//!
//! All flow logic lives here: phase transitions, the `pending_payment`
//! reuse rule, price recomputation from server amounts and stale-result
//! handling. Backend calls and toasts are returned as effects.

use crate::actions::BookingFlowAction;
use crate::environment::BookingEnvironment;
use crate::error::BookingError;
use crate::notify::Toast;
use crate::pricing;
use crate::request::{CreateBookingRequest, PaymentIntentRequest};
use crate::state::{BookingFlowState, FlowPhase};
use crate::summary::build_booked_summary;
use crate::types::{BillingDetails, BookingDraft, ConfirmPayload, EventDetails, PaymentMethodId};
use std::sync::Arc;
use vibes_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

type Effects = SmallVec<[Effect<BookingFlowAction>; 4]>;

/// Reducer for the booking-and-payment confirmation flow
#[derive(Clone, Copy, Debug, Default)]
pub struct BookingFlowReducer;

impl BookingFlowReducer {
    /// Create a new reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn toast(env: &BookingEnvironment, toast: Toast) -> Effect<BookingFlowAction> {
    let notifier = Arc::clone(&env.notifier);
    Effect::future(async move {
        notifier.notify(toast);
        None
    })
}

fn ignored(phase: FlowPhase, action: &BookingFlowAction) -> Effects {
    tracing::debug!(%phase, ?action, "Action ignored in this phase");
    SmallVec::new()
}

fn warn_orphaned(draft: Option<&BookingDraft>, reason: &str) {
    if let Some(booking_id) = draft.and_then(BookingDraft::booking_id) {
        tracing::warn!(%booking_id, reason, "Server-side booking left without payment");
    }
}

impl BookingFlowReducer {
    /// Request the booking and return the result as an action.
    fn create_booking(
        state: &BookingFlowState,
        env: &BookingEnvironment,
        details: &EventDetails,
    ) -> Option<Effect<BookingFlowAction>> {
        let vendor_id = state.selected_vendor.clone()?;
        let local_price = state.local_price_per_person();
        // The backend prices the vendor share; the fee is added on display
        let amount = (details.guest_count > 0 && local_price > 0.0)
            .then(|| pricing::subtotal(details.guest_count, local_price));

        let request = CreateBookingRequest::from_details(env.marketplace, vendor_id, details, amount);
        let api = Arc::clone(&env.api);
        let attempt = state.attempt;

        Some(Effect::future(async move {
            Some(match api.create_booking(request).await {
                Ok(draft) => BookingFlowAction::BookingCreated { attempt, draft },
                Err(error) => BookingFlowAction::BookingCreationFailed { attempt, error },
            })
        }))
    }

    /// Reuse the pending booking (or create one), then request the intent.
    fn request_payment(
        state: &BookingFlowState,
        env: &BookingEnvironment,
        payment_method_id: PaymentMethodId,
        billing: BillingDetails,
    ) -> Result<Effect<BookingFlowAction>, BookingError> {
        let pending = state.pending_payment.clone();
        let create = if pending.is_some() {
            None
        } else {
            let details = state.event_details.as_ref().ok_or(BookingError::NoBookingInProgress)?;
            let vendor_id = state.selected_vendor.clone().ok_or(BookingError::NoVendorSelected)?;
            let amount = state
                .confirm_payload
                .as_ref()
                .map(ConfirmPayload::subtotal)
                .filter(|amount| *amount > 0.0);
            Some(CreateBookingRequest::from_details(env.marketplace, vendor_id, details, amount))
        };

        let api = Arc::clone(&env.api);
        let marketplace = env.marketplace;
        let attempt = state.attempt;

        Ok(Effect::future(async move {
            let draft = match (pending, create) {
                (Some(draft), _) => draft,
                (None, Some(request)) => match api.create_booking(request).await {
                    Ok(draft) => draft,
                    Err(error) => {
                        return Some(BookingFlowAction::PaymentIntentFailed {
                            attempt,
                            error,
                            draft: None,
                        });
                    },
                },
                (None, None) => {
                    return Some(BookingFlowAction::PaymentIntentFailed {
                        attempt,
                        error: BookingError::NoBookingInProgress,
                        draft: None,
                    });
                },
            };

            let Some(booking_id) = draft.booking_id().cloned() else {
                return Some(BookingFlowAction::PaymentIntentFailed {
                    attempt,
                    error: BookingError::MissingBookingId,
                    draft: Some(draft),
                });
            };

            let request = PaymentIntentRequest {
                marketplace,
                booking_id,
                payment_method_id,
                billing,
            };

            Some(match api.create_payment_intent(request).await {
                Ok(intent) => BookingFlowAction::PaymentIntentCreated {
                    attempt,
                    draft,
                    intent,
                },
                Err(error) => BookingFlowAction::PaymentIntentFailed {
                    attempt,
                    error,
                    draft: Some(draft),
                },
            })
        }))
    }

    /// Start a new confirmation cycle.
    fn begin_cycle(state: &mut BookingFlowState) {
        state.clear_cycle();
        state.attempt += 1;
    }
}

impl Reducer for BookingFlowReducer {
    type State = BookingFlowState;
    type Action = BookingFlowAction;
    type Environment = BookingEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action keeps the flow readable
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        let phase = state.phase;

        match action {
            BookingFlowAction::LoadVendors => {
                if state.vendors_loading {
                    return ignored(phase, &BookingFlowAction::LoadVendors);
                }
                state.vendors_loading = true;

                let api = Arc::clone(&env.api);
                let marketplace = env.marketplace;
                smallvec![Effect::future(async move {
                    Some(match api.list_vendors(marketplace).await {
                        Ok(vendors) => BookingFlowAction::VendorsLoaded { vendors },
                        Err(error) => BookingFlowAction::VendorsLoadFailed { error },
                    })
                })]
            },

            BookingFlowAction::VendorsLoaded { vendors } => {
                tracing::debug!(count = vendors.len(), "Vendor listing applied");
                state.vendors = vendors;
                state.vendors_loading = false;
                SmallVec::new()
            },

            BookingFlowAction::VendorsLoadFailed { error } => {
                state.vendors_loading = false;
                let message = error.to_string();
                state.last_error = Some(error);
                smallvec![toast(env, Toast::error("Could not load vendors", message))]
            },

            BookingFlowAction::SelectVendor { vendor_id } => {
                if phase != FlowPhase::Idle {
                    return ignored(phase, &BookingFlowAction::SelectVendor { vendor_id });
                }
                if state.selected_vendor.as_ref() != Some(&vendor_id) {
                    state.selected_menu = None;
                    state.menu_details = None;
                }
                tracing::debug!(%vendor_id, "Vendor selected");
                state.selected_vendor = Some(vendor_id);
                SmallVec::new()
            },

            BookingFlowAction::SelectMenu { menu } => {
                if phase != FlowPhase::Idle {
                    return ignored(phase, &BookingFlowAction::SelectMenu { menu });
                }
                let same_menu = match (&state.selected_menu, &menu) {
                    (Some(current), Some(next)) => current.id == next.id && current.name == next.name,
                    _ => false,
                };
                if !same_menu {
                    state.menu_details = None;
                }
                state.selected_menu = menu;
                SmallVec::new()
            },

            BookingFlowAction::MenuDetailsReceived { menu } => {
                state.menu_details = Some(menu);
                SmallVec::new()
            },

            BookingFlowAction::UseOrder { order } => {
                state.order_details = Some(order);
                SmallVec::new()
            },

            BookingFlowAction::OpenDetails => {
                if phase != FlowPhase::Idle {
                    return ignored(phase, &BookingFlowAction::OpenDetails);
                }
                Self::begin_cycle(state);
                state.phase = FlowPhase::DetailsOpen;
                tracing::debug!(attempt = state.attempt, "Details dialog opened");
                SmallVec::new()
            },

            BookingFlowAction::SubmitDetails { details } => {
                if phase != FlowPhase::DetailsOpen {
                    return ignored(phase, &BookingFlowAction::SubmitDetails { details });
                }

                let Some(effect) = Self::create_booking(state, env, &details) else {
                    let error = BookingError::NoVendorSelected;
                    let message = error.to_string();
                    state.last_error = Some(error);
                    return smallvec![toast(env, Toast::error("Booking failed", message))];
                };

                tracing::debug!(
                    attempt = state.attempt,
                    guest_count = details.guest_count,
                    "Details submitted, creating booking"
                );
                state.event_details = Some(details);
                state.last_error = None;
                state.phase = FlowPhase::CreatingBooking;
                smallvec![effect]
            },

            BookingFlowAction::BookingCreated { attempt, draft } => {
                if attempt != state.attempt || phase != FlowPhase::CreatingBooking {
                    warn_orphaned(Some(&draft), "booking result arrived after the flow moved on");
                    return ignored(phase, &BookingFlowAction::BookingCreated { attempt, draft });
                }

                let guest_count = state.event_details.as_ref().map_or(0, |d| d.guest_count);
                state.confirm_payload = Some(state.confirm_payload_for(guest_count, Some(&draft)));
                tracing::debug!(
                    booking_id = ?draft.booking_id(),
                    estimate = ?state.estimate(),
                    "Booking created, confirm dialog opened"
                );
                state.pending_payment = Some(draft);
                state.phase = FlowPhase::ConfirmOpen;
                SmallVec::new()
            },

            BookingFlowAction::BookingCreationFailed { attempt, error } => {
                if attempt != state.attempt || phase != FlowPhase::CreatingBooking {
                    return ignored(phase, &BookingFlowAction::BookingCreationFailed { attempt, error });
                }

                tracing::warn!(%error, "Booking creation failed");
                let message = error.to_string();
                state.pending_payment = None;
                state.last_error = Some(error);
                state.phase = FlowPhase::DetailsOpen;
                smallvec![toast(env, Toast::error("Booking failed", message))]
            },

            BookingFlowAction::OpenConfirm { details } => {
                match phase {
                    FlowPhase::Idle => Self::begin_cycle(state),
                    FlowPhase::DetailsOpen => {},
                    _ => return ignored(phase, &BookingFlowAction::OpenConfirm { details }),
                }
                state.confirm_payload = Some(state.confirm_payload_for(details.guest_count, None));
                state.event_details = Some(details);
                state.pending_payment = None;
                state.phase = FlowPhase::ConfirmOpen;
                SmallVec::new()
            },

            BookingFlowAction::SelectPaymentMethod {
                payment_method_id,
                billing,
            } => {
                if phase != FlowPhase::ConfirmOpen {
                    return ignored(
                        phase,
                        &BookingFlowAction::SelectPaymentMethod {
                            payment_method_id,
                            billing,
                        },
                    );
                }

                match Self::request_payment(state, env, payment_method_id.clone(), billing.clone()) {
                    Ok(effect) => {
                        tracing::debug!(
                            attempt = state.attempt,
                            reuse_booking = state.pending_payment.is_some(),
                            "Payment method selected"
                        );
                        state.payment_method = Some(payment_method_id);
                        state.billing = Some(billing);
                        state.last_error = None;
                        state.phase = FlowPhase::RequestingPayment;
                        smallvec![effect]
                    },
                    Err(error) => {
                        let message = error.to_string();
                        state.last_error = Some(error);
                        smallvec![toast(env, Toast::error("Payment failed", message))]
                    },
                }
            },

            BookingFlowAction::PaymentIntentCreated {
                attempt,
                draft,
                intent,
            } => {
                if attempt != state.attempt || phase != FlowPhase::RequestingPayment {
                    warn_orphaned(Some(&draft), "payment intent arrived after the flow moved on");
                    return ignored(
                        phase,
                        &BookingFlowAction::PaymentIntentCreated {
                            attempt,
                            draft,
                            intent,
                        },
                    );
                }

                let guest_count = state.event_details.as_ref().map_or(0, |d| d.guest_count);
                if draft.amount().is_some() {
                    state.confirm_payload = Some(state.confirm_payload_for(guest_count, Some(&draft)));
                }
                tracing::debug!(intent_id = ?intent.id(), "Awaiting payment");
                state.pending_payment = Some(draft);
                state.payment_intent = Some(intent);
                state.phase = FlowPhase::AwaitingPayment;
                SmallVec::new()
            },

            BookingFlowAction::PaymentIntentFailed {
                attempt,
                error,
                draft,
            } => {
                if attempt != state.attempt || phase != FlowPhase::RequestingPayment {
                    warn_orphaned(draft.as_ref(), "payment failure arrived after the flow moved on");
                    return ignored(
                        phase,
                        &BookingFlowAction::PaymentIntentFailed {
                            attempt,
                            error,
                            draft,
                        },
                    );
                }

                tracing::warn!(%error, "Payment intent request failed");
                if let Some(draft) = draft {
                    if state.pending_payment.is_none() {
                        let guest_count = state.event_details.as_ref().map_or(0, |d| d.guest_count);
                        state.confirm_payload = Some(state.confirm_payload_for(guest_count, Some(&draft)));
                    }
                    state.pending_payment = Some(draft);
                }
                let message = error.to_string();
                state.last_error = Some(error);
                state.phase = FlowPhase::ConfirmOpen;
                smallvec![toast(env, Toast::error("Payment failed", message))]
            },

            BookingFlowAction::ConfirmPayment => {
                if phase != FlowPhase::AwaitingPayment {
                    return ignored(phase, &BookingFlowAction::ConfirmPayment);
                }

                let info = build_booked_summary(&state.summary_sources());
                let message = format!("{} is booked for {}", info.vendor_name, info.event_name);
                tracing::info!(booking_id = ?info.booking_id, total = info.total, "Booking confirmed");
                state.booked_info = Some(info);
                state.confirmed_at = Some(env.clock.now());
                state.phase = FlowPhase::Confirmed;
                smallvec![toast(env, Toast::success("Booking confirmed", message))]
            },

            BookingFlowAction::OpenSuccess => {
                if phase.is_busy() {
                    return ignored(phase, &BookingFlowAction::OpenSuccess);
                }
                if phase != FlowPhase::Confirmed {
                    warn_orphaned(
                        state.pending_payment.as_ref(),
                        "success shown before payment was confirmed",
                    );
                }
                if state.booked_info.is_none() {
                    state.booked_info = Some(build_booked_summary(&state.summary_sources()));
                }
                if state.confirmed_at.is_none() {
                    state.confirmed_at = Some(env.clock.now());
                }
                state.phase = FlowPhase::Confirmed;
                SmallVec::new()
            },

            BookingFlowAction::CloseDialog => {
                if phase == FlowPhase::Idle {
                    return SmallVec::new();
                }
                if phase != FlowPhase::Confirmed {
                    warn_orphaned(state.pending_payment.as_ref(), "flow closed before payment");
                }
                state.clear_cycle();
                // Results still in flight belong to the closed cycle
                state.attempt += 1;
                state.phase = FlowPhase::Idle;
                tracing::debug!(from = %phase, "Dialog closed");
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::mocks::{InMemoryBookingApi, RecordingNotifier};
    use crate::notify::ToastLevel;
    use crate::types::{BookingId, BookingRecord, MenuDetails, Transaction, VendorId};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use vibes_core::environment::Clock;
    use vibes_testing::{ReducerTest, assertions, test_clock};

    /// Counts `WARN` events emitted while installed
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn warnings_during(f: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, f);
        count.load(Ordering::SeqCst)
    }

    fn env_with(api: Arc<InMemoryBookingApi>, notifier: Arc<RecordingNotifier>) -> BookingEnvironment {
        BookingEnvironment::new(api, crate::types::Marketplace::Catering)
            .with_notifier(notifier)
            .with_clock(Arc::new(test_clock()))
    }

    fn env() -> BookingEnvironment {
        env_with(
            Arc::new(InMemoryBookingApi::new()),
            Arc::new(RecordingNotifier::new()),
        )
    }

    fn details(guests: u32) -> EventDetails {
        EventDetails {
            event_name: "Garden Wedding".to_string(),
            event_address: "9 Rose Ln".to_string(),
            event_type: Some("Wedding".to_string()),
            event_type_id: Some(2),
            start_date: NaiveDate::from_ymd_opt(2025, 8, 30).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 8, 30).unwrap(),
            start_time: None,
            end_time: None,
            guest_count: guests,
        }
    }

    fn draft(id: Option<&str>, amount: Option<f64>) -> BookingDraft {
        BookingDraft {
            booking: BookingRecord {
                booking_id: id.map(BookingId::new),
                raw: serde_json::json!({}),
            },
            transaction: Transaction { amount },
        }
    }

    fn with_vendor() -> BookingFlowState {
        BookingFlowState {
            selected_vendor: Some(VendorId::new("v-1")),
            selected_menu: Some(MenuDetails {
                id: Some("m-1".to_string()),
                name: "Seasonal Buffet".to_string(),
                price_per_person: 20.0,
            }),
            ..BookingFlowState::default()
        }
    }

    fn confirm_open(pending: Option<BookingDraft>) -> BookingFlowState {
        let mut state = with_vendor();
        state.attempt = 1;
        state.phase = FlowPhase::ConfirmOpen;
        state.event_details = Some(details(50));
        state.confirm_payload = Some(state.confirm_payload_for(50, pending.as_ref()));
        state.pending_payment = pending;
        state
    }

    #[test]
    fn test_open_details_starts_a_cycle() {
        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(with_vendor())
            .when_action(BookingFlowAction::OpenDetails)
            .then_state(|state| {
                assert_eq!(state.phase, FlowPhase::DetailsOpen);
                assert_eq!(state.attempt, 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_submit_details_creates_booking() {
        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(with_vendor())
            .when_actions(vec![
                BookingFlowAction::OpenDetails,
                BookingFlowAction::SubmitDetails { details: details(50) },
            ])
            .then_state(|state| {
                assert_eq!(state.phase, FlowPhase::CreatingBooking);
                assert!(state.event_details.is_some());
                assert!(state.is_busy());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn test_booking_request_carries_subtotal_without_fee() {
        let api = Arc::new(InMemoryBookingApi::new());
        let env = env_with(Arc::clone(&api), Arc::new(RecordingNotifier::new()));
        let mut state = with_vendor();
        let reducer = BookingFlowReducer::new();

        reducer.reduce(&mut state, BookingFlowAction::OpenDetails, &env);
        let effects = reducer.reduce(
            &mut state,
            BookingFlowAction::SubmitDetails { details: details(50) },
            &env,
        );

        let mut created = None;
        for effect in effects {
            if let Effect::Future(fut) = effect {
                created = fut.await;
            }
        }
        assert_eq!(api.booking_requests()[0].amount, Some(1000.0));

        reducer.reduce(&mut state, created.unwrap(), &env);
        let payload = state.confirm_payload.unwrap();
        assert!((payload.price_per_person - 20.0).abs() < f64::EPSILON);
        assert!((state.estimate().unwrap() - 1150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_repeat_submit_is_ignored_while_creating() {
        let mut state = with_vendor();
        state.phase = FlowPhase::CreatingBooking;
        state.attempt = 1;

        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(BookingFlowAction::SubmitDetails { details: details(10) })
            .then_state(|state| assert_eq!(state.phase, FlowPhase::CreatingBooking))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_submit_without_vendor_stays_open() {
        let state = BookingFlowState {
            phase: FlowPhase::DetailsOpen,
            attempt: 1,
            ..BookingFlowState::default()
        };

        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(BookingFlowAction::SubmitDetails { details: details(10) })
            .then_state(|state| {
                assert_eq!(state.phase, FlowPhase::DetailsOpen);
                assert_eq!(state.last_error, Some(BookingError::NoVendorSelected));
            })
            .run();
    }

    #[test]
    fn test_server_amount_sets_price_per_person() {
        let mut state = with_vendor();
        state.phase = FlowPhase::CreatingBooking;
        state.attempt = 1;
        state.event_details = Some(details(20));

        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(BookingFlowAction::BookingCreated {
                attempt: 1,
                draft: draft(Some("b-1"), Some(1000.0)),
            })
            .then_state(|state| {
                assert_eq!(state.phase, FlowPhase::ConfirmOpen);
                let payload = state.confirm_payload.unwrap();
                assert_eq!(payload.guest_count, 20);
                assert!((payload.price_per_person - 50.0).abs() < f64::EPSILON);
                assert!((state.estimate().unwrap() - 1150.0).abs() < f64::EPSILON);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_booking_failure_keeps_details_open() {
        let api = Arc::new(InMemoryBookingApi::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let mut state = with_vendor();
        state.phase = FlowPhase::CreatingBooking;
        state.attempt = 1;

        let reducer = BookingFlowReducer::new();
        let env = env_with(Arc::clone(&api), Arc::clone(&notifier));
        let effects = reducer.reduce(
            &mut state,
            BookingFlowAction::BookingCreationFailed {
                attempt: 1,
                error: BookingError::Api {
                    status: 422,
                    message: "date in the past".to_string(),
                },
            },
            &env,
        );

        assert_eq!(state.phase, FlowPhase::DetailsOpen);
        assert!(state.pending_payment.is_none());
        assert!(matches!(state.last_error, Some(BookingError::Api { status: 422, .. })));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_stale_booking_result_is_ignored() {
        let mut state = with_vendor();
        state.attempt = 3;

        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(BookingFlowAction::BookingCreated {
                attempt: 2,
                draft: draft(Some("b-old"), Some(10.0)),
            })
            .then_state(|state| {
                assert_eq!(state.phase, FlowPhase::Idle);
                assert!(state.pending_payment.is_none());
            })
            .run();
    }

    #[test]
    fn test_method_selection_requests_payment() {
        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(confirm_open(Some(draft(Some("b-1"), Some(1000.0)))))
            .when_action(BookingFlowAction::SelectPaymentMethod {
                payment_method_id: PaymentMethodId::new("pm_1"),
                billing: BillingDetails::default(),
            })
            .then_state(|state| {
                assert_eq!(state.phase, FlowPhase::RequestingPayment);
                assert_eq!(state.payment_method, Some(PaymentMethodId::new("pm_1")));
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn test_intent_failure_keeps_draft_for_retry() {
        let mut state = confirm_open(None);
        state.phase = FlowPhase::RequestingPayment;

        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(BookingFlowAction::PaymentIntentFailed {
                attempt: 1,
                error: BookingError::MissingPaymentIntent,
                draft: Some(draft(Some("b-5"), Some(800.0))),
            })
            .then_state(|state| {
                assert_eq!(state.phase, FlowPhase::ConfirmOpen);
                assert_eq!(
                    state.pending_payment.as_ref().and_then(BookingDraft::booking_id),
                    Some(&BookingId::new("b-5"))
                );
                assert!((state.confirm_payload.unwrap().price_per_person - 16.0).abs() < f64::EPSILON);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_confirm_payment_builds_summary() {
        let mut state = confirm_open(Some(draft(Some("b-1"), Some(1000.0))));
        state.phase = FlowPhase::AwaitingPayment;

        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(BookingFlowAction::ConfirmPayment)
            .then_state(|state| {
                assert_eq!(state.phase, FlowPhase::Confirmed);
                let info = state.booked_info.as_ref().unwrap();
                assert_eq!(info.menu_name, "Seasonal Buffet");
                assert_eq!(info.event_name, "Garden Wedding");
                assert!((info.total - 1000.0).abs() < f64::EPSILON);
                assert_eq!(state.confirmed_at, Some(test_clock().now()));
            })
            .run();
    }

    #[test]
    fn test_open_success_is_a_safety_net() {
        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(BookingFlowState::default())
            .when_action(BookingFlowAction::OpenSuccess)
            .then_state(|state| {
                let info = state.booked_info.as_ref().unwrap();
                assert_eq!(info.vendor_name, "Vendor");
                assert_eq!(info.event_name, "Your Event");
                assert_eq!(state.phase, FlowPhase::Confirmed);
            })
            .run();
    }

    #[test]
    fn test_open_success_before_payment_logs_unpaid_booking() {
        let mut state = confirm_open(Some(draft(Some("b-9"), Some(500.0))));
        let env = env();

        let warnings = warnings_during(|| {
            BookingFlowReducer::new().reduce(&mut state, BookingFlowAction::OpenSuccess, &env);
        });

        assert_eq!(warnings, 1);
        assert_eq!(state.phase, FlowPhase::Confirmed);
        assert_eq!(
            state.booked_info.as_ref().and_then(|info| info.booking_id.clone()),
            Some(BookingId::new("b-9"))
        );
    }

    #[test]
    fn test_open_success_after_payment_logs_nothing() {
        let mut state = confirm_open(Some(draft(Some("b-9"), Some(500.0))));
        state.phase = FlowPhase::AwaitingPayment;
        let env = env();
        let reducer = BookingFlowReducer::new();
        reducer.reduce(&mut state, BookingFlowAction::ConfirmPayment, &env);

        let warnings = warnings_during(|| {
            reducer.reduce(&mut state, BookingFlowAction::OpenSuccess, &env);
        });

        assert_eq!(warnings, 0);
        assert_eq!(state.phase, FlowPhase::Confirmed);
    }

    #[test]
    fn test_close_from_every_phase_returns_to_idle() {
        let phases = [
            FlowPhase::Idle,
            FlowPhase::DetailsOpen,
            FlowPhase::CreatingBooking,
            FlowPhase::ConfirmOpen,
            FlowPhase::RequestingPayment,
            FlowPhase::AwaitingPayment,
            FlowPhase::Confirmed,
        ];

        for phase in phases {
            let mut state = confirm_open(Some(draft(Some("b-1"), Some(100.0))));
            state.phase = phase;

            ReducerTest::new(BookingFlowReducer::new())
                .with_env(env())
                .given_state(state)
                .when_action(BookingFlowAction::CloseDialog)
                .then_state(move |state| {
                    assert_eq!(state.phase, FlowPhase::Idle, "closing from {phase}");
                    assert!(!state.is_busy());
                    if phase != FlowPhase::Idle {
                        assert!(state.pending_payment.is_none());
                        assert!(state.confirm_payload.is_none());
                    }
                })
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn test_vendor_change_clears_menu() {
        ReducerTest::new(BookingFlowReducer::new())
            .with_env(env())
            .given_state(with_vendor())
            .when_action(BookingFlowAction::SelectVendor {
                vendor_id: VendorId::new("v-2"),
            })
            .then_state(|state| {
                assert_eq!(state.selected_vendor, Some(VendorId::new("v-2")));
                assert!(state.selected_menu.is_none());
            })
            .run();
    }

    #[tokio::test]
    async fn test_failure_toast_reaches_notifier() {
        let notifier = Arc::new(RecordingNotifier::new());
        let env = env_with(Arc::new(InMemoryBookingApi::new()), Arc::clone(&notifier));
        let mut state = BookingFlowState::default();

        let effects = BookingFlowReducer::new().reduce(
            &mut state,
            BookingFlowAction::VendorsLoadFailed {
                error: BookingError::Unauthorized,
            },
            &env,
        );

        for effect in effects {
            if let Effect::Future(fut) = effect {
                assert!(fut.await.is_none());
            }
        }

        let toasts = notifier.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].level, ToastLevel::Error);
        assert_eq!(toasts[0].message, "Unauthorized - please sign in again");
    }
}
