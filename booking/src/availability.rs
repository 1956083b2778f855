//! The add-availability dialog on the vendor calendar.
//!
//! `Closed → Open → Saving → Closed`. A failed save keeps the dialog open
//! with the error; closing always succeeds, even mid-save.

use crate::environment::BookingEnvironment;
use crate::error::BookingError;
use crate::notify::Toast;
use crate::request::AvailabilitySlot;
use std::sync::Arc;
use vibes_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Dialog phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AvailabilityDialog {
    /// Not shown
    #[default]
    Closed,
    /// Collecting a slot
    Open,
    /// Save request in flight
    Saving,
}

/// Add-availability dialog state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AvailabilityState {
    /// Dialog phase
    pub dialog: AvailabilityDialog,
    /// Incremented on every open and close; older save results are stale
    pub generation: u64,
    /// Slot being saved
    pub draft: Option<AvailabilitySlot>,
    /// Slots saved since the page loaded
    pub saved: Vec<AvailabilitySlot>,
    /// Last save failure
    pub last_error: Option<BookingError>,
}

impl AvailabilityState {
    /// Whether the dialog is closed with nothing in flight
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.dialog, AvailabilityDialog::Closed)
    }
}

/// Add-availability dialog actions
#[derive(Clone, Debug, PartialEq)]
pub enum AvailabilityAction {
    /// Show the dialog
    Open,
    /// Save a slot
    Submit {
        /// The slot
        slot: AvailabilitySlot,
    },
    /// Save succeeded
    Saved {
        /// Dialog generation the save belonged to
        generation: u64,
        /// The saved slot
        slot: AvailabilitySlot,
    },
    /// Save failed
    SaveFailed {
        /// Dialog generation the save belonged to
        generation: u64,
        /// Why
        error: BookingError,
    },
    /// Hide the dialog
    Close,
}

/// Reducer for the add-availability dialog
#[derive(Clone, Copy, Debug, Default)]
pub struct AvailabilityReducer;

impl AvailabilityReducer {
    /// Create a new reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for AvailabilityReducer {
    type State = AvailabilityState;
    type Action = AvailabilityAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match (state.dialog, action) {
            (AvailabilityDialog::Closed, AvailabilityAction::Open) => {
                state.dialog = AvailabilityDialog::Open;
                state.generation += 1;
                state.last_error = None;
                SmallVec::new()
            },

            (AvailabilityDialog::Open, AvailabilityAction::Submit { slot }) => {
                state.dialog = AvailabilityDialog::Saving;
                state.draft = Some(slot.clone());
                state.last_error = None;

                let api = Arc::clone(&env.api);
                let marketplace = env.marketplace;
                let generation = state.generation;
                smallvec![Effect::future(async move {
                    Some(match api.add_availability(marketplace, slot.clone()).await {
                        Ok(()) => AvailabilityAction::Saved { generation, slot },
                        Err(error) => AvailabilityAction::SaveFailed { generation, error },
                    })
                })]
            },

            (AvailabilityDialog::Saving, AvailabilityAction::Saved { generation, slot })
                if generation == state.generation =>
            {
                let message = format!("{} {}-{}", slot.date, slot.from_time, slot.to_time);
                state.saved.push(slot);
                state.draft = None;
                state.dialog = AvailabilityDialog::Closed;
                state.generation += 1;

                let notifier = Arc::clone(&env.notifier);
                smallvec![Effect::future(async move {
                    notifier.notify(Toast::success("Availability added", message));
                    None
                })]
            },

            (AvailabilityDialog::Saving, AvailabilityAction::SaveFailed { generation, error })
                if generation == state.generation =>
            {
                tracing::warn!(%error, "Saving availability failed");
                let message = error.to_string();
                state.last_error = Some(error);
                state.dialog = AvailabilityDialog::Open;

                let notifier = Arc::clone(&env.notifier);
                smallvec![Effect::future(async move {
                    notifier.notify(Toast::error("Could not add availability", message));
                    None
                })]
            },

            (_, AvailabilityAction::Close) => {
                if !state.is_closed() {
                    state.generation += 1;
                }
                state.dialog = AvailabilityDialog::Closed;
                state.draft = None;
                state.last_error = None;
                SmallVec::new()
            },

            (dialog, action) => {
                tracing::debug!(?dialog, ?action, "Availability action ignored");
                SmallVec::new()
            },
        }
    }
}
