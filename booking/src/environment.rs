//! Injected dependencies for the booking reducers.

use crate::api::BookingApi;
use crate::notify::{Notifier, TracingNotifier};
use crate::types::Marketplace;
use std::sync::Arc;
use vibes_core::environment::{Clock, SystemClock};

/// Everything the booking and availability reducers reach outside the state for
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Booking backend
    pub api: Arc<dyn BookingApi>,
    /// Toast sink
    pub notifier: Arc<dyn Notifier>,
    /// Time source for confirmation timestamps
    pub clock: Arc<dyn Clock>,
    /// Marketplace this flow books against
    pub marketplace: Marketplace,
}

impl BookingEnvironment {
    /// Environment with the tracing notifier and the system clock
    #[must_use]
    pub fn new(api: Arc<dyn BookingApi>, marketplace: Marketplace) -> Self {
        Self {
            api,
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(SystemClock),
            marketplace,
        }
    }

    /// Replace the notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for BookingEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEnvironment")
            .field("marketplace", &self.marketplace)
            .finish_non_exhaustive()
    }
}
