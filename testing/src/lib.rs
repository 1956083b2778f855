//! # Vibes Testing
//!
//! Testing utilities and helpers for Vibes reducers.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then builder for reducer transitions
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use vibes_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(BookingFlowReducer::new())
//!     .with_env(test_environment())
//!     .given_state(BookingFlowState::default())
//!     .when_action(BookingFlowAction::OpenDetails)
//!     .then_state(|s| assert_eq!(s.phase, FlowPhase::DetailsOpen))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use vibes_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use vibes_testing::mocks::FixedClock;
    /// use vibes_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-06-14 18:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-06-14T18:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
