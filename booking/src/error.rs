//! Error types for the booking flow.

use thiserror::Error;
use vibes_runtime::StoreError;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Everything that can go wrong between selecting a vendor and seeing the
/// booked summary.
///
/// Errors travel inside flow actions, so they are `Clone` and carry
/// messages rather than source errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// The HTTP request could not be sent or did not complete.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The backend answered with a body we could not decode.
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The backend rejected the auth token.
    #[error("Unauthorized - please sign in again")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the backend
        message: String,
    },

    /// The booking response did not include a booking id.
    #[error("Booking response did not include a booking id")]
    MissingBookingId,

    /// The payment response did not include a payment intent.
    #[error("Payment response did not include a payment intent")]
    MissingPaymentIntent,

    /// A booking was requested before a vendor was selected.
    #[error("No vendor selected")]
    NoVendorSelected,

    /// A payment step was requested with no booking or event details.
    #[error("No booking in progress")]
    NoBookingInProgress,

    /// The flow is not in a phase that accepts this request.
    #[error("Cannot {operation} while the flow is {phase}")]
    InvalidPhase {
        /// What the caller tried to do
        operation: &'static str,
        /// Phase the flow was in
        phase: String,
    },

    /// The dialog was closed while the request was in flight.
    #[error("Flow was closed before it could {operation}")]
    Abandoned {
        /// What the caller was waiting for
        operation: &'static str,
    },

    /// The store runtime refused or timed out.
    #[error("Flow runtime error: {0}")]
    Store(String),

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<StoreError> for BookingError {
    fn from(error: StoreError) -> Self {
        Self::Store(error.to_string())
    }
}

impl From<vibes_auth::AuthError> for BookingError {
    fn from(error: vibes_auth::AuthError) -> Self {
        Self::InvalidConfig(error.to_string())
    }
}
