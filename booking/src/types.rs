//! Domain types for the booking flow.
//!
//! Vendors, menus and event details come from the marketplace pages; the
//! booking draft and payment intent come back from the backend. Everything
//! here lives only as long as the flow that holds it.

use crate::error::{BookingError, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which marketplace a flow books against.
///
/// The backend names its fields after the marketplace (`catering_id`,
/// `staffing_booking_id`, ...), so the marketplace decides the wire keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    /// Caterers and their menus
    #[default]
    Catering,
    /// Event staff (servers, bartenders, security)
    Staffing,
    /// Venues and event packages
    Event,
}

impl Marketplace {
    /// Path segment and field prefix used by the backend
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Catering => "catering",
            Self::Staffing => "staffing",
            Self::Event => "event",
        }
    }

    /// Field naming the vendor in a booking request (`catering_id`)
    #[must_use]
    pub fn vendor_field(self) -> String {
        format!("{}_id", self.key())
    }

    /// Field naming the booking in responses and payment requests
    /// (`catering_booking_id`)
    #[must_use]
    pub fn booking_field(self) -> String {
        format!("{}_booking_id", self.key())
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Marketplace {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catering" => Ok(Self::Catering),
            "staffing" => Ok(Self::Staffing),
            "event" | "events" => Ok(Self::Event),
            other => Err(BookingError::InvalidConfig(format!(
                "unknown marketplace '{other}'"
            ))),
        }
    }
}

/// Unique identifier for a vendor
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorId(String);

impl VendorId {
    /// Creates a new `VendorId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a server-side booking
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(String);

impl BookingId {
    /// Creates a new `BookingId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment method chosen in the confirm dialog (card token, wallet id)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentMethodId(String);

impl PaymentMethodId {
    /// Creates a new `PaymentMethodId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Accepts a JSON string or number and keeps it as a string.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A vendor from the marketplace listing. Read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    /// Backend id
    #[serde(rename = "_id")]
    pub id: VendorId,
    /// Display name
    pub name: String,
    /// Contact phone
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobile_no: Option<String>,
    /// Marketplace category (cuisine, staff role, venue type)
    #[serde(
        default,
        alias = "catering_category_id",
        alias = "staffing_category_id",
        alias = "event_category_id",
        deserialize_with = "string_or_number"
    )]
    pub category_id: Option<String>,
    /// Street address
    #[serde(default)]
    pub address: Option<String>,
}

/// A menu (or staffing package) with per-guest pricing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuDetails {
    /// Backend id, when the menu came from the backend
    #[serde(default)]
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Price per guest before the platform fee
    pub price_per_person: f64,
}

/// An existing order used as a last-resort summary source
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Vendor name recorded on the order
    pub vendor_name: Option<String>,
    /// Menu name recorded on the order
    pub menu_name: Option<String>,
    /// Guests recorded on the order
    pub guest_count: Option<u32>,
    /// Price per guest recorded on the order
    pub price_per_person: Option<f64>,
    /// Total recorded on the order
    pub total: Option<f64>,
}

/// What the details dialog collects
///
/// Only types are enforced: an empty name or a zero guest count is passed
/// through to the backend unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Event title
    pub event_name: String,
    /// Where the event takes place
    pub event_address: String,
    /// Free-text event type label ("Wedding", "Corporate")
    #[serde(default)]
    pub event_type: Option<String>,
    /// Backend event type id; defaults to 1 when absent
    #[serde(default)]
    pub event_type_id: Option<u32>,
    /// First day of the event
    pub start_date: NaiveDate,
    /// Last day of the event
    pub end_date: NaiveDate,
    /// Start time; defaults to 18:00 when absent
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    /// End time; defaults to 23:00 when absent
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Expected guests
    pub guest_count: u32,
}

/// The booking record inside a [`BookingDraft`]
#[derive(Clone, Debug, PartialEq)]
pub struct BookingRecord {
    /// Booking id, if the backend sent one
    pub booking_id: Option<BookingId>,
    /// The booking object as returned
    pub raw: serde_json::Value,
}

/// The transaction inside a [`BookingDraft`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transaction {
    /// Server-computed amount for the whole booking
    pub amount: Option<f64>,
}

/// Server-acknowledged booking plus its computed amount, held pending payment
#[derive(Clone, Debug, PartialEq)]
pub struct BookingDraft {
    /// The booking record
    pub booking: BookingRecord,
    /// The transaction the backend priced
    pub transaction: Transaction,
}

impl BookingDraft {
    /// Booking id, if present
    #[must_use]
    pub const fn booking_id(&self) -> Option<&BookingId> {
        self.booking.booking_id.as_ref()
    }

    /// Server-computed amount, if present
    #[must_use]
    pub const fn amount(&self) -> Option<f64> {
        self.transaction.amount
    }

    /// Decode a booking-creation response.
    ///
    /// Accepts `{booking, transaction}` or the same wrapped in `{data: ...}`.
    /// The booking id is read from `<marketplace>_booking_id`, then `_id`;
    /// a missing id is kept as `None` and only rejected when payment needs it.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ResponseParseFailed`] if there is no booking object.
    pub fn from_response(marketplace: Marketplace, body: &serde_json::Value) -> Result<Self> {
        let root = body.get("data").filter(|d| d.get("booking").is_some()).unwrap_or(body);

        let booking = root
            .get("booking")
            .filter(|b| b.is_object())
            .ok_or_else(|| {
                BookingError::ResponseParseFailed("booking response has no booking object".to_string())
            })?;

        let booking_id = [marketplace.booking_field().as_str(), "_id"]
            .iter()
            .find_map(|field| json_string(booking.get(*field)?))
            .map(BookingId::new);

        let amount = root
            .get("transaction")
            .and_then(|t| t.get("amount"))
            .and_then(json_number);

        Ok(Self {
            booking: BookingRecord {
                booking_id,
                raw: booking.clone(),
            },
            transaction: Transaction { amount },
        })
    }
}

/// Guest count and per-guest price driving the displayed estimate
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfirmPayload {
    /// Guests being booked for
    pub guest_count: u32,
    /// Price per guest before the platform fee
    pub price_per_person: f64,
}

impl ConfirmPayload {
    /// Estimate shown in the confirm dialog, platform fee included
    #[must_use]
    pub fn estimate(&self) -> f64 {
        crate::pricing::estimate(self.guest_count, self.price_per_person)
    }

    /// Vendor price before the platform fee
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        crate::pricing::subtotal(self.guest_count, self.price_per_person)
    }
}

/// Billing contact forwarded with the payment-intent request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    /// Cardholder name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Receipt email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Opaque payment-authorization object handed to the payment UI
#[derive(Clone, Debug, PartialEq)]
pub struct PaymentIntent(serde_json::Value);

impl PaymentIntent {
    /// Wrap a payment intent object
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Intent id, when the processor sent one
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(serde_json::Value::as_str)
    }

    /// Client secret the payment UI confirms with
    #[must_use]
    pub fn client_secret(&self) -> Option<&str> {
        self.0
            .get("client_secret")
            .or_else(|| self.0.get("clientSecret"))
            .and_then(serde_json::Value::as_str)
    }

    /// The raw intent object
    #[must_use]
    pub const fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Decode a payment-intent response.
    ///
    /// The intent is looked up at `data.data.paymentIntent`, then
    /// `data.paymentIntent`, then `paymentIntent`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::MissingPaymentIntent`] if none of those hold an object.
    pub fn from_response(body: &serde_json::Value) -> Result<Self> {
        ["/data/data/paymentIntent", "/data/paymentIntent", "/paymentIntent"]
            .iter()
            .find_map(|pointer| body.pointer(pointer).filter(|v| v.is_object()))
            .cloned()
            .map(Self)
            .ok_or(BookingError::MissingPaymentIntent)
    }
}

/// Display-only summary shown in the success dialog
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BookedInfo {
    /// Vendor display name
    pub vendor_name: String,
    /// Menu or package display name
    pub menu_name: String,
    /// Event title
    pub event_name: String,
    /// First day of the event
    pub event_date: Option<NaiveDate>,
    /// Guests booked for
    pub guest_count: u32,
    /// Price per guest
    pub price_per_person: f64,
    /// Amount charged
    pub total: f64,
    /// Booking id, when the booking was created
    pub booking_id: Option<BookingId>,
}

/// Reads a JSON string or number as a string.
pub(crate) fn json_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a JSON number or numeric string as `f64`.
pub(crate) fn json_number(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
