//! Request bodies sent to the booking backend.
//!
//! The backend keys vendor and booking ids by marketplace
//! (`catering_id`, `catering_booking_id`), so these bodies serialize
//! through a map rather than derived field names.

use crate::types::{BillingDetails, BookingId, EventDetails, Marketplace, PaymentMethodId, VendorId};
use chrono::{NaiveDate, NaiveTime};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Event type used when the details dialog did not pick one
pub const DEFAULT_EVENT_TYPE_ID: u32 = 1;
/// Start time used when the details dialog left it blank
pub const DEFAULT_FROM_TIME: &str = "18:00";
/// End time used when the details dialog left it blank
pub const DEFAULT_TO_TIME: &str = "23:00";

const TIME_FORMAT: &str = "%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body of `POST {base}/{marketplace}/booking`
#[derive(Clone, Debug, PartialEq)]
pub struct CreateBookingRequest {
    /// Marketplace the booking belongs to
    pub marketplace: Marketplace,
    /// Vendor being booked
    pub vendor_id: VendorId,
    /// Event title
    pub event_name: String,
    /// Event location
    pub event_address: String,
    /// Backend event type id
    pub event_type_id: u32,
    /// First day
    pub event_from_date: NaiveDate,
    /// Last day
    pub event_to_date: NaiveDate,
    /// Start time, `HH:MM`
    pub event_from_time: String,
    /// End time, `HH:MM`
    pub event_to_time: String,
    /// Expected guests
    pub guest_count: u32,
    /// Local estimate, sent only when one exists
    pub amount: Option<f64>,
}

impl CreateBookingRequest {
    /// Build the request from captured details, filling backend defaults.
    #[must_use]
    pub fn from_details(
        marketplace: Marketplace,
        vendor_id: VendorId,
        details: &EventDetails,
        amount: Option<f64>,
    ) -> Self {
        let format_time = |time: Option<NaiveTime>, default: &str| {
            time.map_or_else(|| default.to_string(), |t| t.format(TIME_FORMAT).to_string())
        };

        Self {
            marketplace,
            vendor_id,
            event_name: details.event_name.clone(),
            event_address: details.event_address.clone(),
            event_type_id: details.event_type_id.unwrap_or(DEFAULT_EVENT_TYPE_ID),
            event_from_date: details.start_date,
            event_to_date: details.end_date,
            event_from_time: format_time(details.start_time, DEFAULT_FROM_TIME),
            event_to_time: format_time(details.end_time, DEFAULT_TO_TIME),
            guest_count: details.guest_count,
            amount,
        }
    }
}

impl Serialize for CreateBookingRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.amount.is_some() { 10 } else { 9 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("event_name", &self.event_name)?;
        map.serialize_entry("event_address", &self.event_address)?;
        map.serialize_entry("event_type_id", &self.event_type_id)?;
        map.serialize_entry(&self.marketplace.vendor_field(), self.vendor_id.as_str())?;
        map.serialize_entry("event_to_date", &self.event_to_date.format(DATE_FORMAT).to_string())?;
        map.serialize_entry(
            "event_from_date",
            &self.event_from_date.format(DATE_FORMAT).to_string(),
        )?;
        map.serialize_entry("event_to_time", &self.event_to_time)?;
        map.serialize_entry("event_from_time", &self.event_from_time)?;
        map.serialize_entry("guest_count", &self.guest_count)?;
        if let Some(amount) = self.amount {
            map.serialize_entry("amount", &amount)?;
        }
        map.end()
    }
}

/// Body of `POST {base}/{marketplace}/payment-intent`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Marketplace the booking belongs to
    pub marketplace: Marketplace,
    /// Booking being paid for
    pub booking_id: BookingId,
    /// Chosen payment method
    pub payment_method_id: PaymentMethodId,
    /// Billing contact
    pub billing: BillingDetails,
}

impl Serialize for PaymentIntentRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(&self.marketplace.booking_field(), self.booking_id.as_str())?;
        map.serialize_entry("payment_method_id", self.payment_method_id.as_str())?;
        map.serialize_entry("billingDetails", &self.billing)?;
        map.end()
    }
}

/// Body of `POST {base}/{marketplace}/availability`
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AvailabilitySlot {
    /// Vendor whose calendar is updated
    pub vendor_id: VendorId,
    /// Day the slot is on
    pub date: NaiveDate,
    /// Slot start, `HH:MM`
    pub from_time: String,
    /// Slot end, `HH:MM`
    pub to_time: String,
}
