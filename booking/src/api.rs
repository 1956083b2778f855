//! The booking backend collaborator.
//!
//! [`BookingApi`] is the seam the reducer calls through; [`HttpBookingApi`]
//! is the reqwest implementation used in production.

use crate::error::{BookingError, Result};
use crate::request::{AvailabilitySlot, CreateBookingRequest, PaymentIntentRequest};
use crate::types::{BookingDraft, Marketplace, PaymentIntent, Vendor};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use vibes_auth::AuthStore;

/// Boxed future returned by [`BookingApi`] methods
pub type ApiFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// Booking backend operations
///
/// Object-safe so the environment can hold an `Arc<dyn BookingApi>` and
/// tests can swap in an in-memory backend.
pub trait BookingApi: Send + Sync {
    /// List the vendors of a marketplace
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the listing cannot be decoded
    fn list_vendors(&self, marketplace: Marketplace) -> ApiFuture<Vec<Vendor>>;

    /// Create a provisional booking
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response has no booking
    fn create_booking(&self, request: CreateBookingRequest) -> ApiFuture<BookingDraft>;

    /// Request a payment intent for an existing booking
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::MissingPaymentIntent`] if the response carries
    /// no intent, or a transport/API error
    fn create_payment_intent(&self, request: PaymentIntentRequest) -> ApiFuture<PaymentIntent>;

    /// Add a slot to a vendor's availability calendar
    ///
    /// # Errors
    ///
    /// Returns error if the request fails
    fn add_availability(&self, marketplace: Marketplace, slot: AvailabilitySlot) -> ApiFuture<()>;
}

/// reqwest-backed [`BookingApi`]
///
/// Sends `Authorization: Bearer <token>` whenever the auth store holds a
/// token; the token is read per request, so a login or logout takes effect
/// immediately.
#[derive(Clone)]
pub struct HttpBookingApi {
    client: Client,
    base_url: String,
    auth: Arc<AuthStore>,
}

impl HttpBookingApi {
    /// Create a client for `base_url` (e.g. `http://localhost:8000/api`)
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidConfig`] if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, auth: Arc<AuthStore>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BookingError::InvalidConfig(e.to_string()))?;
        Ok(Self::with_client(client, base_url, auth))
    }

    /// Create a client around an existing reqwest [`Client`]
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>, auth: Arc<AuthStore>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, marketplace: Marketplace, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, marketplace.key(), path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.auth.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn post<B: Serialize>(&self, url: String, body: &B) -> RequestBuilder {
        self.authorize(self.client.post(url).json(body))
    }

    fn get(&self, url: String) -> RequestBuilder {
        self.authorize(self.client.get(url))
    }
}

/// Send a request and decode a successful JSON body.
async fn send_json(request: RequestBuilder) -> Result<serde_json::Value> {
    let response = request
        .send()
        .await
        .map_err(|e| BookingError::RequestFailed(e.to_string()))?;

    match response.status() {
        status if status.is_success() => {
            let body = response
                .text()
                .await
                .map_err(|e| BookingError::ResponseParseFailed(e.to_string()))?;
            if body.trim().is_empty() {
                return Ok(serde_json::Value::Null);
            }
            serde_json::from_str(&body).map_err(|e| BookingError::ResponseParseFailed(e.to_string()))
        },
        StatusCode::UNAUTHORIZED => Err(BookingError::Unauthorized),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(BookingError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            })
        },
    }
}

/// Pull `message` (or `error`) out of a JSON error body, else the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(serde_json::Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

fn decode_vendors(body: serde_json::Value) -> Result<Vec<Vendor>> {
    let list = match body {
        serde_json::Value::Object(mut map) => map.remove("data").unwrap_or(serde_json::Value::Null),
        other => other,
    };
    serde_json::from_value(list).map_err(|e| BookingError::ResponseParseFailed(e.to_string()))
}

impl BookingApi for HttpBookingApi {
    fn list_vendors(&self, marketplace: Marketplace) -> ApiFuture<Vec<Vendor>> {
        let request = self.get(self.url(marketplace, "list"));
        Box::pin(async move {
            let vendors = decode_vendors(send_json(request).await?)?;
            tracing::debug!(%marketplace, count = vendors.len(), "Vendors listed");
            Ok(vendors)
        })
    }

    fn create_booking(&self, request: CreateBookingRequest) -> ApiFuture<BookingDraft> {
        let marketplace = request.marketplace;
        let http = self.post(self.url(marketplace, "booking"), &request);
        Box::pin(async move {
            let body = send_json(http).await?;
            let draft = BookingDraft::from_response(marketplace, &body)?;
            tracing::info!(
                %marketplace,
                booking_id = ?draft.booking_id(),
                amount = ?draft.amount(),
                "Booking created"
            );
            Ok(draft)
        })
    }

    fn create_payment_intent(&self, request: PaymentIntentRequest) -> ApiFuture<PaymentIntent> {
        let http = self.post(self.url(request.marketplace, "payment-intent"), &request);
        let booking_id = request.booking_id;
        Box::pin(async move {
            let body = send_json(http).await?;
            let intent = PaymentIntent::from_response(&body)?;
            tracing::info!(%booking_id, intent_id = ?intent.id(), "Payment intent created");
            Ok(intent)
        })
    }

    fn add_availability(&self, marketplace: Marketplace, slot: AvailabilitySlot) -> ApiFuture<()> {
        let http = self.post(self.url(marketplace, "availability"), &slot);
        Box::pin(async move {
            send_json(http).await?;
            tracing::info!(vendor_id = %slot.vendor_id, date = %slot.date, "Availability added");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;
    use vibes_auth::MemoryPersistence;

    fn api(base: &str) -> HttpBookingApi {
        let auth = Arc::new(AuthStore::new(Arc::new(MemoryPersistence::new())));
        HttpBookingApi::with_client(Client::new(), base, auth)
    }

    #[test]
    fn test_url_building_trims_slash() {
        let api = api("http://localhost:8000/api/");
        assert_eq!(api.base_url(), "http://localhost:8000/api");
        assert_eq!(
            api.url(Marketplace::Staffing, "payment-intent"),
            "http://localhost:8000/api/staffing/payment-intent"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"Vendor unavailable"}"#), "Vendor unavailable");
        assert_eq!(error_message(r#"{"error":"bad date"}"#), "bad date");
        assert_eq!(error_message("gateway down"), "gateway down");
    }

    #[test]
    fn test_vendor_listing_shapes() {
        let bare = json!([{ "_id": "v-1", "name": "A" }]);
        let wrapped = json!({ "data": [{ "_id": "v-2", "name": "B" }] });

        assert_eq!(decode_vendors(bare).unwrap()[0].name, "A");
        assert_eq!(decode_vendors(wrapped).unwrap()[0].name, "B");
        assert!(decode_vendors(json!({ "vendors": [] })).is_err());
    }
}
