//! Booking flow demo binary
//!
//! Walks one booking from vendor selection to the success summary against
//! the in-memory backend. Pass `--http` to drive the backend configured by
//! `VIBES_API_BASE_URL` instead.

use anyhow::Context;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibes_auth::AuthStore;
use vibes_booking::mocks::InMemoryBookingApi;
use vibes_booking::{
    BillingDetails, BookingApi, BookingConfig, BookingEnvironment, BookingFlow, EventDetails,
    HttpBookingApi, MenuDetails, PaymentMethodId, Vendor, VendorId,
};

fn demo_vendors() -> Vec<Vendor> {
    vec![
        Vendor {
            id: VendorId::new("v-spice"),
            name: "Spice Route Catering".to_string(),
            mobile_no: Some("555-0142".to_string()),
            category_id: Some("3".to_string()),
            address: Some("12 Market St".to_string()),
        },
        Vendor {
            id: VendorId::new("v-fork"),
            name: "Green Fork".to_string(),
            mobile_no: None,
            category_id: Some("1".to_string()),
            address: None,
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vibes_booking=debug,vibes_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BookingConfig::from_env().context("loading configuration")?;
    let use_http = std::env::args().any(|arg| arg == "--http");

    let auth = Arc::new(AuthStore::for_kind(config.auth_storage, config.auth_file.clone()));
    let restored = auth.rehydrate().context("restoring auth session")?;
    tracing::info!(restored, storage = %config.auth_storage, "Auth store ready");

    let api: Arc<dyn BookingApi> = if use_http {
        Arc::new(HttpBookingApi::new(
            config.api_base_url.clone(),
            Arc::clone(&auth),
            config.response_timeout(),
        )?)
    } else {
        Arc::new(
            InMemoryBookingApi::new()
                .with_vendors(demo_vendors())
                .with_amount(2400.0),
        )
    };

    let flow = BookingFlow::new(BookingEnvironment::new(api, config.marketplace))
        .with_response_timeout(config.response_timeout());

    println!("=== Vibes booking flow ({}) ===\n", config.marketplace);

    let vendors = flow.load_vendors().await?;
    println!("Vendors: {}", vendors.len());
    let vendor = vendors.first().context("marketplace listing is empty")?;
    println!(">>> Selecting {}", vendor.name);
    flow.select_vendor(vendor.id.clone()).await?;
    flow.select_menu(Some(MenuDetails {
        id: Some("m-harvest".to_string()),
        name: "Harvest Buffet".to_string(),
        price_per_person: 45.0,
    }))
    .await?;

    flow.open_details().await?;
    println!("Phase: {}", flow.phase().await);

    let date = NaiveDate::from_ymd_opt(2025, 9, 20).context("invalid demo date")?;
    let draft = flow
        .submit_details(EventDetails {
            event_name: "Autumn Launch Party".to_string(),
            event_address: "1 Dock St".to_string(),
            event_type: Some("Corporate".to_string()),
            event_type_id: None,
            start_date: date,
            end_date: date,
            start_time: None,
            end_time: None,
            guest_count: 60,
        })
        .await?;
    println!(
        "Booking {} created, server amount {:?}",
        draft.booking_id().map_or("<none>", |id| id.as_str()),
        draft.amount()
    );
    println!("Phase: {}", flow.phase().await);
    if let Some(estimate) = flow.estimate().await {
        println!("Estimate incl. platform fee: {estimate:.2}");
    }

    let intent = flow
        .select_payment_method(
            PaymentMethodId::new("pm_card_visa"),
            BillingDetails {
                name: Some("Jordan Lee".to_string()),
                email: Some("jordan@example.com".to_string()),
                phone: None,
            },
        )
        .await?;
    println!("Payment intent {:?} handed to the payment UI", intent.id());
    println!("Phase: {}", flow.phase().await);

    let info = flow.confirm_payment().await?;
    println!("\n=== Booked ===");
    println!("  Vendor:    {}", info.vendor_name);
    println!("  Menu:      {}", info.menu_name);
    println!("  Event:     {}", info.event_name);
    if let Some(date) = info.event_date {
        println!("  Date:      {date}");
    }
    println!("  Guests:    {}", info.guest_count);
    println!("  Per guest: {:.2}", info.price_per_person);
    println!("  Total:     {:.2}", info.total);

    flow.close().await?;
    println!("\nPhase after close: {}", flow.phase().await);

    flow.shutdown(std::time::Duration::from_secs(5)).await?;
    Ok(())
}
