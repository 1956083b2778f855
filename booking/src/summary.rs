//! Booked-success summary assembly.
//!
//! Payment confirmation, order hand-off and the success dialog's safety net
//! all build their [`BookedInfo`] here, from whatever partial state exists.
//! Each field takes the first *meaningful* source in priority order: a zero
//! number or an empty string counts as missing and falls through.
//!
//! | field            | priority                                                       |
//! |------------------|----------------------------------------------------------------|
//! | guest_count      | confirm payload, event details, order details, 0               |
//! | price_per_person | confirm payload, menu details, selected menu, order details, 0 |
//! | vendor_name      | vendor lookup by id, order details, "Vendor"                   |
//! | menu_name        | menu details, selected menu, order details, "Custom Menu"      |
//! | event_name       | event details, "Your Event"                                    |
//! | event_date       | event details start date                                       |
//! | total            | transaction amount, order total, guest_count × price_per_person |
//! | booking_id       | booking draft id                                               |

use crate::pricing;
use crate::types::{
    BookedInfo, BookingDraft, ConfirmPayload, EventDetails, MenuDetails, OrderDetails, Vendor,
    VendorId,
};

/// Vendor name used when no source names the vendor
pub const DEFAULT_VENDOR_NAME: &str = "Vendor";
/// Menu name used when no source names the menu
pub const DEFAULT_MENU_NAME: &str = "Custom Menu";
/// Event name used when no details were captured
pub const DEFAULT_EVENT_NAME: &str = "Your Event";

/// Everything a summary may be assembled from. All fields are optional.
#[derive(Clone, Copy, Debug, Default)]
pub struct SummarySources<'a> {
    /// Guest count and price shown in the confirm dialog
    pub confirm_payload: Option<&'a ConfirmPayload>,
    /// Details captured by the details dialog
    pub event_details: Option<&'a EventDetails>,
    /// Existing order, used as the last resort
    pub order_details: Option<&'a OrderDetails>,
    /// Menu details fetched for the selected menu
    pub menu_details: Option<&'a MenuDetails>,
    /// Menu picked on the vendor page
    pub selected_menu: Option<&'a MenuDetails>,
    /// Marketplace listing to resolve the vendor name from
    pub vendors: &'a [Vendor],
    /// Selected vendor
    pub vendor_id: Option<&'a VendorId>,
    /// Server-acknowledged booking
    pub booking_draft: Option<&'a BookingDraft>,
}

fn positive_count(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

fn positive_amount(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build the success summary from whatever state is available.
#[must_use]
pub fn build_booked_summary(sources: &SummarySources<'_>) -> BookedInfo {
    let order = sources.order_details;

    let guest_count = positive_count(sources.confirm_payload.map(|c| c.guest_count))
        .or_else(|| positive_count(sources.event_details.map(|e| e.guest_count)))
        .or_else(|| positive_count(order.and_then(|o| o.guest_count)))
        .unwrap_or(0);

    let price_per_person = positive_amount(sources.confirm_payload.map(|c| c.price_per_person))
        .or_else(|| positive_amount(sources.menu_details.map(|m| m.price_per_person)))
        .or_else(|| positive_amount(sources.selected_menu.map(|m| m.price_per_person)))
        .or_else(|| positive_amount(order.and_then(|o| o.price_per_person)))
        .unwrap_or(0.0);

    let vendor_name = sources
        .vendor_id
        .and_then(|id| sources.vendors.iter().find(|v| &v.id == id))
        .and_then(|v| non_empty(Some(v.name.as_str())))
        .or_else(|| non_empty(order.and_then(|o| o.vendor_name.as_deref())))
        .unwrap_or(DEFAULT_VENDOR_NAME)
        .to_string();

    let menu_name = non_empty(sources.menu_details.map(|m| m.name.as_str()))
        .or_else(|| non_empty(sources.selected_menu.map(|m| m.name.as_str())))
        .or_else(|| non_empty(order.and_then(|o| o.menu_name.as_deref())))
        .unwrap_or(DEFAULT_MENU_NAME)
        .to_string();

    let event_name = non_empty(sources.event_details.map(|e| e.event_name.as_str()))
        .unwrap_or(DEFAULT_EVENT_NAME)
        .to_string();

    let total = positive_amount(sources.booking_draft.and_then(BookingDraft::amount))
        .or_else(|| positive_amount(order.and_then(|o| o.total)))
        .unwrap_or_else(|| pricing::subtotal(guest_count, price_per_person));

    BookedInfo {
        vendor_name,
        menu_name,
        event_name,
        event_date: sources.event_details.map(|e| e.start_date),
        guest_count,
        price_per_person,
        total,
        booking_id: sources.booking_draft.and_then(BookingDraft::booking_id).cloned(),
    }
}
