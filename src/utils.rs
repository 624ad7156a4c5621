//! Utility functions and helpers

use crate::{
    error::Result,
    provider::{DynamicFieldInfo, KioskProvider, ObjectDataOptions, ObjectResponse},
    query::kiosk::{KioskData, KioskEntries, KioskItem, KioskListing},
    types::{ObjectId, KIOSK_ITEM, KIOSK_LISTING},
};
use chrono::{DateTime, Utc};

/// Get current timestamp in milliseconds
pub fn current_time_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// RFC 3339 rendering of a millisecond timestamp
pub fn format_timestamp(millis: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .map(|time| time.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

/// Check if a string is a valid hex string
pub fn is_valid_hex(hex: &str) -> bool {
    hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Last two `::` segments of a type tag, e.g. `0x2::kiosk::Item` -> `kiosk::Item`
pub fn short_type(type_tag: &str) -> String {
    let segments: Vec<&str> = type_tag.split("::").collect();
    let start = segments.len().saturating_sub(2);
    segments[start..].join("::")
}

/// Classify the dynamic fields of a Kiosk into items and listings.
///
/// Fields whose key type is neither `kiosk::Item` nor `kiosk::Listing` are
/// dropped. Relative order is kept within each bucket.
///
/// A listing whose key carries no item `id` is dropped as well, so
/// `listings` and `listing_ids` always line up one to one.
pub fn extract_kiosk_data(fields: &[DynamicFieldInfo]) -> KioskData {
    let mut items = Vec::new();
    let mut listings = Vec::new();
    let mut item_ids = Vec::new();
    let mut listing_ids = Vec::new();

    for field in fields {
        match short_type(&field.name.type_).as_str() {
            KIOSK_ITEM => {
                item_ids.push(field.object_id.clone());
                items.push(KioskItem {
                    item_id: field.object_id.clone(),
                    item_type: field.object_type.clone(),
                    bcs_name: field.bcs_name.clone(),
                });
            },
            KIOSK_LISTING => {
                let Some(item_id) = field.name.value.get("id").and_then(|id| id.as_str()) else {
                    tracing::debug!("Listing {} has no item id in its key", field.object_id);
                    continue;
                };
                let is_exclusive = field
                    .name
                    .value
                    .get("is_exclusive")
                    .and_then(|flag| flag.as_bool())
                    .unwrap_or(false);

                listing_ids.push(field.object_id.clone());
                listings.push(KioskListing {
                    item_id: ObjectId::new(item_id),
                    listing_id: field.object_id.clone(),
                    is_exclusive,
                    bcs_name: field.bcs_name.clone(),
                });
            },
            _ => {},
        }
    }

    KioskData {
        items: KioskEntries::Summary(items),
        listings: KioskEntries::Summary(listings),
        item_ids,
        listing_ids,
    }
}

/// Batch-fetch objects, skipping the provider call entirely for an empty id list
pub async fn get_objects(
    provider: &dyn KioskProvider,
    ids: &[ObjectId],
    options: &ObjectDataOptions,
) -> Result<Vec<ObjectResponse>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    provider.multi_get_objects(ids, options).await
}
