//! Kiosk contents queries

use crate::{
    error::{KioskError, Result},
    provider::{KioskProvider, ObjectDataOptions, ObjectResponse, PaginationArguments},
    types::ObjectId,
    utils::{extract_kiosk_data, get_objects},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A dynamic field `Listing { id, is_exclusive }` attached to the Kiosk.
/// The field value is the price of the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskListing {
    /// The ID of the item
    pub item_id: ObjectId,
    /// The ID of the listing
    pub listing_id: ObjectId,
    /// Whether a `PurchaseCap` was issued for the item. `true` means the
    /// listing is controlled by some logic and can't be purchased directly.
    pub is_exclusive: bool,
    /// Can be used to query the dynamic field
    pub bcs_name: String,
}

/// A dynamic field `Item { id }` attached to the Kiosk, holding an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskItem {
    /// The ID of the item
    pub item_id: ObjectId,
    /// The type of the item
    pub item_type: String,
    /// Can be used to query the dynamic field
    pub bcs_name: String,
}

/// Either the lightweight records or the full objects they point at
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KioskEntries<T> {
    Summary(Vec<T>),
    Hydrated(Vec<ObjectResponse>),
}

impl<T> KioskEntries<T> {
    pub fn len(&self) -> usize {
        match self {
            KioskEntries::Summary(records) => records.len(),
            KioskEntries::Hydrated(objects) => objects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> Option<&[T]> {
        match self {
            KioskEntries::Summary(records) => Some(records),
            KioskEntries::Hydrated(_) => None,
        }
    }

    pub fn hydrated(&self) -> Option<&[ObjectResponse]> {
        match self {
            KioskEntries::Summary(_) => None,
            KioskEntries::Hydrated(objects) => Some(objects),
        }
    }

    fn append(&mut self, other: KioskEntries<T>) -> Result<()> {
        match (self, other) {
            (KioskEntries::Summary(records), KioskEntries::Summary(more)) => records.extend(more),
            (KioskEntries::Hydrated(objects), KioskEntries::Hydrated(more)) => objects.extend(more),
            _ => return Err(KioskError::generic("cannot merge summary and hydrated kiosk pages")),
        }
        Ok(())
    }
}

impl<T> Default for KioskEntries<T> {
    fn default() -> Self {
        KioskEntries::Summary(Vec::new())
    }
}

/// Aggregated data from the Kiosk
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskData {
    pub items: KioskEntries<KioskItem>,
    pub listings: KioskEntries<KioskListing>,
    pub item_ids: Vec<ObjectId>,
    pub listing_ids: Vec<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedKioskData {
    pub data: KioskData,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// What to hydrate besides the dynamic field records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FetchKioskOptions {
    pub include_items: bool,
    pub item_options: ObjectDataOptions,
    pub include_listings: bool,
    pub listing_options: ObjectDataOptions,
}

impl Default for FetchKioskOptions {
    fn default() -> Self {
        Self {
            include_items: false,
            // items are usually shown through their Display
            item_options: ObjectDataOptions::default().with_display().with_type(),
            include_listings: false,
            // listings carry the price in their content
            listing_options: ObjectDataOptions::default().with_content(),
        }
    }
}

impl FetchKioskOptions {
    pub fn with_items(mut self) -> Self {
        self.include_items = true;
        self
    }

    pub fn with_listings(mut self) -> Self {
        self.include_listings = true;
        self
    }
}

/// Fetch one page of a Kiosk's contents.
///
/// The dynamic fields of the Kiosk are classified into items and listings.
/// When requested, items and listings are then replaced by their full
/// objects; the two batches are fetched concurrently. Provider errors are
/// returned as-is.
pub async fn fetch_kiosk(
    provider: &dyn KioskProvider,
    kiosk_id: &ObjectId,
    pagination: &PaginationArguments,
    options: &FetchKioskOptions,
) -> Result<PagedKioskData> {
    let page = provider.get_dynamic_fields(kiosk_id, pagination).await?;
    let mut kiosk_data = extract_kiosk_data(&page.data);

    debug!(
        "Kiosk {}: {} items, {} listings on this page",
        kiosk_id,
        kiosk_data.item_ids.len(),
        kiosk_data.listing_ids.len()
    );

    let fetch_items = async {
        if options.include_items {
            get_objects(provider, &kiosk_data.item_ids, &options.item_options).await
        } else {
            Ok(Vec::new())
        }
    };
    let fetch_listings = async {
        if options.include_listings {
            get_objects(provider, &kiosk_data.listing_ids, &options.listing_options).await
        } else {
            Ok(Vec::new())
        }
    };
    let (item_objects, listing_objects) = futures::try_join!(fetch_items, fetch_listings)?;

    if options.include_items {
        kiosk_data.items = KioskEntries::Hydrated(item_objects);
    }
    if options.include_listings {
        kiosk_data.listings = KioskEntries::Hydrated(listing_objects);
    }

    Ok(PagedKioskData {
        data: kiosk_data,
        next_cursor: page.next_cursor,
        has_next_page: page.has_next_page,
    })
}

/// Follow the cursor until the last page and merge every page.
pub async fn fetch_all_kiosk_pages(
    provider: &dyn KioskProvider,
    kiosk_id: &ObjectId,
    page_size: usize,
    options: &FetchKioskOptions,
) -> Result<KioskData> {
    let mut pagination = PaginationArguments::first(page_size);
    let mut merged: Option<KioskData> = None;

    loop {
        let page = fetch_kiosk(provider, kiosk_id, &pagination, options).await?;

        match merged.as_mut() {
            None => merged = Some(page.data),
            Some(data) => {
                data.items.append(page.data.items)?;
                data.listings.append(page.data.listings)?;
                data.item_ids.extend(page.data.item_ids);
                data.listing_ids.extend(page.data.listing_ids);
            },
        }

        match page.next_cursor {
            Some(cursor) if page.has_next_page => {
                pagination = PaginationArguments::after(cursor, page_size);
            },
            _ => break,
        }
    }

    Ok(merged.unwrap_or_default())
}
