//! Read-side helpers

pub mod kiosk;

pub use kiosk::{
    fetch_all_kiosk_pages, fetch_kiosk, FetchKioskOptions, KioskData, KioskEntries, KioskItem,
    KioskListing, PagedKioskData,
};
