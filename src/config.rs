//! Client configuration

use crate::{
    error::{KioskError, Result},
    provider::ObjectDataOptions,
    query::FetchKioskOptions,
    transaction::DEFAULT_GAS_BUDGET,
    types::KIOSK_OWNER_CAP,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of dynamic fields fetched per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Configuration shared by the app shell and the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Dynamic fields per page when listing a Kiosk
    pub page_size: usize,

    /// Struct type searched for when discovering owned Kiosks
    pub owner_cap_type: String,

    /// Gas budget for transactions built by the app
    pub gas_budget: u64,

    /// Object options used when hydrating items
    pub item_options: ObjectDataOptions,

    /// Object options used when hydrating listings
    pub listing_options: ObjectDataOptions,
}

impl Default for KioskConfig {
    fn default() -> Self {
        let fetch = FetchKioskOptions::default();
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            owner_cap_type: KIOSK_OWNER_CAP.to_string(),
            gas_budget: DEFAULT_GAS_BUDGET,
            item_options: fetch.item_options,
            listing_options: fetch.listing_options,
        }
    }
}

impl KioskConfig {
    /// Read a JSON config file; missing keys fall back to defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            KioskError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: KioskConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(KioskError::config("page_size must be at least 1"));
        }
        if self.owner_cap_type.split("::").count() != 3 {
            return Err(KioskError::config(format!(
                "owner_cap_type must be address::module::Struct, got {}",
                self.owner_cap_type
            )));
        }
        Ok(())
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn gas_budget(mut self, gas_budget: u64) -> Self {
        self.gas_budget = gas_budget;
        self
    }

    pub fn owner_cap_type(mut self, owner_cap_type: impl Into<String>) -> Self {
        self.owner_cap_type = owner_cap_type.into();
        self
    }

    /// Fetch options carrying this config's hydration settings
    pub fn fetch_options(&self, include_items: bool, include_listings: bool) -> FetchKioskOptions {
        FetchKioskOptions {
            include_items,
            item_options: self.item_options.clone(),
            include_listings,
            listing_options: self.listing_options.clone(),
        }
    }
}
