//! kiosk-rs - typed queries and session state for Kiosk objects
//! Rust implementation

// Modules
pub mod app;
pub mod config;
pub mod error;
pub mod execution;
pub mod provider;
pub mod query;
pub mod transaction;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-exports
pub use app::{KioskApp, OwnedKiosk, ViewState};
pub use config::KioskConfig;
pub use error::{KioskError, Result};
pub use execution::{Notifier, TracingNotifier, TransactionExecutor};
pub use provider::{KioskProvider, MemoryProvider, PaginationArguments};
pub use query::{fetch_kiosk, FetchKioskOptions, KioskData, KioskItem, KioskListing, PagedKioskData};
pub use transaction::{obj_arg, ObjectArgument, TransactionArgument, TransactionBlock};
pub use types::{ObjectId, SuiAddress};
pub use utils::extract_kiosk_data;
pub use wallet::{Ed25519Signer, WalletSigner};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
