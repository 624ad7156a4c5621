//! kiosk-cli: manage Kiosks on a local ledger snapshot

use clap::{Parser, Subcommand};
use kiosk_rs::{
    provider::KioskProvider,
    query::{fetch_all_kiosk_pages, fetch_kiosk},
    utils::format_timestamp,
    Ed25519Signer, KioskApp, KioskConfig, KioskError, MemoryProvider, ObjectId,
    PaginationArguments, Result, WalletSigner,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "kiosk-cli")]
#[command(about = "Create, inspect and manage Kiosks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Ledger snapshot file, created on first write
    #[arg(short, long, default_value = "kiosk-ledger.json")]
    ledger: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new keypair
    Keygen,
    /// Show the address of a key
    Address {
        /// Hex-encoded secret key
        #[arg(short, long)]
        key: String,
    },
    /// Mint a plain object owned by the key's address
    Mint {
        #[arg(short, long)]
        key: String,
        /// Move type of the object
        #[arg(short = 't', long)]
        item_type: String,
        /// Display name of the object
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List the Kiosks owned by the key's address
    Kiosks {
        #[arg(short, long)]
        key: String,
    },
    /// Create a new Kiosk for the key's address
    Create {
        #[arg(short, long)]
        key: String,
    },
    /// Place an owned object into a Kiosk
    Place {
        #[arg(short, long)]
        key: String,
        #[arg(long)]
        kiosk: String,
        #[arg(long)]
        item: String,
        #[arg(short = 't', long)]
        item_type: String,
    },
    /// List an item of a Kiosk for sale
    List {
        #[arg(short, long)]
        key: String,
        #[arg(long)]
        kiosk: String,
        #[arg(long)]
        item: String,
        #[arg(short = 't', long)]
        item_type: String,
        #[arg(short, long)]
        price: u64,
    },
    /// Show the contents of a Kiosk
    Show {
        kiosk: String,
        /// Fetch full objects for items
        #[arg(long)]
        items: bool,
        /// Fetch full objects for listings
        #[arg(long)]
        listings: bool,
        /// Continue after this cursor
        #[arg(long)]
        cursor: Option<String>,
        /// Page size, defaults to the configured one
        #[arg(long)]
        limit: Option<usize>,
        /// Follow the cursor through every page
        #[arg(long)]
        all: bool,
    },
    /// Show version information
    Version,
}

async fn open_ledger(path: &Path) -> Result<Arc<MemoryProvider>> {
    if path.exists() {
        Ok(Arc::new(MemoryProvider::load(path).await?))
    } else {
        Ok(Arc::new(MemoryProvider::new()))
    }
}

async fn open_app(ledger: &Arc<MemoryProvider>, key: &str, config: &KioskConfig) -> Result<KioskApp> {
    let signer = Arc::new(Ed25519Signer::from_hex(key)?);
    let address = signer.address();
    let app = KioskApp::builder()
        .with_provider(ledger.clone())
        .with_signer(signer)
        .with_config(config.clone())
        .build()?;
    app.connect(address).await?;
    Ok(app)
}

async fn select(app: &KioskApp, kiosk: &str) -> Result<()> {
    app.select_kiosk(&ObjectId::parse(kiosk)?).await
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match &cli.config {
        Some(path) => KioskConfig::from_file(path)?,
        None => KioskConfig::default(),
    };

    match cli.command {
        Commands::Keygen => {
            let signer = Ed25519Signer::generate();
            println!("Generated new keypair:");
            println!("Secret key: {}", signer.secret_hex());
            println!("Address: {}", signer.address());
        },
        Commands::Address { key } => {
            println!("{}", Ed25519Signer::from_hex(&key)?.address());
        },
        Commands::Mint {
            key,
            item_type,
            name,
        } => {
            let ledger = open_ledger(&cli.ledger).await?;
            let owner = Ed25519Signer::from_hex(&key)?.address();
            let item_id = ledger.mint_object(&owner, &item_type, json!({})).await;
            if let Some(name) = name {
                ledger.set_display(&item_id, json!({ "name": name })).await?;
            }
            ledger.save(&cli.ledger).await?;
            println!("{}", item_id);
        },
        Commands::Kiosks { key } => {
            let ledger = open_ledger(&cli.ledger).await?;
            let app = open_app(&ledger, &key, &config).await?;
            let kiosks: Vec<_> = app
                .owned_kiosks()
                .await
                .into_iter()
                .map(|kiosk| json!({ "kioskId": kiosk.kiosk_id, "ownerCap": kiosk.owner_cap_id }))
                .collect();
            print_json(&kiosks)?;
        },
        Commands::Create { key } => {
            let ledger = open_ledger(&cli.ledger).await?;
            let app = open_app(&ledger, &key, &config).await?;
            let response = app
                .create_new_kiosk()
                .await?
                .ok_or_else(|| KioskError::generic("kiosk creation was not executed"))?;
            ledger.save(&cli.ledger).await?;
            info!(
                "Transaction {} executed at {}",
                response.digest,
                format_timestamp(response.timestamp_ms)
            );
            print_json(&app.kiosk_ids().await)?;
        },
        Commands::Place {
            key,
            kiosk,
            item,
            item_type,
        } => {
            let ledger = open_ledger(&cli.ledger).await?;
            let app = open_app(&ledger, &key, &config).await?;
            select(&app, &kiosk).await?;
            let response = app
                .place_item(&ObjectId::parse(&item)?, &item_type)
                .await?
                .ok_or_else(|| KioskError::generic("place was not executed"))?;
            ledger.save(&cli.ledger).await?;
            print_json(&response)?;
        },
        Commands::List {
            key,
            kiosk,
            item,
            item_type,
            price,
        } => {
            let ledger = open_ledger(&cli.ledger).await?;
            let app = open_app(&ledger, &key, &config).await?;
            select(&app, &kiosk).await?;
            let response = app
                .list_item(&ObjectId::parse(&item)?, &item_type, price)
                .await?
                .ok_or_else(|| KioskError::generic("listing was not executed"))?;
            ledger.save(&cli.ledger).await?;
            print_json(&response)?;
        },
        Commands::Show {
            kiosk,
            items,
            listings,
            cursor,
            limit,
            all,
        } => {
            let ledger = open_ledger(&cli.ledger).await?;
            let provider: Arc<dyn KioskProvider> = ledger;
            let kiosk_id = ObjectId::parse(&kiosk)?;
            let options = config.fetch_options(items, listings);
            let limit = limit.unwrap_or(config.page_size);

            if all {
                let data = fetch_all_kiosk_pages(provider.as_ref(), &kiosk_id, limit, &options).await?;
                print_json(&data)?;
            } else {
                let pagination = PaginationArguments {
                    cursor,
                    limit: Some(limit),
                };
                let page = fetch_kiosk(provider.as_ref(), &kiosk_id, &pagination, &options).await?;
                print_json(&page)?;
            }
        },
        Commands::Version => {
            println!("{} v{}", kiosk_rs::NAME, kiosk_rs::VERSION);
        },
    }

    Ok(())
}
