use async_trait::async_trait;
use kiosk_rs::{
    error::SigningError,
    provider::{
        ExecutionStatus, KioskProvider, ObjectChange, ObjectDataOptions, TransactionResponseOptions,
    },
    transaction::kiosk,
    types::Owner,
    wallet::SignedTransaction,
    fetch_kiosk, Ed25519Signer, FetchKioskOptions, MemoryProvider, Notifier, PaginationArguments,
    Result, SuiAddress, TransactionBlock, TransactionExecutor, WalletSigner,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// A wallet whose user declines every request
struct RejectingSigner {
    address: SuiAddress,
}

#[async_trait]
impl WalletSigner for RejectingSigner {
    fn address(&self) -> SuiAddress {
        self.address.clone()
    }

    async fn sign_transaction_block(&self, _tx: &TransactionBlock) -> Result<SignedTransaction> {
        Err(SigningError::Rejected {
            reason: "user declined".to_string(),
        }
        .into())
    }
}

fn create_kiosk_tx(sender: &SuiAddress) -> Result<TransactionBlock> {
    let mut tx = TransactionBlock::new();
    tx.set_sender(sender.clone());
    let cap = kiosk::create_kiosk_and_share(&mut tx)?;
    let recipient = tx.pure(sender)?;
    tx.transfer_objects(vec![cap], recipient)?;
    Ok(tx)
}

#[tokio::test]
async fn test_successful_execution_returns_response() -> Result<()> {
    let ledger = Arc::new(MemoryProvider::new());
    let signer = Arc::new(Ed25519Signer::generate());
    let notifier = Arc::new(RecordingNotifier::default());
    let executor = TransactionExecutor::new(ledger.clone(), signer.clone()).with_notifier(notifier.clone());

    let tx = create_kiosk_tx(&signer.address())?;
    let response = executor.sign_and_execute(&tx, None).await.expect("executed");

    // default options request effects only
    assert_eq!(response.succeeded(), Some(true));
    assert!(response.object_changes.is_none());
    assert!(response.transaction.is_none());
    let effects = response.effects.expect("effects requested");
    assert_eq!(effects.created.len(), 2);
    assert!(notifier.messages.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_requested_options_are_forwarded() -> Result<()> {
    let ledger = Arc::new(MemoryProvider::new());
    let signer = Arc::new(Ed25519Signer::generate());
    let executor = TransactionExecutor::new(ledger.clone(), signer.clone());

    let tx = create_kiosk_tx(&signer.address())?;
    let options = TransactionResponseOptions {
        show_input: true,
        show_effects: false,
        show_object_changes: true,
    };
    let response = executor.sign_and_execute(&tx, Some(options)).await.expect("executed");

    assert!(response.effects.is_none());
    assert!(response.transaction.is_some());
    let changes = response.object_changes.expect("object changes requested");
    let created = changes
        .iter()
        .filter(|change| matches!(change, ObjectChange::Created { .. }))
        .count();
    assert_eq!(created, 2);
    Ok(())
}

#[tokio::test]
async fn test_rejected_signature_is_reported_not_raised() -> Result<()> {
    let ledger = Arc::new(MemoryProvider::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let address = Ed25519Signer::generate().address();
    let signer = Arc::new(RejectingSigner {
        address: address.clone(),
    });
    let executor = TransactionExecutor::new(ledger.clone(), signer).with_notifier(notifier.clone());

    let before = ledger.snapshot().await;
    let response = executor.sign_and_execute(&create_kiosk_tx(&address)?, None).await;

    assert!(response.is_none());
    let messages = notifier.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("user declined"));
    assert_eq!(ledger.snapshot().await, before);
    Ok(())
}

#[tokio::test]
async fn test_signer_fills_missing_sender() -> Result<()> {
    let ledger = Arc::new(MemoryProvider::new());
    let signer = Arc::new(Ed25519Signer::generate());
    let executor = TransactionExecutor::new(ledger.clone(), signer.clone());

    let mut tx = TransactionBlock::new();
    kiosk::create_kiosk_and_share(&mut tx)?;
    // the owner cap is left unused, so the ledger keeps it with the sender
    let response = executor.sign_and_execute(&tx, None).await.expect("executed");
    assert_eq!(response.succeeded(), Some(true));
    Ok(())
}

#[tokio::test]
async fn test_unsupported_call_fails_without_changes() -> Result<()> {
    let ledger = Arc::new(MemoryProvider::new());
    let signer = Arc::new(Ed25519Signer::generate());
    let notifier = Arc::new(RecordingNotifier::default());
    let executor = TransactionExecutor::new(ledger.clone(), signer.clone()).with_notifier(notifier.clone());

    let mut tx = TransactionBlock::new();
    tx.set_sender(signer.address());
    kiosk::create_kiosk_and_share(&mut tx)?;
    tx.move_call("0x9::hero::mint", vec![], vec![])?;

    let before = ledger.snapshot().await;
    let response = executor.sign_and_execute(&tx, None).await.expect("submitted");

    let effects = response.effects.expect("effects requested");
    assert!(matches!(effects.status, ExecutionStatus::Failure { .. }));
    assert!(effects.created.is_empty());
    // the kiosk created by the first command is rolled back
    assert_eq!(ledger.snapshot().await, before);
    // an on-chain failure is a response, not a notification
    assert!(notifier.messages.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_provider_error_is_reported() -> Result<()> {
    let ledger = Arc::new(MemoryProvider::new());
    let signer = Arc::new(Ed25519Signer::generate());
    let notifier = Arc::new(RecordingNotifier::default());
    let executor = TransactionExecutor::new(ledger.clone(), signer.clone()).with_notifier(notifier.clone());

    // sender differs from the signing key
    let tx = create_kiosk_tx(&Ed25519Signer::generate().address())?;
    assert!(executor.sign_and_execute(&tx, None).await.is_none());
    assert_eq!(notifier.messages.lock().unwrap().len(), 1);

    let owned = ledger
        .get_owned_objects(
            &signer.address(),
            &Default::default(),
            &Default::default(),
        )
        .await?;
    assert!(owned.data.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_place_and_list_executes_in_one_transaction() -> Result<()> {
    let ledger = Arc::new(MemoryProvider::new());
    let signer = Arc::new(Ed25519Signer::generate());
    let executor = TransactionExecutor::new(ledger.clone(), signer.clone());
    let owner = signer.address();
    let (kiosk_id, cap_id) = ledger.create_kiosk(&owner).await?;
    let hero = ledger.mint_object(&owner, "0x9::hero::Hero", json!({})).await;

    let mut tx = TransactionBlock::new();
    tx.set_sender(owner);
    kiosk::place_and_list(&mut tx, "0x9::hero::Hero", &kiosk_id, &cap_id, &hero, 750)?;
    let response = executor.sign_and_execute(&tx, None).await.expect("executed");
    assert_eq!(response.succeeded(), Some(true));

    let options = FetchKioskOptions::default().with_listings();
    let page = fetch_kiosk(ledger.as_ref(), &kiosk_id, &PaginationArguments::default(), &options).await?;
    assert_eq!(page.data.item_ids, vec![hero.clone()]);
    let listings = page.data.listings.hydrated().expect("listings are hydrated");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].object_fields().expect("content")["value"], "750");

    let item = ledger
        .get_object(&hero, &ObjectDataOptions::default().with_owner())
        .await?;
    assert!(!matches!(
        item.data.expect("item exists").owner,
        Some(Owner::AddressOwner(_))
    ));
    Ok(())
}
