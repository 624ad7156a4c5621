use base64::{engine::general_purpose, Engine as _};
use kiosk_rs::{
    error::ProviderError,
    provider::{
        KioskProvider, ObjectDataOptions, ObjectFilter, ObjectResponseError, ObjectResponseQuery,
        TransactionResponseOptions,
    },
    transaction::kiosk,
    types::Owner,
    fetch_kiosk, Ed25519Signer, FetchKioskOptions, KioskError, MemoryProvider, ObjectId,
    PaginationArguments, Result, TransactionBlock, WalletSigner,
};
use serde_json::json;
use tempfile::tempdir;

const HERO: &str = "0x9::hero::Hero";

#[tokio::test]
async fn test_owned_objects_filter_and_paging() -> Result<()> {
    let ledger = MemoryProvider::new();
    let owner = Ed25519Signer::generate().address();
    let other = Ed25519Signer::generate().address();

    let mut heroes = Vec::new();
    for i in 0..3 {
        heroes.push(ledger.mint_object(&owner, HERO, json!({ "power": i })).await);
    }
    ledger.mint_object(&owner, "0x9::sword::Sword", json!({})).await;
    ledger.mint_object(&other, HERO, json!({})).await;

    let query = ObjectResponseQuery::struct_type(HERO, ObjectDataOptions::default().with_type());
    let first = ledger
        .get_owned_objects(&owner, &query, &PaginationArguments::first(2))
        .await?;
    assert_eq!(first.data.len(), 2);
    assert!(first.has_next_page);

    let cursor = first.next_cursor.clone().expect("next cursor");
    let second = ledger
        .get_owned_objects(&owner, &query, &PaginationArguments::after(cursor, 2))
        .await?;
    assert!(!second.has_next_page);
    assert_eq!(second.next_cursor, None);

    let ids: Vec<ObjectId> = first
        .data
        .iter()
        .chain(second.data.iter())
        .filter_map(|object| object.object_id().cloned())
        .collect();
    assert_eq!(ids, heroes);

    let by_id = ObjectResponseQuery {
        filter: Some(ObjectFilter::ObjectIds(vec![heroes[1].clone()])),
        options: ObjectDataOptions::default(),
    };
    let page = ledger
        .get_owned_objects(&owner, &by_id, &PaginationArguments::default())
        .await?;
    assert_eq!(page.data.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_options_control_returned_fields() -> Result<()> {
    let ledger = MemoryProvider::new();
    let owner = Ed25519Signer::generate().address();
    let hero = ledger.mint_object(&owner, HERO, json!({ "power": 3 })).await;

    let bare = ledger.get_object(&hero, &ObjectDataOptions::default()).await?;
    let data = bare.data.expect("object exists");
    assert!(data.type_.is_none() && data.owner.is_none() && data.content.is_none());

    let full = ledger
        .get_object(
            &hero,
            &ObjectDataOptions::default().with_type().with_owner().with_content(),
        )
        .await?;
    assert_eq!(full.object_fields().expect("content")["power"], 3);
    assert_eq!(full.data.expect("object exists").owner, Some(Owner::AddressOwner(owner)));
    Ok(())
}

#[tokio::test]
async fn test_missing_objects_are_reported_in_place() -> Result<()> {
    let ledger = MemoryProvider::new();
    let owner = Ed25519Signer::generate().address();
    let hero = ledger.mint_object(&owner, HERO, json!({})).await;
    let missing = ObjectId::new("0x404");

    let responses = ledger
        .multi_get_objects(&[missing.clone(), hero.clone()], &ObjectDataOptions::default())
        .await?;

    assert_eq!(responses.len(), 2);
    assert!(responses[0].data.is_none());
    assert!(matches!(
        responses[0].error,
        Some(ObjectResponseError::NotExists { .. })
    ));
    assert_eq!(responses[1].object_id(), Some(&hero));
    Ok(())
}

#[tokio::test]
async fn test_snapshot_survives_save_and_load() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("ledger.json");

    let ledger = MemoryProvider::new();
    let owner = Ed25519Signer::generate().address();
    let (kiosk_id, cap_id) = ledger.create_kiosk(&owner).await?;
    let hero = ledger.mint_object(&owner, HERO, json!({})).await;
    ledger.place_item(&kiosk_id, &cap_id, &hero).await?;
    ledger.list_item(&kiosk_id, &cap_id, &hero, 42, true).await?;
    ledger.save(&path).await?;

    let restored = MemoryProvider::load(&path).await?;
    assert_eq!(restored.snapshot().await, ledger.snapshot().await);

    let fields = restored
        .get_dynamic_fields(&kiosk_id, &PaginationArguments::default())
        .await?;
    assert_eq!(fields.data.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_kiosk_rules_are_enforced() -> Result<()> {
    let ledger = MemoryProvider::new();
    let owner = Ed25519Signer::generate().address();
    let (kiosk_id, cap_id) = ledger.create_kiosk(&owner).await?;
    let (_, other_cap) = ledger.create_kiosk(&owner).await?;
    let hero = ledger.mint_object(&owner, HERO, json!({})).await;

    // listing requires the item to be placed first
    assert!(ledger.list_item(&kiosk_id, &cap_id, &hero, 1, false).await.is_err());
    // a cap only works for its own kiosk
    assert!(ledger.place_item(&kiosk_id, &other_cap, &hero).await.is_err());

    ledger.place_item(&kiosk_id, &cap_id, &hero).await?;
    assert!(ledger.place_item(&kiosk_id, &cap_id, &hero).await.is_err());

    ledger.list_item(&kiosk_id, &cap_id, &hero, 1, false).await?;
    assert!(matches!(
        ledger.list_item(&kiosk_id, &cap_id, &hero, 2, false).await,
        Err(KioskError::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_forged_signature_is_rejected() -> Result<()> {
    let ledger = MemoryProvider::new();
    let owner = Ed25519Signer::generate();
    let forger = Ed25519Signer::generate();

    let mut tx = TransactionBlock::new();
    tx.set_sender(owner.address());
    kiosk::create_kiosk_and_share(&mut tx)?;

    let signed = forger.sign_transaction_block(&tx).await?;
    let result = ledger
        .execute_transaction_block(
            &signed.transaction_block_bytes,
            &signed.signature,
            &TransactionResponseOptions::effects(),
        )
        .await;
    assert!(matches!(
        result,
        Err(KioskError::Provider(ProviderError::InvalidSignature { .. }))
    ));

    // bytes that are not a transaction at all
    let signed = owner.sign_transaction_block(&tx).await?;
    let garbage = general_purpose::STANDARD.encode(b"not a transaction");
    assert!(ledger
        .execute_transaction_block(&garbage, &signed.signature, &TransactionResponseOptions::effects())
        .await
        .is_err());
    Ok(())
}

#[tokio::test]
async fn test_unbounded_limit_after_cursor_returns_the_rest() -> Result<()> {
    let ledger = MemoryProvider::new();
    let owner = Ed25519Signer::generate().address();
    let (kiosk_id, cap_id) = ledger.create_kiosk(&owner).await?;
    let mut heroes = Vec::new();
    for _ in 0..3 {
        let hero = ledger.mint_object(&owner, HERO, json!({})).await;
        ledger.place_item(&kiosk_id, &cap_id, &hero).await?;
        heroes.push(hero);
    }

    let first = ledger
        .get_dynamic_fields(&kiosk_id, &PaginationArguments::first(1))
        .await?;
    let cursor = first.next_cursor.expect("more fields follow");

    let rest = fetch_kiosk(
        &ledger,
        &kiosk_id,
        &PaginationArguments::after(cursor, usize::MAX),
        &FetchKioskOptions::default(),
    )
    .await?;
    assert_eq!(rest.data.item_ids, heroes[1..].to_vec());
    assert!(!rest.has_next_page);

    let owned = ledger
        .get_owned_objects(
            &owner,
            &ObjectResponseQuery::default(),
            &PaginationArguments::after(cap_id.to_string(), usize::MAX),
        )
        .await?;
    assert!(owned.data.is_empty());
    assert_eq!(owned.next_cursor, None);
    Ok(())
}

#[tokio::test]
async fn test_malformed_kiosk_in_snapshot_is_rejected() -> Result<()> {
    let seed = MemoryProvider::new();
    let owner = Ed25519Signer::generate().address();
    let (kiosk_id, cap_id) = seed.create_kiosk(&owner).await?;
    let hero = seed.mint_object(&owner, HERO, json!({})).await;

    let mut state = seed.snapshot().await;
    state
        .objects
        .get_mut(&kiosk_id)
        .expect("kiosk stored")
        .fields = json!("corrupted");
    let ledger = MemoryProvider::from_state(state);

    assert!(matches!(
        ledger.place_item(&kiosk_id, &cap_id, &hero).await,
        Err(KioskError::Validation(_))
    ));
    // nothing moved
    let item = ledger
        .get_object(&hero, &ObjectDataOptions::default().with_owner())
        .await?;
    assert_eq!(
        item.data.expect("item exists").owner,
        Some(Owner::AddressOwner(owner))
    );
    Ok(())
}
