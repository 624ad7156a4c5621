//! Kiosk Move calls

use crate::{
    error::Result,
    transaction::{nested, obj_arg, ObjectArgument, TransactionArgument, TransactionBlock},
    types::{ObjectId, KIOSK_MODULE, KIOSK_TYPE, SUI_FRAMEWORK},
};

fn kiosk_fn(function: &str) -> String {
    format!("{}::{}", KIOSK_MODULE, function)
}

/// Create a new Kiosk. Returns `(kiosk, owner_cap)`.
pub fn create_kiosk(tx: &mut TransactionBlock) -> Result<(TransactionArgument, TransactionArgument)> {
    let result = tx.move_call(&kiosk_fn("new"), vec![], vec![])?;
    Ok((nested(result, 0)?, nested(result, 1)?))
}

/// Create a new Kiosk and share it. Returns the owner cap, which the caller
/// must transfer or use within the same transaction.
pub fn create_kiosk_and_share(tx: &mut TransactionBlock) -> Result<TransactionArgument> {
    let (kiosk, owner_cap) = create_kiosk(tx)?;
    tx.move_call(
        &format!("{}::transfer::public_share_object", SUI_FRAMEWORK),
        vec![KIOSK_TYPE.to_string()],
        vec![kiosk],
    )?;
    Ok(owner_cap)
}

/// Place `item` of type `item_type` into the Kiosk
pub fn place(
    tx: &mut TransactionBlock,
    item_type: &str,
    kiosk: impl Into<ObjectArgument>,
    kiosk_cap: impl Into<ObjectArgument>,
    item: impl Into<ObjectArgument>,
) -> Result<()> {
    let arguments = vec![obj_arg(tx, kiosk)?, obj_arg(tx, kiosk_cap)?, obj_arg(tx, item)?];
    tx.move_call(&kiosk_fn("place"), vec![item_type.to_string()], arguments)?;
    Ok(())
}

/// List an item already placed in the Kiosk for `price`
pub fn list(
    tx: &mut TransactionBlock,
    item_type: &str,
    kiosk: impl Into<ObjectArgument>,
    kiosk_cap: impl Into<ObjectArgument>,
    item_id: &ObjectId,
    price: u64,
) -> Result<()> {
    let kiosk = obj_arg(tx, kiosk)?;
    let kiosk_cap = obj_arg(tx, kiosk_cap)?;
    let item_id = tx.pure(item_id)?;
    let price = tx.pure(&price)?;
    tx.move_call(
        &kiosk_fn("list"),
        vec![item_type.to_string()],
        vec![kiosk, kiosk_cap, item_id, price],
    )?;
    Ok(())
}

/// Remove the listing of an item; the item stays in the Kiosk
pub fn delist(
    tx: &mut TransactionBlock,
    item_type: &str,
    kiosk: impl Into<ObjectArgument>,
    kiosk_cap: impl Into<ObjectArgument>,
    item_id: &ObjectId,
) -> Result<()> {
    let kiosk = obj_arg(tx, kiosk)?;
    let kiosk_cap = obj_arg(tx, kiosk_cap)?;
    let item_id = tx.pure(item_id)?;
    tx.move_call(
        &kiosk_fn("delist"),
        vec![item_type.to_string()],
        vec![kiosk, kiosk_cap, item_id],
    )?;
    Ok(())
}

pub fn place_and_list(
    tx: &mut TransactionBlock,
    item_type: &str,
    kiosk: impl Into<ObjectArgument>,
    kiosk_cap: impl Into<ObjectArgument>,
    item: impl Into<ObjectArgument>,
    price: u64,
) -> Result<()> {
    let kiosk = obj_arg(tx, kiosk)?;
    let kiosk_cap = obj_arg(tx, kiosk_cap)?;
    let item = obj_arg(tx, item)?;
    let price = tx.pure(&price)?;
    tx.move_call(
        &kiosk_fn("place_and_list"),
        vec![item_type.to_string()],
        vec![kiosk, kiosk_cap, item, price],
    )?;
    Ok(())
}

/// Take an item out of the Kiosk. Returns the item.
pub fn take(
    tx: &mut TransactionBlock,
    item_type: &str,
    kiosk: impl Into<ObjectArgument>,
    kiosk_cap: impl Into<ObjectArgument>,
    item_id: &ObjectId,
) -> Result<TransactionArgument> {
    let kiosk = obj_arg(tx, kiosk)?;
    let kiosk_cap = obj_arg(tx, kiosk_cap)?;
    let item_id = tx.pure(item_id)?;
    tx.move_call(
        &kiosk_fn("take"),
        vec![item_type.to_string()],
        vec![kiosk, kiosk_cap, item_id],
    )
}

/// Purchase a listed item. Returns `(item, transfer_request)`; the request
/// has to be resolved against the item type's transfer policy.
pub fn purchase(
    tx: &mut TransactionBlock,
    item_type: &str,
    kiosk: impl Into<ObjectArgument>,
    item_id: &ObjectId,
    payment: impl Into<ObjectArgument>,
) -> Result<(TransactionArgument, TransactionArgument)> {
    let kiosk = obj_arg(tx, kiosk)?;
    let item_id = tx.pure(item_id)?;
    let payment = obj_arg(tx, payment)?;
    let result = tx.move_call(
        &kiosk_fn("purchase"),
        vec![item_type.to_string()],
        vec![kiosk, item_id, payment],
    )?;
    Ok((nested(result, 0)?, nested(result, 1)?))
}

/// Withdraw profits. `None` withdraws everything. Returns the coin.
pub fn withdraw_from_kiosk(
    tx: &mut TransactionBlock,
    kiosk: impl Into<ObjectArgument>,
    kiosk_cap: impl Into<ObjectArgument>,
    amount: Option<u64>,
) -> Result<TransactionArgument> {
    let kiosk = obj_arg(tx, kiosk)?;
    let kiosk_cap = obj_arg(tx, kiosk_cap)?;
    let amount = tx.pure(&amount)?;
    tx.move_call(&kiosk_fn("withdraw"), vec![], vec![kiosk, kiosk_cap, amount])
}
