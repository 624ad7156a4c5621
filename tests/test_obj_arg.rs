use kiosk_rs::{
    obj_arg,
    transaction::{kiosk, CallArg, Command, MoveCall, ObjectArg},
    types::{Digest, ObjectRef, SharedObjectRef},
    KioskError, ObjectArgument, ObjectId, Result, TransactionArgument, TransactionBlock,
};
use serde_json::json;

const HERO: &str = "0x9::hero::Hero";

#[test]
fn test_string_id_becomes_by_id_input() -> Result<()> {
    let mut tx = TransactionBlock::new();
    let arg = obj_arg(&mut tx, "0xDEAD")?;

    assert_eq!(arg, TransactionArgument::Input(0));
    assert_eq!(tx.inputs(), &[CallArg::Object(ObjectArg::ById(ObjectId::new("0xDEAD")))]);
    Ok(())
}

#[test]
fn test_object_ref_becomes_owned_input() -> Result<()> {
    let object_ref = ObjectRef {
        object_id: ObjectId::new("0x1"),
        version: 7,
        digest: Digest("abc".to_string()),
    };
    let mut tx = TransactionBlock::new();
    let arg = obj_arg(&mut tx, object_ref.clone())?;

    assert_eq!(arg, TransactionArgument::Input(0));
    assert_eq!(tx.inputs(), &[CallArg::Object(ObjectArg::ImmOrOwned(object_ref))]);
    Ok(())
}

#[test]
fn test_shared_ref_becomes_shared_input() -> Result<()> {
    let shared = SharedObjectRef {
        object_id: ObjectId::new("0x2"),
        initial_shared_version: 3,
        mutable: true,
    };
    let mut tx = TransactionBlock::new();
    obj_arg(&mut tx, shared.clone())?;

    assert_eq!(tx.inputs(), &[CallArg::Object(ObjectArg::Shared(shared))]);
    Ok(())
}

#[test]
fn test_prebuilt_argument_passes_through() -> Result<()> {
    let mut tx = TransactionBlock::new();
    let arg = obj_arg(&mut tx, TransactionArgument::NestedResult(0, 1))?;

    assert_eq!(arg, TransactionArgument::NestedResult(0, 1));
    assert!(tx.inputs().is_empty());
    Ok(())
}

#[test]
fn test_repeated_object_reuses_input() -> Result<()> {
    let mut tx = TransactionBlock::new();
    let first = obj_arg(&mut tx, "0x5")?;
    let pure = tx.pure(&10u64)?;
    let second = obj_arg(&mut tx, "0x5")?;

    assert_eq!(first, second);
    assert_eq!(pure, TransactionArgument::Input(1));
    assert_eq!(tx.inputs().len(), 2);
    Ok(())
}

#[test]
fn test_input_count_is_bounded_by_index_width() -> Result<()> {
    let mut tx = TransactionBlock::new();
    for value in 0..=u16::MAX {
        tx.pure(&value)?;
    }
    assert_eq!(tx.inputs().len(), u16::MAX as usize + 1);

    // one more input would need index 65536
    assert!(matches!(tx.pure(&0u8), Err(KioskError::InvalidArgument(_))));
    assert!(matches!(obj_arg(&mut tx, "0x1"), Err(KioskError::InvalidArgument(_))));
    assert_eq!(tx.inputs().len(), u16::MAX as usize + 1);
    Ok(())
}

#[test]
fn test_json_shapes_are_dispatched() -> Result<()> {
    assert_eq!(
        ObjectArgument::try_from(&json!("0xDEAD"))?,
        ObjectArgument::ById(ObjectId::new("0xDEAD"))
    );
    assert_eq!(
        ObjectArgument::try_from(&json!({ "objectId": "0x1", "version": "12", "digest": "d" }))?,
        ObjectArgument::ByRef(ObjectRef {
            object_id: ObjectId::new("0x1"),
            version: 12,
            digest: Digest("d".to_string()),
        })
    );
    assert_eq!(
        ObjectArgument::try_from(&json!({ "objectId": "0x6", "initialSharedVersion": 1, "mutable": false }))?,
        ObjectArgument::BySharedRef(SharedObjectRef {
            object_id: ObjectId::new("0x6"),
            initial_shared_version: 1,
            mutable: false,
        })
    );
    assert_eq!(
        ObjectArgument::try_from(&json!({ "kind": "Input", "index": 4 }))?,
        ObjectArgument::Prebuilt(TransactionArgument::Input(4))
    );
    assert_eq!(
        ObjectArgument::try_from(&json!({ "kind": "NestedResult", "index": 0, "resultIndex": 1 }))?,
        ObjectArgument::Prebuilt(TransactionArgument::NestedResult(0, 1))
    );
    Ok(())
}

#[test]
fn test_object_ref_shape_wins_over_shared_shape() -> Result<()> {
    // carries both shapes; the owned reference is checked first
    let value = json!({
        "objectId": "0x1",
        "version": 2,
        "digest": "d",
        "initialSharedVersion": 1,
        "mutable": true,
    });
    assert!(matches!(ObjectArgument::try_from(&value)?, ObjectArgument::ByRef(_)));
    Ok(())
}

#[test]
fn test_unknown_shapes_are_invalid_arguments() {
    for value in [
        json!({ "foo": 1 }),
        json!(42),
        json!(null),
        json!({ "objectId": "0x1", "version": 2 }),
        json!({ "kind": "Unknown" }),
    ] {
        assert!(
            matches!(ObjectArgument::try_from(&value), Err(KioskError::InvalidArgument(_))),
            "{} should be rejected",
            value
        );
    }
}

#[test]
fn test_create_kiosk_and_share_commands() -> Result<()> {
    let mut tx = TransactionBlock::new();
    let cap = kiosk::create_kiosk_and_share(&mut tx)?;

    assert_eq!(cap, TransactionArgument::NestedResult(0, 1));
    let targets: Vec<String> = tx
        .commands()
        .iter()
        .map(|command| match command {
            Command::MoveCall(call) => call.target(),
            other => format!("{:?}", other),
        })
        .collect();
    assert_eq!(targets, vec!["0x2::kiosk::new", "0x2::transfer::public_share_object"]);

    match &tx.commands()[1] {
        Command::MoveCall(call) => {
            assert_eq!(call.type_arguments, vec!["0x2::kiosk::Kiosk".to_string()]);
            assert_eq!(call.arguments, vec![TransactionArgument::NestedResult(0, 0)]);
        },
        other => panic!("unexpected command {:?}", other),
    }
    Ok(())
}

#[test]
fn test_list_takes_mixed_object_arguments() -> Result<()> {
    let mut tx = TransactionBlock::new();
    let kiosk_ref = SharedObjectRef {
        object_id: ObjectId::new("0xK"),
        initial_shared_version: 1,
        mutable: true,
    };
    kiosk::list(&mut tx, HERO, kiosk_ref, "0xCAP", &ObjectId::new("0xI"), 500)?;

    assert_eq!(tx.inputs().len(), 4);
    match &tx.commands()[0] {
        Command::MoveCall(call) => {
            assert_eq!(call.target(), "0x2::kiosk::list");
            assert_eq!(call.arguments.len(), 4);
        },
        other => panic!("unexpected command {:?}", other),
    }
    Ok(())
}

#[test]
fn test_malformed_move_target_is_rejected() {
    let mut tx = TransactionBlock::new();
    assert!(matches!(
        tx.move_call("0x2::kiosk", vec![], vec![]),
        Err(KioskError::InvalidArgument(_))
    ));
}

#[test]
fn test_build_requires_sender() {
    let tx = TransactionBlock::new();
    assert!(matches!(tx.build(), Err(KioskError::Signing(_))));
}

fn only_move_call(tx: &TransactionBlock) -> &MoveCall {
    match tx.commands() {
        [Command::MoveCall(call)] => call,
        other => panic!("expected a single move call, got {:?}", other),
    }
}

#[test]
fn test_place_and_list_layout() -> Result<()> {
    let mut tx = TransactionBlock::new();
    kiosk::place_and_list(&mut tx, HERO, "0xK", "0xCAP", "0xI", 250)?;

    let call = only_move_call(&tx);
    assert_eq!(call.target(), "0x2::kiosk::place_and_list");
    assert_eq!(call.type_arguments, vec![HERO.to_string()]);
    assert_eq!(
        call.arguments,
        (0..4).map(TransactionArgument::Input).collect::<Vec<_>>()
    );
    assert_eq!(tx.inputs()[3], CallArg::Pure(bincode::serialize(&250u64).unwrap()));
    Ok(())
}

#[test]
fn test_take_returns_the_item() -> Result<()> {
    let mut tx = TransactionBlock::new();
    let item_id = ObjectId::new("0xI");
    let item = kiosk::take(&mut tx, HERO, "0xK", "0xCAP", &item_id)?;

    assert_eq!(item, TransactionArgument::Result(0));
    let call = only_move_call(&tx);
    assert_eq!(call.target(), "0x2::kiosk::take");
    assert_eq!(call.type_arguments, vec![HERO.to_string()]);
    assert_eq!(
        call.arguments,
        vec![
            TransactionArgument::Input(0),
            TransactionArgument::Input(1),
            TransactionArgument::Input(2),
        ]
    );
    // the item is passed by id, not as an object input
    assert_eq!(tx.inputs()[2], CallArg::Pure(bincode::serialize(&item_id).unwrap()));
    Ok(())
}

#[test]
fn test_purchase_returns_item_and_transfer_request() -> Result<()> {
    let mut tx = TransactionBlock::new();
    let kiosk_ref = SharedObjectRef {
        object_id: ObjectId::new("0xK"),
        initial_shared_version: 4,
        mutable: true,
    };
    let (item, request) = kiosk::purchase(
        &mut tx,
        HERO,
        kiosk_ref.clone(),
        &ObjectId::new("0xI"),
        TransactionArgument::NestedResult(7, 0),
    )?;

    assert_eq!(item, TransactionArgument::NestedResult(0, 0));
    assert_eq!(request, TransactionArgument::NestedResult(0, 1));
    let call = only_move_call(&tx);
    assert_eq!(call.target(), "0x2::kiosk::purchase");
    assert_eq!(call.type_arguments, vec![HERO.to_string()]);
    // kiosk, item id, then the prebuilt payment argument untouched
    assert_eq!(
        call.arguments,
        vec![
            TransactionArgument::Input(0),
            TransactionArgument::Input(1),
            TransactionArgument::NestedResult(7, 0),
        ]
    );
    assert_eq!(tx.inputs()[0], CallArg::Object(ObjectArg::Shared(kiosk_ref)));
    assert_eq!(tx.inputs().len(), 2);
    Ok(())
}

#[test]
fn test_withdraw_encodes_optional_amount() -> Result<()> {
    let mut tx = TransactionBlock::new();
    let coin = kiosk::withdraw_from_kiosk(&mut tx, "0xK", "0xCAP", None)?;
    let partial = kiosk::withdraw_from_kiosk(&mut tx, "0xK", "0xCAP", Some(5))?;

    assert_eq!(coin, TransactionArgument::Result(0));
    assert_eq!(partial, TransactionArgument::Result(1));
    match &tx.commands()[1] {
        Command::MoveCall(call) => {
            assert_eq!(call.target(), "0x2::kiosk::withdraw");
            assert!(call.type_arguments.is_empty());
            // kiosk and cap inputs are shared with the first call
            assert_eq!(
                call.arguments,
                vec![
                    TransactionArgument::Input(0),
                    TransactionArgument::Input(1),
                    TransactionArgument::Input(3),
                ]
            );
        },
        other => panic!("unexpected command {:?}", other),
    }
    assert_eq!(tx.inputs()[2], CallArg::Pure(bincode::serialize(&None::<u64>).unwrap()));
    assert_eq!(tx.inputs()[3], CallArg::Pure(bincode::serialize(&Some(5u64)).unwrap()));
    Ok(())
}
