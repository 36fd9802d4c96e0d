//! Object input resolution.

use std::collections::{HashMap, HashSet};

use futures::future::try_join_all;
use sui_transport::{MoveType, ObjectData};
use sui_types::framework::{RECEIVING_MODULE, RECEIVING_STRUCT, SUI_FRAMEWORK};
use sui_types::{ObjectID, ObjectRef};
use tracing::trace;

use super::MAX_OBJECTS_PER_FETCH;
use crate::builder::TransactionDataBuilder;
use crate::commands::Command;
use crate::error::{Result, TransactionError};
use crate::inputs::{CallArg, UnresolvedObject};
use crate::plugin::BuildOptions;

/// Replace every `UnresolvedObject` input with a shared, owned or receiving
/// object reference.
///
/// Objects missing both a version and an initial shared version are fetched
/// in batches of [`MAX_OBJECTS_PER_FETCH`]. Lookup failures are reported
/// together in one [`TransactionError::InvalidObjects`].
pub async fn resolve_object_references(
    data: &mut TransactionDataBuilder,
    options: &BuildOptions,
) -> Result<()> {
    let mut seen = HashSet::new();
    let ids: Vec<ObjectID> = data
        .inputs
        .iter()
        .filter_map(|input| match input {
            CallArg::UnresolvedObject(object) if object.needs_fetch() => Some(object.object_id),
            _ => None,
        })
        .filter(|id| seen.insert(*id))
        .collect();

    let fetched = fetch_objects(&ids, options).await?;

    let mut invalid = Vec::new();
    for index in 0..data.inputs.len() {
        let CallArg::UnresolvedObject(object) = &data.inputs[index] else {
            continue;
        };
        let object = object.clone();
        match resolve_one(data, index as u16, &object, fetched.get(&object.object_id)) {
            Some(resolved) => data.inputs[index] = resolved,
            None => invalid.push((object.object_id, "missing version or digest".to_string())),
        }
    }
    if !invalid.is_empty() {
        return Err(TransactionError::invalid_object_ids(&invalid));
    }
    Ok(())
}

async fn fetch_objects(
    ids: &[ObjectID],
    options: &BuildOptions,
) -> Result<HashMap<ObjectID, ObjectData>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let client = options.client()?;
    trace!(count = ids.len(), "fetching input objects");
    let pages = try_join_all(
        ids.chunks(MAX_OBJECTS_PER_FETCH)
            .map(|chunk| client.multi_get_objects(chunk)),
    )
    .await?;

    let mut objects = HashMap::new();
    let mut invalid = Vec::new();
    for response in pages.into_iter().flatten() {
        match response {
            Ok(object) => {
                objects.insert(object.object_id, object);
            }
            Err(e) => invalid.push((e.object_id(), e.to_string())),
        }
    }
    if !invalid.is_empty() {
        return Err(TransactionError::invalid_object_ids(&invalid));
    }
    Ok(objects)
}

fn resolve_one(
    data: &TransactionDataBuilder,
    index: u16,
    object: &UnresolvedObject,
    fetched: Option<&ObjectData>,
) -> Option<CallArg> {
    let initial_shared_version = object
        .initial_shared_version
        .or_else(|| fetched.and_then(|o| o.owner.initial_shared_version()));
    if let Some(initial_shared_version) = initial_shared_version {
        let mutable = object.mutable.unwrap_or(false) || is_used_as_mutable(data, index);
        return Some(CallArg::shared_object(
            object.object_id,
            initial_shared_version,
            mutable,
        ));
    }

    let version = object.version.or(fetched.map(|o| o.version))?;
    let digest = object.digest.or(fetched.map(|o| o.digest))?;
    let object_ref = ObjectRef::new(object.object_id, version, digest);
    Some(if is_used_as_receiving(data, index) {
        CallArg::receiving(object_ref)
    } else {
        CallArg::object_ref(object_ref)
    })
}

/// Parameter type the argument at `arg` is passed as, when known.
fn parameter_type<'a>(
    command: &'a Command,
    arg: &crate::arguments::Argument,
) -> Option<&'a MoveType> {
    let Command::MoveCall(call) = command else {
        return None;
    };
    let position = call
        .arguments
        .iter()
        .position(|candidate| std::ptr::eq(candidate, arg))?;
    call.argument_types.as_ref()?.get(position)
}

/// True when any use of input `index` may mutate it.
///
/// Built-in coin and transfer commands take their objects by value; a Move
/// call does unless the parameter is an immutable reference.
pub fn is_used_as_mutable(data: &TransactionDataBuilder, index: u16) -> bool {
    let mut mutable = false;
    data.get_input_uses(index, |arg, command| {
        mutable |= match command {
            Command::MoveCall(_) => parameter_type(command, arg)
                .is_some_and(|ty| !matches!(ty, MoveType::Reference(_))),
            Command::TransferObjects { .. }
            | Command::SplitCoins { .. }
            | Command::MergeCoins { .. }
            | Command::MakeMoveVec { .. } => true,
            _ => false,
        };
    });
    mutable
}

/// True when input `index` is used, and only used, as a `Receiving<T>` parameter.
pub fn is_used_as_receiving(data: &TransactionDataBuilder, index: u16) -> bool {
    let mut uses = 0;
    let mut receiving = 0;
    data.get_input_uses(index, |arg, command| {
        uses += 1;
        if parameter_type(command, arg)
            .is_some_and(|ty| ty.is_struct(&SUI_FRAMEWORK, RECEIVING_MODULE, RECEIVING_STRUCT))
        {
            receiving += 1;
        }
    });
    uses > 0 && uses == receiving
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sui_transport::test_utils::MockLedger;
    use sui_types::{ObjectArg, SuiAddress};

    use crate::arguments::{Argument, InputKind};

    fn sender() -> SuiAddress {
        SuiAddress::new([7; 32])
    }

    fn unresolved(data: &mut TransactionDataBuilder, id: ObjectID) -> Argument {
        data.add_input(
            InputKind::Object,
            CallArg::UnresolvedObject(UnresolvedObject::new(id)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_owned_and_shared_objects_resolve() {
        let ledger = Arc::new(MockLedger::new());
        let owned = ledger.add_coin(sender(), 10);
        let shared = ledger.add_shared_object("0xabc::pool::Pool");

        let mut data = TransactionDataBuilder::new();
        let coin = unresolved(&mut data, owned.object_id);
        let pool = unresolved(&mut data, shared);
        data.add_command(Command::split_coins(coin, vec![]))
            .unwrap();
        data.add_command(Command::merge_coins(pool, vec![]))
            .unwrap();

        resolve_object_references(&mut data, &BuildOptions::with_client(ledger.clone()))
            .await
            .unwrap();
        assert_eq!(data.inputs[0], CallArg::object_ref(owned));
        assert_eq!(data.inputs[1], CallArg::shared_object(shared, 1, true));
        assert_eq!(ledger.object_fetches(), 1);
    }

    #[tokio::test]
    async fn test_shared_coin_split_by_value_is_mutable() {
        let ledger = Arc::new(MockLedger::new());
        let shared = ledger.add_shared_object("0x2::coin::Coin<0x2::sui::SUI>");

        let mut data = TransactionDataBuilder::new();
        let coin = unresolved(&mut data, shared);
        let amount = data
            .add_input(InputKind::Pure, CallArg::Pure(10u64.to_le_bytes().to_vec()))
            .unwrap();
        data.add_command(Command::split_coins(coin, vec![amount]))
            .unwrap();

        resolve_object_references(&mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap();
        assert_eq!(data.inputs[0], CallArg::shared_object(shared, 1, true));
        assert!(matches!(
            data.inputs[0],
            CallArg::Object(ObjectArg::SharedObject { mutable: true, .. })
        ));
    }

    #[tokio::test]
    async fn test_immutable_reference_keeps_shared_object_read_only() {
        let ledger = Arc::new(MockLedger::new());
        let shared = ledger.add_shared_object("0xabc::config::Config");

        let mut data = TransactionDataBuilder::new();
        let config = unresolved(&mut data, shared);
        data.add_command(Command::MoveCall(crate::commands::MoveCall {
            package: "0xabc".to_string(),
            module: "config".to_string(),
            function: "read".to_string(),
            type_arguments: vec![],
            arguments: vec![config],
            argument_types: Some(vec![MoveType::Reference(Box::new(MoveType::struct_type(
                SuiAddress::from_u16(0xabc),
                "config",
                "Config",
            )))]),
        }))
        .unwrap();

        resolve_object_references(&mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap();
        assert!(matches!(
            data.inputs[0],
            CallArg::Object(ObjectArg::SharedObject { mutable: false, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_objects_are_reported_together() {
        let ledger = Arc::new(MockLedger::new());
        let first = SuiAddress::from_u16(0x111);
        let second = SuiAddress::from_u16(0x222);

        let mut data = TransactionDataBuilder::new();
        unresolved(&mut data, first);
        unresolved(&mut data, second);

        let err = resolve_object_references(&mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap_err();
        let TransactionError::InvalidObjects(objects) = &err else {
            panic!("unexpected error: {}", err);
        };
        assert_eq!(objects.len(), 2);
        assert!(err.to_string().starts_with("The following input objects are invalid:"));
    }

    #[tokio::test]
    async fn test_known_shared_version_skips_the_fetch() {
        let mut data = TransactionDataBuilder::new();
        let mut clock = UnresolvedObject::new(SuiAddress::from_u16(6));
        clock.initial_shared_version = Some(1);
        clock.mutable = Some(false);
        data.add_input(InputKind::Object, CallArg::UnresolvedObject(clock))
            .unwrap();

        resolve_object_references(&mut data, &BuildOptions::default())
            .await
            .unwrap();
        assert_eq!(
            data.inputs[0],
            CallArg::shared_object(SuiAddress::from_u16(6), 1, false)
        );
    }
}
