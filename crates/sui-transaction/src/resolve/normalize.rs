//! Move signature lookup and typing of caller-supplied values.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use serde_json::Value;
use sui_transport::MoveType;
use sui_types::framework::SUI_FRAMEWORK;
use sui_types::ObjectID;
use tracing::trace;

use crate::arguments::{Argument, InputKind};
use crate::builder::TransactionDataBuilder;
use crate::commands::{Command, MoveCall};
use crate::error::{Result, TransactionError};
use crate::inputs::{CallArg, UnresolvedObject};
use crate::plugin::BuildOptions;
use crate::pure::{encode_pure_value, is_pure_type};

fn is_unresolved(inputs: &[CallArg], arg: &Argument) -> bool {
    arg.input_index()
        .and_then(|i| inputs.get(i as usize))
        .is_some_and(|input| !input.is_resolved())
}

fn is_tx_context(ty: &MoveType) -> bool {
    ty.is_struct(&SUI_FRAMEWORK, "tx_context", "TxContext")
}

/// Resolve everything that depends on how an input is used.
pub async fn normalize_inputs(
    data: &mut TransactionDataBuilder,
    options: &BuildOptions,
) -> Result<()> {
    type_builtin_pure_arguments(data)?;
    fetch_move_signatures(data, options).await?;
    type_move_call_arguments(data)
}

/// Amounts of `SplitCoins` and recipients of `TransferObjects` have a fixed type.
fn type_builtin_pure_arguments(data: &mut TransactionDataBuilder) -> Result<()> {
    let TransactionDataBuilder {
        inputs, commands, ..
    } = data;
    for command in commands.iter_mut() {
        let (args, ty): (Vec<&mut Argument>, MoveType) = match command {
            Command::SplitCoins { amounts, .. } => (amounts.iter_mut().collect(), MoveType::U64),
            Command::TransferObjects { address, .. } => (vec![address], MoveType::Address),
            _ => continue,
        };
        for arg in args {
            let Some(index) = arg.input_index() else {
                continue;
            };
            if let Some(input) = inputs.get_mut(index as usize) {
                if let CallArg::UnresolvedPure(value) = input {
                    *input = CallArg::Pure(encode_pure_value(&ty, value)?);
                }
                if matches!(input, CallArg::Pure(_)) {
                    *arg = Argument::input(index, InputKind::Pure);
                }
            }
        }
    }
    Ok(())
}

async fn fetch_move_signatures(
    data: &mut TransactionDataBuilder,
    options: &BuildOptions,
) -> Result<()> {
    // one fetch per function, shared by every call to it
    let mut pending: BTreeMap<(ObjectID, String, String), Vec<usize>> = BTreeMap::new();
    for (index, command) in data.commands.iter().enumerate() {
        let Command::MoveCall(call) = command else {
            continue;
        };
        if call.argument_types.is_some()
            || !call.arguments.iter().any(|a| is_unresolved(&data.inputs, a))
        {
            continue;
        }
        let package = call
            .package_id()
            .ok_or_else(|| TransactionError::UnresolvedName(call.package.clone()))?;
        pending
            .entry((package, call.module.clone(), call.function.clone()))
            .or_default()
            .push(index);
    }
    if pending.is_empty() {
        return Ok(());
    }

    let client = options.client()?;
    trace!(count = pending.len(), "fetching move function signatures");
    let functions = try_join_all(pending.keys().map(|(package, module, function)| {
        client.get_normalized_move_function(package, module, function)
    }))
    .await?;

    for (indices, function) in pending.into_values().zip(functions) {
        let mut parameters = function.parameters;
        if parameters.last().is_some_and(is_tx_context) {
            parameters.pop();
        }
        for index in indices {
            if let Some(Command::MoveCall(call)) = data.commands.get_mut(index) {
                call.argument_types = Some(parameters.clone());
            }
        }
    }
    Ok(())
}

fn type_move_call_arguments(data: &mut TransactionDataBuilder) -> Result<()> {
    let TransactionDataBuilder {
        inputs, commands, ..
    } = data;
    for command in commands.iter_mut() {
        let Command::MoveCall(call) = command else {
            continue;
        };
        let Some(parameters) = &call.argument_types else {
            continue;
        };
        if parameters.len() != call.arguments.len() {
            return Err(TransactionError::ArgumentCount {
                function: call.target(),
                expected: parameters.len(),
                actual: call.arguments.len(),
            });
        }
        type_call_arguments(call, inputs)?;
    }
    Ok(())
}

fn type_call_arguments(call: &mut MoveCall, inputs: &mut [CallArg]) -> Result<()> {
    let MoveCall {
        arguments,
        argument_types,
        ..
    } = call;
    let Some(parameters) = argument_types.as_ref() else {
        return Ok(());
    };
    for (arg, param) in arguments.iter_mut().zip(parameters) {
        let Some(index) = arg.input_index() else {
            continue;
        };
        let Some(input) = inputs.get_mut(index as usize) else {
            continue;
        };
        let pure = is_pure_type(param);
        match input {
            CallArg::UnresolvedPure(value) if pure => {
                *input = CallArg::Pure(encode_pure_value(param, value)?);
            }
            CallArg::UnresolvedPure(value) => {
                *input = CallArg::UnresolvedObject(UnresolvedObject::new(object_id(value)?));
            }
            CallArg::UnresolvedObject(object) if pure => {
                let id = Value::String(object.object_id.to_hex_literal());
                *input = CallArg::Pure(encode_pure_value(param, &id)?);
            }
            _ => {}
        }
        let kind = match input {
            CallArg::Pure(_) | CallArg::UnresolvedPure(_) => InputKind::Pure,
            CallArg::Object(_) | CallArg::UnresolvedObject(_) => InputKind::Object,
        };
        *arg = Argument::input(index, kind);
    }
    Ok(())
}

fn object_id(value: &Value) -> Result<ObjectID> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            TransactionError::InvalidArgument(format!(
                "Expected an object id for an object parameter, got {}",
                value
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use sui_transport::test_utils::MockLedger;
    use sui_transport::{MoveFunction, SuiClient};
    use sui_types::SuiAddress;

    fn coin_param() -> MoveType {
        MoveType::MutableReference(Box::new(MoveType::struct_type(SUI_FRAMEWORK, "coin", "Coin")))
    }

    fn tx_context() -> MoveType {
        MoveType::MutableReference(Box::new(MoveType::struct_type(
            SUI_FRAMEWORK,
            "tx_context",
            "TxContext",
        )))
    }

    #[tokio::test]
    async fn test_signature_types_unresolved_values() {
        let ledger = Arc::new(MockLedger::new());
        let package = SuiAddress::from_u16(0xabc);
        ledger.add_move_function(
            package,
            "demo",
            "run",
            MoveFunction::public(vec![MoveType::U64, coin_param(), tx_context()]),
        );

        let mut data = TransactionDataBuilder::new();
        let amount = data
            .add_input(InputKind::Pure, CallArg::UnresolvedPure(json!(42)))
            .unwrap();
        let coin = data.add_input(
            InputKind::Object,
            CallArg::UnresolvedPure(json!("0x1234")),
        )
        .unwrap();
        data.add_command(Command::move_call(
            package.to_hex_literal(),
            "demo",
            "run",
            vec![],
            vec![amount, coin],
        ))
        .unwrap();

        let client: Arc<dyn SuiClient> = ledger.clone();
        normalize_inputs(&mut data, &BuildOptions::with_client(client))
            .await
            .unwrap();

        assert_eq!(data.inputs[0], CallArg::Pure(42u64.to_le_bytes().to_vec()));
        assert_eq!(
            data.inputs[1],
            CallArg::UnresolvedObject(UnresolvedObject::new("0x1234".parse().unwrap()))
        );
        let Command::MoveCall(call) = &data.commands[0] else {
            panic!("expected a move call");
        };
        assert_eq!(call.argument_types.as_ref().map(Vec::len), Some(2));
        assert_eq!(ledger.function_fetches(), 1);
    }

    #[tokio::test]
    async fn test_repeated_calls_share_one_signature_fetch() {
        let ledger = Arc::new(MockLedger::new());
        let package = SuiAddress::from_u16(0xabc);
        ledger.add_move_function(package, "demo", "bump", MoveFunction::public(vec![MoveType::U64]));

        let mut data = TransactionDataBuilder::new();
        for value in [1, 2] {
            let amount = data
                .add_input(InputKind::Pure, CallArg::UnresolvedPure(json!(value)))
                .unwrap();
            data.add_command(Command::move_call(
                package.to_hex_literal(),
                "demo",
                "bump",
                vec![],
                vec![amount],
            ))
            .unwrap();
        }

        normalize_inputs(&mut data, &BuildOptions::with_client(ledger.clone()))
            .await
            .unwrap();

        assert_eq!(ledger.function_fetches(), 1);
        assert_eq!(data.inputs[1], CallArg::Pure(2u64.to_le_bytes().to_vec()));
        for command in &data.commands {
            let Command::MoveCall(call) = command else {
                panic!("expected a move call");
            };
            assert_eq!(call.argument_types, Some(vec![MoveType::U64]));
        }
    }

    #[tokio::test]
    async fn test_argument_count_mismatch() {
        let ledger = Arc::new(MockLedger::new());
        let package = SuiAddress::from_u16(0xabc);
        ledger.add_move_function(package, "demo", "two", MoveFunction::public(vec![MoveType::U8, MoveType::U8]));

        let mut data = TransactionDataBuilder::new();
        let only = data
            .add_input(InputKind::Pure, CallArg::UnresolvedPure(json!(1)))
            .unwrap();
        data.add_command(Command::move_call(package.to_hex_literal(), "demo", "two", vec![], vec![only]))
            .unwrap();

        let err = normalize_inputs(&mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Incorrect number of arguments for"));
    }

    #[tokio::test]
    async fn test_builtin_commands_need_no_client() {
        let mut data = TransactionDataBuilder::new();
        let amount = data
            .add_input(InputKind::Pure, CallArg::UnresolvedPure(json!("1000")))
            .unwrap();
        let recipient = data
            .add_input(InputKind::Pure, CallArg::UnresolvedPure(json!("0x5")))
            .unwrap();
        data.add_command(Command::split_coins(Argument::GasCoin, vec![amount]))
            .unwrap();
        data.add_command(Command::transfer_objects(vec![Argument::Result(0)], recipient))
            .unwrap();

        normalize_inputs(&mut data, &BuildOptions::default())
            .await
            .unwrap();
        assert_eq!(data.inputs[0], CallArg::Pure(1000u64.to_le_bytes().to_vec()));
        assert_eq!(data.inputs[1], CallArg::Pure(SuiAddress::from_u16(5).to_vec()));
    }
}
