//! Commands as seen by the builder.
//!
//! Unlike the wire form, a builder command may still name a package by its
//! registered name, carry type arguments as strings, remember the parameter
//! types of the function it calls, or be an unexpanded `$Intent`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sui_transport::MoveType;
use sui_types::{
    parse_type_tag, Command as WireCommand, ObjectID, ProgrammableMoveCall, TypeTag,
};

use crate::arguments::Argument;
use crate::error::{Result, TransactionError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCall {
    /// Package id in hex, or a registered name such as `@org/app`.
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Argument>,
    /// Parameter types of the callee with any trailing `TxContext` removed.
    #[serde(
        rename = "_argumentTypes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub argument_types: Option<Vec<MoveType>>,
}

impl MoveCall {
    /// `package::module::function`.
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }

    /// The package id, if the package is not a name awaiting resolution.
    pub fn package_id(&self) -> Option<ObjectID> {
        self.package.parse().ok()
    }
}

/// Intent inputs are either one argument or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntentInput {
    One(Argument),
    Many(Vec<Argument>),
}

/// A placeholder command expanded by an intent resolver before build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub inputs: BTreeMap<String, IntentInput>,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(MoveCall),
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
    Publish {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectID>,
    },
    MakeMoveVec {
        #[serde(rename = "type")]
        element_type: Option<String>,
        elements: Vec<Argument>,
    },
    Upgrade {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectID>,
        package: ObjectID,
        ticket: Argument,
    },
    #[serde(rename = "$Intent")]
    Intent(Intent),
}

impl Command {
    pub fn move_call(
        package: impl Into<String>,
        module: impl Into<String>,
        function: impl Into<String>,
        type_arguments: Vec<String>,
        arguments: Vec<Argument>,
    ) -> Self {
        Command::MoveCall(MoveCall {
            package: package.into(),
            module: module.into(),
            function: function.into(),
            type_arguments,
            arguments,
            argument_types: None,
        })
    }

    pub fn transfer_objects(objects: Vec<Argument>, address: Argument) -> Self {
        Command::TransferObjects { objects, address }
    }

    pub fn split_coins(coin: Argument, amounts: Vec<Argument>) -> Self {
        Command::SplitCoins { coin, amounts }
    }

    pub fn merge_coins(destination: Argument, sources: Vec<Argument>) -> Self {
        Command::MergeCoins {
            destination,
            sources,
        }
    }

    pub fn intent(
        name: impl Into<String>,
        inputs: BTreeMap<String, IntentInput>,
        data: serde_json::Value,
    ) -> Self {
        Command::Intent(Intent {
            name: name.into(),
            inputs,
            data,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::MoveCall(_) => "MoveCall",
            Command::TransferObjects { .. } => "TransferObjects",
            Command::SplitCoins { .. } => "SplitCoins",
            Command::MergeCoins { .. } => "MergeCoins",
            Command::Publish { .. } => "Publish",
            Command::MakeMoveVec { .. } => "MakeMoveVec",
            Command::Upgrade { .. } => "Upgrade",
            Command::Intent(_) => "$Intent",
        }
    }

    /// Every argument in field order.
    pub fn arguments(&self) -> Vec<&Argument> {
        match self {
            Command::MoveCall(call) => call.arguments.iter().collect(),
            Command::TransferObjects { objects, address } => {
                objects.iter().chain(std::iter::once(address)).collect()
            }
            Command::SplitCoins { coin, amounts } => {
                std::iter::once(coin).chain(amounts.iter()).collect()
            }
            Command::MergeCoins {
                destination,
                sources,
            } => std::iter::once(destination).chain(sources.iter()).collect(),
            Command::Publish { .. } => vec![],
            Command::MakeMoveVec { elements, .. } => elements.iter().collect(),
            Command::Upgrade { ticket, .. } => vec![ticket],
            Command::Intent(intent) => intent
                .inputs
                .values()
                .flat_map(|input| match input {
                    IntentInput::One(arg) => std::slice::from_ref(arg).iter(),
                    IntentInput::Many(args) => args.iter(),
                })
                .collect(),
        }
    }

    pub fn arguments_mut(&mut self) -> Vec<&mut Argument> {
        match self {
            Command::MoveCall(call) => call.arguments.iter_mut().collect(),
            Command::TransferObjects { objects, address } => {
                objects.iter_mut().chain(std::iter::once(address)).collect()
            }
            Command::SplitCoins { coin, amounts } => {
                std::iter::once(coin).chain(amounts.iter_mut()).collect()
            }
            Command::MergeCoins {
                destination,
                sources,
            } => std::iter::once(destination)
                .chain(sources.iter_mut())
                .collect(),
            Command::Publish { .. } => vec![],
            Command::MakeMoveVec { elements, .. } => elements.iter_mut().collect(),
            Command::Upgrade { ticket, .. } => vec![ticket],
            Command::Intent(intent) => intent
                .inputs
                .values_mut()
                .flat_map(|input| match input {
                    IntentInput::One(arg) => std::slice::from_mut(arg).iter_mut(),
                    IntentInput::Many(args) => args.iter_mut(),
                })
                .collect(),
        }
    }

    pub fn to_wire(&self) -> Result<WireCommand> {
        Ok(match self {
            Command::MoveCall(call) => {
                let package = call
                    .package_id()
                    .ok_or_else(|| TransactionError::UnresolvedName(call.package.clone()))?;
                let type_arguments = call
                    .type_arguments
                    .iter()
                    .map(|t| parse_type(t))
                    .collect::<Result<Vec<_>>>()?;
                WireCommand::MoveCall(Box::new(ProgrammableMoveCall {
                    package,
                    module: call.module.clone(),
                    function: call.function.clone(),
                    type_arguments,
                    arguments: wire_args(&call.arguments),
                }))
            }
            Command::TransferObjects { objects, address } => {
                WireCommand::TransferObjects(wire_args(objects), address.to_wire())
            }
            Command::SplitCoins { coin, amounts } => {
                WireCommand::SplitCoins(coin.to_wire(), wire_args(amounts))
            }
            Command::MergeCoins {
                destination,
                sources,
            } => WireCommand::MergeCoins(destination.to_wire(), wire_args(sources)),
            Command::Publish {
                modules,
                dependencies,
            } => WireCommand::Publish(modules.clone(), dependencies.clone()),
            Command::MakeMoveVec {
                element_type,
                elements,
            } => WireCommand::MakeMoveVec(
                element_type.as_deref().map(parse_type).transpose()?,
                wire_args(elements),
            ),
            Command::Upgrade {
                modules,
                dependencies,
                package,
                ticket,
            } => WireCommand::Upgrade(
                modules.clone(),
                dependencies.clone(),
                *package,
                ticket.to_wire(),
            ),
            Command::Intent(intent) => {
                return Err(TransactionError::UnresolvedIntent(intent.name.clone()))
            }
        })
    }
}

fn wire_args(args: &[Argument]) -> Vec<sui_types::Argument> {
    args.iter().map(Argument::to_wire).collect()
}

fn parse_type(type_str: &str) -> Result<TypeTag> {
    parse_type_tag(type_str).map_err(|e| {
        if crate::resolve::named_packages::has_named_package(type_str) {
            TransactionError::UnresolvedName(type_str.to_string())
        } else {
            TransactionError::InvalidArgument(format!("Invalid type '{}': {}", type_str, e))
        }
    })
}

impl From<WireCommand> for Command {
    fn from(command: WireCommand) -> Self {
        let args = |args: Vec<sui_types::Argument>| {
            args.into_iter().map(Argument::from).collect::<Vec<_>>()
        };
        match command {
            WireCommand::MoveCall(call) => {
                let call = *call;
                Command::MoveCall(MoveCall {
                    package: call.package.to_hex_literal(),
                    module: call.module,
                    function: call.function,
                    type_arguments: call.type_arguments.iter().map(|t| t.to_string()).collect(),
                    arguments: args(call.arguments),
                    argument_types: None,
                })
            }
            WireCommand::TransferObjects(objects, address) => Command::TransferObjects {
                objects: args(objects),
                address: address.into(),
            },
            WireCommand::SplitCoins(coin, amounts) => Command::SplitCoins {
                coin: coin.into(),
                amounts: args(amounts),
            },
            WireCommand::MergeCoins(destination, sources) => Command::MergeCoins {
                destination: destination.into(),
                sources: args(sources),
            },
            WireCommand::Publish(modules, dependencies) => Command::Publish {
                modules,
                dependencies,
            },
            WireCommand::MakeMoveVec(element_type, elements) => Command::MakeMoveVec {
                element_type: element_type.map(|t| t.to_string()),
                elements: args(elements),
            },
            WireCommand::Upgrade(modules, dependencies, package, ticket) => Command::Upgrade {
                modules,
                dependencies,
                package,
                ticket: ticket.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_in_field_order() {
        let cmd = Command::transfer_objects(
            vec![Argument::Result(0), Argument::NestedResult(1, 2)],
            Argument::Input {
                index: 0,
                kind: None,
            },
        );
        let args: Vec<Argument> = cmd.arguments().into_iter().copied().collect();
        assert_eq!(
            args,
            vec![
                Argument::Result(0),
                Argument::NestedResult(1, 2),
                Argument::Input {
                    index: 0,
                    kind: None
                }
            ]
        );
    }

    #[test]
    fn test_named_package_blocks_wire_conversion() {
        let cmd = Command::move_call("@mysten/demo", "demo", "run", vec![], vec![]);
        assert!(matches!(
            cmd.to_wire(),
            Err(TransactionError::UnresolvedName(name)) if name == "@mysten/demo"
        ));
    }

    #[test]
    fn test_intent_blocks_wire_conversion() {
        let cmd = Command::intent("CoinWithBalance", BTreeMap::new(), serde_json::json!({}));
        assert!(matches!(cmd.to_wire(), Err(TransactionError::UnresolvedIntent(_))));
    }

    #[test]
    fn test_wire_round_trip_of_move_call() {
        let cmd = Command::move_call(
            "0x2",
            "coin",
            "value",
            vec!["0x2::sui::SUI".to_string()],
            vec![Argument::Input {
                index: 0,
                kind: None,
            }],
        );
        let wire = cmd.to_wire().unwrap();
        let back = Command::from(wire.clone());
        assert_eq!(back.to_wire().unwrap(), wire);
    }
}
