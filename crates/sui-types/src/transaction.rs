//! Wire-level transaction structures.
//!
//! These mirror the on-chain BCS layout exactly. Builders produce them once
//! every input is resolved; nothing in here is "unresolved".

use serde::{Deserialize, Serialize};
use sui_bcs::{BcsError, BcsValue, FromBcsValue, ToBcsValue};

use crate::address::{ObjectID, SuiAddress};
use crate::object::{ObjectRef, SequenceNumber};
use crate::type_tag::TypeTag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: SuiAddress,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

impl TransactionData {
    pub fn new_programmable(
        sender: SuiAddress,
        gas_data: GasData,
        expiration: TransactionExpiration,
        pt: ProgrammableTransaction,
    ) -> Self {
        TransactionData::V1(TransactionDataV1 {
            kind: TransactionKind::ProgrammableTransaction(pt),
            sender,
            gas_data,
            expiration,
        })
    }

    pub fn v1(&self) -> &TransactionDataV1 {
        match self {
            TransactionData::V1(v1) => v1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

/// Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: SuiAddress,
    pub price: u64,
    pub budget: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionExpiration {
    #[default]
    None,
    Epoch(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    #[serde(rename_all = "camelCase")]
    SharedObject {
        id: ObjectID,
        initial_shared_version: SequenceNumber,
        mutable: bool,
    },
    Receiving(ObjectRef),
}

impl ObjectArg {
    pub fn id(&self) -> ObjectID {
        match self {
            ObjectArg::ImmOrOwnedObject(r) | ObjectArg::Receiving(r) => r.object_id,
            ObjectArg::SharedObject { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammableMoveCall {
    pub package: ObjectID,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

/// Variant order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects(Vec<Argument>, Argument),
    SplitCoins(Argument, Vec<Argument>),
    MergeCoins(Argument, Vec<Argument>),
    Publish(Vec<Vec<u8>>, Vec<ObjectID>),
    MakeMoveVec(Option<TypeTag>, Vec<Argument>),
    Upgrade(Vec<Vec<u8>>, Vec<ObjectID>, ObjectID, Argument),
}

// ---------------------------------------------------------------------------
// Dynamic value conversions
// ---------------------------------------------------------------------------

fn unknown(type_name: &str, variant: &str) -> BcsError {
    BcsError::mapping(type_name, format!("unknown variant `{}`", variant))
}

impl ToBcsValue for TransactionData {
    fn to_bcs_value(&self) -> BcsValue {
        let TransactionData::V1(v1) = self;
        BcsValue::variant(
            "V1",
            BcsValue::structure([
                ("kind", v1.kind.to_bcs_value()),
                ("sender", v1.sender.to_bcs_value()),
                ("gasData", v1.gas_data.to_bcs_value()),
                ("expiration", v1.expiration.to_bcs_value()),
            ]),
        )
    }
}

impl FromBcsValue for TransactionData {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("V1", Some(v1)) => Ok(TransactionData::V1(TransactionDataV1 {
                kind: v1.get("kind")?,
                sender: v1.get("sender")?,
                gas_data: v1.get("gasData")?,
                expiration: v1.get("expiration")?,
            })),
            (other, _) => Err(unknown("TransactionData", other)),
        }
    }
}

impl ToBcsValue for TransactionKind {
    fn to_bcs_value(&self) -> BcsValue {
        let TransactionKind::ProgrammableTransaction(pt) = self;
        BcsValue::variant("ProgrammableTransaction", pt.to_bcs_value())
    }
}

impl FromBcsValue for TransactionKind {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("ProgrammableTransaction", Some(pt)) => {
                Ok(TransactionKind::ProgrammableTransaction(pt.decode()?))
            }
            (other, _) => Err(BcsError::mapping(
                "TransactionKind",
                format!("unsupported transaction kind `{}`", other),
            )),
        }
    }
}

impl ToBcsValue for ProgrammableTransaction {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::structure([
            ("inputs", self.inputs.to_bcs_value()),
            ("commands", self.commands.to_bcs_value()),
        ])
    }
}

impl FromBcsValue for ProgrammableTransaction {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        Ok(Self {
            inputs: value.get("inputs")?,
            commands: value.get("commands")?,
        })
    }
}

impl ToBcsValue for GasData {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::structure([
            ("payment", self.payment.to_bcs_value()),
            ("owner", self.owner.to_bcs_value()),
            ("price", BcsValue::U64(self.price)),
            ("budget", BcsValue::U64(self.budget)),
        ])
    }
}

impl FromBcsValue for GasData {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        Ok(Self {
            payment: value.get("payment")?,
            owner: value.get("owner")?,
            price: value.get("price")?,
            budget: value.get("budget")?,
        })
    }
}

impl ToBcsValue for TransactionExpiration {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            TransactionExpiration::None => BcsValue::unit_variant("None"),
            TransactionExpiration::Epoch(epoch) => {
                BcsValue::variant("Epoch", BcsValue::U64(*epoch))
            }
        }
    }
}

impl FromBcsValue for TransactionExpiration {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("None", _) => Ok(TransactionExpiration::None),
            ("Epoch", Some(epoch)) => Ok(TransactionExpiration::Epoch(epoch.decode()?)),
            (other, _) => Err(unknown("TransactionExpiration", other)),
        }
    }
}

impl ToBcsValue for CallArg {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            CallArg::Pure(bytes) => BcsValue::variant("Pure", bytes.to_bcs_value()),
            CallArg::Object(arg) => BcsValue::variant("Object", arg.to_bcs_value()),
        }
    }
}

impl FromBcsValue for CallArg {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("Pure", Some(bytes)) => Ok(CallArg::Pure(bytes.decode()?)),
            ("Object", Some(arg)) => Ok(CallArg::Object(arg.decode()?)),
            (other, _) => Err(unknown("CallArg", other)),
        }
    }
}

impl ToBcsValue for ObjectArg {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            ObjectArg::ImmOrOwnedObject(r) => {
                BcsValue::variant("ImmOrOwnedObject", r.to_bcs_value())
            }
            ObjectArg::SharedObject {
                id,
                initial_shared_version,
                mutable,
            } => BcsValue::variant(
                "SharedObject",
                BcsValue::structure([
                    ("objectId", id.to_bcs_value()),
                    ("initialSharedVersion", BcsValue::U64(*initial_shared_version)),
                    ("mutable", BcsValue::Bool(*mutable)),
                ]),
            ),
            ObjectArg::Receiving(r) => BcsValue::variant("Receiving", r.to_bcs_value()),
        }
    }
}

impl FromBcsValue for ObjectArg {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("ImmOrOwnedObject", Some(r)) => Ok(ObjectArg::ImmOrOwnedObject(r.decode()?)),
            ("SharedObject", Some(shared)) => Ok(ObjectArg::SharedObject {
                id: shared.get("objectId")?,
                initial_shared_version: shared.get("initialSharedVersion")?,
                mutable: shared.get("mutable")?,
            }),
            ("Receiving", Some(r)) => Ok(ObjectArg::Receiving(r.decode()?)),
            (other, _) => Err(unknown("ObjectArg", other)),
        }
    }
}

impl ToBcsValue for Argument {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            Argument::GasCoin => BcsValue::unit_variant("GasCoin"),
            Argument::Input(i) => BcsValue::variant("Input", BcsValue::U16(*i)),
            Argument::Result(i) => BcsValue::variant("Result", BcsValue::U16(*i)),
            Argument::NestedResult(i, j) => BcsValue::variant(
                "NestedResult",
                BcsValue::Tuple(vec![BcsValue::U16(*i), BcsValue::U16(*j)]),
            ),
        }
    }
}

impl FromBcsValue for Argument {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("GasCoin", _) => Ok(Argument::GasCoin),
            ("Input", Some(i)) => Ok(Argument::Input(i.decode()?)),
            ("Result", Some(i)) => Ok(Argument::Result(i.decode()?)),
            ("NestedResult", Some(pair)) => {
                let (i, j) = pair.decode()?;
                Ok(Argument::NestedResult(i, j))
            }
            (other, _) => Err(unknown("Argument", other)),
        }
    }
}

impl ToBcsValue for ProgrammableMoveCall {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::structure([
            ("package", self.package.to_bcs_value()),
            ("module", BcsValue::String(self.module.clone())),
            ("function", BcsValue::String(self.function.clone())),
            ("typeArguments", self.type_arguments.to_bcs_value()),
            ("arguments", self.arguments.to_bcs_value()),
        ])
    }
}

impl FromBcsValue for ProgrammableMoveCall {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        Ok(Self {
            package: value.get("package")?,
            module: value.get("module")?,
            function: value.get("function")?,
            type_arguments: value.get("typeArguments")?,
            arguments: value.get("arguments")?,
        })
    }
}

impl ToBcsValue for Command {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            Command::MoveCall(call) => BcsValue::variant("MoveCall", call.to_bcs_value()),
            Command::TransferObjects(objects, address) => BcsValue::variant(
                "TransferObjects",
                BcsValue::structure([
                    ("objects", objects.to_bcs_value()),
                    ("address", address.to_bcs_value()),
                ]),
            ),
            Command::SplitCoins(coin, amounts) => BcsValue::variant(
                "SplitCoins",
                BcsValue::structure([
                    ("coin", coin.to_bcs_value()),
                    ("amounts", amounts.to_bcs_value()),
                ]),
            ),
            Command::MergeCoins(destination, sources) => BcsValue::variant(
                "MergeCoins",
                BcsValue::structure([
                    ("destination", destination.to_bcs_value()),
                    ("sources", sources.to_bcs_value()),
                ]),
            ),
            Command::Publish(modules, dependencies) => BcsValue::variant(
                "Publish",
                BcsValue::structure([
                    ("modules", modules.to_bcs_value()),
                    ("dependencies", dependencies.to_bcs_value()),
                ]),
            ),
            Command::MakeMoveVec(type_tag, elements) => BcsValue::variant(
                "MakeMoveVec",
                BcsValue::structure([
                    ("type", type_tag.to_bcs_value()),
                    ("elements", elements.to_bcs_value()),
                ]),
            ),
            Command::Upgrade(modules, dependencies, package, ticket) => BcsValue::variant(
                "Upgrade",
                BcsValue::structure([
                    ("modules", modules.to_bcs_value()),
                    ("dependencies", dependencies.to_bcs_value()),
                    ("package", package.to_bcs_value()),
                    ("ticket", ticket.to_bcs_value()),
                ]),
            ),
        }
    }
}

impl FromBcsValue for Command {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        let (variant, _) = value.as_variant()?;
        let p = value.payload()?;
        Ok(match variant {
            "MoveCall" => Command::MoveCall(Box::new(p.decode()?)),
            "TransferObjects" => Command::TransferObjects(p.get("objects")?, p.get("address")?),
            "SplitCoins" => Command::SplitCoins(p.get("coin")?, p.get("amounts")?),
            "MergeCoins" => Command::MergeCoins(p.get("destination")?, p.get("sources")?),
            "Publish" => Command::Publish(p.get("modules")?, p.get("dependencies")?),
            "MakeMoveVec" => Command::MakeMoveVec(p.get("type")?, p.get("elements")?),
            "Upgrade" => Command::Upgrade(
                p.get("modules")?,
                p.get("dependencies")?,
                p.get("package")?,
                p.get("ticket")?,
            ),
            other => return Err(unknown("Command", other)),
        })
    }
}
