//! BCS schemas for every ledger structure.
//!
//! Each schema is built once and shared. Dynamic schemas operate on
//! [`BcsValue`]; the typed entry points at the bottom map those values onto
//! the Rust structures in [`crate::transaction`] and [`crate::effects`].

use std::sync::OnceLock;

use sui_bcs::primitives::{bool, byte_vector, bytes, string, u16, u32, u64, u8};
use sui_bcs::{
    dyn_option, dyn_vector, enum_type, erased, lazy_named, struct_type, transform, tuple, BcsError,
    BcsType, BcsValue, FromBcsValue, ToBcsValue, Transform,
};

use crate::address::{SuiAddress, SUI_ADDRESS_LENGTH};
use crate::digest::Digest;
use crate::effects::TransactionEffects;
use crate::object::{ObjectRef, Owner};
use crate::transaction::{Argument, CallArg, Command, TransactionData, TransactionKind};
use crate::type_tag::TypeTag;

macro_rules! cached_schema {
    ($(#[$meta:meta])* $name:ident => $build:expr) => {
        $(#[$meta])*
        pub fn $name() -> BcsType<BcsValue> {
            static SCHEMA: OnceLock<BcsType<BcsValue>> = OnceLock::new();
            SCHEMA.get_or_init(|| $build).clone()
        }
    };
}

fn unit(name: &str) -> (&str, Option<BcsType<BcsValue>>) {
    (name, None)
}

fn with(name: &str, codec: BcsType<BcsValue>) -> (&str, Option<BcsType<BcsValue>>) {
    (name, Some(codec))
}

fn e_u8() -> BcsType<BcsValue> {
    erased(u8())
}

fn e_u16() -> BcsType<BcsValue> {
    erased(u16())
}

fn e_u64() -> BcsType<BcsValue> {
    erased(u64())
}

fn e_string() -> BcsType<BcsValue> {
    erased(string())
}

cached_schema!(
    /// 32 raw bytes presented as a full-length hex string.
    address => erased(
        Transform::new(
            bytes(SUI_ADDRESS_LENGTH),
            |addr: &SuiAddress| Ok(addr.to_vec()),
            |raw| SuiAddress::from_bytes(&raw).map_err(|e| BcsError::mapping("Address", e.to_string())),
        )
        .named("Address")
        .build(),
    )
);

cached_schema!(
    /// Length-prefixed 32 bytes presented as base58.
    object_digest => erased(
        Transform::new(
            byte_vector(),
            |digest: &Digest| Ok(digest.as_bytes().to_vec()),
            |raw| Digest::from_bytes(&raw).map_err(|e| BcsError::mapping("ObjectDigest", e.to_string())),
        )
        .named("ObjectDigest")
        .build(),
    )
);

cached_schema!(object_ref => struct_type(
    "ObjectRef",
    [
        ("objectId", address()),
        ("version", e_u64()),
        ("digest", object_digest()),
    ],
));

cached_schema!(owner => enum_type(
    "Owner",
    [
        with("AddressOwner", address()),
        with("ObjectOwner", address()),
        with("Shared", struct_type("Shared", [("initialSharedVersion", e_u64())])),
        unit("Immutable"),
        with(
            "ConsensusAddressOwner",
            struct_type(
                "ConsensusAddressOwner",
                [("startVersion", e_u64()), ("owner", address())],
            ),
        ),
    ],
));

cached_schema!(struct_tag => struct_type(
    "StructTag",
    [
        ("address", address()),
        ("module", e_string()),
        ("name", e_string()),
        ("typeParams", dyn_vector(lazy_named("TypeTag", type_tag))),
    ],
));

cached_schema!(
    /// Recursive through `vector` and struct type parameters.
    type_tag => enum_type(
        "TypeTag",
        [
            unit("bool"),
            unit("u8"),
            unit("u64"),
            unit("u128"),
            unit("address"),
            unit("signer"),
            with("vector", lazy_named("TypeTag", type_tag)),
            with("struct", struct_tag()),
            unit("u16"),
            unit("u32"),
            unit("u256"),
        ],
    )
);

cached_schema!(argument => enum_type(
    "Argument",
    [
        unit("GasCoin"),
        with("Input", e_u16()),
        with("Result", e_u16()),
        with("NestedResult", tuple(vec![e_u16(), e_u16()])),
    ],
));

cached_schema!(object_arg => enum_type(
    "ObjectArg",
    [
        with("ImmOrOwnedObject", object_ref()),
        with(
            "SharedObject",
            struct_type(
                "SharedObjectRef",
                [
                    ("objectId", address()),
                    ("initialSharedVersion", e_u64()),
                    ("mutable", erased(bool())),
                ],
            ),
        ),
        with("Receiving", object_ref()),
    ],
));

cached_schema!(call_arg => enum_type(
    "CallArg",
    [with("Pure", erased(byte_vector())), with("Object", object_arg())],
));

cached_schema!(programmable_move_call => struct_type(
    "ProgrammableMoveCall",
    [
        ("package", address()),
        ("module", e_string()),
        ("function", e_string()),
        ("typeArguments", dyn_vector(type_tag())),
        ("arguments", dyn_vector(argument())),
    ],
));

cached_schema!(command => enum_type(
    "Command",
    [
        with("MoveCall", programmable_move_call()),
        with(
            "TransferObjects",
            struct_type(
                "TransferObjects",
                [("objects", dyn_vector(argument())), ("address", argument())],
            ),
        ),
        with(
            "SplitCoins",
            struct_type(
                "SplitCoins",
                [("coin", argument()), ("amounts", dyn_vector(argument()))],
            ),
        ),
        with(
            "MergeCoins",
            struct_type(
                "MergeCoins",
                [("destination", argument()), ("sources", dyn_vector(argument()))],
            ),
        ),
        with(
            "Publish",
            struct_type(
                "Publish",
                [
                    ("modules", dyn_vector(erased(byte_vector()))),
                    ("dependencies", dyn_vector(address())),
                ],
            ),
        ),
        with(
            "MakeMoveVec",
            struct_type(
                "MakeMoveVec",
                [("type", dyn_option(type_tag())), ("elements", dyn_vector(argument()))],
            ),
        ),
        with(
            "Upgrade",
            struct_type(
                "Upgrade",
                [
                    ("modules", dyn_vector(erased(byte_vector()))),
                    ("dependencies", dyn_vector(address())),
                    ("package", address()),
                    ("ticket", argument()),
                ],
            ),
        ),
    ],
));

cached_schema!(programmable_transaction => struct_type(
    "ProgrammableTransaction",
    [("inputs", dyn_vector(call_arg())), ("commands", dyn_vector(command()))],
));

cached_schema!(
    /// Only programmable transactions carry a payload this client understands.
    transaction_kind => enum_type(
        "TransactionKind",
        [
            with("ProgrammableTransaction", programmable_transaction()),
            unit("ChangeEpoch"),
            unit("Genesis"),
            unit("ConsensusCommitPrologue"),
        ],
    )
);

cached_schema!(transaction_expiration => enum_type(
    "TransactionExpiration",
    [unit("None"), with("Epoch", e_u64())],
));

cached_schema!(gas_data => struct_type(
    "GasData",
    [
        ("payment", dyn_vector(object_ref())),
        ("owner", address()),
        ("price", e_u64()),
        ("budget", e_u64()),
    ],
));

cached_schema!(transaction_data => enum_type(
    "TransactionData",
    [with(
        "V1",
        struct_type(
            "TransactionDataV1",
            [
                ("kind", transaction_kind()),
                ("sender", address()),
                ("gasData", gas_data()),
                ("expiration", transaction_expiration()),
            ],
        ),
    )],
));

cached_schema!(intent_message => struct_type(
    "IntentMessage",
    [
        (
            "intent",
            struct_type(
                "Intent",
                [
                    (
                        "scope",
                        enum_type(
                            "IntentScope",
                            [
                                unit("TransactionData"),
                                unit("TransactionEffects"),
                                unit("CheckpointSummary"),
                                unit("PersonalMessage"),
                            ],
                        ),
                    ),
                    ("version", enum_type("IntentVersion", [unit("V0")])),
                    ("appId", enum_type("AppId", [unit("Sui")])),
                ],
            ),
        ),
        ("value", transaction_data()),
    ],
));

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

cached_schema!(gas_cost_summary => struct_type(
    "GasCostSummary",
    [
        ("computationCost", e_u64()),
        ("storageCost", e_u64()),
        ("storageRebate", e_u64()),
        ("nonRefundableStorageFee", e_u64()),
    ],
));

cached_schema!(move_location => struct_type(
    "MoveLocation",
    [
        (
            "module",
            struct_type("ModuleId", [("address", address()), ("name", e_string())]),
        ),
        ("function", e_u16()),
        ("instruction", e_u16()),
        ("functionName", dyn_option(e_string())),
    ],
));

cached_schema!(command_argument_error => enum_type(
    "CommandArgumentError",
    [
        unit("TypeMismatch"),
        unit("InvalidBCSBytes"),
        unit("InvalidUsageOfPureArg"),
        unit("InvalidArgumentToPrivateEntryFunction"),
        with("IndexOutOfBounds", struct_type("IndexOutOfBounds", [("idx", e_u16())])),
        with(
            "SecondaryIndexOutOfBounds",
            struct_type(
                "SecondaryIndexOutOfBounds",
                [("resultIdx", e_u16()), ("secondaryIdx", e_u16())],
            ),
        ),
        with(
            "InvalidResultArity",
            struct_type("InvalidResultArity", [("resultIdx", e_u16())]),
        ),
        unit("InvalidGasCoinUsage"),
        unit("InvalidValueUsage"),
        unit("InvalidObjectByValue"),
        unit("InvalidObjectByMutRef"),
        unit("SharedObjectOperationNotAllowed"),
        unit("InvalidArgumentArity"),
    ],
));

cached_schema!(type_argument_error => enum_type(
    "TypeArgumentError",
    [unit("TypeNotFound"), unit("ConstraintNotSatisfied")],
));

cached_schema!(package_upgrade_error => enum_type(
    "PackageUpgradeError",
    [
        with(
            "UnableToFetchPackage",
            struct_type("UnableToFetchPackage", [("packageId", address())]),
        ),
        with("NotAPackage", struct_type("NotAPackage", [("objectId", address())])),
        unit("IncompatibleUpgrade"),
        with(
            "DigestDoesNotMatch",
            struct_type("DigestDoesNotMatch", [("digest", erased(byte_vector()))]),
        ),
        with(
            "UnknownUpgradePolicy",
            struct_type("UnknownUpgradePolicy", [("policy", e_u8())]),
        ),
        with(
            "PackageIDDoesNotMatch",
            struct_type(
                "PackageIDDoesNotMatch",
                [("packageId", address()), ("ticketId", address())],
            ),
        ),
    ],
));

fn size_pair(name: &str, first: &str, second: &str) -> BcsType<BcsValue> {
    struct_type(name, [(first, e_u64()), (second, e_u64())])
}

cached_schema!(execution_failure_status => enum_type(
    "ExecutionFailureStatus",
    [
        unit("InsufficientGas"),
        unit("InvalidGasObject"),
        unit("InvariantViolation"),
        unit("FeatureNotYetSupported"),
        with("MoveObjectTooBig", size_pair("MoveObjectTooBig", "objectSize", "maxObjectSize")),
        with("MovePackageTooBig", size_pair("MovePackageTooBig", "objectSize", "maxObjectSize")),
        with(
            "CircularObjectOwnership",
            struct_type("CircularObjectOwnership", [("object", address())]),
        ),
        unit("InsufficientCoinBalance"),
        unit("CoinBalanceOverflow"),
        unit("PublishErrorNonZeroAddress"),
        unit("SuiMoveVerificationError"),
        with("MovePrimitiveRuntimeError", dyn_option(move_location())),
        with("MoveAbort", tuple(vec![move_location(), e_u64()])),
        unit("VMVerificationOrDeserializationError"),
        unit("VMInvariantViolation"),
        unit("FunctionNotFound"),
        unit("ArityMismatch"),
        unit("TypeArityMismatch"),
        unit("NonEntryFunctionInvoked"),
        with(
            "CommandArgumentError",
            struct_type(
                "CommandArgumentError",
                [("argIdx", e_u16()), ("kind", command_argument_error())],
            ),
        ),
        with(
            "TypeArgumentError",
            struct_type(
                "TypeArgumentError",
                [("argumentIdx", e_u16()), ("kind", type_argument_error())],
            ),
        ),
        with(
            "UnusedValueWithoutDrop",
            struct_type(
                "UnusedValueWithoutDrop",
                [("resultIdx", e_u16()), ("secondaryIdx", e_u16())],
            ),
        ),
        with(
            "InvalidPublicFunctionReturnType",
            struct_type("InvalidPublicFunctionReturnType", [("idx", e_u16())]),
        ),
        unit("InvalidTransferObject"),
        with("EffectsTooLarge", size_pair("EffectsTooLarge", "currentSize", "maxSize")),
        unit("PublishUpgradeMissingDependency"),
        unit("PublishUpgradeDependencyDowngrade"),
        with(
            "PackageUpgradeError",
            struct_type("PackageUpgradeError", [("upgradeError", package_upgrade_error())]),
        ),
        with(
            "WrittenObjectsTooLarge",
            size_pair("WrittenObjectsTooLarge", "currentSize", "maxSize"),
        ),
        unit("CertificateDenied"),
        unit("SuiMoveVerificationTimedout"),
        unit("SharedObjectOperationNotAllowed"),
        unit("InputObjectDeleted"),
        with(
            "ExecutionCancelledDueToSharedObjectCongestion",
            struct_type(
                "ExecutionCancelledDueToSharedObjectCongestion",
                [("congestedObjects", dyn_vector(address()))],
            ),
        ),
        with(
            "AddressDeniedForCoin",
            struct_type(
                "AddressDeniedForCoin",
                [("address", address()), ("coinType", e_string())],
            ),
        ),
        with(
            "CoinTypeGlobalPause",
            struct_type("CoinTypeGlobalPause", [("coinType", e_string())]),
        ),
        unit("ExecutionCancelledDueToRandomnessUnavailable"),
    ],
));

cached_schema!(execution_status => enum_type(
    "ExecutionStatus",
    [
        unit("Success"),
        with(
            "Failed",
            struct_type(
                "ExecutionFailed",
                [("error", execution_failure_status()), ("command", dyn_option(e_u64()))],
            ),
        ),
    ],
));

fn version_digest() -> BcsType<BcsValue> {
    tuple(vec![e_u64(), object_digest()])
}

cached_schema!(object_in => enum_type(
    "ObjectIn",
    [unit("NotExist"), with("Exist", tuple(vec![version_digest(), owner()]))],
));

cached_schema!(object_out => enum_type(
    "ObjectOut",
    [
        unit("NotExist"),
        with("ObjectWrite", tuple(vec![object_digest(), owner()])),
        with("PackageWrite", version_digest()),
    ],
));

cached_schema!(id_operation => enum_type(
    "IDOperation",
    [unit("None"), unit("Created"), unit("Deleted")],
));

cached_schema!(effects_object_change => struct_type(
    "EffectsObjectChange",
    [
        ("inputState", object_in()),
        ("outputState", object_out()),
        ("idOperation", id_operation()),
    ],
));

cached_schema!(unchanged_shared_kind => enum_type(
    "UnchangedSharedKind",
    [
        with("ReadOnlyRoot", version_digest()),
        with("MutateDeleted", e_u64()),
        with("ReadDeleted", e_u64()),
        with("Cancelled", e_u64()),
        unit("PerEpochConfig"),
    ],
));

cached_schema!(transaction_effects_v2 => struct_type(
    "TransactionEffectsV2",
    [
        ("status", execution_status()),
        ("executedEpoch", e_u64()),
        ("gasUsed", gas_cost_summary()),
        ("transactionDigest", object_digest()),
        ("gasObjectIndex", dyn_option(erased(u32()))),
        ("eventsDigest", dyn_option(object_digest())),
        ("dependencies", dyn_vector(object_digest())),
        ("lamportVersion", e_u64()),
        (
            "changedObjects",
            dyn_vector(tuple(vec![address(), effects_object_change()])),
        ),
        (
            "unchangedSharedObjects",
            dyn_vector(tuple(vec![address(), unchanged_shared_kind()])),
        ),
        ("auxDataDigest", dyn_option(object_digest())),
    ],
));

cached_schema!(
    /// V1 is declared without a payload so its discriminant is recognised and
    /// rejected by the typed decoder.
    transaction_effects => enum_type(
        "TransactionEffects",
        [unit("V1"), with("V2", transaction_effects_v2())],
    )
);

// ---------------------------------------------------------------------------
// Typed entry points
// ---------------------------------------------------------------------------

/// View a dynamic schema as a codec for `T`.
pub fn typed<T>(schema: BcsType<BcsValue>) -> BcsType<T>
where
    T: ToBcsValue + FromBcsValue + 'static,
{
    let name = schema.name().to_string();
    Transform::new(
        schema,
        |value: &T| Ok(value.to_bcs_value()),
        |raw| T::from_bcs_value(&raw),
    )
    .named(name)
    .build()
}

pub fn transaction_data_codec() -> BcsType<TransactionData> {
    static CODEC: OnceLock<BcsType<TransactionData>> = OnceLock::new();
    CODEC.get_or_init(|| typed(transaction_data())).clone()
}

pub fn transaction_kind_codec() -> BcsType<TransactionKind> {
    static CODEC: OnceLock<BcsType<TransactionKind>> = OnceLock::new();
    CODEC.get_or_init(|| typed(transaction_kind())).clone()
}

pub fn transaction_effects_codec() -> BcsType<TransactionEffects> {
    static CODEC: OnceLock<BcsType<TransactionEffects>> = OnceLock::new();
    CODEC.get_or_init(|| typed(transaction_effects())).clone()
}

pub fn call_arg_codec() -> BcsType<CallArg> {
    typed(call_arg())
}

pub fn command_codec() -> BcsType<Command> {
    typed(command())
}

pub fn argument_codec() -> BcsType<Argument> {
    typed(argument())
}

pub fn object_ref_codec() -> BcsType<ObjectRef> {
    typed(object_ref())
}

pub fn owner_codec() -> BcsType<Owner> {
    typed(owner())
}

pub fn type_tag_codec() -> BcsType<TypeTag> {
    typed(type_tag())
}

pub fn address_codec() -> BcsType<SuiAddress> {
    transform(
        bytes(SUI_ADDRESS_LENGTH),
        |addr: &SuiAddress| Ok(addr.to_vec()),
        |raw| SuiAddress::from_bytes(&raw).map_err(|e| BcsError::mapping("Address", e.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{
        EffectsObjectChange, ExecutionFailure, ExecutionStatus, GasCostSummary, IdOperation,
        ObjectIn, ObjectOut, TransactionEffectsV2, UnchangedSharedKind,
    };
    use crate::hash::transaction_digest;
    use crate::transaction::{
        GasData, ObjectArg, ProgrammableMoveCall, ProgrammableTransaction, TransactionExpiration,
    };
    use crate::type_tag::parse_type_tag;
    use sui_bcs::CodecExt;

    fn sample_ref(seed: u8, version: u64) -> ObjectRef {
        ObjectRef::new(
            SuiAddress::new([seed; 32]),
            version,
            Digest::new([seed.wrapping_add(1); 32]),
        )
    }

    fn sample_transaction(budget: u64) -> TransactionData {
        let pt = ProgrammableTransaction {
            inputs: vec![
                CallArg::Pure(vec![100, 0, 0, 0, 0, 0, 0, 0]),
                CallArg::Object(ObjectArg::ImmOrOwnedObject(sample_ref(3, 9))),
                CallArg::Object(ObjectArg::SharedObject {
                    id: SuiAddress::from_u16(6),
                    initial_shared_version: 1,
                    mutable: false,
                }),
            ],
            commands: vec![
                Command::SplitCoins(Argument::GasCoin, vec![Argument::Input(0)]),
                Command::MoveCall(Box::new(ProgrammableMoveCall {
                    package: SuiAddress::from_u16(2),
                    module: "coin".to_string(),
                    function: "join".to_string(),
                    type_arguments: vec![parse_type_tag("0x2::sui::SUI").unwrap()],
                    arguments: vec![Argument::Input(1), Argument::NestedResult(0, 0)],
                })),
                Command::TransferObjects(vec![Argument::Result(0)], Argument::Input(2)),
            ],
        };
        TransactionData::new_programmable(
            SuiAddress::new([0xaa; 32]),
            GasData {
                payment: vec![sample_ref(4, 2)],
                owner: SuiAddress::new([0xaa; 32]),
                price: 1000,
                budget,
            },
            TransactionExpiration::None,
            pt,
        )
    }

    #[test]
    fn test_transaction_data_round_trip() {
        let codec = transaction_data_codec();
        let tx = sample_transaction(5_000_000);
        let bytes = codec.to_bytes(&tx).unwrap();
        assert_eq!(bytes[0], 0, "V1 discriminant");
        assert_eq!(codec.parse(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_digest_depends_only_on_content() {
        let codec = transaction_data_codec();
        let a = codec.to_bytes(&sample_transaction(5_000_000)).unwrap();
        let b = codec.to_bytes(&sample_transaction(5_000_000)).unwrap();
        let c = codec.to_bytes(&sample_transaction(5_000_001)).unwrap();
        assert_eq!(a, b);
        assert_eq!(transaction_digest(&a), transaction_digest(&b));
        assert_ne!(transaction_digest(&a), transaction_digest(&c));
    }

    #[test]
    fn test_command_and_argument_discriminants() {
        let bytes = command_codec()
            .to_bytes(&Command::SplitCoins(Argument::GasCoin, vec![Argument::Input(0)]))
            .unwrap();
        assert_eq!(bytes, vec![2, 0, 1, 1, 0, 0]);

        let bytes = argument_codec()
            .to_bytes(&Argument::NestedResult(1, 2))
            .unwrap();
        assert_eq!(bytes, vec![3, 1, 0, 2, 0]);
    }

    #[test]
    fn test_address_and_object_ref_match_serde_bcs() {
        let addr = SuiAddress::new([7; 32]);
        assert_eq!(
            address_codec().to_bytes(&addr).unwrap(),
            bcs::to_bytes(&[7u8; 32]).unwrap()
        );

        let object = sample_ref(7, 5);
        let expected = bcs::to_bytes(&([7u8; 32], 5u64, vec![8u8; 32])).unwrap();
        assert_eq!(object_ref_codec().to_bytes(&object).unwrap(), expected);
    }

    #[test]
    fn test_recursive_type_tag() {
        let tag = parse_type_tag("vector<0x2::coin::Coin<vector<u8>>>").unwrap();
        let codec = type_tag_codec();
        let bytes = codec.to_bytes(&tag).unwrap();
        assert_eq!(bytes[0], 6, "vector discriminant");
        assert_eq!(bytes[1], 7, "struct discriminant");
        assert_eq!(codec.parse(&bytes).unwrap(), tag);
    }

    fn sample_effects(status: ExecutionStatus) -> TransactionEffects {
        let owner = Owner::AddressOwner(SuiAddress::new([0xaa; 32]));
        TransactionEffects::V2(TransactionEffectsV2 {
            status,
            executed_epoch: 12,
            gas_used: GasCostSummary {
                computation_cost: 1_000_000,
                storage_cost: 2_000_000,
                storage_rebate: 1_500_000,
                non_refundable_storage_fee: 10,
            },
            transaction_digest: Digest::new([1; 32]),
            gas_object_index: Some(0),
            events_digest: None,
            dependencies: vec![Digest::new([2; 32])],
            lamport_version: 44,
            changed_objects: vec![
                (
                    SuiAddress::new([4; 32]),
                    EffectsObjectChange {
                        input_state: ObjectIn::Exist {
                            version: 2,
                            digest: Digest::new([5; 32]),
                            owner,
                        },
                        output_state: ObjectOut::ObjectWrite {
                            digest: Digest::new([6; 32]),
                            owner,
                        },
                        id_operation: IdOperation::None,
                    },
                ),
                (
                    SuiAddress::new([9; 32]),
                    EffectsObjectChange {
                        input_state: ObjectIn::Exist {
                            version: 3,
                            digest: Digest::new([10; 32]),
                            owner,
                        },
                        output_state: ObjectOut::NotExist,
                        id_operation: IdOperation::Deleted,
                    },
                ),
            ],
            unchanged_shared_objects: vec![(
                SuiAddress::from_u16(6),
                UnchangedSharedKind::ReadOnlyRoot {
                    version: 1,
                    digest: Digest::new([11; 32]),
                },
            )],
            aux_data_digest: None,
        })
    }

    #[test]
    fn test_effects_round_trip_and_accessors() {
        let codec = transaction_effects_codec();
        let effects = sample_effects(ExecutionStatus::Success);
        let bytes = codec.to_bytes(&effects).unwrap();
        assert_eq!(bytes[0], 1, "V2 discriminant");
        let parsed = codec.parse(&bytes).unwrap();
        assert_eq!(parsed, effects);

        let v2 = parsed.v2();
        let (gas, _) = v2.gas_object().unwrap();
        assert_eq!(gas.object_id, SuiAddress::new([4; 32]));
        assert_eq!(gas.version, 44);
        assert_eq!(
            v2.removed_objects().collect::<Vec<_>>(),
            vec![SuiAddress::new([9; 32])]
        );
        assert_eq!(v2.gas_used.net_gas_usage(), 1_500_000);
    }

    #[test]
    fn test_move_abort_failure_round_trip() {
        let location = BcsValue::structure([
            (
                "module",
                BcsValue::structure([
                    ("address", SuiAddress::from_u16(2).to_bcs_value()),
                    ("name", BcsValue::String("coin".to_string())),
                ]),
            ),
            ("function", BcsValue::U16(3)),
            ("instruction", BcsValue::U16(14)),
            (
                "functionName",
                BcsValue::Option(Some(Box::new(BcsValue::String("split".to_string())))),
            ),
        ]);
        let failure = ExecutionFailure {
            kind: "MoveAbort".to_string(),
            details: Some(BcsValue::Tuple(vec![location, BcsValue::U64(7)])),
        };
        let effects = sample_effects(ExecutionStatus::Failure {
            error: failure,
            command: Some(1),
        });

        let codec = transaction_effects_codec();
        let parsed = codec.parse(&codec.to_bytes(&effects).unwrap()).unwrap();
        assert_eq!(parsed, effects);
        match &parsed.v2().status {
            ExecutionStatus::Failure { error, command } => {
                assert_eq!(error.abort_code(), Some(7));
                assert_eq!(*command, Some(1));
                assert_eq!(error.to_string(), "MoveAbort in coin::split with code 7");
            }
            ExecutionStatus::Success => panic!("expected failure"),
        }
    }

    #[test]
    fn test_v1_effects_are_rejected() {
        let err = transaction_effects_codec().parse(&[0]).unwrap_err();
        assert!(
            err.to_string()
                .contains("Unsupported transaction effects version V1"),
            "{}",
            err
        );
    }
}
