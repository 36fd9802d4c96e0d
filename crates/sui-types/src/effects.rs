//! Transaction effects as returned by the ledger after execution.
//!
//! Only the V2 layout is understood. V1 effects decode to an explicit
//! "unsupported version" error.

use std::fmt;

use sui_bcs::{BcsError, BcsValue, FromBcsValue, ToBcsValue};

use crate::address::ObjectID;
use crate::digest::{Digest, ObjectDigest, TransactionDigest};
use crate::object::{ObjectRef, Owner, SequenceNumber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEffects {
    V2(TransactionEffectsV2),
}

impl TransactionEffects {
    pub fn v2(&self) -> &TransactionEffectsV2 {
        match self {
            TransactionEffects::V2(v2) => v2,
        }
    }

    pub fn into_v2(self) -> TransactionEffectsV2 {
        match self {
            TransactionEffects::V2(v2) => v2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEffectsV2 {
    pub status: ExecutionStatus,
    pub executed_epoch: u64,
    pub gas_used: GasCostSummary,
    pub transaction_digest: TransactionDigest,
    pub gas_object_index: Option<u32>,
    pub events_digest: Option<Digest>,
    pub dependencies: Vec<TransactionDigest>,
    pub lamport_version: SequenceNumber,
    pub changed_objects: Vec<(ObjectID, EffectsObjectChange)>,
    pub unchanged_shared_objects: Vec<(ObjectID, UnchangedSharedKind)>,
    pub aux_data_digest: Option<Digest>,
}

impl TransactionEffectsV2 {
    /// The gas coin as it exists after execution.
    pub fn gas_object(&self) -> Option<(ObjectRef, Owner)> {
        let index = self.gas_object_index? as usize;
        let (id, change) = self.changed_objects.get(index)?;
        match change.output_state {
            ObjectOut::ObjectWrite { digest, owner } => {
                Some((ObjectRef::new(*id, self.lamport_version, digest), owner))
            }
            _ => None,
        }
    }

    /// Every object written by this transaction, at its new version.
    pub fn written_objects(&self) -> impl Iterator<Item = (ObjectRef, Owner)> + '_ {
        self.changed_objects
            .iter()
            .filter_map(move |(id, change)| match change.output_state {
                ObjectOut::ObjectWrite { digest, owner } => {
                    Some((ObjectRef::new(*id, self.lamport_version, digest), owner))
                }
                _ => None,
            })
    }

    /// Objects that no longer exist at the top level (deleted or wrapped).
    pub fn removed_objects(&self) -> impl Iterator<Item = ObjectID> + '_ {
        self.changed_objects
            .iter()
            .filter(|(_, change)| matches!(change.output_state, ObjectOut::NotExist))
            .map(|(id, _)| *id)
    }

    pub fn created_objects(&self) -> impl Iterator<Item = (ObjectRef, Owner)> + '_ {
        self.changed_objects
            .iter()
            .filter(|(_, change)| change.id_operation == IdOperation::Created)
            .filter_map(move |(id, change)| match change.output_state {
                ObjectOut::ObjectWrite { digest, owner } => {
                    Some((ObjectRef::new(*id, self.lamport_version, digest), owner))
                }
                _ => None,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GasCostSummary {
    pub computation_cost: u64,
    pub storage_cost: u64,
    pub storage_rebate: u64,
    pub non_refundable_storage_fee: u64,
}

impl GasCostSummary {
    /// Net amount charged to the gas coin. Negative when rebates win.
    pub fn net_gas_usage(&self) -> i64 {
        self.computation_cost as i64 + self.storage_cost as i64 - self.storage_rebate as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure {
        error: ExecutionFailure,
        command: Option<u64>,
    },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

/// A failed execution: the failure variant name plus its decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFailure {
    pub kind: String,
    pub details: Option<BcsValue>,
}

impl ExecutionFailure {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            details: None,
        }
    }

    /// Abort code of a `MoveAbort` failure.
    pub fn abort_code(&self) -> Option<u64> {
        if self.kind != "MoveAbort" {
            return None;
        }
        let details = self.details.as_ref()?;
        details.as_vector().ok()?.get(1)?.as_u64().ok()
    }
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind.as_str(), self.abort_code()) {
            ("MoveAbort", Some(code)) => {
                let location = self
                    .details
                    .as_ref()
                    .and_then(|d| d.as_vector().ok()?.first().cloned())
                    .and_then(|loc| {
                        let module = loc.field("module").ok()?;
                        let name = module.get::<String>("name").ok()?;
                        let function = loc.get::<Option<String>>("functionName").ok()?;
                        Some(match function {
                            Some(function) => format!("{}::{}", name, function),
                            None => name,
                        })
                    });
                match location {
                    Some(location) => write!(f, "MoveAbort in {} with code {}", location, code),
                    None => write!(f, "MoveAbort with code {}", code),
                }
            }
            (kind, _) => f.write_str(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectsObjectChange {
    pub input_state: ObjectIn,
    pub output_state: ObjectOut,
    pub id_operation: IdOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectIn {
    NotExist,
    Exist {
        version: SequenceNumber,
        digest: ObjectDigest,
        owner: Owner,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectOut {
    NotExist,
    ObjectWrite {
        digest: ObjectDigest,
        owner: Owner,
    },
    PackageWrite {
        version: SequenceNumber,
        digest: ObjectDigest,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOperation {
    None,
    Created,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnchangedSharedKind {
    ReadOnlyRoot {
        version: SequenceNumber,
        digest: ObjectDigest,
    },
    MutateDeleted(SequenceNumber),
    ReadDeleted(SequenceNumber),
    Cancelled(SequenceNumber),
    PerEpochConfig,
}

// ---------------------------------------------------------------------------
// Dynamic value conversions
// ---------------------------------------------------------------------------

fn unknown(type_name: &str, variant: &str) -> BcsError {
    BcsError::mapping(type_name, format!("unknown variant `{}`", variant))
}

fn version_digest(version: SequenceNumber, digest: &ObjectDigest) -> BcsValue {
    BcsValue::Tuple(vec![BcsValue::U64(version), digest.to_bcs_value()])
}

impl ToBcsValue for TransactionEffects {
    fn to_bcs_value(&self) -> BcsValue {
        let TransactionEffects::V2(v2) = self;
        BcsValue::variant("V2", v2.to_bcs_value())
    }
}

impl FromBcsValue for TransactionEffects {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("V2", Some(v2)) => Ok(TransactionEffects::V2(v2.decode()?)),
            (version, _) => Err(BcsError::mapping(
                "TransactionEffects",
                format!("Unsupported transaction effects version {}", version),
            )),
        }
    }
}

impl ToBcsValue for TransactionEffectsV2 {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::structure([
            ("status", self.status.to_bcs_value()),
            ("executedEpoch", BcsValue::U64(self.executed_epoch)),
            ("gasUsed", self.gas_used.to_bcs_value()),
            ("transactionDigest", self.transaction_digest.to_bcs_value()),
            ("gasObjectIndex", self.gas_object_index.to_bcs_value()),
            ("eventsDigest", self.events_digest.to_bcs_value()),
            ("dependencies", self.dependencies.to_bcs_value()),
            ("lamportVersion", BcsValue::U64(self.lamport_version)),
            ("changedObjects", self.changed_objects.to_bcs_value()),
            (
                "unchangedSharedObjects",
                self.unchanged_shared_objects.to_bcs_value(),
            ),
            ("auxDataDigest", self.aux_data_digest.to_bcs_value()),
        ])
    }
}

impl FromBcsValue for TransactionEffectsV2 {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        Ok(Self {
            status: value.get("status")?,
            executed_epoch: value.get("executedEpoch")?,
            gas_used: value.get("gasUsed")?,
            transaction_digest: value.get("transactionDigest")?,
            gas_object_index: value.get("gasObjectIndex")?,
            events_digest: value.get("eventsDigest")?,
            dependencies: value.get("dependencies")?,
            lamport_version: value.get("lamportVersion")?,
            changed_objects: value.get("changedObjects")?,
            unchanged_shared_objects: value.get("unchangedSharedObjects")?,
            aux_data_digest: value.get("auxDataDigest")?,
        })
    }
}

impl ToBcsValue for GasCostSummary {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::structure([
            ("computationCost", BcsValue::U64(self.computation_cost)),
            ("storageCost", BcsValue::U64(self.storage_cost)),
            ("storageRebate", BcsValue::U64(self.storage_rebate)),
            (
                "nonRefundableStorageFee",
                BcsValue::U64(self.non_refundable_storage_fee),
            ),
        ])
    }
}

impl FromBcsValue for GasCostSummary {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        Ok(Self {
            computation_cost: value.get("computationCost")?,
            storage_cost: value.get("storageCost")?,
            storage_rebate: value.get("storageRebate")?,
            non_refundable_storage_fee: value.get("nonRefundableStorageFee")?,
        })
    }
}

impl ToBcsValue for ExecutionStatus {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            ExecutionStatus::Success => BcsValue::unit_variant("Success"),
            ExecutionStatus::Failure { error, command } => {
                let error = match &error.details {
                    Some(details) => BcsValue::variant(error.kind.clone(), details.clone()),
                    None => BcsValue::unit_variant(error.kind.clone()),
                };
                BcsValue::variant(
                    "Failed",
                    BcsValue::structure([("error", error), ("command", command.to_bcs_value())]),
                )
            }
        }
    }
}

impl FromBcsValue for ExecutionStatus {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("Success", _) => Ok(ExecutionStatus::Success),
            ("Failed", Some(failed)) => {
                let (kind, details) = failed.field("error")?.as_variant()?;
                Ok(ExecutionStatus::Failure {
                    error: ExecutionFailure {
                        kind: kind.to_string(),
                        details: details.cloned(),
                    },
                    command: failed.get("command")?,
                })
            }
            (other, _) => Err(unknown("ExecutionStatus", other)),
        }
    }
}

impl ToBcsValue for EffectsObjectChange {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::structure([
            ("inputState", self.input_state.to_bcs_value()),
            ("outputState", self.output_state.to_bcs_value()),
            ("idOperation", self.id_operation.to_bcs_value()),
        ])
    }
}

impl FromBcsValue for EffectsObjectChange {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        Ok(Self {
            input_state: value.get("inputState")?,
            output_state: value.get("outputState")?,
            id_operation: value.get("idOperation")?,
        })
    }
}

impl ToBcsValue for ObjectIn {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            ObjectIn::NotExist => BcsValue::unit_variant("NotExist"),
            ObjectIn::Exist {
                version,
                digest,
                owner,
            } => BcsValue::variant(
                "Exist",
                BcsValue::Tuple(vec![version_digest(*version, digest), owner.to_bcs_value()]),
            ),
        }
    }
}

impl FromBcsValue for ObjectIn {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("NotExist", _) => Ok(ObjectIn::NotExist),
            ("Exist", Some(exist)) => {
                let ((version, digest), owner): ((u64, ObjectDigest), Owner) = exist.decode()?;
                Ok(ObjectIn::Exist {
                    version,
                    digest,
                    owner,
                })
            }
            (other, _) => Err(unknown("ObjectIn", other)),
        }
    }
}

impl ToBcsValue for ObjectOut {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            ObjectOut::NotExist => BcsValue::unit_variant("NotExist"),
            ObjectOut::ObjectWrite { digest, owner } => BcsValue::variant(
                "ObjectWrite",
                BcsValue::Tuple(vec![digest.to_bcs_value(), owner.to_bcs_value()]),
            ),
            ObjectOut::PackageWrite { version, digest } => {
                BcsValue::variant("PackageWrite", version_digest(*version, digest))
            }
        }
    }
}

impl FromBcsValue for ObjectOut {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("NotExist", _) => Ok(ObjectOut::NotExist),
            ("ObjectWrite", Some(write)) => {
                let (digest, owner) = write.decode()?;
                Ok(ObjectOut::ObjectWrite { digest, owner })
            }
            ("PackageWrite", Some(write)) => {
                let (version, digest) = write.decode()?;
                Ok(ObjectOut::PackageWrite { version, digest })
            }
            (other, _) => Err(unknown("ObjectOut", other)),
        }
    }
}

impl ToBcsValue for IdOperation {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::unit_variant(match self {
            IdOperation::None => "None",
            IdOperation::Created => "Created",
            IdOperation::Deleted => "Deleted",
        })
    }
}

impl FromBcsValue for IdOperation {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("None", _) => Ok(IdOperation::None),
            ("Created", _) => Ok(IdOperation::Created),
            ("Deleted", _) => Ok(IdOperation::Deleted),
            (other, _) => Err(unknown("IDOperation", other)),
        }
    }
}

impl ToBcsValue for UnchangedSharedKind {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            UnchangedSharedKind::ReadOnlyRoot { version, digest } => {
                BcsValue::variant("ReadOnlyRoot", version_digest(*version, digest))
            }
            UnchangedSharedKind::MutateDeleted(v) => {
                BcsValue::variant("MutateDeleted", BcsValue::U64(*v))
            }
            UnchangedSharedKind::ReadDeleted(v) => {
                BcsValue::variant("ReadDeleted", BcsValue::U64(*v))
            }
            UnchangedSharedKind::Cancelled(v) => BcsValue::variant("Cancelled", BcsValue::U64(*v)),
            UnchangedSharedKind::PerEpochConfig => BcsValue::unit_variant("PerEpochConfig"),
        }
    }
}

impl FromBcsValue for UnchangedSharedKind {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_variant()? {
            ("ReadOnlyRoot", Some(root)) => {
                let (version, digest) = root.decode()?;
                Ok(UnchangedSharedKind::ReadOnlyRoot { version, digest })
            }
            ("MutateDeleted", Some(v)) => Ok(UnchangedSharedKind::MutateDeleted(v.decode()?)),
            ("ReadDeleted", Some(v)) => Ok(UnchangedSharedKind::ReadDeleted(v.decode()?)),
            ("Cancelled", Some(v)) => Ok(UnchangedSharedKind::Cancelled(v.decode()?)),
            ("PerEpochConfig", _) => Ok(UnchangedSharedKind::PerEpochConfig),
            (other, _) => Err(unknown("UnchangedSharedKind", other)),
        }
    }
}
