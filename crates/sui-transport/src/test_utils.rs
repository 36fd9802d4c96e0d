//! An in-memory ledger for tests.
//!
//! [`MockLedger`] implements [`SuiClient`] over a map of objects. It decodes
//! submitted transactions, checks object versions like a validator would,
//! applies a useful subset of commands (coin splits, merges, transfers,
//! `0x2::coin::zero`) and produces BCS effects. Move calls are otherwise
//! no-ops unless configured to abort.
//!
//! ```ignore
//! let ledger = MockLedger::new();
//! let sender = SuiAddress::new([1; 32]);
//! let coin = ledger.add_coin(sender, 1_000_000_000);
//! let client: Arc<dyn SuiClient> = Arc::new(ledger);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use sui_bcs::CodecExt;
use sui_types::framework::SUI_TYPE;
use sui_types::schema::{transaction_data_codec, transaction_effects_codec};
use sui_types::type_tag::normalize_struct_tag;
use sui_types::{
    blake2b256, transaction_digest, Argument, CallArg, Command, Digest, EffectsObjectChange,
    ExecutionFailure, ExecutionStatus, GasCostSummary, IdOperation, ObjectArg, ObjectDigest,
    ObjectID, ObjectIn, ObjectOut, ObjectRef, Owner, ProgrammableTransaction, SequenceNumber,
    SuiAddress, TransactionData, TransactionDigest, TransactionEffects, TransactionEffectsV2,
    TransactionKind, UnchangedSharedKind,
};

use crate::client::SuiClient;
use crate::types::{
    move_function_key, CoinPage, CoinStruct, DryRunResult, ExecuteResult, MoveFunction,
    ObjectData, ObjectResponse, ObjectResponseError, SystemState,
};

const COINS_PAGE_SIZE: usize = 50;

/// An object stored in the mock ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockObject {
    pub object_id: ObjectID,
    pub version: SequenceNumber,
    pub digest: ObjectDigest,
    pub owner: Owner,
    pub object_type: Option<String>,
    /// Inner coin type for `0x2::coin::Coin<T>` objects.
    pub coin_type: Option<String>,
    pub balance: u64,
}

impl MockObject {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_id, self.version, self.digest)
    }

    fn to_data(&self) -> ObjectData {
        ObjectData {
            object_id: self.object_id,
            version: self.version,
            digest: self.digest,
            owner: self.owner,
            object_type: self.object_type.clone(),
        }
    }

    fn to_coin(&self) -> Option<CoinStruct> {
        Some(CoinStruct {
            coin_type: self.coin_type.clone()?,
            coin_object_id: self.object_id,
            version: self.version,
            digest: self.digest,
            balance: self.balance,
        })
    }
}

struct LedgerState {
    objects: BTreeMap<ObjectID, MockObject>,
    deleted: HashMap<ObjectID, (SequenceNumber, ObjectDigest)>,
    next_id: u64,
    system_state: SystemState,
    gas_cost: GasCostSummary,
    dry_run_failure: Option<String>,
    move_functions: HashMap<String, MoveFunction>,
    package_names: HashMap<String, ObjectID>,
    type_names: HashMap<String, String>,
    aborts: HashMap<String, u64>,
    transactions: HashMap<TransactionDigest, ExecuteResult>,
    status_delay_polls: usize,
    status_polls: HashMap<TransactionDigest, usize>,
    in_flight: HashMap<ObjectID, usize>,
    conflicts: usize,
    failing_submissions: usize,
    executed: Vec<TransactionData>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            deleted: HashMap::new(),
            next_id: 1,
            system_state: SystemState {
                epoch: 1,
                reference_gas_price: 1000,
                epoch_start_timestamp_ms: chrono::Utc::now().timestamp_millis().max(0) as u64,
                epoch_duration_ms: 86_400_000,
            },
            gas_cost: GasCostSummary {
                computation_cost: 1000,
                storage_cost: 500,
                storage_rebate: 200,
                non_refundable_storage_fee: 0,
            },
            dry_run_failure: None,
            move_functions: HashMap::new(),
            package_names: HashMap::new(),
            type_names: HashMap::new(),
            aborts: HashMap::new(),
            transactions: HashMap::new(),
            status_delay_polls: 0,
            status_polls: HashMap::new(),
            in_flight: HashMap::new(),
            conflicts: 0,
            failing_submissions: 0,
            executed: Vec::new(),
        }
    }
}

impl LedgerState {
    fn fresh_id(&mut self) -> ObjectID {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xc0;
        bytes[24..].copy_from_slice(&self.next_id.to_be_bytes());
        self.next_id += 1;
        SuiAddress::new(bytes)
    }

    fn insert(
        &mut self,
        owner: Owner,
        object_type: Option<String>,
        coin_type: Option<String>,
        balance: u64,
    ) -> MockObject {
        let object_id = self.fresh_id();
        let object = MockObject {
            object_id,
            version: 1,
            digest: object_digest(&Digest::default(), &object_id, 1),
            owner,
            object_type,
            coin_type,
            balance,
        };
        self.objects.insert(object_id, object.clone());
        object
    }

    fn get(&self, id: &ObjectID) -> Result<&MockObject> {
        self.objects
            .get(id)
            .ok_or_else(|| anyhow!("Object {} does not exist", id))
    }

    fn check_version(&self, object_ref: &ObjectRef) -> Result<&MockObject> {
        let current = self.get(&object_ref.object_id)?;
        if current.version != object_ref.version || current.digest != object_ref.digest {
            bail!(
                "Object {} version {} is unavailable for consumption, current version: {}",
                object_ref.object_id,
                object_ref.version,
                current.version
            );
        }
        Ok(current)
    }
}

fn object_digest(tx: &TransactionDigest, id: &ObjectID, version: SequenceNumber) -> ObjectDigest {
    Digest::new(blake2b256([
        &tx.as_bytes()[..],
        &id.as_bytes()[..],
        &version.to_le_bytes()[..],
    ]))
}

fn coin_object_type(coin_type: &str) -> String {
    format!("0x2::coin::Coin<{}>", coin_type)
}

fn normalize_coin_type(coin_type: &str) -> String {
    normalize_struct_tag(coin_type).unwrap_or_else(|_| coin_type.to_string())
}

fn programmable(tx: &TransactionData) -> &ProgrammableTransaction {
    let TransactionKind::ProgrammableTransaction(pt) = &tx.v1().kind;
    pt
}

/// Objects a transaction takes by value or mutable reference, with the
/// versions it expects.
fn owned_inputs(tx: &TransactionData) -> Vec<ObjectRef> {
    let mut refs: Vec<ObjectRef> = tx.v1().gas_data.payment.clone();
    for input in &programmable(tx).inputs {
        if let CallArg::Object(ObjectArg::ImmOrOwnedObject(r) | ObjectArg::Receiving(r)) = input {
            refs.push(*r);
        }
    }
    refs
}

/// In-memory ledger. See the module documentation.
pub struct MockLedger {
    state: Mutex<LedgerState>,
    execution_delay: Mutex<Duration>,
    object_fetches: AtomicUsize,
    gas_price_fetches: AtomicUsize,
    dry_runs: AtomicUsize,
    function_fetches: AtomicUsize,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            execution_delay: Mutex::new(Duration::ZERO),
            object_fetches: AtomicUsize::new(0),
            gas_price_fetches: AtomicUsize::new(0),
            dry_runs: AtomicUsize::new(0),
            function_fetches: AtomicUsize::new(0),
        }
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// A SUI coin owned by `owner`.
    pub fn add_coin(&self, owner: SuiAddress, balance: u64) -> ObjectRef {
        self.add_coin_of_type(owner, SUI_TYPE, balance)
    }

    pub fn add_coin_of_type(&self, owner: SuiAddress, coin_type: &str, balance: u64) -> ObjectRef {
        let coin_type = normalize_coin_type(coin_type);
        self.state
            .lock()
            .insert(
                Owner::AddressOwner(owner),
                Some(coin_object_type(&coin_type)),
                Some(coin_type),
                balance,
            )
            .object_ref()
    }

    pub fn add_owned_object(&self, owner: SuiAddress, object_type: &str) -> ObjectRef {
        self.state
            .lock()
            .insert(
                Owner::AddressOwner(owner),
                Some(object_type.to_string()),
                None,
                0,
            )
            .object_ref()
    }

    /// A shared object whose initial shared version is 1.
    pub fn add_shared_object(&self, object_type: &str) -> ObjectID {
        self.state
            .lock()
            .insert(
                Owner::Shared {
                    initial_shared_version: 1,
                },
                Some(object_type.to_string()),
                None,
                0,
            )
            .object_id
    }

    pub fn add_immutable_object(&self, object_type: &str) -> ObjectRef {
        self.state
            .lock()
            .insert(Owner::Immutable, Some(object_type.to_string()), None, 0)
            .object_ref()
    }

    pub fn add_move_function(
        &self,
        package: ObjectID,
        module: &str,
        function: &str,
        definition: MoveFunction,
    ) {
        self.state
            .lock()
            .move_functions
            .insert(move_function_key(&package, module, function), definition);
    }

    pub fn add_package_name(&self, name: &str, package: ObjectID) {
        self.state
            .lock()
            .package_names
            .insert(name.to_string(), package);
    }

    pub fn add_type_name(&self, name: &str, resolved: &str) {
        self.state
            .lock()
            .type_names
            .insert(name.to_string(), resolved.to_string());
    }

    // =========================================================================
    // Behaviour knobs
    // =========================================================================

    pub fn set_reference_gas_price(&self, price: u64) {
        self.state.lock().system_state.reference_gas_price = price;
    }

    pub fn set_system_state(&self, system_state: SystemState) {
        self.state.lock().system_state = system_state;
    }

    /// Cost reported by dry runs and charged by executions.
    pub fn set_gas_cost(&self, gas_cost: GasCostSummary) {
        self.state.lock().gas_cost = gas_cost;
    }

    /// Make dry runs report a failed execution with this failure kind.
    pub fn fail_dry_runs(&self, kind: &str) {
        self.state.lock().dry_run_failure = Some(kind.to_string());
    }

    /// Calls to `package::module::function` abort with `code`.
    pub fn abort_move_call(&self, package: ObjectID, module: &str, function: &str, code: u64) {
        self.state
            .lock()
            .aborts
            .insert(move_function_key(&package, module, function), code);
    }

    /// Reject the next `count` submissions at the transport level.
    pub fn fail_next_submissions(&self, count: usize) {
        self.state.lock().failing_submissions = count;
    }

    /// Time each execution spends between input checks and commit.
    pub fn set_execution_delay(&self, delay: Duration) {
        *self.execution_delay.lock() = delay;
    }

    /// Number of status polls that report "unknown" before a transaction shows up.
    pub fn set_status_delay_polls(&self, polls: usize) {
        self.state.lock().status_delay_polls = polls;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn object(&self, id: &ObjectID) -> Option<MockObject> {
        self.state.lock().objects.get(id).cloned()
    }

    pub fn balance(&self, id: &ObjectID) -> Option<u64> {
        self.object(id).map(|o| o.balance)
    }

    pub fn is_deleted(&self, id: &ObjectID) -> bool {
        self.state.lock().deleted.contains_key(id)
    }

    /// SUI coins owned by `owner`.
    pub fn coins_owned_by(&self, owner: SuiAddress) -> Vec<MockObject> {
        let sui = normalize_coin_type(SUI_TYPE);
        self.state
            .lock()
            .objects
            .values()
            .filter(|o| o.owner == Owner::AddressOwner(owner))
            .filter(|o| o.coin_type.as_deref() == Some(sui.as_str()))
            .cloned()
            .collect()
    }

    /// Transactions that reached execution, in commit order.
    pub fn executed_transactions(&self) -> Vec<TransactionData> {
        self.state.lock().executed.clone()
    }

    /// Times an execution started while another one held one of its owned inputs.
    pub fn conflicting_executions(&self) -> usize {
        self.state.lock().conflicts
    }

    pub fn object_fetches(&self) -> usize {
        self.object_fetches.load(Ordering::SeqCst)
    }

    pub fn gas_price_fetches(&self) -> usize {
        self.gas_price_fetches.load(Ordering::SeqCst)
    }

    pub fn dry_runs(&self) -> usize {
        self.dry_runs.load(Ordering::SeqCst)
    }

    pub fn function_fetches(&self) -> usize {
        self.function_fetches.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    fn validate_inputs(state: &LedgerState, tx: &TransactionData) -> Result<()> {
        let gas = &tx.v1().gas_data;
        if gas.payment.is_empty() {
            bail!("Transaction has no gas payment");
        }
        for payment in &gas.payment {
            let coin = state.check_version(payment)?;
            if coin.owner != Owner::AddressOwner(gas.owner) {
                bail!(
                    "Gas object {} is not owned by {}",
                    payment.object_id,
                    gas.owner
                );
            }
        }
        for object_ref in owned_inputs(tx) {
            state.check_version(&object_ref)?;
        }
        for input in &programmable(tx).inputs {
            if let CallArg::Object(ObjectArg::SharedObject { id, .. }) = input {
                let object = state.get(id)?;
                if object.owner.initial_shared_version().is_none() {
                    bail!("Object {} is not shared", id);
                }
            }
        }
        Ok(())
    }

    fn execute(&self, tx: &TransactionData, digest: TransactionDigest) -> Result<ExecuteResult> {
        let mut state = self.state.lock();
        Self::validate_inputs(&state, tx)?;
        let v1 = tx.v1();
        let pt = programmable(tx);
        let gas_cost = state.gas_cost;

        let total_gas: u64 = v1
            .gas_data
            .payment
            .iter()
            .filter_map(|r| state.objects.get(&r.object_id))
            .map(|o| o.balance)
            .sum();
        if total_gas < v1.gas_data.budget {
            bail!(
                "Balance of gas object {} is lower than the needed amount: {}",
                v1.gas_data.payment[0].object_id,
                v1.gas_data.budget
            );
        }

        let mut lamport = 0;
        for object_ref in owned_inputs(tx) {
            lamport = lamport.max(object_ref.version);
        }
        for input in &pt.inputs {
            if let CallArg::Object(ObjectArg::SharedObject { id, .. }) = input {
                lamport = lamport.max(state.get(id)?.version);
            }
        }
        let lamport = lamport + 1;

        // Smash all payment coins into the first one.
        let gas_id = v1.gas_data.payment[0].object_id;
        let mut before = BTreeMap::new();
        before.insert(gas_id, Some(state.get(&gas_id)?.clone()));
        for extra in &v1.gas_data.payment[1..] {
            let removed = state
                .objects
                .remove(&extra.object_id)
                .ok_or_else(|| anyhow!("Object {} does not exist", extra.object_id))?;
            if let Some(gas) = state.objects.get_mut(&gas_id) {
                gas.balance = gas.balance.saturating_add(removed.balance);
            }
            before.insert(extra.object_id, Some(removed));
        }

        let snapshot = state.objects.clone();
        let mut run = CommandRun {
            state: &mut *state,
            sender: v1.sender,
            gas_id,
            inputs: &pt.inputs,
            results: Vec::new(),
            before,
        };
        for input in &pt.inputs {
            match input {
                CallArg::Object(ObjectArg::ImmOrOwnedObject(r)) => {
                    if run.state.get(&r.object_id)?.owner.is_owned() {
                        run.touch(&r.object_id)?;
                    }
                }
                CallArg::Object(ObjectArg::Receiving(r)) => run.touch(&r.object_id)?,
                CallArg::Object(ObjectArg::SharedObject {
                    id, mutable: true, ..
                }) => run.touch(id)?,
                _ => {}
            }
        }
        let inputs_touched: Vec<ObjectID> = run.before.keys().copied().collect();

        let mut status = ExecutionStatus::Success;
        for (index, command) in pt.commands.iter().enumerate() {
            if let Err(error) = run.apply(command) {
                status = ExecutionStatus::Failure {
                    error,
                    command: Some(index as u64),
                };
                break;
            }
        }

        let CommandRun { mut before, .. } = run;
        if !status.is_success() {
            state.objects = snapshot;
            before.retain(|id, _| inputs_touched.contains(id));
        }

        let charge = gas_cost
            .computation_cost
            .saturating_add(gas_cost.storage_cost)
            .saturating_sub(gas_cost.storage_rebate);
        if let Some(gas) = state.objects.get_mut(&gas_id) {
            gas.balance = gas.balance.saturating_sub(charge);
        }

        let mut changed_objects = Vec::new();
        let mut gas_object_index = None;
        for (id, previous) in before {
            let input_state = match &previous {
                Some(object) => ObjectIn::Exist {
                    version: object.version,
                    digest: object.digest,
                    owner: object.owner,
                },
                None => ObjectIn::NotExist,
            };
            let (output_state, exists) = match state.objects.get_mut(&id) {
                Some(object) => {
                    object.version = lamport;
                    object.digest = object_digest(&digest, &id, lamport);
                    (
                        ObjectOut::ObjectWrite {
                            digest: object.digest,
                            owner: object.owner,
                        },
                        true,
                    )
                }
                None => (ObjectOut::NotExist, false),
            };
            let id_operation = match (previous.is_some(), exists) {
                (false, true) => IdOperation::Created,
                (true, false) => IdOperation::Deleted,
                (false, false) => continue,
                (true, true) => IdOperation::None,
            };
            if !exists {
                if let Some(previous) = &previous {
                    state
                        .deleted
                        .insert(id, (previous.version, previous.digest));
                }
            }
            if id == gas_id {
                gas_object_index = Some(changed_objects.len() as u32);
            }
            changed_objects.push((
                id,
                EffectsObjectChange {
                    input_state,
                    output_state,
                    id_operation,
                },
            ));
        }

        let mut unchanged_shared_objects = Vec::new();
        for input in &pt.inputs {
            if let CallArg::Object(ObjectArg::SharedObject {
                id, mutable: false, ..
            }) = input
            {
                let object = state.get(id)?;
                unchanged_shared_objects.push((
                    *id,
                    UnchangedSharedKind::ReadOnlyRoot {
                        version: object.version,
                        digest: object.digest,
                    },
                ));
            }
        }

        let effects = TransactionEffects::V2(TransactionEffectsV2 {
            status,
            executed_epoch: state.system_state.epoch,
            gas_used: gas_cost,
            transaction_digest: digest,
            gas_object_index,
            events_digest: None,
            dependencies: vec![],
            lamport_version: lamport,
            changed_objects,
            unchanged_shared_objects,
            aux_data_digest: None,
        });
        let raw_effects = transaction_effects_codec().to_bytes(&effects)?;
        let result = ExecuteResult {
            digest,
            raw_effects,
        };
        state.transactions.insert(digest, result.clone());
        state.executed.push(tx.clone());
        Ok(result)
    }
}

/// Mutable view of the ledger while one transaction's commands run.
struct CommandRun<'a> {
    state: &'a mut LedgerState,
    sender: SuiAddress,
    gas_id: ObjectID,
    inputs: &'a [CallArg],
    results: Vec<Vec<ObjectID>>,
    /// State of every touched object before execution; `None` when created here.
    before: BTreeMap<ObjectID, Option<MockObject>>,
}

impl CommandRun<'_> {
    fn touch(&mut self, id: &ObjectID) -> Result<()> {
        if !self.before.contains_key(id) {
            let object = self.state.get(id)?.clone();
            self.before.insert(*id, Some(object));
        }
        Ok(())
    }

    fn object_mut(&mut self, id: &ObjectID) -> Result<&mut MockObject> {
        self.touch(id)?;
        self.state
            .objects
            .get_mut(id)
            .ok_or_else(|| anyhow!("Object {} does not exist", id))
    }

    fn remove(&mut self, id: &ObjectID) -> Result<MockObject> {
        self.touch(id)?;
        self.state
            .objects
            .remove(id)
            .ok_or_else(|| anyhow!("Object {} does not exist", id))
    }

    fn create(&mut self, coin_type: &str, balance: u64) -> ObjectID {
        let object = self.state.insert(
            Owner::AddressOwner(self.sender),
            Some(coin_object_type(coin_type)),
            Some(coin_type.to_string()),
            balance,
        );
        self.before.insert(object.object_id, None);
        object.object_id
    }

    fn objects(&self, argument: &Argument) -> std::result::Result<Vec<ObjectID>, ExecutionFailure> {
        let invalid = || ExecutionFailure::new("InvalidValueUsage");
        match argument {
            Argument::GasCoin => Ok(vec![self.gas_id]),
            Argument::Input(index) => match self.inputs.get(*index as usize) {
                Some(CallArg::Object(arg)) => Ok(vec![arg.id()]),
                _ => Err(invalid()),
            },
            Argument::Result(index) => self.results.get(*index as usize).cloned().ok_or_else(invalid),
            Argument::NestedResult(index, nested) => self
                .results
                .get(*index as usize)
                .and_then(|r| r.get(*nested as usize))
                .map(|id| vec![*id])
                .ok_or_else(invalid),
        }
    }

    fn single_object(&self, argument: &Argument) -> std::result::Result<ObjectID, ExecutionFailure> {
        match self.objects(argument)?.as_slice() {
            [id] => Ok(*id),
            _ => Err(ExecutionFailure::new("InvalidValueUsage")),
        }
    }

    fn pure(&self, argument: &Argument) -> std::result::Result<&[u8], ExecutionFailure> {
        match argument {
            Argument::Input(index) => match self.inputs.get(*index as usize) {
                Some(CallArg::Pure(bytes)) => Ok(bytes),
                _ => Err(ExecutionFailure::new("InvalidUsageOfPureArg")),
            },
            _ => Err(ExecutionFailure::new("InvalidUsageOfPureArg")),
        }
    }

    fn coin_mut(&mut self, id: &ObjectID) -> std::result::Result<&mut MockObject, ExecutionFailure> {
        let coin = self
            .object_mut(id)
            .map_err(|_| ExecutionFailure::new("InputObjectDeleted"))?;
        if coin.coin_type.is_none() {
            return Err(ExecutionFailure::new("InvalidTransferObject"));
        }
        Ok(coin)
    }

    fn apply(&mut self, command: &Command) -> std::result::Result<(), ExecutionFailure> {
        let produced = match command {
            Command::SplitCoins(coin, amounts) => {
                let coin_id = self.single_object(coin)?;
                let mut splits = Vec::with_capacity(amounts.len());
                for amount in amounts {
                    let bytes: [u8; 8] = self
                        .pure(amount)?
                        .try_into()
                        .map_err(|_| ExecutionFailure::new("InvalidBCSBytes"))?;
                    splits.push(u64::from_le_bytes(bytes));
                }
                let source = self.coin_mut(&coin_id)?;
                let total: u64 = splits.iter().sum();
                if source.balance < total {
                    return Err(ExecutionFailure::new("InsufficientCoinBalance"));
                }
                source.balance -= total;
                let coin_type = source.coin_type.clone().unwrap_or_default();
                splits
                    .into_iter()
                    .map(|amount| self.create(&coin_type, amount))
                    .collect()
            }
            Command::MergeCoins(destination, sources) => {
                let destination = self.single_object(destination)?;
                let mut total = 0u64;
                for source in sources {
                    let source = self.single_object(source)?;
                    let removed = self
                        .remove(&source)
                        .map_err(|_| ExecutionFailure::new("InputObjectDeleted"))?;
                    total = total.saturating_add(removed.balance);
                }
                self.coin_mut(&destination)?.balance += total;
                vec![]
            }
            Command::TransferObjects(objects, recipient) => {
                let bytes = self.pure(recipient)?;
                let recipient = SuiAddress::from_bytes(bytes)
                    .map_err(|_| ExecutionFailure::new("InvalidBCSBytes"))?;
                for argument in objects {
                    for id in self.objects(argument)? {
                        self.object_mut(&id)
                            .map_err(|_| ExecutionFailure::new("InputObjectDeleted"))?
                            .owner = Owner::AddressOwner(recipient);
                    }
                }
                vec![]
            }
            Command::MoveCall(call) => {
                let key = move_function_key(&call.package, &call.module, &call.function);
                if let Some(code) = self.state.aborts.get(&key) {
                    return Err(ExecutionFailure {
                        kind: "MoveAbort".to_string(),
                        details: Some(abort_details(call.package, &call.module, &call.function, *code)),
                    });
                }
                if call.package == SuiAddress::from_u16(2)
                    && call.module == "coin"
                    && call.function == "zero"
                {
                    let coin_type = call
                        .type_arguments
                        .first()
                        .map(|t| normalize_coin_type(&t.to_string()))
                        .unwrap_or_else(|| normalize_coin_type(SUI_TYPE));
                    vec![self.create(&coin_type, 0)]
                } else {
                    vec![]
                }
            }
            Command::MakeMoveVec(_, elements) => {
                let mut ids = Vec::new();
                for element in elements {
                    if let Ok(found) = self.objects(element) {
                        ids.extend(found);
                    }
                }
                ids
            }
            Command::Publish(..) | Command::Upgrade(..) => {
                return Err(ExecutionFailure::new("FeatureNotYetSupported"));
            }
        };
        self.results.push(produced);
        Ok(())
    }
}

fn abort_details(package: ObjectID, module: &str, function: &str, code: u64) -> sui_bcs::BcsValue {
    use sui_bcs::{BcsValue, ToBcsValue};
    let location = BcsValue::structure([
        (
            "module",
            BcsValue::structure([
                ("address", package.to_bcs_value()),
                ("name", BcsValue::String(module.to_string())),
            ]),
        ),
        ("function", BcsValue::U16(0)),
        ("instruction", BcsValue::U16(0)),
        (
            "functionName",
            BcsValue::Option(Some(Box::new(BcsValue::String(function.to_string())))),
        ),
    ]);
    BcsValue::Tuple(vec![location, BcsValue::U64(code)])
}

#[async_trait]
impl SuiClient for MockLedger {
    async fn multi_get_objects(&self, ids: &[ObjectID]) -> Result<Vec<ObjectResponse>> {
        self.object_fetches.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        Ok(ids
            .iter()
            .map(|id| match (state.objects.get(id), state.deleted.get(id)) {
                (Some(object), _) => Ok(object.to_data()),
                (None, Some((version, digest))) => Err(ObjectResponseError::Deleted {
                    object_id: *id,
                    version: *version,
                    digest: *digest,
                }),
                (None, None) => Err(ObjectResponseError::NotExists { object_id: *id }),
            })
            .collect())
    }

    async fn get_coins(
        &self,
        owner: SuiAddress,
        coin_type: &str,
        cursor: Option<String>,
    ) -> Result<CoinPage> {
        let coin_type = normalize_coin_type(coin_type);
        let after: Option<ObjectID> = cursor.map(|c| c.parse()).transpose()?;
        let state = self.state.lock();
        let mut coins: Vec<CoinStruct> = state
            .objects
            .values()
            .filter(|o| o.owner == Owner::AddressOwner(owner))
            .filter(|o| o.coin_type.as_deref() == Some(coin_type.as_str()))
            .filter(|o| after.map_or(true, |after| o.object_id > after))
            .filter_map(MockObject::to_coin)
            .collect();
        let has_next_page = coins.len() > COINS_PAGE_SIZE;
        coins.truncate(COINS_PAGE_SIZE);
        let next_cursor = if has_next_page {
            coins.last().map(|c| c.coin_object_id.to_hex_literal())
        } else {
            None
        };
        Ok(CoinPage {
            data: coins,
            next_cursor,
            has_next_page,
        })
    }

    async fn dry_run_transaction(&self, tx_bytes: &[u8]) -> Result<DryRunResult> {
        self.dry_runs.fetch_add(1, Ordering::SeqCst);
        transaction_data_codec().parse(tx_bytes)?;
        let state = self.state.lock();
        let status = match &state.dry_run_failure {
            Some(kind) => ExecutionStatus::Failure {
                error: ExecutionFailure::new(kind.clone()),
                command: Some(0),
            },
            None => ExecutionStatus::Success,
        };
        let digest = transaction_digest(tx_bytes);
        Ok(DryRunResult {
            effects: TransactionEffects::V2(TransactionEffectsV2 {
                status,
                executed_epoch: state.system_state.epoch,
                gas_used: state.gas_cost,
                transaction_digest: digest,
                gas_object_index: None,
                events_digest: None,
                dependencies: vec![],
                lamport_version: 0,
                changed_objects: vec![],
                unchanged_shared_objects: vec![],
                aux_data_digest: None,
            }),
        })
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &[u8],
        signatures: &[String],
    ) -> Result<ExecuteResult> {
        if signatures.is_empty() {
            bail!("Transaction has no signatures");
        }
        let tx = transaction_data_codec().parse(tx_bytes)?;
        let digest = transaction_digest(tx_bytes);

        let touched: Vec<ObjectID> = {
            let mut state = self.state.lock();
            if state.failing_submissions > 0 {
                state.failing_submissions -= 1;
                bail!("Submission of transaction {} rejected", digest);
            }
            Self::validate_inputs(&state, &tx)?;
            let touched: Vec<ObjectID> = owned_inputs(&tx)
                .iter()
                .map(|r| r.object_id)
                .filter(|id| state.objects.get(id).is_some_and(|o| o.owner.is_owned()))
                .collect();
            let mut conflict = false;
            for id in &touched {
                let holders = state.in_flight.entry(*id).or_insert(0);
                conflict |= *holders > 0;
                *holders += 1;
            }
            if conflict {
                state.conflicts += 1;
            }
            touched
        };

        let delay = *self.execution_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        {
            let mut state = self.state.lock();
            for id in &touched {
                if let Some(holders) = state.in_flight.get_mut(id) {
                    *holders = holders.saturating_sub(1);
                }
            }
        }
        self.execute(&tx, digest)
    }

    async fn get_reference_gas_price(&self) -> Result<u64> {
        self.gas_price_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().system_state.reference_gas_price)
    }

    async fn get_latest_system_state(&self) -> Result<SystemState> {
        Ok(self.state.lock().system_state)
    }

    async fn get_normalized_move_function(
        &self,
        package: &ObjectID,
        module: &str,
        function: &str,
    ) -> Result<MoveFunction> {
        self.function_fetches.fetch_add(1, Ordering::SeqCst);
        let key = move_function_key(package, module, function);
        self.state
            .lock()
            .move_functions
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow!("Function {} not found", key))
    }

    async fn get_transaction_status(
        &self,
        digest: &TransactionDigest,
    ) -> Result<Option<ExecuteResult>> {
        let mut state = self.state.lock();
        let delay = state.status_delay_polls;
        let polls = state.status_polls.entry(*digest).or_insert(0);
        *polls += 1;
        if *polls <= delay {
            return Ok(None);
        }
        Ok(state.transactions.get(digest).cloned())
    }

    async fn resolve_package_names(&self, names: &[String]) -> Result<HashMap<String, ObjectID>> {
        let state = self.state.lock();
        Ok(names
            .iter()
            .filter_map(|name| Some((name.clone(), *state.package_names.get(name)?)))
            .collect())
    }

    async fn resolve_type_names(&self, types: &[String]) -> Result<HashMap<String, String>> {
        let state = self.state.lock();
        Ok(types
            .iter()
            .filter_map(|name| Some((name.clone(), state.type_names.get(name)?.clone())))
            .collect())
    }
}
