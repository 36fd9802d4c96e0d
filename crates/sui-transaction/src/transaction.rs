//! The high-level transaction API.
//!
//! A [`Transaction`] owns its [`TransactionDataBuilder`] and its own
//! [`PluginRegistry`]. Inputs and commands are added with the typed helpers
//! below; anything the caller leaves out (object versions, gas, named
//! packages, intents) is filled in by the plugin pipeline when the
//! transaction is built.
//!
//! ```ignore
//! let mut tx = Transaction::new();
//! let amount = tx.pure_u64(1_000)?;
//! let coin = tx.split_coins(tx.gas(), vec![amount])?;
//! let to = tx.pure_address(recipient)?;
//! tx.transfer_objects(vec![coin.nested_result(0)], to)?;
//! tx.set_sender(sender);
//! let bytes = tx.build(&BuildOptions::with_client(client)).await?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use sui_bcs::{primitives, Codec, CodecExt, U256};
use sui_types::framework::{CLOCK_OBJECT_ID, RANDOM_OBJECT_ID, SYSTEM_STATE_OBJECT_ID};
use sui_types::{
    ObjectArg, ObjectID, ObjectRef, SequenceNumber, SuiAddress, TransactionDigest,
    TransactionExpiration,
};
use tracing::debug;

use crate::arguments::{Argument, InputKind, TransactionResult};
use crate::builder::{DataBuildOptions, TransactionDataBuilder};
use crate::commands::{Command, IntentInput, MoveCall};
use crate::error::{Result, TransactionError};
use crate::inputs::{CallArg, UnresolvedObject};
use crate::intents::CoinWithBalance;
use crate::plugin::{run_plugins, BuildOptions, PluginRef, PluginRegistry};
use crate::resolve::ResolveTransactionData;
use crate::signer::{SignedTransaction, Signer};

#[derive(Debug, Clone)]
pub struct Transaction {
    data: TransactionDataBuilder,
    plugins: PluginRegistry,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// An empty transaction with the default plugins.
    pub fn new() -> Self {
        Self::with_registry(PluginRegistry::with_defaults())
    }

    pub fn with_registry(plugins: PluginRegistry) -> Self {
        Self {
            data: TransactionDataBuilder::new(),
            plugins,
        }
    }

    /// Restore a transaction from BCS `TransactionData`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut tx = Self::new();
        tx.data = TransactionDataBuilder::from_bytes(bytes)?;
        Ok(tx)
    }

    /// Restore a transaction from BCS `TransactionKind`.
    pub fn from_kind_bytes(bytes: &[u8]) -> Result<Self> {
        let mut tx = Self::new();
        tx.data = TransactionDataBuilder::from_kind_bytes(bytes)?;
        Ok(tx)
    }

    /// Restore a transaction from its JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut tx = Self::new();
        tx.data = serde_json::from_str(json)?;
        Ok(tx)
    }

    /// An independent copy sharing plugin instances but not data.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn data(&self) -> &TransactionDataBuilder {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut TransactionDataBuilder {
        &mut self.data
    }

    // =========================================================================
    // Sender, expiration and gas
    // =========================================================================

    pub fn set_sender(&mut self, sender: SuiAddress) {
        self.data.sender = Some(sender);
    }

    pub fn set_sender_if_not_set(&mut self, sender: SuiAddress) {
        self.data.sender.get_or_insert(sender);
    }

    pub fn set_expiration(&mut self, expiration: TransactionExpiration) {
        self.data.expiration = Some(expiration);
    }

    pub fn set_gas_price(&mut self, price: u64) {
        self.data.gas_data.price = Some(price);
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.data.gas_data.budget = Some(budget);
    }

    pub fn set_gas_budget_if_not_set(&mut self, budget: u64) {
        self.data.gas_data.budget.get_or_insert(budget);
    }

    pub fn set_gas_owner(&mut self, owner: SuiAddress) {
        self.data.gas_data.owner = Some(owner);
    }

    pub fn set_gas_payment(&mut self, payment: Vec<ObjectRef>) {
        self.data.gas_data.payment = Some(payment);
    }

    /// The coin paying for gas, usable as a command argument.
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    // =========================================================================
    // Object inputs
    // =========================================================================

    /// Add an object input, reusing the slot when the same object is already
    /// an input. A shared object added twice stays mutable if either use is.
    fn add_object(&mut self, arg: CallArg) -> Result<Argument> {
        let Some(id) = arg.object_id() else {
            return self.data.add_input(InputKind::Object, arg);
        };
        let existing = self
            .data
            .inputs
            .iter()
            .position(|input| input.object_id() == Some(id));
        let Some(index) = existing else {
            return self.data.add_input(InputKind::Object, arg);
        };

        match (&mut self.data.inputs[index], &arg) {
            (
                CallArg::Object(ObjectArg::SharedObject { mutable, .. }),
                CallArg::Object(ObjectArg::SharedObject { mutable: extra, .. }),
            ) => *mutable |= *extra,
            (CallArg::UnresolvedObject(existing), CallArg::UnresolvedObject(extra)) => {
                if let Some(extra) = extra.mutable {
                    existing.mutable = Some(existing.mutable.unwrap_or(false) || extra);
                }
            }
            _ => {}
        }
        let index = u16::try_from(index).map_err(|_| TransactionError::TooManyInputs(index))?;
        Ok(Argument::input(index, InputKind::Object))
    }

    /// An object known only by id. Version and ownership are resolved at build time.
    pub fn object(&mut self, id: ObjectID) -> Result<Argument> {
        self.add_object(CallArg::UnresolvedObject(UnresolvedObject::new(id)))
    }

    pub fn unresolved_object(&mut self, object: UnresolvedObject) -> Result<Argument> {
        self.add_object(CallArg::UnresolvedObject(object))
    }

    pub fn object_ref(&mut self, object: ObjectRef) -> Result<Argument> {
        self.add_object(CallArg::object_ref(object))
    }

    pub fn shared_object(
        &mut self,
        id: ObjectID,
        initial_shared_version: SequenceNumber,
        mutable: bool,
    ) -> Result<Argument> {
        self.add_object(CallArg::shared_object(id, initial_shared_version, mutable))
    }

    pub fn receiving_object(&mut self, object: ObjectRef) -> Result<Argument> {
        self.add_object(CallArg::receiving(object))
    }

    /// The clock object, read-only.
    pub fn clock(&mut self) -> Result<Argument> {
        self.shared_object(CLOCK_OBJECT_ID, 1, false)
    }

    pub fn system_state(&mut self) -> Result<Argument> {
        self.shared_object(SYSTEM_STATE_OBJECT_ID, 1, true)
    }

    pub fn random(&mut self) -> Result<Argument> {
        self.object(RANDOM_OBJECT_ID)
    }

    // =========================================================================
    // Pure inputs
    // =========================================================================

    /// Encode `value` with `codec` and add it as a pure input.
    pub fn pure<T, C>(&mut self, codec: &C, value: &T) -> Result<Argument>
    where
        C: Codec<T> + ?Sized,
    {
        let bytes = codec.to_bytes(value)?;
        self.pure_bytes(bytes)
    }

    /// Add already-encoded BCS bytes as a pure input.
    pub fn pure_bytes(&mut self, bytes: Vec<u8>) -> Result<Argument> {
        self.data.add_input(InputKind::Pure, CallArg::Pure(bytes))
    }

    pub fn pure_u8(&mut self, value: u8) -> Result<Argument> {
        self.pure_bytes(vec![value])
    }

    pub fn pure_u16(&mut self, value: u16) -> Result<Argument> {
        self.pure_bytes(value.to_le_bytes().to_vec())
    }

    pub fn pure_u32(&mut self, value: u32) -> Result<Argument> {
        self.pure_bytes(value.to_le_bytes().to_vec())
    }

    pub fn pure_u64(&mut self, value: u64) -> Result<Argument> {
        self.pure_bytes(value.to_le_bytes().to_vec())
    }

    pub fn pure_u128(&mut self, value: u128) -> Result<Argument> {
        self.pure_bytes(value.to_le_bytes().to_vec())
    }

    pub fn pure_u256(&mut self, value: U256) -> Result<Argument> {
        self.pure(&primitives::u256(), &value)
    }

    pub fn pure_bool(&mut self, value: bool) -> Result<Argument> {
        self.pure_bytes(vec![value as u8])
    }

    pub fn pure_address(&mut self, value: SuiAddress) -> Result<Argument> {
        self.pure_bytes(value.to_vec())
    }

    pub fn pure_id(&mut self, value: ObjectID) -> Result<Argument> {
        self.pure_address(value)
    }

    pub fn pure_string(&mut self, value: &str) -> Result<Argument> {
        self.pure(&primitives::string(), &value.to_string())
    }

    /// A JSON value whose Move type is taken from how it is used.
    pub fn pure_value(&mut self, value: serde_json::Value) -> Result<Argument> {
        self.data
            .add_input(InputKind::Pure, CallArg::UnresolvedPure(value))
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Append a command and return a handle to its result.
    pub fn add(&mut self, command: Command) -> Result<TransactionResult> {
        Ok(TransactionResult::new(self.data.add_command(command)?))
    }

    /// Call `package::module::function`.
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: &[&str],
        arguments: Vec<Argument>,
    ) -> Result<TransactionResult> {
        let mut parts = target.splitn(3, "::");
        let (Some(package), Some(module), Some(function)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(TransactionError::InvalidArgument(format!(
                "Invalid move call target '{}', expected package::module::function",
                target
            )));
        };
        self.add(Command::MoveCall(MoveCall {
            package: package.to_string(),
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: type_arguments.iter().map(|t| t.to_string()).collect(),
            arguments,
            argument_types: None,
        }))
    }

    pub fn transfer_objects(
        &mut self,
        objects: Vec<Argument>,
        address: Argument,
    ) -> Result<TransactionResult> {
        self.add(Command::transfer_objects(objects, address))
    }

    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Result<TransactionResult> {
        self.add(Command::split_coins(coin, amounts))
    }

    pub fn merge_coins(
        &mut self,
        destination: Argument,
        sources: Vec<Argument>,
    ) -> Result<TransactionResult> {
        self.add(Command::merge_coins(destination, sources))
    }

    pub fn publish(
        &mut self,
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectID>,
    ) -> Result<TransactionResult> {
        self.add(Command::Publish {
            modules,
            dependencies,
        })
    }

    pub fn upgrade(
        &mut self,
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectID>,
        package: ObjectID,
        ticket: Argument,
    ) -> Result<TransactionResult> {
        self.add(Command::Upgrade {
            modules,
            dependencies,
            package,
            ticket,
        })
    }

    pub fn make_move_vec(
        &mut self,
        element_type: Option<&str>,
        elements: Vec<Argument>,
    ) -> Result<TransactionResult> {
        self.add(Command::MakeMoveVec {
            element_type: element_type.map(str::to_string),
            elements,
        })
    }

    /// Append an `$Intent` command for a registered (or caller-supported) resolver.
    pub fn add_intent(
        &mut self,
        name: &str,
        inputs: BTreeMap<String, IntentInput>,
        data: serde_json::Value,
    ) -> Result<TransactionResult> {
        self.add(Command::intent(name, inputs, data))
    }

    /// A coin holding exactly the requested balance, resolved at build time.
    pub fn coin_with_balance(&mut self, request: CoinWithBalance) -> Result<TransactionResult> {
        self.add(request.to_command()?)
    }

    // =========================================================================
    // Plugins
    // =========================================================================

    pub fn add_build_plugin(&mut self, plugin: PluginRef) {
        self.plugins.build.push(plugin);
    }

    pub fn add_serialization_plugin(&mut self, plugin: PluginRef) {
        self.plugins.serialization.push(plugin);
    }

    pub fn add_intent_resolver(&mut self, intent: &str, resolver: PluginRef) {
        self.plugins
            .intent_resolvers
            .insert(intent.to_string(), resolver);
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    // =========================================================================
    // Resolution and output
    // =========================================================================

    /// Run serialization plugins and the resolvers of every intent present.
    pub async fn prepare_for_serialization(&mut self, options: &BuildOptions) -> Result<()> {
        let mut steps = self.plugins.serialization.clone();
        let mut intents: Vec<&str> = Vec::new();
        for command in &self.data.commands {
            if let Command::Intent(intent) = command {
                if !intents.contains(&intent.name.as_str()) {
                    intents.push(&intent.name);
                }
            }
        }
        for name in intents {
            if options.supported_intents.iter().any(|s| s == name) {
                continue;
            }
            let resolver = self
                .plugins
                .intent_resolvers
                .get(name)
                .ok_or_else(|| TransactionError::MissingIntentResolver(name.to_string()))?;
            steps.push(Arc::clone(resolver));
        }
        run_plugins(&steps, &mut self.data, options).await
    }

    async fn prepare_build(&mut self, options: &BuildOptions) -> Result<()> {
        if !options.only_transaction_kind && self.data.sender.is_none() {
            return Err(TransactionError::MissingField("transaction sender"));
        }
        let mut steps = self.plugins.build.clone();
        steps.push(Arc::new(ResolveTransactionData));
        run_plugins(&steps, &mut self.data, options).await
    }

    /// Resolve everything and return canonical BCS bytes.
    pub async fn build(&mut self, options: &BuildOptions) -> Result<Vec<u8>> {
        self.prepare_for_serialization(options).await?;
        self.prepare_build(options).await?;
        let bytes = self.data.build(&DataBuildOptions {
            only_transaction_kind: options.only_transaction_kind,
            overrides: None,
        })?;
        debug!(bytes = bytes.len(), "built transaction");
        Ok(bytes)
    }

    pub async fn get_digest(&mut self, options: &BuildOptions) -> Result<TransactionDigest> {
        self.prepare_for_serialization(options).await?;
        self.prepare_build(options).await?;
        self.data.get_digest()
    }

    /// Build and sign. The signer becomes the sender if none is set.
    pub async fn sign(
        &mut self,
        signer: &dyn Signer,
        options: &BuildOptions,
    ) -> Result<SignedTransaction> {
        self.set_sender_if_not_set(signer.to_sui_address());
        let bytes = self.build(options).await?;
        signer.sign_transaction(&bytes).await
    }

    /// JSON snapshot after running the serialization plugins.
    pub async fn to_json(&mut self, options: &BuildOptions) -> Result<String> {
        self.prepare_for_serialization(options).await?;
        Ok(serde_json::to_string(&self.data.snapshot()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sender() -> SuiAddress {
        SuiAddress::new([4; 32])
    }

    #[test]
    fn test_objects_are_deduplicated() {
        let mut tx = Transaction::new();
        let id = SuiAddress::from_u16(0x77);
        let first = tx.shared_object(id, 3, false).unwrap();
        let second = tx.shared_object(id, 3, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(tx.data().inputs, vec![CallArg::shared_object(id, 3, true)]);

        let clock = tx.clock().unwrap();
        assert_eq!(clock.input_index(), Some(1));
        assert_eq!(tx.clock().unwrap(), clock);
    }

    #[test]
    fn test_pure_inputs_encode_through_codecs() {
        let mut tx = Transaction::new();
        let amounts = sui_bcs::composite::vector(primitives::u64());
        let list = tx.pure(&amounts, &vec![1u64, 2]).unwrap();
        let name = tx.pure_string("sui").unwrap();
        let big = tx.pure_u256(U256::from(7u64)).unwrap();

        assert_eq!(list.input_index(), Some(0));
        assert_eq!(name.input_index(), Some(1));
        assert_eq!(big.input_index(), Some(2));

        let mut expected_list = vec![2u8];
        expected_list.extend_from_slice(&1u64.to_le_bytes());
        expected_list.extend_from_slice(&2u64.to_le_bytes());
        let mut expected_big = vec![0u8; 32];
        expected_big[0] = 7;
        assert_eq!(
            tx.data().inputs,
            vec![
                CallArg::Pure(expected_list),
                CallArg::Pure(vec![3, b's', b'u', b'i']),
                CallArg::Pure(expected_big),
            ]
        );
    }

    #[test]
    fn test_move_call_target_is_validated() {
        let mut tx = Transaction::new();
        assert!(matches!(
            tx.move_call("0x2::coin", &[], vec![]),
            Err(TransactionError::InvalidArgument(_))
        ));
        let result = tx
            .move_call("0x2::coin::zero", &["0x2::sui::SUI"], vec![])
            .unwrap();
        assert_eq!(result.command_index(), 0);
    }

    #[tokio::test]
    async fn test_offline_build_of_fully_specified_transaction() {
        let mut tx = Transaction::new();
        let amount = tx.pure_u64(100).unwrap();
        let coin = tx.split_coins(tx.gas(), vec![amount]).unwrap();
        let to = tx.pure_address(sender()).unwrap();
        tx.transfer_objects(vec![coin.nested_result(0)], to).unwrap();
        tx.set_sender(sender());
        tx.set_gas_price(1000);
        tx.set_gas_budget(5_000_000);
        tx.set_gas_payment(vec![]);

        let options = BuildOptions::default();
        let bytes = tx.build(&options).await.unwrap();
        let digest = tx.get_digest(&options).await.unwrap();
        assert_eq!(digest, sui_types::transaction_digest(&bytes));

        let mut restored = Transaction::from_bytes(&bytes).unwrap();
        assert_eq!(restored.build(&options).await.unwrap(), bytes);

        tx.set_gas_budget(5_000_001);
        assert_ne!(tx.get_digest(&options).await.unwrap(), digest);
    }

    #[tokio::test]
    async fn test_missing_sender_fails_before_resolution() {
        let mut tx = Transaction::new();
        let err = tx.build(&BuildOptions::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing transaction sender");
    }

    #[tokio::test]
    async fn test_unknown_intent_needs_a_resolver() {
        let mut tx = Transaction::new();
        tx.add_intent("Custom", BTreeMap::new(), json!({})).unwrap();
        tx.set_sender(sender());

        let err = tx.build(&BuildOptions::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing intent resolver for Custom");

        let options = BuildOptions {
            supported_intents: vec!["Custom".to_string()],
            ..BuildOptions::default()
        };
        let snapshot = tx.to_json(&options).await.unwrap();
        let restored = Transaction::from_json(&snapshot).unwrap();
        assert_eq!(restored.data(), tx.data());
    }

    #[tokio::test]
    async fn test_kind_only_build_skips_gas_and_sender() {
        let mut tx = Transaction::new();
        let flag = tx.pure_bool(true).unwrap();
        tx.make_move_vec(Some("bool"), vec![flag]).unwrap();
        let bytes = tx
            .build(&BuildOptions::default().kind_only())
            .await
            .unwrap();
        let restored = Transaction::from_kind_bytes(&bytes).unwrap();
        assert_eq!(
            restored.data().commands[0].to_wire().unwrap(),
            tx.data().commands[0].to_wire().unwrap()
        );
        assert_eq!(restored.data().sender, None);
    }
}
