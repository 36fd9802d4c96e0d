//! Object and Move-signature cache shared by the executors.
//!
//! The cache is a namespaced key/value store behind the [`AsyncCache`] trait,
//! so a persistent backend can replace [`InMemoryCache`]. [`ObjectCache`]
//! layers the typed operations on top:
//!
//! - objects, split into single-owner entries (forgotten on reset) and
//!   shared/immutable entries
//! - normalized Move function parameters keyed by `package::module::function`
//! - caller-chosen custom keys (the serial executor keeps its gas coin here)
//!
//! [`ObjectCache::as_plugin`] returns a build plugin that fills unresolved
//! inputs and Move call signatures from the cache before the resolution
//! stage runs, and records the signatures it resolved afterwards.
//! [`ObjectCache::apply_effects`] keeps the entries current after execution.
//!
//! # Example
//!
//! ```ignore
//! let cache = ObjectCache::new();
//! let mut tx = Transaction::new();
//! tx.add_build_plugin(cache.as_plugin());
//! let bytes = tx.build(&BuildOptions::with_client(client.clone())).await?;
//! let result = client.execute_transaction(&bytes, &[signature]).await?;
//! cache.apply_effects(&result.effects()?).await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sui_transaction::{
    BuildOptions, CallArg, Command, Next, PluginRef, TransactionDataBuilder, TransactionPlugin,
};
use sui_transport::{move_function_key, MoveType};
use sui_types::effects::ObjectOut;
use sui_types::{
    ObjectDigest, ObjectID, ObjectRef, Owner, SequenceNumber, SuiAddress, TransactionEffects,
};
use tracing::{debug, trace};

use crate::metrics::CacheMetrics;

/// Name of the plugin returned by [`ObjectCache::as_plugin`].
pub const OBJECT_CACHE_PLUGIN: &str = "objectCachePlugin";

// =============================================================================
// Entries
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    OwnedObject,
    SharedOrImmutableObject,
    MoveFunction,
    Custom,
}

impl CacheNamespace {
    pub const ALL: [CacheNamespace; 4] = [
        CacheNamespace::OwnedObject,
        CacheNamespace::SharedOrImmutableObject,
        CacheNamespace::MoveFunction,
        CacheNamespace::Custom,
    ];
}

/// Latest known reference of an object.
///
/// `owner` is set for address- and object-owned objects;
/// `initial_shared_version` for shared ones. Immutable objects have neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectCacheEntry {
    pub object_id: ObjectID,
    pub version: SequenceNumber,
    pub digest: ObjectDigest,
    pub owner: Option<SuiAddress>,
    pub initial_shared_version: Option<SequenceNumber>,
}

impl ObjectCacheEntry {
    /// Entry for an object written at `version` with the given owner.
    pub fn new(
        object_id: ObjectID,
        version: SequenceNumber,
        digest: ObjectDigest,
        owner: &Owner,
    ) -> Self {
        let owner_address = match owner {
            Owner::AddressOwner(address) | Owner::ObjectOwner(address) => Some(*address),
            _ => None,
        };
        Self {
            object_id,
            version,
            digest,
            owner: owner_address,
            initial_shared_version: owner.initial_shared_version(),
        }
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_id, self.version, self.digest)
    }

    fn namespace(&self) -> CacheNamespace {
        if self.owner.is_some() {
            CacheNamespace::OwnedObject
        } else {
            CacheNamespace::SharedOrImmutableObject
        }
    }
}

/// Parameter types of a Move function, trailing `TxContext` removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveFunctionCacheEntry {
    pub package: ObjectID,
    pub module: String,
    pub function: String,
    pub parameters: Vec<MoveType>,
}

impl MoveFunctionCacheEntry {
    fn key(&self) -> String {
        move_function_key(&self.package, &self.module, &self.function)
    }
}

/// A value stored in one of the cache namespaces.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Object(ObjectCacheEntry),
    MoveFunction(MoveFunctionCacheEntry),
    Custom(serde_json::Value),
}

// =============================================================================
// Backends
// =============================================================================

/// Namespaced key/value storage behind an [`ObjectCache`].
#[async_trait]
pub trait AsyncCache: Send + Sync {
    async fn get(&self, namespace: CacheNamespace, key: &str) -> Result<Option<CacheValue>>;

    async fn set(&self, namespace: CacheNamespace, key: &str, value: CacheValue) -> Result<()>;

    async fn delete(&self, namespace: CacheNamespace, key: &str) -> Result<()>;

    /// Clear one namespace, or all of them when `namespace` is `None`.
    async fn clear(&self, namespace: Option<CacheNamespace>) -> Result<()>;
}

/// In-memory backend.
///
/// Thread-safe via internal RwLocks, one map per namespace.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    owned_objects: RwLock<HashMap<String, CacheValue>>,
    shared_objects: RwLock<HashMap<String, CacheValue>>,
    move_functions: RwLock<HashMap<String, CacheValue>>,
    custom: RwLock<HashMap<String, CacheValue>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, namespace: CacheNamespace) -> &RwLock<HashMap<String, CacheValue>> {
        match namespace {
            CacheNamespace::OwnedObject => &self.owned_objects,
            CacheNamespace::SharedOrImmutableObject => &self.shared_objects,
            CacheNamespace::MoveFunction => &self.move_functions,
            CacheNamespace::Custom => &self.custom,
        }
    }

    /// Number of entries in `namespace`.
    pub fn len(&self, namespace: CacheNamespace) -> usize {
        self.map(namespace).read().len()
    }

    pub fn is_empty(&self) -> bool {
        CacheNamespace::ALL
            .iter()
            .all(|namespace| self.map(*namespace).read().is_empty())
    }
}

#[async_trait]
impl AsyncCache for InMemoryCache {
    async fn get(&self, namespace: CacheNamespace, key: &str) -> Result<Option<CacheValue>> {
        Ok(self.map(namespace).read().get(key).cloned())
    }

    async fn set(&self, namespace: CacheNamespace, key: &str, value: CacheValue) -> Result<()> {
        self.map(namespace).write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, namespace: CacheNamespace, key: &str) -> Result<()> {
        self.map(namespace).write().remove(key);
        Ok(())
    }

    async fn clear(&self, namespace: Option<CacheNamespace>) -> Result<()> {
        match namespace {
            Some(namespace) => self.map(namespace).write().clear(),
            None => {
                for namespace in CacheNamespace::ALL {
                    self.map(namespace).write().clear();
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// ObjectCache
// =============================================================================

fn object_key(id: &ObjectID) -> String {
    id.to_hex_literal()
}

/// Typed view over an [`AsyncCache`]. Clones share the backend and metrics.
#[derive(Clone)]
pub struct ObjectCache {
    backend: Arc<dyn AsyncCache>,
    metrics: CacheMetrics,
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCache")
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

impl ObjectCache {
    /// A cache backed by a fresh [`InMemoryCache`].
    pub fn new() -> Self {
        Self::with_backend(Arc::new(InMemoryCache::new()))
    }

    pub fn with_backend(backend: Arc<dyn AsyncCache>) -> Self {
        Self {
            backend,
            metrics: CacheMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    // ==================== Objects ====================

    /// The cached entry for `id`, owned entries first.
    pub async fn get_object(&self, id: &ObjectID) -> Result<Option<ObjectCacheEntry>> {
        let key = object_key(id);
        for namespace in [
            CacheNamespace::OwnedObject,
            CacheNamespace::SharedOrImmutableObject,
        ] {
            if let Some(CacheValue::Object(entry)) = self.backend.get(namespace, &key).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// One entry per id, in order.
    pub async fn get_objects(&self, ids: &[ObjectID]) -> Result<Vec<Option<ObjectCacheEntry>>> {
        futures::future::try_join_all(ids.iter().map(|id| self.get_object(id))).await
    }

    pub async fn add_object(&self, entry: ObjectCacheEntry) -> Result<ObjectCacheEntry> {
        self.backend
            .set(
                entry.namespace(),
                &object_key(&entry.object_id),
                CacheValue::Object(entry),
            )
            .await?;
        Ok(entry)
    }

    pub async fn add_objects(&self, entries: Vec<ObjectCacheEntry>) -> Result<()> {
        futures::future::try_join_all(entries.into_iter().map(|entry| self.add_object(entry)))
            .await?;
        Ok(())
    }

    /// Forget `id` in both object namespaces.
    pub async fn delete_object(&self, id: &ObjectID) -> Result<()> {
        let key = object_key(id);
        self.backend
            .delete(CacheNamespace::OwnedObject, &key)
            .await?;
        self.backend
            .delete(CacheNamespace::SharedOrImmutableObject, &key)
            .await
    }

    pub async fn delete_objects(&self, ids: &[ObjectID]) -> Result<()> {
        futures::future::try_join_all(ids.iter().map(|id| self.delete_object(id))).await?;
        self.metrics.record_invalidations(ids.len() as u64);
        Ok(())
    }

    pub async fn clear_owned_objects(&self) -> Result<()> {
        self.backend.clear(Some(CacheNamespace::OwnedObject)).await
    }

    // ==================== Move functions ====================

    pub async fn get_move_function_definition(
        &self,
        package: &ObjectID,
        module: &str,
        function: &str,
    ) -> Result<Option<MoveFunctionCacheEntry>> {
        let key = move_function_key(package, module, function);
        match self.backend.get(CacheNamespace::MoveFunction, &key).await? {
            Some(CacheValue::MoveFunction(entry)) => Ok(Some(entry)),
            _ => Ok(None),
        }
    }

    pub async fn add_move_function_definition(&self, entry: MoveFunctionCacheEntry) -> Result<()> {
        let key = entry.key();
        self.backend
            .set(CacheNamespace::MoveFunction, &key, CacheValue::MoveFunction(entry))
            .await
    }

    pub async fn delete_move_function_definition(
        &self,
        package: &ObjectID,
        module: &str,
        function: &str,
    ) -> Result<()> {
        let key = move_function_key(package, module, function);
        self.backend.delete(CacheNamespace::MoveFunction, &key).await
    }

    // ==================== Custom keys ====================

    pub async fn get_custom<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(CacheNamespace::Custom, key).await? {
            Some(CacheValue::Custom(value)) => Ok(Some(serde_json::from_value(value)?)),
            _ => Ok(None),
        }
    }

    pub async fn set_custom<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.backend
            .set(CacheNamespace::Custom, key, CacheValue::Custom(value))
            .await
    }

    pub async fn delete_custom(&self, key: &str) -> Result<()> {
        self.backend.delete(CacheNamespace::Custom, key).await
    }

    pub async fn clear_custom(&self) -> Result<()> {
        self.backend.clear(Some(CacheNamespace::Custom)).await
    }

    /// Drop everything, in every namespace.
    pub async fn clear(&self) -> Result<()> {
        self.backend.clear(None).await
    }

    // ==================== Effects ====================

    /// Record every object written by `effects` at its new version and
    /// forget every object it removed.
    pub async fn apply_effects(&self, effects: &TransactionEffects) -> Result<()> {
        let effects = effects.v2();
        let mut written = Vec::new();
        let mut removed = Vec::new();
        for (id, change) in &effects.changed_objects {
            match &change.output_state {
                ObjectOut::NotExist => removed.push(*id),
                ObjectOut::ObjectWrite { digest, owner } => written.push(ObjectCacheEntry::new(
                    *id,
                    effects.lamport_version,
                    *digest,
                    owner,
                )),
                ObjectOut::PackageWrite { .. } => {}
            }
        }
        debug!(
            digest = %effects.transaction_digest,
            written = written.len(),
            removed = removed.len(),
            "applying effects to object cache"
        );
        self.add_objects(written).await?;
        self.delete_objects(&removed).await
    }

    /// A build plugin reading from and writing to this cache.
    pub fn as_plugin(&self) -> PluginRef {
        Arc::new(ObjectCachePlugin {
            cache: self.clone(),
        })
    }
}

// =============================================================================
// Plugin
// =============================================================================

struct ObjectCachePlugin {
    cache: ObjectCache,
}

impl ObjectCachePlugin {
    async fn fill_objects(&self, data: &mut TransactionDataBuilder) -> Result<()> {
        let ids: Vec<ObjectID> = data
            .inputs
            .iter()
            .filter_map(|input| match input {
                CallArg::UnresolvedObject(object) => Some(object.object_id),
                _ => None,
            })
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        let by_id: HashMap<ObjectID, ObjectCacheEntry> = self
            .cache
            .get_objects(&ids)
            .await?
            .into_iter()
            .flatten()
            .map(|entry| (entry.object_id, entry))
            .collect();

        for input in data.inputs.iter_mut() {
            let CallArg::UnresolvedObject(object) = input else {
                continue;
            };
            let Some(entry) = by_id.get(&object.object_id) else {
                self.cache.metrics.record_object_miss();
                continue;
            };
            self.cache.metrics.record_object_hit();
            trace!(object_id = %object.object_id, "object resolved from cache");
            match entry.initial_shared_version {
                Some(initial_shared_version) => {
                    object.initial_shared_version.get_or_insert(initial_shared_version);
                }
                None => {
                    object.version.get_or_insert(entry.version);
                    object.digest.get_or_insert(entry.digest);
                }
            }
        }
        Ok(())
    }

    async fn fill_move_functions(&self, data: &mut TransactionDataBuilder) -> Result<()> {
        for command in data.commands.iter_mut() {
            let Command::MoveCall(call) = command else {
                continue;
            };
            if call.argument_types.is_some() {
                continue;
            }
            let Some(package) = call.package_id() else {
                continue;
            };
            match self
                .cache
                .get_move_function_definition(&package, &call.module, &call.function)
                .await?
            {
                Some(entry) => {
                    self.cache.metrics.record_function_hit();
                    call.argument_types = Some(entry.parameters);
                }
                None => self.cache.metrics.record_function_miss(),
            }
        }
        Ok(())
    }

    async fn store_move_functions(&self, data: &TransactionDataBuilder) -> Result<()> {
        for command in &data.commands {
            let Command::MoveCall(call) = command else {
                continue;
            };
            let (Some(parameters), Some(package)) = (&call.argument_types, call.package_id())
            else {
                continue;
            };
            self.cache
                .add_move_function_definition(MoveFunctionCacheEntry {
                    package,
                    module: call.module.clone(),
                    function: call.function.clone(),
                    parameters: parameters.clone(),
                })
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionPlugin for ObjectCachePlugin {
    fn name(&self) -> &str {
        OBJECT_CACHE_PLUGIN
    }

    async fn process(
        &self,
        data: &mut TransactionDataBuilder,
        options: &BuildOptions,
        next: Next<'_>,
    ) -> sui_transaction::error::Result<()> {
        self.fill_objects(data).await?;
        self.fill_move_functions(data).await?;
        next.run(data, options).await?;
        self.store_move_functions(data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_transaction::Transaction;
    use sui_transport::test_utils::MockLedger;
    use sui_transport::{MoveFunction, SuiClient};
    use sui_types::effects::{EffectsObjectChange, ExecutionStatus, IdOperation, ObjectIn};
    use sui_types::{Digest, GasCostSummary, TransactionEffectsV2};

    fn entry(id: u16, owner: Option<SuiAddress>, isv: Option<u64>) -> ObjectCacheEntry {
        ObjectCacheEntry {
            object_id: SuiAddress::from_u16(id),
            version: 7,
            digest: Digest::new([id as u8; 32]),
            owner,
            initial_shared_version: isv,
        }
    }

    fn write(id: ObjectID, owner: Owner) -> (ObjectID, EffectsObjectChange) {
        (
            id,
            EffectsObjectChange {
                input_state: ObjectIn::NotExist,
                output_state: ObjectOut::ObjectWrite {
                    digest: Digest::new([9; 32]),
                    owner,
                },
                id_operation: IdOperation::Created,
            },
        )
    }

    fn effects(changed_objects: Vec<(ObjectID, EffectsObjectChange)>) -> TransactionEffects {
        TransactionEffects::V2(TransactionEffectsV2 {
            status: ExecutionStatus::Success,
            executed_epoch: 1,
            gas_used: GasCostSummary::default(),
            transaction_digest: Digest::new([1; 32]),
            gas_object_index: None,
            events_digest: None,
            dependencies: vec![],
            lamport_version: 12,
            changed_objects,
            unchanged_shared_objects: vec![],
            aux_data_digest: None,
        })
    }

    #[tokio::test]
    async fn test_owned_and_shared_namespaces() {
        let backend = Arc::new(InMemoryCache::new());
        let cache = ObjectCache::with_backend(backend.clone());
        let owner = SuiAddress::new([1; 32]);

        cache.add_object(entry(1, Some(owner), None)).await.unwrap();
        cache.add_object(entry(2, None, Some(3))).await.unwrap();
        assert_eq!(backend.len(CacheNamespace::OwnedObject), 1);
        assert_eq!(backend.len(CacheNamespace::SharedOrImmutableObject), 1);

        cache.clear_owned_objects().await.unwrap();
        let found = cache
            .get_objects(&[SuiAddress::from_u16(1), SuiAddress::from_u16(2)])
            .await
            .unwrap();
        assert_eq!(found[0], None);
        assert_eq!(found[1], Some(entry(2, None, Some(3))));
    }

    #[tokio::test]
    async fn test_custom_values_round_trip_through_json() {
        let cache = ObjectCache::new();
        let gas = ObjectRef::new(SuiAddress::from_u16(5), 4, Digest::new([2; 32]));
        cache.set_custom("gasCoin", &gas).await.unwrap();
        assert_eq!(cache.get_custom::<ObjectRef>("gasCoin").await.unwrap(), Some(gas));

        cache.clear_custom().await.unwrap();
        assert_eq!(cache.get_custom::<ObjectRef>("gasCoin").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_apply_effects_writes_and_removes() {
        let cache = ObjectCache::new();
        let owner = SuiAddress::new([1; 32]);
        let stale = SuiAddress::from_u16(0x30);
        cache.add_object(entry(0x30, Some(owner), None)).await.unwrap();

        let owned = SuiAddress::from_u16(0x31);
        let shared = SuiAddress::from_u16(0x32);
        let immutable = SuiAddress::from_u16(0x33);
        let removed = (
            stale,
            EffectsObjectChange {
                input_state: ObjectIn::NotExist,
                output_state: ObjectOut::NotExist,
                id_operation: IdOperation::Deleted,
            },
        );
        let effects = effects(vec![
            write(owned, Owner::AddressOwner(owner)),
            write(
                shared,
                Owner::Shared {
                    initial_shared_version: 2,
                },
            ),
            write(immutable, Owner::Immutable),
            removed,
        ]);
        cache.apply_effects(&effects).await.unwrap();

        let owned_entry = cache.get_object(&owned).await.unwrap().unwrap();
        assert_eq!(owned_entry.version, 12);
        assert_eq!(owned_entry.owner, Some(owner));
        let shared_entry = cache.get_object(&shared).await.unwrap().unwrap();
        assert_eq!(shared_entry.initial_shared_version, Some(2));
        assert_eq!(shared_entry.owner, None);
        let immutable_entry = cache.get_object(&immutable).await.unwrap().unwrap();
        assert_eq!(immutable_entry.initial_shared_version, None);
        assert_eq!(cache.get_object(&stale).await.unwrap(), None);
        assert_eq!(cache.metrics().snapshot().invalidations, 1);
    }

    #[tokio::test]
    async fn test_plugin_resolves_from_cache_and_records_signatures() {
        let ledger = Arc::new(MockLedger::new());
        let sender = SuiAddress::new([3; 32]);
        ledger.add_coin(sender, 10_000_000_000);
        let object = ledger.add_owned_object(sender, "0x5::thing::Thing");
        let package = SuiAddress::from_u16(0x5);
        ledger.add_move_function(
            package,
            "thing",
            "touch",
            MoveFunction::public(vec![MoveType::MutableReference(Box::new(
                MoveType::struct_type(package, "thing", "Thing"),
            ))]),
        );
        let client: Arc<dyn SuiClient> = ledger.clone();
        let cache = ObjectCache::new();

        let mut first = Transaction::new();
        first.set_sender(sender);
        first.add_build_plugin(cache.as_plugin());
        let arg = first.object(object.object_id).unwrap();
        first.move_call("0x5::thing::touch", &[], vec![arg]).unwrap();
        first
            .build(&BuildOptions::with_client(client.clone()))
            .await
            .unwrap();
        assert_eq!(ledger.function_fetches(), 1);
        assert!(cache
            .get_move_function_definition(&package, "thing", "touch")
            .await
            .unwrap()
            .is_some());

        cache
            .add_object(ObjectCacheEntry::new(
                object.object_id,
                object.version,
                object.digest,
                &Owner::AddressOwner(sender),
            ))
            .await
            .unwrap();
        let fetches_before = ledger.object_fetches();

        let mut second = Transaction::new();
        second.set_sender(sender);
        second.set_gas_price(1000);
        second.set_gas_budget(5_000_000);
        second.set_gas_payment(vec![ledger.coins_owned_by(sender)[0].object_ref()]);
        second.add_build_plugin(cache.as_plugin());
        let arg = second.object(object.object_id).unwrap();
        second.move_call("0x5::thing::touch", &[], vec![arg]).unwrap();
        second
            .build(&BuildOptions::with_client(client))
            .await
            .unwrap();

        assert_eq!(ledger.function_fetches(), 1);
        assert_eq!(ledger.object_fetches(), fetches_before);
        let snapshot = cache.metrics().snapshot();
        assert_eq!(snapshot.object_hits, 1);
        assert_eq!(snapshot.function_hits, 1);
    }
}
