//! The resolution plugin pipeline.
//!
//! A plugin receives the transaction data, the build options and a [`Next`]
//! continuation for the rest of the chain. It may mutate the data before
//! and after running `next`, but it must run it exactly once and drive it
//! to completion. `Next::run` takes `self`, so a second call does not
//! compile; the runner reports the other two violations by plugin name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sui_transport::SuiClient;
use tracing::trace;

use crate::builder::TransactionDataBuilder;
use crate::error::{Result, TransactionError};

/// Options shared by every plugin in one build.
#[derive(Clone, Default)]
pub struct BuildOptions {
    pub client: Option<Arc<dyn SuiClient>>,
    /// Resolve only what a `TransactionKind` needs; skip gas and sender.
    pub only_transaction_kind: bool,
    /// Intents the caller handles itself. They need no registered resolver.
    pub supported_intents: Vec<String>,
}

impl BuildOptions {
    pub fn with_client(client: Arc<dyn SuiClient>) -> Self {
        Self {
            client: Some(client),
            ..Self::default()
        }
    }

    pub fn kind_only(mut self) -> Self {
        self.only_transaction_kind = true;
        self
    }

    /// The ledger client, or [`TransactionError::NoClient`].
    pub fn client(&self) -> Result<&dyn SuiClient> {
        self.client.as_deref().ok_or(TransactionError::NoClient)
    }
}

impl fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("client", &self.client.is_some())
            .field("only_transaction_kind", &self.only_transaction_kind)
            .field("supported_intents", &self.supported_intents)
            .finish()
    }
}

#[async_trait]
pub trait TransactionPlugin: Send + Sync {
    /// Name used in error messages and logs.
    fn name(&self) -> &str;

    async fn process(
        &self,
        data: &mut TransactionDataBuilder,
        options: &BuildOptions,
        next: Next<'_>,
    ) -> Result<()>;
}

pub type PluginRef = Arc<dyn TransactionPlugin>;

#[derive(Debug, Default)]
struct NextState {
    called: AtomicBool,
    completed: AtomicBool,
}

/// Continuation for the remainder of a plugin chain.
pub struct Next<'a> {
    plugins: &'a [PluginRef],
    index: usize,
    state: Arc<NextState>,
}

impl<'a> Next<'a> {
    /// Run the remaining plugins.
    ///
    /// The call is recorded as soon as this is invoked; completion is
    /// recorded only when the returned future finishes successfully.
    pub fn run<'b>(
        self,
        data: &'b mut TransactionDataBuilder,
        options: &'b BuildOptions,
    ) -> BoxFuture<'b, Result<()>>
    where
        'a: 'b,
    {
        self.state.called.store(true, Ordering::SeqCst);
        let Next {
            plugins,
            index,
            state,
        } = self;
        Box::pin(async move {
            run_from(plugins, index, data, options).await?;
            state.completed.store(true, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Run `plugins` in order over `data`.
pub async fn run_plugins(
    plugins: &[PluginRef],
    data: &mut TransactionDataBuilder,
    options: &BuildOptions,
) -> Result<()> {
    run_from(plugins, 0, data, options).await
}

fn run_from<'a>(
    plugins: &'a [PluginRef],
    index: usize,
    data: &'a mut TransactionDataBuilder,
    options: &'a BuildOptions,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let Some(plugin) = plugins.get(index) else {
            return Ok(());
        };
        let state = Arc::new(NextState::default());
        let next = Next {
            plugins,
            index: index + 1,
            state: state.clone(),
        };
        trace!(plugin = plugin.name(), index, "running transaction plugin");
        plugin.process(data, options, next).await?;

        if !state.called.load(Ordering::SeqCst) {
            return Err(TransactionError::NextNotCalled {
                plugin: plugin.name().to_string(),
            });
        }
        if !state.completed.load(Ordering::SeqCst) {
            return Err(TransactionError::NextNotAwaited {
                plugin: plugin.name().to_string(),
            });
        }
        Ok(())
    })
}

/// Plugins owned by one transaction.
///
/// Defaults are copied in at construction; later registrations affect only
/// the owning transaction and its forks.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    pub build: Vec<PluginRef>,
    pub serialization: Vec<PluginRef>,
    pub intent_resolvers: BTreeMap<String, PluginRef>,
}

impl PluginRegistry {
    /// Named-package resolution and the `CoinWithBalance` resolver.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry
            .serialization
            .push(Arc::new(crate::resolve::NamedPackagesPlugin::default()));
        registry.intent_resolvers.insert(
            crate::intents::COIN_WITH_BALANCE.to_string(),
            Arc::new(crate::intents::CoinWithBalanceResolver),
        );
        registry
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |plugins: &[PluginRef]| {
            plugins
                .iter()
                .map(|p| p.name().to_string())
                .collect::<Vec<_>>()
        };
        f.debug_struct("PluginRegistry")
            .field("build", &names(&self.build))
            .field("serialization", &names(&self.serialization))
            .field(
                "intent_resolvers",
                &self.intent_resolvers.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
