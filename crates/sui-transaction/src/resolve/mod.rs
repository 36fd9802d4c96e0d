//! Resolution of transaction data against the ledger.
//!
//! [`ResolveTransactionData`] is always the last build plugin. It runs these
//! stages in order, each a no-op when its data is already present:
//!
//! 1. [`normalize`] - fill in Move signatures and encode `UnresolvedPure` values
//! 2. [`objects`] - turn `UnresolvedObject` inputs into object references
//! 3. [`gas`] - price, budget (via dry run) and payment coins
//! 4. [`validate`] - refuse to proceed with any unresolved input
//!
//! Gas resolution is skipped for kind-only builds.

use async_trait::async_trait;
use tracing::debug;

use crate::builder::TransactionDataBuilder;
use crate::error::Result;
use crate::plugin::{BuildOptions, Next, TransactionPlugin};

pub mod gas;
pub mod named_packages;
pub mod normalize;
pub mod objects;
pub mod validate;

pub use named_packages::{NamedPackagesOverrides, NamedPackagesPlugin};

/// Object ids per `multi_get_objects` request.
pub const MAX_OBJECTS_PER_FETCH: usize = 50;

/// Extra computation units, times the gas price, added to a dry-run estimate.
pub const GAS_SAFE_OVERHEAD: u64 = 1000;

/// Budget used for the estimation dry run.
pub const MAX_GAS: u64 = 50_000_000_000;

/// The built-in resolver every build ends with.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveTransactionData;

#[async_trait]
impl TransactionPlugin for ResolveTransactionData {
    fn name(&self) -> &str {
        "resolveTransactionData"
    }

    async fn process(
        &self,
        data: &mut TransactionDataBuilder,
        options: &BuildOptions,
        next: Next<'_>,
    ) -> Result<()> {
        normalize::normalize_inputs(data, options).await?;
        objects::resolve_object_references(data, options).await?;

        if !options.only_transaction_kind {
            gas::set_gas_price(data, options).await?;
            gas::set_gas_budget(data, options).await?;
            gas::set_gas_payment(data, options).await?;
        }
        validate::validate(data)?;

        debug!(
            inputs = data.inputs.len(),
            commands = data.commands.len(),
            "transaction data resolved"
        );
        next.run(data, options).await
    }
}
