//! Resolution of registered package names such as `@org/app`.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;
use sui_types::ObjectID;
use tracing::debug;

use crate::builder::TransactionDataBuilder;
use crate::commands::Command;
use crate::error::{Result, TransactionError};
use crate::plugin::{BuildOptions, Next, TransactionPlugin};

/// Names resolved per client request.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// True when `value` names a package by registered name rather than by id.
pub fn has_named_package(value: &str) -> bool {
    value.contains('@') || value.contains(".sui")
}

/// Known name resolutions. Also used to seed the plugin cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedPackagesOverrides {
    pub packages: HashMap<String, ObjectID>,
    pub types: HashMap<String, String>,
}

/// Serialization plugin replacing named packages in move call targets, type
/// arguments and `MakeMoveVec` element types.
///
/// Resolutions are cached for the lifetime of the plugin, so a transaction
/// and its forks only ask the client once per name.
#[derive(Debug)]
pub struct NamedPackagesPlugin {
    page_size: usize,
    cache: Mutex<NamedPackagesOverrides>,
}

impl Default for NamedPackagesPlugin {
    fn default() -> Self {
        Self::new(NamedPackagesOverrides::default())
    }
}

impl NamedPackagesPlugin {
    pub fn new(overrides: NamedPackagesOverrides) -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache: Mutex::new(overrides),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Everything resolved so far, including the initial overrides.
    pub fn overrides(&self) -> NamedPackagesOverrides {
        self.cache.lock().clone()
    }

    async fn resolve_missing(
        &self,
        packages: Vec<String>,
        types: Vec<String>,
        options: &BuildOptions,
    ) -> Result<()> {
        if packages.is_empty() && types.is_empty() {
            return Ok(());
        }
        let client = options.client()?;
        debug!(
            packages = packages.len(),
            types = types.len(),
            "resolving named packages"
        );
        for chunk in packages.chunks(self.page_size) {
            let resolved = client.resolve_package_names(chunk).await?;
            self.cache.lock().packages.extend(resolved);
        }
        for chunk in types.chunks(self.page_size) {
            let resolved = client.resolve_type_names(chunk).await?;
            self.cache.lock().types.extend(resolved);
        }
        Ok(())
    }
}

fn named_references(data: &TransactionDataBuilder) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut packages = BTreeSet::new();
    let mut types = BTreeSet::new();
    for command in &data.commands {
        match command {
            Command::MoveCall(call) => {
                if has_named_package(&call.package) {
                    packages.insert(call.package.clone());
                }
                types.extend(
                    call.type_arguments
                        .iter()
                        .filter(|t| has_named_package(t))
                        .cloned(),
                );
            }
            Command::MakeMoveVec {
                element_type: Some(ty),
                ..
            } if has_named_package(ty) => {
                types.insert(ty.clone());
            }
            _ => {}
        }
    }
    (packages, types)
}

#[async_trait]
impl TransactionPlugin for NamedPackagesPlugin {
    fn name(&self) -> &str {
        "namedPackagesPlugin"
    }

    async fn process(
        &self,
        data: &mut TransactionDataBuilder,
        options: &BuildOptions,
        next: Next<'_>,
    ) -> Result<()> {
        let (packages, types) = named_references(data);
        let (missing_packages, missing_types) = {
            let cache = self.cache.lock();
            (
                packages
                    .iter()
                    .filter(|p| !cache.packages.contains_key(*p))
                    .cloned()
                    .collect::<Vec<_>>(),
                types
                    .iter()
                    .filter(|t| !cache.types.contains_key(*t))
                    .cloned()
                    .collect::<Vec<_>>(),
            )
        };
        self.resolve_missing(missing_packages, missing_types, options)
            .await?;

        {
            let cache = self.cache.lock();
            if let Some(name) = packages.iter().find(|p| !cache.packages.contains_key(*p)) {
                return Err(TransactionError::UnresolvedName(name.clone()));
            }
            if let Some(name) = types.iter().find(|t| !cache.types.contains_key(*t)) {
                return Err(TransactionError::UnresolvedName(name.clone()));
            }

            let resolve_type = |ty: &mut String| {
                if let Some(resolved) = cache.types.get(ty.as_str()) {
                    *ty = resolved.clone();
                }
            };
            for command in data.commands.iter_mut() {
                match command {
                    Command::MoveCall(call) => {
                        if let Some(id) = cache.packages.get(&call.package) {
                            call.package = id.to_hex_literal();
                        }
                        call.type_arguments.iter_mut().for_each(resolve_type);
                    }
                    Command::MakeMoveVec {
                        element_type: Some(ty),
                        ..
                    } => resolve_type(ty),
                    _ => {}
                }
            }
        }

        next.run(data, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sui_transport::test_utils::MockLedger;
    use sui_types::SuiAddress;

    use crate::plugin::{run_plugins, PluginRef};

    fn named_call() -> TransactionDataBuilder {
        let mut data = TransactionDataBuilder::new();
        data.add_command(Command::move_call(
            "@mysten/demo",
            "demo",
            "run",
            vec!["@mysten/demo::demo::Token".to_string(), "u64".to_string()],
            vec![],
        ))
        .unwrap();
        data
    }

    #[test]
    fn test_has_named_package() {
        assert!(has_named_package("@mysten/demo::m::T"));
        assert!(has_named_package("demo.sui/app"));
        assert!(!has_named_package("0x2::sui::SUI"));
    }

    #[tokio::test]
    async fn test_names_are_replaced_and_cached() {
        let ledger = Arc::new(MockLedger::new());
        let package = SuiAddress::from_u16(0xd3);
        ledger.add_package_name("@mysten/demo", package);
        ledger.add_type_name("@mysten/demo::demo::Token", "0xd3::demo::Token");

        let plugin = Arc::new(NamedPackagesPlugin::default());
        let plugins: Vec<PluginRef> = vec![plugin.clone()];
        let mut data = named_call();
        run_plugins(&plugins, &mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap();

        let Command::MoveCall(call) = &data.commands[0] else {
            panic!("expected a move call");
        };
        assert_eq!(call.package, package.to_hex_literal());
        assert_eq!(call.type_arguments, vec!["0xd3::demo::Token", "u64"]);

        // Cached names resolve offline.
        let mut again = named_call();
        run_plugins(&plugins, &mut again, &BuildOptions::default())
            .await
            .unwrap();
        assert_eq!(again.commands, data.commands);
        assert_eq!(plugin.overrides().packages.get("@mysten/demo"), Some(&package));
    }

    #[tokio::test]
    async fn test_unknown_name_is_an_error() {
        let ledger = Arc::new(MockLedger::new());
        let plugins: Vec<PluginRef> = vec![Arc::new(NamedPackagesPlugin::default())];
        let mut data = named_call();
        let err = run_plugins(&plugins, &mut data, &BuildOptions::with_client(ledger))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No address found for @mysten/demo");
    }
}
