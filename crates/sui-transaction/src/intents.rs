//! The `CoinWithBalance` intent.
//!
//! A `CoinWithBalance` command stands for "a coin of type T holding exactly
//! N". Its resolver picks the sender's coins, merges them when one is not
//! enough and splits off the requested amount. SUI can be split straight
//! from the gas coin instead.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sui_transport::{CoinStruct, SuiClient};
use sui_types::framework::{is_sui_type, SUI_TYPE};
use sui_types::type_tag::normalize_struct_tag;
use sui_types::{ObjectArg, ObjectID, SuiAddress};
use tracing::debug;

use crate::arguments::{Argument, InputKind};
use crate::builder::{ResultRemap, TransactionDataBuilder};
use crate::commands::Command;
use crate::error::{Result, TransactionError};
use crate::inputs::CallArg;
use crate::plugin::{BuildOptions, Next, TransactionPlugin};

pub const COIN_WITH_BALANCE: &str = "CoinWithBalance";

/// Coin type marker meaning "split from the gas coin".
const GAS: &str = "gas";

/// A request for a coin with an exact balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinWithBalance {
    pub coin_type: String,
    pub balance: u64,
    /// Split SUI from the gas coin rather than from owned coins.
    pub use_gas_coin: bool,
}

impl CoinWithBalance {
    pub fn sui(balance: u64) -> Self {
        Self::of_type(SUI_TYPE, balance)
    }

    pub fn of_type(coin_type: impl Into<String>, balance: u64) -> Self {
        Self {
            coin_type: coin_type.into(),
            balance,
            use_gas_coin: true,
        }
    }

    pub fn without_gas_coin(mut self) -> Self {
        self.use_gas_coin = false;
        self
    }

    /// The `$Intent` command carrying this request.
    pub fn to_command(&self) -> Result<Command> {
        let coin_type = normalize_struct_tag(&self.coin_type).map_err(|e| {
            TransactionError::InvalidArgument(format!(
                "Invalid coin type '{}': {}",
                self.coin_type, e
            ))
        })?;
        let is_sui = is_sui_type(&coin_type);
        let data = IntentData {
            coin_type: if is_sui && self.use_gas_coin {
                GAS.to_string()
            } else {
                coin_type
            },
            balance: self.balance,
        };
        Ok(Command::intent(
            COIN_WITH_BALANCE,
            BTreeMap::new(),
            serde_json::to_value(data)?,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IntentData {
    #[serde(rename = "type")]
    coin_type: String,
    balance: u64,
}

fn intent_data(command: &Command) -> Result<Option<IntentData>> {
    match command {
        Command::Intent(intent) if intent.name == COIN_WITH_BALANCE => {
            Ok(Some(serde_json::from_value(intent.data.clone())?))
        }
        _ => Ok(None),
    }
}

/// Resolver for [`COIN_WITH_BALANCE`] intents.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinWithBalanceResolver;

impl CoinWithBalanceResolver {
    /// Total requested per coin type, excluding gas and zero balances.
    fn totals(data: &TransactionDataBuilder) -> Result<BTreeMap<String, u128>> {
        let mut totals = BTreeMap::new();
        for command in &data.commands {
            if let Some(intent) = intent_data(command)? {
                if intent.coin_type != GAS && intent.balance > 0 {
                    *totals.entry(intent.coin_type).or_insert(0u128) += intent.balance as u128;
                }
            }
        }
        Ok(totals)
    }

    /// Objects already used by the transaction; they cannot fund a split.
    fn used_ids(data: &TransactionDataBuilder) -> HashSet<ObjectID> {
        data.inputs
            .iter()
            .filter_map(|input| match input {
                CallArg::Object(ObjectArg::ImmOrOwnedObject(r)) => Some(r.object_id),
                CallArg::UnresolvedObject(object) => Some(object.object_id),
                _ => None,
            })
            .collect()
    }

    fn expand(
        data: &mut TransactionDataBuilder,
        mut coins: HashMap<String, Vec<CoinStruct>>,
    ) -> Result<()> {
        let mut merged: HashMap<String, Argument> = HashMap::new();
        let mut index = 0;
        while index < data.commands.len() {
            let Some(intent) = intent_data(&data.commands[index])? else {
                index += 1;
                continue;
            };

            if intent.balance == 0 && intent.coin_type != GAS {
                let zero = Command::move_call(
                    "0x2",
                    "coin",
                    "zero",
                    vec![intent.coin_type],
                    vec![],
                );
                let position =
                    u16::try_from(index).map_err(|_| TransactionError::TooManyCommands(index))?;
                data.replace_command(index, vec![zero], ResultRemap::Index(position))?;
                index += 1;
                continue;
            }

            let mut commands = Vec::new();
            let source = if intent.coin_type == GAS {
                Argument::GasCoin
            } else if let Some(source) = merged.get(&intent.coin_type) {
                *source
            } else {
                let selected = coins.remove(&intent.coin_type).unwrap_or_default();
                let args = selected
                    .iter()
                    .map(|coin| {
                        data.add_input(InputKind::Object, CallArg::object_ref(coin.object_ref()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let mut args = args.into_iter();
                let first = args.next().ok_or_else(|| TransactionError::InsufficientBalance {
                    coin_type: intent.coin_type.clone(),
                    owner: String::new(),
                    required: intent.balance as u128,
                    available: 0,
                })?;
                let rest: Vec<Argument> = args.collect();
                if !rest.is_empty() {
                    commands.push(Command::merge_coins(first, rest));
                }
                merged.insert(intent.coin_type.clone(), first);
                first
            };

            let amount = data.add_input(
                InputKind::Pure,
                CallArg::Pure(intent.balance.to_le_bytes().to_vec()),
            )?;
            commands.push(Command::split_coins(source, vec![amount]));

            let added = commands.len();
            let last = index + added - 1;
            let last = u16::try_from(last).map_err(|_| TransactionError::TooManyCommands(last))?;
            let result = Argument::NestedResult(last, 0);
            data.replace_command(index, commands, ResultRemap::Argument(result))?;
            index += added;
        }
        Ok(())
    }
}

/// Coins of `coin_type` covering `required`, largest first within each page.
async fn select_coins(
    client: &dyn SuiClient,
    owner: SuiAddress,
    coin_type: &str,
    required: u128,
    used: &HashSet<ObjectID>,
) -> Result<Vec<CoinStruct>> {
    let mut selected = Vec::new();
    let mut total = 0u128;
    let mut cursor = None;
    loop {
        let page = client.get_coins(owner, coin_type, cursor).await?;
        let mut data = page.data;
        data.sort_by(|a, b| b.balance.cmp(&a.balance));
        for coin in data {
            if used.contains(&coin.coin_object_id) {
                continue;
            }
            total += coin.balance as u128;
            selected.push(coin);
            if total >= required {
                return Ok(selected);
            }
        }
        if !page.has_next_page || page.next_cursor.is_none() {
            return Err(TransactionError::InsufficientBalance {
                coin_type: coin_type.to_string(),
                owner: owner.to_string(),
                required,
                available: total,
            });
        }
        cursor = page.next_cursor;
    }
}

#[async_trait]
impl TransactionPlugin for CoinWithBalanceResolver {
    fn name(&self) -> &str {
        "CoinWithBalance"
    }

    async fn process(
        &self,
        data: &mut TransactionDataBuilder,
        options: &BuildOptions,
        next: Next<'_>,
    ) -> Result<()> {
        let totals = Self::totals(data)?;
        let mut coins = HashMap::new();
        if !totals.is_empty() {
            let sender = data
                .sender
                .ok_or(TransactionError::MissingField("transaction sender"))?;
            let client = options.client()?;
            let used = Self::used_ids(data);
            for (coin_type, required) in &totals {
                let selected = select_coins(client, sender, coin_type, *required, &used).await?;
                debug!(
                    coin_type = %coin_type,
                    required = *required,
                    coins = selected.len(),
                    "selected coins for CoinWithBalance"
                );
                coins.insert(coin_type.clone(), selected);
            }
        }
        Self::expand(data, coins)?;
        next.run(data, options).await
    }
}
