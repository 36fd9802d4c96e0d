//! The mutable transaction aggregate the resolution pipeline works on.
//!
//! [`TransactionDataBuilder`] owns the inputs, commands and gas
//! configuration. It enforces the argument-index invariants on insertion
//! and keeps them intact when [`replace_command`] splices an intent's
//! expansion into the command list.
//!
//! [`replace_command`]: TransactionDataBuilder::replace_command

use serde::{Deserialize, Serialize};
use sui_bcs::CodecExt;
use sui_types::schema::{transaction_data_codec, transaction_kind_codec};
use sui_types::{
    transaction_digest, GasData, ObjectRef, ProgrammableTransaction, SuiAddress, TransactionData,
    TransactionDigest, TransactionExpiration, TransactionKind,
};

use crate::arguments::{Argument, InputKind};
use crate::commands::Command;
use crate::error::{Result, TransactionError};
use crate::inputs::CallArg;

/// Version tag written into JSON snapshots.
pub const SNAPSHOT_VERSION: u8 = 2;

/// Gas fields, each optional until resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasConfig {
    pub budget: Option<u64>,
    pub price: Option<u64>,
    pub owner: Option<SuiAddress>,
    pub payment: Option<Vec<ObjectRef>>,
}

/// Values that take precedence over the builder's own for a single build.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub sender: Option<SuiAddress>,
    pub expiration: Option<TransactionExpiration>,
    pub gas_data: GasConfig,
}

#[derive(Debug, Clone, Default)]
pub struct DataBuildOptions {
    /// Serialize only the `TransactionKind`; gas and sender are not required.
    pub only_transaction_kind: bool,
    pub overrides: Option<BuildOverrides>,
}

impl DataBuildOptions {
    pub fn kind_only() -> Self {
        Self {
            only_transaction_kind: true,
            overrides: None,
        }
    }
}

/// Where references to a replaced command should point afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultRemap {
    /// Absolute index, in the post-replacement command list, of the command
    /// whose result stands in for the replaced one.
    Index(u16),
    /// A specific argument. `NestedResult(replaced, n)` with `n > 0` cannot
    /// be mapped and is rejected.
    Argument(Argument),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDataBuilder {
    pub version: u8,
    pub sender: Option<SuiAddress>,
    pub expiration: Option<TransactionExpiration>,
    pub gas_data: GasConfig,
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl Default for TransactionDataBuilder {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            sender: None,
            expiration: None,
            gas_data: GasConfig::default(),
            inputs: vec![],
            commands: vec![],
        }
    }
}

impl TransactionDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from BCS `TransactionData`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let data = transaction_data_codec().parse(bytes)?;
        let TransactionData::V1(v1) = data;
        let mut builder = Self::from_kind(v1.kind);
        builder.sender = Some(v1.sender);
        builder.expiration = Some(v1.expiration);
        builder.gas_data = GasConfig {
            budget: Some(v1.gas_data.budget),
            price: Some(v1.gas_data.price),
            owner: Some(v1.gas_data.owner),
            payment: Some(v1.gas_data.payment),
        };
        Ok(builder)
    }

    /// Restore from BCS `TransactionKind`; gas and sender stay unset.
    pub fn from_kind_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_kind(transaction_kind_codec().parse(bytes)?))
    }

    fn from_kind(kind: TransactionKind) -> Self {
        let TransactionKind::ProgrammableTransaction(pt) = kind;
        Self {
            inputs: pt.inputs.into_iter().map(CallArg::from).collect(),
            commands: pt.commands.into_iter().map(Command::from).collect(),
            ..Self::default()
        }
    }

    /// Append an input slot.
    pub fn add_input(&mut self, kind: InputKind, arg: CallArg) -> Result<Argument> {
        let index = u16::try_from(self.inputs.len())
            .map_err(|_| TransactionError::TooManyInputs(self.inputs.len()))?;
        self.inputs.push(arg);
        Ok(Argument::input(index, kind))
    }

    /// Append a command after checking that every argument it uses exists.
    ///
    /// Returns the index of the new command.
    pub fn add_command(&mut self, command: Command) -> Result<u16> {
        let index = self.commands.len();
        let position =
            u16::try_from(index).map_err(|_| TransactionError::TooManyCommands(index))?;
        self.check_arguments(index, &command)?;
        self.commands.push(command);
        Ok(position)
    }

    fn check_arguments(&self, index: usize, command: &Command) -> Result<()> {
        for arg in command.arguments() {
            match *arg {
                Argument::Input { index: input, .. } if input as usize >= self.inputs.len() => {
                    return Err(TransactionError::InputOutOfBounds {
                        command: index,
                        index: input,
                        inputs: self.inputs.len(),
                    });
                }
                Argument::Result(result) | Argument::NestedResult(result, _)
                    if result as usize >= index =>
                {
                    return Err(TransactionError::UnavailableResult {
                        command: index,
                        result,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Substitute the command at `index` with `replacement`.
    ///
    /// References held by later commands are rewritten: references to the
    /// replaced command follow `result`, references to later commands shift
    /// by `replacement.len() - 1`. Arguments inside `replacement` itself are
    /// taken as given.
    pub fn replace_command(
        &mut self,
        index: usize,
        replacement: Vec<Command>,
        result: ResultRemap,
    ) -> Result<()> {
        if index >= self.commands.len() {
            return Err(TransactionError::InvalidReplacement(format!(
                "Cannot replace command {}: the transaction has {} commands",
                index,
                self.commands.len()
            )));
        }
        let replaced =
            u16::try_from(index).map_err(|_| TransactionError::TooManyCommands(index))?;
        if let ResultRemap::Argument(_) = result {
            for command in &self.commands[index + 1..] {
                for arg in command.arguments() {
                    if let Argument::NestedResult(cmd, nested) = *arg {
                        if cmd == replaced && nested != 0 {
                            return Err(TransactionError::InvalidReplacement(format!(
                                "Cannot replace command {} with a specific result type: \
                                 NestedResult[{}, {}] references a nested element that cannot be \
                                 mapped to the replacement result",
                                index, index, nested
                            )));
                        }
                    }
                }
            }
        }

        let added = replacement.len();
        let resulting = self.commands.len() - 1 + added;
        if resulting > u16::MAX as usize + 1 {
            return Err(TransactionError::TooManyCommands(resulting));
        }
        self.commands.splice(index..=index, replacement);
        let shift = |cmd: u16| (cmd as usize + added - 1) as u16;

        for command in self.commands.iter_mut().skip(index + added) {
            for arg in command.arguments_mut() {
                *arg = match (*arg, result) {
                    (Argument::Result(cmd), ResultRemap::Argument(target))
                    | (Argument::NestedResult(cmd, 0), ResultRemap::Argument(target))
                        if cmd == replaced =>
                    {
                        target
                    }
                    (Argument::Result(cmd), ResultRemap::Index(target)) if cmd == replaced => {
                        Argument::Result(target)
                    }
                    (Argument::NestedResult(cmd, nested), ResultRemap::Index(target))
                        if cmd == replaced =>
                    {
                        Argument::NestedResult(target, nested)
                    }
                    (Argument::Result(cmd), _) if cmd > replaced => Argument::Result(shift(cmd)),
                    (Argument::NestedResult(cmd, nested), _) if cmd > replaced => {
                        Argument::NestedResult(shift(cmd), nested)
                    }
                    (other, _) => other,
                };
            }
        }
        Ok(())
    }

    /// Rewrite every argument of every command. `f` gets the argument and
    /// the index of the command holding it.
    pub fn map_arguments<F>(&mut self, mut f: F)
    where
        F: FnMut(Argument, usize) -> Argument,
    {
        for (index, command) in self.commands.iter_mut().enumerate() {
            for arg in command.arguments_mut() {
                *arg = f(*arg, index);
            }
        }
    }

    /// Call `f` for every use of input slot `index`.
    pub fn get_input_uses<F>(&self, index: u16, mut f: F)
    where
        F: FnMut(&Argument, &Command),
    {
        for command in &self.commands {
            for arg in command.arguments() {
                if arg.is_input(index) {
                    f(arg, command);
                }
            }
        }
    }

    /// JSON form of the current state.
    pub fn snapshot(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn programmable_transaction(&self) -> Result<ProgrammableTransaction> {
        let inputs = self
            .inputs
            .iter()
            .enumerate()
            .map(|(index, input)| input.to_wire(index))
            .collect::<Result<Vec<_>>>()?;
        let commands = self
            .commands
            .iter()
            .map(Command::to_wire)
            .collect::<Result<Vec<_>>>()?;
        Ok(ProgrammableTransaction { inputs, commands })
    }

    /// Canonical BCS bytes.
    ///
    /// Every input must be resolved and, unless only the kind is requested,
    /// sender and gas budget, price and payment must be known.
    pub fn build(&self, options: &DataBuildOptions) -> Result<Vec<u8>> {
        let kind = TransactionKind::ProgrammableTransaction(self.programmable_transaction()?);
        if options.only_transaction_kind {
            return Ok(transaction_kind_codec().to_bytes(&kind)?);
        }

        let overrides = options.overrides.clone().unwrap_or_default();
        let gas = &overrides.gas_data;
        let sender = overrides
            .sender
            .or(self.sender)
            .ok_or(TransactionError::MissingField("transaction sender"))?;
        let budget = gas
            .budget
            .or(self.gas_data.budget)
            .ok_or(TransactionError::MissingField("gas budget"))?;
        let price = gas
            .price
            .or(self.gas_data.price)
            .ok_or(TransactionError::MissingField("gas price"))?;
        let payment = gas
            .payment
            .clone()
            .or_else(|| self.gas_data.payment.clone())
            .ok_or(TransactionError::MissingField("gas payment"))?;
        let owner = gas.owner.or(self.gas_data.owner).unwrap_or(sender);
        let expiration = overrides
            .expiration
            .or(self.expiration)
            .unwrap_or_default();

        let data = TransactionData::V1(sui_types::TransactionDataV1 {
            kind,
            sender,
            gas_data: GasData {
                payment,
                owner,
                price,
                budget,
            },
            expiration,
        });
        Ok(transaction_data_codec().to_bytes(&data)?)
    }

    /// Digest of the full transaction as it would be built now.
    pub fn get_digest(&self) -> Result<TransactionDigest> {
        let bytes = self.build(&DataBuildOptions::default())?;
        Ok(transaction_digest(&bytes))
    }
}
