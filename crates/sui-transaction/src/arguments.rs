//! Command arguments as seen by the builder.

use serde::{Deserialize, Serialize};
use sui_types::Argument as WireArgument;

/// Upper bound on [`TransactionResult::nested_results`].
pub const MAX_NESTED_RESULTS: u16 = 50;

/// Whether an input slot holds a pure value or an object.
///
/// Only a hint for resolution; it is not serialized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    Pure,
    Object,
}

/// A value a command can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Argument {
    /// The coin paying for gas.
    GasCoin,
    /// An input slot.
    Input {
        index: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<InputKind>,
    },
    /// The (single) result of an earlier command.
    Result(u16),
    /// One element of a multi-valued result of an earlier command.
    NestedResult(u16, u16),
}

impl Argument {
    pub fn input(index: u16, kind: InputKind) -> Self {
        Argument::Input {
            index,
            kind: Some(kind),
        }
    }

    pub fn input_index(&self) -> Option<u16> {
        match self {
            Argument::Input { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Command whose output this argument reads, if any.
    pub fn result_command(&self) -> Option<u16> {
        match self {
            Argument::Result(cmd) | Argument::NestedResult(cmd, _) => Some(*cmd),
            _ => None,
        }
    }

    /// Same input slot, ignoring the kind hint.
    pub fn is_input(&self, slot: u16) -> bool {
        self.input_index() == Some(slot)
    }

    pub fn to_wire(&self) -> WireArgument {
        match *self {
            Argument::GasCoin => WireArgument::GasCoin,
            Argument::Input { index, .. } => WireArgument::Input(index),
            Argument::Result(cmd) => WireArgument::Result(cmd),
            Argument::NestedResult(cmd, i) => WireArgument::NestedResult(cmd, i),
        }
    }
}

impl From<WireArgument> for Argument {
    fn from(arg: WireArgument) -> Self {
        match arg {
            WireArgument::GasCoin => Argument::GasCoin,
            WireArgument::Input(index) => Argument::Input { index, kind: None },
            WireArgument::Result(cmd) => Argument::Result(cmd),
            WireArgument::NestedResult(cmd, i) => Argument::NestedResult(cmd, i),
        }
    }
}

/// Handle to the output of a command added through [`crate::Transaction`].
///
/// Use it directly (it converts into [`Argument::Result`]) or pick out
/// elements of a tuple result with [`nested_result`](Self::nested_result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionResult {
    index: u16,
}

impl TransactionResult {
    pub fn new(index: u16) -> Self {
        Self { index }
    }

    pub fn command_index(&self) -> u16 {
        self.index
    }

    pub fn arg(&self) -> Argument {
        Argument::Result(self.index)
    }

    pub fn nested_result(&self, result_index: u16) -> Argument {
        Argument::NestedResult(self.index, result_index)
    }

    /// `NestedResult(index, 0..count)`, capped at [`MAX_NESTED_RESULTS`].
    ///
    /// ```
    /// use sui_transaction::{Argument, TransactionResult};
    ///
    /// let split = TransactionResult::new(3);
    /// let coins: Vec<Argument> = split.nested_results(2).collect();
    /// assert_eq!(coins, vec![Argument::NestedResult(3, 0), Argument::NestedResult(3, 1)]);
    /// ```
    pub fn nested_results(&self, count: u16) -> impl Iterator<Item = Argument> {
        let index = self.index;
        (0..count.min(MAX_NESTED_RESULTS)).map(move |i| Argument::NestedResult(index, i))
    }
}

impl From<TransactionResult> for Argument {
    fn from(result: TransactionResult) -> Self {
        result.arg()
    }
}
