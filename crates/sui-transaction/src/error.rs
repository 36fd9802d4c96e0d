//! Errors raised while building, resolving and signing transactions.

use sui_bcs::BcsError;
use sui_types::ObjectID;

/// Everything that can go wrong between `Transaction::new()` and signed bytes.
#[derive(Debug)]
pub enum TransactionError {
    /// A codec rejected a value or a buffer.
    Bcs(BcsError),

    /// The ledger client failed.
    Client(anyhow::Error),

    /// Resolution needs the ledger but no client was supplied.
    NoClient,

    /// An `Input` argument points past the end of the input list.
    InputOutOfBounds {
        /// Index of the command holding the argument.
        command: usize,
        index: u16,
        /// Number of inputs at the time of the check.
        inputs: usize,
    },

    /// A `Result`/`NestedResult` names a command that is not earlier in the list.
    UnavailableResult {
        /// Index of the command holding the argument.
        command: usize,
        /// The referenced command.
        result: u16,
    },

    /// Inputs are addressed by `u16`; this transaction already has the most it can hold.
    TooManyInputs(usize),

    /// Commands are addressed by `u16`; this transaction already has the most it can hold.
    TooManyCommands(usize),

    /// `build()` needs a field that was never set or resolved.
    MissingField(&'static str),

    /// An input still carries an `Unresolved*` variant at build time.
    UnresolvedInput { index: usize, kind: &'static str },

    /// An `$Intent` command survived to build time.
    UnresolvedIntent(String),

    /// No resolver is registered for an intent present in the transaction.
    MissingIntentResolver(String),

    /// One or more input objects could not be fetched.
    InvalidObjects(Vec<String>),

    /// Budget estimation dry run did not succeed.
    DryRunFailed(String),

    /// The gas owner has no usable SUI coins.
    NoGasCoins,

    /// Not enough balance of a coin type to satisfy `CoinWithBalance` intents.
    InsufficientBalance {
        coin_type: String,
        owner: String,
        required: u128,
        available: u128,
    },

    /// A plugin returned without invoking its continuation.
    NextNotCalled { plugin: String },

    /// A plugin invoked its continuation but did not drive it to completion.
    NextNotAwaited { plugin: String },

    /// A Move call passed a different number of arguments than the function takes.
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// A JSON value does not fit the Move type it is passed as.
    InvalidPureValue { type_name: String, message: String },

    /// A named package or type could not be resolved.
    UnresolvedName(String),

    /// `replace_command` could not remap a reference to the replaced command.
    InvalidReplacement(String),

    /// Malformed caller input (targets, type strings, object ids).
    InvalidArgument(String),

    /// A transaction snapshot failed to (de)serialize.
    Json(serde_json::Error),

    /// Signing failed.
    Signing(String),
}

impl TransactionError {
    pub fn invalid_pure(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        TransactionError::InvalidPureValue {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Aggregate per-object lookup failures into one error.
    pub fn invalid_object_ids(ids: &[(ObjectID, String)]) -> Self {
        TransactionError::InvalidObjects(
            ids.iter()
                .map(|(id, reason)| format!("{} ({})", id, reason))
                .collect(),
        )
    }
}

impl std::fmt::Display for TransactionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionError::Bcs(e) => write!(f, "{}", e),
            TransactionError::Client(e) => write!(f, "Client error: {}", e),
            TransactionError::NoClient => write!(
                f,
                "No client passed to Transaction::build, but transaction data was not sufficient to build offline"
            ),
            TransactionError::InputOutOfBounds {
                command,
                index,
                inputs,
            } => write!(
                f,
                "Command {} references input {} but the transaction has {} inputs",
                command, index, inputs
            ),
            TransactionError::UnavailableResult { command, result } => write!(
                f,
                "Command {} references the result of command {} which is not available yet",
                command, result
            ),
            TransactionError::TooManyInputs(count) => write!(
                f,
                "Cannot add input {}: inputs are limited to {}",
                count,
                u16::MAX as usize + 1
            ),
            TransactionError::TooManyCommands(count) => write!(
                f,
                "Cannot add command {}: commands are limited to {}",
                count,
                u16::MAX as usize + 1
            ),
            TransactionError::MissingField(field) => write!(f, "Missing {}", field),
            TransactionError::UnresolvedInput { index, kind } => write!(
                f,
                "Input at index {} has not been resolved. Expected a Pure or Object input, but found {}",
                index, kind
            ),
            TransactionError::UnresolvedIntent(name) => {
                write!(f, "Intent {} has not been resolved", name)
            }
            TransactionError::MissingIntentResolver(name) => {
                write!(f, "Missing intent resolver for {}", name)
            }
            TransactionError::InvalidObjects(objects) => write!(
                f,
                "The following input objects are invalid: {}",
                objects.join(", ")
            ),
            TransactionError::DryRunFailed(reason) => write!(
                f,
                "Dry run failed, could not automatically determine a budget: {}",
                reason
            ),
            TransactionError::NoGasCoins => {
                write!(f, "No valid gas coins found for the transaction.")
            }
            TransactionError::InsufficientBalance {
                coin_type,
                owner,
                required,
                available,
            } => write!(
                f,
                "Insufficient balance of {} for owner {}. Required: {}, Available: {}",
                coin_type, owner, required, available
            ),
            TransactionError::NextNotCalled { plugin } => {
                write!(f, "next() was not called in TransactionPlugin {}", plugin)
            }
            TransactionError::NextNotAwaited { plugin } => {
                write!(f, "next() was not awaited in TransactionPlugin {}", plugin)
            }
            TransactionError::ArgumentCount {
                function,
                expected,
                actual,
            } => write!(
                f,
                "Incorrect number of arguments for {}: expected {}, got {}",
                function, expected, actual
            ),
            TransactionError::InvalidPureValue { type_name, message } => {
                write!(f, "Invalid value for {}: {}", type_name, message)
            }
            TransactionError::UnresolvedName(name) => {
                write!(f, "No address found for {}", name)
            }
            TransactionError::InvalidReplacement(msg) => write!(f, "{}", msg),
            TransactionError::InvalidArgument(msg) => write!(f, "{}", msg),
            TransactionError::Json(e) => write!(f, "Invalid transaction JSON: {}", e),
            TransactionError::Signing(msg) => write!(f, "Signing failed: {}", msg),
        }
    }
}

impl std::error::Error for TransactionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransactionError::Bcs(e) => Some(e),
            TransactionError::Client(e) => Some(&**e),
            TransactionError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BcsError> for TransactionError {
    fn from(e: BcsError) -> Self {
        TransactionError::Bcs(e)
    }
}

impl From<anyhow::Error> for TransactionError {
    fn from(e: anyhow::Error) -> Self {
        TransactionError::Client(e)
    }
}

impl From<serde_json::Error> for TransactionError {
    fn from(e: serde_json::Error) -> Self {
        TransactionError::Json(e)
    }
}

pub type Result<T, E = TransactionError> = std::result::Result<T, E>;
