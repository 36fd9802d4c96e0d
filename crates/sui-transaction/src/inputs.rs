//! Input slots: resolved call arguments plus the unresolved forms the
//! pipeline rewrites.

use serde::{Deserialize, Serialize};
use sui_types::{
    CallArg as WireCallArg, ObjectArg, ObjectDigest, ObjectID, ObjectRef, SequenceNumber,
};

use crate::error::{Result, TransactionError};

/// An object known only by id, with whatever metadata the caller supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedObject {
    pub object_id: ObjectID,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<SequenceNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<ObjectDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_shared_version: Option<SequenceNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutable: Option<bool>,
}

impl UnresolvedObject {
    pub fn new(object_id: ObjectID) -> Self {
        Self {
            object_id,
            version: None,
            digest: None,
            initial_shared_version: None,
            mutable: None,
        }
    }

    /// True when neither a version nor a shared version is known yet.
    pub fn needs_fetch(&self) -> bool {
        self.version.is_none() && self.initial_shared_version.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    Object(ObjectArg),
    /// BCS bytes of a pure value.
    Pure(Vec<u8>),
    /// A JSON value whose Move type is not known yet.
    UnresolvedPure(serde_json::Value),
    UnresolvedObject(UnresolvedObject),
}

impl CallArg {
    pub fn object_ref(object: ObjectRef) -> Self {
        CallArg::Object(ObjectArg::ImmOrOwnedObject(object))
    }

    pub fn shared_object(id: ObjectID, initial_shared_version: SequenceNumber, mutable: bool) -> Self {
        CallArg::Object(ObjectArg::SharedObject {
            id,
            initial_shared_version,
            mutable,
        })
    }

    pub fn receiving(object: ObjectRef) -> Self {
        CallArg::Object(ObjectArg::Receiving(object))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CallArg::Object(_) => "Object",
            CallArg::Pure(_) => "Pure",
            CallArg::UnresolvedPure(_) => "UnresolvedPure",
            CallArg::UnresolvedObject(_) => "UnresolvedObject",
        }
    }

    /// The object id behind an object input, resolved or not.
    pub fn object_id(&self) -> Option<ObjectID> {
        match self {
            CallArg::Object(arg) => Some(arg.id()),
            CallArg::UnresolvedObject(obj) => Some(obj.object_id),
            CallArg::Pure(_) | CallArg::UnresolvedPure(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CallArg::Object(_) | CallArg::Pure(_))
    }

    /// Wire form; fails for unresolved inputs.
    pub fn to_wire(&self, index: usize) -> Result<WireCallArg> {
        match self {
            CallArg::Object(arg) => Ok(WireCallArg::Object(*arg)),
            CallArg::Pure(bytes) => Ok(WireCallArg::Pure(bytes.clone())),
            other => Err(TransactionError::UnresolvedInput {
                index,
                kind: other.kind(),
            }),
        }
    }
}

impl From<WireCallArg> for CallArg {
    fn from(arg: WireCallArg) -> Self {
        match arg {
            WireCallArg::Pure(bytes) => CallArg::Pure(bytes),
            WireCallArg::Object(obj) => CallArg::Object(obj),
        }
    }
}
