//! Object references and ownership.

use serde::{Deserialize, Serialize};
use sui_bcs::{BcsError, BcsValue, FromBcsValue, ToBcsValue};

use crate::address::{ObjectID, SuiAddress};
use crate::digest::ObjectDigest;

pub type SequenceNumber = u64;

/// `(id, version, digest)` identifying one version of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: ObjectID,
    pub version: SequenceNumber,
    pub digest: ObjectDigest,
}

impl ObjectRef {
    pub fn new(object_id: ObjectID, version: SequenceNumber, digest: ObjectDigest) -> Self {
        Self {
            object_id,
            version,
            digest,
        }
    }
}

impl ToBcsValue for ObjectRef {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::structure([
            ("objectId", self.object_id.to_bcs_value()),
            ("version", BcsValue::U64(self.version)),
            ("digest", self.digest.to_bcs_value()),
        ])
    }
}

impl FromBcsValue for ObjectRef {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        Ok(Self {
            object_id: value.get("objectId")?,
            version: value.get("version")?,
            digest: value.get("digest")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    AddressOwner(SuiAddress),
    ObjectOwner(SuiAddress),
    Shared {
        initial_shared_version: SequenceNumber,
    },
    Immutable,
    ConsensusAddressOwner {
        start_version: SequenceNumber,
        owner: SuiAddress,
    },
}

impl Owner {
    /// Version to use when the object is passed as a shared input.
    pub fn initial_shared_version(&self) -> Option<SequenceNumber> {
        match self {
            Owner::Shared {
                initial_shared_version,
            } => Some(*initial_shared_version),
            Owner::ConsensusAddressOwner { start_version, .. } => Some(*start_version),
            _ => None,
        }
    }

    /// Single-owner objects are the ones a reset must forget.
    pub fn is_owned(&self) -> bool {
        matches!(self, Owner::AddressOwner(_) | Owner::ObjectOwner(_))
    }

    pub fn address(&self) -> Option<SuiAddress> {
        match self {
            Owner::AddressOwner(addr) | Owner::ObjectOwner(addr) => Some(*addr),
            Owner::ConsensusAddressOwner { owner, .. } => Some(*owner),
            _ => None,
        }
    }
}

impl ToBcsValue for Owner {
    fn to_bcs_value(&self) -> BcsValue {
        match self {
            Owner::AddressOwner(addr) => BcsValue::variant("AddressOwner", addr.to_bcs_value()),
            Owner::ObjectOwner(addr) => BcsValue::variant("ObjectOwner", addr.to_bcs_value()),
            Owner::Shared {
                initial_shared_version,
            } => BcsValue::variant(
                "Shared",
                BcsValue::structure([(
                    "initialSharedVersion",
                    BcsValue::U64(*initial_shared_version),
                )]),
            ),
            Owner::Immutable => BcsValue::unit_variant("Immutable"),
            Owner::ConsensusAddressOwner {
                start_version,
                owner,
            } => BcsValue::variant(
                "ConsensusAddressOwner",
                BcsValue::structure([
                    ("startVersion", BcsValue::U64(*start_version)),
                    ("owner", owner.to_bcs_value()),
                ]),
            ),
        }
    }
}

impl FromBcsValue for Owner {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        let (variant, payload) = value.as_variant()?;
        let payload = || {
            payload.ok_or_else(|| BcsError::mapping("Owner", format!("{} has no payload", variant)))
        };
        match variant {
            "AddressOwner" => Ok(Owner::AddressOwner(payload()?.decode()?)),
            "ObjectOwner" => Ok(Owner::ObjectOwner(payload()?.decode()?)),
            "Shared" => Ok(Owner::Shared {
                initial_shared_version: payload()?.get("initialSharedVersion")?,
            }),
            "Immutable" => Ok(Owner::Immutable),
            "ConsensusAddressOwner" => {
                let payload = payload()?;
                Ok(Owner::ConsensusAddressOwner {
                    start_version: payload.get("startVersion")?,
                    owner: payload.get("owner")?,
                })
            }
            other => Err(BcsError::mapping(
                "Owner",
                format!("unknown variant `{}`", other),
            )),
        }
    }
}
