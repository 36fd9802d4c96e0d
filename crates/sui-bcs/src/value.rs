//! Dynamic values, and the struct/enum schemas that operate on them.
//!
//! Struct and enum schemas are declared as ordered lists. The declaration
//! order is the wire order: fields of a [`BcsValue::Struct`] are looked up by
//! name when written, so the order they were inserted in does not matter.

use std::collections::BTreeMap;
use std::sync::Arc;

use primitive_types::U256;

use crate::codec::{BcsType, Codec};
use crate::error::BcsError;
use crate::reader::BcsReader;
use crate::uleb::uleb_encode;
use crate::writer::BcsWriter;

/// A decoded BCS value without a static Rust type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BcsValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(U256),
    String(String),
    Vector(Vec<BcsValue>),
    Option(Option<Box<BcsValue>>),
    Tuple(Vec<BcsValue>),
    Map(Vec<(BcsValue, BcsValue)>),
    Struct(Vec<(String, BcsValue)>),
    Enum {
        variant: String,
        value: Option<Box<BcsValue>>,
    },
}

impl BcsValue {
    pub fn kind(&self) -> &'static str {
        match self {
            BcsValue::Bool(_) => "bool",
            BcsValue::U8(_) => "u8",
            BcsValue::U16(_) => "u16",
            BcsValue::U32(_) => "u32",
            BcsValue::U64(_) => "u64",
            BcsValue::U128(_) => "u128",
            BcsValue::U256(_) => "u256",
            BcsValue::String(_) => "string",
            BcsValue::Vector(_) => "vector",
            BcsValue::Option(_) => "option",
            BcsValue::Tuple(_) => "tuple",
            BcsValue::Map(_) => "map",
            BcsValue::Struct(_) => "struct",
            BcsValue::Enum { .. } => "enum",
        }
    }

    /// Build a struct value from `(field, value)` pairs in any order.
    pub fn structure<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, BcsValue)>,
        K: Into<String>,
    {
        BcsValue::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build an enum value carrying a payload.
    pub fn variant(name: impl Into<String>, value: BcsValue) -> Self {
        BcsValue::Enum {
            variant: name.into(),
            value: Some(Box::new(value)),
        }
    }

    /// Build a payload-less enum value.
    pub fn unit_variant(name: impl Into<String>) -> Self {
        BcsValue::Enum {
            variant: name.into(),
            value: None,
        }
    }

    pub fn encode<T: ToBcsValue + ?Sized>(value: &T) -> Self {
        value.to_bcs_value()
    }

    pub fn decode<T: FromBcsValue>(&self) -> Result<T, BcsError> {
        T::from_bcs_value(self)
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Result<&BcsValue, BcsError> {
        match self {
            BcsValue::Struct(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value)
                .ok_or_else(|| BcsError::mapping("struct", format!("missing field `{}`", name))),
            other => Err(mismatch("struct", other)),
        }
    }

    /// Decode a struct field into `T`.
    pub fn get<T: FromBcsValue>(&self, name: &str) -> Result<T, BcsError> {
        T::from_bcs_value(self.field(name)?).map_err(|err| match err {
            BcsError::Mapping { type_name, message } => BcsError::Mapping {
                type_name,
                message: format!("field `{}`: {}", name, message),
            },
            other => other,
        })
    }

    /// The variant name and payload of an enum value.
    pub fn as_variant(&self) -> Result<(&str, Option<&BcsValue>), BcsError> {
        match self {
            BcsValue::Enum { variant, value } => Ok((variant.as_str(), value.as_deref())),
            other => Err(mismatch("enum", other)),
        }
    }

    /// The payload of an enum value, failing for unit variants.
    pub fn payload(&self) -> Result<&BcsValue, BcsError> {
        match self.as_variant()? {
            (_, Some(value)) => Ok(value),
            (variant, None) => Err(BcsError::mapping(
                "enum",
                format!("variant `{}` has no payload", variant),
            )),
        }
    }

    pub fn as_vector(&self) -> Result<&[BcsValue], BcsError> {
        match self {
            BcsValue::Vector(items) | BcsValue::Tuple(items) => Ok(items.as_slice()),
            other => Err(mismatch("vector", other)),
        }
    }

    pub fn as_u64(&self) -> Result<u64, BcsError> {
        match self {
            BcsValue::U8(v) => Ok(u64::from(*v)),
            BcsValue::U16(v) => Ok(u64::from(*v)),
            BcsValue::U32(v) => Ok(u64::from(*v)),
            BcsValue::U64(v) => Ok(*v),
            other => Err(mismatch("u64", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, BcsError> {
        match self {
            BcsValue::String(s) => Ok(s),
            other => Err(mismatch("string", other)),
        }
    }
}

fn mismatch(expected: &str, found: &BcsValue) -> BcsError {
    BcsError::mapping(expected, format!("expected {}, found {}", expected, found.kind()))
}

/// Conversion into the dynamic representation.
pub trait ToBcsValue {
    fn to_bcs_value(&self) -> BcsValue;
}

/// Conversion out of the dynamic representation.
pub trait FromBcsValue: Sized {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError>;
}

impl ToBcsValue for BcsValue {
    fn to_bcs_value(&self) -> BcsValue {
        self.clone()
    }
}

impl FromBcsValue for BcsValue {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        Ok(value.clone())
    }
}

macro_rules! scalar_value {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl ToBcsValue for $ty {
            fn to_bcs_value(&self) -> BcsValue {
                BcsValue::$variant(self.clone())
            }
        }

        impl FromBcsValue for $ty {
            fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
                match value {
                    BcsValue::$variant(v) => Ok(v.clone()),
                    other => Err(mismatch($name, other)),
                }
            }
        }
    };
}

scalar_value!(bool, Bool, "bool");
scalar_value!(u8, U8, "u8");
scalar_value!(u16, U16, "u16");
scalar_value!(u32, U32, "u32");
scalar_value!(u64, U64, "u64");
scalar_value!(u128, U128, "u128");
scalar_value!(U256, U256, "u256");
scalar_value!(String, String, "string");

impl ToBcsValue for str {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::String(self.to_string())
    }
}

impl<T: ToBcsValue> ToBcsValue for Vec<T> {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::Vector(self.iter().map(ToBcsValue::to_bcs_value).collect())
    }
}

impl<T: FromBcsValue> FromBcsValue for Vec<T> {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        value.as_vector()?.iter().map(T::from_bcs_value).collect()
    }
}

impl<T: ToBcsValue> ToBcsValue for Option<T> {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::Option(self.as_ref().map(|v| Box::new(v.to_bcs_value())))
    }
}

impl<T: FromBcsValue> FromBcsValue for Option<T> {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value {
            BcsValue::Option(inner) => inner.as_deref().map(T::from_bcs_value).transpose(),
            other => Err(mismatch("option", other)),
        }
    }
}

impl<T: ToBcsValue> ToBcsValue for Box<T> {
    fn to_bcs_value(&self) -> BcsValue {
        (**self).to_bcs_value()
    }
}

impl<A: ToBcsValue, B: ToBcsValue> ToBcsValue for (A, B) {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::Tuple(vec![self.0.to_bcs_value(), self.1.to_bcs_value()])
    }
}

impl<A: FromBcsValue, B: FromBcsValue> FromBcsValue for (A, B) {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_vector()? {
            [a, b] => Ok((A::from_bcs_value(a)?, B::from_bcs_value(b)?)),
            items => Err(BcsError::mapping(
                "tuple",
                format!("expected 2 elements, found {}", items.len()),
            )),
        }
    }
}

impl<A: ToBcsValue, B: ToBcsValue, C: ToBcsValue> ToBcsValue for (A, B, C) {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::Tuple(vec![
            self.0.to_bcs_value(),
            self.1.to_bcs_value(),
            self.2.to_bcs_value(),
        ])
    }
}

impl<A: FromBcsValue, B: FromBcsValue, C: FromBcsValue> FromBcsValue for (A, B, C) {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value.as_vector()? {
            [a, b, c] => Ok((
                A::from_bcs_value(a)?,
                B::from_bcs_value(b)?,
                C::from_bcs_value(c)?,
            )),
            items => Err(BcsError::mapping(
                "tuple",
                format!("expected 3 elements, found {}", items.len()),
            )),
        }
    }
}

impl<K: ToBcsValue, V: ToBcsValue> ToBcsValue for BTreeMap<K, V> {
    fn to_bcs_value(&self) -> BcsValue {
        BcsValue::Map(
            self.iter()
                .map(|(k, v)| (k.to_bcs_value(), v.to_bcs_value()))
                .collect(),
        )
    }
}

impl<K: FromBcsValue + Ord, V: FromBcsValue> FromBcsValue for BTreeMap<K, V> {
    fn from_bcs_value(value: &BcsValue) -> Result<Self, BcsError> {
        match value {
            BcsValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| Ok::<_, BcsError>((K::from_bcs_value(k)?, V::from_bcs_value(v)?)))
                .collect(),
            other => Err(mismatch("map", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Schemas over BcsValue
// ---------------------------------------------------------------------------

/// Adapts a typed codec to [`BcsValue`].
pub struct ErasedCodec<T> {
    inner: BcsType<T>,
}

impl<T: ToBcsValue + FromBcsValue> Codec<BcsValue> for ErasedCodec<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<BcsValue, BcsError> {
        Ok(self.inner.read(reader)?.to_bcs_value())
    }

    fn write(&self, value: &BcsValue, writer: &mut BcsWriter) -> Result<(), BcsError> {
        self.inner.write(&self.typed(value)?, writer)
    }

    fn validate(&self, value: &BcsValue) -> Result<(), BcsError> {
        self.inner.validate(&self.typed(value)?)
    }

    fn serialized_size(&self, value: &BcsValue) -> Option<usize> {
        self.inner.serialized_size(&self.typed(value).ok()?)
    }
}

impl<T: FromBcsValue> ErasedCodec<T> {
    fn typed(&self, value: &BcsValue) -> Result<T, BcsError> {
        T::from_bcs_value(value).map_err(|err| match err {
            BcsError::Mapping { message, .. } => BcsError::Validation {
                type_name: self.inner.name().to_string(),
                value: format!("{:?}", value),
                reason: message,
            },
            other => other,
        })
    }
}

/// Use a typed codec where a [`BcsValue`] schema is expected.
pub fn erased<T>(inner: BcsType<T>) -> BcsType<BcsValue>
where
    T: ToBcsValue + FromBcsValue + 'static,
{
    Arc::new(ErasedCodec { inner })
}

/// Fields written in declaration order.
pub struct StructCodec {
    name: String,
    fields: Vec<(String, BcsType<BcsValue>)>,
}

impl StructCodec {
    fn lookup<'v>(&self, value: &'v BcsValue, field: &str) -> Result<&'v BcsValue, BcsError> {
        let BcsValue::Struct(entries) = value else {
            return Err(BcsError::validation(
                &self.name,
                value,
                format!("expected struct, found {}", value.kind()),
            ));
        };
        entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
            .ok_or_else(|| {
                BcsError::validation(&self.name, value, format!("missing field `{}`", field))
            })
    }
}

impl Codec<BcsValue> for StructCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<BcsValue, BcsError> {
        let mut entries = Vec::with_capacity(self.fields.len());
        for (name, codec) in &self.fields {
            entries.push((name.clone(), codec.read(reader)?));
        }
        Ok(BcsValue::Struct(entries))
    }

    fn write(&self, value: &BcsValue, writer: &mut BcsWriter) -> Result<(), BcsError> {
        for (name, codec) in &self.fields {
            codec.write(self.lookup(value, name)?, writer)?;
        }
        Ok(())
    }

    fn validate(&self, value: &BcsValue) -> Result<(), BcsError> {
        for (name, codec) in &self.fields {
            codec.validate(self.lookup(value, name)?)?;
        }
        Ok(())
    }

    fn serialized_size(&self, value: &BcsValue) -> Option<usize> {
        let mut total = 0usize;
        for (name, codec) in &self.fields {
            total += codec.serialized_size(self.lookup(value, name).ok()?)?;
        }
        Some(total)
    }
}

/// Declare a struct schema. Field order is wire order.
pub fn struct_type<I, S>(name: impl Into<String>, fields: I) -> BcsType<BcsValue>
where
    I: IntoIterator<Item = (S, BcsType<BcsValue>)>,
    S: Into<String>,
{
    Arc::new(StructCodec {
        name: name.into(),
        fields: fields.into_iter().map(|(n, c)| (n.into(), c)).collect(),
    })
}

/// Tagged union: ULEB128 variant index then the variant payload, if any.
pub struct EnumCodec {
    name: String,
    variants: Vec<(String, Option<BcsType<BcsValue>>)>,
}

impl EnumCodec {
    fn lookup<'v>(
        &self,
        value: &'v BcsValue,
    ) -> Result<(usize, Option<&BcsType<BcsValue>>, Option<&'v BcsValue>), BcsError> {
        let BcsValue::Enum { variant, value: payload } = value else {
            return Err(BcsError::validation(
                &self.name,
                value,
                format!("expected enum, found {}", value.kind()),
            ));
        };
        let (index, (_, codec)) = self
            .variants
            .iter()
            .enumerate()
            .find(|(_, (name, _))| name == variant)
            .ok_or_else(|| {
                BcsError::validation(&self.name, value, format!("unknown variant `{}`", variant))
            })?;
        match (codec, payload) {
            (Some(_), None) => Err(BcsError::validation(
                &self.name,
                value,
                format!("variant `{}` requires a payload", variant),
            )),
            (None, Some(_)) => Err(BcsError::validation(
                &self.name,
                value,
                format!("variant `{}` takes no payload", variant),
            )),
            _ => Ok((index, codec.as_ref(), payload.as_deref())),
        }
    }
}

impl Codec<BcsValue> for EnumCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<BcsValue, BcsError> {
        let index = reader.read_uleb128()?;
        let (variant, codec) =
            self.variants
                .get(index as usize)
                .ok_or_else(|| BcsError::UnknownVariant {
                    type_name: self.name.clone(),
                    index,
                })?;
        let value = match codec {
            Some(codec) => Some(Box::new(codec.read(reader)?)),
            None => None,
        };
        Ok(BcsValue::Enum {
            variant: variant.clone(),
            value,
        })
    }

    fn write(&self, value: &BcsValue, writer: &mut BcsWriter) -> Result<(), BcsError> {
        let (index, codec, payload) = self.lookup(value)?;
        writer.write_uleb128(index as u64)?;
        if let (Some(codec), Some(payload)) = (codec, payload) {
            codec.write(payload, writer)?;
        }
        Ok(())
    }

    fn validate(&self, value: &BcsValue) -> Result<(), BcsError> {
        match self.lookup(value)? {
            (_, Some(codec), Some(payload)) => codec.validate(payload),
            _ => Ok(()),
        }
    }

    fn serialized_size(&self, value: &BcsValue) -> Option<usize> {
        let (index, codec, payload) = self.lookup(value).ok()?;
        let tag = uleb_encode(index as u64).len();
        match (codec, payload) {
            (Some(codec), Some(payload)) => Some(tag + codec.serialized_size(payload)?),
            _ => Some(tag),
        }
    }
}

/// Declare an enum schema. Variant order defines the discriminants.
pub fn enum_type<I, S>(name: impl Into<String>, variants: I) -> BcsType<BcsValue>
where
    I: IntoIterator<Item = (S, Option<BcsType<BcsValue>>)>,
    S: Into<String>,
{
    Arc::new(EnumCodec {
        name: name.into(),
        variants: variants.into_iter().map(|(n, c)| (n.into(), c)).collect(),
    })
}

/// Heterogeneous tuple of dynamic schemas.
pub struct TupleCodec {
    name: String,
    elements: Vec<BcsType<BcsValue>>,
}

impl TupleCodec {
    fn items<'v>(&self, value: &'v BcsValue) -> Result<&'v [BcsValue], BcsError> {
        match value {
            BcsValue::Tuple(items) if items.len() == self.elements.len() => Ok(items.as_slice()),
            other => Err(BcsError::validation(
                &self.name,
                other,
                format!("expected tuple of {} elements", self.elements.len()),
            )),
        }
    }
}

impl Codec<BcsValue> for TupleCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<BcsValue, BcsError> {
        let mut items = Vec::with_capacity(self.elements.len());
        for codec in &self.elements {
            items.push(codec.read(reader)?);
        }
        Ok(BcsValue::Tuple(items))
    }

    fn write(&self, value: &BcsValue, writer: &mut BcsWriter) -> Result<(), BcsError> {
        for (codec, item) in self.elements.iter().zip(self.items(value)?) {
            codec.write(item, writer)?;
        }
        Ok(())
    }

    fn validate(&self, value: &BcsValue) -> Result<(), BcsError> {
        for (codec, item) in self.elements.iter().zip(self.items(value)?) {
            codec.validate(item)?;
        }
        Ok(())
    }

    fn serialized_size(&self, value: &BcsValue) -> Option<usize> {
        let mut total = 0usize;
        for (codec, item) in self.elements.iter().zip(self.items(value).ok()?) {
            total += codec.serialized_size(item)?;
        }
        Some(total)
    }
}

pub fn tuple(elements: Vec<BcsType<BcsValue>>) -> BcsType<BcsValue> {
    let names: Vec<&str> = elements.iter().map(|c| c.name()).collect();
    let name = format!("({})", names.join(", "));
    Arc::new(TupleCodec { name, elements })
}

/// `vector<T>` over dynamic values.
pub fn dyn_vector(element: BcsType<BcsValue>) -> BcsType<BcsValue> {
    erased(crate::composite::vector(element))
}

/// `Option<T>` over dynamic values.
pub fn dyn_option(inner: BcsType<BcsValue>) -> BcsType<BcsValue> {
    erased(crate::composite::option(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecExt;
    use crate::composite::vector;
    use crate::primitives::{bool, string, u64, u8};
    use serde::Serialize;

    fn coin_schema() -> BcsType<BcsValue> {
        struct_type(
            "Coin",
            vec![
                ("value", erased(u64())),
                ("owner", erased(string())),
                ("frozen", erased(bool())),
            ],
        )
    }

    #[derive(Serialize)]
    struct Coin {
        value: u64,
        owner: String,
        frozen: bool,
    }

    #[test]
    fn test_struct_declaration_order_wins() {
        // Inserted out of order on purpose.
        let value = BcsValue::structure(vec![
            ("frozen", BcsValue::Bool(true)),
            ("owner", BcsValue::String("alice".into())),
            ("value", BcsValue::U64(1000)),
        ]);
        let bytes = coin_schema().to_bytes(&value).unwrap();
        let expected = ::bcs::to_bytes(&Coin {
            value: 1000,
            owner: "alice".into(),
            frozen: true,
        })
        .unwrap();
        assert_eq!(bytes, expected);

        let decoded = coin_schema().parse(&bytes).unwrap();
        assert_eq!(decoded.get::<u64>("value").unwrap(), 1000);
        assert_eq!(decoded.get::<String>("owner").unwrap(), "alice");
        let BcsValue::Struct(fields) = decoded else {
            panic!("expected struct");
        };
        let names: Vec<_> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["value", "owner", "frozen"]);
    }

    #[test]
    fn test_struct_missing_field() {
        let value = BcsValue::structure(vec![("value", BcsValue::U64(1))]);
        let err = coin_schema().to_bytes(&value).unwrap_err();
        assert!(err.to_string().contains("Coin"));
        assert!(err.to_string().contains("missing field `owner`"));
    }

    fn abc_schema() -> BcsType<BcsValue> {
        enum_type(
            "Abc",
            vec![
                ("A", None),
                ("B", Some(erased(u8()))),
                ("C", Some(erased(string()))),
            ],
        )
    }

    #[test]
    fn test_enum_discriminant_is_declaration_index() {
        let bytes = abc_schema()
            .to_bytes(&BcsValue::variant("B", BcsValue::U8(7)))
            .unwrap();
        assert_eq!(bytes, vec![1, 7]);

        let decoded = abc_schema().parse(&[1, 9]).unwrap();
        assert_eq!(decoded, BcsValue::variant("B", BcsValue::U8(9)));

        assert_eq!(
            abc_schema().to_bytes(&BcsValue::unit_variant("A")).unwrap(),
            vec![0]
        );
    }

    #[test]
    fn test_enum_rejects_unknown_discriminant() {
        let err = abc_schema().parse(&[3]).unwrap_err();
        assert_eq!(
            err,
            BcsError::UnknownVariant {
                type_name: "Abc".into(),
                index: 3
            }
        );
    }

    #[test]
    fn test_enum_payload_shape_is_validated() {
        let err = abc_schema()
            .to_bytes(&BcsValue::unit_variant("B"))
            .unwrap_err();
        assert!(err.to_string().contains("requires a payload"));
        let err = abc_schema()
            .to_bytes(&BcsValue::variant("D", BcsValue::U8(0)))
            .unwrap_err();
        assert!(err.to_string().contains("unknown variant `D`"));
    }

    #[derive(Serialize)]
    enum Abc {
        #[allow(dead_code)]
        A,
        B(u8),
        C(String),
    }

    #[derive(Serialize)]
    struct Holder {
        items: Vec<Option<Abc>>,
        tag: (u8, String),
    }

    #[test]
    fn test_nested_composition_round_trip() {
        let schema = struct_type(
            "Holder",
            vec![
                ("items", dyn_vector(dyn_option(abc_schema()))),
                ("tag", tuple(vec![erased(u8()), erased(string())])),
            ],
        );
        let value = BcsValue::structure(vec![
            (
                "items",
                BcsValue::Vector(vec![
                    BcsValue::Option(Some(Box::new(BcsValue::variant("B", BcsValue::U8(1))))),
                    BcsValue::Option(None),
                    BcsValue::Option(Some(Box::new(BcsValue::variant(
                        "C",
                        BcsValue::String("x".into()),
                    )))),
                ]),
            ),
            (
                "tag",
                BcsValue::Tuple(vec![BcsValue::U8(5), BcsValue::String("t".into())]),
            ),
        ]);

        let bytes = schema.to_bytes(&value).unwrap();
        let expected = ::bcs::to_bytes(&Holder {
            items: vec![Some(Abc::B(1)), None, Some(Abc::C("x".into()))],
            tag: (5, "t".into()),
        })
        .unwrap();
        assert_eq!(bytes, expected);
        assert_eq!(schema.parse(&bytes).unwrap(), value);
        assert_eq!(schema.serialized_size(&value), Some(bytes.len()));
    }

    #[test]
    fn test_erased_rejects_wrong_kind() {
        let codec = erased(vector(u8()));
        let err = codec.to_bytes(&BcsValue::String("nope".into())).unwrap_err();
        assert!(matches!(err, BcsError::Validation { .. }));
    }
}
