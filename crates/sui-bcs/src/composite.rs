//! Composite codecs built from other codecs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::codec::{BcsType, Codec, CodecExt};
use crate::error::BcsError;
use crate::reader::BcsReader;
use crate::uleb::uleb_encode;
use crate::writer::BcsWriter;

fn sum_sizes<'a, T: 'a>(
    codec: &dyn Codec<T>,
    values: impl Iterator<Item = &'a T>,
) -> Option<usize> {
    let mut total = 0usize;
    for value in values {
        total = total.checked_add(codec.serialized_size(value)?)?;
    }
    Some(total)
}

// ---------------------------------------------------------------------------
// vector / fixed array
// ---------------------------------------------------------------------------

/// ULEB128 length followed by each element.
pub struct VectorCodec<T> {
    name: String,
    element: BcsType<T>,
}

impl<T> Codec<Vec<T>> for VectorCodec<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<Vec<T>, BcsError> {
        reader.read_vec(|reader, _, _| self.element.read(reader))
    }

    fn write(&self, value: &Vec<T>, writer: &mut BcsWriter) -> Result<(), BcsError> {
        writer
            .write_vec(value, |writer, item, _, _| self.element.write(item, writer))
            .map(|_| ())
    }

    fn validate(&self, value: &Vec<T>) -> Result<(), BcsError> {
        value.iter().try_for_each(|item| self.element.validate(item))
    }

    fn serialized_size(&self, value: &Vec<T>) -> Option<usize> {
        let body = sum_sizes(self.element.as_ref(), value.iter())?;
        Some(uleb_encode(value.len() as u64).len() + body)
    }
}

pub fn vector<T: 'static>(element: BcsType<T>) -> BcsType<Vec<T>> {
    Arc::new(VectorCodec {
        name: format!("vector<{}>", element.name()),
        element,
    })
}

/// Exactly `length` elements with no length prefix.
pub struct FixedArrayCodec<T> {
    name: String,
    element: BcsType<T>,
    length: usize,
}

impl<T> Codec<Vec<T>> for FixedArrayCodec<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<Vec<T>, BcsError> {
        let mut items = Vec::with_capacity(self.length.min(reader.remaining()));
        for _ in 0..self.length {
            items.push(self.element.read(reader)?);
        }
        Ok(items)
    }

    fn write(&self, value: &Vec<T>, writer: &mut BcsWriter) -> Result<(), BcsError> {
        value
            .iter()
            .try_for_each(|item| self.element.write(item, writer))
    }

    fn validate(&self, value: &Vec<T>) -> Result<(), BcsError> {
        if value.len() != self.length {
            return Err(BcsError::validation(
                &self.name,
                format!("array of length {}", value.len()),
                format!("expected length {}", self.length),
            ));
        }
        value.iter().try_for_each(|item| self.element.validate(item))
    }

    fn serialized_size(&self, value: &Vec<T>) -> Option<usize> {
        sum_sizes(self.element.as_ref(), value.iter())
    }
}

pub fn fixed_array<T: 'static>(length: usize, element: BcsType<T>) -> BcsType<Vec<T>> {
    Arc::new(FixedArrayCodec {
        name: format!("{}[{}]", element.name(), length),
        element,
        length,
    })
}

// ---------------------------------------------------------------------------
// option / tuples / map
// ---------------------------------------------------------------------------

/// Two-variant enum `{None, Some(T)}`.
pub struct OptionCodec<T> {
    name: String,
    inner: BcsType<T>,
}

impl<T> Codec<Option<T>> for OptionCodec<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<Option<T>, BcsError> {
        match reader.read_uleb128()? {
            0 => Ok(None),
            1 => Ok(Some(self.inner.read(reader)?)),
            index => Err(BcsError::UnknownVariant {
                type_name: self.name.clone(),
                index,
            }),
        }
    }

    fn write(&self, value: &Option<T>, writer: &mut BcsWriter) -> Result<(), BcsError> {
        match value {
            None => writer.write_uleb128(0).map(|_| ()),
            Some(inner) => {
                writer.write_uleb128(1)?;
                self.inner.write(inner, writer)
            }
        }
    }

    fn validate(&self, value: &Option<T>) -> Result<(), BcsError> {
        match value {
            Some(inner) => self.inner.validate(inner),
            None => Ok(()),
        }
    }

    fn serialized_size(&self, value: &Option<T>) -> Option<usize> {
        match value {
            None => Some(1),
            Some(inner) => Some(1 + self.inner.serialized_size(inner)?),
        }
    }
}

pub fn option<T: 'static>(inner: BcsType<T>) -> BcsType<Option<T>> {
    Arc::new(OptionCodec {
        name: format!("Option<{}>", inner.name()),
        inner,
    })
}

pub struct Tuple2Codec<A, B> {
    name: String,
    first: BcsType<A>,
    second: BcsType<B>,
}

impl<A, B> Codec<(A, B)> for Tuple2Codec<A, B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<(A, B), BcsError> {
        let a = self.first.read(reader)?;
        let b = self.second.read(reader)?;
        Ok((a, b))
    }

    fn write(&self, value: &(A, B), writer: &mut BcsWriter) -> Result<(), BcsError> {
        self.first.write(&value.0, writer)?;
        self.second.write(&value.1, writer)
    }

    fn validate(&self, value: &(A, B)) -> Result<(), BcsError> {
        self.first.validate(&value.0)?;
        self.second.validate(&value.1)
    }

    fn serialized_size(&self, value: &(A, B)) -> Option<usize> {
        Some(self.first.serialized_size(&value.0)? + self.second.serialized_size(&value.1)?)
    }
}

pub fn tuple2<A: 'static, B: 'static>(first: BcsType<A>, second: BcsType<B>) -> BcsType<(A, B)> {
    Arc::new(Tuple2Codec {
        name: format!("({}, {})", first.name(), second.name()),
        first,
        second,
    })
}

pub struct Tuple3Codec<A, B, C> {
    name: String,
    first: BcsType<A>,
    second: BcsType<B>,
    third: BcsType<C>,
}

impl<A, B, C> Codec<(A, B, C)> for Tuple3Codec<A, B, C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<(A, B, C), BcsError> {
        let a = self.first.read(reader)?;
        let b = self.second.read(reader)?;
        let c = self.third.read(reader)?;
        Ok((a, b, c))
    }

    fn write(&self, value: &(A, B, C), writer: &mut BcsWriter) -> Result<(), BcsError> {
        self.first.write(&value.0, writer)?;
        self.second.write(&value.1, writer)?;
        self.third.write(&value.2, writer)
    }

    fn validate(&self, value: &(A, B, C)) -> Result<(), BcsError> {
        self.first.validate(&value.0)?;
        self.second.validate(&value.1)?;
        self.third.validate(&value.2)
    }

    fn serialized_size(&self, value: &(A, B, C)) -> Option<usize> {
        Some(
            self.first.serialized_size(&value.0)?
                + self.second.serialized_size(&value.1)?
                + self.third.serialized_size(&value.2)?,
        )
    }
}

pub fn tuple3<A: 'static, B: 'static, C: 'static>(
    first: BcsType<A>,
    second: BcsType<B>,
    third: BcsType<C>,
) -> BcsType<(A, B, C)> {
    Arc::new(Tuple3Codec {
        name: format!("({}, {}, {})", first.name(), second.name(), third.name()),
        first,
        second,
        third,
    })
}

/// A vector of `(key, value)` pairs.
///
/// Entries are written ordered by the encoded bytes of their keys, which is
/// the canonical BCS map order and not necessarily the `Ord` order of `K`.
/// Reading enforces the same order, so duplicate keys are rejected.
pub struct MapCodec<K, V> {
    name: String,
    key: BcsType<K>,
    value: BcsType<V>,
}

impl<K: Ord, V> Codec<BTreeMap<K, V>> for MapCodec<K, V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<BTreeMap<K, V>, BcsError> {
        let length = reader.read_uleb128()?;
        let mut map = BTreeMap::new();
        let mut previous: Option<&[u8]> = None;
        for entry in 0..length {
            let start = reader.position();
            let key = self.key.read(reader)?;
            let key_bytes = reader.consumed_since(start);
            if previous.is_some_and(|prev| prev >= key_bytes) {
                return Err(BcsError::UnorderedMapKeys {
                    type_name: self.name.clone(),
                    entry,
                });
            }
            previous = Some(key_bytes);
            let value = self.value.read(reader)?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn write(&self, value: &BTreeMap<K, V>, writer: &mut BcsWriter) -> Result<(), BcsError> {
        let mut entries = Vec::with_capacity(value.len());
        for (key, item) in value {
            entries.push((self.key.to_bytes(key)?, item));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        writer.write_uleb128(entries.len() as u64)?;
        for (key_bytes, item) in entries {
            writer.write_bytes(&key_bytes)?;
            self.value.write(item, writer)?;
        }
        Ok(())
    }

    fn validate(&self, value: &BTreeMap<K, V>) -> Result<(), BcsError> {
        for (key, item) in value {
            self.key.validate(key)?;
            self.value.validate(item)?;
        }
        Ok(())
    }

    fn serialized_size(&self, value: &BTreeMap<K, V>) -> Option<usize> {
        let keys = sum_sizes(self.key.as_ref(), value.keys())?;
        let values = sum_sizes(self.value.as_ref(), value.values())?;
        Some(uleb_encode(value.len() as u64).len() + keys + values)
    }
}

pub fn map<K: Ord + 'static, V: 'static>(
    key: BcsType<K>,
    value: BcsType<V>,
) -> BcsType<BTreeMap<K, V>> {
    Arc::new(MapCodec {
        name: format!("Map<{}, {}>", key.name(), value.name()),
        key,
        value,
    })
}

// ---------------------------------------------------------------------------
// transform / lazy
// ---------------------------------------------------------------------------

type InputFn<T, U> = dyn Fn(&U) -> Result<T, BcsError> + Send + Sync;
type OutputFn<T, U> = dyn Fn(T) -> Result<U, BcsError> + Send + Sync;
type ValidateFn<U> = dyn Fn(&U) -> Result<(), BcsError> + Send + Sync;

/// Presents a `T` codec as a `U` codec without touching the wire format.
pub struct Transform<T, U> {
    name: String,
    inner: BcsType<T>,
    input: Arc<InputFn<T, U>>,
    output: Arc<OutputFn<T, U>>,
    validator: Option<Arc<ValidateFn<U>>>,
}

impl<T: 'static, U: 'static> Transform<T, U> {
    pub fn new<I, O>(inner: BcsType<T>, input: I, output: O) -> Self
    where
        I: Fn(&U) -> Result<T, BcsError> + Send + Sync + 'static,
        O: Fn(T) -> Result<U, BcsError> + Send + Sync + 'static,
    {
        Self {
            name: inner.name().to_string(),
            inner,
            input: Arc::new(input),
            output: Arc::new(output),
            validator: None,
        }
    }

    /// Rename the resulting schema.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a check run on the `U` value before it is mapped and written.
    pub fn with_validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&U) -> Result<(), BcsError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validate));
        self
    }

    pub fn build(self) -> BcsType<U> {
        Arc::new(self)
    }
}

impl<T, U> Codec<U> for Transform<T, U> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<U, BcsError> {
        let raw = self.inner.read(reader)?;
        (self.output)(raw)
    }

    fn write(&self, value: &U, writer: &mut BcsWriter) -> Result<(), BcsError> {
        let raw = (self.input)(value)?;
        self.inner.write(&raw, writer)
    }

    fn validate(&self, value: &U) -> Result<(), BcsError> {
        if let Some(validator) = &self.validator {
            validator(value)?;
        }
        let raw = (self.input)(value)?;
        self.inner.validate(&raw)
    }

    fn serialized_size(&self, value: &U) -> Option<usize> {
        let raw = (self.input)(value).ok()?;
        self.inner.serialized_size(&raw)
    }
}

/// Shorthand for [`Transform::new`] followed by [`Transform::build`].
pub fn transform<T, U, I, O>(inner: BcsType<T>, input: I, output: O) -> BcsType<U>
where
    T: 'static,
    U: 'static,
    I: Fn(&U) -> Result<T, BcsError> + Send + Sync + 'static,
    O: Fn(T) -> Result<U, BcsError> + Send + Sync + 'static,
{
    Transform::new(inner, input, output).build()
}

/// Builds its inner codec on first use. Breaks cycles in recursive schemas.
///
/// Asking for the name never forces initialization, so composite schemas can
/// embed a lazy reference to a schema that is still being built.
pub struct Lazy<T> {
    name: Option<String>,
    cell: OnceLock<BcsType<T>>,
    init: Box<dyn Fn() -> BcsType<T> + Send + Sync>,
}

impl<T> Lazy<T> {
    fn resolve(&self) -> &BcsType<T> {
        self.cell.get_or_init(|| (self.init)())
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("initialized", &self.cell.get().is_some())
            .finish()
    }
}

impl<T> Codec<T> for Lazy<T> {
    fn name(&self) -> &str {
        match (&self.name, self.cell.get()) {
            (Some(name), _) => name,
            (None, Some(inner)) => inner.name(),
            (None, None) => "lazy",
        }
    }

    fn read(&self, reader: &mut BcsReader<'_>) -> Result<T, BcsError> {
        self.resolve().read(reader)
    }

    fn write(&self, value: &T, writer: &mut BcsWriter) -> Result<(), BcsError> {
        self.resolve().write(value, writer)
    }

    fn validate(&self, value: &T) -> Result<(), BcsError> {
        self.resolve().validate(value)
    }

    fn serialized_size(&self, value: &T) -> Option<usize> {
        self.resolve().serialized_size(value)
    }
}

pub fn lazy<T: 'static, F>(init: F) -> BcsType<T>
where
    F: Fn() -> BcsType<T> + Send + Sync + 'static,
{
    Arc::new(Lazy {
        name: None,
        cell: OnceLock::new(),
        init: Box::new(init),
    })
}

/// Like [`lazy`] with a fixed name for error messages.
pub fn lazy_named<T: 'static, F>(name: impl Into<String>, init: F) -> BcsType<T>
where
    F: Fn() -> BcsType<T> + Send + Sync + 'static,
{
    Arc::new(Lazy {
        name: Some(name.into()),
        cell: OnceLock::new(),
        init: Box::new(init),
    })
}
