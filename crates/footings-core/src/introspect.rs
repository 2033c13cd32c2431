//! Introspección de campos vía serde.
//!
//! `Deserialize` derivado llama a `deserialize_struct` con la lista estática
//! de nombres de campo (ya con `rename` aplicado y sin los `skip`). Un
//! `Deserializer` que sólo captura esa lista nos da los atributos públicos de
//! un modelo sin necesitar una instancia.
//!
//! La lista incluye también los `#[serde(alias)]`. Cada nombre se resuelve a
//! su campo canónico entregándolo dos veces en un mapa: el visitor derivado
//! rechaza la segunda aparición con `duplicate_field(<nombre canónico>)`.

use std::fmt;

use serde::de::{self, Deserialize, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess,
                SeqAccess, VariantAccess, Visitor};

/// Anidamiento máximo al construir valores vacíos; corta tipos recursivos.
const MAX_DEPTH: usize = 32;
/// Elementos máximos entregados a un struct o tupla leído como secuencia.
const MAX_ELEMENTS: usize = 1024;

#[derive(Debug)]
enum ProbeError {
    Captured,
    Duplicate(&'static str),
    NotAStruct(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Captured => f.write_str("fields captured"),
            ProbeError::Duplicate(field) => write!(f, "duplicate field `{field}`"),
            ProbeError::NotAStruct(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ProbeError {}

impl de::Error for ProbeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ProbeError::NotAStruct(msg.to_string())
    }

    fn duplicate_field(field: &'static str) -> Self {
        ProbeError::Duplicate(field)
    }
}

fn not_a_struct() -> ProbeError {
    ProbeError::NotAStruct("the type is not a struct with named fields".into())
}

struct FieldProbe<'a> {
    fields: &'a mut Option<&'static [&'static str]>,
}

impl<'de> Deserializer<'de> for FieldProbe<'_> {
    type Error = ProbeError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(not_a_struct())
    }

    fn deserialize_struct<V: Visitor<'de>>(self,
                                           _name: &'static str,
                                           fields: &'static [&'static str],
                                           _visitor: V)
                                           -> Result<V::Value, Self::Error> {
        *self.fields = Some(fields);
        Err(ProbeError::Captured)
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(ProbeError::NotAStruct("the type deserializes as a map (flattened or untyped fields are not supported)".into()))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct enum identifier ignored_any
    }
}

/// Struct cuyo mapa contiene la misma clave dos veces.
struct RepeatedKey {
    key: &'static str,
}

impl<'de> Deserializer<'de> for RepeatedKey {
    type Error = ProbeError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(not_a_struct())
    }

    fn deserialize_struct<V: Visitor<'de>>(self,
                                           _name: &'static str,
                                           _fields: &'static [&'static str],
                                           visitor: V)
                                           -> Result<V::Value, Self::Error> {
        visitor.visit_map(RepeatedKeyMap { key: self.key,
                                           remaining: 2 })
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

struct RepeatedKeyMap {
    key: &'static str,
    remaining: u8,
}

impl<'de> MapAccess<'de> for RepeatedKeyMap {
    type Error = ProbeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(IntoDeserializer::<ProbeError>::into_deserializer(self.key)).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        seed.deserialize(Empty { depth: 0 })
    }
}

/// Produce el valor "vacío" de cualquier tipo que lo acepte: ceros, cadenas
/// y colecciones vacías, `None`, primera variante de los enums.
#[derive(Clone, Copy)]
struct Empty {
    depth: usize,
}

impl Empty {
    fn nested(self) -> Result<Empty, ProbeError> {
        if self.depth >= MAX_DEPTH {
            return Err(ProbeError::NotAStruct("type nests too deeply to build an empty value".into()));
        }
        Ok(Empty { depth: self.depth + 1 })
    }
}

macro_rules! empty_value {
    ($de:lifetime; $($method:ident => $visit:ident($($value:expr)?)),* $(,)?) => {
        $(
            fn $method<V: Visitor<$de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                visitor.$visit($($value)?)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for Empty {
    type Error = ProbeError;

    empty_value! {
        'de;
        deserialize_any => visit_unit(),
        deserialize_bool => visit_bool(false),
        deserialize_i8 => visit_i8(0),
        deserialize_i16 => visit_i16(0),
        deserialize_i32 => visit_i32(0),
        deserialize_i64 => visit_i64(0),
        deserialize_i128 => visit_i128(0),
        deserialize_u8 => visit_u8(0),
        deserialize_u16 => visit_u16(0),
        deserialize_u32 => visit_u32(0),
        deserialize_u64 => visit_u64(0),
        deserialize_u128 => visit_u128(0),
        deserialize_f32 => visit_f32(0.0),
        deserialize_f64 => visit_f64(0.0),
        deserialize_char => visit_char('\0'),
        deserialize_str => visit_str(""),
        deserialize_string => visit_str(""),
        deserialize_bytes => visit_bytes(&[]),
        deserialize_byte_buf => visit_bytes(&[]),
        deserialize_option => visit_none(),
        deserialize_unit => visit_unit(),
        deserialize_identifier => visit_str(""),
        deserialize_ignored_any => visit_unit(),
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self,
                                                   _name: &'static str,
                                                   visitor: V)
                                                   -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self.nested()?)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(Elements { item: self.nested()?,
                                     remaining: 0 })
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(Elements { item: self.nested()?,
                                     remaining: len })
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(self,
                                                 _name: &'static str,
                                                 len: usize,
                                                 visitor: V)
                                                 -> Result<V::Value, Self::Error> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_map(NoEntries)
    }

    // Los structs derivados aceptan secuencias: se lee un elemento por campo
    // no omitido, sin repetir alias.
    fn deserialize_struct<V: Visitor<'de>>(self,
                                           _name: &'static str,
                                           _fields: &'static [&'static str],
                                           visitor: V)
                                           -> Result<V::Value, Self::Error> {
        visitor.visit_seq(Elements { item: self.nested()?,
                                     remaining: MAX_ELEMENTS })
    }

    fn deserialize_enum<V: Visitor<'de>>(self,
                                         name: &'static str,
                                         variants: &'static [&'static str],
                                         visitor: V)
                                         -> Result<V::Value, Self::Error> {
        match variants.first() {
            Some(variant) => visitor.visit_enum(FirstVariant { variant,
                                                               item: self.nested()? }),
            None => Err(ProbeError::NotAStruct(format!("enum {name} has no variants"))),
        }
    }
}

struct Elements {
    item: Empty,
    remaining: usize,
}

impl<'de> SeqAccess<'de> for Elements {
    type Error = ProbeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(self.item).map(Some)
    }
}

struct NoEntries;

impl<'de> MapAccess<'de> for NoEntries {
    type Error = ProbeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, _seed: K) -> Result<Option<K::Value>, Self::Error> {
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, _seed: V) -> Result<V::Value, Self::Error> {
        Err(ProbeError::NotAStruct("value requested from an empty map".into()))
    }
}

struct FirstVariant {
    variant: &'static str,
    item: Empty,
}

impl<'de> EnumAccess<'de> for FirstVariant {
    type Error = ProbeError;
    type Variant = Empty;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error> {
        let tag = seed.deserialize(IntoDeserializer::<ProbeError>::into_deserializer(self.variant))?;
        Ok((tag, self.item))
    }
}

impl<'de> VariantAccess<'de> for Empty {
    type Error = ProbeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Self::Error> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(Elements { item: self.nested()?,
                                     remaining: len })
    }

    fn struct_variant<V: Visitor<'de>>(self,
                                       _fields: &'static [&'static str],
                                       visitor: V)
                                       -> Result<V::Value, Self::Error> {
        visitor.visit_seq(Elements { item: self.nested()?,
                                     remaining: MAX_ELEMENTS })
    }
}

/// Nombre canónico del campo al que serde asigna `key`. Si el valor vacío
/// del campo no se puede construir, devuelve `key` tal cual.
fn canonical_name<T>(key: &'static str) -> &'static str
    where T: for<'de> Deserialize<'de>
{
    match T::deserialize(RepeatedKey { key }) {
        Err(ProbeError::Duplicate(canonical)) => canonical,
        _ => key,
    }
}

/// Nombres de campo serializados de `T` en orden de declaración, con los
/// alias resueltos a su campo, o el motivo por el que `T` no es un struct
/// con campos nombrados.
pub fn struct_fields<T>() -> Result<Vec<&'static str>, String>
    where T: for<'de> Deserialize<'de>
{
    let mut captured = None;
    let names = match T::deserialize(FieldProbe { fields: &mut captured }) {
        Ok(_) => return Err("the type deserialized without reading any field".into()),
        Err(ProbeError::Captured) => captured.ok_or("no fields captured")?,
        Err(ProbeError::Duplicate(field)) => return Err(format!("unexpected duplicate field `{field}`")),
        Err(ProbeError::NotAStruct(reason)) => return Err(reason),
    };

    let mut fields: Vec<&'static str> = Vec::with_capacity(names.len());
    for &name in names {
        let canonical = canonical_name::<T>(name);
        if canonical != name {
            log::trace!("field alias {name} resolves to {canonical}");
        }
        if !fields.contains(&canonical) {
            fields.push(canonical);
        }
    }
    Ok(fields)
}

/// Instancia de `T` con todos sus campos vacíos (`0`, `""`, colecciones
/// vacías, `None`). `None` si algún campo no admite un valor vacío.
pub fn empty_instance<T>() -> Option<T>
    where T: for<'de> Deserialize<'de>
{
    T::deserialize(Empty { depth: 0 }).ok()
}
