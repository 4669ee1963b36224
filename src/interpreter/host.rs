//! Conversion between host data and runtime values.
//!
//! Host data is anything `serde` can serialize. [`to_value`] drives its
//! `Serialize` impl straight into runtime values, so floats keep their exact
//! payload (NaN and the infinities included). Host callables receive their
//! arguments as plain JSON payloads and hand back JSON (or nothing, which
//! becomes Null). This is the only place host data enters the runtime value
//! model.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

use super::error::RuntimeError;
use super::value::{format_number, Function, Value};

/// Largest integer an f64 holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Convert a JSON value into a runtime value
pub fn from_json(value: &JsonValue) -> Result<Value, RuntimeError> {
    match value {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Number(n) => n
            .as_f64()
            .map(Value::Numeric)
            .ok_or_else(|| RuntimeError::conversion(format!("number {} does not fit in f64", n))),
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Array(items) => items
            .iter()
            .map(from_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        JsonValue::Object(fields) => fields
            .iter()
            .map(|(k, v)| Ok((k.clone(), from_json(v)?)))
            .collect::<Result<BTreeMap<_, _>, RuntimeError>>()
            .map(Value::Object),
    }
}

/// Convert any serializable host value into a runtime value
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, RuntimeError> {
    value.serialize(ValueSerializer)
}

/// Unwrap a runtime value to its raw JSON payload
pub fn to_json(value: &Value) -> Result<JsonValue, RuntimeError> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Boolean(b) => Ok(JsonValue::Bool(*b)),
        Value::Numeric(n) => {
            if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                Ok(JsonValue::from(*n as i64))
            } else {
                Number::from_f64(*n)
                    .map(JsonValue::Number)
                    .ok_or_else(|| RuntimeError::conversion(format!("{} has no JSON form", n)))
            }
        }
        Value::String(s) => Ok(JsonValue::String(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        Value::Object(fields) => fields
            .iter()
            .map(|(k, v)| Ok((k.clone(), to_json(v)?)))
            .collect::<Result<Map<_, _>, RuntimeError>>()
            .map(JsonValue::Object),
        Value::Function(func) => Err(RuntimeError::conversion(format!(
            "function `{}` cannot be passed to the host",
            func.name()
        ))),
    }
}

/// Wrap a host callable as a runtime Function.
///
/// Arguments are unwrapped to JSON before the call and the result is
/// converted back; `Ok(None)` maps to Null and `Err` aborts evaluation.
pub fn host_function<F>(name: &str, func: F) -> Value
where
    F: Fn(Vec<JsonValue>) -> Result<Option<JsonValue>, String> + 'static,
{
    let fn_name = name.to_string();
    Value::Function(Function::native(name, move |args, _env| {
        tracing::debug!(function = %fn_name, argc = args.len(), "calling host function");
        let raw = args.iter().map(to_json).collect::<Result<Vec<_>, _>>()?;
        match func(raw) {
            Ok(Some(result)) => from_json(&result),
            Ok(None) => Ok(Value::Null),
            Err(message) => Err(RuntimeError::HostCall {
                name: fn_name.clone(),
                message,
            }),
        }
    }))
}

impl ser::Error for RuntimeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        RuntimeError::conversion(msg.to_string())
    }
}

/// `Serializer` whose output is a runtime [`Value`].
///
/// Shapes follow serde_json: unit variants become their name, other enum
/// variants a single-key Object, and map keys must print as strings.
struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = RuntimeError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantMapBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, RuntimeError> {
        Ok(Value::Boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, RuntimeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, RuntimeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, RuntimeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, RuntimeError> {
        self.serialize_f64(v as f64)
    }

    fn serialize_u8(self, v: u8) -> Result<Value, RuntimeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, RuntimeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, RuntimeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, RuntimeError> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f32(self, v: f32) -> Result<Value, RuntimeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, RuntimeError> {
        Ok(Value::Numeric(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, RuntimeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, RuntimeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, RuntimeError> {
        Ok(Value::Array(
            v.iter().map(|b| Value::Numeric(f64::from(*b))).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value, RuntimeError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, RuntimeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, RuntimeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, RuntimeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, RuntimeError> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, RuntimeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, RuntimeError> {
        Ok(Value::object([(variant, value.serialize(ValueSerializer)?)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, RuntimeError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, RuntimeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, RuntimeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqBuilder, RuntimeError> {
        Ok(VariantSeqBuilder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder, RuntimeError> {
        Ok(MapBuilder::default())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<MapBuilder, RuntimeError> {
        Ok(MapBuilder::default())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<VariantMapBuilder, RuntimeError> {
        Ok(VariantMapBuilder {
            variant,
            fields: BTreeMap::new(),
        })
    }
}

struct SeqBuilder {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = RuntimeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), RuntimeError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, RuntimeError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = RuntimeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), RuntimeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, RuntimeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = RuntimeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), RuntimeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, RuntimeError> {
        ser::SerializeSeq::end(self)
    }
}

struct VariantSeqBuilder {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = Value;
    type Error = RuntimeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), RuntimeError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, RuntimeError> {
        Ok(Value::object([(self.variant, Value::Array(self.items))]))
    }
}

#[derive(Default)]
struct MapBuilder {
    fields: BTreeMap<String, Value>,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = RuntimeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), RuntimeError> {
        self.pending_key = Some(map_key(key.serialize(ValueSerializer)?)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), RuntimeError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| RuntimeError::conversion("map value serialized before its key"))?;
        self.fields.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, RuntimeError> {
        Ok(Value::Object(self.fields))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = RuntimeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), RuntimeError> {
        self.fields
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, RuntimeError> {
        Ok(Value::Object(self.fields))
    }
}

struct VariantMapBuilder {
    variant: &'static str,
    fields: BTreeMap<String, Value>,
}

impl ser::SerializeStructVariant for VariantMapBuilder {
    type Ok = Value;
    type Error = RuntimeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), RuntimeError> {
        self.fields
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, RuntimeError> {
        Ok(Value::object([(self.variant, Value::Object(self.fields))]))
    }
}

/// Object keys are strings; scalar keys use their printed form
fn map_key(key: Value) -> Result<String, RuntimeError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Numeric(n) => Ok(format_number(n)),
        Value::Boolean(b) => Ok(b.to_string()),
        other => Err(RuntimeError::conversion(format!(
            "map key must be a string, got {}",
            other.kind()
        ))),
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
