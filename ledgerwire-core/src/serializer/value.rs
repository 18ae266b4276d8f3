// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Dynamically typed values.
//!
//! [`Value`] reads any message, whatever its root type, and is how instances
//! of synthesized types ([`DynObject`]) are built and forwarded. Composite
//! fields whose wire schema matches a registered local type are read as that
//! type and kept as [`Value::Local`].

use crate::error::Error;
use crate::meta::{CompositeSchema, Envelope};
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::meta_resolver::Resolved;
use crate::resolver::token_registry::identity_of;
use crate::serializer::arc::{read_token, write_token};
use crate::serializer::{Serializer, WireField};
use crate::synthesizer::SynthesizedType;
use crate::types::{PrimitiveKind, WireType};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Array whose elements are always present. Bytes are signed, like
/// [`Value::Byte`]; a `Vec<u8>` written as `binary` reads back as its
/// two's-complement `i8` values.
#[derive(Clone, Debug, PartialEq)]
pub enum DenseArray {
    Bool(Vec<bool>),
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Char(Vec<char>),
}

/// Array whose elements may individually be null.
#[derive(Clone, Debug, PartialEq)]
pub enum NullableArray {
    Bool(Vec<Option<bool>>),
    Byte(Vec<Option<i8>>),
    Short(Vec<Option<i16>>),
    Int(Vec<Option<i32>>),
    Long(Vec<Option<i64>>),
    Float(Vec<Option<f32>>),
    Double(Vec<Option<f64>>),
    Char(Vec<Option<char>>),
    String(Vec<Option<String>>),
}

macro_rules! dispatch_dense {
    ($array:expr, $v:ident => $body:expr) => {
        match $array {
            DenseArray::Bool($v) => $body,
            DenseArray::Byte($v) => $body,
            DenseArray::Short($v) => $body,
            DenseArray::Int($v) => $body,
            DenseArray::Long($v) => $body,
            DenseArray::Float($v) => $body,
            DenseArray::Double($v) => $body,
            DenseArray::Char($v) => $body,
        }
    };
}

macro_rules! dispatch_nullable {
    ($array:expr, $v:ident => $body:expr) => {
        match $array {
            NullableArray::Bool($v) => $body,
            NullableArray::Byte($v) => $body,
            NullableArray::Short($v) => $body,
            NullableArray::Int($v) => $body,
            NullableArray::Long($v) => $body,
            NullableArray::Float($v) => $body,
            NullableArray::Double($v) => $body,
            NullableArray::Char($v) => $body,
            NullableArray::String($v) => $body,
        }
    };
}

impl DenseArray {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            DenseArray::Bool(_) => PrimitiveKind::Bool,
            DenseArray::Byte(_) => PrimitiveKind::Byte,
            DenseArray::Short(_) => PrimitiveKind::Short,
            DenseArray::Int(_) => PrimitiveKind::Int,
            DenseArray::Long(_) => PrimitiveKind::Long,
            DenseArray::Float(_) => PrimitiveKind::Float,
            DenseArray::Double(_) => PrimitiveKind::Double,
            DenseArray::Char(_) => PrimitiveKind::Char,
        }
    }

    pub fn len(&self) -> usize {
        dispatch_dense!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        dispatch_dense!(self, v => v.write_data(context))
    }

    fn read_data(kind: PrimitiveKind, context: &mut ReadContext) -> Result<DenseArray, Error> {
        Ok(match kind {
            PrimitiveKind::Bool => DenseArray::Bool(WireField::read_data(context)?),
            PrimitiveKind::Byte => DenseArray::Byte(WireField::read_data(context)?),
            PrimitiveKind::Short => DenseArray::Short(WireField::read_data(context)?),
            PrimitiveKind::Int => DenseArray::Int(WireField::read_data(context)?),
            PrimitiveKind::Long => DenseArray::Long(WireField::read_data(context)?),
            PrimitiveKind::Float => DenseArray::Float(WireField::read_data(context)?),
            PrimitiveKind::Double => DenseArray::Double(WireField::read_data(context)?),
            PrimitiveKind::Char => DenseArray::Char(WireField::read_data(context)?),
        })
    }
}

impl NullableArray {
    pub fn wire_type(&self) -> WireType {
        let kind = match self {
            NullableArray::Bool(_) => PrimitiveKind::Bool,
            NullableArray::Byte(_) => PrimitiveKind::Byte,
            NullableArray::Short(_) => PrimitiveKind::Short,
            NullableArray::Int(_) => PrimitiveKind::Int,
            NullableArray::Long(_) => PrimitiveKind::Long,
            NullableArray::Float(_) => PrimitiveKind::Float,
            NullableArray::Double(_) => PrimitiveKind::Double,
            NullableArray::Char(_) => PrimitiveKind::Char,
            NullableArray::String(_) => return WireType::StringArray,
        };
        WireType::NullableArray(kind)
    }

    pub fn len(&self) -> usize {
        dispatch_nullable!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        dispatch_nullable!(self, v => v.write_data(context))
    }

    fn read_data(wire_type: &WireType, context: &mut ReadContext) -> Result<NullableArray, Error> {
        Ok(match wire_type {
            WireType::StringArray => NullableArray::String(WireField::read_data(context)?),
            WireType::NullableArray(kind) => match kind {
                PrimitiveKind::Bool => NullableArray::Bool(WireField::read_data(context)?),
                PrimitiveKind::Byte => NullableArray::Byte(WireField::read_data(context)?),
                PrimitiveKind::Short => NullableArray::Short(WireField::read_data(context)?),
                PrimitiveKind::Int => NullableArray::Int(WireField::read_data(context)?),
                PrimitiveKind::Long => NullableArray::Long(WireField::read_data(context)?),
                PrimitiveKind::Float => NullableArray::Float(WireField::read_data(context)?),
                PrimitiveKind::Double => NullableArray::Double(WireField::read_data(context)?),
                PrimitiveKind::Char => NullableArray::Char(WireField::read_data(context)?),
            },
            other => {
                return Err(Error::type_mismatch(
                    "a nullable-element array",
                    other.to_string(),
                ))
            }
        })
    }
}

/// Any value that can appear on the wire.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    DenseArray(DenseArray),
    NullableArray(NullableArray),
    /// Instance of a synthesized type.
    Object(DynObject),
    /// Instance of a registered local composite type.
    Local(Arc<dyn Any + Send + Sync>),
    /// A tokenized singleton, resolved to the registered instance.
    Token(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Whether this value may be stored in a field declared as `wire_type`.
    ///
    /// Registered local composites are checked against the field when
    /// written, since their wire name is only known to the engine.
    pub fn conforms_to(&self, wire_type: &WireType, nullable: bool) -> bool {
        match (self, wire_type) {
            (Value::Null, _) => nullable,
            (Value::Bool(_), WireType::Primitive(PrimitiveKind::Bool))
            | (Value::Byte(_), WireType::Primitive(PrimitiveKind::Byte))
            | (Value::Short(_), WireType::Primitive(PrimitiveKind::Short))
            | (Value::Int(_), WireType::Primitive(PrimitiveKind::Int))
            | (Value::Long(_), WireType::Primitive(PrimitiveKind::Long))
            | (Value::Float(_), WireType::Primitive(PrimitiveKind::Float))
            | (Value::Double(_), WireType::Primitive(PrimitiveKind::Double))
            | (Value::Char(_), WireType::Primitive(PrimitiveKind::Char))
            | (Value::String(_), WireType::String)
            | (Value::Local(_), WireType::Composite(_))
            | (Value::Token(_), WireType::Token) => true,
            (Value::DenseArray(array), WireType::DenseArray(kind)) => array.kind() == *kind,
            (Value::NullableArray(array), _) => array.wire_type() == *wire_type,
            (Value::Object(obj), WireType::Composite(name)) => obj.type_name() == name,
            _ => false,
        }
    }

    /// Short description of the value's shape, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => PrimitiveKind::Bool.name().to_string(),
            Value::Byte(_) => PrimitiveKind::Byte.name().to_string(),
            Value::Short(_) => PrimitiveKind::Short.name().to_string(),
            Value::Int(_) => PrimitiveKind::Int.name().to_string(),
            Value::Long(_) => PrimitiveKind::Long.name().to_string(),
            Value::Float(_) => PrimitiveKind::Float.name().to_string(),
            Value::Double(_) => PrimitiveKind::Double.name().to_string(),
            Value::Char(_) => PrimitiveKind::Char.name().to_string(),
            Value::String(_) => WireType::String.to_string(),
            Value::DenseArray(array) => WireType::DenseArray(array.kind()).to_string(),
            Value::NullableArray(array) => array.wire_type().to_string(),
            Value::Object(obj) => obj.type_name().to_string(),
            Value::Local(_) => "local composite".to_string(),
            Value::Token(_) => WireType::Token.to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&DynObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Downcasts a registered local composite or a token instance.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Local(instance) | Value::Token(instance) => instance.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Wire type of this value as a message root.
    fn root_wire_type(&self, context: &WriteContext) -> Result<WireType, Error> {
        Ok(match self {
            Value::Null => {
                return Err(Error::wire_format("null has no wire type of its own"));
            }
            Value::Bool(_) => WireType::Primitive(PrimitiveKind::Bool),
            Value::Byte(_) => WireType::Primitive(PrimitiveKind::Byte),
            Value::Short(_) => WireType::Primitive(PrimitiveKind::Short),
            Value::Int(_) => WireType::Primitive(PrimitiveKind::Int),
            Value::Long(_) => WireType::Primitive(PrimitiveKind::Long),
            Value::Float(_) => WireType::Primitive(PrimitiveKind::Float),
            Value::Double(_) => WireType::Primitive(PrimitiveKind::Double),
            Value::Char(_) => WireType::Primitive(PrimitiveKind::Char),
            Value::String(_) => WireType::String,
            Value::DenseArray(array) => WireType::DenseArray(array.kind()),
            Value::NullableArray(array) => array.wire_type(),
            Value::Object(obj) => WireType::Composite(obj.type_name().to_string()),
            Value::Local(instance) => {
                WireType::Composite(local_name(context, instance)?.to_string())
            }
            Value::Token(_) => WireType::Token,
        })
    }

    fn push_value_schemas(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self {
            Value::Object(obj) => obj.push_object_schemas(context),
            Value::Local(instance) => {
                let info = context
                    .get_engine()
                    .get_type_resolver()
                    .get_by_rust_type((**instance).type_id())
                    .ok_or_else(unregistered_local)?;
                (info.get_harness().get_push_schemas_fn())(context)
            }
            _ => Ok(()),
        }
    }

    /// Writes the data of a field declared as `wire_type`, preceded by a null
    /// marker when the field is nullable.
    fn write_field(
        &self,
        context: &mut WriteContext,
        wire_type: &WireType,
        nullable: bool,
    ) -> Result<(), Error> {
        if nullable {
            context.write_null_flag(self.is_null());
            if self.is_null() {
                return Ok(());
            }
        }
        self.write_data(context, wire_type)
    }

    fn write_data(&self, context: &mut WriteContext, wire_type: &WireType) -> Result<(), Error> {
        match (self, wire_type) {
            (Value::Bool(v), WireType::Primitive(PrimitiveKind::Bool)) => v.write_data(context),
            (Value::Byte(v), WireType::Primitive(PrimitiveKind::Byte)) => v.write_data(context),
            (Value::Short(v), WireType::Primitive(PrimitiveKind::Short)) => v.write_data(context),
            (Value::Int(v), WireType::Primitive(PrimitiveKind::Int)) => v.write_data(context),
            (Value::Long(v), WireType::Primitive(PrimitiveKind::Long)) => v.write_data(context),
            (Value::Float(v), WireType::Primitive(PrimitiveKind::Float)) => v.write_data(context),
            (Value::Double(v), WireType::Primitive(PrimitiveKind::Double)) => {
                v.write_data(context)
            }
            (Value::Char(v), WireType::Primitive(PrimitiveKind::Char)) => v.write_data(context),
            (Value::String(v), WireType::String) => v.write_data(context),
            (Value::DenseArray(array), WireType::DenseArray(kind)) if array.kind() == *kind => {
                array.write_data(context)
            }
            (Value::NullableArray(array), _) if array.wire_type() == *wire_type => {
                array.write_data(context)
            }
            (Value::Object(obj), WireType::Composite(name)) if obj.type_name() == name => {
                obj.write_object(context)
            }
            (Value::Local(instance), WireType::Composite(name)) => {
                let info = context
                    .get_engine()
                    .get_type_resolver()
                    .get_by_rust_type((**instance).type_id())
                    .ok_or_else(unregistered_local)?;
                if info.get_name() != name {
                    return Err(Error::type_mismatch(name.clone(), info.get_name().to_string()));
                }
                (info.get_harness().get_write_data_fn())(&**instance, context)
            }
            (Value::Token(instance), WireType::Token) => {
                write_token(context, identity_of(instance), "token value")
            }
            _ => Err(Error::type_mismatch(wire_type.to_string(), self.describe())),
        }
    }

    fn read_field(
        context: &mut ReadContext,
        wire_type: &WireType,
        nullable: bool,
    ) -> Result<Value, Error> {
        if nullable && context.read_null_flag()? {
            return Ok(Value::Null);
        }
        Value::read_data(context, wire_type)
    }

    fn read_data(context: &mut ReadContext, wire_type: &WireType) -> Result<Value, Error> {
        Ok(match wire_type {
            WireType::Primitive(kind) => match kind {
                PrimitiveKind::Bool => Value::Bool(WireField::read_data(context)?),
                PrimitiveKind::Byte => Value::Byte(WireField::read_data(context)?),
                PrimitiveKind::Short => Value::Short(WireField::read_data(context)?),
                PrimitiveKind::Int => Value::Int(WireField::read_data(context)?),
                PrimitiveKind::Long => Value::Long(WireField::read_data(context)?),
                PrimitiveKind::Float => Value::Float(WireField::read_data(context)?),
                PrimitiveKind::Double => Value::Double(WireField::read_data(context)?),
                PrimitiveKind::Char => Value::Char(WireField::read_data(context)?),
            },
            WireType::String => Value::String(WireField::read_data(context)?),
            WireType::DenseArray(kind) => Value::DenseArray(DenseArray::read_data(*kind, context)?),
            WireType::NullableArray(_) | WireType::StringArray => {
                Value::NullableArray(NullableArray::read_data(wire_type, context)?)
            }
            WireType::Composite(name) => match context.resolved(name)? {
                Resolved::Local(info) => {
                    Value::Local((info.get_harness().get_read_data_fn())(context)?)
                }
                Resolved::Synthesized(ty) => Value::Object(DynObject::read_object(ty, context)?),
            },
            WireType::Token => Value::Token(read_token(context, "token value")?.1),
        })
    }
}

fn local_name<'a>(
    context: &WriteContext<'a>,
    instance: &Arc<dyn Any + Send + Sync>,
) -> Result<&'a str, Error> {
    context
        .get_engine()
        .get_type_resolver()
        .get_by_rust_type((**instance).type_id())
        .map(|info| info.get_name())
        .ok_or_else(unregistered_local)
}

fn unregistered_local() -> Error {
    Error::type_mismatch("a registered composite type", "an unregistered local value")
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DenseArray(a), Value::DenseArray(b)) => a == b,
            (Value::NullableArray(a), Value::NullableArray(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Local(a), Value::Local(b)) | (Value::Token(a), Value::Token(b)) => {
                identity_of(a) == identity_of(b)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(v) => write!(f, "Bool({:?})", v),
            Value::Byte(v) => write!(f, "Byte({:?})", v),
            Value::Short(v) => write!(f, "Short({:?})", v),
            Value::Int(v) => write!(f, "Int({:?})", v),
            Value::Long(v) => write!(f, "Long({:?})", v),
            Value::Float(v) => write!(f, "Float({:?})", v),
            Value::Double(v) => write!(f, "Double({:?})", v),
            Value::Char(v) => write!(f, "Char({:?})", v),
            Value::String(v) => write!(f, "String({:?})", v),
            Value::DenseArray(v) => write!(f, "DenseArray({:?})", v),
            Value::NullableArray(v) => write!(f, "NullableArray({:?})", v),
            Value::Object(v) => write!(f, "Object({:?})", v),
            Value::Local(v) => write!(f, "Local({:#x})", identity_of(v)),
            Value::Token(v) => write!(f, "Token({:#x})", identity_of(v)),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Value {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from!(
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => String,
    DynObject => Object,
);

macro_rules! impl_from_array {
    ($($ty:ty => $outer:ident::$inner:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Value {
                    Value::$outer($outer::$inner(v))
                }
            }
        )*
    };
}

impl_from_array!(
    Vec<bool> => DenseArray::Bool,
    Vec<i8> => DenseArray::Byte,
    Vec<i16> => DenseArray::Short,
    Vec<i32> => DenseArray::Int,
    Vec<i64> => DenseArray::Long,
    Vec<f32> => DenseArray::Float,
    Vec<f64> => DenseArray::Double,
    Vec<char> => DenseArray::Char,
    Vec<Option<bool>> => NullableArray::Bool,
    Vec<Option<i8>> => NullableArray::Byte,
    Vec<Option<i16>> => NullableArray::Short,
    Vec<Option<i32>> => NullableArray::Int,
    Vec<Option<i64>> => NullableArray::Long,
    Vec<Option<f32>> => NullableArray::Float,
    Vec<Option<f64>> => NullableArray::Double,
    Vec<Option<char>> => NullableArray::Char,
    Vec<Option<String>> => NullableArray::String,
);

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::String(v.to_string())
    }
}

impl Serializer for Value {
    fn is_null(&self) -> bool {
        Value::is_null(self)
    }

    fn from_null() -> Result<Self, Error> {
        Ok(Value::Null)
    }

    fn push_schemas(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.push_value_schemas(context)
    }

    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        let wire_type = self.root_wire_type(context)?;
        context.write_wire_type(&wire_type)?;
        self.write_data(context, &wire_type)
    }

    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        let wire_type = context.read_wire_type()?;
        Value::read_data(context, &wire_type)
    }
}

/// Instance of a [`SynthesizedType`]: one value per schema field.
#[derive(Clone)]
pub struct DynObject {
    ty: Arc<SynthesizedType>,
    values: Vec<Value>,
    // schemas the object was read or built against, used to re-emit schemas
    // of composite fields that are null in this instance
    origin: Option<Arc<Envelope>>,
}

impl DynObject {
    pub(crate) fn from_parts(
        ty: Arc<SynthesizedType>,
        values: Vec<Value>,
        origin: Option<Arc<Envelope>>,
    ) -> DynObject {
        DynObject { ty, values, origin }
    }

    pub fn synthesized_type(&self) -> &Arc<SynthesizedType> {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    pub fn schema(&self) -> &CompositeSchema {
        self.ty.schema()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.ty.field_position(field).map(|i| &self.values[i])
    }

    fn push_object_schemas(&self, context: &mut WriteContext) -> Result<(), Error> {
        if !context.push_schema(self.ty.schema())? {
            return Ok(());
        }
        for (field, value) in self.ty.fields().iter().zip(&self.values) {
            match (value, &field.wire_type) {
                (Value::Null, WireType::Composite(name)) => {
                    context.push_schema_by_name(name, self.origin.as_deref())?
                }
                _ => value.push_value_schemas(context)?,
            }
        }
        Ok(())
    }

    fn write_object(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.enter()?;
        let result = self
            .ty
            .fields()
            .iter()
            .zip(&self.values)
            .try_for_each(|(field, value)| {
                value.write_field(context, &field.wire_type, field.nullable)
            });
        context.leave();
        result
    }

    fn read_object(ty: &Arc<SynthesizedType>, context: &mut ReadContext) -> Result<DynObject, Error> {
        context.enter()?;
        let result = ty
            .fields()
            .iter()
            .map(|field| Value::read_field(context, &field.wire_type, field.nullable))
            .collect::<Result<Vec<_>, Error>>();
        context.leave();
        Ok(DynObject::from_parts(
            ty.clone(),
            result?,
            Some(context.envelope().clone()),
        ))
    }
}

impl PartialEq for DynObject {
    fn eq(&self, other: &DynObject) -> bool {
        self.ty.fingerprint() == other.ty.fingerprint() && self.values == other.values
    }
}

impl fmt::Debug for DynObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.type_name());
        for (field, value) in self.ty.fields().iter().zip(&self.values) {
            s.field(&field.name, value);
        }
        s.finish()
    }
}

impl Serializer for DynObject {
    fn push_schemas(&self, context: &mut WriteContext) -> Result<(), Error> {
        self.push_object_schemas(context)
    }

    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.write_wire_type(&WireType::Composite(self.type_name().to_string()))?;
        self.write_object(context)
    }

    /// Reads a composite root. A root whose schema matches a registered
    /// local type is still read as a [`DynObject`].
    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        let wire_type = context.read_wire_type()?;
        let name = match &wire_type {
            WireType::Composite(name) => name,
            other => return Err(Error::type_mismatch("a composite", other.to_string())),
        };
        let ty = match context.resolved(name)? {
            Resolved::Synthesized(ty) => ty.clone(),
            Resolved::Local(_) => context
                .get_engine()
                .get_synthesizer()
                .synthesize_from(context.envelope(), name)?,
        };
        DynObject::read_object(&ty, context)
    }
}
