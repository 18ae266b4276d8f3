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

use crate::error::Error;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use std::str::FromStr;

/// Marker written before every nullable field and every nullable array element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum NullFlag {
    Null = -3,
    // NotNull indicates that a value follows.
    NotNull = -1,
}

/// Tag of the type info written in front of a root value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[allow(non_camel_case_types)]
#[repr(u8)]
pub enum TypeId {
    BOOL = 1,
    BYTE = 2,
    SHORT = 3,
    INT = 4,
    LONG = 5,
    FLOAT = 6,
    DOUBLE = 7,
    CHAR = 8,
    STRING = 9,
    // followed by the element kind
    DENSE_ARRAY = 10,
    // followed by the element kind
    NULLABLE_ARRAY = 11,
    STRING_ARRAY = 12,
    // followed by the varuint32 index of the schema in the envelope
    COMPOSITE = 13,
    TOKEN = 14,
}

/// The eight scalar kinds. Discriminants double as their [`TypeId`] tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PrimitiveKind {
    Bool = 1,
    Byte = 2,
    Short = 3,
    Int = 4,
    Long = 5,
    Float = 6,
    Double = 7,
    Char = 8,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Char,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Char => "char",
        }
    }

    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        PrimitiveKind::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Encoded width of one dense element.
    pub const fn size(self) -> usize {
        match self {
            PrimitiveKind::Bool | PrimitiveKind::Byte => 1,
            PrimitiveKind::Short => 2,
            PrimitiveKind::Int | PrimitiveKind::Float | PrimitiveKind::Char => 4,
            PrimitiveKind::Long | PrimitiveKind::Double => 8,
        }
    }

    pub fn type_id(self) -> TypeId {
        match self {
            PrimitiveKind::Bool => TypeId::BOOL,
            PrimitiveKind::Byte => TypeId::BYTE,
            PrimitiveKind::Short => TypeId::SHORT,
            PrimitiveKind::Int => TypeId::INT,
            PrimitiveKind::Long => TypeId::LONG,
            PrimitiveKind::Float => TypeId::FLOAT,
            PrimitiveKind::Double => TypeId::DOUBLE,
            PrimitiveKind::Char => TypeId::CHAR,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const STRING_NAME: &str = "string";
pub const TOKEN_NAME: &str = "token";
pub const BINARY_NAME: &str = "binary";
pub const NULLABLE_ARRAY_SUFFIX: &str = "[]";
pub const DENSE_ARRAY_SUFFIX: &str = "[p]";

/// Wire type of a field, an array element or a root value.
///
/// The textual form is the field signature carried in schemas:
///
/// | variant | signature |
/// |---|---|
/// | `Primitive(Int)` | `int` |
/// | `String` | `string` |
/// | `DenseArray(Int)` | `int[p]` (`binary` for bytes) |
/// | `NullableArray(Int)` | `int[]` |
/// | `StringArray` | `string[]` |
/// | `Composite("a.B")` | `a.B` |
/// | `Token` | `token` |
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WireType {
    Primitive(PrimitiveKind),
    String,
    /// Elements are always present; no per-element null marker.
    DenseArray(PrimitiveKind),
    /// Every element carries a [`NullFlag`].
    NullableArray(PrimitiveKind),
    StringArray,
    Composite(String),
    Token,
}

impl WireType {
    pub fn type_id(&self) -> TypeId {
        match self {
            WireType::Primitive(kind) => kind.type_id(),
            WireType::String => TypeId::STRING,
            WireType::DenseArray(_) => TypeId::DENSE_ARRAY,
            WireType::NullableArray(_) => TypeId::NULLABLE_ARRAY,
            WireType::StringArray => TypeId::STRING_ARRAY,
            WireType::Composite(_) => TypeId::COMPOSITE,
            WireType::Token => TypeId::TOKEN,
        }
    }

    /// Name of the composite type this wire type refers to, if any.
    pub fn composite_name(&self) -> Option<&str> {
        match self {
            WireType::Composite(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            WireType::DenseArray(_) | WireType::NullableArray(_) | WireType::StringArray
        )
    }

    pub fn signature(&self) -> String {
        self.to_string()
    }

    pub fn parse(signature: &str) -> Result<WireType, Error> {
        if signature == BINARY_NAME {
            return Ok(WireType::DenseArray(PrimitiveKind::Byte));
        }
        if let Some(elem) = signature.strip_suffix(DENSE_ARRAY_SUFFIX) {
            return match PrimitiveKind::from_name(elem) {
                Some(PrimitiveKind::Byte) => Err(Error::wire_format(
                    "dense byte arrays must be written as `binary`",
                )),
                Some(kind) => Ok(WireType::DenseArray(kind)),
                None => Err(Error::wire_format(format!(
                    "dense arrays hold primitives only, got `{}`",
                    signature
                ))),
            };
        }
        if let Some(elem) = signature.strip_suffix(NULLABLE_ARRAY_SUFFIX) {
            if elem == STRING_NAME {
                return Ok(WireType::StringArray);
            }
            return match PrimitiveKind::from_name(elem) {
                Some(kind) => Ok(WireType::NullableArray(kind)),
                None => Err(Error::wire_format(format!(
                    "unsupported array element type in `{}`",
                    signature
                ))),
            };
        }
        if let Some(kind) = PrimitiveKind::from_name(signature) {
            return Ok(WireType::Primitive(kind));
        }
        match signature {
            STRING_NAME => Ok(WireType::String),
            TOKEN_NAME => Ok(WireType::Token),
            name => {
                validate_composite_name(name)?;
                Ok(WireType::Composite(name.to_string()))
            }
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Primitive(kind) => f.write_str(kind.name()),
            WireType::String => f.write_str(STRING_NAME),
            WireType::DenseArray(PrimitiveKind::Byte) => f.write_str(BINARY_NAME),
            WireType::DenseArray(kind) => write!(f, "{}{}", kind.name(), DENSE_ARRAY_SUFFIX),
            WireType::NullableArray(kind) => {
                write!(f, "{}{}", kind.name(), NULLABLE_ARRAY_SUFFIX)
            }
            WireType::StringArray => write!(f, "{}{}", STRING_NAME, NULLABLE_ARRAY_SUFFIX),
            WireType::Composite(name) => f.write_str(name),
            WireType::Token => f.write_str(TOKEN_NAME),
        }
    }
}

impl FromStr for WireType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WireType::parse(s)
    }
}

/// Composite names must not collide with built-in signatures.
pub fn validate_composite_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::wire_format("composite type name is empty"));
    }
    if name == STRING_NAME
        || name == TOKEN_NAME
        || name == BINARY_NAME
        || PrimitiveKind::from_name(name).is_some()
    {
        return Err(Error::wire_format(format!(
            "`{}` is a reserved type name",
            name
        )));
    }
    if name.ends_with(NULLABLE_ARRAY_SUFFIX) || name.ends_with(DENSE_ARRAY_SUFFIX) {
        return Err(Error::wire_format(format!(
            "composite type name `{}` looks like an array signature",
            name
        )));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(Error::wire_format(format!(
            "composite type name `{}` contains whitespace",
            name
        )));
    }
    Ok(())
}

pub mod config_flags {
    pub const IS_NULL_FLAG: u8 = 1 << 0;
    pub const IS_LITTLE_ENDIAN_FLAG: u8 = 2;
    pub const KNOWN_FLAGS: u8 = IS_NULL_FLAG | IS_LITTLE_ENDIAN_FLAG;
}
