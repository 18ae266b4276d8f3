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

use crate::buffer::{Reader, Writer};
use crate::ensure;
use crate::error::Error;
use crate::types::{validate_composite_name, WireType};
use std::collections::HashSet;
use std::fmt;

const NULLABLE_BIT: u8 = 0b10;
const KNOWN_FIELD_BITS: u8 = NULLABLE_BIT;

/// One field of a composite schema.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: String,
    pub wire_type: WireType,
    pub nullable: bool,
}

impl FieldDescriptor {
    pub fn new<S: Into<String>>(name: S, wire_type: WireType, nullable: bool) -> FieldDescriptor {
        FieldDescriptor {
            name: name.into(),
            wire_type,
            nullable,
        }
    }

    pub fn signature(&self) -> String {
        self.wire_type.signature()
    }

    // field_bytes: | header | name | signature |
    fn write_to(&self, writer: &mut Writer) {
        let mut header = 0u8;
        if self.nullable {
            header |= NULLABLE_BIT;
        }
        writer.write_u8(header);
        writer.write_utf8_string(&self.name);
        writer.write_utf8_string(&self.signature());
    }

    fn read_from(reader: &mut Reader) -> Result<FieldDescriptor, Error> {
        let header = reader.read_u8()?;
        ensure!(
            header & !KNOWN_FIELD_BITS == 0,
            "unknown field header bits {:#04x}",
            header
        );
        let name = reader.read_utf8_string()?;
        ensure!(!name.is_empty(), "empty field name");
        let wire_type = WireType::parse(&reader.read_utf8_string()?)?;
        Ok(FieldDescriptor {
            name,
            wire_type,
            nullable: header & NULLABLE_BIT != 0,
        })
    }
}

/// Structural identity of a composite schema: its name and the ordered field
/// signatures. Composite fields contribute only the name they reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    name: String,
    fields: Vec<(String, String, bool)>,
}

impl Fingerprint {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.name)?;
        for (i, (name, signature, nullable)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, signature)?;
            if *nullable {
                f.write_str("?")?;
            }
        }
        f.write_str("}")
    }
}

/// Type name plus ordered field descriptors, as carried in an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositeSchema {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl CompositeSchema {
    /// Builds a schema, rejecting reserved names and duplicate field names.
    pub fn new<S: Into<String>>(
        name: S,
        fields: Vec<FieldDescriptor>,
    ) -> Result<CompositeSchema, Error> {
        let name = name.into();
        validate_composite_name(&name)?;
        {
            let mut seen = HashSet::with_capacity(fields.len());
            for field in &fields {
                ensure!(
                    seen.insert(field.name.as_str()),
                    "duplicate field `{}` in schema `{}`",
                    field.name,
                    name
                );
            }
        }
        Ok(CompositeSchema { name, fields })
    }

    /// Builds a schema whose name and field set were already validated when
    /// the type was derived.
    #[doc(hidden)]
    pub fn new_unchecked(name: &str, fields: Vec<FieldDescriptor>) -> CompositeSchema {
        CompositeSchema {
            name: name.to_string(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            name: self.name.clone(),
            fields: self
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.signature(), f.nullable))
                .collect(),
        }
    }

    /// Names of the composite types referenced by this schema's fields, in
    /// field order and without repeats.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut deps: Vec<&str> = Vec::new();
        for field in &self.fields {
            if let Some(dep) = field.wire_type.composite_name() {
                if !deps.contains(&dep) {
                    deps.push(dep);
                }
            }
        }
        deps
    }

    // schema_bytes: | name | field_count | field_bytes ... |
    pub fn write_to(&self, writer: &mut Writer) {
        writer.write_utf8_string(&self.name);
        writer.write_varuint32(self.fields.len() as u32);
        for field in &self.fields {
            field.write_to(writer);
        }
    }

    pub fn read_from(reader: &mut Reader) -> Result<CompositeSchema, Error> {
        let name = reader.read_utf8_string()?;
        // a field takes at least a header byte and two length bytes
        let field_count = reader.read_len(3)?;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(FieldDescriptor::read_from(reader)?);
        }
        CompositeSchema::new(name, fields)
    }
}

impl fmt::Display for CompositeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fingerprint().fmt(f)
    }
}
