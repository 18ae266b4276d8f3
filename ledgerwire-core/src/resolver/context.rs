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
use crate::context::SerializationContext;
use crate::engine::LedgerWire;
use crate::ensure;
use crate::error::Error;
use crate::meta::{CompositeSchema, Envelope};
use crate::resolver::meta_resolver::{MetaReaderResolver, MetaWriterResolver, Resolved};
use crate::resolver::token_registry::TokenRegistry;
use crate::types::{NullFlag, PrimitiveKind, TypeId, WireType};
use std::sync::Arc;

pub struct WriteContext<'a> {
    pub writer: Writer,
    engine: &'a LedgerWire,
    context: &'a SerializationContext,
    meta_resolver: MetaWriterResolver,
    depth: u32,
}

impl<'a> WriteContext<'a> {
    pub fn new(engine: &'a LedgerWire, context: &'a SerializationContext) -> WriteContext<'a> {
        WriteContext {
            writer: Writer::default(),
            engine,
            context,
            meta_resolver: MetaWriterResolver::default(),
            depth: 0,
        }
    }

    pub fn get_engine(&self) -> &'a LedgerWire {
        self.engine
    }

    /// Registry attached to the context, required to write `type_name`.
    pub fn tokens(&self, type_name: &str) -> Result<&'a TokenRegistry, Error> {
        match self.context.token_registry() {
            Some(registry) => Ok(&**registry),
            None => Err(Error::missing_context(format!(
                "cannot write tokenizable `{}`: no token registry attached to the context",
                type_name
            ))),
        }
    }

    /// Returns `true` if the schema is new to this message.
    pub fn push_schema(&mut self, schema: &CompositeSchema) -> Result<bool, Error> {
        self.meta_resolver.push(schema)
    }

    /// Pushes the schema known under `name` and the schemas it reaches,
    /// taking them from `origin` when it carries `name` and from the
    /// registered local types otherwise.
    pub fn push_schema_by_name(
        &mut self,
        name: &str,
        origin: Option<&Envelope>,
    ) -> Result<(), Error> {
        if self.meta_resolver.contains(name) {
            return Ok(());
        }
        if let Some(schema) = origin.and_then(|e| e.schema(name)) {
            if self.push_schema(schema)? {
                for dep in schema.dependencies() {
                    self.push_schema_by_name(dep, origin)?;
                }
            }
            return Ok(());
        }
        match self.engine.get_type_resolver().get_by_name(name) {
            Some(info) => (info.get_harness().get_push_schemas_fn())(self),
            None => Err(Error::wire_format(format!(
                "no schema is known for composite type `{}`",
                name
            ))),
        }
    }

    pub fn write_wire_type(&mut self, wire_type: &WireType) -> Result<(), Error> {
        self.writer.write_u8(wire_type.type_id().into());
        match wire_type {
            WireType::DenseArray(kind) | WireType::NullableArray(kind) => {
                self.writer.write_u8((*kind).into());
            }
            WireType::Composite(name) => {
                if !self.meta_resolver.contains(name) {
                    self.push_schema_by_name(name, None)?;
                }
                let index = self.meta_resolver.index_of(name).ok_or_else(|| {
                    Error::wire_format(format!("schema `{}` was not pushed", name))
                })?;
                self.writer.write_varuint32(index);
            }
            _ => {}
        }
        Ok(())
    }

    #[inline(always)]
    pub fn write_null_flag(&mut self, is_null: bool) {
        let flag = if is_null {
            NullFlag::Null
        } else {
            NullFlag::NotNull
        };
        self.writer.write_i8(flag.into());
    }

    pub fn enter(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.engine.get_config().max_depth() {
            self.depth -= 1;
            return Err(Error::wire_format(format!(
                "composite nesting exceeds the limit of {}",
                self.engine.get_config().max_depth()
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn leave(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn write_envelope(&mut self) {
        self.meta_resolver.to_bytes(&mut self.writer);
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}

pub struct ReadContext<'a> {
    pub reader: Reader<'a>,
    engine: &'a LedgerWire,
    context: &'a SerializationContext,
    meta_resolver: &'a MetaReaderResolver,
    depth: u32,
}

impl<'a> ReadContext<'a> {
    pub fn new(
        engine: &'a LedgerWire,
        context: &'a SerializationContext,
        meta_resolver: &'a MetaReaderResolver,
        reader: Reader<'a>,
    ) -> ReadContext<'a> {
        ReadContext {
            reader,
            engine,
            context,
            meta_resolver,
            depth: 0,
        }
    }

    pub fn get_engine(&self) -> &'a LedgerWire {
        self.engine
    }

    /// Registry attached to the context, required to read a `type_name` token.
    pub fn tokens(&self, type_name: &str) -> Result<&'a TokenRegistry, Error> {
        match self.context.token_registry() {
            Some(registry) => Ok(&**registry),
            None => Err(Error::missing_context(format!(
                "cannot read token of `{}`: no token registry attached to the context",
                type_name
            ))),
        }
    }

    pub fn envelope(&self) -> &'a Arc<Envelope> {
        self.meta_resolver.envelope()
    }

    pub fn resolved(&self, name: &str) -> Result<&'a Resolved, Error> {
        self.meta_resolver.get(name).ok_or_else(|| {
            Error::wire_format(format!("composite type `{}` is not in the envelope", name))
        })
    }

    pub fn read_wire_type(&mut self) -> Result<WireType, Error> {
        let tag = self.reader.read_u8()?;
        let type_id = TypeId::try_from(tag)
            .map_err(|_| Error::wire_format(format!("unknown type tag {}", tag)))?;
        Ok(match type_id {
            TypeId::BOOL => WireType::Primitive(PrimitiveKind::Bool),
            TypeId::BYTE => WireType::Primitive(PrimitiveKind::Byte),
            TypeId::SHORT => WireType::Primitive(PrimitiveKind::Short),
            TypeId::INT => WireType::Primitive(PrimitiveKind::Int),
            TypeId::LONG => WireType::Primitive(PrimitiveKind::Long),
            TypeId::FLOAT => WireType::Primitive(PrimitiveKind::Float),
            TypeId::DOUBLE => WireType::Primitive(PrimitiveKind::Double),
            TypeId::CHAR => WireType::Primitive(PrimitiveKind::Char),
            TypeId::STRING => WireType::String,
            TypeId::DENSE_ARRAY => WireType::DenseArray(self.read_element_kind()?),
            TypeId::NULLABLE_ARRAY => WireType::NullableArray(self.read_element_kind()?),
            TypeId::STRING_ARRAY => WireType::StringArray,
            TypeId::COMPOSITE => {
                let index = self.reader.read_varuint32()? as usize;
                let schema = self.envelope().get(index).ok_or_else(|| {
                    Error::wire_format(format!("schema index {} is out of range", index))
                })?;
                WireType::Composite(schema.name().to_string())
            }
            TypeId::TOKEN => WireType::Token,
        })
    }

    fn read_element_kind(&mut self) -> Result<PrimitiveKind, Error> {
        let tag = self.reader.read_u8()?;
        PrimitiveKind::try_from(tag)
            .map_err(|_| Error::wire_format(format!("unknown array element kind {}", tag)))
    }

    /// Returns `true` for a null marker.
    pub fn read_null_flag(&mut self) -> Result<bool, Error> {
        let flag = self.reader.read_i8()?;
        match NullFlag::try_from(flag) {
            Ok(NullFlag::Null) => Ok(true),
            Ok(NullFlag::NotNull) => Ok(false),
            Err(_) => Err(Error::wire_format(format!("invalid null marker {}", flag))),
        }
    }

    /// Fails unless the envelope carries `local` exactly.
    pub fn check_local_schema(&self, local: &CompositeSchema) -> Result<(), Error> {
        let wire = self.envelope().schema(local.name()).ok_or_else(|| {
            Error::wire_format(format!(
                "schema of `{}` is missing from the envelope",
                local.name()
            ))
        })?;
        ensure!(
            wire == local,
            Error::type_mismatch(local.to_string(), wire.to_string())
        );
        Ok(())
    }

    pub fn enter(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.engine.get_config().max_depth() {
            self.depth -= 1;
            return Err(Error::wire_format(format!(
                "composite nesting exceeds the limit of {}",
                self.engine.get_config().max_depth()
            )));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn leave(&mut self) {
        self.depth -= 1;
    }
}
