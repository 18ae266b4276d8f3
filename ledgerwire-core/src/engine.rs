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


use crate::buffer::Reader;
use crate::config::Config;
use crate::context::SerializationContext;
use crate::ensure;
use crate::error::Error;
use crate::meta::Envelope;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::meta_resolver::MetaReaderResolver;
use crate::resolver::type_resolver::TypeResolver;
use crate::serializer::{CompositeSerializer, Serializer};
use crate::synthesizer::TypeSynthesizer;
use crate::types::config_flags::{IS_LITTLE_ENDIAN_FLAG, IS_NULL_FLAG, KNOWN_FLAGS};

const SCHEMA_OFFSET_SIZE: usize = 4;

/// The serialization engine: registered local types, the synthesizer used
/// for unknown ones and the limits applied to incoming messages.
///
/// An engine is configured once and then shared; every call takes the
/// [`SerializationContext`] that governs it.
#[derive(Default)]
pub struct LedgerWire {
    config: Config,
    type_resolver: TypeResolver,
    synthesizer: TypeSynthesizer,
}

impl LedgerWire {
    /// Sets the maximum nesting of composite values accepted on either side.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ledgerwire_core::LedgerWire;
    ///
    /// let engine = LedgerWire::default().max_depth(16);
    /// assert_eq!(engine.get_config().max_depth(), 16);
    /// ```
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Sets the maximum number of composite schemas one incoming message may
    /// declare.
    pub fn max_schemas(mut self, max_schemas: usize) -> Self {
        self.config.max_schemas = max_schemas;
        self
    }

    /// Uses `synthesizer` instead of one backed by the process-wide cache.
    pub fn synthesizer(mut self, synthesizer: TypeSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_type_resolver(&self) -> &TypeResolver {
        &self.type_resolver
    }

    pub fn get_synthesizer(&self) -> &TypeSynthesizer {
        &self.synthesizer
    }

    /// Registers a derived composite type so that incoming values of its
    /// exact shape are read back as `T`, including when nested in a
    /// [`Value`](crate::serializer::value::Value).
    ///
    /// # Examples
    ///
    /// ```rust, ignore
    /// use ledgerwire::{LedgerWire, WireObject};
    ///
    /// #[derive(WireObject)]
    /// #[wire(name = "demo.Point")]
    /// struct Point { x: i32, y: i32 }
    ///
    /// let mut engine = LedgerWire::default();
    /// engine.register::<Point>()?;
    /// ```
    pub fn register<T: CompositeSerializer>(&mut self) -> Result<(), Error> {
        self.type_resolver.register::<T>()
    }

    /// Serializes `record` under `context`.
    ///
    /// The output is deterministic: the same value under the same context
    /// always yields the same bytes.
    pub fn serialize<T: Serializer>(
        &self,
        record: &T,
        context: &SerializationContext,
    ) -> Result<Vec<u8>, Error> {
        let mut write_context = WriteContext::new(self, context);
        let writer = &mut write_context.writer;
        writer.write_bytes(context.header().magic());
        let is_null = record.is_null();
        let mut bitmap = IS_LITTLE_ENDIAN_FLAG;
        if is_null {
            bitmap |= IS_NULL_FLAG;
        }
        writer.write_u8(bitmap);
        if is_null {
            return Ok(write_context.into_bytes());
        }

        record.push_schemas(&mut write_context)?;
        let offset_pos = write_context.writer.len();
        write_context.writer.write_i32(-1);
        record.write(&mut write_context)?;
        let schema_offset = write_context.writer.len() - offset_pos - SCHEMA_OFFSET_SIZE;
        let schema_offset = i32::try_from(schema_offset).map_err(|_| {
            Error::wire_format(format!("payload of {} bytes is too large", schema_offset))
        })?;
        write_context
            .writer
            .set_bytes(offset_pos, &schema_offset.to_le_bytes())?;
        write_context.write_envelope();
        Ok(write_context.into_bytes())
    }

    /// Deserializes a `T` from `bf` under `context`.
    pub fn deserialize<T: Serializer>(
        &self,
        bf: &[u8],
        context: &SerializationContext,
    ) -> Result<T, Error> {
        Ok(self.deserialize_with_envelope(bf, context)?.0)
    }

    /// Like [`LedgerWire::deserialize`], also returning the schemas the
    /// message carried, in wire order.
    pub fn deserialize_with_envelope<T: Serializer>(
        &self,
        bf: &[u8],
        context: &SerializationContext,
    ) -> Result<(T, Envelope), Error> {
        let mut reader = Reader::new(bf);
        if self.read_head(&mut reader, context)? {
            ensure!(
                reader.remaining() == 0,
                "{} bytes follow a null message root",
                reader.remaining()
            );
            return Ok((T::from_null()?, Envelope::default()));
        }

        let schema_offset = reader.read_i32()?;
        let payload_start = reader.get_cursor();
        ensure!(
            schema_offset >= 0 && schema_offset as usize <= reader.remaining(),
            "schema offset {} is outside the {} remaining bytes",
            schema_offset,
            reader.remaining()
        );
        let schema_start = payload_start + schema_offset as usize;
        let meta_resolver = MetaReaderResolver::load(self, context, &bf[schema_start..])?;

        let mut payload = Reader::new(&bf[..schema_start]);
        payload.set_cursor(payload_start)?;
        let mut read_context = ReadContext::new(self, context, &meta_resolver, payload);
        let value = T::read(&mut read_context)?;
        ensure!(
            read_context.reader.remaining() == 0,
            "{} unread bytes before the schema section",
            read_context.reader.remaining()
        );
        let envelope = Envelope::clone(meta_resolver.envelope());
        Ok((value, envelope))
    }

    /// Returns `true` if the header marks the root as null.
    fn read_head(&self, reader: &mut Reader, context: &SerializationContext) -> Result<bool, Error> {
        let magic = context.header().magic();
        let found = reader
            .read_bytes(magic.len())
            .map_err(|_| Error::wire_format("message is shorter than its header"))?;
        ensure!(
            found == magic,
            "header mismatch: expected {:?}, found {:?}",
            magic,
            found
        );
        let bitmap = reader.read_u8()?;
        ensure!(
            bitmap & !KNOWN_FLAGS == 0,
            "unknown header flags {:#04x}",
            bitmap
        );
        ensure!(
            bitmap & IS_LITTLE_ENDIAN_FLAG != 0,
            "big endian payloads are not supported"
        );
        Ok(bitmap & IS_NULL_FLAG != 0)
    }
}
