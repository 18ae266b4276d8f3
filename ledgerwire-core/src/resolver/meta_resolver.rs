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
use crate::meta::{write_schemas, CompositeSchema, Envelope};
use crate::resolver::type_resolver::TypeInfo;
use crate::synthesizer::SynthesizedType;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Collects the schemas reachable from the root while writing, in the order
/// they are first reached.
#[derive(Default)]
pub struct MetaWriterResolver {
    schemas: Vec<CompositeSchema>,
    index: HashMap<String, u32>,
}

impl MetaWriterResolver {
    /// Returns `true` if `schema` was not yet known. A different schema under
    /// an already pushed name is a [`Error::TypeMismatch`].
    pub fn push(&mut self, schema: &CompositeSchema) -> Result<bool, Error> {
        if let Some(&i) = self.index.get(schema.name()) {
            let existing = &self.schemas[i as usize];
            ensure!(
                existing == schema,
                Error::type_mismatch(existing.to_string(), schema.to_string())
            );
            return Ok(false);
        }
        self.index
            .insert(schema.name().to_string(), self.schemas.len() as u32);
        self.schemas.push(schema.clone());
        Ok(true)
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn to_bytes(&self, writer: &mut Writer) {
        write_schemas(&self.schemas, writer);
    }
}

/// How a wire schema is materialized on this side.
#[derive(Clone)]
pub enum Resolved {
    /// A registered Rust type with exactly the wire shape.
    Local(Arc<TypeInfo>),
    /// A type built from the wire schema.
    Synthesized(Arc<SynthesizedType>),
}

/// The schema section of an incoming message and the resolution of each of
/// its composite types.
pub struct MetaReaderResolver {
    envelope: Arc<Envelope>,
    resolved: HashMap<String, Resolved>,
}

impl MetaReaderResolver {
    /// Parses the schema section, applies the allow-list, then binds every
    /// schema to a matching local type or synthesizes one for it.
    pub fn load(
        engine: &LedgerWire,
        context: &SerializationContext,
        section: &[u8],
    ) -> Result<MetaReaderResolver, Error> {
        let mut reader = Reader::new(section);
        let envelope = Envelope::read_from(&mut reader, engine.get_config().max_schemas())?;
        ensure!(
            reader.remaining() == 0,
            "{} trailing bytes after the schema section",
            reader.remaining()
        );
        for schema in envelope.schemas() {
            context.allow_list().check(schema.name())?;
        }

        // a schema anchors to a local type only when it and every schema it
        // reaches match local types exactly
        let mut anchored: HashMap<&str, Arc<TypeInfo>> = HashMap::new();
        for schema in envelope.schemas() {
            match engine.get_type_resolver().get_by_name(schema.name()) {
                Some(info) if info.get_schema() == schema => {
                    anchored.insert(schema.name(), info.clone());
                }
                Some(info) => warn!(
                    "local type {} is registered as `{}` with shape {} but the wire carries {}; synthesizing",
                    info.get_rust_type_name(),
                    schema.name(),
                    info.get_schema(),
                    schema
                ),
                None => {}
            }
        }
        loop {
            let stale: Vec<&str> = envelope
                .schemas()
                .iter()
                .filter(|schema| anchored.contains_key(schema.name()))
                .filter(|schema| {
                    schema
                        .dependencies()
                        .iter()
                        .any(|dep| !anchored.contains_key(dep))
                })
                .map(|schema| schema.name())
                .collect();
            if stale.is_empty() {
                break;
            }
            for name in stale {
                if let Some(info) = anchored.remove(name) {
                    warn!(
                        "local type {} matches `{}` but not the types it reaches; synthesizing",
                        info.get_rust_type_name(),
                        name
                    );
                }
            }
        }

        let mut resolved = HashMap::with_capacity(envelope.len());
        let mut anchors = Vec::with_capacity(anchored.len());
        let mut pending = Vec::new();
        for schema in envelope.schemas() {
            match anchored.get(schema.name()) {
                Some(info) => {
                    debug!("schema `{}` bound to local type {}", schema.name(), info.get_rust_type_name());
                    anchors.push(schema.clone());
                    resolved.insert(schema.name().to_string(), Resolved::Local(info.clone()));
                }
                None => pending.push(schema.clone()),
            }
        }
        if !pending.is_empty() {
            let synthesized = engine
                .get_synthesizer()
                .synthesize_with_anchors(&pending, &anchors, false)?;
            for (name, ty) in synthesized {
                resolved.insert(name, Resolved::Synthesized(ty));
            }
        }
        Ok(MetaReaderResolver {
            envelope: Arc::new(envelope),
            resolved,
        })
    }

    pub fn envelope(&self) -> &Arc<Envelope> {
        &self.envelope
    }

    pub fn get(&self, name: &str) -> Option<&Resolved> {
        self.resolved.get(name)
    }
}
