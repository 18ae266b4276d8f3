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

//! Schema-driven type synthesis.
//!
//! When a message carries a composite type that no local Rust type matches,
//! the [`TypeSynthesizer`] builds a [`SynthesizedType`] from its schema. A
//! synthesized type is a field table: instances are
//! [`DynObject`](crate::serializer::value::DynObject)s, built with
//! [`SynthesizedType::new_instance`] and read through
//! [`SynthesizedType::accessor`].
//!
//! Schemas of one request may depend on each other. They are synthesized in
//! passes, each pass building every schema whose dependencies are already
//! available; a pass that builds nothing while schemas remain means the
//! remaining schemas form a cycle.
//!
//! ```rust
//! use ledgerwire_core::meta::{CompositeSchema, FieldDescriptor};
//! use ledgerwire_core::serializer::value::Value;
//! use ledgerwire_core::synthesizer::{TypeCache, TypeSynthesizer};
//! use ledgerwire_core::types::{PrimitiveKind, WireType};
//! use std::sync::Arc;
//!
//! let int = WireType::Primitive(PrimitiveKind::Int);
//! let schema = CompositeSchema::new(
//!     "A",
//!     vec![
//!         FieldDescriptor::new("a", int.clone(), false),
//!         FieldDescriptor::new("b", int, false),
//!     ],
//! )
//! .unwrap();
//! let synthesizer = TypeSynthesizer::with_cache(Arc::new(TypeCache::new()));
//! let types = synthesizer.synthesize(&[schema], false).unwrap();
//! let a = &types["A"];
//! let obj = a.new_instance(vec![Value::Int(10), Value::Int(20)]).unwrap();
//! assert_eq!(a.get(&obj, "a").unwrap(), &Value::Int(10));
//! assert_eq!(a.get(&obj, "b").unwrap(), &Value::Int(20));
//! ```

mod cache;
mod synthesized;

pub use cache::TypeCache;
pub use synthesized::{Accessor, SynthesizedType};

use crate::error::Error;
use crate::meta::{CompositeSchema, Envelope};
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Progress of one schema through a synthesis request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthesisState {
    Unseen,
    DependenciesPending,
    Synthesizing,
    Cached,
    CyclicFailure,
}

impl fmt::Display for SynthesisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SynthesisState::Unseen => "unseen",
            SynthesisState::DependenciesPending => "dependencies-pending",
            SynthesisState::Synthesizing => "synthesizing",
            SynthesisState::Cached => "cached",
            SynthesisState::CyclicFailure => "cyclic-failure",
        };
        f.write_str(s)
    }
}

struct Slot<'s> {
    schema: &'s CompositeSchema,
    deps: Vec<&'s str>,
    state: SynthesisState,
}

impl<'s> Slot<'s> {
    fn transition(&mut self, next: SynthesisState) {
        trace!("{}: {} -> {}", self.schema.name(), self.state, next);
        self.state = next;
    }
}

/// Builds runtime types from composite schemas, sharing a [`TypeCache`].
#[derive(Clone)]
pub struct TypeSynthesizer {
    cache: Arc<TypeCache>,
}

impl Default for TypeSynthesizer {
    fn default() -> Self {
        TypeSynthesizer {
            cache: TypeCache::global(),
        }
    }
}

impl fmt::Debug for TypeSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSynthesizer")
            .field("cached_types", &self.cache.len())
            .finish()
    }
}

impl TypeSynthesizer {
    /// A synthesizer over the process-wide cache.
    pub fn new() -> TypeSynthesizer {
        TypeSynthesizer::default()
    }

    /// A synthesizer over a private cache.
    pub fn with_cache(cache: Arc<TypeCache>) -> TypeSynthesizer {
        TypeSynthesizer { cache }
    }

    pub fn cache(&self) -> &Arc<TypeCache> {
        &self.cache
    }

    /// Synthesizes every schema of `schemas`, which must be closed under
    /// composite field references.
    ///
    /// Returns the types keyed by name, in request order. Without `force`,
    /// a schema whose closure (the schema and every schema it reaches) is
    /// already cached yields the cached type.
    pub fn synthesize(
        &self,
        schemas: &[CompositeSchema],
        force: bool,
    ) -> Result<IndexMap<String, Arc<SynthesizedType>>, Error> {
        self.synthesize_with_anchors(schemas, &[], force)
    }

    /// Like [`TypeSynthesizer::synthesize`], with `anchors` holding the
    /// schemas of composite types that are provided elsewhere (local Rust
    /// types). They satisfy dependencies without being synthesized and are
    /// part of the closure of every type that reaches them.
    ///
    /// A reference to a type that is neither requested nor anchored is
    /// [`Error::WireFormat`]; schemas that depend on each other with no
    /// anchor to break the cycle are [`Error::CyclicSchema`].
    pub fn synthesize_with_anchors(
        &self,
        schemas: &[CompositeSchema],
        anchors: &[CompositeSchema],
        force: bool,
    ) -> Result<IndexMap<String, Arc<SynthesizedType>>, Error> {
        let mut slots: IndexMap<&str, Slot> = IndexMap::with_capacity(schemas.len());
        for schema in schemas {
            if let Some(existing) = slots.get(schema.name()) {
                if existing.schema != schema {
                    return Err(Error::wire_format(format!(
                        "two different schemas named `{}` in one request",
                        schema.name()
                    )));
                }
                continue;
            }
            slots.insert(
                schema.name(),
                Slot {
                    schema,
                    deps: schema.dependencies(),
                    state: SynthesisState::Unseen,
                },
            );
        }
        let anchored: HashSet<&str> = anchors
            .iter()
            .map(|a| a.name())
            .filter(|name| !slots.contains_key(name))
            .collect();
        for slot in slots.values() {
            for dep in &slot.deps {
                if !slots.contains_key(dep) && !anchored.contains(dep) {
                    return Err(Error::wire_format(format!(
                        "schema `{}` references unknown composite type `{}`",
                        slot.schema.name(),
                        dep
                    )));
                }
            }
        }
        let universe = Envelope::new(
            slots
                .values()
                .map(|slot| slot.schema)
                .chain(anchors.iter().filter(|a| anchored.contains(&a.name())))
                .cloned()
                .collect(),
        )?;

        let mut built: IndexMap<String, Arc<SynthesizedType>> = IndexMap::with_capacity(slots.len());
        for slot in slots.values_mut() {
            slot.transition(SynthesisState::DependenciesPending);
        }
        let mut remaining = slots.len();
        let mut pass = 0;
        while remaining > 0 {
            pass += 1;
            let mut progress = false;
            for slot in slots.values_mut() {
                if slot.state != SynthesisState::DependenciesPending {
                    continue;
                }
                let ready = slot
                    .deps
                    .iter()
                    .all(|dep| anchored.contains(dep) || built.contains_key(*dep));
                if !ready {
                    continue;
                }
                slot.transition(SynthesisState::Synthesizing);
                let closure = Arc::new(universe.closure(slot.schema.name())?);
                let ty = self.cache.get_or_synthesize(slot.schema, &closure, force);
                built.insert(slot.schema.name().to_string(), ty);
                slot.transition(SynthesisState::Cached);
                remaining -= 1;
                progress = true;
            }
            if !progress {
                let mut stuck = Vec::new();
                for slot in slots.values_mut() {
                    if slot.state == SynthesisState::DependenciesPending {
                        slot.transition(SynthesisState::CyclicFailure);
                        stuck.push(slot.schema.name());
                    }
                }
                return Err(Error::cyclic_schema(format!(
                    "schemas [{}] depend on each other with no local type to anchor them",
                    stuck.join(", ")
                )));
            }
        }
        debug!("synthesized {} schemas in {} passes", built.len(), pass);

        let mut result = IndexMap::with_capacity(built.len());
        for name in slots.keys() {
            if let Some(ty) = built.swap_remove(*name) {
                result.insert(name.to_string(), ty);
            }
        }
        Ok(result)
    }

    /// Synthesizes the type named `root` from the schemas `envelope` carries
    /// for it and everything it reaches.
    pub fn synthesize_from(
        &self,
        envelope: &Envelope,
        root: &str,
    ) -> Result<Arc<SynthesizedType>, Error> {
        let closure = envelope.closure(root)?;
        let mut types = self.synthesize(closure.schemas(), false)?;
        types.swap_remove(root).ok_or_else(|| {
            Error::wire_format(format!("composite type `{}` was not synthesized", root))
        })
    }
}
