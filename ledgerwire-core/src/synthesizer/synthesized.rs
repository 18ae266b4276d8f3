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
use crate::meta::{CompositeSchema, Envelope, FieldDescriptor, Fingerprint};
use crate::serializer::value::{DynObject, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A runtime type built from a composite schema: one slot per field, a
/// constructor taking every field in schema order and an accessor per field.
///
/// A type is bound to the schemas of every composite type it reaches, and
/// instances it constructs emit those schemas when written.
pub struct SynthesizedType {
    schema: CompositeSchema,
    closure: Arc<Envelope>,
    fingerprint: Fingerprint,
    field_index: HashMap<String, usize>,
    generation: u64,
}

impl SynthesizedType {
    pub(crate) fn new(
        schema: CompositeSchema,
        closure: Arc<Envelope>,
        generation: u64,
    ) -> SynthesizedType {
        let field_index = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        SynthesizedType {
            fingerprint: schema.fingerprint(),
            schema,
            closure,
            field_index,
            generation,
        }
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &CompositeSchema {
        &self.schema
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// This type's schema followed by the schemas of every composite type it
    /// reaches.
    pub fn closure(&self) -> &Arc<Envelope> {
        &self.closure
    }

    /// Distinguishes a forced rebuild from the type it replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        self.schema.fields()
    }

    pub fn arity(&self) -> usize {
        self.schema.fields().len()
    }

    /// Constructs an instance from one value per field, in schema order.
    ///
    /// Each value must fit its field: a dense array never stands in for a
    /// nullable-element array or the reverse, and `Value::Null` is only
    /// accepted by nullable fields.
    pub fn new_instance(self: &Arc<Self>, args: Vec<Value>) -> Result<DynObject, Error> {
        if args.len() != self.arity() {
            return Err(Error::type_mismatch(
                format!("{} constructor arguments for `{}`", self.arity(), self.name()),
                format!("{}", args.len()),
            ));
        }
        for (field, value) in self.fields().iter().zip(&args) {
            if !value.conforms_to(&field.wire_type, field.nullable) {
                return Err(Error::type_mismatch(
                    format!(
                        "`{}: {}{}`",
                        field.name,
                        field.wire_type,
                        if field.nullable { "?" } else { "" }
                    ),
                    value.describe(),
                ));
            }
        }
        Ok(DynObject::from_parts(
            self.clone(),
            args,
            Some(self.closure.clone()),
        ))
    }

    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.field_index.get(name).copied()
    }

    /// Read accessor of the field called `name`.
    pub fn accessor(self: &Arc<Self>, name: &str) -> Option<Accessor> {
        let index = self.field_position(name)?;
        Some(Accessor {
            owner: self.clone(),
            index,
        })
    }

    /// Shorthand for `accessor(name)?.get(object)`.
    pub fn get<'o>(self: &Arc<Self>, object: &'o DynObject, name: &str) -> Result<&'o Value, Error> {
        match self.accessor(name) {
            Some(accessor) => accessor.get(object),
            None => Err(Error::type_mismatch(
                format!("a field of `{}`", self.name()),
                format!("`{}`", name),
            )),
        }
    }
}

impl fmt::Debug for SynthesizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesizedType")
            .field("fingerprint", &format_args!("{}", self.fingerprint))
            .field("generation", &self.generation)
            .finish()
    }
}

/// Reads one field of instances of one synthesized type.
#[derive(Clone)]
pub struct Accessor {
    owner: Arc<SynthesizedType>,
    index: usize,
}

impl Accessor {
    pub fn field(&self) -> &FieldDescriptor {
        &self.owner.fields()[self.index]
    }

    pub fn get<'o>(&self, object: &'o DynObject) -> Result<&'o Value, Error> {
        if object.synthesized_type().fingerprint() != self.owner.fingerprint() {
            return Err(Error::type_mismatch(
                self.owner.name().to_string(),
                object.type_name().to_string(),
            ));
        }
        Ok(&object.values()[self.index])
    }
}
