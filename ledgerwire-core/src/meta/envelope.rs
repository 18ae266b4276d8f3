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
use crate::meta::schema::CompositeSchema;
use std::collections::{HashMap, HashSet};

/// The schema section of a message: every composite schema reachable from the
/// root value, in the order the writer first reached them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    schemas: Vec<CompositeSchema>,
    by_name: HashMap<String, usize>,
}

impl Envelope {
    pub fn new(schemas: Vec<CompositeSchema>) -> Result<Envelope, Error> {
        let mut by_name = HashMap::with_capacity(schemas.len());
        for (i, schema) in schemas.iter().enumerate() {
            ensure!(
                by_name.insert(schema.name().to_string(), i).is_none(),
                "schema `{}` appears twice in one envelope",
                schema.name()
            );
        }
        Ok(Envelope { schemas, by_name })
    }

    pub fn schemas(&self) -> &[CompositeSchema] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CompositeSchema> {
        self.schemas.get(index)
    }

    pub fn schema(&self, name: &str) -> Option<&CompositeSchema> {
        self.by_name.get(name).map(|&i| &self.schemas[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// The schema named `root` followed by every schema it reaches, in
    /// depth-first field order.
    pub fn closure(&self, root: &str) -> Result<Envelope, Error> {
        let start = self.index_of(root).ok_or_else(|| {
            Error::wire_format(format!("composite type `{}` is not in the envelope", root))
        })?;
        let mut seen = HashSet::from([start]);
        let mut order = vec![start];
        let mut stack = vec![(start, 0usize)];
        while let Some(&(current, next)) = stack.last() {
            let schema = &self.schemas[current];
            let Some(dep) = schema.dependencies().get(next).copied() else {
                stack.pop();
                continue;
            };
            let top = stack.len() - 1;
            stack[top].1 += 1;
            let i = self.index_of(dep).ok_or_else(|| {
                Error::wire_format(format!(
                    "schema `{}` references unknown composite type `{}`",
                    schema.name(),
                    dep
                ))
            })?;
            if seen.insert(i) {
                order.push(i);
                stack.push((i, 0));
            }
        }
        Envelope::new(order.into_iter().map(|i| self.schemas[i].clone()).collect())
    }

    pub fn write_to(&self, writer: &mut Writer) {
        write_schemas(&self.schemas, writer);
    }

    /// Reads a schema section, refusing more than `max_schemas` entries and
    /// any reference to a composite type the section does not define.
    pub fn read_from(reader: &mut Reader, max_schemas: usize) -> Result<Envelope, Error> {
        // a schema takes at least a name length byte and a field count byte
        let count = reader.read_len(2)?;
        ensure!(
            count <= max_schemas,
            "envelope declares {} schemas, limit is {}",
            count,
            max_schemas
        );
        let mut schemas = Vec::with_capacity(count);
        for _ in 0..count {
            schemas.push(CompositeSchema::read_from(reader)?);
        }
        let envelope = Envelope::new(schemas)?;
        for schema in &envelope.schemas {
            for dep in schema.dependencies() {
                ensure!(
                    envelope.by_name.contains_key(dep),
                    "schema `{}` references `{}` which is missing from the envelope",
                    schema.name(),
                    dep
                );
            }
        }
        Ok(envelope)
    }
}

pub(crate) fn write_schemas(schemas: &[CompositeSchema], writer: &mut Writer) {
    writer.write_varuint32(schemas.len() as u32);
    for schema in schemas {
        schema.write_to(writer);
    }
}
