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
use crate::meta::CompositeSchema;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{struct_, CompositeSerializer};
use log::debug;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

type PushSchemasFn = fn(&mut WriteContext) -> Result<(), Error>;
type WriteDataFn = fn(&dyn Any, &mut WriteContext) -> Result<(), Error>;
type ReadDataFn = fn(&mut ReadContext) -> Result<Arc<dyn Any + Send + Sync>, Error>;

/// Type-erased codec of a registered composite, used when the Rust type is
/// only known at run time.
#[derive(Clone, Copy)]
pub struct Harness {
    push_schemas_fn: PushSchemasFn,
    write_data_fn: WriteDataFn,
    read_data_fn: ReadDataFn,
}

impl Harness {
    pub fn new(
        push_schemas_fn: PushSchemasFn,
        write_data_fn: WriteDataFn,
        read_data_fn: ReadDataFn,
    ) -> Harness {
        Harness {
            push_schemas_fn,
            write_data_fn,
            read_data_fn,
        }
    }

    pub fn get_push_schemas_fn(&self) -> PushSchemasFn {
        self.push_schemas_fn
    }

    pub fn get_write_data_fn(&self) -> WriteDataFn {
        self.write_data_fn
    }

    pub fn get_read_data_fn(&self) -> ReadDataFn {
        self.read_data_fn
    }
}

fn push_schemas_fn<T: CompositeSerializer>(context: &mut WriteContext) -> Result<(), Error> {
    struct_::push_schemas::<T>(context)
}

fn write_data_fn<T: CompositeSerializer>(
    this: &dyn Any,
    context: &mut WriteContext,
) -> Result<(), Error> {
    let this = this.downcast_ref::<T>().ok_or_else(|| {
        Error::type_mismatch(std::any::type_name::<T>(), "a value of another Rust type")
    })?;
    struct_::write_data(this, context)
}

fn read_data_fn<T: CompositeSerializer>(
    context: &mut ReadContext,
) -> Result<Arc<dyn Any + Send + Sync>, Error> {
    Ok(Arc::new(struct_::read_data::<T>(context)?))
}

pub struct TypeInfo {
    schema: CompositeSchema,
    rust_type_id: std::any::TypeId,
    rust_type_name: &'static str,
    harness: Harness,
}

impl TypeInfo {
    pub fn get_schema(&self) -> &CompositeSchema {
        &self.schema
    }

    pub fn get_name(&self) -> &str {
        self.schema.name()
    }

    pub fn get_rust_type_id(&self) -> std::any::TypeId {
        self.rust_type_id
    }

    pub fn get_rust_type_name(&self) -> &'static str {
        self.rust_type_name
    }

    pub fn get_harness(&self) -> Harness {
        self.harness
    }
}

/// Registered local composite types, by wire name and by Rust type.
#[derive(Default)]
pub struct TypeResolver {
    by_name: HashMap<String, Arc<TypeInfo>>,
    by_rust_type: HashMap<std::any::TypeId, Arc<TypeInfo>>,
}

impl TypeResolver {
    /// Registering the same type twice is a no-op; a second Rust type under
    /// an already taken wire name is [`Error::NotAllowed`].
    pub fn register<T: CompositeSerializer>(&mut self) -> Result<(), Error> {
        let rust_type_id = std::any::TypeId::of::<T>();
        let name = T::type_name();
        if let Some(existing) = self.by_name.get(name) {
            if existing.rust_type_id == rust_type_id {
                return Ok(());
            }
            crate::not_allowed!(
                "wire name `{}` is already registered for {}, cannot register {}",
                name,
                existing.rust_type_name,
                std::any::type_name::<T>()
            );
        }
        let info = Arc::new(TypeInfo {
            schema: T::schema().clone(),
            rust_type_id,
            rust_type_name: std::any::type_name::<T>(),
            harness: Harness::new(push_schemas_fn::<T>, write_data_fn::<T>, read_data_fn::<T>),
        });
        debug!("registered {} as `{}`", info.rust_type_name, name);
        self.by_name.insert(name.to_string(), info.clone());
        self.by_rust_type.insert(rust_type_id, info);
        Ok(())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Arc<TypeInfo>> {
        self.by_name.get(name)
    }

    pub fn get_by_rust_type(&self, type_id: std::any::TypeId) -> Option<&Arc<TypeInfo>> {
        self.by_rust_type.get(&type_id)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
