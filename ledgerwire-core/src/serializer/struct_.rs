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

//! Helpers called from code generated by `#[derive(WireObject)]`.

use crate::error::Error;
use crate::meta::FieldDescriptor;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::{CompositeSerializer, WireField};

/// Descriptor of a field of Rust type `T`.
#[inline(always)]
pub fn field_descriptor<T: WireField>(name: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, T::wire_type(), T::nullable())
}

/// Pushes the schema of `T`, then the schemas of its field types.
pub fn push_schemas<T: CompositeSerializer>(context: &mut WriteContext) -> Result<(), Error> {
    if context.push_schema(T::schema())? {
        T::push_field_schemas(context)?;
    }
    Ok(())
}

#[inline(always)]
pub fn write_data<T: CompositeSerializer>(
    this: &T,
    context: &mut WriteContext,
) -> Result<(), Error> {
    context.enter()?;
    let result = this.write_fields(context);
    context.leave();
    result
}

/// Reads the fields of `T` after checking that the wire schema carrying the
/// name of `T` has exactly the local shape.
pub fn read_data<T: CompositeSerializer>(context: &mut ReadContext) -> Result<T, Error> {
    context.check_local_schema(T::schema())?;
    context.enter()?;
    let result = T::read_fields(context);
    context.leave();
    result
}
