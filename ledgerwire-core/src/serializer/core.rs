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
use crate::types::WireType;

/// A value that can be the root of a message.
///
/// Implemented for every [`WireField`] through a blanket impl, and by hand for
/// the dynamic [`Value`](crate::serializer::value::Value) and
/// [`DynObject`](crate::serializer::value::DynObject), whose wire type is only
/// known per instance.
pub trait Serializer: Sized + Send + Sync + 'static {
    /// Whether the root is absent; an absent root is encoded in the header alone.
    fn is_null(&self) -> bool {
        false
    }

    /// Value produced for a message whose header marks the root as null.
    fn from_null() -> Result<Self, Error> {
        Err(Error::wire_format(format!(
            "message root is null but `{}` is not nullable",
            std::any::type_name::<Self>()
        )))
    }

    /// Registers every composite schema reachable from this value, parents
    /// before the types of their fields.
    fn push_schemas(&self, context: &mut WriteContext) -> Result<(), Error>;

    /// Writes root type info followed by the data.
    fn write(&self, context: &mut WriteContext) -> Result<(), Error>;

    /// Reads root type info and the data that follows.
    fn read(context: &mut ReadContext) -> Result<Self, Error>;
}

/// A type with a fixed wire type, usable as a field of a composite.
///
/// Fields carry no type info of their own; the enclosing schema declares it.
pub trait WireField: Sized + Send + Sync + 'static {
    fn wire_type() -> WireType;

    /// Whether a null marker precedes the data of a field of this type.
    fn nullable() -> bool {
        false
    }

    fn is_absent(&self) -> bool {
        false
    }

    fn absent() -> Result<Self, Error> {
        Err(Error::wire_format(format!(
            "null where non-nullable `{}` was expected",
            Self::wire_type()
        )))
    }

    /// Pushes the schemas reachable from the type itself, whether or not a
    /// value is present.
    fn push_static_schemas(_context: &mut WriteContext) -> Result<(), Error> {
        Ok(())
    }

    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error>;

    fn read_data(context: &mut ReadContext) -> Result<Self, Error>;

    /// Error raised when the root type info names another wire type.
    fn type_info_mismatch(expected: &WireType, actual: &WireType) -> Error {
        Error::type_mismatch(expected.to_string(), actual.to_string())
    }
}

impl<T: WireField> Serializer for T {
    #[inline(always)]
    fn is_null(&self) -> bool {
        self.is_absent()
    }

    #[inline(always)]
    fn from_null() -> Result<Self, Error> {
        T::absent()
    }

    fn push_schemas(&self, context: &mut WriteContext) -> Result<(), Error> {
        T::push_static_schemas(context)
    }

    fn write(&self, context: &mut WriteContext) -> Result<(), Error> {
        context.write_wire_type(&T::wire_type())?;
        self.write_data(context)
    }

    fn read(context: &mut ReadContext) -> Result<Self, Error> {
        let actual = context.read_wire_type()?;
        let expected = T::wire_type();
        if actual != expected {
            return Err(T::type_info_mismatch(&expected, &actual));
        }
        T::read_data(context)
    }
}

/// Field-by-field codec of a named composite type, generated by
/// `#[derive(WireObject)]`.
pub trait CompositeSerializer: WireField {
    fn type_name() -> &'static str;

    /// The schema of this type, built once and cached for the process.
    fn schema() -> &'static CompositeSchema;

    fn push_field_schemas(context: &mut WriteContext) -> Result<(), Error>;

    fn write_fields(&self, context: &mut WriteContext) -> Result<(), Error>;

    fn read_fields(context: &mut ReadContext) -> Result<Self, Error>;
}
