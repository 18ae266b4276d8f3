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

//! Nullable-element arrays: `Vec<Option<i32>>` is `int[]`, every element
//! preceded by a null marker. `Vec<Option<String>>` is `string[]`.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::array::write_len;
use crate::serializer::primitive::Primitive;
use crate::serializer::WireField;
use crate::types::WireType;

pub(crate) fn write_nullable<T: WireField>(
    context: &mut WriteContext,
    values: &[Option<T>],
) -> Result<(), Error> {
    write_len(&mut context.writer, values.len())?;
    for v in values {
        match v {
            None => context.write_null_flag(true),
            Some(v) => {
                context.write_null_flag(false);
                v.write_data(context)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn read_nullable<T: WireField>(
    context: &mut ReadContext,
) -> Result<Vec<Option<T>>, Error> {
    // every element carries at least its null marker
    let len = context.reader.read_len(1)?;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        if context.read_null_flag()? {
            values.push(None);
        } else {
            values.push(Some(T::read_data(context)?));
        }
    }
    Ok(values)
}

macro_rules! impl_nullable_array {
    ($($ty:ty),*) => {
        $(
            impl WireField for Vec<Option<$ty>> {
                #[inline(always)]
                fn wire_type() -> WireType {
                    WireType::NullableArray(<$ty as Primitive>::KIND)
                }

                fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
                    write_nullable(context, self)
                }

                fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
                    read_nullable(context)
                }
            }
        )*
    };
}

impl_nullable_array!(bool, i8, i16, i32, i64, f32, f64, char);

impl WireField for Vec<Option<String>> {
    #[inline(always)]
    fn wire_type() -> WireType {
        WireType::StringArray
    }

    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_nullable(context, self)
    }

    fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
        read_nullable(context)
    }
}
