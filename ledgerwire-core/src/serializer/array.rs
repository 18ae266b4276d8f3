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

//! Dense-value arrays: `Vec<i32>` is `int[p]`, a length followed by packed
//! elements with no null markers. Bytes (`Vec<i8>` and `Vec<u8>`) are `binary`.

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::primitive::Primitive;
use crate::serializer::WireField;
use crate::types::{PrimitiveKind, WireType};

pub(crate) fn write_len(writer: &mut Writer, len: usize) -> Result<(), Error> {
    let len = u32::try_from(len)
        .map_err(|_| Error::wire_format(format!("array of {} elements is too long", len)))?;
    writer.write_varuint32(len);
    Ok(())
}

pub(crate) fn write_dense<T: Primitive>(writer: &mut Writer, values: &[T]) -> Result<(), Error> {
    write_len(writer, values.len())?;
    for v in values {
        v.write_to(writer);
    }
    Ok(())
}

pub(crate) fn read_dense<T: Primitive>(reader: &mut Reader) -> Result<Vec<T>, Error> {
    let len = reader.read_len(T::KIND.size())?;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(T::read_from(reader)?);
    }
    Ok(values)
}

macro_rules! impl_dense_array {
    ($($ty:ty),*) => {
        $(
            impl WireField for Vec<$ty> {
                #[inline(always)]
                fn wire_type() -> WireType {
                    WireType::DenseArray(<$ty as Primitive>::KIND)
                }

                fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
                    write_dense(&mut context.writer, self)
                }

                fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
                    read_dense(&mut context.reader)
                }
            }
        )*
    };
}

impl_dense_array!(bool, i8, i16, i32, i64, f32, f64, char);

impl WireField for Vec<u8> {
    #[inline(always)]
    fn wire_type() -> WireType {
        WireType::DenseArray(PrimitiveKind::Byte)
    }

    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_len(&mut context.writer, self.len())?;
        context.writer.write_bytes(self);
        Ok(())
    }

    fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
        let len = context.reader.read_len(1)?;
        Ok(context.reader.read_bytes(len)?.to_vec())
    }
}
