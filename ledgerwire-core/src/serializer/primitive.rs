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
use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::WireField;
use crate::types::{PrimitiveKind, WireType};

/// Scalars with a fixed encoded width, usable as dense array elements.
pub trait Primitive: WireField + Copy {
    const KIND: PrimitiveKind;

    fn write_to(self, writer: &mut Writer);

    fn read_from(reader: &mut Reader) -> Result<Self, Error>;
}

pub(crate) fn write_char(writer: &mut Writer, value: char) {
    writer.write_u32(value as u32);
}

pub(crate) fn read_char(reader: &mut Reader) -> Result<char, Error> {
    let scalar = reader.read_u32()?;
    char::from_u32(scalar)
        .ok_or_else(|| Error::wire_format(format!("{:#x} is not a unicode scalar value", scalar)))
}

macro_rules! impl_primitive {
    ($ty:ty, $kind:expr, $writer:expr, $reader:expr) => {
        impl Primitive for $ty {
            const KIND: PrimitiveKind = $kind;

            #[inline(always)]
            fn write_to(self, writer: &mut Writer) {
                $writer(writer, self)
            }

            #[inline(always)]
            fn read_from(reader: &mut Reader) -> Result<Self, Error> {
                $reader(reader)
            }
        }

        impl WireField for $ty {
            #[inline(always)]
            fn wire_type() -> WireType {
                WireType::Primitive($kind)
            }

            #[inline(always)]
            fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
                $writer(&mut context.writer, *self);
                Ok(())
            }

            #[inline(always)]
            fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
                $reader(&mut context.reader)
            }
        }
    };
}

impl_primitive!(bool, PrimitiveKind::Bool, Writer::write_bool, Reader::read_bool);
impl_primitive!(i8, PrimitiveKind::Byte, Writer::write_i8, Reader::read_i8);
impl_primitive!(i16, PrimitiveKind::Short, Writer::write_i16, Reader::read_i16);
impl_primitive!(i32, PrimitiveKind::Int, Writer::write_i32, Reader::read_i32);
impl_primitive!(i64, PrimitiveKind::Long, Writer::write_i64, Reader::read_i64);
impl_primitive!(f32, PrimitiveKind::Float, Writer::write_f32, Reader::read_f32);
impl_primitive!(f64, PrimitiveKind::Double, Writer::write_f64, Reader::read_f64);
impl_primitive!(char, PrimitiveKind::Char, write_char, read_char);
