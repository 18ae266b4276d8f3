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

use crate::ensure;
use crate::error::Error;
use byteorder::{ByteOrder, LittleEndian};

macro_rules! impl_write_fixed {
    ($($ty:ident => $size:expr),* $(,)?) => {
        paste::paste! {
            $(
                #[inline(always)]
                pub fn [<write_ $ty>](&mut self, value: $ty) {
                    let mut buf = [0u8; $size];
                    LittleEndian::[<write_ $ty>](&mut buf, value);
                    self.bf.extend_from_slice(&buf);
                }
            )*
        }
    };
}

macro_rules! impl_read_fixed {
    ($($ty:ident => $size:expr),* $(,)?) => {
        paste::paste! {
            $(
                #[inline(always)]
                pub fn [<read_ $ty>](&mut self) -> Result<$ty, Error> {
                    let bytes = self.read_bytes($size)?;
                    Ok(LittleEndian::[<read_ $ty>](bytes))
                }
            )*
        }
    };
}

/// Append-only little-endian byte sink.
#[derive(Default)]
pub struct Writer {
    pub(crate) bf: Vec<u8>,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Writer {
        Writer {
            bf: Vec::with_capacity(capacity),
        }
    }

    pub fn dump(&self) -> Vec<u8> {
        self.bf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bf
    }

    pub fn len(&self) -> usize {
        self.bf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bf.is_empty()
    }

    /// Overwrites already written bytes, used to patch placeholders.
    pub fn set_bytes(&mut self, offset: usize, data: &[u8]) -> Result<(), Error> {
        let len = self.bf.len();
        match self.bf.get_mut(offset..offset + data.len()) {
            Some(slot) => {
                slot.copy_from_slice(data);
                Ok(())
            }
            None => Err(Error::buffer_out_of_bound(offset, data.len(), len)),
        }
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> usize {
        self.bf.extend_from_slice(v);
        v.len()
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) {
        self.bf.push(value);
    }

    #[inline(always)]
    pub fn write_i8(&mut self, value: i8) {
        self.bf.push(value as u8);
    }

    #[inline(always)]
    pub fn write_bool(&mut self, value: bool) {
        self.bf.push(value as u8);
    }

    impl_write_fixed! {
        i16 => 2,
        u32 => 4,
        i32 => 4,
        i64 => 8,
        f32 => 4,
        f64 => 8,
    }

    pub fn write_varuint32(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.bf.push(((value as u8) & 0x7F) | 0x80);
            value >>= 7;
        }
        self.bf.push(value as u8);
    }

    /// Length-prefixed UTF-8.
    pub fn write_utf8_string(&mut self, s: &str) {
        self.write_varuint32(s.len() as u32);
        self.bf.extend_from_slice(s.as_bytes());
    }
}

/// Bounds-checked little-endian cursor over a borrowed buffer.
///
/// Every read returns [`Error::WireFormat`] instead of panicking when the
/// input is short, so untrusted bytes can be fed straight in.
#[derive(Clone, Copy)]
pub struct Reader<'a> {
    bf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bf: &'a [u8]) -> Reader<'a> {
        Reader { bf, cursor: 0 }
    }

    #[inline(always)]
    pub fn get_cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) -> Result<(), Error> {
        ensure!(
            cursor <= self.bf.len(),
            Error::buffer_out_of_bound(cursor, 0, self.bf.len())
        );
        self.cursor = cursor;
        Ok(())
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.bf.len() - self.cursor
    }

    #[inline(always)]
    fn check_bound(&self, n: usize) -> Result<(), Error> {
        if self.remaining() < n {
            return Err(Error::buffer_out_of_bound(self.cursor, n, self.bf.len()));
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.check_bound(len)?;
        let bytes = &self.bf[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(bytes)
    }

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.check_bound(1)?;
        let v = self.bf[self.cursor];
        self.cursor += 1;
        Ok(v)
    }

    #[inline(always)]
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool, Error> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::wire_format(format!(
                "invalid boolean byte {:#04x}",
                other
            ))),
        }
    }

    impl_read_fixed! {
        i16 => 2,
        u32 => 4,
        i32 => 4,
        i64 => 8,
        f32 => 4,
        f64 => 8,
    }

    pub fn read_varuint32(&mut self) -> Result<u32, Error> {
        let mut result: u32 = 0;
        for i in 0..5 {
            let b = self.read_u8()?;
            if i == 4 && b > 0x0F {
                return Err(Error::wire_format("varuint32 overflow"));
            }
            result |= ((b & 0x7F) as u32) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(Error::wire_format("varuint32 longer than 5 bytes"))
    }

    /// Reads a varuint32 element count and checks that `count * min_elem_size`
    /// bytes are still available, so a forged length cannot force a huge allocation.
    pub fn read_len(&mut self, min_elem_size: usize) -> Result<usize, Error> {
        let len = self.read_varuint32()? as usize;
        let needed = len.saturating_mul(min_elem_size);
        ensure!(
            needed <= self.remaining(),
            "declared length {} needs {} bytes but only {} remain",
            len,
            needed,
            self.remaining()
        );
        Ok(len)
    }

    pub fn read_utf8_string(&mut self) -> Result<String, Error> {
        let len = self.read_len(1)?;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| Error::wire_format(format!("invalid utf-8 string: {}", e)))
    }
}
