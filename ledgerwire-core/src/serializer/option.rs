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
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::WireField;
use crate::types::WireType;

/// A nullable field. `Option<Option<T>>` is not a meaningful field type and
/// is not supported.
impl<T: WireField> WireField for Option<T> {
    #[inline(always)]
    fn wire_type() -> WireType {
        T::wire_type()
    }

    #[inline(always)]
    fn nullable() -> bool {
        true
    }

    #[inline(always)]
    fn is_absent(&self) -> bool {
        self.is_none()
    }

    #[inline(always)]
    fn absent() -> Result<Self, Error> {
        Ok(None)
    }

    fn push_static_schemas(context: &mut WriteContext) -> Result<(), Error> {
        T::push_static_schemas(context)
    }

    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        match self {
            None => {
                context.write_null_flag(true);
                Ok(())
            }
            Some(v) => {
                context.write_null_flag(false);
                v.write_data(context)
            }
        }
    }

    fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
        if context.read_null_flag()? {
            Ok(None)
        } else {
            Ok(Some(T::read_data(context)?))
        }
    }
}
