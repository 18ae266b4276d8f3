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

//! `Arc<T>` of a [`SerializeAsToken`] singleton is written as its token.

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::resolver::token_registry::{identity_of, SerializationToken, SerializeAsToken};
use crate::serializer::WireField;
use crate::types::WireType;
use std::any::Any;
use std::sync::Arc;

pub(crate) fn write_token(
    context: &mut WriteContext,
    identity: usize,
    type_name: &str,
) -> Result<(), Error> {
    let tokens = context.tokens(type_name)?;
    let token = tokens.token_for(identity, type_name)?;
    token.write_to(&mut context.writer);
    Ok(())
}

pub(crate) fn read_token(
    context: &mut ReadContext,
    expected: &str,
) -> Result<(SerializationToken, Arc<dyn Any + Send + Sync>), Error> {
    let tokens = context.tokens(expected)?;
    let token = SerializationToken::read_from(&mut context.reader)?;
    let instance = tokens.resolve(&token)?.clone();
    Ok((token, instance))
}

impl<T: SerializeAsToken> WireField for Arc<T> {
    #[inline(always)]
    fn wire_type() -> WireType {
        WireType::Token
    }

    fn write_data(&self, context: &mut WriteContext) -> Result<(), Error> {
        write_token(context, identity_of(self), std::any::type_name::<T>())
    }

    fn read_data(context: &mut ReadContext) -> Result<Self, Error> {
        let expected = std::any::type_name::<T>();
        let (token, instance) = read_token(context, expected)?;
        instance.downcast::<T>().map_err(|_| {
            Error::type_mismatch(
                expected,
                format!("token returning `{}`", token.type_name()),
            )
        })
    }

    // Anything other than a token in front of a tokenizable is malformed
    // input, not a type confusion.
    fn type_info_mismatch(_expected: &WireType, actual: &WireType) -> Error {
        Error::wire_format(format!(
            "expected a serialization token, found a `{}` payload",
            actual
        ))
    }
}
