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

//! Per-call serialization settings.
//!
//! A [`SerializationContext`] is immutable. Attaching a token registry yields
//! a new context and leaves the original untouched, so a base context can be
//! shared freely between sessions.

use crate::error::Error;
use crate::resolver::token_registry::TokenRegistry;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Format identifier and version, `b"lwire"` followed by major and minor.
pub const DEFAULT_MAGIC: &[u8] = b"lwire\x01\x00";

/// Magic bytes every message starts with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Header {
    magic: Cow<'static, [u8]>,
}

impl Header {
    pub fn new<M: Into<Cow<'static, [u8]>>>(magic: M) -> Header {
        Header {
            magic: magic.into(),
        }
    }

    pub fn magic(&self) -> &[u8] {
        &self.magic
    }
}

impl Default for Header {
    fn default() -> Self {
        Header::new(DEFAULT_MAGIC)
    }
}

/// Which composite and tokenizable type names a context accepts.
///
/// Entries ending in `*` match by prefix, so `net.ledger.*` admits every type
/// under `net.ledger.`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AllowList {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl AllowList {
    pub fn only<I, S>(names: I) -> AllowList
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowList::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn is_allowed(&self, type_name: &str) -> bool {
        match self {
            AllowList::All => true,
            AllowList::Only(entries) => entries.iter().any(|entry| match entry.strip_suffix('*') {
                Some(prefix) => type_name.starts_with(prefix),
                None => entry == type_name,
            }),
        }
    }

    pub fn check(&self, type_name: &str) -> Result<(), Error> {
        if !self.is_allowed(type_name) {
            crate::not_allowed!("type `{}` is not in the allow-list", type_name);
        }
        Ok(())
    }
}

/// Header, allow-list and optional token registry for one serialization call.
#[derive(Clone, Debug, Default)]
pub struct SerializationContext {
    header: Header,
    allow_list: AllowList,
    token_registry: Option<Arc<TokenRegistry>>,
}

impl SerializationContext {
    pub fn new(header: Header, allow_list: AllowList) -> SerializationContext {
        SerializationContext {
            header,
            allow_list,
            token_registry: None,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn token_registry(&self) -> Option<&Arc<TokenRegistry>> {
        self.token_registry.as_ref()
    }

    /// Returns a derived context with `registry` attached, replacing any
    /// registry this context already carried.
    pub fn with_token_context(&self, registry: Arc<TokenRegistry>) -> SerializationContext {
        SerializationContext {
            header: self.header.clone(),
            allow_list: self.allow_list.clone(),
            token_registry: Some(registry),
        }
    }

    pub fn without_token_context(&self) -> SerializationContext {
        SerializationContext {
            header: self.header.clone(),
            allow_list: self.allow_list.clone(),
            token_registry: None,
        }
    }

    pub fn with_allow_list(&self, allow_list: AllowList) -> SerializationContext {
        SerializationContext {
            allow_list,
            ..self.clone()
        }
    }

    pub fn with_header(&self, header: Header) -> SerializationContext {
        SerializationContext {
            header,
            ..self.clone()
        }
    }
}
