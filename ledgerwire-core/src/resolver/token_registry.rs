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

//! Identity-preserving substitution of long-lived singletons.
//!
//! A [`TokenRegistry`] maps the address of each registered `Arc` to a small
//! [`SerializationToken`] and back. Writing a registered singleton emits only
//! its token; reading the token hands back the very same `Arc`.
//!
//! # Examples
//!
//! ```rust
//! use ledgerwire_core::context::SerializationContext;
//! use ledgerwire_core::resolver::token_registry::{SerializeAsToken, Tokenizable, TokenRegistry};
//! use std::sync::Arc;
//!
//! struct VaultService;
//! impl SerializeAsToken for VaultService {}
//!
//! let vault = Arc::new(VaultService);
//! let registry = TokenRegistry::new(
//!     &SerializationContext::default(),
//!     [Tokenizable::new(&vault)],
//! )
//! .unwrap();
//! assert!(registry.contains(&vault));
//! assert!(!registry.contains(&Arc::new(VaultService)));
//! ```

use crate::buffer::{Reader, Writer};
use crate::context::SerializationContext;
use crate::error::Error;
use log::debug;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Marker for long-lived singletons that are written as tokens, never by value.
pub trait SerializeAsToken: Any + Send + Sync {}

/// Address of the value behind an `Arc`, used as its identity.
#[inline(always)]
pub fn identity_of<T: ?Sized>(instance: &Arc<T>) -> usize {
    Arc::as_ptr(instance) as *const () as usize
}

/// A singleton queued for registration.
#[derive(Clone)]
pub struct Tokenizable {
    instance: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    identity: usize,
}

impl Tokenizable {
    pub fn new<T: SerializeAsToken>(instance: &Arc<T>) -> Tokenizable {
        Tokenizable {
            identity: identity_of(instance),
            type_name: std::any::type_name::<T>(),
            instance: instance.clone(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl<T: SerializeAsToken> From<&Arc<T>> for Tokenizable {
    fn from(instance: &Arc<T>) -> Self {
        Tokenizable::new(instance)
    }
}

impl fmt::Debug for Tokenizable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizable")
            .field("type_name", &self.type_name)
            .field("identity", &format_args!("{:#x}", self.identity))
            .finish()
    }
}

/// Wire stand-in for a registered singleton: its declaring type and its
/// position in the registry that minted it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SerializationToken {
    type_name: String,
    index: u32,
}

impl SerializationToken {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    // token_bytes: | index | type_name |
    pub fn write_to(&self, writer: &mut Writer) {
        writer.write_varuint32(self.index);
        writer.write_utf8_string(&self.type_name);
    }

    pub fn read_from(reader: &mut Reader) -> Result<SerializationToken, Error> {
        let index = reader.read_varuint32()?;
        let type_name = reader.read_utf8_string()?;
        Ok(SerializationToken { type_name, index })
    }
}

struct Entry {
    token: SerializationToken,
    instance: Arc<dyn Any + Send + Sync>,
}

/// Sealed bidirectional map between singleton identities and tokens.
///
/// A registry is built once from an explicit set of instances and never
/// changes afterwards. Tokens are only meaningful to the registry that minted
/// them; two registries over overlapping sets are independent.
pub struct TokenRegistry {
    entries: Vec<Entry>,
    by_identity: HashMap<usize, u32>,
    session: Option<Arc<dyn Any + Send + Sync>>,
}

impl TokenRegistry {
    /// Registers every distinct instance of `to_be_tokenized`; repeats of the
    /// same `Arc` share one token. Each type must pass the allow-list of
    /// `context`.
    pub fn new<I>(context: &SerializationContext, to_be_tokenized: I) -> Result<TokenRegistry, Error>
    where
        I: IntoIterator<Item = Tokenizable>,
    {
        let mut entries: Vec<Entry> = Vec::new();
        let mut by_identity = HashMap::new();
        for item in to_be_tokenized {
            if by_identity.contains_key(&item.identity) {
                continue;
            }
            context.allow_list().check(item.type_name)?;
            let index = u32::try_from(entries.len())
                .map_err(|_| Error::not_allowed("too many tokenizable singletons"))?;
            by_identity.insert(item.identity, index);
            entries.push(Entry {
                token: SerializationToken {
                    type_name: item.type_name.to_string(),
                    index,
                },
                instance: item.instance,
            });
        }
        debug!("token registry sealed with {} singletons", entries.len());
        Ok(TokenRegistry {
            entries,
            by_identity,
            session: None,
        })
    }

    /// Like [`TokenRegistry::new`], additionally keeping the session object the
    /// registry was built for so that callers resolving tokens can reach it.
    pub fn with_session<S, I>(
        session: Arc<S>,
        context: &SerializationContext,
        to_be_tokenized: I,
    ) -> Result<TokenRegistry, Error>
    where
        S: Any + Send + Sync,
        I: IntoIterator<Item = Tokenizable>,
    {
        let mut registry = TokenRegistry::new(context, to_be_tokenized)?;
        registry.session = Some(session);
        Ok(registry)
    }

    pub fn session<S: Any + Send + Sync>(&self) -> Option<Arc<S>> {
        self.session.clone()?.downcast::<S>().ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains<T: ?Sized>(&self, instance: &Arc<T>) -> bool {
        self.by_identity.contains_key(&identity_of(instance))
    }

    /// Token of the instance at address `identity`.
    pub fn token_for(&self, identity: usize, type_name: &str) -> Result<&SerializationToken, Error> {
        match self.by_identity.get(&identity) {
            Some(&index) => Ok(&self.entries[index as usize].token),
            None => Err(Error::unregistered_token(format!(
                "new token encountered after context init: instance of `{}` at {:#x} was not registered",
                type_name, identity
            ))),
        }
    }

    /// The exact instance `token` was minted for.
    pub fn resolve(&self, token: &SerializationToken) -> Result<&Arc<dyn Any + Send + Sync>, Error> {
        match self.entries.get(token.index as usize) {
            Some(entry) if entry.token == *token => Ok(&entry.instance),
            _ => Err(Error::unregistered_token(format!(
                "no singleton registered for token #{} of `{}`",
                token.index, token.type_name
            ))),
        }
    }
}

impl fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRegistry")
            .field(
                "tokens",
                &self.entries.iter().map(|e| &e.token).collect::<Vec<_>>(),
            )
            .field("has_session", &self.session.is_some())
            .finish()
    }
}
