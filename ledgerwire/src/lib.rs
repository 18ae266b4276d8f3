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


//! # LedgerWire
//!
//! Checkpoint and wire serialization for ledger nodes.
//!
//! LedgerWire encodes live objects into portable bytes and back with two
//! guarantees on top of plain structural encoding:
//!
//! - **Singleton identity.** Long-lived services implementing
//!   [`SerializeAsToken`] are registered in a [`TokenRegistry`] attached to
//!   the [`SerializationContext`]. They are written as a short token and read
//!   back as the exact registered instance.
//! - **Self-describing composites.** Every message carries the schema of each
//!   composite type it contains. A receiver that has no matching Rust type
//!   synthesizes one at run time and reads the value as a [`DynObject`].
//!
//! ## Quick start
//!
//! ```rust, ignore
//! use ledgerwire::{LedgerWire, SerializationContext, WireObject};
//!
//! #[derive(WireObject, Debug, PartialEq)]
//! #[wire(name = "acme.Payment")]
//! struct Payment {
//!     amount: i64,
//!     memo: Option<String>,
//!     legs: Vec<i32>,
//! }
//!
//! let engine = LedgerWire::default();
//! let context = SerializationContext::default();
//! let payment = Payment { amount: 10, memo: None, legs: vec![1, 2] };
//! let bytes = engine.serialize(&payment, &context)?;
//! let back: Payment = engine.deserialize(&bytes, &context)?;
//! assert_eq!(back, payment);
//! ```
//!
//! ## Tokens
//!
//! ```rust, ignore
//! use ledgerwire::{SerializeAsToken, TokenRegistry, Tokenizable};
//! use std::sync::Arc;
//!
//! struct VaultService { /* heavyweight state */ }
//! impl SerializeAsToken for VaultService {}
//!
//! let vault = Arc::new(VaultService {});
//! let registry = TokenRegistry::new(&context, [Tokenizable::new(&vault)])?;
//! let context = context.with_token_context(Arc::new(registry));
//! let bytes = engine.serialize(&vault, &context)?;
//! let back: Arc<VaultService> = engine.deserialize(&bytes, &context)?;
//! assert!(Arc::ptr_eq(&back, &vault));
//! ```
//!
//! ## Unknown types
//!
//! ```rust, ignore
//! use ledgerwire::Value;
//!
//! // bytes produced by a peer whose types this process does not have
//! let value: Value = engine.deserialize(&bytes, &context)?;
//! let obj = value.as_object().unwrap();
//! println!("{} amount={:?}", obj.type_name(), obj.get("amount"));
//! ```
//!
//! The derive macro expands to paths under `ledgerwire_core`, so crates
//! deriving [`WireObject`] depend on `ledgerwire-core` as well.

pub use ledgerwire_core::{
    error::Error, meta::CompositeSchema, meta::Envelope, meta::FieldDescriptor,
    types::PrimitiveKind, types::WireType, AllowList, Config, DenseArray, DynObject, Header,
    LedgerWire, NullableArray, SerializationContext, SerializeAsToken, SynthesizedType,
    TokenRegistry, Tokenizable, TypeSynthesizer, Value,
};
pub use ledgerwire_derive::WireObject;
