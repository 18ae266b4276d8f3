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


//! # LedgerWire Core
//!
//! Core of the ledgerwire checkpoint and wire codec. It turns in-memory
//! values into a portable byte encoding and back while preserving two
//! things ordinary codecs do not:
//!
//! - **Singleton identity**: long-lived services registered in a
//!   [`TokenRegistry`](resolver::token_registry::TokenRegistry) are written
//!   as short tokens and read back as the very same instance.
//! - **Unknown types**: every message carries the schemas of its composite
//!   types, so a receiver without the matching Rust type synthesizes one
//!   from the schema and reads the message as a
//!   [`DynObject`](serializer::value::DynObject).
//!
//! ## Architecture
//!
//! - **`engine`**: [`LedgerWire`], the entry point (`serialize`,
//!   `deserialize`, `register`)
//! - **`context`**: per-call [`SerializationContext`]: header, allow-list and
//!   the optional token registry
//! - **`buffer`**: little-endian `Writer`/`Reader`
//! - **`types`**: type tags and the [`WireType`](types::WireType) union
//! - **`meta`**: composite schemas and the envelope that carries them
//! - **`resolver`**: read/write contexts, registered types, token registry
//! - **`serializer`**: codecs for primitives, arrays, strings, tokens,
//!   derived composites and dynamic values
//! - **`synthesizer`**: runtime types built from schemas
//!
//! ## Wire layout
//!
//! ```text
//! | magic | flags | schema offset | root type info | root data | schemas |
//! ```
//!
//! Primitive arrays come in two kinds that never convert into each other:
//! dense arrays (`int[p]`) whose elements are always present and
//! nullable-element arrays (`int[]`) whose elements carry a null marker.
//!
//! ## Usage
//!
//! ```rust
//! use ledgerwire_core::{LedgerWire, SerializationContext};
//!
//! let engine = LedgerWire::default();
//! let context = SerializationContext::default();
//! let dense = vec![1i32, 2, 3];
//! let bytes = engine.serialize(&dense, &context).unwrap();
//! let back: Vec<i32> = engine.deserialize(&bytes, &context).unwrap();
//! assert_eq!(back, dense);
//! // the same numbers as a nullable-element array are another type
//! assert!(engine.deserialize::<Vec<Option<i32>>>(&bytes, &context).is_err());
//! ```

pub mod buffer;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod meta;
pub mod resolver;
pub mod serializer;
pub mod synthesizer;
pub mod types;

pub use config::Config;
pub use context::{AllowList, Header, SerializationContext};
pub use engine::LedgerWire;
pub use error::Error;
pub use resolver::token_registry::{SerializeAsToken, TokenRegistry, Tokenizable};
pub use serializer::value::{DenseArray, DynObject, NullableArray, Value};
pub use serializer::{CompositeSerializer, Serializer, WireField};
pub use synthesizer::{SynthesizedType, TypeSynthesizer};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::OnceCell;
}
