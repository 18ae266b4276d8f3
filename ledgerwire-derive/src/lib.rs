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


//! # LedgerWire Derive Macros
//!
//! This crate provides the procedural macro that makes a Rust struct a
//! ledgerwire composite type.
//!
//! ## `#[derive(WireObject)]`
//!
//! Generates `WireField` and `CompositeSerializer` for a struct with named
//! fields: a schema descriptor built once and cached for the process, plus
//! field-by-field codecs in declaration order.
//!
//! **Attributes:**
//! - `#[wire(name = "acme.Payment")]` on the struct sets the wire name; the
//!   default is the struct's module path followed by its identifier.
//! - `#[wire(rename = "amt")]` on a field sets the field's wire name.
//!
//! **Example:**
//! ```rust, ignore
//! use ledgerwire::WireObject;
//!
//! #[derive(WireObject, Debug, PartialEq)]
//! #[wire(name = "acme.Payment")]
//! struct Payment {
//!     amount: i64,
//!     memo: Option<String>,
//!     legs: Vec<i32>,
//! }
//! ```
//!
//! Generic structs, tuple structs, enums and unions are rejected at
//! expansion time.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod object;
mod util;

/// Derive macro for ledgerwire composite types.
///
/// See the [crate documentation](crate) for the supported attributes.
#[proc_macro_derive(WireObject, attributes(wire))]
pub fn proc_macro_derive_wire_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    object::derive_serializer(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
