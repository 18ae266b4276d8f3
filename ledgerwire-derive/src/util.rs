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


use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Field, Ident, LitStr};

const RESERVED_NAMES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "float", "double", "char", "string", "token", "binary",
];

/// A named struct field together with the name it carries on the wire.
pub struct SourceField<'a> {
    pub field: &'a Field,
    pub ident: &'a Ident,
    pub wire_name: String,
}

/// Container level `#[wire(...)]` settings.
#[derive(Default)]
pub struct WireAttrs {
    pub name: Option<LitStr>,
}

pub fn parse_container_attrs(ast: &DeriveInput) -> syn::Result<WireAttrs> {
    let mut attrs = WireAttrs::default();
    for attr in &ast.attrs {
        if !attr.path().is_ident("wire") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("name") {
                let lit: LitStr = nested.value()?.parse()?;
                validate_wire_name(&lit)?;
                attrs.name = Some(lit);
                Ok(())
            } else {
                Err(nested.error("unknown wire attribute, expected `name`"))
            }
        })?;
    }
    Ok(attrs)
}

/// Mirrors the composite name rules of the core crate so that a bad name is
/// reported where it is written.
pub fn validate_wire_name(lit: &LitStr) -> syn::Result<()> {
    let name = lit.value();
    let problem = if name.is_empty() {
        Some("wire name is empty")
    } else if RESERVED_NAMES.contains(&name.as_str()) {
        Some("wire name is a reserved type name")
    } else if name.ends_with("[]") || name.ends_with("[p]") {
        Some("wire name looks like an array signature")
    } else if name.chars().any(char::is_whitespace) {
        Some("wire name contains whitespace")
    } else {
        None
    };
    match problem {
        Some(msg) => Err(syn::Error::new(lit.span(), msg)),
        None => Ok(()),
    }
}

/// Expression evaluating to the `&'static str` wire name of the type.
pub fn type_name_expr(ast: &DeriveInput, attrs: &WireAttrs) -> TokenStream {
    match &attrs.name {
        Some(lit) => quote! { #lit },
        None => {
            let ident = ast.ident.to_string();
            quote! { concat!(module_path!(), "::", #ident) }
        }
    }
}
