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


use crate::util::SourceField;
use std::collections::HashMap;
use syn::{Field, Fields, LitStr};

/// Field level `#[wire(...)]` settings.
#[derive(Debug, Clone, Default)]
pub struct WireFieldMeta {
    /// Wire name of the field, the Rust identifier when absent.
    pub rename: Option<String>,
}

/// Parse `#[wire(...)]` attributes from a field
pub fn parse_field_meta(field: &Field) -> syn::Result<WireFieldMeta> {
    let mut meta = WireFieldMeta::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("wire") {
            continue;
        }

        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("rename") {
                let lit: LitStr = nested.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(syn::Error::new(lit.span(), "field wire name is empty"));
                }
                meta.rename = Some(lit.value());
                Ok(())
            } else {
                Err(nested.error("unknown wire field attribute, expected `rename`"))
            }
        })?;
    }

    Ok(meta)
}

/// Named fields in declaration order, which is also their wire order.
pub fn source_fields(fields: &Fields) -> syn::Result<Vec<SourceField<'_>>> {
    let named = match fields {
        Fields::Named(named) => named,
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "WireObject requires a struct with named fields",
            ))
        }
    };
    let mut seen: HashMap<String, &syn::Ident> = HashMap::new();
    let mut result = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let ident = match &field.ident {
            Some(ident) => ident,
            None => return Err(syn::Error::new_spanned(field, "unnamed field")),
        };
        let meta = parse_field_meta(field)?;
        let wire_name = meta.rename.unwrap_or_else(|| ident.to_string());
        if let Some(existing) = seen.get(&wire_name) {
            return Err(syn::Error::new(
                ident.span(),
                format!(
                    "duplicate wire field name `{}` on fields '{}' and '{}'",
                    wire_name, existing, ident
                ),
            ));
        }
        seen.insert(wire_name.clone(), ident);
        result.push(SourceField {
            field,
            ident,
            wire_name,
        });
    }
    Ok(result)
}
