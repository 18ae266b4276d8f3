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


use crate::object::{field_meta, misc, read, write};
use crate::util::{parse_container_attrs, type_name_expr};
use proc_macro2::TokenStream;
use quote::quote;
use syn::Data;

pub fn derive_serializer(ast: &syn::DeriveInput) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "WireObject does not support generic types",
        ));
    }
    let data = match &ast.data {
        Data::Struct(s) => s,
        Data::Enum(e) => {
            return Err(syn::Error::new_spanned(
                e.enum_token,
                "WireObject does not support enums",
            ))
        }
        Data::Union(u) => {
            return Err(syn::Error::new_spanned(
                u.union_token,
                "WireObject does not support unions",
            ))
        }
    };
    let attrs = parse_container_attrs(ast)?;
    let fields = field_meta::source_fields(&data.fields)?;
    let type_name = type_name_expr(ast, &attrs);

    let schema_ts = misc::gen_schema(&quote! { Self::type_name() }, &fields);
    let push_field_schemas_ts = misc::gen_push_field_schemas(&fields);
    let write_fields_ts = write::gen_write_fields(&fields);
    let read_fields_ts = read::gen_read_fields(&fields);

    Ok(quote! {
        impl ::ledgerwire_core::serializer::WireField for #name {
            #[inline(always)]
            fn wire_type() -> ::ledgerwire_core::types::WireType {
                ::ledgerwire_core::types::WireType::Composite(
                    <Self as ::ledgerwire_core::serializer::CompositeSerializer>::type_name().to_string(),
                )
            }

            fn push_static_schemas(
                context: &mut ::ledgerwire_core::resolver::context::WriteContext,
            ) -> Result<(), ::ledgerwire_core::error::Error> {
                ::ledgerwire_core::serializer::struct_::push_schemas::<Self>(context)
            }

            fn write_data(
                &self,
                context: &mut ::ledgerwire_core::resolver::context::WriteContext,
            ) -> Result<(), ::ledgerwire_core::error::Error> {
                ::ledgerwire_core::serializer::struct_::write_data(self, context)
            }

            fn read_data(
                context: &mut ::ledgerwire_core::resolver::context::ReadContext,
            ) -> Result<Self, ::ledgerwire_core::error::Error> {
                ::ledgerwire_core::serializer::struct_::read_data::<Self>(context)
            }
        }

        impl ::ledgerwire_core::serializer::CompositeSerializer for #name {
            #[inline(always)]
            fn type_name() -> &'static str {
                #type_name
            }

            fn schema() -> &'static ::ledgerwire_core::meta::CompositeSchema {
                #schema_ts
            }

            #[allow(unused_variables)]
            fn push_field_schemas(
                context: &mut ::ledgerwire_core::resolver::context::WriteContext,
            ) -> Result<(), ::ledgerwire_core::error::Error> {
                #push_field_schemas_ts
            }

            #[allow(unused_variables)]
            fn write_fields(
                &self,
                context: &mut ::ledgerwire_core::resolver::context::WriteContext,
            ) -> Result<(), ::ledgerwire_core::error::Error> {
                #write_fields_ts
            }

            #[allow(unused_variables)]
            fn read_fields(
                context: &mut ::ledgerwire_core::resolver::context::ReadContext,
            ) -> Result<Self, ::ledgerwire_core::error::Error> {
                #read_fields_ts
            }
        }
    })
}
