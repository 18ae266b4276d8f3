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
use proc_macro2::TokenStream;
use quote::quote;

pub fn gen_schema(type_name: &TokenStream, fields: &[SourceField]) -> TokenStream {
    let descriptors = fields.iter().map(|f| {
        let ty = &f.field.ty;
        let name = &f.wire_name;
        quote! {
            ::ledgerwire_core::serializer::struct_::field_descriptor::<#ty>(#name)
        }
    });
    quote! {
        static SCHEMA: ::ledgerwire_core::__private::OnceCell<::ledgerwire_core::meta::CompositeSchema> =
            ::ledgerwire_core::__private::OnceCell::new();
        SCHEMA.get_or_init(|| {
            ::ledgerwire_core::meta::CompositeSchema::new_unchecked(
                #type_name,
                vec![#(#descriptors),*],
            )
        })
    }
}

pub fn gen_push_field_schemas(fields: &[SourceField]) -> TokenStream {
    let pushes = fields.iter().map(|f| {
        let ty = &f.field.ty;
        quote! {
            <#ty as ::ledgerwire_core::serializer::WireField>::push_static_schemas(context)?;
        }
    });
    quote! {
        #(#pushes)*
        Ok(())
    }
}
