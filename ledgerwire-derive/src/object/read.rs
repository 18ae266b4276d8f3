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
use quote::{format_ident, quote};

pub fn gen_read_fields(fields: &[SourceField]) -> TokenStream {
    let locals: Vec<_> = fields
        .iter()
        .map(|f| format_ident!("_{}", f.ident))
        .collect();
    let reads = fields.iter().zip(&locals).map(|(f, local)| {
        let ty = &f.field.ty;
        quote! {
            let #local = <#ty as ::ledgerwire_core::serializer::WireField>::read_data(context)?;
        }
    });
    let inits = fields.iter().zip(&locals).map(|(f, local)| {
        let ident = f.ident;
        quote! { #ident: #local }
    });
    quote! {
        #(#reads)*
        Ok(Self { #(#inits),* })
    }
}
