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


use ledgerwire::{
    AllowList, Error, LedgerWire, SerializationContext, SerializeAsToken, TokenRegistry,
    Tokenizable, Value, WireObject,
};
use std::sync::Arc;

#[derive(Debug)]
struct VaultService {
    label: &'static str,
}
impl SerializeAsToken for VaultService {}

#[derive(Debug)]
struct NetworkMapCache {
    #[allow(dead_code)]
    peers: Vec<String>,
}
impl SerializeAsToken for NetworkMapCache {}

struct LargeTokenizable {
    #[allow(dead_code)]
    payload: Vec<u8>,
}
impl SerializeAsToken for LargeTokenizable {}

struct ServiceHub {
    node_name: String,
}

fn context_with(items: Vec<Tokenizable>) -> SerializationContext {
    let base = SerializationContext::default();
    let registry = TokenRegistry::new(&base, items).unwrap();
    base.with_token_context(Arc::new(registry))
}

#[test]
fn test_identity_preserved() {
    let engine = LedgerWire::default();
    let vault = Arc::new(VaultService { label: "vault" });
    let cache = Arc::new(NetworkMapCache { peers: vec![] });
    let context = context_with(vec![Tokenizable::new(&vault), Tokenizable::new(&cache)]);

    let bytes = engine.serialize(&vault, &context).unwrap();
    let back: Arc<VaultService> = engine.deserialize(&bytes, &context).unwrap();
    assert!(Arc::ptr_eq(&back, &vault));
    assert_eq!(back.label, "vault");

    let bytes = engine.serialize(&cache, &context).unwrap();
    let back: Arc<NetworkMapCache> = engine.deserialize(&bytes, &context).unwrap();
    assert!(Arc::ptr_eq(&back, &cache));
}

#[test]
fn test_repeated_registration_shares_token() {
    let vault = Arc::new(VaultService { label: "vault" });
    let base = SerializationContext::default();
    let registry = TokenRegistry::new(
        &base,
        vec![Tokenizable::new(&vault), Tokenizable::new(&vault.clone())],
    )
    .unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(&vault));
}

#[test]
fn test_token_smaller_than_payload() {
    let engine = LedgerWire::default();
    let large = Arc::new(LargeTokenizable {
        payload: vec![7u8; 1024],
    });
    let context = context_with(vec![Tokenizable::new(&large)]);
    let token_bytes = engine.serialize(&large, &context).unwrap();
    let payload_bytes = engine.serialize(&vec![7u8; 1024], &context).unwrap();
    assert!(token_bytes.len() < 1024);
    assert!(token_bytes.len() < payload_bytes.len());
    let back: Arc<LargeTokenizable> = engine.deserialize(&token_bytes, &context).unwrap();
    assert!(Arc::ptr_eq(&back, &large));
}

#[test]
fn test_registry_is_sealed() {
    let engine = LedgerWire::default();
    let registered = Arc::new(VaultService { label: "registered" });
    let late = Arc::new(VaultService { label: "late" });
    let context = context_with(vec![Tokenizable::new(&registered)]);
    let err = engine.serialize(&late, &context).unwrap_err();
    assert!(matches!(err, Error::UnregisteredToken(_)));
    assert!(err.to_string().contains("new token encountered after context init"));
}

#[test]
fn test_unknown_token_on_read() {
    let engine = LedgerWire::default();
    let vault = Arc::new(VaultService { label: "vault" });
    let writer_context = context_with(vec![Tokenizable::new(&vault)]);
    let bytes = engine.serialize(&vault, &writer_context).unwrap();
    let reader_context = context_with(vec![]);
    let err = engine
        .deserialize::<Arc<VaultService>>(&bytes, &reader_context)
        .unwrap_err();
    assert!(matches!(err, Error::UnregisteredToken(_)));
}

#[test]
fn test_missing_context() {
    let engine = LedgerWire::default();
    let vault = Arc::new(VaultService { label: "vault" });
    let bare = SerializationContext::default();
    assert!(matches!(
        engine.serialize(&vault, &bare),
        Err(Error::MissingContext(_))
    ));

    let context = context_with(vec![Tokenizable::new(&vault)]);
    let bytes = engine.serialize(&vault, &context).unwrap();
    assert!(matches!(
        engine.deserialize::<Arc<VaultService>>(&bytes, &bare),
        Err(Error::MissingContext(_))
    ));
    // detaching the registry from a derived context restores the requirement
    assert!(matches!(
        engine.deserialize::<Arc<VaultService>>(&bytes, &context.without_token_context()),
        Err(Error::MissingContext(_))
    ));
}

#[test]
fn test_plain_payload_read_as_token() {
    let engine = LedgerWire::default();
    let vault = Arc::new(VaultService { label: "vault" });
    let context = context_with(vec![Tokenizable::new(&vault)]);
    let bytes = engine.serialize(&"not a token".to_string(), &context).unwrap();
    assert!(matches!(
        engine.deserialize::<Arc<VaultService>>(&bytes, &context),
        Err(Error::WireFormat(_))
    ));
}

#[test]
fn test_token_type_mismatch() {
    let engine = LedgerWire::default();
    let vault = Arc::new(VaultService { label: "vault" });
    let cache = Arc::new(NetworkMapCache { peers: vec![] });
    let context = context_with(vec![Tokenizable::new(&vault), Tokenizable::new(&cache)]);
    let bytes = engine.serialize(&vault, &context).unwrap();
    let err = engine
        .deserialize::<Arc<NetworkMapCache>>(&bytes, &context)
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert!(err.to_string().contains("token returning"));
}

#[test]
fn test_token_fields_in_composites() {
    #[derive(WireObject)]
    #[wire(name = "test.Checkpoint")]
    struct Checkpoint {
        step: i32,
        vault: Arc<VaultService>,
        spare: Option<Arc<VaultService>>,
    }

    let engine = LedgerWire::default();
    let vault = Arc::new(VaultService { label: "vault" });
    let context = context_with(vec![Tokenizable::new(&vault)]);
    let checkpoint = Checkpoint {
        step: 3,
        vault: vault.clone(),
        spare: Some(vault.clone()),
    };
    let bytes = engine.serialize(&checkpoint, &context).unwrap();
    let back: Checkpoint = engine.deserialize(&bytes, &context).unwrap();
    assert_eq!(back.step, 3);
    assert!(Arc::ptr_eq(&back.vault, &vault));
    assert!(Arc::ptr_eq(back.spare.as_ref().unwrap(), &vault));

    // read without the Rust type: the token still resolves to the instance
    let value: Value = engine.deserialize(&bytes, &context).unwrap();
    let obj = value.as_object().unwrap();
    let token = obj.get("vault").unwrap().downcast::<VaultService>().unwrap();
    assert!(Arc::ptr_eq(&token, &vault));
    // and forwarding it writes the same token again
    let forwarded = engine.serialize(&value, &context).unwrap();
    assert_eq!(forwarded, bytes);
}

#[test]
fn test_session_object() {
    let hub = Arc::new(ServiceHub {
        node_name: "O=Bank A".to_string(),
    });
    let vault = Arc::new(VaultService { label: "vault" });
    let base = SerializationContext::default();
    let registry =
        TokenRegistry::with_session(hub.clone(), &base, vec![Tokenizable::new(&vault)]).unwrap();
    let context = base.with_token_context(Arc::new(registry));
    let session = context
        .token_registry()
        .unwrap()
        .session::<ServiceHub>()
        .unwrap();
    assert!(Arc::ptr_eq(&session, &hub));
    assert_eq!(session.node_name, "O=Bank A");
    assert!(context.token_registry().unwrap().session::<String>().is_none());
    // the base context is untouched
    assert!(base.token_registry().is_none());
}

#[test]
fn test_allow_list_rejects_token_types() {
    let vault = Arc::new(VaultService { label: "vault" });
    let context = SerializationContext::default().with_allow_list(AllowList::only(["acme.*"]));
    assert!(matches!(
        TokenRegistry::new(&context, vec![Tokenizable::new(&vault)]),
        Err(Error::NotAllowed(_))
    ));
}
