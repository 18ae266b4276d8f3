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
    AllowList, CompositeSchema, Envelope, Error, FieldDescriptor, LedgerWire, PrimitiveKind,
    SerializationContext, TypeSynthesizer, Value, WireObject, WireType,
};
use ledgerwire_core::buffer::Writer;
use ledgerwire_core::serializer::CompositeSerializer;
use ledgerwire_core::synthesizer::TypeCache;
use std::sync::Arc;

mod sender {
    use ledgerwire::WireObject;

    #[derive(WireObject, Debug, PartialEq, Clone)]
    #[wire(name = "remote.Party")]
    pub struct Party {
        pub name: String,
    }

    #[derive(WireObject, Debug, PartialEq, Clone)]
    #[wire(name = "remote.Trade")]
    pub struct Trade {
        pub id: i64,
        pub price: f64,
        pub party: Party,
        pub backup: Option<Party>,
        pub note: Option<String>,
        pub legs: Vec<i32>,
        pub flags: Vec<Option<bool>>,
    }

    #[derive(WireObject, Debug, PartialEq)]
    #[wire(name = "q.Inner")]
    pub struct Inner {
        pub v: i64,
    }

    #[derive(WireObject, Debug, PartialEq)]
    #[wire(name = "q.Outer")]
    pub struct Outer {
        pub inner: Inner,
    }
}

mod receiver {
    use ledgerwire::WireObject;

    // same wire name as the sender's party, different shape
    #[derive(WireObject, Debug, PartialEq)]
    #[wire(name = "remote.Party")]
    pub struct Party {
        pub name: String,
        pub age: i32,
    }

    #[derive(WireObject, Debug, PartialEq)]
    #[wire(name = "q.Inner")]
    pub struct Inner {
        pub v: i32,
    }

    // matches the sender's outer exactly, but reaches a narrower inner
    #[derive(WireObject, Debug, PartialEq)]
    #[wire(name = "q.Outer")]
    pub struct Outer {
        pub inner: Inner,
    }
}

fn trade() -> sender::Trade {
    sender::Trade {
        id: 7,
        price: 99.5,
        party: sender::Party {
            name: "O=Bank A".to_string(),
        },
        backup: None,
        note: Some("settle T+2".to_string()),
        legs: vec![1, 2, 3],
        flags: vec![Some(true), None],
    }
}

fn isolated_engine() -> LedgerWire {
    LedgerWire::default().synthesizer(TypeSynthesizer::with_cache(Arc::new(TypeCache::new())))
}

fn craft(context: &SerializationContext, root: &[u8], envelope: &Envelope) -> Vec<u8> {
    let mut writer = Writer::default();
    writer.write_bytes(context.header().magic());
    writer.write_u8(2);
    writer.write_i32(root.len() as i32);
    writer.write_bytes(root);
    envelope.write_to(&mut writer);
    writer.dump()
}

#[test]
fn test_unknown_type_is_synthesized() {
    let _ = env_logger::builder().is_test(true).try_init();
    let context = SerializationContext::default();
    let bytes = LedgerWire::default().serialize(&trade(), &context).unwrap();

    let receiver = isolated_engine();
    let value: Value = receiver.deserialize(&bytes, &context).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.type_name(), "remote.Trade");
    let names: Vec<&str> = obj
        .synthesized_type()
        .fields()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["id", "price", "party", "backup", "note", "legs", "flags"]
    );
    assert_eq!(obj.get("id"), Some(&Value::Long(7)));
    assert_eq!(obj.get("price"), Some(&Value::Double(99.5)));
    assert_eq!(obj.get("backup"), Some(&Value::Null));
    assert_eq!(obj.get("note"), Some(&Value::from("settle T+2")));
    assert_eq!(obj.get("legs"), Some(&Value::from(vec![1i32, 2, 3])));
    assert_eq!(obj.get("flags"), Some(&Value::from(vec![Some(true), None])));
    assert_eq!(obj.get("missing"), None);

    let party = obj.get("party").unwrap().as_object().unwrap();
    assert_eq!(party.type_name(), "remote.Party");
    let accessor = party.synthesized_type().accessor("name").unwrap();
    assert_eq!(accessor.get(party).unwrap(), &Value::from("O=Bank A"));
    // an accessor only reads instances of its own type
    assert!(matches!(accessor.get(obj), Err(Error::TypeMismatch { .. })));
}

#[test]
fn test_envelope_inspection() {
    let context = SerializationContext::default();
    let bytes = LedgerWire::default().serialize(&trade(), &context).unwrap();
    let (back, envelope) = LedgerWire::default()
        .deserialize_with_envelope::<sender::Trade>(&bytes, &context)
        .unwrap();
    assert_eq!(back, trade());
    let names: Vec<&str> = envelope.schemas().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["remote.Trade", "remote.Party"]);
    assert_eq!(envelope.schema("remote.Trade"), Some(sender::Trade::schema()));
    assert_eq!(envelope.schema("remote.Party"), Some(sender::Party::schema()));
    assert_eq!(
        sender::Trade::schema().to_string(),
        "remote.Trade{id: long, price: double, party: remote.Party, backup: remote.Party?, \
         note: string?, legs: int[p], flags: boolean[]}"
    );
}

#[test]
fn test_forwarding_reproduces_bytes() {
    let context = SerializationContext::default();
    let sender_engine = LedgerWire::default();
    let bytes = sender_engine.serialize(&trade(), &context).unwrap();

    let relay = isolated_engine();
    let value: Value = relay.deserialize(&bytes, &context).unwrap();
    let forwarded = relay.serialize(&value, &context).unwrap();
    // the null `backup` still needs its schema, taken from the envelope read
    assert_eq!(forwarded, bytes);

    let back: sender::Trade = sender_engine.deserialize(&forwarded, &context).unwrap();
    assert_eq!(back, trade());
}

#[test]
fn test_construct_synthesized_instance() {
    let engine = isolated_engine();
    let types = engine
        .get_synthesizer()
        .synthesize(&[sender::Party::schema().clone()], false)
        .unwrap();
    let party_type = &types["remote.Party"];
    let party = party_type
        .new_instance(vec![Value::from("O=Bank B")])
        .unwrap();
    let context = SerializationContext::default();
    let bytes = engine.serialize(&party, &context).unwrap();
    let back: sender::Party = engine.deserialize(&bytes, &context).unwrap();
    assert_eq!(back.name, "O=Bank B");

    assert!(matches!(
        party_type.new_instance(vec![Value::Int(1)]),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_constructor_and_accessors() {
    let int = WireType::Primitive(PrimitiveKind::Int);
    let schema = CompositeSchema::new(
        "A",
        vec![
            FieldDescriptor::new("a", int.clone(), false),
            FieldDescriptor::new("b", int, false),
        ],
    )
    .unwrap();
    let synthesizer = TypeSynthesizer::with_cache(Arc::new(TypeCache::new()));
    let types = synthesizer.synthesize(&[schema.clone()], false).unwrap();
    let a = &types["A"];
    assert_eq!(a.arity(), 2);
    let obj = a.new_instance(vec![Value::Int(10), Value::Int(20)]).unwrap();
    assert_eq!(a.get(&obj, "a").unwrap(), &Value::Int(10));
    assert_eq!(a.get(&obj, "b").unwrap(), &Value::Int(20));

    let again = synthesizer.synthesize(&[schema.clone()], false).unwrap();
    assert!(Arc::ptr_eq(a, &again["A"]));
    let forced = synthesizer.synthesize(&[schema], true).unwrap();
    assert!(!Arc::ptr_eq(a, &forced["A"]));
}

#[test]
fn test_synthesis_is_cached_across_messages() {
    let context = SerializationContext::default();
    let bytes = LedgerWire::default().serialize(&trade(), &context).unwrap();
    let receiver = isolated_engine();
    let first: Value = receiver.deserialize(&bytes, &context).unwrap();
    let second: Value = receiver.deserialize(&bytes, &context).unwrap();
    assert!(Arc::ptr_eq(
        first.as_object().unwrap().synthesized_type(),
        second.as_object().unwrap().synthesized_type()
    ));
    assert_eq!(first, second);
    assert_eq!(receiver.get_synthesizer().cache().synthesized_count(), 2);
}

#[test]
fn test_registered_local_type_is_used() {
    let context = SerializationContext::default();
    let bytes = LedgerWire::default().serialize(&trade(), &context).unwrap();

    let mut receiver = isolated_engine();
    receiver.register::<sender::Party>().unwrap();
    let value: Value = receiver.deserialize(&bytes, &context).unwrap();
    let obj = value.as_object().unwrap();
    let party = obj.get("party").unwrap().downcast::<sender::Party>().unwrap();
    assert_eq!(party.name, "O=Bank A");
    // only the trade needed synthesis
    assert_eq!(receiver.get_synthesizer().cache().synthesized_count(), 1);

    let forwarded = receiver.serialize(&value, &context).unwrap();
    assert_eq!(forwarded, bytes);
}

#[test]
fn test_local_shape_mismatch() {
    let context = SerializationContext::default();
    let party = sender::Party {
        name: "O=Bank C".to_string(),
    };
    let bytes = LedgerWire::default().serialize(&party, &context).unwrap();

    let mut receiver = isolated_engine();
    receiver.register::<receiver::Party>().unwrap();
    assert!(matches!(
        receiver.deserialize::<receiver::Party>(&bytes, &context),
        Err(Error::TypeMismatch { .. })
    ));
    let value: Value = receiver.deserialize(&bytes, &context).unwrap();
    assert_eq!(
        value.as_object().unwrap().get("name"),
        Some(&Value::from("O=Bank C"))
    );
}

#[test]
fn test_local_type_with_mismatched_dependency() {
    let context = SerializationContext::default();
    let outer = sender::Outer {
        inner: sender::Inner { v: 1 << 40 },
    };
    let bytes = LedgerWire::default().serialize(&outer, &context).unwrap();

    let mut receiver = isolated_engine();
    receiver.register::<receiver::Outer>().unwrap();
    receiver.register::<receiver::Inner>().unwrap();
    assert_eq!(receiver::Outer::schema(), sender::Outer::schema());

    let value: Value = receiver.deserialize(&bytes, &context).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.type_name(), "q.Outer");
    let inner = obj.get("inner").unwrap().as_object().unwrap();
    assert_eq!(inner.get("v"), Some(&Value::Long(1 << 40)));
    assert_eq!(receiver.get_synthesizer().cache().synthesized_count(), 2);
    assert_eq!(receiver.serialize(&value, &context).unwrap(), bytes);

    assert!(matches!(
        receiver.deserialize::<receiver::Outer>(&bytes, &context),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_null_field_schema_follows_the_instance() {
    let int = WireType::Primitive(PrimitiveKind::Int);
    let outer = CompositeSchema::new(
        "p.Outer",
        vec![FieldDescriptor::new("inner", WireType::Composite("p.Inner".into()), true)],
    )
    .unwrap();
    let narrow = CompositeSchema::new("p.Inner", vec![FieldDescriptor::new("v", int, false)]).unwrap();
    let other = CompositeSchema::new(
        "p.Inner",
        vec![FieldDescriptor::new("w", WireType::String, false)],
    )
    .unwrap();

    let engine = isolated_engine();
    let context = SerializationContext::default();
    let types = engine
        .get_synthesizer()
        .synthesize(&[outer.clone(), narrow.clone()], false)
        .unwrap();
    let obj = types["p.Outer"].new_instance(vec![Value::Null]).unwrap();
    let first = engine.serialize(&obj, &context).unwrap();

    // another schema under the same name, synthesized in the same cache
    engine
        .get_synthesizer()
        .synthesize(&[outer, other], false)
        .unwrap();
    let second = engine.serialize(&obj, &context).unwrap();
    assert_eq!(first, second);

    let (back, envelope) = engine
        .deserialize_with_envelope::<Value>(&first, &context)
        .unwrap();
    assert_eq!(envelope.schema("p.Inner"), Some(&narrow));
    assert_eq!(back.as_object().unwrap().get("inner"), Some(&Value::Null));
}

#[test]
fn test_cyclic_schemas_on_the_wire() {
    let a = CompositeSchema::new(
        "cyc.A",
        vec![FieldDescriptor::new("b", WireType::Composite("cyc.B".into()), true)],
    )
    .unwrap();
    let b = CompositeSchema::new(
        "cyc.B",
        vec![FieldDescriptor::new("a", WireType::Composite("cyc.A".into()), true)],
    )
    .unwrap();
    let context = SerializationContext::default();
    let root = [13u8, 0, (-3i8) as u8];
    let bytes = craft(&context, &root, &Envelope::new(vec![a, b]).unwrap());
    assert!(matches!(
        isolated_engine().deserialize::<Value>(&bytes, &context),
        Err(Error::CyclicSchema(_))
    ));
}

#[test]
fn test_missing_dependency_on_the_wire() {
    let a = CompositeSchema::new(
        "dep.A",
        vec![FieldDescriptor::new("b", WireType::Composite("dep.B".into()), true)],
    )
    .unwrap();
    let context = SerializationContext::default();
    let root = [13u8, 0, (-3i8) as u8];
    let bytes = craft(&context, &root, &Envelope::new(vec![a]).unwrap());
    assert!(matches!(
        isolated_engine().deserialize::<Value>(&bytes, &context),
        Err(Error::WireFormat(_))
    ));
}

#[test]
fn test_allow_list_on_read() {
    let context = SerializationContext::default();
    let bytes = LedgerWire::default().serialize(&trade(), &context).unwrap();
    let receiver = isolated_engine();

    let strict = context.with_allow_list(AllowList::only(["local.*"]));
    assert!(matches!(
        receiver.deserialize::<Value>(&bytes, &strict),
        Err(Error::NotAllowed(_))
    ));
    let open = context.with_allow_list(AllowList::only(["remote.*"]));
    assert!(receiver.deserialize::<Value>(&bytes, &open).is_ok());
    let exact = context.with_allow_list(AllowList::only(["remote.Trade"]));
    assert!(matches!(
        receiver.deserialize::<Value>(&bytes, &exact),
        Err(Error::NotAllowed(_))
    ));
}

#[test]
fn test_default_wire_name() {
    #[derive(WireObject)]
    struct Plain {
        v: i32,
    }
    let name = Plain::type_name();
    assert!(name.ends_with("::Plain"), "{}", name);
    let bytes = LedgerWire::default()
        .serialize(&Plain { v: 1 }, &SerializationContext::default())
        .unwrap();
    let back: Plain = LedgerWire::default()
        .deserialize(&bytes, &SerializationContext::default())
        .unwrap();
    assert_eq!(back.v, 1);
}
