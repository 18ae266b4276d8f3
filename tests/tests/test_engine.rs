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
    Error, Header, LedgerWire, SerializationContext, TypeSynthesizer, Value, WireObject,
};
use ledgerwire_core::serializer::Serializer;
use ledgerwire_core::synthesizer::TypeCache;
use std::fmt::Debug;
use std::sync::Arc;
use std::thread;

#[derive(WireObject, Debug, PartialEq, Clone)]
#[wire(name = "engine.Level3")]
struct Level3 {
    v: i32,
}

#[derive(WireObject, Debug, PartialEq, Clone)]
#[wire(name = "engine.Level2")]
struct Level2 {
    inner: Level3,
    label: String,
}

#[derive(WireObject, Debug, PartialEq, Clone)]
#[wire(name = "engine.Level1")]
struct Level1 {
    inner: Level2,
    spare: Option<Level3>,
}

fn sample() -> Level1 {
    Level1 {
        inner: Level2 {
            inner: Level3 { v: 42 },
            label: "deep".to_string(),
        },
        spare: Some(Level3 { v: -1 }),
    }
}

fn header_len(context: &SerializationContext) -> usize {
    context.header().magic().len()
}

fn round_trip<T: Serializer + PartialEq + Debug>(value: T) {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();
    let bytes = engine.serialize(&value, &context).unwrap();
    assert_eq!(engine.deserialize::<T>(&bytes, &context).unwrap(), value);
}

#[test]
fn test_primitives_and_strings() {
    round_trip(true);
    round_trip(-5i8);
    round_trip(i16::MIN);
    round_trip(i32::MAX);
    round_trip(i64::MIN);
    round_trip(1.25f32);
    round_trip(-2.5f64);
    round_trip('€');
    round_trip(String::new());
    round_trip("héllo wörld".to_string());
}

#[test]
fn test_nested_composites() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();
    let bytes = engine.serialize(&sample(), &context).unwrap();
    let back: Level1 = engine.deserialize(&bytes, &context).unwrap();
    assert_eq!(back, sample());
}

#[test]
fn test_deterministic_output() {
    let context = SerializationContext::default();
    let first = LedgerWire::default().serialize(&sample(), &context).unwrap();
    let second = LedgerWire::default().serialize(&sample(), &context).unwrap();
    assert_eq!(first, second);
    let mut engine = LedgerWire::default();
    engine.register::<Level1>().unwrap();
    assert_eq!(engine.serialize(&sample(), &context).unwrap(), first);
}

#[test]
fn test_null_root() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();
    let bytes = engine.serialize(&None::<i32>, &context).unwrap();
    assert_eq!(bytes.len(), header_len(&context) + 1);
    assert_eq!(engine.deserialize::<Option<i32>>(&bytes, &context).unwrap(), None);
    assert_eq!(engine.deserialize::<Value>(&bytes, &context).unwrap(), Value::Null);
    assert!(matches!(
        engine.deserialize::<i32>(&bytes, &context),
        Err(Error::WireFormat(_))
    ));

    let bytes = engine.serialize(&Some(5i32), &context).unwrap();
    assert_eq!(engine.deserialize::<Option<i32>>(&bytes, &context).unwrap(), Some(5));
}

#[test]
fn test_header_mismatch() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();
    let bytes = engine.serialize(&1i32, &context).unwrap();

    let other = context.with_header(Header::new(b"other\x01\x00".to_vec()));
    assert!(matches!(
        engine.deserialize::<i32>(&bytes, &other),
        Err(Error::WireFormat(_))
    ));
    // a custom header round trips under its own context
    let bytes = engine.serialize(&1i32, &other).unwrap();
    assert!(bytes.starts_with(b"other"));
    assert_eq!(engine.deserialize::<i32>(&bytes, &other).unwrap(), 1);

    assert!(matches!(
        engine.deserialize::<i32>(&bytes[..2], &other),
        Err(Error::WireFormat(_))
    ));
}

#[test]
fn test_bad_flags() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();
    let bytes = engine.serialize(&1i32, &context).unwrap();
    let flags = header_len(&context);

    let mut unknown = bytes.clone();
    unknown[flags] |= 0x80;
    assert!(matches!(
        engine.deserialize::<i32>(&unknown, &context),
        Err(Error::WireFormat(_))
    ));

    let mut big_endian = bytes.clone();
    big_endian[flags] = 0;
    assert!(matches!(
        engine.deserialize::<i32>(&big_endian, &context),
        Err(Error::WireFormat(_))
    ));
}

#[test]
fn test_truncated_input() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();
    let bytes = engine.serialize(&sample(), &context).unwrap();
    for len in 0..bytes.len() {
        assert!(
            engine.deserialize::<Level1>(&bytes[..len], &context).is_err(),
            "prefix of {} bytes was accepted",
            len
        );
        assert!(engine.deserialize::<Value>(&bytes[..len], &context).is_err());
    }
}

#[test]
fn test_trailing_bytes_and_bad_offset() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();
    let bytes = engine.serialize(&sample(), &context).unwrap();

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert!(matches!(
        engine.deserialize::<Level1>(&trailing, &context),
        Err(Error::WireFormat(_))
    ));

    let offset = header_len(&context) + 1;
    let mut bad_offset = bytes.clone();
    bad_offset[offset..offset + 4].copy_from_slice(&i32::MAX.to_le_bytes());
    assert!(matches!(
        engine.deserialize::<Level1>(&bad_offset, &context),
        Err(Error::WireFormat(_))
    ));
    bad_offset[offset..offset + 4].copy_from_slice(&(-2i32).to_le_bytes());
    assert!(matches!(
        engine.deserialize::<Level1>(&bad_offset, &context),
        Err(Error::WireFormat(_))
    ));
}

#[test]
fn test_depth_limit() {
    let context = SerializationContext::default();
    let shallow = LedgerWire::default().max_depth(2);
    assert!(matches!(
        shallow.serialize(&sample(), &context),
        Err(Error::WireFormat(_))
    ));

    let bytes = LedgerWire::default().serialize(&sample(), &context).unwrap();
    assert!(matches!(
        shallow.deserialize::<Level1>(&bytes, &context),
        Err(Error::WireFormat(_))
    ));
    assert!(matches!(
        shallow.deserialize::<Value>(&bytes, &context),
        Err(Error::WireFormat(_))
    ));
    assert!(LedgerWire::default()
        .max_depth(3)
        .deserialize::<Level1>(&bytes, &context)
        .is_ok());
}

#[test]
fn test_schema_count_limit() {
    let context = SerializationContext::default();
    let bytes = LedgerWire::default().serialize(&sample(), &context).unwrap();
    assert!(matches!(
        LedgerWire::default()
            .max_schemas(2)
            .deserialize::<Level1>(&bytes, &context),
        Err(Error::WireFormat(_))
    ));
    assert!(LedgerWire::default()
        .max_schemas(3)
        .deserialize::<Level1>(&bytes, &context)
        .is_ok());
}

#[test]
fn test_register_conflicts() {
    mod first {
        #[derive(ledgerwire::WireObject)]
        #[wire(name = "engine.Thing")]
        pub struct Thing {
            pub a: i32,
        }
    }
    mod second {
        #[derive(ledgerwire::WireObject)]
        #[wire(name = "engine.Thing")]
        pub struct Thing {
            pub a: i32,
        }
    }
    let mut engine = LedgerWire::default();
    engine.register::<first::Thing>().unwrap();
    engine.register::<first::Thing>().unwrap();
    assert!(matches!(
        engine.register::<second::Thing>(),
        Err(Error::NotAllowed(_))
    ));
    assert_eq!(engine.get_type_resolver().len(), 1);
}

#[test]
fn test_concurrent_synthesis() {
    let _ = env_logger::builder().is_test(true).try_init();
    let context = SerializationContext::default();
    let bytes = Arc::new(LedgerWire::default().serialize(&sample(), &context).unwrap());
    let engine = Arc::new(
        LedgerWire::default().synthesizer(TypeSynthesizer::with_cache(Arc::new(TypeCache::new()))),
    );
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let bytes = Arc::clone(&bytes);
            let context = context.clone();
            thread::spawn(move || {
                let value: Value = engine.deserialize(&bytes, &context).unwrap();
                value.as_object().unwrap().synthesized_type().clone()
            })
        })
        .collect();
    let types: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for ty in &types[1..] {
        assert!(Arc::ptr_eq(ty, &types[0]));
    }
    assert_eq!(engine.get_synthesizer().cache().synthesized_count(), 3);
}

#[test]
fn test_concurrent_serialize() {
    let engine = Arc::new(LedgerWire::default());
    let context = SerializationContext::default();
    let expected = engine.serialize(&sample(), &context).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let context = context.clone();
            thread::spawn(move || engine.serialize(&sample(), &context).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
