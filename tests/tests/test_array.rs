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
    DenseArray, Error, LedgerWire, NullableArray, PrimitiveKind, SerializationContext, Value,
    WireObject, WireType,
};
use ledgerwire_core::serializer::{CompositeSerializer, Serializer};
use rand::Rng;
use std::fmt::Debug;

fn round_trip<T: Serializer + PartialEq + Debug>(value: T) -> Vec<u8> {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();
    let bytes = engine.serialize(&value, &context).unwrap();
    let back: T = engine.deserialize(&bytes, &context).unwrap();
    assert_eq!(back, value);
    bytes
}

#[test]
fn test_dense_arrays_all_kinds() {
    round_trip(vec![true, false, true]);
    round_trip(vec![0u8, 1, 255]);
    round_trip(vec![i8::MIN, 0, i8::MAX]);
    round_trip(vec![i16::MIN, -1, i16::MAX]);
    round_trip(vec![i32::MIN, 0, i32::MAX]);
    round_trip(vec![i64::MIN, 42, i64::MAX]);
    round_trip(vec![f32::MIN, 0.5, f32::MAX]);
    round_trip(vec![f64::MIN, -0.25, f64::MAX]);
    round_trip(vec!['a', 'é', '𝄞']);
    round_trip(Vec::<i32>::new());
}

#[test]
fn test_nullable_arrays_all_kinds() {
    round_trip(vec![Some(true), None, Some(false)]);
    round_trip(vec![Some(-1i8), None]);
    round_trip(vec![None, Some(7i16)]);
    round_trip(vec![Some(1i32), None, Some(3)]);
    round_trip(vec![Some(1i64), None]);
    round_trip(vec![Some(1.5f32), None]);
    round_trip(vec![None, Some(2.5f64)]);
    round_trip(vec![Some('x'), None]);
    round_trip(vec![Some("ledger".to_string()), None, Some(String::new())]);
    round_trip(Vec::<Option<i64>>::new());
    round_trip(vec![None::<i32>; 4]);
}

#[test]
fn test_array_kinds_are_distinct_types() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();

    let dense = engine.serialize(&vec![1i32, 2, 3], &context).unwrap();
    let err = engine
        .deserialize::<Vec<Option<i32>>>(&dense, &context)
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert!(err.to_string().contains("int[p]"));

    let nullable = engine
        .serialize(&vec![Some(1i32), Some(2), Some(3)], &context)
        .unwrap();
    let err = engine.deserialize::<Vec<i32>>(&nullable, &context).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert!(err.to_string().contains("int[]"));

    // element kinds never convert either
    assert!(matches!(
        engine.deserialize::<Vec<i64>>(&dense, &context),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_array_signatures() {
    for kind in PrimitiveKind::ALL {
        let dense = WireType::DenseArray(kind);
        let nullable = WireType::NullableArray(kind);
        assert_ne!(dense.signature(), nullable.signature());
        assert_eq!(WireType::parse(&dense.signature()).unwrap(), dense);
        assert_eq!(WireType::parse(&nullable.signature()).unwrap(), nullable);
    }
    assert_eq!(WireType::DenseArray(PrimitiveKind::Int).signature(), "int[p]");
    assert_eq!(WireType::NullableArray(PrimitiveKind::Int).signature(), "int[]");
    assert_eq!(WireType::DenseArray(PrimitiveKind::Byte).signature(), "binary");
    assert_eq!(WireType::StringArray.signature(), "string[]");
}

#[test]
fn test_array_fields_in_schema() {
    #[derive(WireObject, Debug, PartialEq)]
    #[wire(name = "test.Readings")]
    struct Readings {
        dense: Vec<f64>,
        sparse: Vec<Option<f64>>,
        raw: Vec<u8>,
        labels: Vec<Option<String>>,
        maybe: Option<Vec<i32>>,
    }

    let signatures: Vec<(String, bool)> = Readings::schema()
        .fields()
        .iter()
        .map(|f| (f.signature(), f.nullable))
        .collect();
    assert_eq!(
        signatures,
        vec![
            ("double[p]".to_string(), false),
            ("double[]".to_string(), false),
            ("binary".to_string(), false),
            ("string[]".to_string(), false),
            ("int[p]".to_string(), true),
        ]
    );

    round_trip(Readings {
        dense: vec![1.0, 2.0],
        sparse: vec![None, Some(3.0)],
        raw: vec![0xde, 0xad],
        labels: vec![Some("a".into()), None],
        maybe: None,
    });
}

#[test]
fn test_dynamic_reads_keep_array_kind() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();

    let bytes = engine.serialize(&vec![1i16, 2], &context).unwrap();
    let value: Value = engine.deserialize(&bytes, &context).unwrap();
    assert_eq!(value, Value::DenseArray(DenseArray::Short(vec![1, 2])));

    let bytes = engine.serialize(&vec![Some(1i16), None], &context).unwrap();
    let value: Value = engine.deserialize(&bytes, &context).unwrap();
    assert_eq!(
        value,
        Value::NullableArray(NullableArray::Short(vec![Some(1), None]))
    );
    // writing the dynamic value reproduces the static encoding
    assert_eq!(engine.serialize(&value, &context).unwrap(), bytes);
}

#[test]
fn test_dynamic_bytes_are_signed() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();

    let signed = vec![-1i8, 0, i8::MAX];
    let bytes = engine.serialize(&signed, &context).unwrap();
    let value: Value = engine.deserialize(&bytes, &context).unwrap();
    assert_eq!(value, Value::DenseArray(DenseArray::Byte(signed.clone())));
    assert_eq!(value, Value::from(signed));
    assert_eq!(engine.serialize(&value, &context).unwrap(), bytes);

    // unsigned binary shares the wire shape and reads back as the same bytes
    let raw = engine.serialize(&vec![0xffu8, 0, 0x7f], &context).unwrap();
    assert_eq!(raw, bytes);

    let bytes = engine.serialize(&vec![Some(-1i8), None], &context).unwrap();
    let value: Value = engine.deserialize(&bytes, &context).unwrap();
    assert_eq!(
        value,
        Value::NullableArray(NullableArray::Byte(vec![Some(-1), None]))
    );
}

#[test]
fn test_random_arrays() {
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let len = rng.gen_range(0..300);
        let longs: Vec<i64> = (0..len).map(|_| rng.gen()).collect();
        round_trip(longs);
        let doubles: Vec<Option<f64>> = (0..len)
            .map(|_| if rng.gen_bool(0.3) { None } else { Some(rng.gen()) })
            .collect();
        round_trip(doubles);
        let chars: Vec<char> = (0..len).map(|_| rng.gen::<char>()).collect();
        round_trip(chars);
    }
}

#[test]
fn test_oversized_array_length_rejected() {
    let engine = LedgerWire::default();
    let context = SerializationContext::default();
    let mut bytes = engine.serialize(&vec![1i64, 2], &context).unwrap();
    // the length varint sits right after the root tag and element kind
    let header_len = context.header().magic().len() + 1 + 4;
    assert_eq!(bytes[header_len + 2], 2);
    bytes[header_len + 2] = 100;
    assert!(matches!(
        engine.deserialize::<Vec<i64>>(&bytes, &context),
        Err(Error::WireFormat(_))
    ));
}
