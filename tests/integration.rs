//! Integration tests: schemas, records, round-trips, repeated-field ordering, truncation,
//! singular message policy, and delimited streams.

use std::sync::Arc;
use ttproto::frame::{decode_delimited, encode_delimited};
use ttproto::tag::pack;
use ttproto::transit::{data, route, stop, Data, Route, Stop, TransitSchemas};
use ttproto::varint::{write_length_delimited, write_varint};
use ttproto::{decode, encode, CodecError, FieldDescriptor, Record, Schema, SchemaError, WireType};

fn schemas() -> TransitSchemas {
    TransitSchemas::new().expect("schemas")
}

fn sample_data() -> Data {
    Data {
        routes: vec![
            Route {
                id: "R1".to_string(),
                days: 31,
                from: 1,
                to: 2,
                stops: vec![
                    Stop { station_id: 1, arrival: 800, departure: 805, platform: 3 },
                    Stop { station_id: 2, arrival: 820, departure: 0, platform: 1 },
                ],
            },
            Route {
                id: "P00412".to_string(),
                days: 96,
                from: 17,
                to: 4,
                stops: vec![
                    Stop { station_id: 17, arrival: 0, departure: 1_380, platform: 0 },
                    Stop { station_id: 300, arrival: 1_401, departure: 1_402, platform: 12 },
                    Stop { station_id: 4, arrival: 1_439, departure: 1_439, platform: 2 },
                ],
            },
            Route { id: String::new(), days: 0, from: 0, to: 0, stops: vec![] },
        ],
    }
}

// ==================== Schemas ====================

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn records_and_schemas_are_send_and_sync() {
    assert_send_sync::<Schema>();
    assert_send_sync::<Record>();
    assert_send_sync::<TransitSchemas>();
    assert_send_sync::<CodecError>();
}

#[test]
fn schema_rejects_bad_field_numbers() {
    let err = Schema::new("M", vec![FieldDescriptor::uint32(0, "a")]).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidFieldNumber { number: 0, .. }));

    let err = Schema::new("M", vec![FieldDescriptor::uint32(1 << 29, "a")]).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidFieldNumber { .. }));

    let err = Schema::new(
        "M",
        vec![FieldDescriptor::uint32(1, "a"), FieldDescriptor::string(1, "b")],
    )
    .unwrap_err();
    assert_eq!(err, SchemaError::DuplicateFieldNumber { schema: "M".to_string(), number: 1 });
}

#[test]
fn schema_rejects_duplicate_names_and_repeated_scalars() {
    let err = Schema::new(
        "M",
        vec![FieldDescriptor::uint32(1, "a"), FieldDescriptor::uint32(2, "a")],
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateFieldName { .. }));

    let mut f = FieldDescriptor::uint32(1, "a");
    f.repeated = true;
    let err = Schema::new("M", vec![f]).unwrap_err();
    assert_eq!(err, SchemaError::RepeatedScalar { schema: "M".to_string(), field: "a".to_string() });
}

#[test]
fn transit_schema_layout() {
    let s = schemas();
    assert_eq!(s.data.name(), "types.Data");
    assert_eq!(s.data.fields().len(), 1);
    let routes = s.data.field(data::ROUTES).expect("routes");
    assert!(routes.repeated);
    assert_eq!(routes.kind.child_schema().map(|c| c.name()), Some("types.Data.Route"));

    let names: Vec<&str> = s.route.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["id", "days", "from", "to", "stops"]);
    assert_eq!(s.stop.field_by_name("platform").map(|f| f.number), Some(stop::PLATFORM));
    assert!(s.stop.field(5).is_none());
}

// ==================== Records ====================

#[test]
fn record_starts_with_defaults() {
    let s = schemas();
    let r = Record::new(s.route.clone());
    assert_eq!(r.string(route::ID).unwrap(), "");
    assert_eq!(r.u32(route::DAYS).unwrap(), 0);
    assert!(r.messages(route::STOPS).unwrap().is_empty());
    assert!(r.is_default());
}

#[test]
fn record_field_access_is_type_checked() {
    let s = schemas();
    let mut r = Record::new(s.route.clone());
    assert!(matches!(
        r.set_u32(route::ID, 3),
        Err(SchemaError::KindMismatch { expected: "uint32", found: "string", .. })
    ));
    assert!(matches!(r.string(route::DAYS), Err(SchemaError::KindMismatch { .. })));
    assert!(matches!(r.set_u32(42, 1), Err(SchemaError::NoSuchField { number: 42, .. })));
    assert!(matches!(r.messages(route::TO), Err(SchemaError::KindMismatch { .. })));
}

#[test]
fn push_message_checks_child_schema() {
    let s = schemas();
    let mut r = Record::new(s.data.clone());
    let err = r.push_message(data::ROUTES, Record::new(s.stop.clone())).unwrap_err();
    assert!(matches!(err, SchemaError::ChildSchemaMismatch { .. }));
    r.push_message(data::ROUTES, Record::new(s.route.clone())).expect("route");
    assert_eq!(r.messages(data::ROUTES).unwrap().len(), 1);
}

#[test]
fn add_message_and_mutate_in_place() {
    let s = schemas();
    let mut d = Record::new(s.data.clone());
    {
        let route_rec = d.add_message(data::ROUTES).unwrap();
        route_rec.set_string(route::ID, "A1").unwrap();
        let st = route_rec.add_message(route::STOPS).unwrap();
        st.set_u32(stop::STATION_ID, 9).unwrap();
    }
    d.messages_mut(data::ROUTES).unwrap()[0]
        .set_u32(route::DAYS, 127)
        .unwrap();

    let back = decode(&encode(&d, &s.data).unwrap(), &s.data).unwrap();
    let rt = &back.messages(data::ROUTES).unwrap()[0];
    assert_eq!(rt.string(route::ID).unwrap(), "A1");
    assert_eq!(rt.u32(route::DAYS).unwrap(), 127);
    assert_eq!(rt.messages(route::STOPS).unwrap()[0].u32(stop::STATION_ID).unwrap(), 9);
}

#[test]
fn clear_resets_to_default() {
    let s = schemas();
    let mut r = sample_data().routes[0].to_record(&s).unwrap();
    r.clear(route::STOPS).unwrap();
    r.clear(route::ID).unwrap();
    assert!(r.messages(route::STOPS).unwrap().is_empty());
    assert_eq!(r.string(route::ID).unwrap(), "");
    assert_eq!(r.u32(route::DAYS).unwrap(), 31);
}

// ==================== Round-trip ====================

#[test]
fn round_trip_restricted_to_non_default_fields() {
    let s = schemas();
    let original = sample_data().to_record(&s).unwrap();
    let bytes = encode(&original, &s.data).unwrap();
    let back = decode(&bytes, &s.data).unwrap();
    // Default values vanish on the wire but decode back to the same defaults.
    assert_eq!(back, original);
    assert_eq!(Data::from_record(&back, &s).unwrap(), sample_data());
}

#[test]
fn re_encoding_is_byte_identical() {
    let s = schemas();
    let first = encode(&sample_data().to_record(&s).unwrap(), &s.data).unwrap();
    let second = encode(&decode(&first, &s.data).unwrap(), &s.data).unwrap();
    assert_eq!(first, second);
}

#[test]
fn records_bound_to_equal_schemas_compare_equal() {
    let a = schemas();
    let b = schemas();
    assert!(!Arc::ptr_eq(&a.data, &b.data));
    let ra = sample_data().to_record(&a).unwrap();
    let rb = sample_data().to_record(&b).unwrap();
    assert_eq!(ra, rb);
    // Structurally equal schemas are accepted by the encoder.
    assert_eq!(encode(&ra, &b.data).unwrap(), encode(&rb, &a.data).unwrap());
}

// ==================== Repeated-field ordering ====================

fn stop_entry(out: &mut Vec<u8>, station: u32) {
    let mut body = Vec::new();
    write_varint(&mut body, pack(stop::STATION_ID, WireType::Varint));
    write_varint(&mut body, station);
    write_varint(out, pack(route::STOPS, WireType::LengthDelimited));
    write_length_delimited(out, &body).unwrap();
}

#[test]
fn interleaved_stops_keep_tag_order() {
    let s = schemas();
    let mut buf = Vec::new();
    stop_entry(&mut buf, 30);
    write_varint(&mut buf, pack(route::ID, WireType::LengthDelimited));
    write_length_delimited(&mut buf, b"X9").unwrap();
    stop_entry(&mut buf, 10);
    write_varint(&mut buf, pack(route::DAYS, WireType::Varint));
    write_varint(&mut buf, 5);
    stop_entry(&mut buf, 20);

    let r = decode(&buf, &s.route).unwrap();
    let stations: Vec<u32> = r
        .messages(route::STOPS)
        .unwrap()
        .iter()
        .map(|st| st.u32(stop::STATION_ID).unwrap())
        .collect();
    assert_eq!(stations, [30, 10, 20]);
    assert_eq!(r.string(route::ID).unwrap(), "X9");
    assert_eq!(r.u32(route::DAYS).unwrap(), 5);

    // Re-encoded, stops are contiguous after the scalars but still in the same order.
    let again = decode(&encode(&r, &s.route).unwrap(), &s.route).unwrap();
    assert_eq!(again, r);
}

// ==================== Truncation ====================

#[test]
fn every_proper_prefix_fails() {
    let s = schemas();
    let single = Data { routes: vec![sample_data().routes[1].clone()] };
    let bytes = encode(&single.to_record(&s).unwrap(), &s.data).unwrap();
    assert!(bytes.len() > 10);
    for cut in 1..bytes.len() {
        match decode(&bytes[..cut], &s.data) {
            Err(CodecError::TruncatedMessage { .. }) | Err(CodecError::MalformedVarint { .. }) => {}
            other => panic!("prefix of {} bytes: expected truncation error, got {:?}", cut, other),
        }
    }
    assert!(decode(&bytes, &s.data).is_ok());
}

// ==================== Singular message fields ====================

fn nested_schemas() -> (Arc<Schema>, Arc<Schema>) {
    let inner = Arc::new(Schema::new("Inner", vec![FieldDescriptor::uint32(1, "v")]).unwrap());
    let outer = Arc::new(
        Schema::new(
            "Outer",
            vec![
                FieldDescriptor::message(1, "inner", &inner),
                FieldDescriptor::uint32(2, "n"),
            ],
        )
        .unwrap(),
    );
    (outer, inner)
}

#[test]
fn singular_message_last_occurrence_wins() {
    let (outer, _) = nested_schemas();
    let r = decode(&[0x0a, 0x02, 0x08, 0x01, 0x10, 0x07, 0x0a, 0x02, 0x08, 0x02], &outer).unwrap();
    let inner = r.messages(1).unwrap();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner[0].u32(1).unwrap(), 2);
    assert_eq!(r.u32(2).unwrap(), 7);
    assert_eq!(encode(&r, &outer).unwrap(), vec![0x0a, 0x02, 0x08, 0x02, 0x10, 0x07]);
}

#[test]
fn singular_message_push_replaces() {
    let (outer, inner) = nested_schemas();
    let mut r = Record::new(outer.clone());
    for v in [4, 8] {
        let mut child = Record::new(inner.clone());
        child.set_u32(1, v).unwrap();
        r.push_message(1, child).unwrap();
    }
    assert_eq!(r.messages(1).unwrap().len(), 1);
    assert_eq!(r.messages(1).unwrap()[0].u32(1).unwrap(), 8);
    r.add_message(1).unwrap();
    assert!(r.messages(1).unwrap()[0].is_default());
}

// ==================== Delimited streams ====================

#[test]
fn delimited_stream_round_trip() {
    let s = schemas();
    let records: Vec<Record> = sample_data()
        .routes
        .iter()
        .map(|rt| Data { routes: vec![rt.clone()] }.to_record(&s).unwrap())
        .collect();
    let bytes = encode_delimited(&records, &s.data).unwrap();
    let result = decode_delimited(&bytes, &s.data).unwrap();
    assert!(result.rejected.is_empty());
    let decoded: Vec<Record> = result.records.into_iter().map(|d| d.record).collect();
    assert_eq!(decoded, records);
}

#[test]
fn delimited_stream_skips_bad_frames() {
    let s = schemas();
    let good = Data { routes: vec![sample_data().routes[0].clone()] }.to_record(&s).unwrap();
    let good_bytes = encode(&good, &s.data).unwrap();

    let mut stream = Vec::new();
    write_length_delimited(&mut stream, &good_bytes).unwrap();
    let bad_start = stream.len() + 1;
    write_length_delimited(&mut stream, &[0x28, 0x01]).unwrap();
    write_length_delimited(&mut stream, &good_bytes).unwrap();

    let result = decode_delimited(&stream, &s.data).unwrap();
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.rejected.len(), 1);
    let rejected = &result.rejected[0];
    assert_eq!(rejected.byte_range, (bad_start, bad_start + 2));
    assert!(matches!(
        rejected.error,
        CodecError::UnknownField { number: 5, offset, .. } if offset == bad_start
    ));
    assert_eq!(result.records[1].record, good);
    assert_eq!(result.records[0].byte_range, (1, 1 + good_bytes.len()));
}

#[test]
fn delimited_stream_truncated_frame_is_an_error() {
    let s = schemas();
    let good = sample_data().to_record(&s).unwrap();
    let bytes = encode_delimited([&good], &s.data).unwrap();
    assert!(matches!(
        decode_delimited(&bytes[..bytes.len() - 1], &s.data),
        Err(CodecError::TruncatedMessage { offset: 0 })
    ));
    assert!(decode_delimited(&[], &s.data).unwrap().records.is_empty());
}
