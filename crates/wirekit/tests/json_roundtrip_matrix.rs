mod common;

use common::{Permissions, Status, TestEntity};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use time::macros::{date, datetime, time};
use time::Duration;
use uuid::Uuid;
use wirekit::{
    register_defaults_in, ContentSerializer, ParseNodeFactoryRegistry, SerializationError,
    SerializationWriterFactoryRegistry, UntypedNode,
};

const JSON: &str = "application/json";

fn registries() -> (SerializationWriterFactoryRegistry, ParseNodeFactoryRegistry) {
    let writers = SerializationWriterFactoryRegistry::new();
    let parsers = ParseNodeFactoryRegistry::new();
    register_defaults_in(&writers, &parsers).unwrap();
    (writers, parsers)
}

fn full_entity() -> TestEntity {
    TestEntity {
        id: Some("48d31887-5fad-4d73-a9f5-3c356e68a038".into()),
        display_name: Some("Megan Bowen".into()),
        age: Some(34),
        rank: Some(9_007_199_254_740_993),
        level: Some(200),
        offset: Some(-5),
        ratio: Some(0.25),
        score: Some(97.5),
        price: Some(Decimal::new(12_345, 2)),
        active: Some(true),
        created: Some(datetime!(2024-03-01 08:30:00 UTC)),
        birthday: Some(date!(1990 - 07 - 14)),
        start_time: Some(time!(09:15:30)),
        tenure: Some(Duration::days(400) + Duration::hours(3)),
        guid: Some(Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef)),
        photo: Some(vec![0, 1, 2, 254, 255]),
        status: Some(Status::PendingReview),
        permissions: Some(Permissions::READ.union(Permissions::SHARE)),
        tags: Some(vec!["sales".into(), "emea".into()]),
        lucky_numbers: Some(vec![7]),
        past_statuses: Some(vec![Status::Active, Status::Suspended]),
        manager: Some(Box::new(TestEntity {
            id: Some("boss".into()),
            ..TestEntity::default()
        })),
        colleagues: Some(vec![
            TestEntity {
                id: Some("c1".into()),
                ..TestEntity::default()
            },
            TestEntity {
                id: Some("c2".into()),
                age: Some(41),
                ..TestEntity::default()
            },
        ]),
        additional_data: Default::default(),
    }
}

#[test]
fn json_full_entity_round_trip_matrix() {
    let (writers, parsers) = registries();
    let serializer = ContentSerializer::new(&writers, &parsers);
    let entity = full_entity();

    let bytes = serializer.serialize_as_bytes(JSON, &entity).unwrap();
    let back = serializer
        .deserialize(JSON, &bytes, TestEntity::create)
        .unwrap()
        .unwrap();
    assert_eq!(back, entity);
}

#[test]
fn json_decimal_precision_matrix() {
    let (writers, parsers) = registries();
    let serializer = ContentSerializer::new(&writers, &parsers);
    let cases = [
        "1234567890.1234567891",
        "0.0000000000000000000000000001",
        "-79228162514264337593543950335",
        "1.50",
        "0",
    ];
    for raw in cases {
        let entity = TestEntity {
            price: Some(Decimal::from_str_exact(raw).unwrap()),
            ..TestEntity::default()
        };
        let bytes = serializer.serialize_as_bytes(JSON, &entity).unwrap();
        let back = serializer
            .deserialize(JSON, &bytes, TestEntity::create)
            .unwrap()
            .unwrap();
        assert_eq!(back.price, entity.price, "decimal {raw}");
    }
}

#[test]
fn json_wire_shape_matrix() {
    let (writers, parsers) = registries();
    let serializer = ContentSerializer::new(&writers, &parsers);
    let text = serializer.serialize_as_string(JSON, &full_entity()).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();

    let cases: &[(&str, Value)] = &[
        ("displayName", json!("Megan Bowen")),
        ("rank", json!(9_007_199_254_740_993_i64)),
        ("price", json!(123.45)),
        ("created", json!("2024-03-01T08:30:00Z")),
        ("birthday", json!("1990-07-14")),
        ("startTime", json!("09:15:30")),
        ("tenure", json!("P400DT3H")),
        ("guid", json!("01234567-89ab-cdef-0123-456789abcdef")),
        ("photo", json!("AAEC/v8=")),
        ("status", json!("pending-review")),
        ("permissions", json!("read,share-link")),
        ("luckyNumbers", json!([7])),
        ("pastStatuses", json!(["Active", "Suspended"])),
        ("manager", json!({ "id": "boss" })),
    ];
    for (key, expected) in cases {
        assert_eq!(&value[*key], expected, "field {key}");
    }
    assert!(value.get("additionalData").is_none());
}

#[test]
fn json_absent_fields_are_not_written() {
    let (writers, parsers) = registries();
    let serializer = ContentSerializer::new(&writers, &parsers);
    let entity = TestEntity {
        id: Some("only".into()),
        ..TestEntity::default()
    };
    assert_eq!(
        serializer.serialize_as_string(JSON, &entity).unwrap(),
        r#"{"id":"only"}"#
    );
}

#[test]
fn json_additional_data_matrix() {
    let (writers, parsers) = registries();
    let serializer = ContentSerializer::new(&writers, &parsers);
    let payload = r#"{
        "id": "1",
        "nickname": "meg",
        "extra": { "floor": 3, "wings": ["east", null], "ratio": 0.5, "vip": false },
        "nothing": null
    }"#;
    let entity = serializer
        .deserialize_from_str(JSON, payload, TestEntity::create)
        .unwrap()
        .unwrap();

    assert_eq!(entity.id.as_deref(), Some("1"));
    assert_eq!(
        entity.additional_data.get("nickname"),
        Some(&UntypedNode::String("meg".into()))
    );
    assert_eq!(entity.additional_data.get("nothing"), Some(&UntypedNode::Null));
    let extra = entity.additional_data["extra"].as_object().unwrap();
    assert_eq!(extra["floor"], UntypedNode::Integer(3));
    assert_eq!(extra["ratio"], UntypedNode::Double(0.5));
    assert_eq!(
        extra["wings"],
        UntypedNode::Array(vec![UntypedNode::String("east".into()), UntypedNode::Null])
    );

    let written: Value =
        serde_json::from_str(&serializer.serialize_as_string(JSON, &entity).unwrap()).unwrap();
    assert_eq!(
        written,
        json!({
            "id": "1",
            "nickname": "meg",
            "extra": { "floor": 3, "wings": ["east", null], "ratio": 0.5, "vip": false },
            "nothing": null
        })
    );
}

#[test]
fn json_collection_matrix() {
    let (writers, parsers) = registries();
    let serializer = ContentSerializer::new(&writers, &parsers);

    let single = vec![TestEntity {
        id: Some("solo".into()),
        ..TestEntity::default()
    }];
    let text = serializer.serialize_collection_as_string(JSON, &single).unwrap();
    assert_eq!(text, r#"[{"id":"solo"}]"#);
    let back = serializer
        .deserialize_collection_from_str(JSON, &text, TestEntity::create)
        .unwrap();
    assert_eq!(back, single);

    let with_nulls = serializer
        .deserialize_collection_from_str(JSON, r#"[{"id":"a"},null,{"id":"b"}]"#, TestEntity::create)
        .unwrap();
    let ids: Vec<_> = with_nulls.iter().map(|e| e.id.as_deref()).collect();
    assert_eq!(ids, [Some("a"), Some("b")]);

    assert!(serializer
        .deserialize_collection_from_str(JSON, "null", TestEntity::create)
        .unwrap()
        .is_empty());
    assert_eq!(
        serializer.serialize_collection_as_string(JSON, &[] as &[TestEntity]).unwrap(),
        "[]"
    );
}

#[test]
fn json_lenient_scalar_matrix() {
    let (writers, parsers) = registries();
    let serializer = ContentSerializer::new(&writers, &parsers);
    let entity = serializer
        .deserialize_from_str(
            JSON,
            r#"{"age":"42","score":"1e2","status":"SUSPENDED","permissions":"write, admin, bogus","price":1.50}"#,
            TestEntity::create,
        )
        .unwrap()
        .unwrap();
    assert_eq!(entity.age, Some(42));
    assert_eq!(entity.score, Some(100.0));
    assert_eq!(entity.status, Some(Status::Suspended));
    assert_eq!(
        entity.permissions,
        Some(Permissions::WRITE.union(Permissions::ADMIN))
    );
    assert_eq!(entity.price, Some(Decimal::new(150, 2)));
}

#[test]
fn json_parse_error_matrix() {
    let (writers, parsers) = registries();
    let serializer = ContentSerializer::new(&writers, &parsers);

    let cases: &[(&str, &str)] = &[
        (r#"{"age":"forty"}"#, "/age"),
        (r#"{"active":"yes"}"#, "/active"),
        (r#"{"birthday":"14/07/1990"}"#, "/birthday"),
        (r#"{"manager":{"guid":"nope"}}"#, "/manager/guid"),
        (r#"{"colleagues":[{"id":"a"},{"rank":true}]}"#, "/colleagues/1/rank"),
        (r#"{"tags":"not-a-list"}"#, "/tags"),
        ("{not json", "/"),
    ];
    for (payload, path) in cases {
        match serializer.deserialize_from_str(JSON, payload, TestEntity::create) {
            Err(SerializationError::Parse { path: got, .. }) => {
                assert_eq!(&got, path, "payload {payload}")
            }
            other => panic!("payload {payload}: expected a parse error, got {other:?}"),
        }
    }
}

#[test]
fn json_null_root_reads_as_none() {
    let (writers, parsers) = registries();
    let serializer = ContentSerializer::new(&writers, &parsers);
    assert_eq!(
        serializer
            .deserialize_from_str(JSON, "null", TestEntity::create)
            .unwrap(),
        None
    );
}
