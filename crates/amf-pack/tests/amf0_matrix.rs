use amf_pack::constants::amf0;
use amf_pack::{Amf, AmfError, AmfValue, AmfVersion};

fn obj(fields: &[(&str, AmfValue)]) -> AmfValue {
    AmfValue::object(
        fields
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect(),
    )
}

#[test]
fn amf0_null_and_undefined() {
    let mut amf = Amf::new(0).unwrap();
    amf.write_value(&AmfValue::Null).unwrap();
    amf.write_value(&AmfValue::Undefined).unwrap();
    assert_eq!(amf.read_value().unwrap(), AmfValue::Null);
    assert_eq!(amf.read_value().unwrap(), AmfValue::Undefined);
}

#[test]
fn amf0_number_matrix() {
    let mut amf = Amf::new(0).unwrap();
    amf.write_value(&AmfValue::Float(5.11)).unwrap();
    amf.write_value(&AmfValue::Integer(5)).unwrap();
    amf.write_value(&AmfValue::Float(100.12)).unwrap();
    amf.write_value(&AmfValue::Float(std::f64::consts::PI))
        .unwrap();
    assert_eq!(amf.read_value().unwrap(), AmfValue::Float(5.11));
    // Every AMF0 number travels as a double; the integer comes back as one.
    assert_eq!(amf.read_value().unwrap(), AmfValue::Integer(5));
    assert_eq!(amf.read_value().unwrap(), AmfValue::Float(100.12));
    assert_eq!(
        amf.read_value().unwrap(),
        AmfValue::Float(std::f64::consts::PI)
    );
}

#[test]
fn amf0_booleans() {
    let mut amf = Amf::new(0).unwrap();
    amf.write_value(&AmfValue::Bool(true)).unwrap();
    amf.write_value(&AmfValue::Bool(false)).unwrap();
    assert_eq!(amf.read_value().unwrap(), AmfValue::Bool(true));
    assert_eq!(amf.read_value().unwrap(), AmfValue::Bool(false));
}

#[test]
fn amf0_strings() {
    let mut amf = Amf::new(0).unwrap();
    amf.write_value(&"Hello".into()).unwrap();
    amf.write_value(&"World".into()).unwrap();
    assert_eq!(amf.read_value().unwrap(), AmfValue::Str("Hello".into()));
    assert_eq!(amf.read_value().unwrap(), AmfValue::Str("World".into()));
}

#[test]
fn amf0_long_string() {
    let mut amf = Amf::new(0).unwrap();
    let long = "a".repeat(70_000);
    amf.write_value(&AmfValue::Str(long.clone())).unwrap();
    assert_eq!(amf.stream.data[0], amf0::LONG_STRING);
    assert_eq!(amf.read_value().unwrap(), AmfValue::Str(long));
}

#[test]
fn amf0_string_at_u16_limit_stays_short() {
    let mut amf = Amf::new(0).unwrap();
    let s = "a".repeat(65_535);
    amf.write_value(&AmfValue::Str(s.clone())).unwrap();
    assert_eq!(amf.stream.data[0], amf0::STRING);
    assert_eq!(amf.read_value().unwrap(), AmfValue::Str(s));
}

#[test]
fn amf0_object_with_nested_array_decodes_numeric_keys() {
    let mut amf = Amf::new(0).unwrap();
    let value = obj(&[
        ("id", AmfValue::Integer(1)),
        (
            "a",
            AmfValue::array(vec![AmfValue::Integer(1), AmfValue::Integer(2), "a".into()]),
        ),
        ("b", obj(&[("c", AmfValue::Integer(1))])),
    ]);
    amf.write_value(&value).unwrap();
    // AMF0 loses list identity: the nested array comes back as a keyed
    // record with numeric-string keys.
    let expected = obj(&[
        ("id", AmfValue::Integer(1)),
        (
            "a",
            obj(&[
                ("0", AmfValue::Integer(1)),
                ("1", AmfValue::Integer(2)),
                ("2", "a".into()),
            ]),
        ),
        ("b", obj(&[("c", AmfValue::Integer(1))])),
    ]);
    assert_eq!(amf.read_value().unwrap(), expected);
}

#[test]
fn amf0_ecma_array_matrix() {
    let mut amf = Amf::new(0).unwrap();
    amf.write_value(&AmfValue::array(vec![
        AmfValue::Integer(1),
        AmfValue::Integer(2),
        AmfValue::Integer(3),
    ]))
    .unwrap();
    amf.write_value(&AmfValue::array(vec![
        AmfValue::Null,
        AmfValue::Bool(true),
        AmfValue::Bool(false),
        AmfValue::Undefined,
    ]))
    .unwrap();
    assert_eq!(
        amf.read_value().unwrap(),
        obj(&[
            ("0", AmfValue::Integer(1)),
            ("1", AmfValue::Integer(2)),
            ("2", AmfValue::Integer(3)),
        ])
    );
    assert_eq!(
        amf.read_value().unwrap(),
        obj(&[
            ("0", AmfValue::Null),
            ("1", AmfValue::Bool(true)),
            ("2", AmfValue::Bool(false)),
            ("3", AmfValue::Undefined),
        ])
    );
}

#[test]
fn amf0_ecma_array_with_keyed_part() {
    let mut amf = Amf::new(0).unwrap();
    let value = AmfValue::keyed_array(
        vec![AmfValue::Integer(1)],
        vec![("x".to_owned(), AmfValue::Bool(true))],
    );
    amf.write_value(&value).unwrap();
    assert_eq!(
        amf.read_value().unwrap(),
        obj(&[("0", AmfValue::Integer(1)), ("x", AmfValue::Bool(true))])
    );
}

#[test]
fn amf0_strict_array_preserves_list() {
    let mut amf = Amf::new(0).unwrap();
    let value = AmfValue::array(vec![
        AmfValue::Integer(1),
        AmfValue::Integer(2),
        AmfValue::Integer(3),
    ]);
    amf.write_strict_array(&value).unwrap();
    assert_eq!(amf.stream.data[0], amf0::STRICT_ARRAY);
    assert_eq!(amf.read_value().unwrap(), value);
}

#[test]
fn amf0_typed_object() {
    let mut amf = Amf::new(0).unwrap();
    let person = AmfValue::typed_object(
        "Person",
        vec![
            ("first".to_owned(), "Zaseth".into()),
            ("last".to_owned(), "Secret".into()),
            ("age".to_owned(), AmfValue::Integer(16)),
        ],
    );
    amf.write_value(&person).unwrap();
    let decoded = amf.read_value().unwrap();
    assert_eq!(
        decoded,
        AmfValue::typed_object(
            "Person",
            vec![
                ("first".to_owned(), "Zaseth".into()),
                ("last".to_owned(), "Secret".into()),
                ("age".to_owned(), AmfValue::Integer(16)),
            ],
        )
    );
}

#[test]
fn amf0_reference_scenario() {
    let mut amf = Amf::new(0).unwrap();
    let value = obj(&[("id", AmfValue::Integer(1))]);

    amf.write_value(&value).unwrap();
    assert_eq!(amf.references.len(), 1);
    assert_eq!(amf.stream.write_pos, 17);

    // The second write of the same instance is a bare reference:
    // marker + u16 index.
    amf.write_value(&value).unwrap();
    assert_eq!(amf.references.len(), 1);
    assert_eq!(amf.stream.write_pos, 20);

    let expected = obj(&[("id", AmfValue::Integer(1))]);
    assert_eq!(amf.read_value().unwrap(), expected);
    assert_eq!(amf.stream.read_pos, 17);
    assert_eq!(amf.read_value().unwrap(), expected);
    assert_eq!(amf.stream.read_pos, 20);
}

#[test]
fn amf0_structural_twins_never_share_a_reference() {
    let mut amf = Amf::new(0).unwrap();
    let a = obj(&[("id", AmfValue::Integer(1))]);
    let b = obj(&[("id", AmfValue::Integer(1))]);
    amf.write_value(&a).unwrap();
    amf.write_value(&b).unwrap();
    assert_eq!(amf.references.len(), 2);
    assert_eq!(amf.stream.write_pos, 34);
    assert_eq!(amf.read_value().unwrap(), a);
    assert_eq!(amf.read_value().unwrap(), b);
}

#[test]
fn amf0_date_roundtrip() {
    let mut amf = Amf::new(0).unwrap();
    amf.write_value(&AmfValue::date(1_005_606_000_000.0)).unwrap();
    // marker + double + timezone short
    assert_eq!(amf.stream.write_pos, 11);
    assert_eq!(amf.read_value().unwrap(), AmfValue::date(1_005_606_000_000.0));
}

#[test]
fn amf0_rejects_byte_arrays() {
    let mut amf = Amf::new(0).unwrap();
    assert!(matches!(
        amf.write_value(&AmfValue::bytes(vec![1, 2, 3])),
        Err(AmfError::UnsupportedType(_))
    ));
}

#[test]
fn amf0_unknown_marker() {
    let mut amf = Amf::new(0).unwrap();
    amf.stream.write_u8(0x0f);
    assert!(matches!(
        amf.read_value(),
        Err(AmfError::UnsupportedType(_))
    ));
}

#[test]
fn amf0_missing_object_end_marker() {
    let mut amf = Amf::new(0).unwrap();
    amf.stream.write_u8(amf0::OBJECT);
    amf.stream.write_u16(0); // empty key terminates the field loop
    amf.stream.write_u8(amf0::NULL); // wrong byte in place of OBJECT_END
    assert!(matches!(
        amf.read_value(),
        Err(AmfError::ProtocolViolation(_))
    ));
}

#[test]
fn amf0_unknown_reference_index() {
    let mut amf = Amf::new(0).unwrap();
    amf.stream.write_u8(amf0::REFERENCE);
    amf.stream.write_u16(7);
    assert!(matches!(
        amf.read_value(),
        Err(AmfError::ProtocolViolation(_))
    ));
}

#[test]
fn amf0_avmplus_escape_switches_session_to_amf3() {
    let mut amf = Amf::new(0).unwrap();
    amf.stream.write_u8(amf0::AVMPLUS);
    amf.stream.write_u8(0x04); // AMF3 integer marker
    amf.stream.write_u29(5).unwrap();
    assert_eq!(amf.read_value().unwrap(), AmfValue::Integer(5));
    assert_eq!(amf.version(), AmfVersion::Amf3);

    // The switch is irrevocable: subsequent traffic is AMF3.
    amf.write_value(&"after".into()).unwrap();
    assert_eq!(amf.read_value().unwrap(), AmfValue::Str("after".into()));
}
