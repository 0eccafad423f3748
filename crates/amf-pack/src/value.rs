//! [`AmfValue`] — the tagged value union both wire versions encode.

use std::rc::Rc;

/// A timestamp carried as milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct AmfDate {
    pub epoch_ms: f64,
}

/// An AMF array: a dense positional run plus an insertion-ordered
/// associative part.
///
/// The array is *dense* when `keyed` is empty; any associative entry forces
/// the keyed wire shapes (ECMA array in AMF0, associative array in AMF3).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AmfArray {
    pub elements: Vec<AmfValue>,
    pub keyed: Vec<(String, AmfValue)>,
}

/// An AMF object: an ordered field bag with an optional type-name tag.
///
/// The tag is carried for wire fidelity only; no nominal type is ever
/// reconstructed from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AmfObject {
    pub class_name: Option<String>,
    pub fields: Vec<(String, AmfValue)>,
}

/// Universal value type spanning both AMF encodings.
///
/// Composite variants are `Rc`-wrapped so values have *instance identity*:
/// the session reference tables compare with [`Rc::ptr_eq`], never by
/// structure, and two structurally equal but distinct composites never
/// collapse into one reference slot.
#[derive(Debug, Clone)]
pub enum AmfValue {
    Null,
    Undefined,
    Bool(bool),
    /// Integral number; AMF3 gives it a 29-bit fast path when it fits.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    Str(String),
    Date(Rc<AmfDate>),
    Array(Rc<AmfArray>),
    Object(Rc<AmfObject>),
    /// Raw byte blob (AMF3 only).
    Bytes(Rc<Vec<u8>>),
}

impl AmfValue {
    /// A dense array.
    pub fn array(elements: Vec<AmfValue>) -> Self {
        AmfValue::Array(Rc::new(AmfArray {
            elements,
            keyed: Vec::new(),
        }))
    }

    /// An array with an associative part.
    pub fn keyed_array(elements: Vec<AmfValue>, keyed: Vec<(String, AmfValue)>) -> Self {
        AmfValue::Array(Rc::new(AmfArray { elements, keyed }))
    }

    /// An anonymous object.
    pub fn object(fields: Vec<(String, AmfValue)>) -> Self {
        AmfValue::Object(Rc::new(AmfObject {
            class_name: None,
            fields,
        }))
    }

    /// An object carrying a type-name tag.
    pub fn typed_object(class_name: impl Into<String>, fields: Vec<(String, AmfValue)>) -> Self {
        AmfValue::Object(Rc::new(AmfObject {
            class_name: Some(class_name.into()),
            fields,
        }))
    }

    pub fn date(epoch_ms: f64) -> Self {
        AmfValue::Date(Rc::new(AmfDate { epoch_ms }))
    }

    pub fn bytes(data: Vec<u8>) -> Self {
        AmfValue::Bytes(Rc::new(data))
    }
}

impl From<bool> for AmfValue {
    fn from(v: bool) -> Self {
        AmfValue::Bool(v)
    }
}

impl From<i64> for AmfValue {
    fn from(v: i64) -> Self {
        AmfValue::Integer(v)
    }
}

impl From<f64> for AmfValue {
    fn from(v: f64) -> Self {
        AmfValue::Float(v)
    }
}

impl From<&str> for AmfValue {
    fn from(v: &str) -> Self {
        AmfValue::Str(v.to_owned())
    }
}

impl From<String> for AmfValue {
    fn from(v: String) -> Self {
        AmfValue::Str(v)
    }
}

/// Structural equality.
///
/// `Integer` and `Float` cross-compare numerically: the source format has a
/// single number type, so a value written as an integer may legitimately
/// come back as a double and vice versa.
impl PartialEq for AmfValue {
    fn eq(&self, other: &Self) -> bool {
        use AmfValue::*;
        match (self, other) {
            (Null, Null) | (Undefined, Undefined) => true,
            (Bool(a), Bool(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Float(b)) | (Float(b), Integer(a)) => *a as f64 == *b,
            (Str(a), Str(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            _ => false,
        }
    }
}

/// Instance identity: true only when both sides are the *same* composite
/// allocation. Scalars never have identity.
pub fn same_instance(a: &AmfValue, b: &AmfValue) -> bool {
    match (a, b) {
        (AmfValue::Date(x), AmfValue::Date(y)) => Rc::ptr_eq(x, y),
        (AmfValue::Array(x), AmfValue::Array(y)) => Rc::ptr_eq(x, y),
        (AmfValue::Object(x), AmfValue::Object(y)) => Rc::ptr_eq(x, y),
        (AmfValue::Bytes(x), AmfValue::Bytes(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

impl From<serde_json::Value> for AmfValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => AmfValue::Null,
            serde_json::Value::Bool(b) => AmfValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AmfValue::Integer(i)
                } else {
                    AmfValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => AmfValue::Str(s),
            serde_json::Value::Array(arr) => {
                AmfValue::array(arr.into_iter().map(AmfValue::from).collect())
            }
            serde_json::Value::Object(obj) => AmfValue::object(
                obj.into_iter()
                    .map(|(k, v)| (k, AmfValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<AmfValue> for serde_json::Value {
    fn from(v: AmfValue) -> Self {
        match v {
            AmfValue::Null | AmfValue::Undefined => serde_json::Value::Null,
            AmfValue::Bool(b) => serde_json::Value::Bool(b),
            AmfValue::Integer(i) => serde_json::json!(i),
            AmfValue::Float(f) => serde_json::Value::from(f),
            AmfValue::Str(s) => serde_json::Value::String(s),
            AmfValue::Date(d) => serde_json::Value::from(d.epoch_ms),
            AmfValue::Array(arr) => {
                if arr.keyed.is_empty() {
                    serde_json::Value::Array(
                        arr.elements
                            .iter()
                            .cloned()
                            .map(serde_json::Value::from)
                            .collect(),
                    )
                } else {
                    // Mirrors the keyed decode shape: positional entries
                    // become numeric-string keys.
                    let mut map = serde_json::Map::new();
                    for (i, el) in arr.elements.iter().enumerate() {
                        map.insert(i.to_string(), serde_json::Value::from(el.clone()));
                    }
                    for (k, v) in &arr.keyed {
                        map.insert(k.clone(), serde_json::Value::from(v.clone()));
                    }
                    serde_json::Value::Object(map)
                }
            }
            AmfValue::Object(obj) => serde_json::Value::Object(
                obj.fields
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
                    .collect(),
            ),
            AmfValue::Bytes(bytes) => serde_json::Value::Array(
                bytes.iter().map(|b| serde_json::json!(b)).collect(),
            ),
        }
    }
}
