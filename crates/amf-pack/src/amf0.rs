//! AMF0 wire paths.
//!
//! Composites are reference-checked against an identity-keyed table and
//! back-referenced as marker + u16 index. Objects and ECMA arrays terminate
//! with an empty key followed by the object-end marker.

use crate::codec::{Amf, AmfVersion};
use crate::constants::amf0;
use crate::error::AmfError;
use crate::value::{AmfArray, AmfObject, AmfValue};

impl Amf {
    pub(crate) fn write_data_v0(&mut self, value: &AmfValue) -> Result<(), AmfError> {
        match value {
            AmfValue::Null => self.stream.write_u8(amf0::NULL),
            AmfValue::Undefined => self.stream.write_u8(amf0::UNDEFINED),
            AmfValue::Bool(b) => {
                self.stream.write_u8(amf0::BOOLEAN);
                self.stream.write_u8(*b as u8);
            }
            AmfValue::Integer(i) => {
                self.stream.write_u8(amf0::NUMBER);
                self.stream.write_f64(*i as f64);
            }
            AmfValue::Float(f) => {
                self.stream.write_u8(amf0::NUMBER);
                self.stream.write_f64(*f);
            }
            AmfValue::Str(s) => self.write_string_v0(s)?,
            AmfValue::Date(d) => {
                self.stream.write_u8(amf0::DATE);
                self.stream.write_f64(d.epoch_ms);
                // Timezone offset: carried for wire shape only.
                self.stream.write_i16(0);
            }
            AmfValue::Array(arr) => self.write_ecma_array(value, arr)?,
            AmfValue::Object(obj) => {
                if obj.class_name.is_some() {
                    self.write_typed_object(value, obj)?;
                } else {
                    self.write_object_v0(value, obj)?;
                }
            }
            AmfValue::Bytes(_) => {
                return Err(AmfError::UnsupportedType(
                    "byte arrays require AMF3".to_owned(),
                ))
            }
        }
        Ok(())
    }

    pub(crate) fn read_data_v0(&mut self) -> Result<AmfValue, AmfError> {
        let marker = self.stream.read_u8()?;
        match marker {
            amf0::NUMBER => Ok(AmfValue::Float(self.stream.read_f64()?)),
            amf0::BOOLEAN => Ok(AmfValue::Bool(self.stream.read_u8()? != 0)),
            amf0::STRING => Ok(AmfValue::Str(self.stream.read_utf()?)),
            amf0::OBJECT => {
                let fields = self.read_object_fields_v0()?;
                Ok(AmfValue::object(fields))
            }
            amf0::NULL => Ok(AmfValue::Null),
            amf0::UNDEFINED => Ok(AmfValue::Undefined),
            amf0::REFERENCE => {
                let idx = self.stream.read_u16()? as usize;
                self.references.get(idx).cloned().ok_or_else(|| {
                    AmfError::ProtocolViolation(format!("unknown AMF0 reference index: {idx}"))
                })
            }
            amf0::ECMA_ARRAY => {
                // The u32 is a length hint; decoding is terminator-driven.
                let _length = self.stream.read_u32()?;
                let fields = self.read_object_fields_v0()?;
                Ok(AmfValue::object(fields))
            }
            amf0::STRICT_ARRAY => {
                let length = self.stream.read_u32()? as usize;
                let mut elements = Vec::with_capacity(length.min(4096));
                for _ in 0..length {
                    elements.push(self.read_data()?);
                }
                Ok(AmfValue::array(elements))
            }
            amf0::DATE => {
                let epoch_ms = self.stream.read_f64()?;
                self.stream.read_i16()?;
                Ok(AmfValue::date(epoch_ms))
            }
            amf0::LONG_STRING => {
                let length = self.stream.read_u32()? as usize;
                Ok(AmfValue::Str(self.stream.read_utf_bytes(length)?))
            }
            amf0::TYPED_OBJECT => {
                let class_name = self.stream.read_utf()?;
                let fields = self.read_object_fields_v0()?;
                Ok(AmfValue::Object(std::rc::Rc::new(AmfObject {
                    class_name: Some(class_name),
                    fields,
                })))
            }
            amf0::AVMPLUS => {
                // One-way escape: the rest of the session reads as AMF3.
                self.set_version(AmfVersion::Amf3);
                self.read_data()
            }
            other => Err(AmfError::UnsupportedType(format!(
                "unknown AMF0 marker: {other}"
            ))),
        }
    }

    fn write_string_v0(&mut self, s: &str) -> Result<(), AmfError> {
        if s.len() > 65535 {
            self.stream.write_u8(amf0::LONG_STRING);
            self.stream.write_u32(s.len() as u32);
            self.stream.write_utf_bytes(s);
        } else {
            self.stream.write_u8(amf0::STRING);
            self.stream.write_utf(s)?;
        }
        Ok(())
    }

    /// Writes a back-reference when `value` is already in the table.
    /// Returns false when the caller must encode the value literally.
    fn write_reference_v0(&mut self, value: &AmfValue) -> bool {
        match self.amf0_reference(value) {
            Some(idx) if idx <= 65535 => {
                self.stream.write_u8(amf0::REFERENCE);
                self.stream.write_u16(idx as u16);
                true
            }
            // An index beyond the u16 field cannot be referenced; the value
            // is already in the table and gets re-encoded literally.
            Some(_) => false,
            None => {
                self.references.push(value.clone());
                false
            }
        }
    }

    fn write_object_v0(&mut self, value: &AmfValue, obj: &AmfObject) -> Result<(), AmfError> {
        if self.write_reference_v0(value) {
            return Ok(());
        }
        self.stream.write_u8(amf0::OBJECT);
        for (key, val) in &obj.fields {
            self.stream.write_utf(key)?;
            self.write_data_v0(val)?;
        }
        self.write_object_end_v0();
        Ok(())
    }

    fn write_typed_object(&mut self, value: &AmfValue, obj: &AmfObject) -> Result<(), AmfError> {
        if self.write_reference_v0(value) {
            return Ok(());
        }
        self.stream.write_u8(amf0::TYPED_OBJECT);
        let class_name = obj.class_name.as_deref().unwrap_or("");
        self.stream.write_utf(class_name)?;
        for (key, val) in &obj.fields {
            self.stream.write_utf(key)?;
            self.write_data_v0(val)?;
        }
        self.write_object_end_v0();
        Ok(())
    }

    fn write_ecma_array(&mut self, value: &AmfValue, arr: &AmfArray) -> Result<(), AmfError> {
        if self.write_reference_v0(value) {
            return Ok(());
        }
        self.stream.write_u8(amf0::ECMA_ARRAY);
        self.stream.write_u32(arr.elements.len() as u32);
        for (i, el) in arr.elements.iter().enumerate() {
            self.stream.write_utf(&i.to_string())?;
            self.write_data_v0(el)?;
        }
        for (key, val) in &arr.keyed {
            self.stream.write_utf(key)?;
            self.write_data_v0(val)?;
        }
        self.write_object_end_v0();
        Ok(())
    }

    pub(crate) fn write_strict_array_v0(&mut self, value: &AmfValue) -> Result<(), AmfError> {
        let arr = match value {
            AmfValue::Array(arr) => arr.clone(),
            _ => {
                return Err(AmfError::UnsupportedType(
                    "strict array write requires an array value".to_owned(),
                ))
            }
        };
        if !arr.keyed.is_empty() {
            // Not dense; only the ECMA shape can carry the keyed part.
            return self.write_ecma_array(value, &arr);
        }
        if self.write_reference_v0(value) {
            return Ok(());
        }
        self.stream.write_u8(amf0::STRICT_ARRAY);
        self.stream.write_u32(arr.elements.len() as u32);
        for el in &arr.elements {
            self.write_data_v0(el)?;
        }
        Ok(())
    }

    fn write_object_end_v0(&mut self) {
        self.stream.write_u16(0);
        self.stream.write_u8(amf0::OBJECT_END);
    }

    /// Key/value pairs until the empty key, then the asserted end marker.
    fn read_object_fields_v0(&mut self) -> Result<Vec<(String, AmfValue)>, AmfError> {
        let mut fields = Vec::new();
        loop {
            let key = self.stream.read_utf()?;
            if key.is_empty() {
                break;
            }
            let val = self.read_data()?;
            fields.push((key, val));
        }
        let end = self.stream.read_u8()?;
        if end != amf0::OBJECT_END {
            return Err(AmfError::ProtocolViolation(format!(
                "expected object end marker, got: {end}"
            )));
        }
        Ok(fields)
    }
}
