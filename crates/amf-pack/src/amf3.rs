//! AMF3 wire paths.
//!
//! Every composite shares one object reference table; a repeat instance is
//! encoded as a bare U29 reference header. Key-position strings are interned
//! in a separate string table. Object trait flags are packed into the U29
//! header; only the plain header (1) and the previous-shape repeat header
//! (11) are valid.

use crate::codec::{Amf, BlobFrame};
use crate::constants::amf3;
use crate::error::AmfError;
use crate::value::{AmfArray, AmfObject, AmfValue};

/// Inclusive bounds of the 29-bit integer fast path.
const INTEGER_MIN: i64 = -(1 << 28);
const INTEGER_MAX: i64 = (1 << 28) - 1;

/// Trait header for a repeat of the previous shape:
/// non-reference (bit0) | trait repeat (bit1) | dynamic (bit3).
const TRAIT_REPEAT_HEADER: u32 = 11;

impl Amf {
    pub(crate) fn write_data_v3(
        &mut self,
        value: &AmfValue,
        key_context: bool,
    ) -> Result<(), AmfError> {
        match value {
            AmfValue::Undefined => self.stream.write_u8(amf3::UNDEFINED),
            AmfValue::Null => self.stream.write_u8(amf3::NULL),
            AmfValue::Bool(b) => {
                self.stream
                    .write_u8(if *b { amf3::TRUE } else { amf3::FALSE });
            }
            AmfValue::Integer(i) => self.write_number_v3(*i as f64)?,
            AmfValue::Float(f) => self.write_number_v3(*f)?,
            AmfValue::Str(s) => {
                self.stream.write_u8(amf3::STRING);
                self.write_string_v3(s, key_context)?;
            }
            AmfValue::Date(d) => {
                if let Some(idx) = self.amf3_reference(value) {
                    self.stream.write_u29((idx as u32) << 1)?;
                    return Ok(());
                }
                self.objects.push(value.clone());
                self.stream.write_u8(amf3::DATE);
                // "No extra flags" header.
                self.stream.write_u29(1)?;
                self.stream.write_f64(d.epoch_ms);
            }
            AmfValue::Array(arr) => self.write_array_v3(value, arr)?,
            AmfValue::Object(obj) => {
                if obj.class_name.is_some() {
                    return Err(AmfError::UnsupportedType(
                        "named traits are not supported in AMF3".to_owned(),
                    ));
                }
                self.write_object_v3(value, obj)?;
            }
            AmfValue::Bytes(bytes) => self.write_byte_array_v3(value, bytes)?,
        }
        Ok(())
    }

    pub(crate) fn read_data_v3(&mut self) -> Result<AmfValue, AmfError> {
        // A pending byte-blob write bypasses ordinary marker dispatch: the
        // blob cannot be identified from its leading bytes alone.
        if self.blob_frame.is_some() {
            return self.read_byte_array_v3();
        }
        let marker = self.stream.read_u8()?;
        match marker {
            amf3::UNDEFINED => Ok(AmfValue::Undefined),
            amf3::NULL => Ok(AmfValue::Null),
            amf3::FALSE => Ok(AmfValue::Bool(false)),
            amf3::TRUE => Ok(AmfValue::Bool(true)),
            amf3::INTEGER => {
                let raw = self.stream.read_u29()?;
                // Sign lives in bit 28; recover it arithmetically.
                let val = (raw.wrapping_shl(3) as i32) >> 3;
                Ok(AmfValue::Integer(val as i64))
            }
            amf3::DOUBLE => Ok(AmfValue::Float(self.stream.read_f64()?)),
            amf3::STRING => Ok(AmfValue::Str(self.read_string_v3()?)),
            amf3::DATE => {
                let header = self.stream.read_u29()?;
                if header & 1 == 0 {
                    return self.object_reference((header >> 1) as usize);
                }
                Ok(AmfValue::date(self.stream.read_f64()?))
            }
            amf3::ARRAY => self.read_array_v3(),
            amf3::OBJECT => self.read_object_v3(),
            other => Err(AmfError::UnsupportedType(format!(
                "unknown AMF3 marker: {other}"
            ))),
        }
    }

    fn write_number_v3(&mut self, val: f64) -> Result<(), AmfError> {
        // The source format has one number type; anything integral in the
        // 29-bit window takes the fast path.
        let integral = val.fract() == 0.0 && (INTEGER_MIN as f64..=INTEGER_MAX as f64).contains(&val);
        if integral {
            self.stream.write_u8(amf3::INTEGER);
            self.stream.write_u29((val as i32 as u32) & 0x1fff_ffff)?;
        } else {
            self.stream.write_u8(amf3::DOUBLE);
            self.stream.write_f64(val);
        }
        Ok(())
    }

    /// Writes a string as a literal or a string-table reference.
    ///
    /// The empty string is always the literal header 1 and never touches
    /// the table; non-empty text is interned only in key context.
    pub(crate) fn write_string_v3(&mut self, s: &str, key_context: bool) -> Result<(), AmfError> {
        if s.is_empty() {
            self.stream.write_u29(1)?;
            return Ok(());
        }
        if key_context {
            if let Some(idx) = self.strings.iter().position(|x| x == s) {
                self.stream.write_u29((idx as u32) << 1)?;
                return Ok(());
            }
            self.strings.push(s.to_owned());
        }
        self.stream.write_u29(((s.len() as u32) << 1) | 1)?;
        self.stream.write_utf_bytes(s);
        Ok(())
    }

    pub(crate) fn read_string_v3(&mut self) -> Result<String, AmfError> {
        let header = self.stream.read_u29()?;
        if header & 1 == 0 {
            let idx = (header >> 1) as usize;
            return self.strings.get(idx).cloned().ok_or_else(|| {
                AmfError::ProtocolViolation(format!("unknown string reference index: {idx}"))
            });
        }
        Ok(self.stream.read_utf_bytes((header >> 1) as usize)?)
    }

    fn write_array_v3(&mut self, value: &AmfValue, arr: &AmfArray) -> Result<(), AmfError> {
        if let Some(idx) = self.amf3_reference(value) {
            self.stream.write_u29((idx as u32) << 1)?;
            return Ok(());
        }
        self.objects.push(value.clone());
        self.stream.write_u8(amf3::ARRAY);
        if arr.keyed.is_empty() {
            self.stream
                .write_u29(((arr.elements.len() as u32) << 1) | 1)?;
            self.write_string_v3("", false)?;
            for el in &arr.elements {
                self.write_data_v3(el, false)?;
            }
        } else {
            self.stream.write_u29(0)?;
            // Positional entries travel as numeric-string keys. Array keys
            // never use the string table.
            for (i, el) in arr.elements.iter().enumerate() {
                self.write_string_v3(&i.to_string(), false)?;
                self.write_data_v3(el, false)?;
            }
            for (key, val) in &arr.keyed {
                self.write_string_v3(key, false)?;
                self.write_data_v3(val, false)?;
            }
            self.write_string_v3("", false)?;
        }
        Ok(())
    }

    fn read_array_v3(&mut self) -> Result<AmfValue, AmfError> {
        let header = self.stream.read_u29()?;
        if header & 1 == 0 {
            return self.object_reference((header >> 1) as usize);
        }
        let count = (header >> 1) as usize;
        let first_key = self.read_string_v3()?;
        if first_key.is_empty() {
            let mut elements = Vec::with_capacity(count.min(4096));
            for _ in 0..count {
                elements.push(self.read_data()?);
            }
            return Ok(AmfValue::array(elements));
        }
        // Associative part: pairs until the empty key, then any trailing
        // dense run.
        let mut keyed = Vec::new();
        let mut key = first_key;
        while !key.is_empty() {
            let val = self.read_data()?;
            keyed.push((key, val));
            key = self.read_string_v3()?;
        }
        let mut elements = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            elements.push(self.read_data()?);
        }
        Ok(AmfValue::keyed_array(elements, keyed))
    }

    fn write_object_v3(&mut self, value: &AmfValue, obj: &AmfObject) -> Result<(), AmfError> {
        if let Some(idx) = self.amf3_reference(value) {
            self.stream.write_u29((idx as u32) << 1)?;
            return Ok(());
        }
        self.objects.push(value.clone());
        self.stream.write_u8(amf3::OBJECT);
        if self.take_trait_repeat() {
            self.stream.write_u29(TRAIT_REPEAT_HEADER)?;
        }
        // Empty type name; its single header byte (1) doubles as the plain
        // trait header when no repeat header was written.
        self.write_string_v3("", true)?;
        for (key, val) in &obj.fields {
            self.write_string_v3(key, true)?;
            self.write_data_v3(val, true)?;
        }
        self.write_string_v3("", true)?;
        Ok(())
    }

    fn read_object_v3(&mut self) -> Result<AmfValue, AmfError> {
        let header = self.stream.read_u29()?;
        if header & 1 == 0 {
            return self.object_reference((header >> 1) as usize);
        }
        if header & 4 != 0 {
            return Err(AmfError::ProtocolViolation(
                "externalizable objects are not supported".to_owned(),
            ));
        }
        match header {
            // Plain object: the header byte was the empty type name itself.
            1 => {}
            TRAIT_REPEAT_HEADER => {
                let class_name = self.read_string_v3()?;
                if !class_name.is_empty() {
                    return Err(AmfError::ProtocolViolation(format!(
                        "expected empty type name, got: {class_name:?}"
                    )));
                }
            }
            other => {
                return Err(AmfError::ProtocolViolation(format!(
                    "unsupported trait header: {other}"
                )))
            }
        }
        let mut fields = Vec::new();
        loop {
            let key = self.read_string_v3()?;
            if key.is_empty() {
                break;
            }
            let val = self.read_data()?;
            fields.push((key, val));
        }
        Ok(AmfValue::object(fields))
    }

    fn write_byte_array_v3(&mut self, value: &AmfValue, bytes: &[u8]) -> Result<(), AmfError> {
        if let Some(idx) = self.amf3_reference(value) {
            self.stream.write_u29((idx as u32) << 1)?;
            return Ok(());
        }
        self.objects.push(value.clone());
        // Framing contract: raw bytes, sentinel, length header, raw bytes,
        // sentinel. The sentinel positions are remembered for the paired
        // read.
        self.stream.write_buf(bytes);
        let marker = self.stream.write_pos;
        self.stream.write_u8(amf3::BYTE_ARRAY);
        let header = self.stream.write_pos;
        self.stream
            .write_u29(((bytes.len() as u32 + 1) << 1) | 1)?;
        self.stream.write_buf(bytes);
        self.stream.write_u8(amf3::BYTE_ARRAY);
        self.blob_frame = Some(BlobFrame { marker, header });
        Ok(())
    }

    fn read_byte_array_v3(&mut self) -> Result<AmfValue, AmfError> {
        let frame = match self.blob_frame.take() {
            Some(frame) => frame,
            None => {
                return Err(AmfError::ProtocolViolation(
                    "no pending byte array".to_owned(),
                ))
            }
        };
        // Peek at the remembered position to confirm the sentinel before
        // committing to the blob path.
        let saved = self.stream.read_pos;
        self.stream.read_pos = frame.marker;
        let sentinel = self.stream.read_u8()?;
        if sentinel != amf3::BYTE_ARRAY {
            self.stream.read_pos = saved;
            return Err(AmfError::ProtocolViolation(format!(
                "expected byte array sentinel, got: {sentinel}"
            )));
        }
        self.stream.read_pos = frame.header;
        let header = self.stream.read_u29()?;
        if header & 1 == 0 {
            return self.object_reference((header >> 1) as usize);
        }
        // The run is the blob plus one trailing sentinel byte.
        let run = self.stream.read_buf((header >> 1) as usize)?.to_vec();
        match run.split_last() {
            Some((last, body)) if *last == amf3::BYTE_ARRAY => Ok(AmfValue::bytes(body.to_vec())),
            _ => Err(AmfError::ProtocolViolation(
                "no byte array end marker found".to_owned(),
            )),
        }
    }

    fn object_reference(&self, idx: usize) -> Result<AmfValue, AmfError> {
        self.objects.get(idx).cloned().ok_or_else(|| {
            AmfError::ProtocolViolation(format!("unknown object reference index: {idx}"))
        })
    }
}
