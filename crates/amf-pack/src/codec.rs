//! The codec session: one buffer, one wire version, shared reference state.

use amf_buffers::ByteStream;

use crate::error::AmfError;
use crate::value::{same_instance, AmfValue};

/// Wire encoding version, fixed at construction.
///
/// The only exception is the AMF0 `AVMPLUS` marker, which flips a session to
/// [`AmfVersion::Amf3`] for the rest of its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmfVersion {
    Amf0,
    Amf3,
}

/// Write positions remembered across a byte-blob write so the paired read
/// can find the framing sentinel. Scoped to exactly one blob operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlobFrame {
    /// Position of the first sentinel marker byte.
    pub marker: usize,
    /// Position of the length header, right after the sentinel.
    pub header: usize,
}

/// A stateful AMF session bound to one stream and one format version.
///
/// The stream doubles as an append log for [`Amf::write_value`] and a
/// sequential feed for [`Amf::read_value`]: successive reads consume values
/// strictly in the order successive writes produced them. A session is not
/// safe for concurrent use; reference tables and both cursors mutate on
/// every operation.
///
/// # Example
///
/// ```
/// use amf_pack::{Amf, AmfValue};
///
/// let mut amf = Amf::new(3).unwrap();
/// amf.write_value(&AmfValue::Str("hello".into())).unwrap();
/// assert_eq!(amf.read_value().unwrap(), AmfValue::Str("hello".into()));
/// ```
#[derive(Debug)]
pub struct Amf {
    /// The session's byte stream.
    pub stream: ByteStream,
    version: AmfVersion,
    /// AMF0 reference table: composites seen by the writer, identity-keyed,
    /// append-only. An entry's index never changes.
    pub references: Vec<AmfValue>,
    /// AMF3 object reference table: dates, arrays, objects and byte blobs
    /// share one index space.
    pub objects: Vec<AmfValue>,
    /// AMF3 string table: non-empty text seen in key-context positions.
    pub strings: Vec<String>,
    /// One-shot flag: the next object write reuses the previous trait shape.
    trait_repeat: bool,
    pub(crate) blob_frame: Option<BlobFrame>,
}

impl Amf {
    /// Creates a session for wire version `0` or `3`; any other value fails
    /// immediately.
    pub fn new(version: u8) -> Result<Self, AmfError> {
        let version = match version {
            0 => AmfVersion::Amf0,
            3 => AmfVersion::Amf3,
            other => return Err(AmfError::UnknownVersion(other)),
        };
        Ok(Self {
            stream: ByteStream::new(),
            version,
            references: Vec::new(),
            objects: Vec::new(),
            strings: Vec::new(),
            trait_repeat: false,
            blob_frame: None,
        })
    }

    /// Creates a session over a foreign payload; the whole payload is
    /// immediately readable.
    pub fn from_bytes(version: u8, bytes: Vec<u8>) -> Result<Self, AmfError> {
        let mut amf = Self::new(version)?;
        amf.stream = ByteStream::from_bytes(bytes);
        Ok(amf)
    }

    pub fn version(&self) -> AmfVersion {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: AmfVersion) {
        self.version = version;
    }

    /// Arms the one-shot trait-repeat flag: the next AMF3 object write
    /// encodes its trait header as a repeat of the previous shape.
    pub fn reuse_previous_trait(&mut self) {
        self.trait_repeat = true;
    }

    /// Consumes the one-shot trait-repeat flag.
    pub(crate) fn take_trait_repeat(&mut self) -> bool {
        std::mem::take(&mut self.trait_repeat)
    }

    /// Writes one value to the stream in the session's active encoding.
    pub fn write_value(&mut self, value: &AmfValue) -> Result<(), AmfError> {
        match self.version {
            AmfVersion::Amf0 => self.write_data_v0(value),
            AmfVersion::Amf3 => self.write_data_v3(value, false),
        }
    }

    /// Reads one value from the stream in the session's active encoding.
    pub fn read_value(&mut self) -> Result<AmfValue, AmfError> {
        self.read_data()
    }

    /// Writes an array in the AMF0 dense positional shape (strict array)
    /// instead of the default map-like ECMA shape.
    ///
    /// The shape choice only exists in AMF0; under AMF3 this defers to the
    /// ordinary array path, where the density test decides. An array with an
    /// associative part is never dense and falls back to the ECMA shape.
    pub fn write_strict_array(&mut self, value: &AmfValue) -> Result<(), AmfError> {
        match self.version {
            AmfVersion::Amf0 => self.write_strict_array_v0(value),
            AmfVersion::Amf3 => self.write_value(value),
        }
    }

    pub(crate) fn read_data(&mut self) -> Result<AmfValue, AmfError> {
        match self.version {
            AmfVersion::Amf0 => self.read_data_v0(),
            AmfVersion::Amf3 => self.read_data_v3(),
        }
    }

    /// Index of `value` in the AMF0 reference table, by instance identity.
    pub(crate) fn amf0_reference(&self, value: &AmfValue) -> Option<usize> {
        self.references.iter().position(|v| same_instance(v, value))
    }

    /// Index of `value` in the AMF3 object table, by instance identity.
    pub(crate) fn amf3_reference(&self, value: &AmfValue) -> Option<usize> {
        self.objects.iter().position(|v| same_instance(v, value))
    }
}
