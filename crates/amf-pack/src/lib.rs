//! AMF (Action Message Format) value codec, versions 0 and 3.
//!
//! A session ([`Amf`]) binds one [`amf_buffers::ByteStream`] to one wire
//! version and round-trips [`AmfValue`] trees through it. Both encodings are
//! marker-dispatched byte streams with session-scoped reference tables;
//! AMF3 additionally interns key-position strings and packs trait flags
//! into U29 headers.

pub mod constants;

mod amf0;
mod amf3;
mod codec;
mod error;
mod value;

pub use codec::{Amf, AmfVersion};
pub use error::AmfError;
pub use value::{same_instance, AmfArray, AmfDate, AmfObject, AmfValue};
