use thiserror::Error;

use crate::gaia::flags::GeometryClass;

/// Errors raised while decoding or encoding a SpatiaLite geometry BLOB.
///
/// Framing-level rejections (blob too short, bad start/end/MBR marker) are
/// not errors: the reader reports those as `Ok(None)` so that callers
/// scanning a table can skip non-geometry values. Everything below means
/// the blob claimed to be a geometry and then broke its own format.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid endian marker {found:#04x} (expected 0x00 or 0x01)")]
    MalformedEndian { found: u8 },

    #[error("unrecognized geometry type code {code} at byte {offset}")]
    MalformedType { code: i32, offset: usize },

    #[error("expected entity marker 0x69 at byte {offset}, found {found:#04x}")]
    MissingEntityMarker { offset: usize, found: u8 },

    #[error("container of {expected:?} holds a {found:?} entity at byte {offset}")]
    ChildKindMismatch {
        expected: GeometryClass,
        found: GeometryClass,
        offset: usize,
    },

    #[error("corrupt payload at byte {offset} while reading {context}")]
    CorruptPayload {
        offset: usize,
        context: &'static str,
    },

    #[error("{0:?} does not support compressed coordinates")]
    UnsupportedCombination(GeometryClass),

    #[error("error while reading blob stream")]
    Io(#[from] std::io::Error),
}
