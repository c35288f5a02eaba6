//! Canonical object encoding and on-disk compression.
//!
//! Every object is hashed and stored as `"<type> <len>\0<content>"`. The
//! stored form is that encoding run through zlib.

use super::{
    object::{space_position, zero_position, ObjectKind},
    Error, ObjectId, Result,
};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use std::io::{Read, Write};

pub fn encode(kind: ObjectKind, content: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind, content.len());
    [header.as_bytes(), content].concat()
}

pub fn digest(canonical: &[u8]) -> ObjectId {
    ObjectId::digest(canonical)
}

/// Splits a canonical encoding into its type tag and content.
pub fn decode(data: &[u8]) -> Result<(ObjectKind, &[u8])> {
    let zero_pos = zero_position(data).ok_or(Error::corrupt("no \\0 after object header"))?;
    let header = std::str::from_utf8(&data[..zero_pos])
        .map_err(|err| Error::corrupt(format!("object header is not utf-8. {err}")))?;
    let content = &data[(zero_pos + 1)..];

    let sp_pos = space_position(header.as_bytes())
        .ok_or_else(|| Error::corrupt(format!("malformed object header {header:?}")))?;
    let (tag, size) = (&header[..sp_pos], &header[(sp_pos + 1)..]);

    let size = size
        .parse::<usize>()
        .map_err(|err| Error::corrupt(format!("invalid object size {size:?}. {err}")))?;
    if size != content.len() {
        return Err(Error::corrupt(format!(
            "object declares {size} bytes but holds {}",
            content.len()
        )));
    }

    let kind = tag.parse::<ObjectKind>()?;
    Ok((kind, content))
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut e = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    let fail = |err: std::io::Error| Error::corrupt(format!("compression failed. {err}"));
    e.write_all(data).map_err(fail)?;
    e.finish().map_err(fail)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut buf = vec![];
    decoder
        .read_to_end(&mut buf)
        .map_err(|err| Error::corrupt(format!("decompression failed. {err}")))?;
    Ok(buf)
}
