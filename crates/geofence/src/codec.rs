//! Byte encoding for regions crossing process boundaries.
//!
//! Layout (all integers and floats big-endian):
//!
//! ```text
//! u32 id_len | id (UTF-8) | f64 radius | f64 latitude | f64 longitude
//!   | u32 events_len | events (UTF-8, comma-joined names)
//! ```

use crate::types::{Coordinate, EventSet, GeoRegion, RegionError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("truncated region blob: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("region field '{field}' is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    #[error("{0} trailing bytes after region blob")]
    TrailingBytes(usize),

    #[error(transparent)]
    Region(#[from] RegionError),
}

pub fn encode(region: &GeoRegion) -> Vec<u8> {
    let id = region.id().as_bytes();
    let events = region.events().to_string();
    let mut buf = Vec::with_capacity(4 + id.len() + 24 + 4 + events.len());

    put_bytes(&mut buf, id);
    buf.extend_from_slice(&region.radius().to_be_bytes());
    buf.extend_from_slice(&region.center().latitude.to_be_bytes());
    buf.extend_from_slice(&region.center().longitude.to_be_bytes());
    put_bytes(&mut buf, events.as_bytes());
    buf
}

pub fn decode(bytes: &[u8]) -> Result<GeoRegion, CodecError> {
    let mut reader = Reader { bytes, pos: 0 };

    let id = reader.string("id")?;
    let radius = reader.f64()?;
    let latitude = reader.f64()?;
    let longitude = reader.f64()?;
    let events: EventSet = reader.string("events")?.parse()?;

    let remaining = reader.remaining();
    if remaining > 0 {
        return Err(CodecError::TrailingBytes(remaining));
    }

    let center = Coordinate::new(latitude, longitude)?;
    Ok(GeoRegion::new(id, radius, center, events)?)
}

fn put_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
    buf.extend_from_slice(data);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(CodecError::Truncated { needed, remaining });
        }
        let slice = &self.bytes[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(raw))
    }

    fn f64(&mut self) -> Result<f64, CodecError> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(f64::from_be_bytes(raw))
    }

    fn string(&mut self, field: &'static str) -> Result<String, CodecError> {
        let len = self.u32()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8 { field })
    }
}
