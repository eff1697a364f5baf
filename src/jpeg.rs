//! JPEG marker splicing.
//!
//! A generic JPEG encoder always emits its own start-of-image marker, which
//! leaves no room to place an APP1 (EXIF) segment at the front of the stream.
//! This module writes the leading markers by hand and then hands the encoder
//! a sink that silently drops the encoder's own SOI:
//!
//! - [`SkipWriter`] — a [`Write`] decorator that discards a fixed number of
//!   leading bytes, however they are chunked across write calls.
//! - [`exif_writer`] — writes `FF D8` (and, when an EXIF payload is present,
//!   the APP1 segment) directly to the destination, then returns a
//!   [`SkipWriter`] with a two-byte skip for the encoder to write into.

use std::io::{self, Write};

use crate::error::{Error, Result};

/// JPEG start-of-image marker.
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// APP1 segment type, reserved for EXIF.
const APP1: u8 = 0xE1;

/// Largest EXIF payload that fits in an APP1 segment. The segment length
/// field is 16 bits and counts itself, leaving `0xFFFF - 2` bytes for data.
pub const MAX_EXIF_LEN: usize = 0xFFFF - 2;

/// A write sink that drops a configured number of leading bytes from the
/// logical stream, then forwards everything else to the wrapped sink.
///
/// Swallowed bytes are reported as accepted, so callers that treat a short
/// count as an error (`write_all`, encoders) see the whole input land.
/// Sequential single-writer use only; the skip counter is the only state.
#[derive(Debug)]
pub struct SkipWriter<W> {
    inner: W,
    to_skip: usize,
}

impl<W: Write> SkipWriter<W> {
    pub fn new(inner: W, to_skip: usize) -> Self {
        Self { inner, to_skip }
    }

    /// Unwrap the inner sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for SkipWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.to_skip == 0 {
            return self.inner.write(buf);
        }

        if buf.len() < self.to_skip {
            self.to_skip -= buf.len();
            return Ok(buf.len());
        }

        let skipped = self.to_skip;
        let n = self.inner.write(&buf[skipped..])?;
        self.to_skip = 0;
        Ok(n + skipped)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Write the JPEG header markers for `exif` to `writer` and return the sink
/// the encoder should write into.
///
/// The destination receives `FF D8` immediately, followed by an APP1 segment
/// (`FF E1`, big-endian length, payload verbatim) when `exif` is present and
/// non-empty. The returned [`SkipWriter`] drops the first two bytes the
/// encoder writes — its own start-of-image marker — so the encoder output
/// continues the stream after the hand-written header.
///
/// A payload longer than [`MAX_EXIF_LEN`] cannot be represented in the 16-bit
/// segment length field and is rejected with [`Error::OversizeExif`] rather
/// than letting the length wrap.
pub fn exif_writer<W: Write>(mut writer: W, exif: Option<&[u8]>) -> Result<SkipWriter<W>> {
    writer.write_all(&SOI).map_err(to_encode_error)?;

    if let Some(exif) = exif.filter(|blob| !blob.is_empty()) {
        if exif.len() > MAX_EXIF_LEN {
            return Err(Error::OversizeExif { len: exif.len() });
        }

        let marker_len = (exif.len() + 2) as u16;
        let [len_hi, len_lo] = marker_len.to_be_bytes();
        writer
            .write_all(&[0xFF, APP1, len_hi, len_lo])
            .map_err(to_encode_error)?;
        writer.write_all(exif).map_err(to_encode_error)?;
    }

    Ok(SkipWriter::new(writer, SOI.len()))
}

fn to_encode_error(e: io::Error) -> Error {
    Error::Encode(e.into())
}
