//! HEIC/HEIF source backend.
//!
//! The conversion pipeline only needs two things from a HEIC file: the decoded
//! pixel buffer and the raw EXIF payload. [`HeifSource`] is that seam, and
//! [`HeifReader`] is the production implementation backed by libheif.
//!
//! "No EXIF present" is not a failure — [`HeifSource::raw_exif`] returns
//! `Ok(None)` for it, keeping hard errors distinguishable.

use std::fs;
use std::io;
use std::path::Path;

use image::{DynamicImage, RgbImage};
use libheif_rs::{ColorSpace, HeifContext, ItemId, LibHeif, RgbChroma};

/// Error raised by a HEIF source backend.
#[derive(Debug, thiserror::Error)]
pub enum HeifError {
    /// libheif rejected the container or failed to decode it.
    #[error(transparent)]
    Backend(#[from] libheif_rs::HeifError),

    /// The `Exif` metadata item is shorter than its offset header implies.
    #[error("truncated exif payload ({0} bytes)")]
    TruncatedExif(usize),

    /// The decoder produced no interleaved RGB plane.
    #[error("decoder returned no interleaved rgb plane")]
    MissingPlane,

    /// The interleaved RGB plane holds fewer bytes than its geometry needs.
    #[error("interleaved rgb plane too short ({0} bytes)")]
    ShortPlane(usize),
}

/// A HEIF-family container the pipeline can pull pixels and EXIF bytes from.
pub trait HeifSource {
    /// Extract the raw EXIF payload, or `Ok(None)` when the container has no
    /// EXIF item. The payload is opaque to callers.
    fn raw_exif(&self) -> Result<Option<Vec<u8>>, HeifError>;

    /// Decode the primary image into an 8-bit RGB pixel buffer.
    fn decode(&self) -> Result<DynamicImage, HeifError>;
}

/// Libheif-backed [`HeifSource`] over an in-memory copy of one file.
///
/// Each call parses the container afresh; extraction and decoding are
/// independent passes over the same bytes.
pub struct HeifReader {
    data: Vec<u8>,
}

impl HeifReader {
    /// Read `path` fully into memory.
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self { data: fs::read(path)? })
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl HeifSource for HeifReader {
    fn raw_exif(&self) -> Result<Option<Vec<u8>>, HeifError> {
        let ctx = HeifContext::read_from_bytes(&self.data)?;
        let handle = ctx.primary_image_handle()?;

        let mut meta_ids: Vec<ItemId> = vec![0; 1];
        let count = handle.metadata_block_ids(&mut meta_ids, b"Exif");
        if count == 0 {
            return Ok(None);
        }

        let raw = handle.metadata(meta_ids[0])?;
        strip_tiff_offset(&raw).map(Some)
    }

    fn decode(&self) -> Result<DynamicImage, HeifError> {
        let ctx = HeifContext::read_from_bytes(&self.data)?;
        let handle = ctx.primary_image_handle()?;

        let lib_heif = LibHeif::new();
        let decoded = lib_heif.decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)?;

        let planes = decoded.planes();
        let plane = planes.interleaved.ok_or(HeifError::MissingPlane)?;
        let rgb = interleaved_to_rgb(plane.data, plane.width, plane.height, plane.stride)?;
        Ok(DynamicImage::ImageRgb8(rgb))
    }
}

/// Drop the `Exif` item's leading offset field.
///
/// Per ISO/IEC 23008-12 the item starts with a 4-byte big-endian offset to
/// the TIFF header; the JPEG APP1 payload is everything after `4 + offset`.
fn strip_tiff_offset(raw: &[u8]) -> Result<Vec<u8>, HeifError> {
    if raw.len() < 4 {
        return Err(HeifError::TruncatedExif(raw.len()));
    }

    let offset = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
    let skip = offset + 4;
    if skip > raw.len() {
        return Err(HeifError::TruncatedExif(raw.len()));
    }

    Ok(raw[skip..].to_vec())
}

/// Repack a stride-padded interleaved RGB plane into a tight pixel buffer.
fn interleaved_to_rgb(
    data: &[u8],
    width: u32,
    height: u32,
    stride: usize,
) -> Result<RgbImage, HeifError> {
    let row_len = width as usize * 3;
    if stride < row_len {
        return Err(HeifError::ShortPlane(data.len()));
    }

    let rows = height as usize;
    let needed = match rows.checked_sub(1) {
        Some(full_rows) => full_rows * stride + row_len,
        None => 0,
    };
    if data.len() < needed {
        return Err(HeifError::ShortPlane(data.len()));
    }

    let mut pixels = Vec::with_capacity(row_len * rows);
    for row in data.chunks(stride).take(rows) {
        pixels.extend_from_slice(&row[..row_len]);
    }

    RgbImage::from_raw(width, height, pixels).ok_or(HeifError::ShortPlane(data.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── strip_tiff_offset ────────────────────────────────────────────

    #[test]
    fn zero_offset_keeps_payload_after_header() {
        let mut raw = vec![0, 0, 0, 0];
        raw.extend_from_slice(b"Exif\0\0payload");
        assert_eq!(strip_tiff_offset(&raw).unwrap(), b"Exif\0\0payload");
    }

    #[test]
    fn nonzero_offset_skips_padding() {
        let mut raw = vec![0, 0, 0, 2, 0xAA, 0xBB];
        raw.extend_from_slice(b"Exif\0\0");
        assert_eq!(strip_tiff_offset(&raw).unwrap(), b"Exif\0\0");
    }

    #[test]
    fn offset_consuming_whole_item_yields_empty_payload() {
        let raw = vec![0, 0, 0, 2, 0xAA, 0xBB];
        assert_eq!(strip_tiff_offset(&raw).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn item_shorter_than_header_is_truncated() {
        let err = strip_tiff_offset(&[0, 0]).unwrap_err();
        assert!(matches!(err, HeifError::TruncatedExif(2)));
    }

    #[test]
    fn offset_past_end_is_truncated() {
        let raw = vec![0, 0, 0, 40, 1, 2, 3];
        let err = strip_tiff_offset(&raw).unwrap_err();
        assert!(matches!(err, HeifError::TruncatedExif(7)));
    }

    // ── interleaved_to_rgb ───────────────────────────────────────────

    #[test]
    fn tight_plane_round_trips() {
        let data: Vec<u8> = (0..12).collect();
        let rgb = interleaved_to_rgb(&data, 2, 2, 6).unwrap();
        assert_eq!(rgb.dimensions(), (2, 2));
        assert_eq!(rgb.into_raw(), data);
    }

    #[test]
    fn stride_padding_is_dropped() {
        // 2x2 RGB rows padded to a stride of 8.
        let data = vec![
            1, 2, 3, 4, 5, 6, 0xFF, 0xFF, //
            7, 8, 9, 10, 11, 12, 0xFF, 0xFF,
        ];
        let rgb = interleaved_to_rgb(&data, 2, 2, 8).unwrap();
        assert_eq!(rgb.into_raw(), vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn last_row_may_omit_stride_padding() {
        let data: Vec<u8> = (0..14).collect(); // second row is 6 bytes, no padding
        let rgb = interleaved_to_rgb(&data, 2, 2, 8).unwrap();
        assert_eq!(rgb.into_raw(), vec![0, 1, 2, 3, 4, 5, 8, 9, 10, 11, 12, 13]);
    }

    #[test]
    fn short_plane_is_rejected() {
        let data = vec![0u8; 10];
        assert!(matches!(
            interleaved_to_rgb(&data, 2, 2, 6),
            Err(HeifError::ShortPlane(10))
        ));
    }

    #[test]
    fn stride_narrower_than_row_is_rejected() {
        let data = vec![0u8; 64];
        assert!(matches!(
            interleaved_to_rgb(&data, 4, 2, 8),
            Err(HeifError::ShortPlane(64))
        ));
    }

    // ── HeifReader ───────────────────────────────────────────────────

    #[test]
    fn garbage_container_fails_extraction() {
        let reader = HeifReader::from_bytes(b"not a heic file".to_vec());
        assert!(matches!(reader.raw_exif(), Err(HeifError::Backend(_))));
        assert!(matches!(reader.decode(), Err(HeifError::Backend(_))));
    }
}
