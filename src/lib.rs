//! # heic2jpg
//!
//! Convert HEIC photos to JPEG while preserving embedded EXIF metadata.
//!
//! The decoded image is re-encoded with the stock JPEG encoder, but the
//! encoder's own start-of-image marker is spliced out so the raw EXIF payload
//! from the source container can sit in an APP1 segment at the front of the
//! stream, where standard tools expect it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! fn main() -> heic2jpg::Result<()> {
//!     // Convert a single file and everything under a directory.
//!     heic2jpg::pipeline::run(&[
//!         PathBuf::from("photo.heic"),
//!         PathBuf::from("./camera-roll"),
//!     ])
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! For control over the output destination, drive the pipeline directly:
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufWriter;
//! use std::path::Path;
//!
//! use heic2jpg::heif::HeifReader;
//! use heic2jpg::pipeline::convert_image;
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = HeifReader::open(Path::new("photo.heic"))?;
//!     let out = File::create("photo.jpg")?;
//!     convert_image(&source, BufWriter::new(out))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`jpeg`] — start-of-image splicing and APP1 (EXIF) segment injection
//! - [`heif`] — the HEIC decode/extract backend (libheif)
//! - [`pipeline`] — single-file conversion and batch directory driver
//! - [`error`] — the per-stage error taxonomy

pub mod error;
pub mod heif;
pub mod jpeg;
pub mod pipeline;

pub use error::{Error, Result};
