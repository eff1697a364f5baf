//! Conversion pipeline and batch driver.
//!
//! [`convert_image`] is the end-to-end single-file pipeline: extract the EXIF
//! payload, decode the pixels, re-encode as JPEG with the payload spliced in.
//! [`run`] resolves CLI path arguments to files and directory walks and feeds
//! each candidate through the pipeline, one file at a time.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::heif::{HeifReader, HeifSource};
use crate::jpeg;

/// File-name suffix a directory walk picks up. Matched case-sensitively;
/// a directly named file converts regardless of its extension.
pub const HEIC_SUFFIX: &str = ".heic";

/// Convert one source image into a JPEG stream written to `writer`.
///
/// A source without EXIF converts to a plain JPEG; any other extraction
/// failure aborts this file. The writer is flushed, never closed — handle
/// lifetimes belong to the caller.
///
/// # Example
///
/// ```rust,no_run
/// use std::fs::File;
/// use std::io::BufWriter;
/// use std::path::Path;
///
/// use heic2jpg::heif::HeifReader;
/// use heic2jpg::pipeline::convert_image;
///
/// fn main() -> anyhow::Result<()> {
///     let source = HeifReader::open(Path::new("photo.heic"))?;
///     let out = File::create("photo.jpg")?;
///     convert_image(&source, BufWriter::new(out))?;
///     Ok(())
/// }
/// ```
pub fn convert_image<S: HeifSource, W: Write>(source: &S, writer: W) -> Result<()> {
    let exif = source.raw_exif().map_err(Error::ExifExtract)?;
    let decoded = source.decode().map_err(Error::Decode)?;

    let mut jpeg_writer = jpeg::exif_writer(writer, exif.as_deref())?;
    let encoder = JpegEncoder::new(&mut jpeg_writer);
    decoded.write_with_encoder(encoder).map_err(Error::Encode)?;
    jpeg_writer.flush().map_err(|e| Error::Encode(e.into()))?;

    Ok(())
}

/// Convert `path` into a sibling `.jpg`, logging the source on success.
pub fn convert_file(path: &Path) -> Result<()> {
    let source = HeifReader::open(path).map_err(|e| Error::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let out_path = output_path(path);
    let out = File::create(&out_path).map_err(|e| Error::Open {
        path: out_path.clone(),
        source: e,
    })?;

    convert_image(&source, BufWriter::new(out))?;
    log::info!("converted {}", path.display());
    Ok(())
}

/// Convert every path argument, sequentially.
///
/// A file argument is converted directly; a directory argument is walked
/// recursively for `.heic` files. Failures inside a walk are logged and the
/// walk continues; failures on the arguments themselves abort the run.
pub fn run(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let meta = fs::metadata(path).map_err(|e| Error::Stat {
            path: path.clone(),
            source: e,
        })?;

        if meta.is_dir() {
            convert_dir(path)?;
        } else {
            convert_file(path)?;
        }
    }
    Ok(())
}

fn convert_dir(dir: &Path) -> Result<()> {
    let mut entries = WalkDir::new(dir).into_iter();
    loop {
        let entry = match entries.next() {
            None => break,
            Some(Err(e)) => {
                log::warn!("{}", error_chain(&Error::Walk(e)));
                entries.skip_current_dir();
                continue;
            }
            Some(Ok(entry)) => entry,
        };

        if !entry.file_type().is_file() || !is_heic_name(entry.file_name()) {
            continue;
        }

        if let Err(e) = convert_file(entry.path()) {
            log::warn!("skipping {}: {}", entry.path().display(), error_chain(&e));
        }
    }
    Ok(())
}

fn is_heic_name(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| n.ends_with(HEIC_SUFFIX))
}

/// Sibling output path: whatever follows the final `.` becomes `jpg`.
fn output_path(path: &Path) -> PathBuf {
    path.with_extension("jpg")
}

/// Render an error with its cause chain on one line.
fn error_chain(err: &Error) -> String {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
