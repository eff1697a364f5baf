use std::io;
use std::path::PathBuf;

use crate::heif::HeifError;

/// Error type covering every stage of a conversion run.
///
/// Each variant tags the stage that failed and carries the underlying error
/// as its [`source`](std::error::Error::source), so callers can log the full
/// cause chain without the library interpreting it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `stat` on a top-level path argument failed.
    #[error("stat failed, path: {}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Opening the source file or creating the output file failed.
    #[error("open failed, path: {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// EXIF extraction failed for a reason other than "no EXIF present".
    #[error("extract exif failed")]
    ExifExtract(#[source] HeifError),

    /// Decoding the source image failed.
    #[error("decode failed")]
    Decode(#[source] HeifError),

    /// Encoding the JPEG output failed.
    #[error("encode failed")]
    Encode(#[source] image::ImageError),

    /// Visiting a directory entry during a walk failed.
    #[error("walk failed")]
    Walk(#[source] walkdir::Error),

    /// The EXIF payload does not fit in a single APP1 segment.
    #[error("exif payload too large for an APP1 segment: {len} bytes")]
    OversizeExif { len: usize },
}

/// Result type alias using the crate error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_display_includes_path() {
        let err = Error::Stat {
            path: PathBuf::from("/no/such/dir"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "stat failed, path: /no/such/dir");
    }

    #[test]
    fn stage_tags_are_stable() {
        let err = Error::ExifExtract(HeifError::TruncatedExif(2));
        assert_eq!(err.to_string(), "extract exif failed");

        let err = Error::Decode(HeifError::MissingPlane);
        assert_eq!(err.to_string(), "decode failed");

        let err = Error::Walk(walkdir::WalkDir::new("/no/such/dir").into_iter().next().unwrap().unwrap_err());
        assert_eq!(err.to_string(), "walk failed");
    }

    #[test]
    fn source_chain_is_preserved() {
        use std::error::Error as _;

        let err = Error::Decode(HeifError::MissingPlane);
        let source = err.source().expect("decode error has a source");
        assert_eq!(source.to_string(), HeifError::MissingPlane.to_string());
    }

    #[test]
    fn oversize_reports_length() {
        let err = Error::OversizeExif { len: 70_000 };
        assert!(err.to_string().contains("70000"));
    }
}
