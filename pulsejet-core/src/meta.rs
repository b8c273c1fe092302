//! Container header and sample metadata inspection.
//!
//! The header is the only part of an encoded sample the decoder validates;
//! everything after it is consumed without bounds or integrity checks. The
//! inspection functions here are all length-bounded and never read past the
//! supplied slice, so they are safe to call on untrusted input of any size.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::{CODEC_VERSION_MAJOR, CODEC_VERSION_MINOR, SAMPLE_TAG};

/// Byte length of the fixed container header.
pub const HEADER_SIZE: usize = 10;

const VERSION_PREFIX: &str = "pulsejet v";

/// Fixed-size container header preceding the three coded streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleHeader {
    /// Number of output frames. The streams that follow carry one extra
    /// internal frame whose decoded output is discarded.
    pub num_frames: u16,
}

impl SampleHeader {
    /// Append the serialized header: tag, major/minor version, and frame
    /// count, with all integer fields little-endian.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(SAMPLE_TAG);
        let mut field = [0u8; 2];
        LittleEndian::write_u16(&mut field, CODEC_VERSION_MAJOR);
        out.extend_from_slice(&field);
        LittleEndian::write_u16(&mut field, CODEC_VERSION_MINOR);
        out.extend_from_slice(&field);
        LittleEndian::write_u16(&mut field, self.num_frames);
        out.extend_from_slice(&field);
    }

    /// Parse and validate a header.
    ///
    /// This is the only point at which decoding can fail. An unrecognised
    /// tag (which also covers inputs shorter than the header) is rejected
    /// before the version field is interpreted.
    pub fn read(input: &[u8]) -> Result<Self> {
        if input.len() < HEADER_SIZE || !check_sample(input) {
            return Err(Error::NotPulsejet);
        }
        if !check_sample_version(input) {
            return Err(Error::IncompatibleVersion {
                sample: LittleEndian::read_u16(&input[4..6]),
                library: CODEC_VERSION_MAJOR,
            });
        }
        Ok(Self {
            num_frames: LittleEndian::read_u16(&input[8..10]),
        })
    }
}

/// Whether the given stream starts with the pulsejet sample tag.
///
/// The comparison is length-bounded: inputs shorter than the tag return
/// false instead of reading out of range.
#[must_use]
pub fn check_sample(input: &[u8]) -> bool {
    input.get(..4) == Some(&SAMPLE_TAG[..])
}

/// Whether the sample's major codec version matches this library.
///
/// Assumes the stream is a pulsejet sample; use [`check_sample`] first.
#[must_use]
pub fn check_sample_version(input: &[u8]) -> bool {
    input
        .get(4..6)
        .map_or(false, |field| LittleEndian::read_u16(field) == CODEC_VERSION_MAJOR)
}

/// Codec version string embedded in the given encoded sample, or `None` if
/// the input is too short to contain a version field.
#[must_use]
pub fn sample_version_string(input: &[u8]) -> Option<String> {
    let field = input.get(4..8)?;
    let major = LittleEndian::read_u16(&field[..2]);
    let minor = LittleEndian::read_u16(&field[2..]);
    Some(version_string(major, minor))
}

/// Codec version string supported by this library.
///
/// The major version gates encoder/decoder compatibility; minor bumps are
/// codec changes that leave the decoder untouched. Tooling can use the
/// minor version to spot samples that a newer encoder could re-encode at
/// higher quality for the same decoder.
#[must_use]
pub fn codec_version_string() -> String {
    version_string(CODEC_VERSION_MAJOR, CODEC_VERSION_MINOR)
}

/// This library's own version string. Follows semver, independently of the
/// codec version pair.
#[must_use]
pub fn library_version_string() -> String {
    format!("{VERSION_PREFIX}{}", env!("CARGO_PKG_VERSION"))
}

fn version_string(major: u16, minor: u16) -> String {
    format!("{VERSION_PREFIX}{major}.{minor}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_sample() {
        assert!(check_sample(b"PLSJ\x00\x00\x01\x00"));
        assert!(!check_sample(b"OGGS\x00\x00\x01\x00"));
        assert!(!check_sample(b"PLS"));
        assert!(!check_sample(b""));
    }

    #[test]
    fn test_check_sample_version() {
        assert!(check_sample_version(b"PLSJ\x00\x00\x01\x00"));
        assert!(!check_sample_version(b"PLSJ\x01\x00\x01\x00"));
        assert!(!check_sample_version(b"PLSJ"));
    }

    #[test]
    fn test_header_round_trip() {
        let header = SampleHeader { num_frames: 513 };
        let mut bytes = Vec::new();
        header.write(&mut bytes);
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[..4], b"PLSJ");
        assert_eq!(SampleHeader::read(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_rejects_bad_tag() {
        let err = SampleHeader::read(b"WAVE\x00\x00\x01\x00\x01\x00").unwrap_err();
        assert!(matches!(err, Error::NotPulsejet));
    }

    #[test]
    fn test_header_rejects_major_mismatch() {
        let err = SampleHeader::read(b"PLSJ\x02\x00\x01\x00\x01\x00").unwrap_err();
        assert!(matches!(
            err,
            Error::IncompatibleVersion {
                sample: 2,
                library: 0
            }
        ));
    }

    #[test]
    fn test_version_strings() {
        assert_eq!(codec_version_string(), "pulsejet v0.1");
        assert_eq!(library_version_string(), "pulsejet v0.1.0");
        assert_eq!(
            sample_version_string(b"PLSJ\x00\x00\x01\x00\x05\x00").as_deref(),
            Some("pulsejet v0.1")
        );
        assert_eq!(sample_version_string(b"PLSJ\x00"), None);
    }
}
