//! Error types for the pulsejet codec.

use thiserror::Error;

/// Errors raised at the decoder boundary.
///
/// Both variants are reported before any decode work begins; the decode
/// loop itself never fails. The encoder has no error conditions of its own
/// (input alignment is a caller-side concern).
#[derive(Error, Debug)]
pub enum Error {
    /// The input does not start with the pulsejet sample tag.
    #[error("not a pulsejet sample")]
    NotPulsejet,

    /// The sample's major codec version does not match this library.
    #[error("incompatible codec version: sample has major {sample}, library supports {library}")]
    IncompatibleVersion {
        /// Major version found in the sample header.
        sample: u16,
        /// Major version this library implements.
        library: u16,
    },
}

/// Result type alias using the pulsejet error type.
pub type Result<T> = std::result::Result<T, Error>;
