//! # pulsejet-core
//!
//! Format-level contract for the pulsejet lossy audio codec: the constants
//! every conforming encoder and decoder must agree on, the container header,
//! the metadata inspection API, and the injected math-primitive interface.
//!
//! pulsejet targets very small encoded artifacts (roughly 2-128 kbps) for
//! size-constrained distribution such as demos, intros, and games. The
//! signal path itself lives in `pulsejet-codec`; this crate holds only what
//! is shared by both sides of the wire.
//!
//! ## Example
//!
//! ```
//! use pulsejet_core::{check_sample, check_sample_version};
//!
//! let header = b"PLSJ\x00\x00\x01\x00\x01\x00";
//! assert!(check_sample(header));
//! assert!(check_sample_version(header));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod math;
pub mod meta;

pub use error::{Error, Result};
pub use math::{MathOps, StdMath, TableMath};
pub use meta::{
    check_sample, check_sample_version, codec_version_string, library_version_string,
    sample_version_string, SampleHeader, HEADER_SIZE,
};

/// Short codec name.
pub const CODEC_NAME: &str = "pulsejet";

/// Number of output samples covered by one frame.
pub const FRAME_SIZE: usize = 1024;

/// Number of short analysis windows that make up a Short frame.
pub const NUM_SHORT_WINDOWS_PER_FRAME: usize = 8;

/// Long analysis window size in samples.
pub const LONG_WINDOW_SIZE: usize = FRAME_SIZE * 2;

/// Short analysis window size in samples.
pub const SHORT_WINDOW_SIZE: usize = LONG_WINDOW_SIZE / NUM_SHORT_WINDOWS_PER_FRAME;

/// Number of perceptual bands per subframe.
pub const NUM_BANDS: usize = 20;

/// Total coded bins per frame. Bins past this point are neither transmitted
/// nor reconstructed.
pub const NUM_TOTAL_BINS: usize = 856;

/// Bin count of each band within a long subframe. Every width is divisible
/// by 8, so the eight short subframes of a Short frame get integral
/// per-band counts.
pub const BAND_TO_NUM_BINS: [u8; NUM_BANDS] = [
    8, 8, 8, 8, 8, 8, 8, 8, 16, 16, 24, 32, 32, 40, 48, 64, 80, 120, 144, 176,
];

/// Four-byte tag at offset 0 of every encoded sample.
pub const SAMPLE_TAG: &[u8; 4] = b"PLSJ";

/// Major codec version. Samples carrying a different major version are
/// incompatible with this library.
pub const CODEC_VERSION_MAJOR: u16 = 0;

/// Minor codec version. Minor bumps represent codec changes that do not
/// affect the decoder and remain compatible.
pub const CODEC_VERSION_MINOR: u16 = 1;

/// Analysis window shape of one frame.
///
/// Start and Stop bridge between a long window and a run of short windows
/// so that overlap-add reconstruction stays exact across the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WindowMode {
    /// Single 2048-sample window.
    Long = 0,
    /// Eight 256-sample windows.
    Short = 1,
    /// Long-to-short transition window.
    Start = 2,
    /// Short-to-long transition window.
    Stop = 3,
}

impl WindowMode {
    /// Interpret a window-mode byte from the wire.
    ///
    /// Unknown tags map to `Long`; the decoder performs no validation on
    /// the payload past the header.
    #[must_use]
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            1 => WindowMode::Short,
            2 => WindowMode::Start,
            3 => WindowMode::Stop,
            _ => WindowMode::Long,
        }
    }
}
